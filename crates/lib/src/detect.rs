//! Detection: does this buildpack apply to the application?
//!
//! The buildpack participates when the working directory has either an
//! `environment.yml` or a `package-list.txt`. It then provides a conda
//! environment and requires conda itself at build time.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::consts::{ENVIRONMENT_FILE_NAME, LOCKFILE_NAME, PROVIDES_CONDA_ENVIRONMENT, REQUIRES_CONDA};
use crate::error::BuildError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provision {
  pub name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementMetadata {
  #[serde(default)]
  pub build: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
  pub name: String,
  #[serde(default)]
  pub metadata: RequirementMetadata,
}

/// Build plan contributed by a passing detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
  #[serde(default)]
  pub provides: Vec<Provision>,
  #[serde(default)]
  pub requires: Vec<Requirement>,
}

impl BuildPlan {
  fn conda_environment() -> Self {
    Self {
      provides: vec![Provision {
        name: PROVIDES_CONDA_ENVIRONMENT.to_string(),
      }],
      requires: vec![Requirement {
        name: REQUIRES_CONDA.to_string(),
        metadata: RequirementMetadata { build: true },
      }],
    }
  }

  /// Write the plan as TOML, the format the lifecycle reads.
  pub fn write(&self, path: &Path) -> Result<(), BuildError> {
    let content = toml::to_string(self).map_err(|e| {
      BuildError::filesystem(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    })?;
    fs::write(path, content).map_err(|e| BuildError::filesystem(path, e))
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectResult {
  Pass(BuildPlan),
  Fail { message: String },
}

impl DetectResult {
  pub fn passed(&self) -> bool {
    matches!(self, DetectResult::Pass(_))
  }
}

/// Decide whether the buildpack applies to `working_dir`.
pub fn detect(working_dir: &Path) -> Result<DetectResult, BuildError> {
  for name in [ENVIRONMENT_FILE_NAME, LOCKFILE_NAME] {
    let path = working_dir.join(name);
    let exists = path.try_exists().map_err(|e| BuildError::filesystem(&path, e))?;
    if exists {
      info!(file = %name, "detected conda environment");
      return Ok(DetectResult::Pass(BuildPlan::conda_environment()));
    }
  }

  debug!(working_dir = %working_dir.display(), "no conda environment files");
  Ok(DetectResult::Fail {
    message: format!("no '{}' or '{}' found", ENVIRONMENT_FILE_NAME, LOCKFILE_NAME),
  })
}
