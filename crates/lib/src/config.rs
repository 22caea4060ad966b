//! Runtime configuration.
//!
//! Paths come from explicit overrides first, then from the lifecycle's `CNB_*`
//! environment variables, then from defaults.

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::build::BuildpackInfo;
use crate::consts::APP_NAME;

pub const APP_DIR_VAR: &str = "CNB_APP_DIR";
pub const LAYERS_DIR_VAR: &str = "CNB_LAYERS_DIR";
pub const BUILDPACK_DIR_VAR: &str = "CNB_BUILDPACK_DIR";
pub const CONDA_EXE_VAR: &str = "CONDA_EXE";

/// Program spawned when `CONDA_EXE` is unset; resolved through `PATH`.
const DEFAULT_CONDA: &str = "conda";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("layers directory not set: pass --layers or set CNB_LAYERS_DIR")]
  MissingLayersDir,

  #[error("failed to resolve working directory {}: {source}", .path.display())]
  WorkingDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to read {}: {message}", .path.display())]
  BuildpackToml { path: PathBuf, message: String },
}

/// Values given on the command line, taking precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
  pub working_dir: Option<PathBuf>,
  pub layers_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Config {
  pub working_dir: PathBuf,
  pub layers_dir: Option<PathBuf>,
  pub conda_exe: PathBuf,
  pub buildpack: BuildpackInfo,
}

impl Config {
  pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
    let working_dir = match overrides.working_dir.or_else(|| env_path(APP_DIR_VAR)) {
      Some(path) => path,
      None => std::env::current_dir().map_err(|source| ConfigError::WorkingDir {
        path: PathBuf::from("."),
        source,
      })?,
    };
    let working_dir =
      dunce::canonicalize(&working_dir).map_err(|source| ConfigError::WorkingDir { path: working_dir, source })?;

    let layers_dir = overrides.layers_dir.or_else(|| env_path(LAYERS_DIR_VAR));
    let conda_exe = env_path(CONDA_EXE_VAR).unwrap_or_else(|| PathBuf::from(DEFAULT_CONDA));

    let buildpack = match env_path(BUILDPACK_DIR_VAR) {
      Some(dir) => read_buildpack_info(&dir)?,
      None => default_buildpack_info(),
    };

    let config = Self {
      working_dir,
      layers_dir,
      conda_exe,
      buildpack,
    };
    debug!(?config, "resolved configuration");
    Ok(config)
  }

  pub fn require_layers_dir(&self) -> Result<&Path, ConfigError> {
    self.layers_dir.as_deref().ok_or(ConfigError::MissingLayersDir)
  }
}

fn env_path(var: &str) -> Option<PathBuf> {
  std::env::var_os(var).filter(|v| !v.is_empty()).map(PathBuf::from)
}

fn default_buildpack_info() -> BuildpackInfo {
  BuildpackInfo {
    name: APP_NAME.to_string(),
    version: env!("CARGO_PKG_VERSION").to_string(),
  }
}

#[derive(Debug, Deserialize)]
struct BuildpackToml {
  buildpack: BuildpackSection,
}

#[derive(Debug, Deserialize)]
struct BuildpackSection {
  name: Option<String>,
  id: Option<String>,
  version: String,
}

/// Read name and version from `<dir>/buildpack.toml`, falling back to the
/// built-in identity when the file is absent.
fn read_buildpack_info(dir: &Path) -> Result<BuildpackInfo, ConfigError> {
  let path = dir.join("buildpack.toml");
  let content = match std::fs::read_to_string(&path) {
    Ok(content) => content,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(default_buildpack_info()),
    Err(e) => {
      return Err(ConfigError::BuildpackToml {
        path,
        message: e.to_string(),
      });
    }
  };

  let parsed: BuildpackToml = toml::from_str(&content).map_err(|e| ConfigError::BuildpackToml {
    path: path.clone(),
    message: e.to_string(),
  })?;

  let section = parsed.buildpack;
  Ok(BuildpackInfo {
    name: section.name.or(section.id).unwrap_or_else(|| APP_NAME.to_string()),
    version: section.version,
  })
}
