//! Implementation of the `conda-env-update detect` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use conda_env_lib::config::{Config, Overrides};
use conda_env_lib::detect::{DetectResult, detect};

use crate::output::{Tone, say};

/// Execute the detect command.
///
/// Returns whether detection passed. On a pass the build plan is written to
/// `plan` when one was given.
pub fn cmd_detect(working_dir: Option<PathBuf>, plan: Option<PathBuf>) -> Result<bool> {
  let config = Config::from_env(Overrides {
    working_dir,
    layers_dir: None,
  })?;

  match detect(&config.working_dir).context("Detection failed")? {
    DetectResult::Pass(build_plan) => {
      if let Some(path) = plan {
        build_plan
          .write(&path)
          .with_context(|| format!("Failed to write build plan to {}", path.display()))?;
      }
      say(Tone::Success, &format!("Detected conda environment in {}", config.working_dir.display()));
      Ok(true)
    }
    DetectResult::Fail { message } => {
      say(Tone::Info, &message);
      Ok(false)
    }
  }
}
