//! Implementation of the `conda-env-update build` command.
//!
//! Resolves configuration from the lifecycle environment, runs one build
//! against the layers directory and persists the resulting layer metadata.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;

use conda_env_lib::config::{Config, Overrides};
use conda_env_lib::consts::ENV_LAYER_NAME;
use conda_env_lib::layer::FsLayers;
use conda_env_lib::runner::CondaRunner;
use conda_env_lib::runner::exec::CondaExecutable;
use conda_env_lib::util::hash::FileSummer;
use conda_env_lib::{BuildContext, SystemClock, build};

use crate::output::{BuildSummary, print_build_summary};

/// Execute the build command.
///
/// Prints whether the environment was rebuilt or reused, the lockfile
/// fingerprint and the elapsed time.
pub fn cmd_build(working_dir: Option<PathBuf>, layers_dir: Option<PathBuf>) -> Result<()> {
  let config = Config::from_env(Overrides { working_dir, layers_dir })?;
  let layers = FsLayers::new(config.require_layers_dir()?);
  let runner = CondaRunner::new(CondaExecutable::new(&config.conda_exe), FileSummer);
  let context = BuildContext::new(&config.working_dir, config.buildpack.clone());

  let started = Instant::now();

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let result = rt
    .block_on(build(&context, &layers, &runner, &SystemClock))
    .context("Build failed")?;
  result.persist(&layers).context("Failed to persist layers")?;

  let elapsed = started.elapsed();
  info!(rebuilt = result.rebuilt, elapsed_ms = elapsed.as_millis() as u64, "build finished");

  print_build_summary(&BuildSummary {
    rebuilt: result.rebuilt,
    layer_path: result.layer(ENV_LAYER_NAME).map(|layer| layer.path.as_path()),
    fingerprint: &result.fingerprint,
    elapsed,
  });

  Ok(())
}
