//! Status command implementation.
//!
//! Displays the metadata the last successful build recorded on the
//! environment layer.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use conda_env_lib::config::{Config, Overrides};
use conda_env_lib::consts::{BUILT_AT_KEY, CACHE_LAYER_NAME, ENV_LAYER_NAME, LOCKFILE_SHA_KEY};
use conda_env_lib::layer::{BuildMetadata, FsLayers, LayerStore};

use crate::output::{Tone, describe_sha, field, print_json, say};

/// `status --json` output. Metadata keys match the layer TOML.
#[derive(Debug, Serialize)]
struct StatusReport<'a> {
  layer: &'a str,
  path: &'a Path,
  built: bool,
  #[serde(flatten)]
  metadata: &'a BuildMetadata,
}

pub fn cmd_status(layers_dir: Option<PathBuf>, json: bool, verbose: bool) -> Result<()> {
  let config = Config::from_env(Overrides {
    working_dir: None,
    layers_dir,
  })?;
  let layers = FsLayers::new(config.require_layers_dir()?);

  let env_layer = match layers.get(ENV_LAYER_NAME) {
    Ok(layer) => layer,
    Err(e) => {
      say(Tone::Error, &format!("Error loading layer metadata: {}", e));
      return Err(e.into());
    }
  };
  let metadata = &env_layer.metadata;

  if json {
    return print_json(&StatusReport {
      layer: &env_layer.name,
      path: &env_layer.path,
      built: !metadata.is_empty(),
      metadata,
    });
  }

  if metadata.is_empty() {
    say(
      Tone::Info,
      "No conda environment has been built yet. Run 'conda-env-update build' to create one.",
    );
    return Ok(());
  }

  say(Tone::Success, &format!("Environment layer: {}", env_layer.path.display()));
  field(BUILT_AT_KEY, metadata.built_at.as_deref().unwrap_or("-"));
  field(LOCKFILE_SHA_KEY, describe_sha(metadata.lockfile_sha.as_deref(), verbose));

  if verbose {
    field("cache layer", &layers.root().join(CACHE_LAYER_NAME).display().to_string());
  }

  Ok(())
}
