use std::io;
use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Metadata recorded on the environment layer after a successful build.
///
/// Both fields are absent until the first successful build. `lockfile_sha`
/// is the empty string when the build ran without a lockfile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildMetadata {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub built_at: Option<String>,

  #[serde(rename = "lockfile-sha", default, skip_serializing_if = "Option::is_none")]
  pub lockfile_sha: Option<String>,
}

impl BuildMetadata {
  /// Fresh metadata for a build that finished at `built_at`.
  pub fn new(built_at: DateTime<Utc>, lockfile_sha: impl Into<String>) -> Self {
    Self {
      built_at: Some(built_at.to_rfc3339_opts(SecondsFormat::Nanos, true)),
      lockfile_sha: Some(lockfile_sha.into()),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.built_at.is_none() && self.lockfile_sha.is_none()
  }
}

/// A lifecycle layer.
///
/// Flags start out false on every acquisition; the build decides them anew.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
  pub name: String,
  pub path: PathBuf,
  /// Visible to subsequent buildpacks during the build.
  pub build: bool,
  /// Included in the final application image.
  pub launch: bool,
  /// Restored from the cache on the next build.
  pub cache: bool,
  pub metadata: BuildMetadata,
}

impl Layer {
  pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
    Self {
      name: name.into(),
      path: path.into(),
      build: false,
      launch: false,
      cache: false,
      metadata: BuildMetadata::default(),
    }
  }
}

/// On-disk shape of `<layers>/<name>.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct LayerFile {
  #[serde(default)]
  pub types: LayerTypes,
  #[serde(default)]
  pub metadata: BuildMetadata,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct LayerTypes {
  #[serde(default)]
  pub build: bool,
  #[serde(default)]
  pub launch: bool,
  #[serde(default)]
  pub cache: bool,
}

impl From<&Layer> for LayerFile {
  fn from(layer: &Layer) -> Self {
    Self {
      types: LayerTypes {
        build: layer.build,
        launch: layer.launch,
        cache: layer.cache,
      },
      metadata: layer.metadata.clone(),
    }
  }
}

/// Errors raised while acquiring, resetting or persisting a layer.
#[derive(Debug, Error)]
pub enum LayerError {
  #[error("failed to read layer metadata {}: {source}", .path.display())]
  Read {
    name: String,
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse layer metadata {}: {message}", .path.display())]
  Parse {
    name: String,
    path: PathBuf,
    message: String,
  },

  #[error("error could not remove {}: {source}", .path.display())]
  Remove {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("error could not create directory {}: {source}", .path.display())]
  Create {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write layer metadata {}: {source}", .path.display())]
  Write {
    name: String,
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to serialize metadata for layer {name}: {message}")]
  Serialize { name: String, message: String },
}
