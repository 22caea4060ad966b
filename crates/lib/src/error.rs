//! Error types for the build and detect phases.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::layer::LayerError;
use crate::runner::exec::ExecError;
use crate::util::hash::HashError;

/// Broad classification of a [`BuildError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// A layer could not be provided or persisted.
  LocationAcquisition,
  /// A stat or reset failed for a reason other than not-found.
  FilesystemAccess,
  /// The lockfile could not be fingerprinted.
  HashComputation,
  /// conda could not be launched or exited unsuccessfully.
  ExternalToolFailure,
  /// The process environment did not describe a usable build.
  Configuration,
}

/// Errors that abort a build or detect attempt.
///
/// None of these are retried; each carries enough context (path, command,
/// underlying message) to diagnose the failure without re-running.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error("failed to acquire layer {name}: {message}")]
  LocationAcquisition { name: String, message: String },

  #[error("{}: {source}", .path.display())]
  FilesystemAccess {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to fingerprint {}: {message}", .path.display())]
  HashComputation { path: PathBuf, message: String },

  #[error("conda {command} failed: {message}")]
  ExternalToolFailure { command: String, message: String },

  #[error(transparent)]
  Config(#[from] ConfigError),
}

impl BuildError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      BuildError::LocationAcquisition { .. } => ErrorKind::LocationAcquisition,
      BuildError::FilesystemAccess { .. } => ErrorKind::FilesystemAccess,
      BuildError::HashComputation { .. } => ErrorKind::HashComputation,
      BuildError::ExternalToolFailure { .. } => ErrorKind::ExternalToolFailure,
      BuildError::Config(_) => ErrorKind::Configuration,
    }
  }

  pub(crate) fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
    BuildError::FilesystemAccess {
      path: path.into(),
      source,
    }
  }

  pub(crate) fn hash(path: impl Into<PathBuf>, err: HashError) -> Self {
    BuildError::HashComputation {
      path: path.into(),
      message: err.to_string(),
    }
  }
}

impl From<LayerError> for BuildError {
  fn from(err: LayerError) -> Self {
    match err {
      LayerError::Remove { path, source } => BuildError::FilesystemAccess {
        path,
        source: io::Error::new(source.kind(), format!("error could not remove: {}", source)),
      },
      LayerError::Create { path, source } => BuildError::FilesystemAccess {
        path,
        source: io::Error::new(source.kind(), format!("error could not create directory: {}", source)),
      },
      LayerError::Read { ref name, .. } | LayerError::Parse { ref name, .. } | LayerError::Write { ref name, .. } => {
        BuildError::LocationAcquisition {
          name: name.clone(),
          message: err.to_string(),
        }
      }
      LayerError::Serialize { name, message } => BuildError::LocationAcquisition { name, message },
    }
  }
}

impl From<ExecError> for BuildError {
  fn from(err: ExecError) -> Self {
    BuildError::ExternalToolFailure {
      command: err.command().to_string(),
      message: err.to_string(),
    }
  }
}
