//! Layer storage.
//!
//! # Storage Layout
//!
//! ```text
//! {layers_dir}/
//! ├── conda-env/            # layer contents
//! ├── conda-env.toml        # [types] flags + [metadata]
//! ├── conda-env-cache/
//! └── conda-env-cache.toml
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::{Layer, LayerError, LayerFile};

/// Acquires, resets and persists layers on behalf of the build.
pub trait LayerStore {
  /// Get the named layer along with the metadata recorded by the previous build.
  fn get(&self, name: &str) -> Result<Layer, LayerError>;

  /// Discard the layer's contents and recorded metadata, then recreate it empty.
  ///
  /// Returns a fresh layer value with cleared flags and metadata.
  fn reset(&self, layer: Layer) -> Result<Layer, LayerError>;

  /// Record the layer's flags and metadata for the lifecycle and the next build.
  fn persist(&self, layer: &Layer) -> Result<(), LayerError>;
}

/// Layers rooted at a lifecycle layers directory.
#[derive(Debug, Clone)]
pub struct FsLayers {
  root: PathBuf,
}

impl FsLayers {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  fn layer_path(&self, name: &str) -> PathBuf {
    self.root.join(name)
  }

  fn metadata_path(&self, name: &str) -> PathBuf {
    self.root.join(format!("{}.toml", name))
  }
}

impl LayerStore for FsLayers {
  fn get(&self, name: &str) -> Result<Layer, LayerError> {
    let mut layer = Layer::new(name, self.layer_path(name));
    let path = self.metadata_path(name);

    let content = match fs::read_to_string(&path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        debug!(layer = %name, "no previous layer metadata");
        return Ok(layer);
      }
      Err(source) => {
        return Err(LayerError::Read {
          name: name.to_string(),
          path,
          source,
        });
      }
    };

    let file: LayerFile = toml::from_str(&content).map_err(|e| LayerError::Parse {
      name: name.to_string(),
      path: path.clone(),
      message: e.to_string(),
    })?;

    layer.metadata = file.metadata;
    debug!(layer = %name, metadata = ?layer.metadata, "loaded previous layer metadata");

    Ok(layer)
  }

  fn reset(&self, layer: Layer) -> Result<Layer, LayerError> {
    // Recorded metadata must never outlive the contents it describes.
    let metadata_path = self.metadata_path(&layer.name);
    match fs::remove_file(&metadata_path) {
      Ok(()) => {}
      Err(e) if e.kind() == io::ErrorKind::NotFound => {}
      Err(source) => {
        return Err(LayerError::Remove {
          path: metadata_path,
          source,
        });
      }
    }

    match fs::remove_dir_all(&layer.path) {
      Ok(()) => {}
      Err(e) if e.kind() == io::ErrorKind::NotFound => {}
      Err(source) => {
        return Err(LayerError::Remove {
          path: layer.path,
          source,
        });
      }
    }

    fs::create_dir_all(&layer.path).map_err(|source| LayerError::Create {
      path: layer.path.clone(),
      source,
    })?;

    debug!(layer = %layer.name, path = %layer.path.display(), "reset layer");

    Ok(Layer::new(layer.name, layer.path))
  }

  fn persist(&self, layer: &Layer) -> Result<(), LayerError> {
    let path = self.metadata_path(&layer.name);
    let write_err = |source| LayerError::Write {
      name: layer.name.clone(),
      path: path.clone(),
      source,
    };

    fs::create_dir_all(&self.root).map_err(write_err)?;

    let content = toml::to_string(&LayerFile::from(layer)).map_err(|e| LayerError::Serialize {
      name: layer.name.clone(),
      message: e.to_string(),
    })?;

    let temp_path = self.root.join(format!("{}.toml.tmp", layer.name));
    fs::write(&temp_path, &content).map_err(write_err)?;
    fs::rename(&temp_path, &path).map_err(write_err)?;

    Ok(())
  }
}
