//! Lockfile digests.
//!
//! [`Summer`] is what the fingerprint comparator depends on; [`FileSummer`]
//! streams a file through SHA-256.

use std::fs;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

/// A full 64-character SHA256 hash of some content.
///
/// # Format
///
/// The hash is a lowercase hexadecimal string (64 characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(pub String);

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Error while hashing a file.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
  #[error("failed to read file {path}: {message}")]
  ReadFile { path: String, message: String },
}

/// Produces a stable digest for the content at a path.
///
/// Identical content must always yield the same digest and any content change
/// must yield a different one. The digest format is otherwise opaque.
pub trait Summer {
  fn sum(&self, path: &Path) -> Result<String, HashError>;
}

/// SHA-256 of a file's contents, as lowercase hex.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSummer;

impl Summer for FileSummer {
  fn sum(&self, path: &Path) -> Result<String, HashError> {
    hash_file(path).map(|hash| hash.0)
  }
}

/// Hash a file's contents.
///
/// Returns the full 64-character SHA256 hash of the file.
pub fn hash_file(path: &Path) -> Result<ContentHash, HashError> {
  let mut file = fs::File::open(path).map_err(|e| HashError::ReadFile {
    path: path.display().to_string(),
    message: e.to_string(),
  })?;

  let mut hasher = Sha256::new();
  let mut buffer = [0u8; 8192];

  loop {
    let bytes_read = file.read(&mut buffer).map_err(|e| HashError::ReadFile {
      path: path.display().to_string(),
      message: e.to_string(),
    })?;
    if bytes_read == 0 {
      break;
    }
    hasher.update(&buffer[..bytes_read]);
  }

  Ok(ContentHash(hex::encode(hasher.finalize())))
}

/// Hash arbitrary bytes.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
  ContentHash(hex::encode(Sha256::digest(data)))
}
