//! Lockfile fingerprinting.
//!
//! Decides whether the environment layer is stale by comparing the digest of
//! `package-list.txt` against the digest recorded by the last successful build.

use std::path::Path;

use tracing::debug;

use crate::consts::LOCKFILE_NAME;
use crate::error::BuildError;
use crate::layer::BuildMetadata;
use crate::util::hash::Summer;

/// Outcome of comparing the lockfile against the previous build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
  pub needs_rebuild: bool,
  /// Digest of the lockfile as it is now, or empty when there is none.
  pub fingerprint: String,
}

impl Decision {
  fn rebuild(fingerprint: impl Into<String>) -> Self {
    Self {
      needs_rebuild: true,
      fingerprint: fingerprint.into(),
    }
  }

  fn reuse(fingerprint: impl Into<String>) -> Self {
    Self {
      needs_rebuild: false,
      fingerprint: fingerprint.into(),
    }
  }
}

/// Decide whether `working_dir` needs its environment rebuilt.
///
/// Without a lockfile there is nothing to compare, so a rebuild is always
/// required. The returned fingerprint always reflects the current lockfile,
/// whether or not it matches.
pub fn decide<S: Summer + ?Sized>(
  working_dir: &Path,
  prior: &BuildMetadata,
  summer: &S,
) -> Result<Decision, BuildError> {
  let lockfile = working_dir.join(LOCKFILE_NAME);

  let exists = lockfile
    .try_exists()
    .map_err(|e| BuildError::filesystem(&lockfile, e))?;
  if !exists {
    debug!(path = %lockfile.display(), "no lockfile, rebuild required");
    return Ok(Decision::rebuild(""));
  }

  let fingerprint = summer.sum(&lockfile).map_err(|e| BuildError::hash(&lockfile, e))?;

  if prior.lockfile_sha.as_deref() == Some(fingerprint.as_str()) {
    debug!(sha = %fingerprint, "lockfile unchanged");
    return Ok(Decision::reuse(fingerprint));
  }

  debug!(
    sha = %fingerprint,
    previous = prior.lockfile_sha.as_deref().unwrap_or(""),
    "lockfile changed"
  );
  Ok(Decision::rebuild(fingerprint))
}
