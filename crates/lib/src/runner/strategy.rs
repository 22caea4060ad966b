//! Choosing how conda builds the environment.
//!
//! | lockfile | vendor/ | command                                                       |
//! |----------|---------|---------------------------------------------------------------|
//! | any      | yes     | `create --file <lockfile> ... --channel vendor --offline`     |
//! | yes      | no      | `create --file <lockfile> --prefix <env> --yes --quiet`       |
//! | no       | no      | `env update --prefix <env> --file environment.yml`            |

use std::fmt;
use std::path::{Path, PathBuf};

use crate::consts::{ENVIRONMENT_FILE_NAME, LOCKFILE_NAME, VENDOR_DIR_NAME};
use crate::error::BuildError;

/// What the working directory contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evidence {
  pub vendor_dir: bool,
  pub lockfile: bool,
}

impl Evidence {
  /// Inspect `working_dir`, checking the vendor directory first.
  pub fn inspect(working_dir: &Path) -> Result<Self, BuildError> {
    let vendor_dir = exists(&working_dir.join(VENDOR_DIR_NAME))?;
    let lockfile = exists(&working_dir.join(LOCKFILE_NAME))?;
    Ok(Self { vendor_dir, lockfile })
  }
}

fn exists(path: &Path) -> Result<bool, BuildError> {
  path.try_exists().map_err(|e| BuildError::filesystem(path, e))
}

/// One of the mutually exclusive ways of building the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
  /// `conda create` from the lockfile, optionally resolving offline against
  /// the vendored channel.
  ///
  /// With a vendor directory but no lockfile the `--file` argument is still
  /// passed; conda then fails on the missing file rather than silently
  /// resolving online.
  Create { lockfile: PathBuf, vendor: Option<PathBuf> },
  /// `conda env update` from `environment.yml`.
  UpdateFromSpec { spec_file: PathBuf },
}

impl Strategy {
  /// Pick the strategy for `working_dir` given what it contains.
  pub fn select(working_dir: &Path, evidence: Evidence) -> Self {
    if evidence.vendor_dir || evidence.lockfile {
      Strategy::Create {
        lockfile: working_dir.join(LOCKFILE_NAME),
        vendor: evidence.vendor_dir.then(|| working_dir.join(VENDOR_DIR_NAME)),
      }
    } else {
      Strategy::UpdateFromSpec {
        spec_file: working_dir.join(ENVIRONMENT_FILE_NAME),
      }
    }
  }

  /// conda arguments that build the environment at `env_path`.
  pub fn args(&self, env_path: &Path) -> Vec<String> {
    match self {
      Strategy::Create { lockfile, vendor } => {
        let mut args = vec![
          "create".to_string(),
          "--file".to_string(),
          path_arg(lockfile),
          "--prefix".to_string(),
          path_arg(env_path),
          "--yes".to_string(),
          "--quiet".to_string(),
        ];
        if let Some(vendor) = vendor {
          args.extend([
            "--channel".to_string(),
            path_arg(vendor),
            "--override-channels".to_string(),
            "--offline".to_string(),
          ]);
        }
        args
      }
      Strategy::UpdateFromSpec { spec_file } => vec![
        "env".to_string(),
        "update".to_string(),
        "--prefix".to_string(),
        path_arg(env_path),
        "--file".to_string(),
        path_arg(spec_file),
      ],
    }
  }
}

impl fmt::Display for Strategy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Strategy::Create { vendor: Some(_), .. } => write!(f, "create from lockfile (vendored, offline)"),
      Strategy::Create { vendor: None, .. } => write!(f, "create from lockfile"),
      Strategy::UpdateFromSpec { .. } => write!(f, "update from {}", ENVIRONMENT_FILE_NAME),
    }
  }
}

fn path_arg(path: &Path) -> String {
  path.to_string_lossy().into_owned()
}
