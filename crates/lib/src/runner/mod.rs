//! Deciding whether to run conda, and running it.
//!
//! # Submodules
//!
//! - [`fingerprint`] - Lockfile change detection
//! - [`strategy`] - Selecting the conda invocation from the working directory
//! - [`exec`] - Spawning the conda process

pub mod exec;
pub mod fingerprint;
pub mod strategy;

use std::future::Future;
use std::path::Path;

use tracing::{info, warn};

use crate::consts::CONDA_PKGS_DIRS_VAR;
use crate::error::BuildError;
use crate::layer::BuildMetadata;
use crate::util::hash::Summer;

use exec::{Executable, Execution};
pub use fingerprint::Decision;
use strategy::{Evidence, Strategy};

/// The two operations the build orchestrator needs from a runner.
pub trait Runner {
  /// Whether the environment must be rebuilt, and the current lockfile digest.
  fn should_run(&self, working_dir: &Path, metadata: &BuildMetadata) -> Result<Decision, BuildError>;

  /// Build the environment into `env_path`, using `cache_path` as conda's package cache.
  fn execute(
    &self,
    env_path: &Path,
    cache_path: &Path,
    working_dir: &Path,
  ) -> impl Future<Output = Result<(), BuildError>> + Send;
}

/// Runner backed by a conda executable and a file summer.
#[derive(Debug, Clone)]
pub struct CondaRunner<E, S> {
  executable: E,
  summer: S,
}

impl<E, S> CondaRunner<E, S> {
  pub fn new(executable: E, summer: S) -> Self {
    Self { executable, summer }
  }

  pub fn executable(&self) -> &E {
    &self.executable
  }
}

impl<E, S> Runner for CondaRunner<E, S>
where
  E: Executable + Sync,
  S: Summer + Sync,
{
  fn should_run(&self, working_dir: &Path, metadata: &BuildMetadata) -> Result<Decision, BuildError> {
    fingerprint::decide(working_dir, metadata, &self.summer)
  }

  async fn execute(&self, env_path: &Path, cache_path: &Path, working_dir: &Path) -> Result<(), BuildError> {
    let evidence = Evidence::inspect(working_dir)?;
    if evidence.vendor_dir && !evidence.lockfile {
      warn!(
        working_dir = %working_dir.display(),
        "vendor directory without package-list.txt, conda will not find the lockfile"
      );
    }
    let strategy = Strategy::select(working_dir, evidence);
    info!(%strategy, vendor_dir = evidence.vendor_dir, lockfile = evidence.lockfile, "selected build strategy");

    let execution = Execution::inheriting(strategy.args(env_path), [(CONDA_PKGS_DIRS_VAR, cache_path)]);
    self.executable.execute(&execution).await?;

    Ok(())
  }
}
