//! Build orchestration.
//!
//! A build acquires the environment and cache layers, asks the runner whether
//! the environment is stale, rebuilds it if so, and returns both layers with
//! their lifecycle flags set:
//!
//! ```text
//! Start -> LayersAcquired -> Decided -> (Reused | Rebuilt) -> Finalized
//! ```
//!
//! The environment layer is reset only immediately before conda runs, and its
//! metadata is replaced only after conda succeeds. The cache layer is never
//! reset; conda owns its contents.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::consts::{CACHE_LAYER_NAME, ENV_LAYER_NAME};
use crate::error::BuildError;
use crate::layer::{BuildMetadata, Layer, LayerStore};
use crate::runner::Runner;

/// Source of the `built_at` timestamp.
pub trait Clock {
  fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Utc> {
    self.0
  }
}

/// Name and version of the running buildpack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildpackInfo {
  pub name: String,
  pub version: String,
}

/// Inputs of a single build.
#[derive(Debug, Clone)]
pub struct BuildContext {
  pub working_dir: PathBuf,
  pub buildpack: BuildpackInfo,
}

/// Layers produced by a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
  /// The environment layer followed by the cache layer.
  pub layers: Vec<Layer>,
  /// Whether conda ran during this build.
  pub rebuilt: bool,
  /// Current lockfile digest, empty without a lockfile.
  pub fingerprint: String,
}

impl BuildResult {
  pub fn layer(&self, name: &str) -> Option<&Layer> {
    self.layers.iter().find(|layer| layer.name == name)
  }

  /// Persist every layer so the lifecycle and the next build can see them.
  pub fn persist<L: LayerStore + ?Sized>(&self, store: &L) -> Result<(), BuildError> {
    for layer in &self.layers {
      store.persist(layer)?;
    }
    Ok(())
  }
}

/// Run one build of the conda environment.
///
/// # Errors
///
/// Every failure aborts the build; nothing is retried. When conda fails the
/// environment layer has already been reset, which discards its recorded
/// metadata as well, so the next build rebuilds whatever the lockfile holds.
pub async fn build<L, R, C>(context: &BuildContext, layers: &L, runner: &R, clock: &C) -> Result<BuildResult, BuildError>
where
  L: LayerStore + ?Sized,
  R: Runner,
  C: Clock + ?Sized,
{
  info!(
    buildpack = %context.buildpack.name,
    version = %context.buildpack.version,
    working_dir = %context.working_dir.display(),
    "starting build"
  );

  let mut env_layer = layers.get(ENV_LAYER_NAME)?;
  let mut cache_layer = layers.get(CACHE_LAYER_NAME)?;

  let decision = runner.should_run(&context.working_dir, &env_layer.metadata)?;

  if decision.needs_rebuild {
    info!(sha = %decision.fingerprint, "executing build process");
    env_layer = layers.reset(env_layer)?;

    runner
      .execute(&env_layer.path, &cache_layer.path, &context.working_dir)
      .await?;

    env_layer.metadata = BuildMetadata::new(clock.now(), decision.fingerprint.clone());
  } else {
    info!(sha = %decision.fingerprint, layer = %env_layer.name, "reusing cached layer");
  }

  cache_layer.cache = true;
  env_layer.launch = true;

  Ok(BuildResult {
    layers: vec![env_layer, cache_layer],
    rebuilt: decision.needs_rebuild,
    fingerprint: decision.fingerprint,
  })
}

impl BuildContext {
  pub fn new(working_dir: impl AsRef<Path>, buildpack: BuildpackInfo) -> Self {
    Self {
      working_dir: working_dir.as_ref().to_path_buf(),
      buildpack,
    }
  }
}
