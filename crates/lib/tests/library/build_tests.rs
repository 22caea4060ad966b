//! End-to-end builds through `FsLayers`, `CondaRunner` and a stub conda.

use std::fs;

use conda_env_lib::ErrorKind;
use conda_env_lib::consts::{CACHE_LAYER_NAME, ENV_LAYER_NAME};
use conda_env_lib::layer::{BuildMetadata, LayerStore};
use conda_env_lib::util::hash::hash_bytes;

use super::common::TestEnv;

#[tokio::test]
async fn environment_file_runs_env_update() {
  let env = TestEnv::new();
  env.write_file("environment.yml", "name: app\ndependencies:\n  - python\n");

  let result = env.build().await.unwrap();

  let env_layer = env.layers_dir().join(ENV_LAYER_NAME);
  assert_eq!(
    env.conda_calls(),
    vec![format!(
      "env update --prefix {} --file {}",
      env_layer.display(),
      env.working_dir().join("environment.yml").display()
    )]
  );
  assert_eq!(
    env.conda_pkgs_dirs(),
    vec![env.layers_dir().join(CACHE_LAYER_NAME).display().to_string()]
  );

  assert!(result.rebuilt);
  assert!(env_layer.join("conda-meta-marker").exists());

  let stored = env.layers().get(ENV_LAYER_NAME).unwrap();
  assert_eq!(stored.metadata, BuildMetadata::new(env.clock().0, ""));
}

#[tokio::test]
async fn lockfile_runs_create_and_records_sha() {
  let env = TestEnv::new();
  env.write_file("package-list.txt", "numpy=1.0");

  let result = env.build().await.unwrap();

  let expected_sha = hash_bytes(b"numpy=1.0").0;
  assert_eq!(
    env.conda_calls(),
    vec![format!(
      "create --file {} --prefix {} --yes --quiet",
      env.working_dir().join("package-list.txt").display(),
      env.layers_dir().join(ENV_LAYER_NAME).display()
    )]
  );
  assert_eq!(result.fingerprint, expected_sha);
  assert_eq!(
    env.layers().get(ENV_LAYER_NAME).unwrap().metadata.lockfile_sha,
    Some(expected_sha)
  );
}

#[tokio::test]
async fn unchanged_lockfile_runs_conda_once() {
  let env = TestEnv::new();
  env.write_file("package-list.txt", "numpy=1.0");

  let first = env.build().await.unwrap();
  let metadata_after_first = env.layers().get(ENV_LAYER_NAME).unwrap().metadata;

  let second = env.build().await.unwrap();
  let metadata_after_second = env.layers().get(ENV_LAYER_NAME).unwrap().metadata;

  assert_eq!(env.conda_calls().len(), 1);
  assert!(first.rebuilt);
  assert!(!second.rebuilt);
  assert_eq!(first.fingerprint, second.fingerprint);
  assert_eq!(metadata_after_first, metadata_after_second);

  let env_layer = second.layer(ENV_LAYER_NAME).unwrap();
  let cache_layer = second.layer(CACHE_LAYER_NAME).unwrap();
  assert!(env_layer.launch);
  assert!(cache_layer.cache);
  assert!(env_layer.path.join("conda-meta-marker").exists());
}

#[tokio::test]
async fn changed_lockfile_rebuilds() {
  let env = TestEnv::new();
  env.write_file("package-list.txt", "numpy=1.0");
  env.build().await.unwrap();

  env.write_file("package-list.txt", "numpy=1.1");
  let result = env.build().await.unwrap();

  assert!(result.rebuilt);
  assert_eq!(env.conda_calls().len(), 2);
  assert_eq!(result.fingerprint, hash_bytes(b"numpy=1.1").0);
}

#[tokio::test]
async fn missing_lockfile_rebuilds_every_time() {
  let env = TestEnv::new();
  env.write_file("environment.yml", "name: app\n");

  env.build().await.unwrap();
  env.build().await.unwrap();

  assert_eq!(env.conda_calls().len(), 2);
}

#[tokio::test]
async fn vendor_dir_and_lockfile_pass_both_argument_sets() {
  let env = TestEnv::new();
  env.write_file("package-list.txt", "numpy=1.0");
  env.create_dir("vendor");

  env.build().await.unwrap();

  assert_eq!(
    env.conda_calls(),
    vec![format!(
      "create --file {} --prefix {} --yes --quiet --channel {} --override-channels --offline",
      env.working_dir().join("package-list.txt").display(),
      env.layers_dir().join(ENV_LAYER_NAME).display(),
      env.working_dir().join("vendor").display()
    )]
  );
}

#[tokio::test]
async fn rebuild_discards_previous_environment() {
  let env = TestEnv::new();
  env.write_file("environment.yml", "name: app\n");
  let stale = env.layers_dir().join(ENV_LAYER_NAME).join("stale-file");
  fs::create_dir_all(stale.parent().unwrap()).unwrap();
  fs::write(&stale, "old").unwrap();

  env.build().await.unwrap();

  assert!(!stale.exists());
}

#[tokio::test]
async fn reset_failure_aborts_before_conda() {
  let env = TestEnv::new();
  env.write_file("package-list.txt", "numpy=1.0");
  // A regular file where the layer directory should be cannot be reset.
  fs::write(env.layers_dir().join(ENV_LAYER_NAME), "").unwrap();

  let err = env.build().await.unwrap_err();

  assert_eq!(err.kind(), ErrorKind::FilesystemAccess);
  assert!(env.conda_calls().is_empty());
  assert!(!env.layers_dir().join(format!("{}.toml", ENV_LAYER_NAME)).exists());
}

#[tokio::test]
async fn conda_failure_records_no_metadata() {
  let env = TestEnv::with_exit_code(1);
  env.write_file("package-list.txt", "numpy=1.0");

  let err = env.build().await.unwrap_err();

  assert_eq!(err.kind(), ErrorKind::ExternalToolFailure);
  assert!(err.to_string().contains("stub conda failure"));
  assert_eq!(env.conda_calls().len(), 1);
  assert!(env.layers().get(ENV_LAYER_NAME).unwrap().metadata.is_empty());
}
