//! Shared helpers for library integration tests.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use conda_env_lib::build::{BuildpackInfo, FixedClock};
use conda_env_lib::layer::FsLayers;
use conda_env_lib::runner::CondaRunner;
use conda_env_lib::runner::exec::CondaExecutable;
use conda_env_lib::util::hash::FileSummer;
use conda_env_lib::{BuildContext, BuildError, BuildResult, build};

/// Isolated app + layers + stub conda.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Create an environment whose stub conda exits with `exit_code`.
  pub fn with_exit_code(exit_code: i32) -> Self {
    let temp = TempDir::new().unwrap();
    let env = Self { temp };
    fs::create_dir_all(env.working_dir()).unwrap();
    fs::create_dir_all(env.layers_dir()).unwrap();
    env.write_stub(exit_code);
    env
  }

  pub fn new() -> Self {
    Self::with_exit_code(0)
  }

  pub fn working_dir(&self) -> PathBuf {
    self.temp.path().join("app")
  }

  pub fn layers_dir(&self) -> PathBuf {
    self.temp.path().join("layers")
  }

  fn stub_path(&self) -> PathBuf {
    self.temp.path().join("conda")
  }

  fn record_path(&self) -> PathBuf {
    self.temp.path().join("conda-calls.txt")
  }

  /// Writes a fake conda that appends its arguments and `CONDA_PKGS_DIRS`
  /// to a record file and drops a marker into the `--prefix` directory.
  fn write_stub(&self, exit_code: i32) {
    let record = self.record_path();
    let script = format!(
      r#"#!/bin/sh
printf '%s\n' "$*" >> '{record}'
printf '%s\n' "$CONDA_PKGS_DIRS" >> '{record}.pkgs'
while [ $# -gt 0 ]; do
  if [ "$1" = "--prefix" ]; then touch "$2/conda-meta-marker"; fi
  shift
done
echo "stub conda failure" >&2
exit {exit_code}
"#,
      record = record.display(),
      exit_code = exit_code,
    );
    let stub = self.stub_path();
    fs::write(&stub, script).unwrap();
    fs::set_permissions(&stub, fs::Permissions::from_mode(0o755)).unwrap();
  }

  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.working_dir().join(relative_path);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
  }

  pub fn create_dir(&self, relative_path: &str) {
    fs::create_dir_all(self.working_dir().join(relative_path)).unwrap();
  }

  /// Argument lines conda was called with, one per invocation.
  pub fn conda_calls(&self) -> Vec<String> {
    read_lines(&self.record_path())
  }

  /// `CONDA_PKGS_DIRS` as seen by each invocation.
  pub fn conda_pkgs_dirs(&self) -> Vec<String> {
    read_lines(&self.record_path().with_extension("txt.pkgs"))
  }

  pub fn layers(&self) -> FsLayers {
    FsLayers::new(self.layers_dir())
  }

  pub fn context(&self) -> BuildContext {
    BuildContext::new(
      self.working_dir(),
      BuildpackInfo {
        name: "Conda Env Update".to_string(),
        version: "0.0.0-test".to_string(),
      },
    )
  }

  pub fn clock(&self) -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap())
  }

  /// Run a build and persist its layers, as the lifecycle would.
  pub async fn build(&self) -> Result<BuildResult, BuildError> {
    let layers = self.layers();
    let runner = CondaRunner::new(CondaExecutable::new(self.stub_path()), FileSummer);
    let result = build(&self.context(), &layers, &runner, &self.clock()).await?;
    result.persist(&layers)?;
    Ok(result)
  }
}

fn read_lines(path: &Path) -> Vec<String> {
  match fs::read_to_string(path) {
    Ok(content) => content.lines().map(str::to_string).collect(),
    Err(_) => Vec::new(),
  }
}
