//! Running the conda executable.

use std::ffi::{OsStr, OsString};
use std::future::Future;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

/// Number of trailing stderr lines kept in a failure message.
const STDERR_TAIL_LINES: usize = 20;

/// A single invocation of the external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
  pub args: Vec<String>,
  /// The complete environment of the child process.
  pub env: Vec<(OsString, OsString)>,
}

impl Execution {
  /// Build an execution that inherits the current process environment and
  /// appends `overrides` after it.
  pub fn inheriting<K, V>(args: Vec<String>, overrides: impl IntoIterator<Item = (K, V)>) -> Self
  where
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
  {
    let mut env: Vec<(OsString, OsString)> = std::env::vars_os().collect();
    env.extend(
      overrides
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_os_string(), v.as_ref().to_os_string())),
    );
    Self { args, env }
  }

  /// Short name of the subcommand, e.g. `create` or `env update`.
  pub fn command_name(&self) -> String {
    match self.args.first().map(String::as_str) {
      Some("env") => self.args.iter().take(2).cloned().collect::<Vec<_>>().join(" "),
      Some(first) => first.to_string(),
      None => String::new(),
    }
  }

  /// Value of an environment variable as the child will see it.
  ///
  /// Later entries win, matching how the variables are applied at spawn time.
  pub fn env_var(&self, key: &str) -> Option<&OsStr> {
    self
      .env
      .iter()
      .rev()
      .find(|(k, _)| k == key)
      .map(|(_, v)| v.as_os_str())
  }
}

#[derive(Debug, Error)]
pub enum ExecError {
  #[error("failed to spawn {}: {source}", .program.display())]
  Spawn {
    command: String,
    program: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("exited with {}: {stderr}", describe_code(.code))]
  Failed {
    command: String,
    code: Option<i32>,
    stderr: String,
  },
}

impl ExecError {
  pub fn command(&self) -> &str {
    match self {
      ExecError::Spawn { command, .. } | ExecError::Failed { command, .. } => command,
    }
  }
}

fn describe_code(code: &Option<i32>) -> String {
  match code {
    Some(code) => format!("exit code {}", code),
    None => "no exit code (terminated by signal)".to_string(),
  }
}

/// Something that can run an [`Execution`] to completion.
pub trait Executable {
  fn execute(&self, execution: &Execution) -> impl Future<Output = Result<(), ExecError>> + Send;
}

/// The real conda binary.
#[derive(Debug, Clone)]
pub struct CondaExecutable {
  program: PathBuf,
}

impl CondaExecutable {
  pub fn new(program: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
    }
  }

  pub fn program(&self) -> &PathBuf {
    &self.program
  }
}

impl Executable for CondaExecutable {
  async fn execute(&self, execution: &Execution) -> Result<(), ExecError> {
    let command_name = execution.command_name();
    info!(program = %self.program.display(), args = ?execution.args, "running conda");

    let mut command = Command::new(&self.program);
    command
      .args(&execution.args)
      .env_clear()
      .envs(execution.env.iter().map(|(k, v)| (k, v)));

    let output = command.output().await.map_err(|source| ExecError::Spawn {
      command: command_name.clone(),
      program: self.program.clone(),
      source,
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if !stdout.is_empty() {
      debug!(stdout = %stdout, "conda stdout");
    }
    if !stderr.is_empty() {
      debug!(stderr = %stderr, "conda stderr");
    }

    if !output.status.success() {
      return Err(ExecError::Failed {
        command: command_name,
        code: output.status.code(),
        stderr: tail_lines(&stderr, STDERR_TAIL_LINES),
      });
    }

    Ok(())
  }
}

fn tail_lines(text: &str, count: usize) -> String {
  let lines: Vec<&str> = text.trim_end().lines().collect();
  let start = lines.len().saturating_sub(count);
  lines[start..].join("\n")
}
