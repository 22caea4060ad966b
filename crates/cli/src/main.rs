mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{cmd_build, cmd_detect, cmd_status};

/// Exit code the lifecycle reads as "this buildpack does not apply".
const DETECT_FAIL_CODE: u8 = 100;

/// conda-env-update - Cloud Native Buildpack for conda environments
#[derive(Parser)]
#[command(name = "conda-env-update")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Check whether the application declares a conda environment
  Detect {
    /// Application directory (default: $CNB_APP_DIR or the current directory)
    #[arg(long)]
    working_dir: Option<PathBuf>,

    /// Write the build plan to this path when detection passes
    #[arg(long)]
    plan: Option<PathBuf>,
  },

  /// Build or reuse the conda environment layer
  Build {
    /// Application directory (default: $CNB_APP_DIR or the current directory)
    #[arg(long)]
    working_dir: Option<PathBuf>,

    /// Layers directory (default: $CNB_LAYERS_DIR)
    #[arg(long)]
    layers: Option<PathBuf>,
  },

  /// Show what the last build recorded on the environment layer
  Status {
    /// Layers directory (default: $CNB_LAYERS_DIR)
    #[arg(long)]
    layers: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long)]
    json: bool,
  },
}

fn main() -> Result<ExitCode> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::Detect { working_dir, plan } => {
      if cmd_detect(working_dir, plan)? {
        Ok(ExitCode::SUCCESS)
      } else {
        Ok(ExitCode::from(DETECT_FAIL_CODE))
      }
    }
    Commands::Build { working_dir, layers } => {
      cmd_build(working_dir, layers)?;
      Ok(ExitCode::SUCCESS)
    }
    Commands::Status { layers, json } => {
      cmd_status(layers, json, cli.verbose)?;
      Ok(ExitCode::SUCCESS)
    }
  }
}
