//! conda-env-lib: Core logic for the conda environment buildpack
//!
//! This crate decides whether a conda environment layer must be rebuilt and,
//! when it must, which `conda` invocation builds it:
//! - `runner::fingerprint`: compares the lockfile digest with the previous build
//! - `runner::strategy`: picks vendored, lockfile or `environment.yml` resolution
//! - `build`: acquires layers, resets and rebuilds, records layer metadata
//! - `detect`: decides whether the buildpack applies to an application at all

pub mod build;
pub mod config;
pub mod consts;
pub mod detect;
pub mod error;
pub mod layer;
pub mod runner;
pub mod util;

pub use build::{BuildContext, BuildResult, Clock, SystemClock, build};
pub use error::{BuildError, ErrorKind};
