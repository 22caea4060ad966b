//! Library integration tests: full builds against real layer directories with
//! a stub conda executable.

#![cfg(unix)]

mod build_tests;
mod common;
