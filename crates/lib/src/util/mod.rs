//! Shared utilities.
//!
//! Content hashing used for lockfile fingerprints, plus test fakes.

pub mod hash;
