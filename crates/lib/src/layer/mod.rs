//! Layers: directories managed by the buildpack lifecycle.
//!
//! A layer is a directory under the lifecycle's layers root with a sibling
//! `<name>.toml` holding its type flags and free-form metadata. Layers are
//! handled as plain values; acquiring, resetting and persisting them goes
//! through the [`LayerStore`] port so the build orchestrator never touches the
//! filesystem layout directly.
//!
//! # Submodules
//!
//! - [`store`] - The `LayerStore` port and the filesystem-backed `FsLayers`

pub mod store;
mod types;

pub use store::{FsLayers, LayerStore};
pub use types::*;
