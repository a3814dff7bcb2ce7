//! Layered voxel compositor.
//!
//! A composition run is four ordered phases over one grid: base fill from
//! the layer stack, streamed sparse overrides, procedural directive stamps,
//! then the optional spawn island.
//!
//! # Invariants
//! - Phase order is fixed. Later phases paint over earlier ones, and within
//!   a phase later writes win at the same coordinate.
//! - Every error is fatal to the run; no partially composed grid escapes.

mod cancel;
mod compositor;
mod error;
mod layers;
mod stamp;
mod vocab;

pub use cancel::CancelToken;
pub use compositor::Compositor;
pub use error::{ComposeError, VocabLookup};
pub use layers::LayerStack;
pub use stamp::{Directive, SpawnIsland, StampConfig};
pub use vocab::BlockVocabulary;

pub fn crate_info() -> &'static str {
    "stratavox-compose v0.1.0"
}
