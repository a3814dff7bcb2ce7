//! Shared value types for the stratavox world compositor.
//!
//! # Invariants
//! - All types here are plain serde-friendly values with no behavior beyond
//!   construction and display; policy lives in the crates that consume them.

pub mod types;

pub use types::{BlockKind, BlockPos, GameMode, GeneratorKind, Layer, WorldMeta};
