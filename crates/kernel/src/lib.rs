//! World grid kernel: the authoritative dense voxel state.
//!
//! # Invariants
//! - All mutation flows through explicit grid operations; the most recent
//!   write to a coordinate is the value later reads observe.
//! - Bulk fills are intersected with the grid's extent; point writes outside
//!   it are errors, never silent drops.

pub mod block;
pub mod grid;

pub use block::{Block, Material};
pub use grid::{GridBounds, GridError, WorldGrid};
