use std::fmt;

use serde::{Deserialize, Serialize};
use stratavox_common::BlockPos;

use crate::block::{Block, Material};

/// Errors raised by world grid writes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("position {pos} is outside grid bounds {bounds}")]
    OutOfBounds { pos: BlockPos, bounds: GridBounds },
}

/// Axis-aligned grid extent, minimum inclusive and maximum exclusive on
/// every axis.
///
/// The ordering invariant holds for deserialized values too; an inverted
/// extent in a config file is a parse error, not a later panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BoundsWire", into = "BoundsWire")]
pub struct GridBounds {
    min: BlockPos,
    max: BlockPos,
}

#[derive(Serialize, Deserialize)]
struct BoundsWire {
    min: BlockPos,
    max: BlockPos,
}

impl From<GridBounds> for BoundsWire {
    fn from(bounds: GridBounds) -> Self {
        Self {
            min: bounds.min,
            max: bounds.max,
        }
    }
}

impl TryFrom<BoundsWire> for GridBounds {
    type Error = String;

    fn try_from(wire: BoundsWire) -> Result<Self, String> {
        if ordered(wire.min, wire.max) {
            Ok(Self {
                min: wire.min,
                max: wire.max,
            })
        } else {
            Err(format!(
                "grid bounds min {} must not exceed max {}",
                wire.min, wire.max
            ))
        }
    }
}

fn ordered(min: BlockPos, max: BlockPos) -> bool {
    min.x <= max.x && min.y <= max.y && min.z <= max.z
}

impl GridBounds {
    /// Bounds from an inclusive minimum corner and an exclusive maximum
    /// corner.
    ///
    /// # Panics
    /// Panics if `max` is below `min` on any axis.
    pub fn new(min: BlockPos, max: BlockPos) -> Self {
        assert!(
            ordered(min, max),
            "grid bounds min {min} must not exceed max {max}"
        );
        Self { min, max }
    }

    pub fn min(&self) -> BlockPos {
        self.min
    }

    pub fn max(&self) -> BlockPos {
        self.max
    }

    pub fn contains(&self, pos: BlockPos) -> bool {
        pos.x >= self.min.x
            && pos.x < self.max.x
            && pos.y >= self.min.y
            && pos.y < self.max.y
            && pos.z >= self.min.z
            && pos.z < self.max.z
    }

    pub fn size_x(&self) -> u32 {
        (self.max.x - self.min.x) as u32
    }

    pub fn size_y(&self) -> u32 {
        (self.max.y - self.min.y) as u32
    }

    pub fn size_z(&self) -> u32 {
        (self.max.z - self.min.z) as u32
    }

    /// Number of cells covered by these bounds.
    pub fn volume(&self) -> u64 {
        u64::from(self.size_x()) * u64::from(self.size_y()) * u64::from(self.size_z())
    }
}

impl fmt::Display for GridBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{})", self.min, self.max)
    }
}

/// Dense voxel buffer holding the final per-coordinate block state.
///
/// A grid is the single mutable entity of a composition run: allocated once
/// with every cell set to air, then mutated through [`WorldGrid::fill_y_range`]
/// and [`WorldGrid::set_block`]. The only read guarantee is that the most
/// recent write to a coordinate is the value later reads observe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldGrid {
    bounds: GridBounds,
    cells: Vec<Block>,
}

impl WorldGrid {
    /// Allocate a grid covering `bounds`, every cell initialized to air.
    pub fn new(bounds: GridBounds) -> Self {
        let cells = vec![Block::AIR; bounds.volume() as usize];
        Self { bounds, cells }
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Caller must have checked `contains` first.
    fn index_of(&self, pos: BlockPos) -> usize {
        let dx = (pos.x - self.bounds.min.x) as usize;
        let dy = (pos.y - self.bounds.min.y) as usize;
        let dz = (pos.z - self.bounds.min.z) as usize;
        (dy * self.bounds.size_z() as usize + dz) * self.bounds.size_x() as usize + dx
    }

    /// Overwrite exactly one cell.
    pub fn set_block(&mut self, pos: BlockPos, block: Block) -> Result<(), GridError> {
        if !self.bounds.contains(pos) {
            return Err(GridError::OutOfBounds {
                pos,
                bounds: self.bounds,
            });
        }
        let idx = self.index_of(pos);
        self.cells[idx] = block;
        Ok(())
    }

    /// Read one cell, or `None` outside the allocated extent.
    pub fn block_at(&self, pos: BlockPos) -> Option<Block> {
        if !self.bounds.contains(pos) {
            return None;
        }
        Some(self.cells[self.index_of(pos)])
    }

    /// Set every cell whose y-coordinate lies in `[y_min, y_max)` to the
    /// material's default block, across the grid's full horizontal extent.
    ///
    /// The span is intersected with the grid's own vertical extent; an empty
    /// or inverted span writes nothing. Prior contents are overwritten
    /// unconditionally.
    pub fn fill_y_range(&mut self, y_min: i32, y_max: i32, material: Material) {
        let lo = y_min.max(self.bounds.min.y);
        let hi = y_max.min(self.bounds.max.y);
        if lo >= hi {
            return;
        }
        let block = material.default_block();
        // One y-slice is contiguous in the cell buffer.
        let slice_len = self.bounds.size_x() as usize * self.bounds.size_z() as usize;
        for y in lo..hi {
            let start = (y - self.bounds.min.y) as usize * slice_len;
            self.cells[start..start + slice_len].fill(block);
        }
    }

    /// Top-most non-air cell in the column at `(x, z)`, if any.
    pub fn highest_block_y(&self, x: i32, z: i32) -> Option<i32> {
        if x < self.bounds.min.x
            || x >= self.bounds.max.x
            || z < self.bounds.min.z
            || z >= self.bounds.max.z
        {
            return None;
        }
        (self.bounds.min.y..self.bounds.max.y)
            .rev()
            .find(|&y| {
                self.block_at(BlockPos::new(x, y, z))
                    .is_some_and(|b| b != Block::AIR)
            })
    }

    /// Number of cells holding anything other than air.
    pub fn non_air_blocks(&self) -> u64 {
        self.cells.iter().filter(|&&b| b != Block::AIR).count() as u64
    }
}
