use serde::{Deserialize, Serialize};
use std::fmt;

/// A block coordinate in world space.
///
/// X increases towards east, Y towards the sky, Z towards south; one unit is
/// one block edge. The position names the lower north-west corner of the
/// block. No range restriction is imposed here; whether a position is
/// addressable is the world grid's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Abstract block category, as used by layer models and override streams.
///
/// `None` is the non-destructive marker: an override of kind `None` leaves
/// the underlying cell untouched. That is not the same as `Air`, which
/// actively clears a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    None,
    Stone,
    Soil,
    Water,
    Wood,
    SoilWithGrass,
    Sand,
    Gravel,
    Glass,
    Air,
    UnbreakableStone,
}

/// A horizontal stratum of uniform block kind spanning the half-open
/// vertical range `[y_min, y_max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub kind: BlockKind,
    pub y_min: i32,
    pub y_max: i32,
}

impl Layer {
    pub const fn new(kind: BlockKind, y_min: i32, y_max: i32) -> Self {
        Self { kind, y_min, y_max }
    }
}

/// World generator selection. Only the flat-from-layers variant exists
/// today; the enum leaves room for future generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    Flat,
}

/// Game mode recorded in the world metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Creative,
}

/// World metadata passed through untouched to the persistence adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldMeta {
    pub world_name: String,
    pub generator: GeneratorKind,
    pub game_mode: GameMode,
    pub spawn_pos: BlockPos,
    pub generate_structures: bool,
}
