use serde::{Deserialize, Serialize};

/// A placement-ready concrete block value, the world grid's cell type.
///
/// The inner value is the classic numeric block id of the target world
/// format (air 0, stone 1, bedrock 7, and so on). The kernel attaches no
/// meaning to ids beyond identity; translating abstract block kinds into
/// these values is the compositor vocabulary's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Block(pub u8);

impl Block {
    pub const AIR: Block = Block(0);
    pub const STONE: Block = Block(1);
    pub const GRASS: Block = Block(2);
    pub const DIRT: Block = Block(3);
    pub const BEDROCK: Block = Block(7);
    pub const WATER: Block = Block(9);
    pub const SAND: Block = Block(12);
    pub const GRAVEL: Block = Block(13);
    pub const GLASS: Block = Block(20);
}

/// Bulk-fill material used by layer fills.
///
/// Materials are the coarse vocabulary of terrain strata. Each one has
/// exactly one default block representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    Bedrock,
    Stone,
    Dirt,
    Water,
}

impl Material {
    /// The block written for every cell of a bulk fill with this material.
    pub const fn default_block(self) -> Block {
        match self {
            Material::Bedrock => Block::BEDROCK,
            Material::Stone => Block::STONE,
            Material::Dirt => Block::DIRT,
            Material::Water => Block::WATER,
        }
    }
}
