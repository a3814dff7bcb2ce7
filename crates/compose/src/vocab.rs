use stratavox_common::BlockKind;
use stratavox_kernel::{Block, Material};

use crate::error::{ComposeError, VocabLookup};

/// Static translation table from abstract block kinds to bulk-fill materials
/// and placement-ready blocks.
///
/// The table is exhaustive over the kinds the target format supports. Kinds
/// deliberately left unmapped raise [`ComposeError::UnsupportedBlockKind`]
/// instead of defaulting to something plausible.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockVocabulary;

impl BlockVocabulary {
    pub const fn new() -> Self {
        Self
    }

    /// Bulk-fill material for a layer of `kind`.
    ///
    /// Only the strata kinds carry a material; any other kind showing up in a
    /// layer is a configuration error.
    pub fn material_for(&self, kind: BlockKind) -> Result<Material, ComposeError> {
        match kind {
            BlockKind::UnbreakableStone => Ok(Material::Bedrock),
            BlockKind::Stone => Ok(Material::Stone),
            BlockKind::Soil => Ok(Material::Dirt),
            BlockKind::Water => Ok(Material::Water),
            other => Err(ComposeError::UnsupportedBlockKind {
                kind: other,
                lookup: VocabLookup::Material,
            }),
        }
    }

    /// Placement-ready block for a point override of `kind`.
    ///
    /// [`BlockKind::None`] means "leave the cell untouched" and yields
    /// `Ok(None)`, which is not the same thing as writing an air block.
    /// Wood has no counterpart in the target format and fails the lookup.
    pub fn block_for(&self, kind: BlockKind) -> Result<Option<Block>, ComposeError> {
        match kind {
            BlockKind::None => Ok(None),
            BlockKind::Stone => Ok(Some(Block::STONE)),
            BlockKind::Soil => Ok(Some(Block::DIRT)),
            BlockKind::Water => Ok(Some(Block::WATER)),
            BlockKind::SoilWithGrass => Ok(Some(Block::GRASS)),
            BlockKind::Sand => Ok(Some(Block::SAND)),
            BlockKind::Gravel => Ok(Some(Block::GRAVEL)),
            BlockKind::Glass => Ok(Some(Block::GLASS)),
            BlockKind::Air => Ok(Some(Block::AIR)),
            BlockKind::UnbreakableStone => Ok(Some(Block::BEDROCK)),
            BlockKind::Wood => Err(ComposeError::UnsupportedBlockKind {
                kind,
                lookup: VocabLookup::Block,
            }),
        }
    }
}
