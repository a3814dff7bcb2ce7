use std::fmt;

use stratavox_common::BlockKind;
use stratavox_kernel::GridError;
use stratavox_stream::SourceError;

/// Which vocabulary table a failed lookup went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VocabLookup {
    Material,
    Block,
}

impl fmt::Display for VocabLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VocabLookup::Material => "material",
            VocabLookup::Block => "block",
        })
    }
}

/// Errors that abort a composition run.
///
/// Every variant is fatal to the run in progress. The grid under construction
/// is discarded, never handed to persistence half-finished.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("layer model is empty; at least one layer is required")]
    NoLayersDefined,
    #[error("block kind {kind:?} has no {lookup} mapping")]
    UnsupportedBlockKind { kind: BlockKind, lookup: VocabLookup },
    #[error(transparent)]
    OutOfBounds(#[from] GridError),
    #[error("override stream failed: {0}")]
    OverrideStream(#[from] SourceError),
    #[error("composition cancelled")]
    Cancelled,
}
