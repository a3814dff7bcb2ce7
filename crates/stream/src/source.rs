use serde::{Deserialize, Serialize};
use stratavox_common::{BlockKind, BlockPos};

/// One sparse override pulled from a source: place `kind` at `pos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEntry {
    pub pos: BlockPos,
    pub kind: BlockKind,
}

/// Errors raised while pulling entries from an override source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("override stream i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed override entry on line {line}: {message}")]
    Malformed { line: u64, message: String },
}

/// Pull-based supplier of sparse block overrides.
///
/// A source is drained by repeated [`next_entry`](OverrideSource::next_entry)
/// calls; `Ok(None)` marks the end of the stream and stays `Ok(None)` on
/// further calls. Entries surface in the source's own order, and consumers
/// apply them in that order.
pub trait OverrideSource {
    fn next_entry(&mut self) -> Result<Option<OverrideEntry>, SourceError>;
}

impl<S: OverrideSource + ?Sized> OverrideSource for Box<S> {
    fn next_entry(&mut self) -> Result<Option<OverrideEntry>, SourceError> {
        (**self).next_entry()
    }
}

/// In-memory source over a fixed list of entries, for tests and programmatic
/// composition.
#[derive(Debug)]
pub struct MemorySource {
    entries: std::vec::IntoIter<OverrideEntry>,
}

impl MemorySource {
    pub fn new(entries: Vec<OverrideEntry>) -> Self {
        Self {
            entries: entries.into_iter(),
        }
    }
}

impl OverrideSource for MemorySource {
    fn next_entry(&mut self) -> Result<Option<OverrideEntry>, SourceError> {
        Ok(self.entries.next())
    }
}
