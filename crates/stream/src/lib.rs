//! Override streaming: pull-based suppliers of sparse block overrides.
//!
//! # Invariants
//! - A source is pulled one entry at a time; once exhausted it keeps
//!   returning `Ok(None)`.
//! - Entries surface in the source's own order, never reordered or batched.

mod jsonl;
mod source;

pub use jsonl::{JsonlReader, JsonlWriter};
pub use source::{MemorySource, OverrideEntry, OverrideSource, SourceError};

pub fn crate_info() -> &'static str {
    "stratavox-stream v0.1.0"
}
