//! World persistence: file-backed stores for composed grids.
//!
//! # Invariants
//! - Schema versions are checked fail-closed on open.
//! - Payload files are content-hashed; corruption is detected, never
//!   repaired.

mod store;

pub use store::{
    FileStore, Manifest, ManifestEntry, PersistError, StoreMeta, WorldSink, STORE_SCHEMA_VERSION,
};

pub fn crate_info() -> &'static str {
    "stratavox-persist v0.1.0"
}
