//! File-backed world persistence.
//!
//! Layout inside a store directory:
//! ```text
//! world.meta.json - world metadata, grid bounds, schema version
//! grid.cbor.zst   - CBOR+zstd compressed dense grid
//! manifest.json   - per-file sha256 manifest
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use stratavox_common::WorldMeta;
use stratavox_kernel::{GridBounds, WorldGrid};

/// Current store schema version.
pub const STORE_SCHEMA_VERSION: u32 = 1;

const META_FILE: &str = "world.meta.json";
const GRID_FILE: &str = "grid.cbor.zst";
const MANIFEST_FILE: &str = "manifest.json";

/// Errors from file-backed persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CBOR serialization error: {0}")]
    CborEncode(String),
    #[error("CBOR deserialization error: {0}")]
    CborDecode(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },
    #[error("schema version mismatch: file has v{file_version}, expected v{expected_version}")]
    SchemaMismatch {
        file_version: u32,
        expected_version: u32,
    },
    #[error("no world store at {}", .0.display())]
    NotAStore(PathBuf),
}

/// Metadata stored in world.meta.json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreMeta {
    pub schema_version: u32,
    pub world: WorldMeta,
    pub bounds: GridBounds,
    pub non_air_blocks: u64,
}

/// A single entry in the integrity manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub filename: String,
    pub sha256: String,
}

/// Integrity manifest tracking the hash of every payload file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

/// Destination for a finished composition run.
///
/// The compositor's output contract: a completed grid plus the untouched
/// world metadata, handed over as one unit.
pub trait WorldSink {
    fn save(&mut self, world: &WorldMeta, grid: &WorldGrid) -> Result<(), PersistError>;
}

/// File-backed world store with schema versioning and integrity checking.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Point a store at a directory, creating the directory if missing.
    ///
    /// Nothing is written until [`WorldSink::save`] runs.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let root = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Open an existing store, failing closed on schema mismatch.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let root = path.as_ref().to_path_buf();
        if !root.join(META_FILE).is_file() {
            return Err(PersistError::NotAStore(root));
        }
        let store = Self { root };
        store.read_meta()?;
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Parse and schema-check world.meta.json.
    pub fn read_meta(&self) -> Result<StoreMeta, PersistError> {
        let path = self.root.join(META_FILE);
        if !path.is_file() {
            return Err(PersistError::NotAStore(self.root.clone()));
        }
        let meta: StoreMeta = serde_json::from_reader(std::fs::File::open(&path)?)?;
        if meta.schema_version != STORE_SCHEMA_VERSION {
            return Err(PersistError::SchemaMismatch {
                file_version: meta.schema_version,
                expected_version: STORE_SCHEMA_VERSION,
            });
        }
        Ok(meta)
    }

    /// Load the stored grid, verifying its hash against the manifest first.
    pub fn load(&self) -> Result<(StoreMeta, WorldGrid), PersistError> {
        let meta = self.read_meta()?;
        let compressed = std::fs::read(self.root.join(GRID_FILE))?;
        self.verify_file_hash(GRID_FILE, &compressed)?;
        let cbor_bytes = zstd_decompress(&compressed)?;
        let grid: WorldGrid = cbor_deserialize(&cbor_bytes)?;
        if grid.bounds() != meta.bounds {
            return Err(PersistError::IntegrityMismatch {
                expected: meta.bounds.to_string(),
                actual: grid.bounds().to_string(),
            });
        }
        tracing::debug!(bounds = %grid.bounds(), "world grid loaded");
        Ok((meta, grid))
    }

    /// Verify every manifest entry against the file on disk.
    pub fn verify_integrity(&self) -> Result<(), PersistError> {
        let manifest = self.read_manifest()?;
        for entry in &manifest.entries {
            let data = std::fs::read(self.root.join(&entry.filename))?;
            let actual = sha256_hex(&data);
            if actual != entry.sha256 {
                return Err(PersistError::IntegrityMismatch {
                    expected: entry.sha256.clone(),
                    actual,
                });
            }
        }
        Ok(())
    }

    pub fn read_manifest(&self) -> Result<Manifest, PersistError> {
        let path = self.root.join(MANIFEST_FILE);
        if !path.is_file() {
            return Err(PersistError::NotAStore(self.root.clone()));
        }
        Ok(serde_json::from_reader(std::fs::File::open(&path)?)?)
    }

    fn verify_file_hash(&self, filename: &str, data: &[u8]) -> Result<(), PersistError> {
        let manifest = self.read_manifest()?;
        let actual = sha256_hex(data);
        for entry in &manifest.entries {
            if entry.filename == filename {
                if entry.sha256 != actual {
                    return Err(PersistError::IntegrityMismatch {
                        expected: entry.sha256.clone(),
                        actual,
                    });
                }
                return Ok(());
            }
        }
        Err(PersistError::IntegrityMismatch {
            expected: format!("manifest entry for {filename}"),
            actual: "missing".into(),
        })
    }
}

impl WorldSink for FileStore {
    /// Write the grid and metadata, replacing any previous save in place.
    fn save(&mut self, world: &WorldMeta, grid: &WorldGrid) -> Result<(), PersistError> {
        std::fs::create_dir_all(&self.root)?;

        let cbor_bytes = cbor_serialize(grid)?;
        let compressed = zstd_compress(&cbor_bytes)?;
        std::fs::write(self.root.join(GRID_FILE), &compressed)?;

        let manifest = Manifest {
            entries: vec![ManifestEntry {
                filename: GRID_FILE.to_string(),
                sha256: sha256_hex(&compressed),
            }],
        };
        serde_json::to_writer_pretty(
            std::fs::File::create(self.root.join(MANIFEST_FILE))?,
            &manifest,
        )?;

        let meta = StoreMeta {
            schema_version: STORE_SCHEMA_VERSION,
            world: world.clone(),
            bounds: grid.bounds(),
            non_air_blocks: grid.non_air_blocks(),
        };
        serde_json::to_writer_pretty(std::fs::File::create(self.root.join(META_FILE))?, &meta)?;

        tracing::debug!(
            root = %self.root.display(),
            grid_bytes = compressed.len(),
            "world saved"
        );
        Ok(())
    }
}

fn cbor_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, PersistError> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| PersistError::CborEncode(e.to_string()))?;
    Ok(buf)
}

fn cbor_deserialize<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, PersistError> {
    ciborium::from_reader(data).map_err(|e| PersistError::CborDecode(e.to_string()))
}

fn zstd_compress(data: &[u8]) -> Result<Vec<u8>, PersistError> {
    let mut encoder = zstd::Encoder::new(Vec::new(), 3)?;
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn zstd_decompress(data: &[u8]) -> Result<Vec<u8>, PersistError> {
    let mut decoder = zstd::Decoder::new(data)?;
    let mut buf = Vec::new();
    decoder.read_to_end(&mut buf)?;
    Ok(buf)
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
