//! Snapshot
//!
//! Cart state is stored as a JSON array of flat entry records under a single
//! key. Backends only deal in strings; encoding and decoding live here.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::cart::{CartEntry, EntryKey};

/// Key the storefront keeps its cart under.
pub const DEFAULT_STORAGE_KEY: &str = "almajo-cart";

/// Errors reading, writing or parsing a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// IO error reading or writing the snapshot
    #[error("Failed to access snapshot: {0}")]
    Io(#[from] io::Error),

    /// JSON encoding or decoding error
    #[error("Malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// Storage key cannot be used as a file name
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// Serializes cart entries to the snapshot format.
///
/// # Errors
///
/// Returns a [`SnapshotError::Json`] if serialization fails.
pub fn encode(entries: &[CartEntry]) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(entries)?)
}

/// Parses cart entries from the snapshot format.
///
/// Records with a zero quantity are dropped and rental day-counts are raised
/// to at least 1. Repeated records for the same product and transaction type
/// are merged into the first one, which keeps its size and days and takes the
/// summed quantity. Order of first appearance is preserved.
///
/// # Errors
///
/// Returns a [`SnapshotError::Json`] if the contents are not a valid array of
/// entry records.
pub fn decode(contents: &str) -> Result<Vec<CartEntry>, SnapshotError> {
    let records: Vec<CartEntry> = serde_json::from_str(contents)?;
    let total = records.len();

    let mut entries: Vec<CartEntry> = Vec::with_capacity(total);
    let mut positions: FxHashMap<EntryKey, usize> = FxHashMap::default();

    for record in records.into_iter().filter_map(CartEntry::normalized) {
        let key = record.key();

        match positions.get(&key).and_then(|&idx| entries.get_mut(idx)) {
            Some(existing) => {
                tracing::debug!(entry = %key, "merged repeated snapshot record");
                existing.absorb(&record);
            }
            None => {
                positions.insert(key, entries.len());
                entries.push(record);
            }
        }
    }

    if entries.len() < total {
        tracing::debug!(
            dropped = total - entries.len(),
            "dropped or merged snapshot records"
        );
    }

    Ok(entries)
}

/// Durable key-value storage for snapshots.
pub trait SnapshotStore {
    /// Reads the snapshot stored under `key`, or `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] if the backend cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, SnapshotError>;

    /// Replaces the snapshot stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] if the backend cannot be written.
    fn save(&mut self, key: &str, contents: &str) -> Result<(), SnapshotError>;
}

/// In-memory snapshot storage.
#[derive(Debug, Default, Clone)]
pub struct MemorySnapshotStore {
    values: FxHashMap<String, String>,
}

impl MemorySnapshotStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `contents` under `key`.
    pub fn with_value(key: impl Into<String>, contents: impl Into<String>) -> Self {
        let mut store = Self::new();
        store.values.insert(key.into(), contents.into());
        store
    }

    /// Returns the raw contents stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self, key: &str) -> Result<Option<String>, SnapshotError> {
        Ok(self.values.get(key).cloned())
    }

    fn save(&mut self, key: &str, contents: &str) -> Result<(), SnapshotError> {
        self.values.insert(key.to_string(), contents.to_string());
        Ok(())
    }
}

/// Snapshot storage with one `<key>.json` file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Creates a store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the snapshot files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::InvalidKey`] if the key is empty or contains
    /// path separators.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, SnapshotError> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\']);

        if !valid {
            return Err(SnapshotError::InvalidKey(key.to_string()));
        }

        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self, key: &str) -> Result<Option<String>, SnapshotError> {
        let path = self.path_for(key)?;

        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&mut self, key: &str, contents: &str) -> Result<(), SnapshotError> {
        let path = self.path_for(key)?;

        fs::create_dir_all(&self.dir)?;

        // Atomic replace.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &path)?;

        Ok(())
    }
}
