//! # Durable Local State
//!
//! Key/value persistence for the small records the tools keep between
//! sessions (counter list, consent decision).
//!
//! - **One store per concern**: [`StateStore`] wraps a single record type and
//!   exposes `load` / `save` / `reset`.
//! - **Atomic saves**: [`DirectoryBackend`] writes to a `.tmp` file, syncs,
//!   then renames over the old file.
//! - **Versioned envelope**: every record is saved as
//!   `{ "version", "saved_at", "data" }`. There are no migrations; a record
//!   from an incompatible schema is discarded.
//! - **Silent recovery**: missing, corrupt or incompatible state loads as
//!   the record's default (fresh start) and is logged, never surfaced.
//!
//! Writes are last-writer-wins; nothing is locked.
//!
//! ## Example
//!
//! ```rust
//! use fiber_core::counter::CounterBoard;
//! use fiber_core::store::{MemoryBackend, StateStore};
//!
//! let store: StateStore<CounterBoard, _> = StateStore::new(MemoryBackend::new());
//! let mut board = store.load(); // nothing saved yet: empty board
//! board.add("Sleeve rows", Default::default());
//! store.save(&board).unwrap();
//!
//! assert_eq!(store.load().counters().len(), 1);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{FiberError, FiberResult};

/// A persisted record type.
pub trait Record: Serialize + DeserializeOwned + Default {
    /// Storage key (file stem for [`DirectoryBackend`])
    const KEY: &'static str;

    /// Schema version written into the envelope ("major.minor.patch")
    const SCHEMA_VERSION: &'static str;
}

/// Raw key/value storage.
pub trait StorageBackend {
    /// Read the value stored under `key`, `None` if nothing is stored
    fn read(&self, key: &str) -> FiberResult<Option<String>>;

    fn write(&self, key: &str, value: &str) -> FiberResult<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> FiberResult<()>;
}

// ============================================================================
// Backends
// ============================================================================

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct DirectoryBackend {
    root: PathBuf,
}

impl DirectoryBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryBackend { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

impl StorageBackend for DirectoryBackend {
    fn read(&self, key: &str) -> FiberResult<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FiberError::file_error("read", path.display().to_string(), e.to_string())),
        }
    }

    /// Write with atomic semantics:
    /// 1. Write to a temporary file (.json.tmp)
    /// 2. Sync to disk (fsync)
    /// 3. Rename over the final file
    fn write(&self, key: &str, value: &str) -> FiberResult<()> {
        fs::create_dir_all(&self.root).map_err(|e| {
            FiberError::file_error("create directory", self.root.display().to_string(), e.to_string())
        })?;

        let path = self.path_for(key);
        let tmp_path = path.with_extension("json.tmp");

        let mut tmp_file = File::create(&tmp_path).map_err(|e| {
            FiberError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
        })?;

        tmp_file.write_all(value.as_bytes()).map_err(|e| {
            FiberError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
        })?;

        tmp_file.sync_all().map_err(|e| {
            FiberError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
        })?;

        fs::rename(&tmp_path, &path).map_err(|e| {
            // Clean up temp file if rename fails
            let _ = fs::remove_file(&tmp_path);
            FiberError::file_error("rename to final", path.display().to_string(), e.to_string())
        })?;

        Ok(())
    }

    fn remove(&self, key: &str) -> FiberResult<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FiberError::file_error("remove", path.display().to_string(), e.to_string())),
        }
    }
}

/// In-memory storage for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, e.g. to simulate corrupt storage
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        self
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> FiberResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> FiberResult<()> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> FiberResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

// ============================================================================
// Versioned Envelope
// ============================================================================

#[derive(Serialize)]
struct Envelope<'a, T> {
    version: &'a str,
    saved_at: DateTime<Utc>,
    data: &'a T,
}

/// Read before `data` so an incompatible payload is never deserialized
#[derive(Deserialize)]
struct EnvelopeHeader {
    version: String,
}

#[derive(Deserialize)]
struct StoredEnvelope<T> {
    data: T,
}

/// Validate that a stored version is compatible with the current schema.
///
/// Major versions must match; in 0.x a newer minor is also rejected.
fn validate_version(stored: &str, current: &str) -> FiberResult<()> {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let stored_parts = parse(stored);
    let current_parts = parse(current);

    let mismatch = || FiberError::VersionMismatch {
        file_version: stored.to_string(),
        expected_version: current.to_string(),
    };

    if stored_parts.is_empty() || current_parts.is_empty() {
        return Err(mismatch());
    }

    if stored_parts[0] != current_parts[0] {
        return Err(mismatch());
    }

    // Stored minor newer than we understand
    let breaking_minor = current_parts[0] == 0
        && stored_parts.len() > 1
        && current_parts.len() > 1
        && stored_parts[1] > current_parts[1];
    if breaking_minor {
        return Err(mismatch());
    }

    Ok(())
}

// ============================================================================
// State Store
// ============================================================================

/// Load/save/reset for one record type.
#[derive(Debug)]
pub struct StateStore<T: Record, B: StorageBackend> {
    backend: B,
    _record: PhantomData<T>,
}

impl<T: Record, B: StorageBackend> StateStore<T, B> {
    pub fn new(backend: B) -> Self {
        StateStore {
            backend,
            _record: PhantomData,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Strict load: `Ok(None)` when nothing is stored, errors for corrupt or
    /// incompatible state.
    pub fn try_load(&self) -> FiberResult<Option<T>> {
        let Some(raw) = self.backend.read(T::KEY)? else {
            return Ok(None);
        };

        let header: EnvelopeHeader = serde_json::from_str(&raw)
            .map_err(|e| FiberError::serialization(format!("Invalid {} record: {}", T::KEY, e)))?;
        validate_version(&header.version, T::SCHEMA_VERSION)?;

        let envelope: StoredEnvelope<T> = serde_json::from_str(&raw)
            .map_err(|e| FiberError::serialization(format!("Invalid {} record: {}", T::KEY, e)))?;
        Ok(Some(envelope.data))
    }

    /// Rehydrate, falling back to a fresh default on any problem.
    pub fn load(&self) -> T {
        match self.try_load() {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(key = T::KEY, "no stored state, starting fresh");
                T::default()
            }
            Err(e) => {
                warn!(key = T::KEY, error = %e, code = e.error_code(), "discarding stored state");
                T::default()
            }
        }
    }

    pub fn save(&self, record: &T) -> FiberResult<()> {
        let envelope = Envelope {
            version: T::SCHEMA_VERSION,
            saved_at: Utc::now(),
            data: record,
        };
        let json = serde_json::to_string_pretty(&envelope)
            .map_err(|e| FiberError::serialization(e.to_string()))?;
        self.backend.write(T::KEY, &json)
    }

    /// Forget the stored record
    pub fn reset(&self) -> FiberResult<()> {
        self.backend.remove(T::KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Tally {
        rows: Vec<u32>,
    }

    impl Record for Tally {
        const KEY: &'static str = "tally";
        const SCHEMA_VERSION: &'static str = "1.2.0";
    }

    fn tally() -> Tally {
        Tally { rows: vec![3, 1, 4] }
    }

    #[test]
    fn test_memory_roundtrip() {
        let store: StateStore<Tally, _> = StateStore::new(MemoryBackend::new());
        assert_eq!(store.try_load().unwrap(), None);
        store.save(&tally()).unwrap();
        assert_eq!(store.load(), tally());
    }

    #[test]
    fn test_envelope_layout() {
        let store: StateStore<Tally, _> = StateStore::new(MemoryBackend::new());
        store.save(&tally()).unwrap();
        let raw = store.backend().raw("tally").unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], "1.2.0");
        assert!(value["saved_at"].is_string());
        assert_eq!(value["data"]["rows"][2], 4);
    }

    #[test]
    fn test_corrupt_state_falls_back_to_default() {
        for raw in ["", "not json", "{\"version\": \"1.0.0\"}", "{\"version\":\"1.0.0\",\"data\":{\"rows\":\"x\"}}"] {
            let store: StateStore<Tally, _> = StateStore::new(MemoryBackend::new().with_entry("tally", raw));
            assert!(store.try_load().is_err(), "{:?}", raw);
            assert_eq!(store.load(), Tally::default());
        }
    }

    #[test]
    fn test_incompatible_version_falls_back_to_default() {
        let raw = r#"{"version":"2.0.0","saved_at":"2025-01-01T00:00:00Z","data":{"rows":[1]}}"#;
        let store: StateStore<Tally, _> = StateStore::new(MemoryBackend::new().with_entry("tally", raw));
        assert_eq!(store.try_load().unwrap_err().error_code(), "VERSION_MISMATCH");
        assert_eq!(store.load(), Tally::default());
    }

    #[test]
    fn test_older_minor_accepted() {
        let raw = r#"{"version":"1.0.3","saved_at":"2025-01-01T00:00:00Z","data":{"rows":[9]}}"#;
        let store: StateStore<Tally, _> = StateStore::new(MemoryBackend::new().with_entry("tally", raw));
        assert_eq!(store.load().rows, vec![9]);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version("0.1.0", "0.1.0").is_ok());
        assert!(validate_version("0.1.5", "0.1.0").is_ok());
        assert!(validate_version("1.0.0", "0.1.0").is_err());
        assert!(validate_version("0.2.0", "0.1.0").is_err());
        assert!(validate_version("1.9.0", "1.0.0").is_ok());
        assert!(validate_version("garbage", "1.0.0").is_err());
    }

    #[test]
    fn test_reset() {
        let store: StateStore<Tally, _> = StateStore::new(MemoryBackend::new());
        store.save(&tally()).unwrap();
        store.reset().unwrap();
        assert_eq!(store.try_load().unwrap(), None);
        // Resetting twice is fine
        store.reset().unwrap();
    }

    #[test]
    fn test_directory_backend_atomic_save() {
        let dir = tempfile::tempdir().unwrap();
        let backend = DirectoryBackend::new(dir.path().join("state"));
        let store: StateStore<Tally, _> = StateStore::new(backend.clone());

        store.save(&tally()).unwrap();

        let path = backend.path_for("tally");
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(store.load(), tally());
    }

    #[test]
    fn test_directory_backend_missing_and_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let backend = DirectoryBackend::new(dir.path());
        let store: StateStore<Tally, _> = StateStore::new(backend.clone());
        assert_eq!(store.try_load().unwrap(), None);

        fs::write(backend.path_for("tally"), "{{{{").unwrap();
        assert_eq!(store.load(), Tally::default());

        store.reset().unwrap();
        assert!(!backend.path_for("tally").exists());
    }
}
