//! Key-value persistence for the document.
//!
//! The store writes the serialized collection under one fixed key after
//! every successful mutation and reads it back once at startup. Read
//! failures fall back to an empty document; nothing here is fatal.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use geoedit_core::{create_empty, serialize, validate, FeatureCollection};
use tracing::{debug, warn};

/// Record name holding the persisted document
pub const PERSISTENCE_KEY: &str = "geojson-data";

/// Byte store keyed by name
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn set(&mut self, key: &str, value: &[u8]) -> Result<()>;
}

/// Get the default data directory for persisted sessions
pub fn default_data_dir() -> PathBuf {
    // Use XDG data directory if available, otherwise fallback to ~/.local/share
    let data_dir = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".local/share")
        });
    data_dir.join("geoedit")
}

/// One file per key below a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(default_data_dir())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read from {:?}", path)),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        // Ensure parent directory exists
        fs::create_dir_all(&self.dir).with_context(|| format!("Failed to create {:?}", self.dir))?;
        let path = self.path_for(key);
        fs::write(&path, value).with_context(|| format!("Failed to save to {:?}", path))?;
        Ok(())
    }
}

/// In-process store for tests and throwaway sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: HashMap<String, Vec<u8>>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record, bypassing failure injection
    pub fn with_record(mut self, key: &str, value: impl Into<Vec<u8>>) -> Self {
        self.records.insert(key.to_string(), value.into());
        self
    }

    /// Make every subsequent write fail, as a full quota would
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn record(&self, key: &str) -> Option<&[u8]> {
        self.records.get(key).map(Vec::as_slice)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.records.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        if self.fail_writes {
            bail!("storage quota exceeded");
        }
        self.records.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// Load the persisted document, falling back to an empty one on any error
pub fn load_document<S: KeyValueStore>(storage: &S) -> FeatureCollection {
    let bytes = match storage.get(PERSISTENCE_KEY) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return create_empty(),
        Err(e) => {
            warn!("Failed to load stored data: {:#}", e);
            return create_empty();
        }
    };

    let Ok(text) = std::str::from_utf8(&bytes) else {
        warn!("Stored data is not UTF-8, starting empty");
        return create_empty();
    };

    match validate(text) {
        Ok(doc) => {
            debug!(features = doc.len(), "loaded stored document");
            doc
        }
        Err(e) => {
            warn!("Failed to parse stored data: {}", e);
            create_empty()
        }
    }
}

/// Write the document under [`PERSISTENCE_KEY`]
pub fn save_document<S: KeyValueStore>(storage: &mut S, doc: &FeatureCollection) -> Result<()> {
    storage
        .set(PERSISTENCE_KEY, serialize(doc).as_bytes())
        .context("Failed to save data")
}
