//! Catalog persistence
//!
//! The backend is an opaque key-value store holding JSON values. The catalog
//! store keeps the active generation in memory and writes it through to the
//! backend on every replace. Reads never fail from the caller's point of view:
//! a missing, empty or unreadable value falls back to the built-in seed.

use crate::record::{default_seed, Generation, ProductRecord};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Key under which the catalog is persisted unless configured otherwise
pub const DEFAULT_STORAGE_KEY: &str = "product_data";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid stored JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Minimal get/set contract of the persistence boundary
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&mut self, key: &str, value: &Value) -> Result<()>;
}

/// One JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn set(&mut self, key: &str, value: &Value) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let contents = serde_json::to_vec_pretty(value)?;
        AtomicFile::new(self.path_for(key), OverwriteBehavior::AllowOverwrite)
            .write(|f| {
                f.write_all(&contents)?;
                f.flush()
            })
            .map_err(|err| StoreError::Backend(format!("Failed to write {key}: {err}")))
    }
}

/// Process-local backend, used for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &Value) -> Result<()> {
        self.values.insert(key.to_string(), value.clone());
        Ok(())
    }
}

/// Owner of the active catalog generation
pub struct CatalogStore {
    backend: Box<dyn KeyValueStore>,
    key: String,
    current: Generation,
}

impl CatalogStore {
    /// Open the store and load the initial generation from the backend
    pub fn open(backend: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let mut store = Self {
            backend,
            key: key.into(),
            current: Generation::from(Vec::new()),
        };
        store.current = store.load().into();
        store
    }

    /// Persisted records if present and non-empty, otherwise the seed.
    pub fn load(&self) -> Vec<ProductRecord> {
        match self.read_persisted() {
            Ok(Some(records)) if !records.is_empty() => {
                log::info!("Loaded {} records from storage", records.len());
                records
            }
            Ok(_) => {
                log::info!("No stored catalog, using default data");
                default_seed()
            }
            Err(e) => {
                log::warn!("Failed to read stored catalog: {e}");
                default_seed()
            }
        }
    }

    fn read_persisted(&self) -> Result<Option<Vec<ProductRecord>>> {
        match self.backend.get(&self.key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// The active generation
    pub fn records(&self) -> &Generation {
        &self.current
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Swap in a new generation and write it through to the backend.
    ///
    /// The in-memory swap always happens. An `Err` only reports that the
    /// write failed; the new generation stays active for this session.
    pub fn replace(&mut self, records: impl Into<Generation>) -> Result<()> {
        self.current = records.into();
        self.persist()
    }

    /// Restore the built-in seed
    pub fn reset(&mut self) -> Result<()> {
        self.replace(default_seed())
    }

    fn persist(&mut self) -> Result<()> {
        let value = serde_json::to_value(&*self.current)?;
        match self.backend.set(&self.key, &value) {
            Ok(()) => {
                log::info!("Saved {} records", self.current.len());
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to save catalog: {e}");
                Err(e)
            }
        }
    }
}
