//! In-memory object store and catalog.
//!
//! Used by tests and by callers that stage objects without touching disk.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use indexing_types::{Avu, ByteStream, Catalog, ObjectIdentity, ObjectStore, PolicyError};

#[derive(Debug, Clone)]
struct Entry {
    id: String,
    /// `None` for collections
    content: Option<Vec<u8>>,
    metadata: Vec<Avu>,
}

/// Object store holding content and catalog rows in a map.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a data object.
    pub fn insert_object(&self, logical_path: &str, id: &str, content: impl Into<Vec<u8>>) {
        self.insert(logical_path, id, Some(content.into()));
    }

    /// Add or replace a collection.
    pub fn insert_collection(&self, logical_path: &str, id: &str) {
        self.insert(logical_path, id, None);
    }

    /// Attach a triple to an existing entry.
    pub fn add_metadata(&self, logical_path: &str, avu: Avu) -> Result<(), PolicyError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = entries
            .get_mut(logical_path)
            .ok_or_else(|| missing_entry(logical_path))?;
        entry.metadata.push(avu);
        Ok(())
    }

    /// Drop an entry, as if the object had been unregistered.
    pub fn remove(&self, logical_path: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(logical_path);
    }

    fn insert(&self, logical_path: &str, id: &str, content: Option<Vec<u8>>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                logical_path.to_string(),
                Entry {
                    id: id.to_string(),
                    content,
                    metadata: Vec::new(),
                },
            );
    }

    fn entry(&self, logical_path: &str) -> Result<Entry, PolicyError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(logical_path)
            .cloned()
            .ok_or_else(|| missing_entry(logical_path))
    }

    fn content(&self, logical_path: &str) -> Result<Vec<u8>, PolicyError> {
        self.entry(logical_path)?.content.ok_or_else(|| {
            PolicyError::InvalidInput(format!(
                "[{}] is a collection, not a data object",
                logical_path
            ))
        })
    }
}

fn missing_entry(logical_path: &str) -> PolicyError {
    PolicyError::NotFound(format!("failed to get id for [{}]", logical_path))
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn object_size(&self, logical_path: &str) -> Result<u64, PolicyError> {
        Ok(self.content(logical_path)?.len() as u64)
    }

    async fn open_read(&self, logical_path: &str) -> Result<ByteStream, PolicyError> {
        Ok(Box::new(Cursor::new(self.content(logical_path)?)))
    }

    async fn metadata(&self, logical_path: &str) -> Result<Vec<Avu>, PolicyError> {
        Ok(self.entry(logical_path)?.metadata)
    }
}

#[async_trait]
impl Catalog for MemoryStore {
    async fn object_id(&self, logical_path: &str) -> Result<ObjectIdentity, PolicyError> {
        ObjectIdentity::new(self.entry(logical_path)?.id)
    }
}
