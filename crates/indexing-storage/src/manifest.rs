//! Catalog manifest for the filesystem store.
//!
//! The manifest maps logical paths to catalog ids and attached triples.
//! It is a single JSON document at `<root>/.catalog.json`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use indexing_types::Avu;

/// File name of the manifest inside the store root.
pub const MANIFEST_FILE: &str = ".catalog.json";

/// Catalog row for one collection or data object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Store-unique identifier
    pub id: String,

    /// Registration time (milliseconds since epoch)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub registered_at: DateTime<Utc>,

    /// Attached attribute/value/units triples
    #[serde(default)]
    pub metadata: Vec<Avu>,
}

impl CatalogEntry {
    /// New entry with a fresh ULID.
    pub fn new() -> Self {
        Self {
            id: Ulid::new().to_string(),
            registered_at: Utc::now(),
            metadata: Vec::new(),
        }
    }
}

impl Default for CatalogEntry {
    fn default() -> Self {
        Self::new()
    }
}

/// All catalog rows, keyed by logical path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub entries: BTreeMap<String, CatalogEntry>,
}

impl Manifest {
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn get(&self, logical_path: &str) -> Option<&CatalogEntry> {
        self.entries.get(logical_path)
    }

    /// Register a path, keeping the existing entry if there is one.
    pub fn register(&mut self, logical_path: &str) -> &mut CatalogEntry {
        self.entries.entry(logical_path.to_string()).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent() {
        let mut manifest = Manifest::default();
        let first = manifest.register("/zone/a.txt").id.clone();
        let second = manifest.register("/zone/a.txt").id.clone();
        assert_eq!(first, second);
        assert_eq!(manifest.entries.len(), 1);
    }

    #[test]
    fn test_manifest_bytes() {
        let mut manifest = Manifest::default();
        manifest
            .register("/zone/a.txt")
            .metadata
            .push(Avu::new("author", "jane", ""));

        let decoded = Manifest::from_bytes(&manifest.to_bytes().unwrap()).unwrap();
        let entry = decoded.get("/zone/a.txt").unwrap();
        assert_eq!(entry.metadata, vec![Avu::new("author", "jane", "")]);
        assert_eq!(entry.id, manifest.get("/zone/a.txt").unwrap().id);
    }
}
