//! # indexing-storage
//!
//! Backends for the [`ObjectStore`](indexing_types::ObjectStore) and
//! [`Catalog`](indexing_types::Catalog) interfaces.
//!
//! - [`FsStore`]: content under a local directory, catalog in a JSON manifest
//! - [`MemoryStore`]: everything in a map, for tests

pub mod fs;
pub mod manifest;
pub mod memory;

pub use fs::FsStore;
pub use manifest::{CatalogEntry, Manifest, MANIFEST_FILE};
pub use memory::MemoryStore;
