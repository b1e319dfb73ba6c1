//! # indexing-types
//!
//! Shared domain types for event-driven search indexing.
//!
//! - Identities and triples: [`ObjectIdentity`], [`Avu`]
//! - Index targets parsed from the indexing marker: [`IndexTarget`]
//! - Event payloads and their validated form: [`EventParameters`], [`PathEvent`]
//! - Collaborator interfaces: [`ObjectStore`], [`Catalog`]
//! - Settings: [`Settings`]

pub mod config;
pub mod error;
pub mod event;
pub mod identity;
pub mod store;
pub mod target;

pub use config::Settings;
pub use error::PolicyError;
pub use event::{
    EntityType, EventKind, EventParameters, MetadataOperation, MetadataPayload, ObjectEvent,
    PathEvent,
};
pub use identity::{Avu, ObjectIdentity};
pub use store::{ByteStream, Catalog, ObjectStore};
pub use target::{
    IndexTarget, IndexType, ELASTICSEARCH_UNITS, INDEXER_SEPARATOR, INDEXING_ATTRIBUTE,
};
