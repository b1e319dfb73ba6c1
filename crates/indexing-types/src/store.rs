//! Object store and catalog interfaces.
//!
//! The engine reads object content and metadata through [`ObjectStore`]
//! and resolves logical paths to catalog ids through [`Catalog`].

use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::error::PolicyError;
use crate::identity::{Avu, ObjectIdentity};

/// Readable byte stream over one object's content.
pub type ByteStream = Box<dyn AsyncRead + Send + Unpin>;

/// Access to object content and attached metadata.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Size of the object's content in bytes.
    async fn object_size(&self, logical_path: &str) -> Result<u64, PolicyError>;

    /// Open the object's content for sequential reading.
    async fn open_read(&self, logical_path: &str) -> Result<ByteStream, PolicyError>;

    /// Triples currently attached to the object or collection.
    async fn metadata(&self, logical_path: &str) -> Result<Vec<Avu>, PolicyError>;
}

/// Resolves logical paths to store-unique identifiers.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Look up the id of a collection or data object.
    ///
    /// Returns [`PolicyError::NotFound`] when the catalog has no entry.
    async fn object_id(&self, logical_path: &str) -> Result<ObjectIdentity, PolicyError>;
}
