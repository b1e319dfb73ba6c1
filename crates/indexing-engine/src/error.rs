//! Error types for indexing operations.

use indexing_search::SearchError;
use indexing_types::PolicyError;
use thiserror::Error;

/// Errors returned by the indexing operations to the event dispatcher.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Missing or malformed event or metadata parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Catalog lookup returned no row
    #[error("Not found: {0}")]
    NotFound(String),

    /// Search cluster rejected a request or reported bulk errors
    #[error("Remote index failure: {0}")]
    RemoteIndexFailure(String),

    /// Entity type not supported
    #[error("Not supported: {0}")]
    Unsupported(String),

    /// Search cluster could not be reached
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Object store read failed
    #[error("Store error: {0}")]
    Store(String),
}

impl From<PolicyError> for IndexingError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::InvalidInput(msg) => IndexingError::InvalidInput(msg),
            PolicyError::NotFound(msg) => IndexingError::NotFound(msg),
            PolicyError::Unsupported(msg) => IndexingError::Unsupported(msg),
            other @ (PolicyError::Config(_)
            | PolicyError::Io(_)
            | PolicyError::Serialization(_)) => IndexingError::Store(other.to_string()),
        }
    }
}

impl From<std::io::Error> for IndexingError {
    fn from(err: std::io::Error) -> Self {
        IndexingError::Store(err.to_string())
    }
}
