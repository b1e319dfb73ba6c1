//! Search client error types.

use thiserror::Error;

/// Errors raised before a search cluster produced a response.
///
/// Non-success HTTP statuses are not errors at this layer; they are
/// returned in [`crate::SearchResponse`] for the caller to judge.
#[derive(Debug, Error)]
pub enum SearchError {
    /// No search hosts configured
    #[error("No search hosts configured")]
    NoHosts,

    /// Host URL could not be parsed
    #[error("Invalid search host: {0}")]
    InvalidHost(String),

    /// Every configured host failed to respond
    #[error("Search request failed: {0}")]
    Transport(String),

    /// HTTP client could not be built
    #[error("Invalid client configuration: {0}")]
    Client(String),

    /// Bulk body could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
