//! Error types shared by the indexing crates.

use thiserror::Error;

/// Errors raised while reading configuration, event parameters,
/// or the object store and catalog.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing or malformed event or metadata parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Catalog lookup returned no row
    #[error("Not found: {0}")]
    NotFound(String),

    /// Entity type or operation not supported
    #[error("Not supported: {0}")]
    Unsupported(String),

    /// IO error while reading the object store
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PolicyError::NotFound("failed to get id for [/zone/a]".to_string());
        assert_eq!(err.to_string(), "Not found: failed to get id for [/zone/a]");

        let err = PolicyError::InvalidInput("metadata is not complete".to_string());
        assert_eq!(err.to_string(), "Invalid input: metadata is not complete");
    }

    #[test]
    fn test_from_serde_error() {
        let json_err = serde_json::from_str::<i32>("nope").unwrap_err();
        let err: PolicyError = json_err.into();
        assert!(matches!(err, PolicyError::Serialization(_)));
    }
}
