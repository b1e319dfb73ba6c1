//! Search client interface.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SearchError;

/// Document type tag used for every indexed document.
pub const DOC_TYPE: &str = "text";

/// Status code and raw body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResponse {
    pub status: u16,
    pub body: String,
}

impl SearchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 and 201 are accepted for index and delete calls.
    pub fn is_accepted(&self) -> bool {
        self.status == 200 || self.status == 201
    }
}

/// Index, delete and bulk calls against a search cluster.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Create or replace one document.
    async fn index(
        &self,
        index: &str,
        doc_type: &str,
        id: &str,
        body: &Value,
    ) -> Result<SearchResponse, SearchError>;

    /// Delete one document.
    async fn remove(
        &self,
        index: &str,
        doc_type: &str,
        id: &str,
    ) -> Result<SearchResponse, SearchError>;

    /// Submit an NDJSON bulk body.
    async fn bulk(&self, body: String) -> Result<SearchResponse, SearchError>;
}
