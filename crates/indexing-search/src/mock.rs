//! In-memory search client for testing.

use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::bulk::bulk_response_body;
use crate::client::{SearchClient, SearchResponse};
use crate::error::SearchError;

/// A call received by [`MockSearchClient`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Index {
        index: String,
        doc_type: String,
        id: String,
        body: Value,
    },
    Remove {
        index: String,
        doc_type: String,
        id: String,
    },
    Bulk {
        body: String,
    },
}

impl RecordedCall {
    /// Document id for index and delete calls.
    pub fn id(&self) -> Option<&str> {
        match self {
            RecordedCall::Index { id, .. } | RecordedCall::Remove { id, .. } => Some(id),
            RecordedCall::Bulk { .. } => None,
        }
    }

    /// Number of documents in a bulk call.
    pub fn bulk_len(&self) -> usize {
        match self {
            RecordedCall::Bulk { body } => body.lines().count() / 2,
            _ => 0,
        }
    }
}

type Responder = dyn Fn(&RecordedCall) -> Result<SearchResponse, SearchError> + Send + Sync;

/// Search client that records calls.
///
/// [`MockSearchClient::new`] behaves like a small in-memory cluster:
/// index and bulk calls store document ids, deletes answer 200 for a
/// stored id and 404 otherwise. [`MockSearchClient::with_responder`]
/// answers every call from a function instead.
pub struct MockSearchClient {
    calls: Mutex<Vec<RecordedCall>>,
    documents: Mutex<BTreeSet<(String, String)>>,
    responder: Option<Box<Responder>>,
}

impl MockSearchClient {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            documents: Mutex::new(BTreeSet::new()),
            responder: None,
        }
    }

    /// Answer calls with a custom responder.
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&RecordedCall) -> Result<SearchResponse, SearchError> + Send + Sync + 'static,
    {
        Self {
            responder: Some(Box::new(responder)),
            ..Self::new()
        }
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Ids of documents currently stored in `index`.
    pub fn documents(&self, index: &str) -> Vec<String> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(i, _)| i == index)
            .map(|(_, id)| id.clone())
            .collect()
    }

    fn record(&self, call: RecordedCall) -> Result<SearchResponse, SearchError> {
        let response = match &self.responder {
            Some(responder) => responder(&call),
            None => Ok(self.apply(&call)),
        };
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        response
    }

    fn apply(&self, call: &RecordedCall) -> SearchResponse {
        let mut documents = self
            .documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match call {
            RecordedCall::Index { index, id, .. } => {
                documents.insert((index.clone(), id.clone()));
                SearchResponse::new(201, r#"{"result":"created"}"#)
            }
            RecordedCall::Remove { index, id, .. } => {
                if documents.remove(&(index.clone(), id.clone())) {
                    SearchResponse::new(200, r#"{"result":"deleted"}"#)
                } else {
                    SearchResponse::new(404, r#"{"result":"not_found"}"#)
                }
            }
            RecordedCall::Bulk { body } => {
                for line in body.lines().step_by(2) {
                    let Ok(action) = serde_json::from_str::<Value>(line) else {
                        continue;
                    };
                    let target = &action["index"];
                    if let (Some(index), Some(id)) =
                        (target["_index"].as_str(), target["_id"].as_str())
                    {
                        documents.insert((index.to_string(), id.to_string()));
                    }
                }
                SearchResponse::new(200, bulk_response_body(&vec![201; call.bulk_len()]))
            }
        }
    }
}

impl Default for MockSearchClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchClient for MockSearchClient {
    async fn index(
        &self,
        index: &str,
        doc_type: &str,
        id: &str,
        body: &Value,
    ) -> Result<SearchResponse, SearchError> {
        self.record(RecordedCall::Index {
            index: index.to_string(),
            doc_type: doc_type.to_string(),
            id: id.to_string(),
            body: body.clone(),
        })
    }

    async fn remove(
        &self,
        index: &str,
        doc_type: &str,
        id: &str,
    ) -> Result<SearchResponse, SearchError> {
        self.record(RecordedCall::Remove {
            index: index.to_string(),
            doc_type: doc_type.to_string(),
            id: id.to_string(),
        })
    }

    async fn bulk(&self, body: String) -> Result<SearchResponse, SearchError> {
        self.record(RecordedCall::Bulk { body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bulk::{count_bulk_errors, BulkBatch};
    use serde_json::json;

    #[tokio::test]
    async fn test_index_then_remove() {
        let client = MockSearchClient::new();
        let indexed = client
            .index("books", "text", "1::a", &Value::Null)
            .await
            .unwrap();
        assert_eq!(indexed.status, 201);
        assert_eq!(client.documents("books"), vec!["1::a"]);

        let removed = client.remove("books", "text", "1::a").await.unwrap();
        assert_eq!(removed.status, 200);
        let missing = client.remove("books", "text", "1::a").await.unwrap();
        assert_eq!(missing.status, 404);

        let calls = client.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].id(), Some("1::a"));
    }

    #[tokio::test]
    async fn test_bulk_stores_documents() {
        let client = MockSearchClient::new();
        let mut batch = BulkBatch::new("books", 10);
        batch.add("1::0", json!({"data": "a"}));
        batch.add("1::1", json!({"data": "b"}));

        let response = client.bulk(batch.to_ndjson().unwrap()).await.unwrap();

        assert_eq!(count_bulk_errors(&response, 2), 0);
        assert_eq!(client.calls()[0].bulk_len(), 2);
        assert_eq!(client.documents("books"), vec!["1::0", "1::1"]);
        assert!(client.documents("other").is_empty());
    }

    #[tokio::test]
    async fn test_custom_responder() {
        let client = MockSearchClient::with_responder(|_| Ok(SearchResponse::new(500, "boom")));
        let response = client.remove("books", "text", "1::0").await.unwrap();
        assert_eq!(response.status, 500);
        assert_eq!(client.calls().len(), 1);
    }
}
