//! Bulk batches and the `_bulk` wire format.
//!
//! A bulk body is NDJSON: one action line and one source line per
//! document, terminated by a trailing newline.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::client::{SearchResponse, DOC_TYPE};
use crate::error::SearchError;

/// One document queued for a bulk request.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkDocument {
    pub id: String,
    pub payload: Value,
}

/// Fixed-capacity batch of documents for a single index.
#[derive(Debug, Clone)]
pub struct BulkBatch {
    index: String,
    capacity: usize,
    documents: Vec<BulkDocument>,
}

impl BulkBatch {
    /// Create an empty batch. A capacity of zero is treated as one.
    pub fn new(index: impl Into<String>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            index: index.into(),
            capacity,
            documents: Vec::with_capacity(capacity),
        }
    }

    /// Append a document; returns true once the batch is full.
    pub fn add(&mut self, id: impl Into<String>, payload: Value) -> bool {
        self.documents.push(BulkDocument {
            id: id.into(),
            payload,
        });
        self.is_full()
    }

    pub fn is_full(&self) -> bool {
        self.documents.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn documents(&self) -> &[BulkDocument] {
        &self.documents
    }

    pub fn clear(&mut self) {
        self.documents.clear();
    }

    /// Encode the batch as a `_bulk` request body.
    pub fn to_ndjson(&self) -> Result<String, SearchError> {
        let mut body = String::new();
        for doc in &self.documents {
            let action = json!({
                "index": {
                    "_index": self.index,
                    "_type": DOC_TYPE,
                    "_id": doc.id,
                }
            });
            body.push_str(&serde_json::to_string(&action)?);
            body.push('\n');
            body.push_str(&serde_json::to_string(&doc.payload)?);
            body.push('\n');
        }
        Ok(body)
    }
}

#[derive(Deserialize)]
struct BulkResponseBody {
    #[serde(default)]
    items: Vec<Map<String, Value>>,
}

/// Number of documents a bulk response reports as failed.
///
/// A non-2xx status or an unreadable body fails every submitted
/// document; items missing from the response count as failures.
pub fn count_bulk_errors(response: &SearchResponse, submitted: usize) -> usize {
    if !(200..300).contains(&response.status) {
        return submitted;
    }

    let Ok(parsed) = serde_json::from_str::<BulkResponseBody>(&response.body) else {
        return submitted;
    };

    let failed_items = parsed
        .items
        .iter()
        .filter(|item| {
            item.values().next().map_or(true, |result| {
                let status = result.get("status").and_then(Value::as_u64).unwrap_or(0);
                status >= 300 || status == 0 || result.get("error").is_some()
            })
        })
        .count();

    failed_items + submitted.saturating_sub(parsed.items.len())
}

/// Build a bulk response body with one item per status, as a cluster
/// would return it.
pub fn bulk_response_body(statuses: &[u16]) -> String {
    let items: Vec<Value> = statuses
        .iter()
        .enumerate()
        .map(|(i, status)| {
            let mut result = json!({ "_id": i.to_string(), "status": status });
            if *status >= 300 {
                result["error"] = json!({ "type": "mapper_parsing_exception" });
            }
            json!({ "index": result })
        })
        .collect();
    let errors = statuses.iter().any(|s| *s >= 300);
    json!({ "took": 1, "errors": errors, "items": items }).to_string()
}
