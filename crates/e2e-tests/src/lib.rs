//! End-to-end test infrastructure for search indexing.
//!
//! Provides a shared TestHarness: a filesystem store in a temp directory,
//! a wiremock server standing in for the search cluster, and a dispatcher
//! wired to both through the real HTTP client.

use std::sync::Arc;

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use indexing_engine::{Dispatcher, EngineConfig};
use indexing_search::{bulk_response_body, ElasticsearchClient, ElasticsearchConfig};
use indexing_storage::FsStore;
use indexing_types::{Avu, EventParameters, ObjectIdentity, INDEXING_ATTRIBUTE};

/// Shared test harness for E2E tests.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Store rooted in the temp dir
    pub store: Arc<FsStore>,
    /// Search cluster stand-in
    pub server: MockServer,
}

impl TestHarness {
    /// Create a harness with an empty store and a server with no mocks.
    pub async fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let store = Arc::new(
            FsStore::open(temp_dir.path().join("store")).expect("Failed to open test store"),
        );
        let server = MockServer::start().await;

        Self {
            _temp_dir: temp_dir,
            store,
            server,
        }
    }

    /// Dispatcher over the harness store and server.
    pub fn dispatcher(&self, bulk_count: u32) -> Dispatcher {
        let client = ElasticsearchClient::new(ElasticsearchConfig::new(vec![self.server.uri()]))
            .expect("Failed to create search client");
        Dispatcher::new(
            self.store.clone(),
            self.store.clone(),
            Arc::new(client),
            EngineConfig::default().with_bulk_count(bulk_count),
        )
    }

    /// Write content at a logical path and register it.
    pub async fn put_object(&self, logical_path: &str, content: &[u8]) -> ObjectIdentity {
        let local = self
            .store
            .content_path(logical_path)
            .expect("Invalid logical path");
        if let Some(parent) = local.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create collection dir");
        }
        std::fs::write(&local, content).expect("Failed to write object");
        self.store
            .register(logical_path)
            .await
            .expect("Failed to register object")
    }

    /// Create and register a collection.
    pub async fn put_collection(&self, logical_path: &str) -> ObjectIdentity {
        let local = self
            .store
            .content_path(logical_path)
            .expect("Invalid logical path");
        std::fs::create_dir_all(&local).expect("Failed to create collection dir");
        self.store
            .register(logical_path)
            .await
            .expect("Failed to register collection")
    }

    pub async fn tag(&self, logical_path: &str, avu: Avu) {
        self.store
            .add_metadata(logical_path, avu)
            .await
            .expect("Failed to add metadata");
    }

    /// Answer every bulk request with all items created.
    pub async fn mount_bulk_created(&self) {
        Mock::given(method("POST"))
            .and(path("/_bulk"))
            .respond_with(|request: &Request| {
                let documents = bulk_document_count(request);
                ResponseTemplate::new(200).set_body_string(bulk_response_body(&vec![201; documents]))
            })
            .mount(&self.server)
            .await;
    }

    /// Answer document deletes at `paths` with 200 and every other delete with 404.
    pub async fn mount_deletes(&self, paths: &[String]) {
        for p in paths {
            Mock::given(method("DELETE"))
                .and(path(p.as_str()))
                .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"result":"deleted"}"#))
                .mount(&self.server)
                .await;
        }
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"result":"not_found"}"#))
            .with_priority(10)
            .mount(&self.server)
            .await;
    }

    /// Answer every document PUT with 201.
    pub async fn mount_index_created(&self) {
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"result":"created"}"#))
            .mount(&self.server)
            .await;
    }

    /// Requests the server received, in order.
    pub async fn requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }
}

/// Number of documents in a `_bulk` request body.
pub fn bulk_document_count(request: &Request) -> usize {
    String::from_utf8_lossy(&request.body).lines().count() / 2
}

/// Parsed source lines of a `_bulk` request body.
pub fn bulk_payloads(request: &Request) -> Vec<(Value, Value)> {
    let body = String::from_utf8_lossy(&request.body).into_owned();
    let lines: Vec<Value> = body
        .lines()
        .map(|line| serde_json::from_str(line).expect("Bulk line is not JSON"))
        .collect();
    lines
        .chunks(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect()
}

/// Marker payload naming `index` of `index_type`.
pub fn marker(index: &str, index_type: &str) -> Value {
    json!({
        "attribute": INDEXING_ATTRIBUTE,
        "value": format!("{}::{}", index, index_type),
        "units": "elasticsearch"
    })
}

/// Object event with the marker as conditional metadata.
pub fn object_event(event: &str, logical_path: &str, index: &str, index_type: &str) -> EventParameters {
    serde_json::from_value(json!({
        "event": event,
        "logical_path": logical_path,
        "conditional_metadata": marker(index, index_type),
    }))
    .expect("Invalid event parameters")
}

/// Metadata event on `entity`.
pub fn metadata_event(
    operation: &str,
    entity: &str,
    entity_type: &str,
    avu: &Avu,
    conditional: Option<Value>,
) -> EventParameters {
    let mut params = json!({
        "event": "METADATA",
        "metadata": {
            "attribute": avu.attribute,
            "value": avu.value,
            "units": avu.units,
            "operation": operation,
            "entity": entity,
            "entity_type": entity_type,
        }
    });
    if let Some(conditional) = conditional {
        params["conditional_metadata"] = conditional;
    }
    serde_json::from_value(params).expect("Invalid event parameters")
}
