//! Error paths: bad parameters, unregistered objects, cluster failures.

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::method;
use wiremock::{Mock, ResponseTemplate};

use e2e_tests::{object_event, TestHarness};
use indexing_engine::{DispatchOutcome, IndexingError};
use indexing_search::bulk_response_body;
use indexing_types::EventParameters;

const PATH: &str = "/tempZone/home/bob/notes.txt";

#[tokio::test]
async fn test_unregistered_object_is_not_found() {
    let harness = TestHarness::new().await;

    let err = harness
        .dispatcher(100)
        .handle(&object_event("PUT", PATH, "library", "full_text"))
        .await
        .unwrap_err();

    match err {
        IndexingError::NotFound(message) => {
            assert_eq!(message, format!("failed to get id for [{}]", PATH))
        }
        other => panic!("Expected NotFound, got {:?}", other),
    }
    assert!(harness.requests().await.is_empty());
}

#[tokio::test]
async fn test_bulk_item_errors_fail_indexing() {
    let harness = TestHarness::new().await;
    harness.put_object(PATH, &vec![b'n'; 400]).await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(bulk_response_body(&[201, 429, 201, 400])),
        )
        .mount(&harness.server)
        .await;

    let err = harness
        .dispatcher(4)
        .handle(&object_event("PUT", PATH, "library", "full_text"))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        format!(
            "Remote index failure: Encountered 2 errors when indexing [{}]",
            PATH
        )
    );
}

#[tokio::test]
async fn test_cluster_error_status_fails_every_document() {
    let harness = TestHarness::new().await;
    harness.put_object(PATH, &vec![b'n'; 30]).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(1)
        .mount(&harness.server)
        .await;

    let err = harness
        .dispatcher(3)
        .handle(&object_event("PUT", PATH, "library", "full_text"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Encountered 3 errors"));
}

#[tokio::test]
async fn test_marker_with_wrong_units_is_invalid_input() {
    let harness = TestHarness::new().await;
    harness.put_object(PATH, b"text").await;

    let params: EventParameters = serde_json::from_value(json!({
        "event": "PUT",
        "logical_path": PATH,
        "conditional_metadata": {
            "attribute": "irods::indexing::index",
            "value": "library::full_text",
            "units": "solr"
        }
    }))
    .unwrap();

    let err = harness.dispatcher(100).handle(&params).await.unwrap_err();
    assert!(matches!(err, IndexingError::InvalidInput(_)));
}

#[tokio::test]
async fn test_unsupported_entity_type() {
    let harness = TestHarness::new().await;
    let params: EventParameters = serde_json::from_value(json!({
        "event": "METADATA",
        "metadata": {
            "attribute": "owner",
            "value": "bob",
            "units": "",
            "operation": "rm",
            "entity": "bob",
            "entity_type": "user"
        },
        "conditional_metadata": {
            "attribute": "irods::indexing::index",
            "value": "catalog::metadata",
            "units": "elasticsearch"
        }
    }))
    .unwrap();

    let err = harness.dispatcher(100).handle(&params).await.unwrap_err();
    assert!(matches!(err, IndexingError::Unsupported(_)));
}

#[tokio::test]
async fn test_unknown_event_is_ignored() {
    let harness = TestHarness::new().await;
    let outcome = harness
        .dispatcher(100)
        .handle(&object_event("RENAME", PATH, "library", "full_text"))
        .await
        .unwrap();
    assert_eq!(outcome, DispatchOutcome::Skipped);
}
