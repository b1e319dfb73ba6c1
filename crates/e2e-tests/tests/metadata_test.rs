//! Metadata indexing and purge against a filesystem store and an HTTP
//! search cluster.

use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use e2e_tests::{marker, metadata_event, object_event, TestHarness};
use indexing_engine::{metadata_id, DispatchOutcome, IndexingError, Policy};
use indexing_types::{Avu, INDEXING_ATTRIBUTE};

const COLL: &str = "/tempZone/home/alice/project";
const FILE: &str = "/tempZone/home/alice/project/results.csv";

#[tokio::test]
async fn test_marker_on_collection_indexes_all_triples() {
    let harness = TestHarness::new().await;
    let id = harness.put_collection(COLL).await;
    let marker_avu = Avu::new(INDEXING_ATTRIBUTE, "catalog::metadata", "elasticsearch");
    harness.tag(COLL, marker_avu.clone()).await;
    harness.tag(COLL, Avu::new("owner", "alice", "")).await;
    harness.tag(COLL, Avu::new("budget", "1200", "usd")).await;
    harness.mount_index_created().await;

    let outcome = harness
        .dispatcher(100)
        .handle(&metadata_event("add", COLL, "collection", &marker_avu, None))
        .await
        .unwrap();
    assert_eq!(outcome, DispatchOutcome::MetadataIndexed);

    let requests = harness.requests().await;
    let mut paths: Vec<String> = requests.iter().map(|r| r.url.path().to_string()).collect();
    paths.sort();
    let mut expected: Vec<String> = [
        (INDEXING_ATTRIBUTE, "catalog::metadata", "elasticsearch"),
        ("owner", "alice", ""),
        ("budget", "1200", "usd"),
    ]
    .iter()
    .map(|(a, v, u)| format!("/catalog/text/{}", metadata_id(&id, a, v, u)))
    .collect();
    expected.sort();
    assert_eq!(paths, expected);

    let budget: serde_json::Value = requests
        .iter()
        .map(|r| serde_json::from_slice::<serde_json::Value>(&r.body).unwrap())
        .find(|body| body["attribute"] == "budget")
        .unwrap();
    assert_eq!(
        budget,
        serde_json::json!({
            "logical_path": COLL,
            "attribute": "budget",
            "value": "1200",
            "units": "usd"
        })
    );
}

#[tokio::test]
async fn test_data_object_triple_round_trip() {
    let harness = TestHarness::new().await;
    let id = harness.put_object(FILE, b"a,b\n1,2\n").await;
    let avu = Avu::new("instrument", "spectrometer", "");
    let doc_path = format!(
        "/catalog/text/{}",
        metadata_id(&id, "instrument", "spectrometer", "")
    );
    harness.mount_index_created().await;
    harness.mount_deletes(&[doc_path.clone()]).await;

    let dispatcher = harness.dispatcher(100);
    let conditional = Some(marker("catalog", "metadata"));

    let indexed = dispatcher
        .handle(&metadata_event("set", FILE, "data_object", &avu, conditional.clone()))
        .await
        .unwrap();
    assert_eq!(indexed, DispatchOutcome::MetadataIndexed);

    let purged = dispatcher
        .invoke(
            Policy::MetadataPurge,
            &metadata_event("rm", FILE, "data_object", &avu, conditional),
        )
        .await
        .unwrap();
    assert_eq!(purged, DispatchOutcome::MetadataPurged);

    let requests = harness.requests().await;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].url.path(), doc_path);
    assert_eq!(requests[1].url.path(), doc_path);
}

#[tokio::test]
async fn test_unregister_purge_reports_last_failure() {
    let harness = TestHarness::new().await;
    let id = harness.put_object(FILE, b"x").await;
    for (a, v) in [("first", "1"), ("second", "2"), ("third", "3")] {
        harness.tag(FILE, Avu::new(a, v, "")).await;
    }

    let failing = format!("/catalog/text/{}", metadata_id(&id, "second", "2", ""));
    Mock::given(method("DELETE"))
        .and(path(failing.as_str()))
        .respond_with(ResponseTemplate::new(500).set_body_string("shard failure"))
        .mount(&harness.server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .with_priority(10)
        .mount(&harness.server)
        .await;

    let err = harness
        .dispatcher(100)
        .handle(&object_event("UNREGISTER", FILE, "catalog", "metadata"))
        .await
        .unwrap_err();

    assert_eq!(harness.requests().await.len(), 3);
    match err {
        IndexingError::RemoteIndexFailure(message) => assert_eq!(
            message,
            format!(
                "failed to purge metadata [second] [2] [] for [{}] code [500] message [shard failure]",
                FILE
            )
        ),
        other => panic!("Expected RemoteIndexFailure, got {:?}", other),
    }
}
