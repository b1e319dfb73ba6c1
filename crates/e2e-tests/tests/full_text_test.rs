//! Full-text indexing and purge against a filesystem store and an HTTP
//! search cluster.

use pretty_assertions::assert_eq;

use e2e_tests::{bulk_payloads, object_event, TestHarness};
use indexing_engine::{chunk_id, DispatchOutcome, IndexReport, Policy};

const PATH: &str = "/tempZone/home/alice/novel.txt";

#[tokio::test]
async fn test_put_indexes_chunks_over_http() {
    let harness = TestHarness::new().await;
    let id = harness.put_object(PATH, &vec![b'x'; 1_000_050]).await;
    harness.mount_bulk_created().await;

    let outcome = harness
        .dispatcher(100)
        .handle(&object_event("PUT", PATH, "library", "full_text"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        DispatchOutcome::FullTextIndexed(IndexReport {
            chunks: 101,
            flushes: 2
        })
    );

    let requests = harness.requests().await;
    assert_eq!(requests.len(), 2);
    let first = bulk_payloads(&requests[0]);
    let second = bulk_payloads(&requests[1]);
    assert_eq!(first.len(), 100);
    assert_eq!(second.len(), 1);

    let (action, source) = &second[0];
    assert_eq!(action["index"]["_index"], "library");
    assert_eq!(action["index"]["_type"], "text");
    assert_eq!(action["index"]["_id"], chunk_id(&id, 100));
    assert_eq!(source["logical_path"], PATH);
    assert_eq!(source["data"].as_str().unwrap().len(), 50);

    for request in &requests {
        assert_eq!(
            request.headers.get("content-type").unwrap(),
            "application/x-ndjson"
        );
    }
}

#[tokio::test]
async fn test_content_is_sanitized_before_indexing() {
    let harness = TestHarness::new().await;
    harness
        .put_object(PATH, b"She said \"caf\xE9\" \x80 5\x00")
        .await;
    harness.mount_bulk_created().await;

    harness
        .dispatcher(100)
        .handle(&object_event("write", PATH, "library", "full_text"))
        .await
        .unwrap();

    let requests = harness.requests().await;
    let payloads = bulk_payloads(&requests[0]);
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].1["data"], "She said caf\u{E9} \u{20AC} 5");
}

#[tokio::test]
async fn test_zero_byte_object_sends_nothing() {
    let harness = TestHarness::new().await;
    harness.put_object(PATH, b"").await;
    harness.mount_bulk_created().await;

    let outcome = harness
        .dispatcher(100)
        .handle(&object_event("PUT", PATH, "library", "full_text"))
        .await
        .unwrap();

    assert_eq!(outcome, DispatchOutcome::FullTextIndexed(IndexReport::default()));
    assert!(harness.requests().await.is_empty());
}

#[tokio::test]
async fn test_unlink_purges_until_not_found() {
    let harness = TestHarness::new().await;
    let id = harness.put_object(PATH, b"content").await;
    harness
        .mount_deletes(&[
            format!("/library/text/{}", chunk_id(&id, 0)),
            format!("/library/text/{}", chunk_id(&id, 1)),
        ])
        .await;

    let outcome = harness
        .dispatcher(100)
        .handle(&object_event("UNLINK", PATH, "library", "full_text"))
        .await
        .unwrap();

    assert_eq!(outcome, DispatchOutcome::FullTextPurged { deleted: 2 });

    let paths: Vec<String> = harness
        .requests()
        .await
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(
        paths,
        (0..3)
            .map(|n| format!("/library/text/{}", chunk_id(&id, n)))
            .collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_direct_purge_policy_ignores_put() {
    let harness = TestHarness::new().await;
    harness.put_object(PATH, b"content").await;

    let outcome = harness
        .dispatcher(100)
        .invoke(
            Policy::FullTextPurge,
            &object_event("PUT", PATH, "library", "full_text"),
        )
        .await
        .unwrap();

    assert_eq!(outcome, DispatchOutcome::Skipped);
    assert!(harness.requests().await.is_empty());
}
