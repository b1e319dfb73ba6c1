//! Event stream processing against an in-memory store and cluster.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use indexing_daemon::{run_stream, RunSummary};
use indexing_engine::{Dispatcher, EngineConfig};
use indexing_search::MockSearchClient;
use indexing_storage::MemoryStore;

fn setup() -> (Dispatcher, Arc<MockSearchClient>) {
    let store = Arc::new(MemoryStore::new());
    for (n, path) in ["/zone/a.txt", "/zone/b.txt", "/zone/c.txt"].iter().enumerate() {
        store.insert_object(path, &format!("{}", 100 + n), "some text to index");
    }
    let client = Arc::new(MockSearchClient::new());
    let dispatcher = Dispatcher::new(
        store.clone(),
        store,
        client.clone(),
        EngineConfig::default().with_bulk_count(2),
    );
    (dispatcher, client)
}

fn put(path: &str) -> String {
    format!(
        r#"{{"event":"PUT","logical_path":"{}","conditional_metadata":{{"attribute":"irods::indexing::index","value":"docs::full_text","units":"elasticsearch"}}}}"#,
        path
    )
}

#[tokio::test]
async fn test_stream_counts_outcomes() {
    let (dispatcher, client) = setup();
    let input = [
        put("/zone/a.txt"),
        String::new(),
        put("/zone/b.txt"),
        r#"{"event":"RENAME","logical_path":"/zone/a.txt"}"#.to_string(),
        "not json".to_string(),
        put("/zone/missing.txt"),
        put("/zone/c.txt"),
    ]
    .join("\n");

    let summary = run_stream(&dispatcher, input.as_bytes(), 3).await;

    assert_eq!(
        summary,
        RunSummary {
            handled: 3,
            skipped: 1,
            failed: 2,
        }
    );
    // 18 bytes in 2 chunks of 9 per object
    assert_eq!(client.documents("docs").len(), 6);
}

#[tokio::test]
async fn test_empty_stream() {
    let (dispatcher, client) = setup();
    let summary = run_stream(&dispatcher, &b""[..], 4).await;
    assert_eq!(summary, RunSummary::default());
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_same_object_events_in_order_with_single_worker() {
    let (dispatcher, client) = setup();
    let unlink = put("/zone/a.txt").replace("PUT", "UNLINK");
    let input = format!("{}\n{}\n", put("/zone/a.txt"), unlink);

    let summary = run_stream(&dispatcher, input.as_bytes(), 1).await;

    assert_eq!(summary.handled, 2);
    assert!(client.documents("docs").is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_object_events_in_order_with_concurrency() {
    let unlink = |path: &str| put(path).replace("PUT", "UNLINK");

    for _ in 0..50 {
        let (dispatcher, client) = setup();
        let input = [
            put("/zone/a.txt"),
            put("/zone/b.txt"),
            unlink("/zone/a.txt"),
            put("/zone/c.txt"),
            unlink("/zone/b.txt"),
            put("/zone/a.txt"),
            unlink("/zone/a.txt"),
        ]
        .join("\n");

        let summary = run_stream(&dispatcher, input.as_bytes(), 4).await;

        assert_eq!(summary.handled, 7);
        assert_eq!(
            client.documents("docs"),
            vec!["102::0".to_string(), "102::1".to_string()]
        );
    }
}
