//! Retry and backoff through the public API

use crate::common::*;
use std::time::Duration;
use tokio::time::Instant;

fn unavailable() -> Error {
    Error::Remote {
        status: 503,
        message: "Service Unavailable".into(),
    }
}

#[tokio::test(start_paused = true)]
async fn test_two_failures_then_success_waits_1s_then_2s() {
    let t = TestIndex::new();
    t.engine.fail_next("list_collections", unavailable());
    t.engine.fail_next("list_collections", Error::Transport("connection reset".into()));

    let start = Instant::now();
    let names = t.index.collections().list().await.unwrap();

    assert!(names.is_empty());
    assert_eq!(t.engine.calls_to("list_collections"), 3);
    assert_eq!(
        t.sink.retry_delays(),
        vec![Duration::from_millis(1000), Duration::from_millis(2000)]
    );
    assert_eq!(start.elapsed(), Duration::from_millis(3000));
}

#[tokio::test(start_paused = true)]
async fn test_already_exists_fails_first_attempt_without_delay() {
    let t = TestIndex::new();
    let collections = t.index.collections();
    collections.create("taken_1", 3, &CollectionOptions::default()).await.unwrap();

    let start = Instant::now();
    let err = collections
        .create("taken_1", 3, &CollectionOptions::default())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("already exists"));
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert!(t.sink.retry_delays().is_empty());
    assert!(t.sink.events().iter().any(|e| matches!(
        e,
        ClientEvent::Failed { operation, attempts: 1, terminal: true, .. } if operation == "create_collection"
    )));
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_budget_surfaces_last_error() {
    let t = TestIndex::new();
    t.index.collections().create("busy_1", 3, &CollectionOptions::default()).await.unwrap();
    for i in 1..=3 {
        t.engine.fail_next(
            "upsert_points",
            Error::Remote {
                status: 500,
                message: format!("overloaded #{}", i),
            },
        );
    }

    let err = t
        .index
        .collections()
        .insert("busy_1", &corpus())
        .await
        .unwrap_err();

    match err {
        Error::Remote { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "overloaded #3");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(t.engine.calls_to("upsert_points"), 3);
    assert_eq!(t.sink.retry_delays().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_search_retries_transient_failures() {
    let t = TestIndex::new();
    t.index.collections().create("s_1", 3, &CollectionOptions::default()).await.unwrap();
    t.index.collections().insert("s_1", &corpus()).await.unwrap();
    t.engine.fail_next("query_points", Error::Timeout);

    let results = t
        .index
        .search()
        .search("s_1", &[1.0, 0.0, 0.0], &SearchOptions::default())
        .await
        .unwrap();
    assert_eq!(results.len(), 4);
    assert_eq!(t.engine.calls_to("query_points"), 2);
}

#[tokio::test]
async fn test_custom_policy_single_attempt() {
    let t = TestIndex::with(FusionMode::Remote, fast_retry(1));
    t.engine.fail_next("list_collections", unavailable());
    assert!(t.index.collections().list().await.is_err());
    assert_eq!(t.engine.calls_to("list_collections"), 1);
}
