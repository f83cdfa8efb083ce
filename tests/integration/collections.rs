//! Collection lifecycle and configuration payloads

use crate::common::*;
use context_index::{CreateCollection, HnswConfig, QuantizationConfig, SparseIndexConfig};
use serde_json::json;

// ============================================================================
// Configuration payloads
// ============================================================================

#[tokio::test]
async fn test_dense_768_gets_default_hnsw() {
    let t = TestIndex::new();
    let name = unique_collection("code_chunks");
    t.index
        .collections()
        .create(&name, 768, &CollectionOptions::default())
        .await
        .unwrap();

    let body = serde_json::to_value(t.engine.collection_body(&name).unwrap()).unwrap();
    assert_eq!(body["vectors"]["size"], json!(768));
    assert_eq!(body["vectors"]["distance"], json!("Cosine"));
    assert_eq!(
        body["vectors"]["hnsw_config"],
        json!({"m": 16, "ef_construct": 100, "full_scan_threshold": 10000, "on_disk": false})
    );
    assert!(body["vectors"].get("quantization_config").is_none());
    assert!(body.get("sparse_vectors").is_none());
    assert_eq!(body["shard_number"], json!(1));
    assert_eq!(body["replication_factor"], json!(1));
}

#[tokio::test]
async fn test_scalar_quantization_payload() {
    let t = TestIndex::new();
    let options = CollectionOptions::default()
        .with_hnsw(HnswConfig::default().with_ef_construct(200).with_on_disk(true))
        .with_quantization(QuantizationConfig::scalar(0.99, true));
    t.index.collections().create("q_1", 16, &options).await.unwrap();

    let body = serde_json::to_value(t.engine.collection_body("q_1").unwrap()).unwrap();
    let scalar = &body["vectors"]["quantization_config"]["scalar"];
    assert_eq!(scalar["type"], json!("int8"));
    assert_eq!(scalar["always_ram"], json!(true));
    assert!((scalar["quantile"].as_f64().unwrap() - 0.99).abs() < 1e-6);
    assert_eq!(body["vectors"]["hnsw_config"]["ef_construct"], json!(200));
    assert_eq!(body["vectors"]["hnsw_config"]["on_disk"], json!(true));
}

#[tokio::test]
async fn test_hybrid_payload_has_idf_sparse_space_on_disk() {
    let t = TestIndex::new();
    t.index
        .collections()
        .create_hybrid("hybrid_1", 384, &CollectionOptions::default())
        .await
        .unwrap();

    let body = t.engine.collection_body("hybrid_1").unwrap();
    assert_eq!(body, CreateCollection::hybrid(384, &CollectionOptions::default()));

    let value = serde_json::to_value(body).unwrap();
    assert_eq!(value["vectors"]["dense"]["size"], json!(384));
    assert_eq!(value["vectors"]["dense"]["hnsw_config"]["on_disk"], json!(false));
    assert_eq!(value["sparse_vectors"]["sparse"]["modifier"], json!("idf"));
    assert_eq!(value["sparse_vectors"]["sparse"]["index"]["on_disk"], json!(true));
}

#[tokio::test]
async fn test_hybrid_sparse_index_can_stay_in_memory() {
    let t = TestIndex::new();
    let options = CollectionOptions::default().with_sparse(SparseIndexConfig {
        on_disk: false,
        datatype: None,
    });
    t.index
        .collections()
        .create_hybrid("hybrid_2", 8, &options)
        .await
        .unwrap();

    let value = serde_json::to_value(t.engine.collection_body("hybrid_2").unwrap()).unwrap();
    assert_eq!(value["sparse_vectors"]["sparse"]["index"], json!({"on_disk": false}));
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_create_list_describe_drop() {
    let t = TestIndex::new();
    let collections = t.index.collections();

    collections.create("a_1", 3, &CollectionOptions::default()).await.unwrap();
    collections.create_hybrid("b_2", 3, &CollectionOptions::default()).await.unwrap();

    let mut names = collections.list().await.unwrap();
    names.sort();
    assert_eq!(names, vec!["a_1".to_string(), "b_2".to_string()]);

    let info = collections.describe("b_2").await.unwrap();
    assert_eq!(info.kind, context_index::CollectionKind::Hybrid);
    assert_eq!(info.dimension, Some(3));
    assert_eq!(info.points_count, Some(0));

    collections.drop("a_1").await.unwrap();
    assert!(!collections.exists("a_1").await);
    assert!(collections.exists("b_2").await);
}

#[tokio::test]
async fn test_exists_never_raises() {
    let t = TestIndex::new();
    assert!(!t.index.collections().exists("missing").await);

    t.engine.fail_next("collection_info", Error::Transport("reset".into()));
    t.index
        .collections()
        .create("present_1", 3, &CollectionOptions::default())
        .await
        .unwrap();
    assert!(!t.index.collections().exists("present_1").await);
    assert!(t.index.collections().exists("present_1").await);
}

#[tokio::test]
async fn test_drop_missing_collection_is_terminal() {
    let t = TestIndex::with(FusionMode::Remote, fast_retry(3));
    let err = t.index.collections().drop("ghost").await.unwrap_err();
    assert!(err.is_terminal());
    assert_eq!(t.engine.calls_to("delete_collection"), 1);
}

#[tokio::test]
async fn test_lifecycle_events() {
    let t = TestIndex::new();
    t.index
        .collections()
        .create_hybrid("ev_1", 4, &CollectionOptions::default())
        .await
        .unwrap();
    t.index.collections().drop("ev_1").await.unwrap();

    let events = t.sink.events();
    assert!(events.contains(&ClientEvent::CollectionCreated {
        name: "ev_1".into(),
        kind: "hybrid",
        dimension: 4,
    }));
    assert!(events.contains(&ClientEvent::CollectionDropped { name: "ev_1".into() }));
    assert!(events
        .iter()
        .any(|e| matches!(e, ClientEvent::Succeeded { operation, attempts: 1 } if operation == "create_collection")));
}

#[tokio::test]
async fn test_reinsert_overwrites_instead_of_duplicating() {
    let t = TestIndex::new();
    let collections = t.index.collections();
    collections.create("dup_1", 3, &CollectionOptions::default()).await.unwrap();

    collections.insert("dup_1", &corpus()).await.unwrap();
    collections.insert("dup_1", &corpus()).await.unwrap();

    let info = collections.describe("dup_1").await.unwrap();
    assert_eq!(info.points_count, Some(corpus().len() as u64));
}
