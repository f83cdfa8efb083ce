//! Hybrid search end to end

use crate::common::*;
use context_index::{Fusion, QueryVector, DENSE_VECTOR_NAME, SPARSE_VECTOR_NAME};

async fn seeded(fusion: FusionMode) -> (TestIndex, String) {
    let t = TestIndex::with(fusion, RetryPolicy::default());
    let name = unique_collection("hybrid_code_chunks");
    t.index
        .collections()
        .create_hybrid(&name, 3, &CollectionOptions::default())
        .await
        .unwrap();
    t.index.collections().insert_hybrid(&name, &corpus()).await.unwrap();
    (t, name)
}

fn paths(results: &[context_index::SearchResult]) -> Vec<&str> {
    results
        .iter()
        .map(|r| r.document.relative_path.as_str())
        .collect()
}

#[tokio::test]
async fn test_empty_request_list_never_contacts_engine() {
    let t = TestIndex::new();
    let results = t
        .index
        .search()
        .hybrid_search("anything_1", &[], &HybridSearchOptions::default())
        .await
        .unwrap();
    assert!(results.is_empty());
    assert_eq!(t.engine.call_count(), 0);
    assert!(!t.index.is_connected());
}

#[tokio::test]
async fn test_fused_query_shape() {
    let (t, name) = seeded(FusionMode::Remote).await;
    let filter = FilterBuilder::by_extensions(&[".rs", ".ts"]);

    t.index
        .search()
        .hybrid_search(
            &name,
            &[
                HybridSearchRequest::dense(vec![1.0, 0.0, 0.0], 40),
                HybridSearchRequest::text("widget config", 10),
            ],
            &HybridSearchOptions::default().with_filter(filter.clone()),
        )
        .await
        .unwrap();

    let query = t.engine.last_query().unwrap();
    assert_eq!(query.query, QueryVector::Fusion { fusion: Fusion::Rrf });
    assert_eq!(query.limit, 10);
    assert_eq!(query.filter, Some(filter));

    assert_eq!(query.prefetch[0].using, DENSE_VECTOR_NAME);
    assert_eq!(query.prefetch[0].limit, 120);
    assert_eq!(query.prefetch[0].query, QueryVector::Dense(vec![1.0, 0.0, 0.0]));

    assert_eq!(query.prefetch[1].using, SPARSE_VECTOR_NAME);
    assert_eq!(query.prefetch[1].limit, 100);
    match &query.prefetch[1].query {
        QueryVector::Sparse(sparse) => {
            assert_eq!(sparse.len(), 2);
            assert!(sparse.values.iter().all(|v| *v == 1.0));
        }
        other => panic!("expected sparse query, got {:?}", other),
    }
}

#[tokio::test]
async fn test_chunks_matching_both_lists_rank_first() {
    let (t, name) = seeded(FusionMode::Remote).await;

    // Only the two widget chunks match the text, and both also lead the
    // dense list, so they take the top two fused ranks.
    let results = t
        .index
        .search()
        .hybrid_search(
            &name,
            &[
                HybridSearchRequest::dense(vec![0.1, 0.9, 0.2], 10),
                HybridSearchRequest::text("widget", 10),
            ],
            &HybridSearchOptions::default().with_limit(2),
        )
        .await
        .unwrap();

    assert_eq!(paths(&results), vec!["src/render.ts", "src/loader.rs"]);
    assert!(results[0].score >= results[1].score);
}

#[tokio::test]
async fn test_results_carry_document_fields_and_metadata() {
    let t = TestIndex::new();
    t.index
        .collections()
        .create_hybrid("meta_1", 3, &CollectionOptions::default())
        .await
        .unwrap();
    let doc = chunk("lib/mod.rs", 3, 9, "pub mod parser;", vec![1.0, 0.0, 0.0])
        .with_metadata("codebasePath", "/work/repo")
        .with_metadata("language", "rust");
    t.index
        .collections()
        .insert_hybrid("meta_1", std::slice::from_ref(&doc))
        .await
        .unwrap();

    let results = t
        .index
        .search()
        .hybrid_search(
            "meta_1",
            &[HybridSearchRequest::text("parser", 5)],
            &HybridSearchOptions::default(),
        )
        .await
        .unwrap();

    let found = &results[0].document;
    assert_eq!(found.id, doc.id);
    assert_eq!(found.content, "pub mod parser;");
    assert_eq!(found.relative_path, "lib/mod.rs");
    assert_eq!(found.start_line, 3);
    assert_eq!(found.end_line, 9);
    assert_eq!(found.file_extension, ".rs");
    assert_eq!(found.metadata.len(), 2);
    assert_eq!(found.metadata["language"], "rust");
    assert!(found.vector.is_none());
}

#[tokio::test]
async fn test_filter_by_exact_path() {
    let (t, name) = seeded(FusionMode::Remote).await;
    let results = t
        .index
        .search()
        .hybrid_search(
            &name,
            &[
                HybridSearchRequest::dense(vec![1.0, 0.0, 0.0], 10),
                HybridSearchRequest::text("config", 10),
            ],
            &HybridSearchOptions::default().with_filter(FilterBuilder::by_exact_path("src/loader.rs")),
        )
        .await
        .unwrap();
    assert_eq!(paths(&results), vec!["src/loader.rs"]);
}

#[tokio::test]
async fn test_local_fusion_agrees_with_engine_fusion() {
    let (remote, remote_name) = seeded(FusionMode::Remote).await;
    let (local, local_name) = seeded(FusionMode::Local(RrfFuser::default())).await;

    let requests = [
        HybridSearchRequest::dense(vec![0.5, 0.5, 0.1], 10),
        HybridSearchRequest::text("retry config widget", 10),
    ];
    let options = HybridSearchOptions::default();

    let a = remote.index.search().hybrid_search(&remote_name, &requests, &options).await.unwrap();
    let b = local.index.search().hybrid_search(&local_name, &requests, &options).await.unwrap();
    assert_eq!(paths(&a), paths(&b));
    assert_eq!(a.len(), 4);
}

#[tokio::test]
async fn test_dense_search_on_hybrid_collection() {
    let (t, name) = seeded(FusionMode::Remote).await;
    let results = t
        .index
        .search()
        .search(&name, &[0.0, 0.0, 1.0], &SearchOptions::default().with_limit(1))
        .await
        .unwrap();

    assert_eq!(paths(&results), vec!["src/retry.py"]);
    let query = t.engine.last_query().unwrap();
    assert_eq!(query.using.as_deref(), Some(DENSE_VECTOR_NAME));
    assert!(query.prefetch.is_empty());
}

#[tokio::test]
async fn test_dense_search_score_threshold() {
    let t = TestIndex::new();
    t.index
        .collections()
        .create("plain_1", 3, &CollectionOptions::default())
        .await
        .unwrap();
    t.index.collections().insert("plain_1", &corpus()).await.unwrap();

    let results = t
        .index
        .search()
        .search(
            "plain_1",
            &[1.0, 0.0, 0.0],
            &SearchOptions::default().with_score_threshold(0.5),
        )
        .await
        .unwrap();
    assert_eq!(paths(&results), vec!["src/config.rs", "src/loader.rs"]);
    assert!(t.engine.last_query().unwrap().using.is_none());
}

#[tokio::test]
async fn test_empty_dense_vector_fails_before_remote_call() {
    let t = TestIndex::new();
    let err = t
        .index
        .collections()
        .insert_hybrid(
            "hybrid_x",
            &[chunk("a.rs", 1, 1, "fn a() {}", vec![])],
        )
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let missing = Document::new("id", "fn b() {}", "b.rs", 1, 1, ".rs");
    let err = t
        .index
        .collections()
        .insert_hybrid("hybrid_x", &[missing])
        .await
        .unwrap_err();
    assert!(err.is_validation());

    assert_eq!(t.engine.call_count(), 0);
}

#[tokio::test]
async fn test_hybrid_insert_into_dense_collection_rejected() {
    let t = TestIndex::new();
    t.index
        .collections()
        .create("dense_only_1", 3, &CollectionOptions::default())
        .await
        .unwrap();
    let err = t
        .index
        .collections()
        .insert_hybrid("dense_only_1", &corpus())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SparseUnsupported { .. }));
    assert_eq!(t.engine.calls_to("upsert_points"), 0);
}
