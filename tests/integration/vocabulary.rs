//! Vocabulary stability within a session and across restarts

use crate::common::*;
use context_index::{collection_hash, VocabularySnapshot};
use std::collections::BTreeMap;

fn snapshot_table(store: &VocabularyStore) -> BTreeMap<String, u32> {
    store.terms().map(|(t, i)| (t.to_string(), i)).collect()
}

#[tokio::test]
async fn test_snapshot_written_at_derived_path() {
    let t = TestIndex::new();
    let name = "hybrid_code_chunks_5e1f";
    t.index
        .collections()
        .create_hybrid(name, 3, &CollectionOptions::default())
        .await
        .unwrap();
    t.index.collections().insert_hybrid(name, &corpus()).await.unwrap();

    assert_eq!(collection_hash(name), "5e1f");
    let path = t.dir.path().join("vocabulary-5e1f.json");
    assert_eq!(t.index.vocabulary().path_for(name), path);

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(raw["vocabulary"].is_object());
    assert!(raw["nextIndex"].is_u64());
    assert!(raw["timestamp"].as_str().unwrap().ends_with('Z'));

    let store = VocabularyStore::load(&path);
    assert_eq!(store.next_index() as usize, store.len());
    assert!(t.sink.events().iter().any(|e| matches!(
        e,
        ClientEvent::VocabularySaved { collection, terms } if collection == name && *terms == store.len()
    )));
}

#[tokio::test]
async fn test_indices_survive_restart() {
    let t = TestIndex::new();
    let name = "hybrid_restart_a1";
    t.index
        .collections()
        .create_hybrid(name, 3, &CollectionOptions::default())
        .await
        .unwrap();
    t.index.collections().insert_hybrid(name, &corpus()[..2]).await.unwrap();

    let before = snapshot_table(&VocabularyStore::load(&t.index.vocabulary().path_for(name)));
    let widget = before["widget"];

    // New process: fresh registry over the same directory and engine
    let t = t.reopen();
    assert!(!t.index.vocabulary().contains(name));
    t.index.collections().insert_hybrid(name, &corpus()[2..]).await.unwrap();

    let after = snapshot_table(&VocabularyStore::load(&t.index.vocabulary().path_for(name)));
    for (term, index) in &before {
        assert_eq!(after.get(term), Some(index), "index of '{}' changed", term);
    }
    assert!(after.len() > before.len());

    // The query side resolves the same index for a known term
    t.index
        .search()
        .hybrid_search(name, &[HybridSearchRequest::text("widget", 5)], &HybridSearchOptions::default())
        .await
        .unwrap();
    let query = t.engine.last_query().unwrap();
    match &query.prefetch[0].query {
        context_index::QueryVector::Sparse(sparse) => assert_eq!(sparse.indices, vec![widget]),
        other => panic!("expected sparse query, got {:?}", other),
    }
}

#[tokio::test]
async fn test_drop_then_recreate_reuses_snapshot() {
    let t = TestIndex::new();
    let name = "hybrid_again_77";
    let collections = t.index.collections();
    collections
        .create_hybrid(name, 3, &CollectionOptions::default())
        .await
        .unwrap();
    collections.insert_hybrid(name, &corpus()).await.unwrap();
    let first = snapshot_table(&VocabularyStore::load(&t.index.vocabulary().path_for(name)));

    collections.drop(name).await.unwrap();
    assert!(!t.index.vocabulary().contains(name));
    assert!(t.index.vocabulary().path_for(name).exists());

    collections
        .create_hybrid(name, 3, &CollectionOptions::default())
        .await
        .unwrap();
    collections.insert_hybrid(name, &corpus()).await.unwrap();
    let second = snapshot_table(&VocabularyStore::load(&t.index.vocabulary().path_for(name)));
    assert_eq!(first, second);
}

#[test]
fn test_corrupt_snapshot_starts_empty() {
    init_tracing();
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("vocabulary-bad.json");
    std::fs::write(&path, "{ not json").unwrap();

    let store = VocabularyStore::load(&path);
    assert!(store.is_empty());
    assert_eq!(store.next_index(), 0);
}

#[test]
fn test_older_snapshot_with_low_counter_never_reuses_indices() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("vocabulary-old.json");
    let snapshot = VocabularySnapshot {
        vocabulary: [("alpha".to_string(), 0), ("beta".to_string(), 7)]
            .into_iter()
            .collect(),
        next_index: 2,
        timestamp: "2024-01-01T00:00:00.000Z".to_string(),
    };
    std::fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();

    let mut store = VocabularyStore::load(&path);
    assert_eq!(store.index_of("beta"), 7);
    assert_eq!(store.index_of("gamma"), 8);
}

#[tokio::test]
async fn test_fixed_snapshot_path_shared_across_collections() {
    init_tracing();
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("vocabulary.json");
    let engine = MemoryIndex::new();
    let open = || {
        ContextIndex::builder(Preconnected(engine.clone()), VocabularyPaths::fixed(&path)).build()
    };

    let index = open();
    for name in ["hybrid_a_01", "hybrid_b_02"] {
        index
            .collections()
            .create_hybrid(name, 3, &CollectionOptions::default())
            .await
            .unwrap();
    }
    let corpus = corpus();
    index.collections().insert_hybrid("hybrid_a_01", &corpus[..2]).await.unwrap();
    index.collections().insert_hybrid("hybrid_b_02", &corpus[2..]).await.unwrap();
    let before = snapshot_table(&VocabularyStore::load(&path));

    // Every term written by either collection keeps its index after a restart
    let index = open();
    index.collections().insert_hybrid("hybrid_a_01", &corpus).await.unwrap();
    let after = snapshot_table(&VocabularyStore::load(&path));
    assert_eq!(before, after);

    let mut indices: Vec<u32> = after.values().copied().collect();
    indices.sort_unstable();
    indices.dedup();
    assert_eq!(indices.len(), after.len());
}
