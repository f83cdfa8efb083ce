//! Stable identifiers and filter predicates

use crate::common::*;
use context_index::chunk_key;
use serde_json::json;
use std::collections::HashSet;

#[test]
fn test_stable_id_is_deterministic_uuid_shaped() {
    let key = chunk_key("src/main.rs", 1, 10, "fn main() {}");
    let a = IdentifierMapper::to_stable_id(&key);
    let b = IdentifierMapper::to_stable_id(&key);
    assert_eq!(a, b);

    let groups: Vec<usize> = a.split('-').map(str::len).collect();
    assert_eq!(groups, vec![8, 4, 4, 4, 12]);
    assert!(a.chars().all(|c| c == '-' || c.is_ascii_hexdigit()));
}

#[test]
fn test_stable_ids_distinct_across_chunks() {
    let ids: HashSet<String> = (0..1000)
        .map(|i| IdentifierMapper::to_stable_id(&chunk_key("src/lib.rs", i, i + 5, "same content")))
        .collect();
    assert_eq!(ids.len(), 1000);
}

#[test]
fn test_extension_filter() {
    assert!(FilterBuilder::by_extensions::<&str>(&[]).is_empty());
    assert_eq!(FilterBuilder::by_extensions::<&str>(&[]).as_json(), &json!({}));

    let filter = FilterBuilder::by_extensions(&[".ts", ".py"]);
    assert_eq!(
        filter.as_json(),
        &json!({"must": [{"key": "fileExtension", "match": {"any": [".ts", ".py"]}}]})
    );
}

#[test]
fn test_exact_path_filter() {
    assert!(FilterBuilder::by_exact_path("").is_empty());
    assert_eq!(
        FilterBuilder::by_exact_path("src/a.rs").as_json(),
        &json!({"must": [{"key": "relativePath", "match": {"value": "src/a.rs"}}]})
    );
}

#[tokio::test]
async fn test_extension_filter_applied_by_engine() {
    let t = TestIndex::new();
    t.index.collections().create("f_1", 3, &CollectionOptions::default()).await.unwrap();
    t.index.collections().insert("f_1", &corpus()).await.unwrap();

    let rows = t
        .index
        .collections()
        .query("f_1", Some(FilterBuilder::by_extensions(&[".py", ".ts"])), &["relativePath"], None)
        .await
        .unwrap();
    let mut found: Vec<String> = rows
        .iter()
        .map(|r| r["relativePath"].as_str().unwrap().to_string())
        .collect();
    found.sort();
    assert_eq!(found, vec!["src/render.ts", "src/retry.py"]);
}
