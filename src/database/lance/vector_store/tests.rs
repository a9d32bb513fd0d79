use super::*;
use crate::database::PageMetadata;
use tempfile::TempDir;

fn record(id: &str, vector: Vec<f32>) -> StoreRecord {
    StoreRecord {
        id: id.to_string(),
        vector,
        metadata: PageMetadata {
            url: format!("https://example.com/{}", id.to_lowercase()),
            title: id.to_string(),
            description: format!("Description of {}", id),
            snippet: format!("Snippet of {}", id),
        },
    }
}

async fn create_store(namespace: &str) -> (LanceVectorStore, TempDir) {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let store = LanceVectorStore::new(temp_dir.path(), namespace)
        .await
        .expect("should create vector store");
    (store, temp_dir)
}

#[test]
fn table_names_are_sanitized() {
    assert_eq!(table_name_for("ns1"), "pages_ns1");
    assert_eq!(table_name_for("my docs/v2"), "pages_my_docs_v2");
}

#[tokio::test]
async fn query_before_any_upsert_is_empty() {
    let (store, _temp_dir) = create_store("ns1").await;

    let matches = store
        .query(&[1.0, 0.0, 0.0], 5)
        .await
        .expect("query should succeed");

    assert!(matches.is_empty());
    assert_eq!(store.count_records().await.expect("should count"), 0);
}

#[tokio::test]
async fn empty_upsert_is_a_noop() {
    let (store, _temp_dir) = create_store("ns1").await;

    let written = store.upsert(Vec::new()).await.expect("upsert should succeed");

    assert_eq!(written, 0);
    assert_eq!(store.count_records().await.expect("should count"), 0);
}

#[tokio::test]
async fn nearest_record_comes_first() {
    let (store, _temp_dir) = create_store("ns1").await;
    store
        .upsert(vec![
            record("Rust", vec![1.0, 0.0, 0.0]),
            record("Go", vec![0.0, 1.0, 0.0]),
            record("Zig", vec![0.7, 0.7, 0.0]),
        ])
        .await
        .expect("upsert should succeed");

    let matches = store
        .query(&[0.9, 0.1, 0.0], 2)
        .await
        .expect("query should succeed");

    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].id, "Rust");
    assert_eq!(matches[1].id, "Zig");
    assert!(matches[0].score >= matches[1].score);
    assert_eq!(matches[0].metadata.url, "https://example.com/rust");
}

#[tokio::test]
async fn upsert_replaces_records_with_same_id() {
    let (store, _temp_dir) = create_store("ns1").await;
    store
        .upsert(vec![record("Rust", vec![1.0, 0.0])])
        .await
        .expect("first upsert should succeed");

    let mut updated = record("Rust", vec![0.0, 1.0]);
    updated.metadata.snippet = "Updated snippet".to_string();
    store
        .upsert(vec![updated])
        .await
        .expect("second upsert should succeed");

    assert_eq!(store.count_records().await.expect("should count"), 1);
    let matches = store.query(&[0.0, 1.0], 5).await.expect("query should succeed");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].metadata.snippet, "Updated snippet");
}

#[tokio::test]
async fn duplicate_ids_in_one_batch_keep_the_last() {
    let (store, _temp_dir) = create_store("ns1").await;
    let mut second = record("Same", vec![0.0, 1.0]);
    second.metadata.url = "https://example.com/second".to_string();

    let written = store
        .upsert(vec![record("Same", vec![1.0, 0.0]), second])
        .await
        .expect("upsert should succeed");

    assert_eq!(written, 1);
    let matches = store.query(&[0.0, 1.0], 5).await.expect("query should succeed");
    assert_eq!(matches[0].metadata.url, "https://example.com/second");
}

#[tokio::test]
async fn namespaces_are_isolated() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let first = LanceVectorStore::new(temp_dir.path(), "first")
        .await
        .expect("should create first store");
    let second = LanceVectorStore::new(temp_dir.path(), "second")
        .await
        .expect("should create second store");

    first
        .upsert(vec![record("Rust", vec![1.0, 0.0])])
        .await
        .expect("upsert should succeed");

    let matches = second.query(&[1.0, 0.0], 5).await.expect("query should succeed");
    assert!(matches.is_empty());
}

#[tokio::test]
async fn reopening_keeps_records_and_dimension() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    {
        let store = LanceVectorStore::new(temp_dir.path(), "ns1")
            .await
            .expect("should create store");
        store
            .upsert(vec![record("Rust", vec![1.0, 0.0, 0.0])])
            .await
            .expect("upsert should succeed");
    }

    let reopened = LanceVectorStore::new(temp_dir.path(), "ns1")
        .await
        .expect("should reopen store");

    assert_eq!(reopened.count_records().await.expect("should count"), 1);
    assert!(reopened.query(&[1.0, 0.0], 5).await.is_err());
}

#[tokio::test]
async fn dimension_change_recreates_table() {
    let (store, _temp_dir) = create_store("ns1").await;
    store
        .upsert(vec![record("Old", vec![1.0, 0.0])])
        .await
        .expect("first upsert should succeed");

    store
        .upsert(vec![record("New", vec![0.0, 0.0, 1.0])])
        .await
        .expect("upsert with new dimension should succeed");

    assert_eq!(store.count_records().await.expect("should count"), 1);
    let matches = store
        .query(&[0.0, 0.0, 1.0], 5)
        .await
        .expect("query should succeed");
    assert_eq!(matches[0].id, "New");
}
