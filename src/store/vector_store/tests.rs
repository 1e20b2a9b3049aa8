use super::*;
use tempfile::TempDir;

const DIM: usize = 8;

fn entry(id: usize, name: &str, seed: f32) -> IndexEntry {
    let vector: Vec<f32> = (0..DIM)
        .map(|i| ((i as f32) * 0.35 + seed).sin())
        .collect();
    IndexEntry {
        id: id.to_string(),
        document: format!("The creature {} is a test type.", name),
        vector,
        metadata: EntryMetadata {
            name: name.to_string(),
            primary_type: "test".to_string(),
            secondary_type: if id % 2 == 0 {
                None
            } else {
                Some("shadow".to_string())
            },
        },
    }
}

fn sample_entries() -> Vec<IndexEntry> {
    vec![
        entry(0, "Alphamon", 0.1),
        entry(1, "Betamon", 1.3),
        entry(2, "Gammamon", 2.7),
    ]
}

#[tokio::test]
async fn replace_and_count() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut store = VectorStore::create(temp_dir.path())
        .await
        .expect("should create store");

    let entries = sample_entries();
    let manifest = store
        .replace_entries(&entries, "test-model")
        .await
        .expect("should store entries");

    assert_eq!(manifest.entry_count, 3);
    assert_eq!(manifest.dimension, DIM);
    assert_eq!(manifest.embedding_model, "test-model");
    assert_eq!(store.count().await.expect("should count"), 3);
}

#[tokio::test]
async fn open_without_index_is_empty_index() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let missing = temp_dir.path().join("never-built");

    let result = VectorStore::open(&missing).await;
    assert!(matches!(result, Err(BestiaryError::EmptyIndex)));
}

#[tokio::test]
async fn open_after_build_succeeds() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    {
        let mut store = VectorStore::create(temp_dir.path())
            .await
            .expect("should create store");
        store
            .replace_entries(&sample_entries(), "test-model")
            .await
            .expect("should store entries");
    }

    let store = VectorStore::open(temp_dir.path())
        .await
        .expect("should open store");
    assert_eq!(store.count().await.expect("should count"), 3);
    assert_eq!(
        store.manifest().expect("should read manifest").embedding_model,
        "test-model"
    );
}

#[tokio::test]
async fn search_returns_exact_match_first() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut store = VectorStore::create(temp_dir.path())
        .await
        .expect("should create store");

    let entries = sample_entries();
    store
        .replace_entries(&entries, "test-model")
        .await
        .expect("should store entries");

    let hits = store
        .search(&entries[1].vector, 3)
        .await
        .expect("should search");

    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].id, "1");
    assert_eq!(hits[0].metadata.name, "Betamon");
    assert!(hits[0].distance <= hits[1].distance);
    assert!(hits[1].distance <= hits[2].distance);
}

#[tokio::test]
async fn search_never_exceeds_entry_count() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut store = VectorStore::create(temp_dir.path())
        .await
        .expect("should create store");

    let entries = sample_entries();
    store
        .replace_entries(&entries, "test-model")
        .await
        .expect("should store entries");

    let hits = store
        .search(&entries[0].vector, 50)
        .await
        .expect("should search");
    assert_eq!(hits.len(), 3);
}

#[tokio::test]
async fn rebuild_replaces_instead_of_appending() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut store = VectorStore::create(temp_dir.path())
        .await
        .expect("should create store");

    store
        .replace_entries(&sample_entries(), "test-model")
        .await
        .expect("first build should succeed");
    store
        .replace_entries(&sample_entries(), "test-model")
        .await
        .expect("rebuild should succeed");

    // A rerun must not duplicate ids.
    assert_eq!(store.count().await.expect("should count"), 3);
}

#[tokio::test]
async fn zero_entries_rejected() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut store = VectorStore::create(temp_dir.path())
        .await
        .expect("should create store");

    let result = store.replace_entries(&[], "test-model").await;
    assert!(matches!(result, Err(BestiaryError::IndexCorruption(_))));
}

#[tokio::test]
async fn mixed_dimensions_rejected() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut store = VectorStore::create(temp_dir.path())
        .await
        .expect("should create store");

    let mut entries = sample_entries();
    entries[2].vector.pop();

    let result = store.replace_entries(&entries, "test-model").await;
    assert!(matches!(result, Err(BestiaryError::IndexCorruption(_))));
}

#[test]
fn manifest_round_trip() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let manifest = IndexManifest {
        embedding_model: "test-model".to_string(),
        dimension: DIM,
        entry_count: 42,
    };

    manifest.save(temp_dir.path()).expect("should save manifest");
    let loaded = IndexManifest::load(temp_dir.path()).expect("should load manifest");
    assert_eq!(loaded, manifest);
}

#[test]
fn missing_manifest_is_empty_index() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let result = IndexManifest::load(temp_dir.path());
    assert!(matches!(result, Err(BestiaryError::EmptyIndex)));
}
