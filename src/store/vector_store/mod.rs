#[cfg(test)]
mod tests;

use super::{EntryMetadata, IndexEntry, IndexManifest};
use crate::{BestiaryError, Result};
use arrow::array::{
    Array, FixedSizeListArray, Float32Array, RecordBatchIterator, StringArray,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use lancedb::{
    Connection,
    query::{ExecutableQuery, QueryBase},
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const TABLE_NAME: &str = "creatures";

/// Vector database store using LanceDB for similarity search.
pub struct VectorStore {
    connection: Connection,
    store_path: PathBuf,
}

/// One nearest-neighbor hit.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub id: String,
    pub document: String,
    pub metadata: EntryMetadata,
    pub distance: f32,
    pub similarity_score: f32,
}

impl VectorStore {
    /// Open (or create) the store directory for an index build. The table is
    /// not touched until [`Self::replace_entries`] runs.
    #[inline]
    pub async fn create<P: AsRef<Path>>(store_path: P) -> Result<Self> {
        let store_path = store_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&store_path).map_err(|e| {
            BestiaryError::StoreUnavailable(format!(
                "Failed to create store directory {}: {}",
                store_path.display(),
                e
            ))
        })?;

        let connection = Self::connect(&store_path).await?;
        info!("Vector store opened for indexing at {}", store_path.display());

        Ok(Self {
            connection,
            store_path,
        })
    }

    /// Open the store for querying. Fails with `EmptyIndex` if no index has
    /// been built yet and `StoreUnavailable` if the store cannot be reached.
    #[inline]
    pub async fn open<P: AsRef<Path>>(store_path: P) -> Result<Self> {
        let store_path = store_path.as_ref().to_path_buf();
        if !store_path.exists() {
            return Err(BestiaryError::EmptyIndex);
        }

        let connection = Self::connect(&store_path).await?;

        let table_names = connection
            .table_names()
            .execute()
            .await
            .map_err(|e| BestiaryError::StoreUnavailable(format!("Failed to list tables: {}", e)))?;
        if !table_names.contains(&TABLE_NAME.to_string()) {
            return Err(BestiaryError::EmptyIndex);
        }

        let store = Self {
            connection,
            store_path,
        };

        if store.count().await? == 0 {
            return Err(BestiaryError::EmptyIndex);
        }

        debug!("Vector store opened for querying");
        Ok(store)
    }

    async fn connect(store_path: &Path) -> Result<Connection> {
        let uri = format!("file://{}", store_path.display());
        lancedb::connect(&uri)
            .execute()
            .await
            .map_err(|e| BestiaryError::StoreUnavailable(format!("Failed to connect to LanceDB: {}", e)))
    }

    /// Path of the directory backing this store.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.store_path
    }

    /// Replace the whole collection with `entries` in a single write.
    ///
    /// Rebuild policy: the previous table is dropped and the new entries are
    /// added in one `add` call after every vector exists, so a concurrent
    /// reader observes either the old index or the complete new one, and
    /// duplicate ids across reruns are impossible.
    #[inline]
    pub async fn replace_entries(
        &mut self,
        entries: &[IndexEntry],
        embedding_model: &str,
    ) -> Result<IndexManifest> {
        if entries.is_empty() {
            return Err(BestiaryError::IndexCorruption(
                "Refusing to build an index with zero entries".to_string(),
            ));
        }

        let dimension = entries[0].vector.len();
        if let Some(bad) = entries.iter().find(|e| e.vector.len() != dimension) {
            return Err(BestiaryError::IndexCorruption(format!(
                "Entry '{}' has dimension {} but the index dimension is {}",
                bad.id,
                bad.vector.len(),
                dimension
            )));
        }

        debug!(
            "Replacing index contents with {} entries of dimension {}",
            entries.len(),
            dimension
        );

        self.drop_table_if_exists().await?;

        let schema = Self::schema(dimension);
        self.connection
            .create_empty_table(TABLE_NAME, Arc::clone(&schema))
            .execute()
            .await
            .map_err(|e| BestiaryError::StoreUnavailable(format!("Failed to create table: {}", e)))?;

        let record_batch = Self::record_batch(entries, dimension, &schema)?;

        let table = self.open_table().await?;
        let reader = RecordBatchIterator::new(std::iter::once(Ok(record_batch)), schema);
        table
            .add(reader)
            .execute()
            .await
            .map_err(|e| BestiaryError::StoreUnavailable(format!("Failed to insert entries: {}", e)))?;

        let manifest = IndexManifest {
            embedding_model: embedding_model.to_string(),
            dimension,
            entry_count: entries.len(),
        };
        manifest.save(&self.store_path)?;

        info!("Stored {} entries in the vector store", entries.len());
        Ok(manifest)
    }

    /// Search for the `k` nearest stored documents, most similar first.
    #[inline]
    pub async fn search(&self, query_vector: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        debug!("Searching for nearest vectors with limit {}", k);

        let table = self.open_table().await?;

        let mut results = table
            .vector_search(query_vector)
            .map_err(|e| {
                BestiaryError::StoreUnavailable(format!("Failed to create vector search: {}", e))
            })?
            .column("vector")
            .limit(k)
            .execute()
            .await
            .map_err(|e| BestiaryError::StoreUnavailable(format!("Failed to execute search: {}", e)))?;

        let mut hits = Vec::new();
        while let Some(batch) = results.try_next().await.map_err(|e| {
            BestiaryError::StoreUnavailable(format!("Failed to read result stream: {}", e))
        })? {
            hits.extend(Self::parse_search_batch(&batch)?);
        }

        debug!("Found {} hits", hits.len());
        Ok(hits)
    }

    /// Total number of stored entries.
    #[inline]
    pub async fn count(&self) -> Result<u64> {
        let table = self.open_table().await?;

        let count = table
            .count_rows(None)
            .await
            .map_err(|e| BestiaryError::StoreUnavailable(format!("Failed to count rows: {}", e)))?;

        Ok(count as u64)
    }

    /// Read the manifest written by the last successful build.
    #[inline]
    pub fn manifest(&self) -> Result<IndexManifest> {
        IndexManifest::load(&self.store_path)
    }

    async fn open_table(&self) -> Result<lancedb::Table> {
        self.connection
            .open_table(TABLE_NAME)
            .execute()
            .await
            .map_err(|e| BestiaryError::StoreUnavailable(format!("Failed to open table: {}", e)))
    }

    async fn drop_table_if_exists(&self) -> Result<()> {
        let table_names = self.connection.table_names().execute().await.map_err(|e| {
            BestiaryError::StoreUnavailable(format!("Failed to list tables for drop: {}", e))
        })?;

        if table_names.contains(&TABLE_NAME.to_string()) {
            info!("Dropping existing index table");
            self.connection
                .drop_table(TABLE_NAME)
                .await
                .map_err(|e| BestiaryError::StoreUnavailable(format!("Failed to drop table: {}", e)))?;
        }

        Ok(())
    }

    fn schema(dimension: usize) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, false)),
                    dimension as i32,
                ),
                false,
            ),
            Field::new("document", DataType::Utf8, false),
            Field::new("name", DataType::Utf8, false),
            Field::new("primary_type", DataType::Utf8, false),
            Field::new("secondary_type", DataType::Utf8, true),
        ]))
    }

    fn record_batch(
        entries: &[IndexEntry],
        dimension: usize,
        schema: &Arc<Schema>,
    ) -> Result<RecordBatch> {
        let len = entries.len();

        let mut ids = Vec::with_capacity(len);
        let mut documents = Vec::with_capacity(len);
        let mut names = Vec::with_capacity(len);
        let mut primary_types = Vec::with_capacity(len);
        let mut secondary_types = Vec::with_capacity(len);
        let mut flat_values = Vec::with_capacity(len * dimension);

        for entry in entries {
            ids.push(entry.id.as_str());
            documents.push(entry.document.as_str());
            names.push(entry.metadata.name.as_str());
            primary_types.push(entry.metadata.primary_type.as_str());
            secondary_types.push(entry.metadata.secondary_type.as_deref());
            flat_values.extend_from_slice(&entry.vector);
        }

        let values_array = Float32Array::from(flat_values);
        let field = Arc::new(Field::new("item", DataType::Float32, false));
        let vector_array =
            FixedSizeListArray::try_new(field, dimension as i32, Arc::new(values_array), None)
                .map_err(|e| {
                    BestiaryError::IndexCorruption(format!("Failed to create vector array: {}", e))
                })?;

        let arrays: Vec<Arc<dyn Array>> = vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(vector_array),
            Arc::new(StringArray::from(documents)),
            Arc::new(StringArray::from(names)),
            Arc::new(StringArray::from(primary_types)),
            Arc::new(StringArray::from(secondary_types)),
        ];

        RecordBatch::try_new(Arc::clone(schema), arrays)
            .map_err(|e| BestiaryError::IndexCorruption(format!("Failed to create record batch: {}", e)))
    }

    fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
        batch
            .column_by_name(name)
            .ok_or_else(|| BestiaryError::IndexCorruption(format!("Missing {} column", name)))?
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| BestiaryError::IndexCorruption(format!("Invalid {} column type", name)))
    }

    fn parse_search_batch(batch: &RecordBatch) -> Result<Vec<SearchHit>> {
        let ids = Self::string_column(batch, "id")?;
        let documents = Self::string_column(batch, "document")?;
        let names = Self::string_column(batch, "name")?;
        let primary_types = Self::string_column(batch, "primary_type")?;
        let secondary_types = Self::string_column(batch, "secondary_type")?;

        let distances = batch
            .column_by_name("_distance")
            .map(|col| col.as_any().downcast_ref::<Float32Array>());

        let mut hits = Vec::with_capacity(batch.num_rows());
        for row in 0..batch.num_rows() {
            let distance = distances
                .flatten()
                .map_or(0.0, |d| if d.is_null(row) { 0.0 } else { d.value(row) });

            hits.push(SearchHit {
                id: ids.value(row).to_string(),
                document: documents.value(row).to_string(),
                metadata: EntryMetadata {
                    name: names.value(row).to_string(),
                    primary_type: primary_types.value(row).to_string(),
                    secondary_type: if secondary_types.is_null(row) {
                        None
                    } else {
                        Some(secondary_types.value(row).to_string())
                    },
                },
                distance,
                similarity_score: 1.0 - distance,
            });
        }

        Ok(hits)
    }
}
