// Embedding indexer
// Renders every dataset row into a document, embeds the documents in batches,
// and replaces the vector store contents in one write.


use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::dataset::{self, CreatureRecord};
use crate::document::render_document;
use crate::embeddings::EmbeddingProvider;
use crate::store::{EntryMetadata, IndexEntry, VectorStore};
use crate::{BestiaryError, Result};

const DEFAULT_EMBED_BATCH: usize = 64;

/// Builds the vector index from a CSV dataset.
pub struct Indexer<'a, E: EmbeddingProvider> {
    provider: &'a E,
    embed_batch: usize,
    show_progress: bool,
}

/// Outcome of an index build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    /// Rows read from the dataset.
    pub rows_read: usize,
    /// Entries actually written to the store.
    pub indexed: usize,
    /// Rows skipped during the best-effort build, with the reason.
    pub skipped: Vec<RowFailure>,
    /// Vector dimension of the built index.
    pub dimension: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    pub row: usize,
    pub reason: String,
}

impl<'a, E: EmbeddingProvider> Indexer<'a, E> {
    #[inline]
    pub fn new(provider: &'a E) -> Self {
        Self {
            provider,
            embed_batch: DEFAULT_EMBED_BATCH,
            show_progress: true,
        }
    }

    #[inline]
    pub fn with_embed_batch(mut self, embed_batch: usize) -> Self {
        self.embed_batch = embed_batch.max(1);
        self
    }

    #[inline]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Build the index from the CSV at `csv_path` into `store`.
    ///
    /// Individual malformed rows are recorded and skipped; structural
    /// failures (unreadable file, embedding/document count mismatch, store
    /// write errors) abort the build.
    #[inline]
    pub async fn build_from_csv<P: AsRef<Path>>(
        &self,
        csv_path: P,
        store: &mut VectorStore,
    ) -> Result<IndexStats> {
        let (headers, rows) = dataset::read_raw_rows(&csv_path)?;
        info!("Read {} rows from the dataset", rows.len());

        let mut records: Vec<(usize, CreatureRecord)> = Vec::with_capacity(rows.len());
        let mut skipped = Vec::new();

        for (row, raw) in rows.iter().enumerate() {
            match dataset::parse_record(raw, &headers, row) {
                Ok(record) => records.push((row, record)),
                Err(e) => {
                    warn!("Skipping row {}: {}", row, e);
                    skipped.push(RowFailure {
                        row,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if records.is_empty() {
            return Err(BestiaryError::IndexCorruption(
                "No valid rows in the dataset; nothing to index".to_string(),
            ));
        }

        let stats = self.build_from_records(rows.len(), &records, skipped, store).await?;

        info!(
            "Index build complete: {} indexed, {} skipped",
            stats.indexed,
            stats.skipped.len()
        );
        Ok(stats)
    }

    async fn build_from_records(
        &self,
        rows_read: usize,
        records: &[(usize, CreatureRecord)],
        skipped: Vec<RowFailure>,
        store: &mut VectorStore,
    ) -> Result<IndexStats> {
        let documents: Vec<String> = records
            .iter()
            .map(|(_, record)| render_document(record))
            .collect();

        let progress = if self.show_progress {
            let bar = ProgressBar::new(documents.len() as u64);
            bar.set_style(
                ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar.set_message("Embedding documents");
            Some(bar)
        } else {
            None
        };

        let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(documents.len());
        for chunk in documents.chunks(self.embed_batch) {
            let batch = self.provider.embed_batch(chunk)?;
            vectors.extend(batch);
            if let Some(bar) = &progress {
                bar.inc(chunk.len() as u64);
            }
        }
        if let Some(bar) = &progress {
            bar.finish_and_clear();
        }

        // Never persist a misaligned index.
        if vectors.len() != documents.len() {
            return Err(BestiaryError::IndexCorruption(format!(
                "Embedding count {} does not match document count {}",
                vectors.len(),
                documents.len()
            )));
        }

        let entries: Vec<IndexEntry> = records
            .iter()
            .zip(documents)
            .zip(vectors)
            .map(|(((row, record), document), vector)| IndexEntry {
                id: row.to_string(),
                document,
                vector,
                metadata: EntryMetadata {
                    name: record.name.clone(),
                    primary_type: record.primary_type.clone(),
                    secondary_type: record.secondary_type.clone(),
                },
            })
            .collect();

        let manifest = store
            .replace_entries(&entries, self.provider.model_id())
            .await?;

        Ok(IndexStats {
            rows_read,
            indexed: manifest.entry_count,
            skipped,
            dimension: manifest.dimension,
        })
    }
}
