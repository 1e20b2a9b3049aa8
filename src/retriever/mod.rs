// Retriever
// Embeds an incoming question in the same space the index was built in and
// returns the k nearest stored documents.


use tracing::debug;

use crate::embeddings::EmbeddingProvider;
use crate::store::{IndexManifest, SearchHit, VectorStore};
use crate::{BestiaryError, Result};

pub struct Retriever<'a, E: EmbeddingProvider> {
    provider: &'a E,
    store: &'a VectorStore,
    manifest: IndexManifest,
}

impl<'a, E: EmbeddingProvider> Retriever<'a, E> {
    /// Bind a provider to an opened store, verifying that queries will be
    /// embedded in the same space the index was built in.
    #[inline]
    pub fn new(provider: &'a E, store: &'a VectorStore) -> Result<Self> {
        let manifest = store.manifest()?;

        if manifest.entry_count == 0 {
            return Err(BestiaryError::EmptyIndex);
        }

        if manifest.embedding_model != provider.model_id() {
            return Err(BestiaryError::EmbeddingSpaceMismatch {
                index_model: manifest.embedding_model,
                query_model: provider.model_id().to_string(),
            });
        }

        Ok(Self {
            provider,
            store,
            manifest,
        })
    }

    /// Retrieve the `k` most similar stored documents, most similar first.
    ///
    /// No similarity threshold is applied: all `k` nearest neighbors come
    /// back regardless of absolute score.
    #[inline]
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        debug!("Embedding query of {} chars", query.len());
        let query_vector = self.provider.embed(query)?;

        if query_vector.len() != self.manifest.dimension {
            return Err(BestiaryError::EmbeddingSpaceMismatch {
                index_model: format!(
                    "{} ({} dims)",
                    self.manifest.embedding_model, self.manifest.dimension
                ),
                query_model: format!("{} ({} dims)", self.provider.model_id(), query_vector.len()),
            });
        }

        self.store.search(&query_vector, k).await
    }

    #[inline]
    pub fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }
}
