// Embedding provider boundary
// One capability interface; concrete backends are selected via configuration.

pub mod ollama;

pub use ollama::OllamaClient;

use crate::Result;

/// A model that turns text into fixed-dimension vectors.
///
/// The same provider (model and configuration) must be used for indexing and
/// querying; the index manifest records the model id so the retriever can
/// verify this.
pub trait EmbeddingProvider {
    /// Identifier of the underlying model, recorded in the index manifest.
    fn model_id(&self) -> &str;

    /// Embed a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts, returning one vector per input in order.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}
