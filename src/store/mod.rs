// Vector store module
// LanceDB-backed persistence of (id, document, vector, metadata) entries plus
// the sidecar manifest that pins the embedding space the index was built in.

pub mod vector_store;

pub use vector_store::{SearchHit, VectorStore};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::{BestiaryError, Result};

const MANIFEST_FILE: &str = "manifest.toml";

/// One entry persisted in the vector store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Row ordinal of the source record, as a string. Unique by construction.
    pub id: String,
    /// The rendered document text.
    pub document: String,
    /// Embedding of `document`.
    pub vector: Vec<f32>,
    /// Denormalized record fields for display and filtering.
    pub metadata: EntryMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub name: String,
    pub primary_type: String,
    pub secondary_type: Option<String>,
}

/// Written next to the Lance table after a successful build. Read back at
/// query time so a query embedded in a different space is rejected instead of
/// silently returning junk neighbors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexManifest {
    pub embedding_model: String,
    pub dimension: usize,
    pub entry_count: usize,
}

impl IndexManifest {
    #[inline]
    pub fn load<P: AsRef<Path>>(store_path: P) -> Result<Self> {
        let manifest_path = store_path.as_ref().join(MANIFEST_FILE);
        if !manifest_path.exists() {
            return Err(BestiaryError::EmptyIndex);
        }

        let content = fs::read_to_string(&manifest_path)?;
        toml::from_str(&content).map_err(|e| {
            BestiaryError::IndexCorruption(format!(
                "Failed to parse index manifest {}: {}",
                manifest_path.display(),
                e
            ))
        })
    }

    #[inline]
    pub fn save<P: AsRef<Path>>(&self, store_path: P) -> Result<()> {
        let manifest_path = store_path.as_ref().join(MANIFEST_FILE);
        let content = toml::to_string_pretty(self).map_err(|e| {
            BestiaryError::IndexCorruption(format!("Failed to serialize index manifest: {}", e))
        })?;
        fs::write(&manifest_path, content)?;
        Ok(())
    }
}
