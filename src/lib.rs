use thiserror::Error;

pub type Result<T> = std::result::Result<T, BestiaryError>;

#[derive(Error, Debug)]
pub enum BestiaryError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data integrity error in row {row}, field '{field}': {problem}")]
    DataIntegrity {
        field: String,
        row: usize,
        problem: String,
    },

    #[error("Index corruption: {0}")]
    IndexCorruption(String),

    #[error("Vector store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Index is empty; run `bestiary-rag index` first")]
    EmptyIndex,

    #[error(
        "Embedding space mismatch: index was built with model '{index_model}' but the configured model is '{query_model}'"
    )]
    EmbeddingSpaceMismatch {
        index_model: String,
        query_model: String,
    },

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod answer;
pub mod commands;
pub mod config;
pub mod dataset;
pub mod document;
pub mod embeddings;
pub mod indexer;
pub mod retriever;
pub mod store;
