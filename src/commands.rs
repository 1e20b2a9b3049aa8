use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::answer::{self, GeminiClient, GenerationProvider};
use crate::config::Config;
use crate::embeddings::{EmbeddingProvider, OllamaClient};
use crate::indexer::Indexer;
use crate::retriever::Retriever;
use crate::store::{IndexManifest, VectorStore};

/// Build (or rebuild) the vector index from the configured CSV dataset.
#[inline]
pub async fn build_index(config: &Config, csv_override: Option<PathBuf>) -> Result<()> {
    let csv_path = csv_override.unwrap_or_else(|| config.dataset.csv_path.clone());
    info!("Building index from {}", csv_path.display());

    let client = OllamaClient::new(&config.ollama)?;
    client
        .health_check()
        .context("Ollama server is not reachable or the embedding model is missing")?;

    let mut store = VectorStore::create(config.store_path())
        .await
        .context("Failed to open the vector store for indexing")?;

    let stats = Indexer::new(&client)
        .build_from_csv(&csv_path, &mut store)
        .await
        .context("Index build failed")?;

    println!("Index built successfully.");
    println!("  Rows read:       {}", stats.rows_read);
    println!("  Entries indexed: {}", stats.indexed);
    println!("  Vector size:     {}", stats.dimension);
    if !stats.skipped.is_empty() {
        println!("  Rows skipped:    {}", stats.skipped.len());
        for failure in &stats.skipped {
            println!("    row {}: {}", failure.row, failure.reason);
        }
    }

    Ok(())
}

/// Interactive question-answering loop over the built index.
///
/// Setup failures (missing API key, unreachable or empty store, embedding
/// space mismatch) are fatal; per-question failures are printed and the loop
/// keeps accepting input.
#[inline]
pub async fn chat(config: &Config, top_k: Option<usize>, show_context: bool) -> Result<()> {
    let api_key = config
        .gemini_api_key()
        .context("A generation API key is required for chat")?;

    let embedder = OllamaClient::new(&config.ollama)?;
    let generator = GeminiClient::new(&config.gemini, api_key);

    let store = VectorStore::open(config.store_path())
        .await
        .context("Could not open the vector store")?;
    let retriever = Retriever::new(&embedder, &store)?;

    let k = top_k.unwrap_or(config.retrieval.top_k);
    info!(
        "Chat ready: {} entries, model {}, top_k {}",
        retriever.manifest().entry_count,
        retriever.manifest().embedding_model,
        k
    );

    println!(
        "Ask a question about the creature compendium ({} entries indexed).",
        retriever.manifest().entry_count
    );
    println!("Type 'exit' to quit.");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // End of input behaves like the exit sentinel.
            break;
        }

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") {
            break;
        }

        if let Err(e) = answer_question(&retriever, &generator, question, k, show_context).await {
            warn!("Query failed: {}", e);
            println!("Error: {e}");
        }
    }

    println!("Goodbye.");
    Ok(())
}

async fn answer_question<E: EmbeddingProvider, G: GenerationProvider>(
    retriever: &Retriever<'_, E>,
    generator: &G,
    question: &str,
    k: usize,
    show_context: bool,
) -> Result<()> {
    let hits = retriever.retrieve(question, k).await?;
    let context: Vec<String> = hits.iter().map(|hit| hit.document.clone()).collect();

    let final_answer = answer::answer(generator, question, &context)?;

    println!("\nAnswer:\n{final_answer}");

    if show_context {
        println!("\nRetrieved documents:");
        for (i, hit) in hits.iter().enumerate() {
            println!(
                "  {}. [{}] (similarity {:.3})\n     {}",
                i + 1,
                hit.metadata.name,
                hit.similarity_score,
                hit.document
            );
        }
    }
    println!();

    Ok(())
}

/// Report on the current index.
#[inline]
pub async fn show_status(config: &Config) -> Result<()> {
    match IndexManifest::load(config.store_path()) {
        Ok(manifest) => {
            let store = VectorStore::open(config.store_path()).await?;
            println!("Index location:  {}", config.store_path().display());
            println!("Embedding model: {}", manifest.embedding_model);
            println!("Vector size:     {}", manifest.dimension);
            println!("Entries:         {}", store.count().await?);
        }
        Err(crate::BestiaryError::EmptyIndex) => {
            println!("No index has been built yet.");
            println!("Run 'bestiary-rag index' to build one.");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

/// Print the effective configuration as TOML.
#[inline]
pub fn show_config(config: &Config) -> Result<()> {
    println!("# {}", config.config_file_path().display());
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

/// Write the current (or default) configuration to disk.
#[inline]
pub fn write_config(config: &Config) -> Result<()> {
    config.save()?;
    println!("Wrote {}", config.config_file_path().display());
    Ok(())
}
