use std::path::PathBuf;

use bestiary_rag::Result;
use bestiary_rag::commands::{build_index, chat, show_config, show_status, write_config};
use bestiary_rag::config::Config;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bestiary-rag")]
#[command(about = "Retrieval-augmented question answering over a creature attribute dataset")]
#[command(version)]
struct Cli {
    /// Override the data directory holding config and the vector index
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build (or rebuild) the vector index from the CSV dataset
    Index {
        /// Path to the dataset CSV, overriding the configured path
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Ask questions interactively against the built index
    Chat {
        /// Number of documents to retrieve per question
        #[arg(long)]
        top_k: Option<usize>,
        /// Also print the raw retrieved documents with each answer
        #[arg(long)]
        show_context: bool,
    },
    /// Show the state of the built index
    Status,
    /// Show or write the configuration file
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up GEMINI_API_KEY and friends from a local .env, if present.
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let base_dir = match cli.data_dir {
        Some(dir) => dir,
        None => Config::default_base_dir()?,
    };
    let config = Config::load(&base_dir)?;

    match cli.command {
        Commands::Index { csv } => {
            build_index(&config, csv).await?;
        }
        Commands::Chat {
            top_k,
            show_context,
        } => {
            chat(&config, top_k, show_context).await?;
        }
        Commands::Status => {
            show_status(&config).await?;
        }
        Commands::Config { show } => {
            if show {
                show_config(&config)?;
            } else {
                write_config(&config)?;
            }
        }
    }

    Ok(())
}
