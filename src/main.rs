//! # Docdex CLI (`docdex`)
//!
//! The `docdex` binary wraps the library for local use: database
//! initialization, file ingestion, document listing and removal, and ranked
//! chunk retrieval.
//!
//! ## Usage
//!
//! ```bash
//! docdex --config ./config/docdex.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docdex init` | Create the SQLite database and schema |
//! | `docdex add <path>` | Extract, chunk, and store a file |
//! | `docdex list` | List all stored documents |
//! | `docdex remove <id>` | Delete a document and its chunks |
//! | `docdex search "<query>"` | Rank stored chunks against a query |

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use docdex::config;
use docdex::extract;
use docdex::models::FileUpload;
use docdex::search;
use docdex::store::DocumentStore;

/// Docdex — a local-first document ingestion and lexical retrieval core
/// for chat applications.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/docdex.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "docdex",
    about = "Docdex — local-first document ingestion and lexical retrieval",
    version,
    long_about = "Docdex ingests plain text, Markdown, PDF, and Word files, splits their \
    extracted text into retrievable chunks, persists them in SQLite, and ranks chunks \
    against a query with a lexical relevance score."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/docdex.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the documents and chunks
    /// tables. Idempotent — running it multiple times is safe.
    Init,

    /// Extract, chunk, and store a file.
    ///
    /// Supported formats: plain text, Markdown, PDF, Word (.docx). The
    /// content type is guessed from the extension unless overridden.
    Add {
        /// Path of the file to ingest.
        path: PathBuf,

        /// Declared MIME type. Defaults to a guess from the extension;
        /// the extension remains the fallback authority either way.
        #[arg(long)]
        content_type: Option<String>,
    },

    /// List all stored documents.
    List,

    /// Delete a document and all of its chunks.
    ///
    /// Removing an id that does not exist is a no-op.
    Remove {
        /// Document id, as printed by `add` and `list`.
        id: String,
    },

    /// Rank stored chunks against a query.
    ///
    /// Flattens chunks across every stored document, scores them with the
    /// lexical heuristic, and prints the top hits with their owning
    /// document names.
    Search {
        /// The search query string.
        query: String,

        /// Number of chunks to return (defaults to retrieval.top_k).
        #[arg(long)]
        top_k: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let store = DocumentStore::open(&config).await?;
            store.close().await;
            println!("initialized {}", config.db.path.display());
        }
        Commands::Add { path, content_type } => {
            run_add(&config, &path, content_type).await?;
        }
        Commands::List => {
            run_list(&config).await?;
        }
        Commands::Remove { id } => {
            let store = DocumentStore::open(&config).await?;
            store.delete(&id).await?;
            store.close().await;
            println!("removed {}", id);
        }
        Commands::Search { query, top_k } => {
            search::run_search(&config, &query, top_k).await?;
        }
    }

    Ok(())
}

async fn run_add(
    config: &config::Config,
    path: &std::path::Path,
    content_type: Option<String>,
) -> Result<()> {
    let bytes = std::fs::read(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let content_type =
        content_type.unwrap_or_else(|| extract::guess_content_type(&name).to_string());

    let store = DocumentStore::open(config).await?;
    let doc = store.save(&FileUpload::new(name, content_type, bytes)).await?;
    store.close().await;

    println!("added {}", doc.id);
    println!("  name: {}", doc.name);
    println!("  size: {} bytes", doc.size);
    println!("  chunks: {}", doc.chunks.len());
    Ok(())
}

async fn run_list(config: &config::Config) -> Result<()> {
    let store = DocumentStore::open(config).await?;
    let docs = store.list_all().await?;
    store.close().await;

    println!("{} document(s)", docs.len());
    for doc in &docs {
        println!(
            "{}  {} ({} bytes, {} chunks, uploaded {})",
            doc.id,
            doc.name,
            doc.size,
            doc.chunks.len(),
            format_ts_iso(doc.uploaded_at)
        );
    }
    Ok(())
}

fn format_ts_iso(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| millis.to_string())
}
