//! Cross-document retrieval façade.
//!
//! Composes the [`DocumentStore`] and the lexical scorer into the single
//! "search across all documents" operation a chat layer uses to build
//! prompt context. All chunks from every stored document are flattened and
//! ranked together, so a top-K result set can mix documents.

use anyhow::Result;

use crate::config::Config;
use crate::error::Error;
use crate::models::{DocumentChunk, SearchHit};
use crate::score;
use crate::store::DocumentStore;

/// Load every stored document, rank all chunks system-wide against `query`,
/// and attach each ranked chunk's owning document name.
///
/// Read-only: the store is never mutated. An empty or whitespace-only query
/// returns no hits.
pub async fn search_documents(
    store: &DocumentStore,
    query: &str,
    top_k: usize,
) -> Result<Vec<SearchHit>, Error> {
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }

    let docs = store.list_all().await?;
    let all_chunks: Vec<DocumentChunk> = docs
        .iter()
        .flat_map(|d| d.chunks.iter().cloned())
        .collect();

    let ranked = score::rank_chunks(query, &all_chunks, top_k);

    let hits = ranked
        .into_iter()
        .map(|chunk| {
            // Owner resolution scans stored documents for a chunk-id match.
            // Chunk ids embed the display name, so two uploads sharing a
            // name can shadow each other here — kept as-is deliberately.
            let doc_name = docs
                .iter()
                .find(|d| d.chunks.iter().any(|c| c.id == chunk.id))
                .map(|d| d.name.clone())
                .unwrap_or_else(|| "Unknown".to_string());
            SearchHit { chunk, doc_name }
        })
        .collect();

    Ok(hits)
}

/// CLI entry point — runs a search and prints ranked hits to stdout.
pub async fn run_search(config: &Config, query: &str, top_k: Option<usize>) -> Result<()> {
    let store = DocumentStore::open(config).await?;
    let top_k = top_k.unwrap_or(config.retrieval.top_k);

    let hits = search_documents(&store, query, top_k).await?;
    store.close().await;

    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        println!("{}. {} [{}]", i + 1, hit.doc_name, hit.chunk.id);
        println!(
            "   excerpt: \"{}\"",
            excerpt(&hit.chunk.text, 240).replace('\n', " ")
        );
        println!();
    }

    Ok(())
}

fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
