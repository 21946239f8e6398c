//! Lexical relevance scoring for retrieval.
//!
//! Ranks chunks against a query with a three-part heuristic, computed
//! case-insensitively per chunk:
//!
//! - exact phrase containment: +10
//! - per query word (longer than 3 characters): +2 × literal occurrence count
//! - proximity: +5 when two or more query words first occur within a
//!   100-character span
//!
//! Zero-score chunks are dropped, the rest sorted by descending score and
//! truncated to `top_k`. Tie order between equal scores is unspecified.
//!
//! Purely lexical: retrieval works without an embedding model download, at
//! the cost of matching only literal token overlap. The weights are a
//! behavioral contract, not an implementation detail.

use regex::Regex;

use crate::models::DocumentChunk;

/// Default number of chunks returned.
pub const DEFAULT_TOP_K: usize = 3;

const PHRASE_BONUS: i64 = 10;
const WORD_WEIGHT: i64 = 2;
const PROXIMITY_BONUS: i64 = 5;
const PROXIMITY_SPAN: usize = 100;

/// Score chunks against `query` and return the top `top_k` by descending
/// relevance. Pure function, no side effects.
pub fn rank_chunks(query: &str, chunks: &[DocumentChunk], top_k: usize) -> Vec<DocumentChunk> {
    let query_lower = query.to_lowercase();
    let query_words: Vec<&str> = query_lower
        .split_whitespace()
        .filter(|w| w.chars().count() > 3)
        .collect();
    // Escaped so query words match literally, never as patterns.
    let word_patterns: Vec<Regex> = query_words
        .iter()
        .filter_map(|w| Regex::new(&regex::escape(w)).ok())
        .collect();

    let mut scored: Vec<(i64, &DocumentChunk)> = chunks
        .iter()
        .filter_map(|chunk| {
            let text_lower = chunk.text.to_lowercase();
            let score = score_chunk(&text_lower, &query_lower, &query_words, &word_patterns);
            (score > 0).then_some((score, chunk))
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.truncate(top_k);
    scored.into_iter().map(|(_, chunk)| chunk.clone()).collect()
}

fn score_chunk(
    text_lower: &str,
    query_lower: &str,
    query_words: &[&str],
    word_patterns: &[Regex],
) -> i64 {
    let mut score = 0;

    if text_lower.contains(query_lower) {
        score += PHRASE_BONUS;
    }

    for pattern in word_patterns {
        score += WORD_WEIGHT * pattern.find_iter(text_lower).count() as i64;
    }

    let positions: Vec<usize> = query_words
        .iter()
        .filter_map(|w| text_lower.find(*w))
        .collect();
    if positions.len() > 1 {
        let min = positions.iter().min().copied().unwrap_or(0);
        let max = positions.iter().max().copied().unwrap_or(0);
        if max - min < PROXIMITY_SPAN {
            score += PROXIMITY_BONUS;
        }
    }

    score
}
