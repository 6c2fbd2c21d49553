//! Maximal marginal relevance reranking
//!
//! Balances query relevance against redundancy among already selected
//! results: score(c) = lambda * sim(query, c) - (1 - lambda) * max sim(c, selected).

use super::{cosine_similarity, SearchResult};

/// Select up to `k` results from `candidates` by maximal marginal relevance.
///
/// `lambda` of 1.0 ranks purely by query similarity, 0.0 purely by diversity.
/// Candidates must carry embeddings; they arrive pre-sorted by similarity.
pub fn mmr_rerank(
    query: &[f32],
    candidates: Vec<SearchResult>,
    k: usize,
    lambda: f32,
) -> Vec<SearchResult> {
    if k == 0 || candidates.is_empty() {
        return Vec::new();
    }

    let mut remaining: Vec<SearchResult> = candidates;
    let mut selected: Vec<SearchResult> = Vec::with_capacity(k.min(remaining.len()));

    while selected.len() < k && !remaining.is_empty() {
        let mut best_idx = 0;
        let mut best_score = f32::NEG_INFINITY;

        for (idx, candidate) in remaining.iter().enumerate() {
            let relevance = cosine_similarity(query, &candidate.chunk.embedding);
            let redundancy = selected
                .iter()
                .map(|s| cosine_similarity(&candidate.chunk.embedding, &s.chunk.embedding))
                .fold(0.0_f32, f32::max);

            let score = lambda * relevance - (1.0 - lambda) * redundancy;
            if score > best_score {
                best_score = score;
                best_idx = idx;
            }
        }

        selected.push(remaining.swap_remove(best_idx));
    }

    selected
}
