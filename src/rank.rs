//! Cosine-similarity ranking of a query vector against corpus embeddings.

use rayon::prelude::*;

use crate::corpus::Corpus;
use crate::types::SearchResult;

/// Cosine similarity of two vectors; exactly 0.0 when either norm is zero,
/// so an all-out-of-vocabulary query degrades to zero scores instead of NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let norm_a = norm_a.sqrt();
    let norm_b = norm_b.sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Score the query vector against every embedding and return the top
/// `min(top_k, corpus_size)` chunks, ranked 1-based. Equal scores keep
/// corpus order, so the first-loaded chunk wins ties.
pub fn rank_chunks(query_vector: &[f32], corpus: &Corpus, top_k: usize) -> Vec<SearchResult> {
    let scores: Vec<f32> = corpus
        .embeddings()
        .par_iter()
        .map(|embedding| cosine_similarity(query_vector, embedding))
        .collect();

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });
    order.truncate(top_k.min(scores.len()));

    order
        .into_iter()
        .enumerate()
        .map(|(rank, idx)| {
            let chunk = corpus
                .chunk(idx)
                .expect("ranked index is within corpus bounds");
            SearchResult {
                rank: rank + 1,
                score: scores[idx],
                text: chunk.text.clone(),
                source: chunk.source.clone(),
            }
        })
        .collect()
}
