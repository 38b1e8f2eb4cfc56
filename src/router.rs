//! Intent-based strategy selection and answer composition.
//!
//! Queries that mention a price or part number are eligible for structured
//! product lookup; everything else goes straight to semantic search. A failed
//! structured lookup always falls through to the semantic path — the two
//! strategies are never blended.

use tracing::debug;

use crate::corpus::Corpus;
use crate::matcher;
use crate::rank;
use crate::types::{Product, QueryRequest, QueryResponse};
use crate::vectorize;

/// What a query is asking for, detected by substring presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryIntent {
    pub wants_part_number: bool,
    pub wants_price: bool,
}

impl QueryIntent {
    pub fn classify(query: &str) -> Self {
        let lower = query.to_lowercase();
        Self {
            wants_part_number: lower.contains("part number") || lower.contains("part num"),
            wants_price: lower.contains("price") || lower.contains("cost"),
        }
    }

    /// Eligible for structured product lookup at all.
    pub fn is_structured(&self) -> bool {
        self.wants_part_number || self.wants_price
    }
}

/// Build the human-readable answer for a matched product. A query asking for
/// neither field gets the part number; asking for the part number also
/// reports the price.
pub fn compose_answer(product: &Product, intent: QueryIntent) -> String {
    let mut parts = Vec::new();

    if intent.wants_part_number || !intent.wants_price {
        parts.push(format!("Part Number as {}", product.part_number));
    }
    if intent.wants_price || intent.wants_part_number {
        parts.push(format!("price as {}", product.price));
    }

    parts.join(" and ")
}

/// Answer a validated request against one pinned corpus snapshot.
///
/// Structured lookup runs first when the intent, the caller flag, and the
/// product database all allow it; a hit short-circuits semantic search.
pub fn respond(corpus: &Corpus, request: &QueryRequest) -> QueryResponse {
    let intent = QueryIntent::classify(&request.query);

    if intent.is_structured() && request.use_structured && !corpus.products().is_empty() {
        if let Some(product) = matcher::best_match(&request.query, corpus.products()) {
            debug!(query = %request.query, part_number = %product.part_number,
                "structured lookup hit");
            return QueryResponse::Structured {
                query: request.query.clone(),
                answer: compose_answer(product, intent),
                product: product.clone(),
                processed_at: corpus.loaded_at(),
            };
        }
        debug!(query = %request.query, "structured lookup missed, falling back to semantic");
    }

    let query_vector = vectorize::query_vector(&request.query, corpus.vocabulary());
    let results = rank::rank_chunks(&query_vector, corpus, request.top_k);

    QueryResponse::Semantic {
        query: request.query.clone(),
        results,
        processed_at: corpus.loaded_at(),
    }
}
