use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A query against the loaded corpus.
///
/// `top_k` and `use_structured` default to the values the transport layer
/// historically assumed when the fields were omitted from a request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_use_structured")]
    pub use_structured: bool,
}

fn default_top_k() -> usize {
    3
}

fn default_use_structured() -> bool {
    true
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: default_top_k(),
            use_structured: default_use_structured(),
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

/// One ranked hit from semantic search. `rank` is 1-based.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub rank: usize,
    pub score: f32,
    pub text: String,
    pub source: String,
}

/// Answer payload. The `method` tag tells the caller which retrieval
/// strategy produced the answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum QueryResponse {
    #[serde(rename = "structured_extraction")]
    Structured {
        query: String,
        answer: String,
        product: Product,
        processed_at: DateTime<Utc>,
    },
    #[serde(rename = "semantic_search")]
    Semantic {
        query: String,
        results: Vec<SearchResult>,
        processed_at: DateTime<Utc>,
    },
}

/// A product record mined from raw catalog text.
///
/// Records are only ever fully constructed: every field is populated at
/// extraction time, including the precomputed lowercase `search_text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub description: String,
    /// Currency-formatted, e.g. `"$19.00"`.
    pub price: String,
    pub part_number: String,
    /// Lowercase concatenation of name, description and part number,
    /// computed once at extraction so per-query matching never rebuilds it.
    #[serde(rename = "searchText", default)]
    pub search_text: String,
}

impl Product {
    /// Rebuild `search_text` the way the extractor computes it. Used when a
    /// corpus file carries precomputed products without the derived field.
    pub fn derive_search_text(name: &str, description: &str, part_number: &str) -> String {
        format!("{} {} {}", name, description, part_number).to_lowercase()
    }
}

/// A single chunk as returned by index lookup and listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkView {
    pub chunk_id: usize,
    pub text: String,
    pub source: String,
}

/// The full extracted/loaded product set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductListing {
    pub total_products: usize,
    pub products: Vec<Product>,
}

/// Health/statistics snapshot for the currently loaded corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStats {
    pub chunks_loaded: usize,
    pub products_extracted: usize,
    pub last_processed: Option<DateTime<Utc>>,
    pub source_files: Vec<String>,
}
