//! Retrieval engine for help-desk question answering over a fixed document
//! corpus. Combines TF-IDF vector-space semantic search with structured
//! product lookup mined from raw catalog text; an intent router picks the
//! strategy per query and falls back from structured to semantic.
//!
//! The engine consumes a corpus file produced by an external embedding
//! pipeline and exposes pure query/lookup operations; transports and the
//! document-processing pipeline itself live outside this crate.

pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod extract;
pub mod matcher;
pub mod pipeline;
pub mod rank;
pub mod router;
pub mod types;
pub mod vectorize;

// Re-export primary types for convenience
pub use config::{EngineConfig, PipelineConfig, PipelineStage, SearchConfig};
pub use corpus::{Corpus, CorpusFile, VocabularyIndex};
pub use engine::RagEngine;
pub use error::EngineError;
pub use pipeline::{CorpusPipeline, PipelineOutcome, ProcessPipeline};
pub use types::{
    ChunkView, EngineStats, Product, ProductListing, QueryRequest, QueryResponse, SearchResult,
};

pub type Result<T> = std::result::Result<T, EngineError>;
