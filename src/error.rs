use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by engine operations.
///
/// `InvalidQuery` and `InvalidTopK` are caller errors and are returned before
/// the corpus is touched. `PipelineFailure` and `PipelineTimeout` abort the
/// triggering rebuild and leave any previously loaded corpus in place.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("missing or empty query text")]
    InvalidQuery,

    #[error("top_k must be a positive integer")]
    InvalidTopK,

    #[error("chunk index {index} out of range (corpus has {count} chunks)")]
    ChunkIndexOutOfRange { index: usize, count: usize },

    #[error("corpus rebuild pipeline failed: {diagnostics}")]
    PipelineFailure {
        exit_code: Option<i32>,
        diagnostics: String,
    },

    #[error("corpus rebuild pipeline timed out after {0:?}")]
    PipelineTimeout(Duration),

    #[error("no corpus loaded and no rebuild has succeeded yet")]
    CorpusUnavailable,

    #[error("corpus file is malformed: {0}")]
    CorpusFormat(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
