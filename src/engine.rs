//! The retrieval engine: snapshot ownership, rebuild orchestration, and the
//! query/lookup/listing operations.

use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::config::EngineConfig;
use crate::corpus::Corpus;
use crate::error::EngineError;
use crate::pipeline::{CorpusPipeline, PipelineOutcome, ProcessPipeline};
use crate::router;
use crate::types::{ChunkView, EngineStats, ProductListing, QueryRequest, QueryResponse};

/// Answers queries against the current corpus snapshot and coordinates
/// rebuilds with the external pipeline.
///
/// The snapshot is held behind an `RwLock<Option<Arc<Corpus>>>`: readers
/// clone the `Arc` once and work off that pin, a rebuild installs a whole
/// new snapshot with a single pointer store. No operation ever observes a
/// partially updated corpus. The async `rebuild_gate` serializes rebuilds
/// and coalesces concurrent load-if-absent callers into a single flight.
pub struct RagEngine {
    config: EngineConfig,
    pipeline: Arc<dyn CorpusPipeline>,
    corpus: RwLock<Option<Arc<Corpus>>>,
    rebuild_gate: Mutex<()>,
}

impl RagEngine {
    /// Engine driven by the configured external process pipeline.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let pipeline = Arc::new(ProcessPipeline::new(config.pipeline.clone()));
        Self::with_pipeline(config, pipeline)
    }

    /// Engine with a caller-supplied pipeline implementation.
    pub fn with_pipeline(
        config: EngineConfig,
        pipeline: Arc<dyn CorpusPipeline>,
    ) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::Config)?;
        Ok(Self {
            config,
            pipeline,
            corpus: RwLock::new(None),
            rebuild_gate: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Pin the current snapshot without triggering a load.
    pub fn snapshot(&self) -> Result<Arc<Corpus>, EngineError> {
        self.corpus
            .read()
            .clone()
            .ok_or(EngineError::CorpusUnavailable)
    }

    pub fn is_loaded(&self) -> bool {
        self.corpus.read().is_some()
    }

    /// Answer a query. Caller errors are surfaced before the corpus is
    /// touched; a missing corpus triggers one implicit load.
    pub async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, EngineError> {
        if request.query.trim().is_empty() {
            return Err(EngineError::InvalidQuery);
        }
        if request.top_k == 0 {
            return Err(EngineError::InvalidTopK);
        }

        let corpus = self.ensure_loaded().await?;
        Ok(router::respond(&corpus, request))
    }

    /// Look up one chunk by zero-based index.
    pub async fn chunk(&self, index: usize) -> Result<ChunkView, EngineError> {
        let corpus = self.ensure_loaded().await?;
        let chunk = corpus
            .chunk(index)
            .ok_or(EngineError::ChunkIndexOutOfRange {
                index,
                count: corpus.chunk_count(),
            })?;
        Ok(ChunkView {
            chunk_id: index,
            text: chunk.text.clone(),
            source: chunk.source.clone(),
        })
    }

    /// List every chunk in corpus order.
    pub async fn chunks(&self) -> Result<Vec<ChunkView>, EngineError> {
        let corpus = self.ensure_loaded().await?;
        Ok(corpus
            .chunks()
            .iter()
            .enumerate()
            .map(|(i, c)| ChunkView {
                chunk_id: i,
                text: c.text.clone(),
                source: c.source.clone(),
            })
            .collect())
    }

    /// The full extracted/loaded product set.
    pub async fn products(&self) -> Result<ProductListing, EngineError> {
        let corpus = self.ensure_loaded().await?;
        Ok(ProductListing {
            total_products: corpus.products().len(),
            products: corpus.products().to_vec(),
        })
    }

    /// Health/statistics for the loaded corpus.
    pub async fn stats(&self) -> Result<EngineStats, EngineError> {
        let corpus = self.ensure_loaded().await?;
        Ok(Self::stats_of(&corpus))
    }

    /// Run the pipeline and install the freshly produced corpus. A pipeline
    /// or load failure leaves the previous snapshot untouched and valid.
    pub async fn rebuild(&self) -> Result<EngineStats, EngineError> {
        let _flight = self.rebuild_gate.lock().await;
        self.run_pipeline().await?;
        let corpus = self.install_from_file()?;
        Ok(Self::stats_of(&corpus))
    }

    /// Return the current snapshot, loading it first if none exists yet.
    ///
    /// The load path is single-flight: callers queue on the rebuild gate and
    /// re-check the snapshot after acquiring it, so a burst of first requests
    /// produces exactly one load (and at most one pipeline run).
    pub async fn ensure_loaded(&self) -> Result<Arc<Corpus>, EngineError> {
        if let Some(corpus) = self.corpus.read().clone() {
            return Ok(corpus);
        }

        let _flight = self.rebuild_gate.lock().await;
        if let Some(corpus) = self.corpus.read().clone() {
            return Ok(corpus);
        }

        if !self.config.corpus_file.exists() {
            self.run_pipeline().await?;
        }
        self.install_from_file()
    }

    async fn run_pipeline(&self) -> Result<(), EngineError> {
        info!("running corpus rebuild pipeline");
        match self.pipeline.run().await {
            PipelineOutcome::Success { .. } => Ok(()),
            PipelineOutcome::Failed {
                exit_code,
                diagnostics,
            } => Err(EngineError::PipelineFailure {
                exit_code,
                diagnostics,
            }),
            PipelineOutcome::TimedOut { limit } => Err(EngineError::PipelineTimeout(limit)),
        }
    }

    /// Load the corpus file and swap it in as the new snapshot. The swap is
    /// one pointer store; in-flight readers keep their old pin.
    fn install_from_file(&self) -> Result<Arc<Corpus>, EngineError> {
        if !self.config.corpus_file.exists() {
            return Err(EngineError::CorpusUnavailable);
        }
        let corpus = Arc::new(Corpus::from_file(&self.config.corpus_file)?);
        info!(
            chunks = corpus.chunk_count(),
            products = corpus.products().len(),
            "corpus snapshot installed"
        );
        *self.corpus.write() = Some(Arc::clone(&corpus));
        Ok(corpus)
    }

    fn stats_of(corpus: &Corpus) -> EngineStats {
        EngineStats {
            chunks_loaded: corpus.chunk_count(),
            products_extracted: corpus.products().len(),
            last_processed: Some(corpus.loaded_at()),
            source_files: corpus.source_files().to_vec(),
        }
    }
}
