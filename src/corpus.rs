//! Immutable corpus snapshots loaded from the pipeline's JSON output.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::error::EngineError;
use crate::extract;
use crate::types::Product;

/// Separator used when concatenating chunk text for product extraction.
const CHUNK_JOIN: &str = "\n\n";

/// On-disk corpus document produced by the external embedding pipeline.
/// Field names are the pipeline's, not ours.
#[derive(Debug, Deserialize)]
pub struct CorpusFile {
    pub chunks: Vec<String>,
    #[serde(default)]
    pub chunks_with_metadata: Vec<ChunkMetadata>,
    pub embeddings: Vec<Vec<f32>>,
    pub vocabulary: Vec<String>,
    pub idf_values: Vec<f32>,
    #[serde(default)]
    pub pdf_files: Vec<String>,
    /// Precomputed products; when absent they are derived from `chunks`.
    #[serde(default)]
    pub products: Option<Vec<Product>>,
}

/// Per-chunk metadata record. Extra fields in the file are tolerated.
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkMetadata {
    pub source: String,
}

/// A text span with its source document.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub text: String,
    pub source: String,
}

/// The shared coordinate system for all vectors: an ordered term list with
/// one IDF weight per term. Position in the list is the dimension index.
#[derive(Debug, Clone)]
pub struct VocabularyIndex {
    terms: Vec<String>,
    idf: Vec<f32>,
    term_index: HashMap<String, usize>,
}

impl VocabularyIndex {
    pub fn new(terms: Vec<String>, idf: Vec<f32>) -> Result<Self, EngineError> {
        if terms.len() != idf.len() {
            return Err(EngineError::CorpusFormat(format!(
                "vocabulary has {} terms but {} idf values",
                terms.len(),
                idf.len()
            )));
        }
        let term_index = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        Ok(Self {
            terms,
            idf,
            term_index,
        })
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.term_index.get(term).copied()
    }

    pub fn idf(&self, index: usize) -> f32 {
        self.idf[index]
    }
}

/// One immutable generation of the retrieval corpus. Built as a whole, never
/// mutated afterward; a rebuild produces a brand-new snapshot.
#[derive(Debug)]
pub struct Corpus {
    chunks: Vec<Chunk>,
    embeddings: Vec<Vec<f32>>,
    vocabulary: VocabularyIndex,
    products: Vec<Product>,
    source_files: Vec<String>,
    loaded_at: DateTime<Utc>,
}

impl Corpus {
    /// Read and validate a corpus file.
    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path)?;
        let file: CorpusFile = serde_json::from_str(&content)
            .map_err(|e| EngineError::CorpusFormat(e.to_string()))?;
        Self::from_parts(file)
    }

    /// Validate the parallel-sequence invariants and assemble a snapshot.
    /// Products missing from the file are mined from the chunk text here,
    /// once per load, so queries never pay for extraction.
    pub fn from_parts(file: CorpusFile) -> Result<Self, EngineError> {
        if file.chunks.len() != file.embeddings.len() {
            return Err(EngineError::CorpusFormat(format!(
                "{} chunks but {} embeddings",
                file.chunks.len(),
                file.embeddings.len()
            )));
        }

        let vocabulary = VocabularyIndex::new(file.vocabulary, file.idf_values)?;

        if let Some((i, embedding)) = file
            .embeddings
            .iter()
            .enumerate()
            .find(|(_, e)| e.len() != vocabulary.len())
        {
            return Err(EngineError::CorpusFormat(format!(
                "embedding {} has {} dimensions, vocabulary has {} terms",
                i,
                embedding.len(),
                vocabulary.len()
            )));
        }

        let chunks: Vec<Chunk> = file
            .chunks
            .into_iter()
            .enumerate()
            .map(|(i, text)| Chunk {
                text,
                source: file
                    .chunks_with_metadata
                    .get(i)
                    .map(|m| m.source.clone())
                    .unwrap_or_else(|| "unknown".to_string()),
            })
            .collect();

        let products = match file.products {
            Some(products) => products
                .into_iter()
                .map(|mut p| {
                    if p.search_text.is_empty() {
                        p.search_text =
                            Product::derive_search_text(&p.name, &p.description, &p.part_number);
                    }
                    p
                })
                .collect(),
            None => {
                let joined: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
                extract::extract_products(&joined.join(CHUNK_JOIN))
            }
        };

        Ok(Self {
            chunks,
            embeddings: file.embeddings,
            vocabulary,
            products,
            source_files: file.pdf_files,
            loaded_at: Utc::now(),
        })
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunk(&self, index: usize) -> Option<&Chunk> {
        self.chunks.get(index)
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn embeddings(&self) -> &[Vec<f32>] {
        &self.embeddings
    }

    pub fn vocabulary(&self) -> &VocabularyIndex {
        &self.vocabulary
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn source_files(&self) -> &[String] {
        &self.source_files
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}
