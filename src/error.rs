//! Error taxonomy for the retrieval-augmented generation pipeline.
//!
//! Provider failures are surfaced to the immediate caller without retry;
//! the CLI decides how to render them. Extraction failures have their own
//! error type in [`crate::extract`] and are converted into skip-with-warning
//! at the loader boundary, never propagated through the pipeline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Invalid local configuration: zero chunk size, empty index input, etc.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Embedding vectors of inconsistent dimensionality.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The embedding provider failed (network, auth, rate limit, bad response).
    #[error("embedding provider error: {0}")]
    EmbeddingProvider(String),

    /// The generation provider failed (network, auth, quota, bad response).
    #[error("generation provider error: {0}")]
    GenerationProvider(String),

    /// No documents produced any chunks; there is nothing to index.
    #[error("no knowledge base: the document folder produced no usable text")]
    EmptyKnowledgeBase,
}

pub type Result<T> = std::result::Result<T, PipelineError>;
