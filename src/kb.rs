//! Knowledge-base snapshot construction.
//!
//! The corpus, its provenance metadata, and the vector index form one
//! atomic snapshot: they are built together from the same document scan
//! and replaced together. Nothing mutates a snapshot after it is built,
//! which is what keeps the positional alignment between corpus entries,
//! metadata entries, and index vectors trustworthy at query time.
//!
//! Refreshing the knowledge base means building a new snapshot and
//! letting the old one drop; there is no partial or incremental update.

use std::path::Path;

use crate::config::Config;
use crate::corpus::{build_corpus, ChunkRef};
use crate::embedding::EmbeddingClient;
use crate::error::{PipelineError, Result};
use crate::index::VectorIndex;
use crate::loader;

/// One immutable version of the knowledge base.
pub struct KnowledgeBase {
    pub corpus: Vec<String>,
    pub metadata: Vec<ChunkRef>,
    pub index: VectorIndex,
}

impl KnowledgeBase {
    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }
}

/// Scan the document folder and build a fresh snapshot.
///
/// Fails with [`PipelineError::EmptyKnowledgeBase`] before any provider
/// call when the folder yields no chunks, so an empty folder never turns
/// into a deep failure inside embedding or index construction.
pub async fn build_knowledge_base(
    config: &Config,
    client: &EmbeddingClient,
) -> Result<KnowledgeBase> {
    let documents = loader::load_all_documents(&config.data.folder);
    build_from_documents(&documents, config.chunking.chunk_size, client).await
}

/// Build a snapshot from already-loaded documents.
pub async fn build_from_documents(
    documents: &[(String, String)],
    chunk_size: usize,
    client: &EmbeddingClient,
) -> Result<KnowledgeBase> {
    let (corpus, metadata) = build_corpus(documents, chunk_size)?;

    if corpus.is_empty() {
        return Err(PipelineError::EmptyKnowledgeBase);
    }

    let embeddings = client.embed(&corpus).await?;

    // The corpus contains no blank chunks, so the provider must return
    // exactly one vector per chunk; anything else would desync the
    // index positions from the metadata.
    if embeddings.len() != corpus.len() {
        return Err(PipelineError::EmbeddingProvider(format!(
            "got {} embeddings for {} corpus chunks",
            embeddings.len(),
            corpus.len()
        )));
    }

    let index = VectorIndex::build(embeddings)?;

    Ok(KnowledgeBase {
        corpus,
        metadata,
        index,
    })
}

/// Local-only summary of what a snapshot build would index.
pub struct CorpusStats {
    pub documents: usize,
    pub chunks: usize,
}

/// Scan and chunk without touching any provider. Used by `dqa stats`.
pub fn corpus_stats(folder: &Path, chunk_size: usize) -> Result<CorpusStats> {
    let documents = loader::load_all_documents(folder);
    let (corpus, _) = build_corpus(&documents, chunk_size)?;
    Ok(CorpusStats {
        documents: documents.len(),
        chunks: corpus.len(),
    })
}
