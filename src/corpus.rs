//! Corpus builder.
//!
//! Turns an ordered set of (document name, raw text) pairs into a flat
//! corpus of chunk texts plus positionally aligned provenance metadata.
//! The alignment invariant `corpus.len() == metadata.len()` with
//! `corpus[i]` described by `metadata[i]` holds for every output and is
//! what the vector index's result positions are resolved against.
//!
//! Whitespace-only chunks are filtered out here rather than at embedding
//! time. The embedding provider rejects blank input, and dropping blanks
//! any later would shift embeddings relative to the corpus and silently
//! break the alignment invariant.

use crate::chunk::chunk_text;
use crate::error::Result;

/// Provenance of one corpus entry: which document it came from and the
/// chunk's 0-based position within that document's split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRef {
    pub document: String,
    pub chunk_index: usize,
}

/// Build the corpus and its metadata from documents in input order.
///
/// Documents with empty or whitespace-only text contribute nothing.
/// An empty input produces an empty corpus; callers must treat that as
/// "no knowledge base" and never hand it to the embedding service.
pub fn build_corpus(
    documents: &[(String, String)],
    chunk_size: usize,
) -> Result<(Vec<String>, Vec<ChunkRef>)> {
    let mut corpus = Vec::new();
    let mut metadata = Vec::new();

    for (name, text) in documents {
        let chunks = chunk_text(text, chunk_size)?;
        for (i, chunk) in chunks.into_iter().enumerate() {
            if chunk.trim().is_empty() {
                continue;
            }
            corpus.push(chunk);
            metadata.push(ChunkRef {
                document: name.clone(),
                chunk_index: i,
            });
        }
    }

    Ok((corpus, metadata))
}
