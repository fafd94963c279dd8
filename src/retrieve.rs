//! Query-time retrieval and context assembly.
//!
//! Embeds the query, finds the nearest chunks in the snapshot's index,
//! and concatenates them (best match first) into the context string the
//! answer generator grounds itself on. Each chunk is labeled with its
//! document name and in-document chunk index so the provenance survives
//! into the final prompt and can be shown to the user.

use crate::corpus::ChunkRef;
use crate::embedding::EmbeddingClient;
use crate::error::Result;
use crate::kb::KnowledgeBase;

/// Retrieve the `top_k` most relevant chunks for `query` and assemble
/// the context string. The result count is clamped to the index size.
pub async fn retrieve(
    query: &str,
    kb: &KnowledgeBase,
    client: &EmbeddingClient,
    top_k: usize,
) -> Result<String> {
    let query_embedding = client.embed_query(query).await?;
    let results = kb.index.search(&query_embedding, top_k)?;
    Ok(build_context(&results, &kb.corpus, &kb.metadata))
}

/// Format ranked search results into the context string, one labeled
/// block per chunk in rank order.
pub fn build_context(
    results: &[(usize, f32)],
    corpus: &[String],
    metadata: &[ChunkRef],
) -> String {
    let mut context = String::new();

    for &(i, _) in results {
        let chunk_ref = &metadata[i];
        context.push_str(&format!(
            "\n[{} - chunk {}]\n{}\n",
            chunk_ref.document, chunk_ref.chunk_index, corpus[i]
        ));
    }

    context
}
