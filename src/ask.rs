//! The `ask` command: answer a single question against the corpus.

use anyhow::{bail, Result};

use crate::config::Config;
use crate::embedding::EmbeddingClient;
use crate::error::PipelineError;
use crate::generate::ChatClient;
use crate::kb;
use crate::retrieve;

pub async fn run_ask(
    config: &Config,
    question: &str,
    top_k: Option<usize>,
    show_context: bool,
) -> Result<()> {
    if question.trim().is_empty() {
        bail!("Question is empty.");
    }

    let embed_client = EmbeddingClient::new(&config.openai)?;
    let chat_client = ChatClient::new(&config.openai)?;

    println!("Building knowledge base from {}...", config.data.folder.display());
    let knowledge_base = match kb::build_knowledge_base(config, &embed_client).await {
        Ok(kb) => kb,
        Err(PipelineError::EmptyKnowledgeBase) => {
            println!(
                "No knowledge base: no usable documents in {}.",
                config.data.folder.display()
            );
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    println!("  indexed chunks: {}", knowledge_base.len());

    let top_k = top_k.unwrap_or(config.retrieval.top_k);
    let context = retrieve::retrieve(question, &knowledge_base, &embed_client, top_k).await?;
    let answer = chat_client.generate(question, &context).await?;

    println!();
    println!("Answer:");
    println!("{}", answer);

    if show_context {
        println!();
        println!("Retrieved context:");
        println!("{}", context);
    }

    Ok(())
}
