//! # doc-answer CLI (`dqa`)
//!
//! Answers natural-language questions against a private folder of PDF,
//! DOCX, and XLSX documents, and auto-fills spreadsheet questionnaires
//! one row at a time through the same retrieval pipeline.
//!
//! The knowledge base is rebuilt fresh for each invocation — nothing is
//! persisted between runs.
//!
//! ## Usage
//!
//! ```bash
//! # What would be indexed? (no API key needed)
//! dqa stats
//!
//! # Answer one question
//! export OPENAI_API_KEY=sk-...
//! dqa ask "What is the uptime SLA?" --show-context
//!
//! # Auto-fill a questionnaire (questions in column A, header row)
//! dqa fill questionnaire.xlsx --skip-header --output answered.xlsx
//! ```
//!
//! All commands accept `--config` pointing to a TOML file; every setting
//! has a default, so the flag is optional.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use doc_answer::{ask, config, questionnaire, stats};

/// doc-answer — question answering over a private document corpus via
/// retrieval-augmented generation.
#[derive(Parser)]
#[command(
    name = "dqa",
    about = "Question answering over a private PDF/DOCX/XLSX corpus",
    version,
    long_about = "doc-answer chunks and embeds the documents in a local folder, \
    retrieves the chunks closest to a question, and asks a language model to \
    answer from those chunks alone. Questionnaire spreadsheets can be filled \
    row by row through the same pipeline."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Every setting has a default; a missing file is fine. The OpenAI
    /// API key is always read from the OPENAI_API_KEY environment
    /// variable, never from this file.
    #[arg(long, global = true, default_value = "./dqa.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Summarize what a knowledge-base build would index.
    ///
    /// Scans the document folder and chunks every document locally.
    /// Never calls a provider, so it needs no API key.
    Stats,

    /// Answer a single question against the document folder.
    ///
    /// Builds the knowledge base (load, chunk, embed, index), retrieves
    /// the closest chunks, and generates a grounded answer.
    Ask {
        /// The question to answer.
        question: String,

        /// Number of chunks to retrieve as context (defaults to
        /// retrieval.top_k from config).
        #[arg(long)]
        top_k: Option<usize>,

        /// Also print the retrieved context blocks after the answer.
        #[arg(long)]
        show_context: bool,
    },

    /// Auto-fill a questionnaire file, one pipeline run per row.
    ///
    /// Reads questions from the first worksheet of an .xlsx (or one per
    /// line of a text file), answers each sequentially, and writes an
    /// .xlsx with an added "Auto Answer" column.
    Fill {
        /// Questionnaire file (.xlsx, or plain text with one question per line).
        file: PathBuf,

        /// 0-based worksheet column holding the questions.
        #[arg(long, default_value_t = 0)]
        column: usize,

        /// Skip the first row (column headers).
        #[arg(long)]
        skip_header: bool,

        /// Output .xlsx path. Without it, answers are printed to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Stats => {
            stats::run_stats(&cfg)?;
        }
        Commands::Ask {
            question,
            top_k,
            show_context,
        } => {
            ask::run_ask(&cfg, &question, top_k, show_context).await?;
        }
        Commands::Fill {
            file,
            column,
            skip_header,
            output,
        } => {
            questionnaire::run_fill(&cfg, &file, column, skip_header, output.as_deref()).await?;
        }
    }

    Ok(())
}
