//! # doc-answer
//!
//! Question answering over a small private document corpus (PDF, DOCX,
//! XLSX) via retrieval-augmented generation, plus questionnaire
//! auto-fill that runs the same pipeline once per spreadsheet row.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────────┐   ┌───────────┐   ┌────────────┐
//! │  Loader  │──▶│ Corpus Builder │──▶│ Embedding │──▶│ Flat L2    │
//! │ PDF/OOXML│   │  (chunking)    │   │  Service  │   │ Index      │
//! └──────────┘   └────────────────┘   └───────────┘   └─────┬──────┘
//!                                                           │
//!      query ──▶ embed ──▶ search ──▶ context ──▶ generate ──▶ answer
//! ```
//!
//! The corpus, its provenance metadata, and the index form one immutable
//! snapshot ([`kb::KnowledgeBase`]); refreshing the document set builds a
//! new snapshot and replaces the old one wholesale.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Pipeline error taxonomy |
//! | [`chunk`] | Fixed-size text chunking |
//! | [`corpus`] | Corpus + provenance metadata construction |
//! | [`embedding`] | OpenAI embedding client (batched) |
//! | [`index`] | Exhaustive L2 nearest-neighbor index |
//! | [`retrieve`] | Query-time retrieval and context assembly |
//! | [`generate`] | Grounded answer generation |
//! | [`extract`] | PDF/DOCX/XLSX text extraction |
//! | [`loader`] | Document folder scanning |
//! | [`kb`] | Knowledge-base snapshot construction |
//! | [`questionnaire`] | Tabular auto-fill and XLSX export |

pub mod ask;
pub mod chunk;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod generate;
pub mod index;
pub mod kb;
pub mod loader;
pub mod questionnaire;
pub mod retrieve;
pub mod stats;
