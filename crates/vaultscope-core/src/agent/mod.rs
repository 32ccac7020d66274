//! Research agent pipeline
//!
//! Provides:
//! - Keyword overlap scoring
//! - Vault and public-source retrieval behind the [`Retriever`] trait
//! - Template synthesis with confidence scoring
//! - Citation extraction
//! - Run orchestration over a [`ResearchStore`]

mod citations;
mod retrieval;
mod runner;
mod scorer;
mod synthesis;
mod types;

pub use citations::*;
pub use retrieval::*;
pub use runner::*;
pub use scorer::{score, score_tokens, tokenize};
pub use synthesis::{compute_confidence, synthesize, SECTION_TEXT_MAX_CHARS, SUMMARY_QUERY_MAX_CHARS};
pub use types::*;
