//! Vaultscope Core Library
//!
//! Citation-grounded research synthesis over a private document vault.
//!
//! # Features
//! - SQLite row store for queries, vault documents, results, citations and feedback
//! - Keyword-overlap retrieval over the vault, merged with public-source retrieval
//! - Template synthesis with a bounded confidence score
//! - Citation extraction for every source a report relies on
//! - Run orchestration with `pending -> in_progress -> completed | failed` tracking

pub mod agent;
pub mod config;
pub mod db;
pub mod error;

pub use agent::{
    extract_citations, retrieve, retrieve_with, run_research, score, synthesize,
    CitationRecord, ExternalLiteratureRetriever, ReasoningSnapshot, ReportContent,
    ResearchRunner, ResearchStore, RetrievalOptions, RetrievedChunk, Retriever, RunOptions,
    RunOutcome, SourceType, SynthesisOutput, SynthesisSection, VaultRetriever,
};
pub use config::{Config, RetrievalConfig};
pub use db::{Database, QueryStatus, ResearchMetrics, ResearchQuery, ResearchResult, VaultDocument};
pub use error::{Error, Result, VaultscopeError};

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "vaultscope";

/// Default data directory name
pub const DATA_DIR_NAME: &str = "vaultscope";
