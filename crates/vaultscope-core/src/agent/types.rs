//! Shared types for retrieval, synthesis and run orchestration

use serde::{Deserialize, Serialize};

/// Version stamped into serialized report content and reasoning snapshots
pub const SCHEMA_VERSION: u32 = 1;

/// Where a chunk came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Vault,
    Public,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Vault => "vault",
            SourceType::Public => "public",
        }
    }
}

/// A retrieved text chunk with provenance and relevance score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievedChunk {
    pub source_type: SourceType,
    /// `vault:<id>` or `public:<slug>`, unique within a run
    pub source_id: String,
    pub title: String,
    pub url: Option<String>,
    pub snippet: String,
    /// Relevance in [0, 1]
    pub score: f64,
}

/// One section of the synthesized report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisSection {
    pub heading: String,
    pub text: String,
    pub source_ids: Vec<String>,
}

/// Output of the synthesis engine
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisOutput {
    pub summary: String,
    pub sections: Vec<SynthesisSection>,
    pub confidence: f64,
}

impl SynthesisOutput {
    /// All section source ids flattened in section order, duplicates kept
    pub fn section_source_ids(&self) -> Vec<String> {
        self.sections
            .iter()
            .flat_map(|s| s.source_ids.iter().cloned())
            .collect()
    }
}

/// Citation record extracted from a run, ready for persistence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitationRecord {
    pub source_id: String,
    pub title: String,
    pub url: Option<String>,
    pub snippet: String,
}

/// Report persisted in `research_results.content`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportContent {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub summary: String,
    pub sections: Vec<SynthesisSection>,
    pub confidence: f64,
    pub query: String,
}

impl ReportContent {
    pub fn new(query: &str, synthesis: &SynthesisOutput) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            summary: synthesis.summary.clone(),
            sections: synthesis.sections.clone(),
            confidence: synthesis.confidence,
            query: query.to_string(),
        }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Pipeline step recorded in the reasoning snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStep {
    Retrieval,
    Synthesis,
    Cite,
}

/// Diagnostic trace persisted with each result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub steps: Vec<RunStep>,
    pub chunk_count: usize,
    pub section_count: usize,
    pub source_count: usize,
    pub vault_sources: usize,
    pub public_sources: usize,
    pub source_ids: Vec<String>,
}

impl ReasoningSnapshot {
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Limits for combined retrieval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalOptions {
    pub vault_limit: usize,
    pub public_limit: usize,
    pub max_total: usize,
}

impl RetrievalOptions {
    pub const DEFAULT_VAULT_LIMIT: usize = 20;
    pub const DEFAULT_PUBLIC_LIMIT: usize = 10;
    pub const DEFAULT_MAX_TOTAL: usize = 25;
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self {
            vault_limit: Self::DEFAULT_VAULT_LIMIT,
            public_limit: Self::DEFAULT_PUBLIC_LIMIT,
            max_total: Self::DEFAULT_MAX_TOTAL,
        }
    }
}

/// Truncate to at most `max` characters
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
