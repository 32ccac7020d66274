//! Research run orchestration
//!
//! A run moves a query `pending -> in_progress -> completed | failed`:
//! retrieve (vault + public) -> synthesize -> cite -> persist. Any error
//! after the query is marked `in_progress` leaves it `failed` before the
//! error reaches the caller. Result and citation writes are separate; a
//! failed citation write leaves the result row in place.

use super::citations::extract_citations;
use super::retrieval::{retrieve_with, ExternalLiteratureRetriever, Retriever, VaultRetriever};
use super::synthesis::synthesize;
use super::types::{
    truncate_chars, CitationRecord, ReasoningSnapshot, ReportContent, RetrievalOptions,
    RetrievedChunk, RunStep, SourceType, SynthesisOutput, SCHEMA_VERSION,
};
use crate::db::{
    Citation, CitationInsert, Database, QueryStatus, ResearchQuery, ResearchResult,
    ResearchResultInsert, VaultDocument,
};
use crate::error::{Result, VaultscopeError};
use serde::Serialize;
use std::collections::HashSet;
use std::time::Instant;

/// Maximum stored length of a result's summary column
pub const RESULT_SUMMARY_MAX_CHARS: usize = 500;

/// Source ids kept in the reasoning snapshot
pub const SNAPSHOT_SOURCE_ID_LIMIT: usize = 50;

/// Row-store operations a research run needs
pub trait ResearchStore {
    fn get_query(&self, id: i64) -> Result<Option<ResearchQuery>>;

    /// Set status; unknown ids are a no-op
    fn update_status(&self, id: i64, status: QueryStatus) -> Result<()>;

    fn get_all_vault_documents(&self) -> Result<Vec<VaultDocument>>;

    fn get_vault_documents_by_ids(&self, ids: &[i64]) -> Result<Vec<VaultDocument>>;

    fn insert_result(&self, result: &ResearchResultInsert<'_>) -> Result<ResearchResult>;

    fn insert_citation(&self, citation: &CitationInsert<'_>) -> Result<Citation>;
}

impl ResearchStore for Database {
    fn get_query(&self, id: i64) -> Result<Option<ResearchQuery>> {
        Database::get_query(self, id)
    }

    fn update_status(&self, id: i64, status: QueryStatus) -> Result<()> {
        self.update_query_status(id, status)
    }

    fn get_all_vault_documents(&self) -> Result<Vec<VaultDocument>> {
        self.list_vault_documents(None)
    }

    fn get_vault_documents_by_ids(&self, ids: &[i64]) -> Result<Vec<VaultDocument>> {
        Database::get_vault_documents_by_ids(self, ids)
    }

    fn insert_result(&self, result: &ResearchResultInsert<'_>) -> Result<ResearchResult> {
        Database::insert_result(self, result)
    }

    fn insert_citation(&self, citation: &CitationInsert<'_>) -> Result<Citation> {
        Database::insert_citation(self, citation)
    }
}

/// Per-run options
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Restrict retrieval to these vault documents; `None` or empty means the whole vault
    pub vault_doc_ids: Option<Vec<i64>>,
}

/// What a successful run returns
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    pub research_result_id: i64,
    pub summary: String,
    pub confidence: f64,
    pub citation_count: usize,
    /// The query had already completed or failed before this run
    pub rerun: bool,
}

/// Runs research for queries held in a [`ResearchStore`]
pub struct ResearchRunner<'s, S: ResearchStore + ?Sized> {
    store: &'s S,
    public: Box<dyn Retriever>,
    retrieval: RetrievalOptions,
}

impl<'s, S: ResearchStore + ?Sized> ResearchRunner<'s, S> {
    /// Runner with the built-in public retriever and default limits
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            public: Box::new(ExternalLiteratureRetriever),
            retrieval: RetrievalOptions::default(),
        }
    }

    /// Replace the public-source retriever
    pub fn with_public_retriever(mut self, retriever: Box<dyn Retriever>) -> Self {
        self.public = retriever;
        self
    }

    pub fn with_retrieval_options(mut self, options: RetrievalOptions) -> Self {
        self.retrieval = options;
        self
    }

    /// Run the full pipeline for one query
    pub async fn run(&self, query_id: i64, options: &RunOptions) -> Result<RunOutcome> {
        let query = match self.store.get_query(query_id) {
            Ok(Some(query)) => query,
            Ok(None) => {
                self.mark_failed(query_id);
                return Err(VaultscopeError::QueryNotFound(query_id));
            }
            Err(e) => {
                self.mark_failed(query_id);
                return Err(e);
            }
        };

        if query.status == QueryStatus::InProgress {
            tracing::warn!(
                "Query {} is already in progress; starting another run anyway",
                query_id
            );
        } else if query.status.is_terminal() {
            tracing::info!("Re-running query {} (was {})", query_id, query.status);
        }

        self.store.update_status(query_id, QueryStatus::InProgress)?;
        tracing::info!("Research run started for query {}", query_id);

        let started = Instant::now();
        match self.execute(&query, options, started).await {
            Ok(outcome) => {
                tracing::info!(
                    "Research run for query {} completed: result {}, {} citation(s), confidence {:.3}, {} ms",
                    query_id,
                    outcome.research_result_id,
                    outcome.citation_count,
                    outcome.confidence,
                    started.elapsed().as_millis()
                );
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!("Research run for query {} failed: {}", query_id, e);
                self.mark_failed(query_id);
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        query: &ResearchQuery,
        options: &RunOptions,
        started: Instant,
    ) -> Result<RunOutcome> {
        let documents = match options.vault_doc_ids.as_deref() {
            Some(ids) if !ids.is_empty() => self.store.get_vault_documents_by_ids(ids)?,
            _ => self.store.get_all_vault_documents()?,
        };

        let vault = VaultRetriever::new(&documents);
        let chunks = retrieve_with(
            &query.query_text,
            &vault,
            self.public.as_ref(),
            &self.retrieval,
        )
        .await?;
        tracing::info!(
            "Query {}: {} chunk(s) from {} vault document(s)",
            query.id,
            chunks.len(),
            documents.len()
        );

        let synthesis = synthesize(&query.query_text, &chunks);
        let used_source_ids = synthesis.section_source_ids();
        let citations = extract_citations(&chunks, &used_source_ids);

        let content = ReportContent::new(&query.query_text, &synthesis).to_json()?;
        let duration_ms = started.elapsed().as_millis() as i64;
        let snapshot = reasoning_snapshot(&chunks, &synthesis, &citations, &used_source_ids);
        let snapshot_json = snapshot.to_json()?;
        let stored_summary = truncate_chars(&synthesis.summary, RESULT_SUMMARY_MAX_CHARS);

        let result = self.store.insert_result(&ResearchResultInsert {
            research_query_id: query.id,
            content: Some(&content),
            summary: Some(&stored_summary),
            confidence: Some(synthesis.confidence),
            duration_ms: Some(duration_ms),
            reasoning_snapshot: Some(&snapshot_json),
        })?;

        for citation in &citations {
            self.store.insert_citation(&CitationInsert {
                research_result_id: result.id,
                source_url: citation.url.as_deref(),
                title: Some(&citation.title),
                snippet: Some(&citation.snippet),
                source_id: Some(&citation.source_id),
            })?;
        }

        self.store.update_status(query.id, QueryStatus::Completed)?;

        Ok(RunOutcome {
            research_result_id: result.id,
            summary: synthesis.summary,
            confidence: synthesis.confidence,
            citation_count: citations.len(),
            rerun: query.status.is_terminal(),
        })
    }

    /// Best-effort `failed` transition; its own error is logged, not returned
    fn mark_failed(&self, query_id: i64) {
        if let Err(e) = self.store.update_status(query_id, QueryStatus::Failed) {
            tracing::warn!("Could not mark query {} as failed: {}", query_id, e);
        }
    }
}

/// Run research with the built-in retrievers and default limits
pub async fn run_research<S: ResearchStore + ?Sized>(
    store: &S,
    query_id: i64,
    options: &RunOptions,
) -> Result<RunOutcome> {
    ResearchRunner::new(store).run(query_id, options).await
}

fn distinct_of_type(chunks: &[RetrievedChunk], source_type: SourceType) -> usize {
    chunks
        .iter()
        .filter(|c| c.source_type == source_type)
        .map(|c| c.source_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

fn reasoning_snapshot(
    chunks: &[RetrievedChunk],
    synthesis: &SynthesisOutput,
    citations: &[CitationRecord],
    used_source_ids: &[String],
) -> ReasoningSnapshot {
    let mut seen = HashSet::new();
    let source_ids = used_source_ids
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .take(SNAPSHOT_SOURCE_ID_LIMIT)
        .cloned()
        .collect();

    ReasoningSnapshot {
        schema_version: SCHEMA_VERSION,
        steps: vec![RunStep::Retrieval, RunStep::Synthesis, RunStep::Cite],
        chunk_count: chunks.len(),
        section_count: synthesis.sections.len(),
        source_count: citations.len(),
        vault_sources: distinct_of_type(chunks, SourceType::Vault),
        public_sources: distinct_of_type(chunks, SourceType::Public),
        source_ids,
    }
}
