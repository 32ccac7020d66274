//! Research results and their citations

use super::{now, optional, Database};
use crate::agent::{ReasoningSnapshot, ReportContent};
use crate::error::{Result, VaultscopeError};
use rusqlite::{params, Row};
use serde::Serialize;

/// Output of one research run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResearchResult {
    pub id: i64,
    pub research_query_id: i64,
    /// Serialized [`ReportContent`]
    pub content: Option<String>,
    pub summary: Option<String>,
    pub confidence: Option<f64>,
    pub duration_ms: Option<i64>,
    /// Serialized [`ReasoningSnapshot`]
    pub reasoning_snapshot: Option<String>,
    pub created_at: String,
}

impl ResearchResult {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            research_query_id: row.get(1)?,
            content: row.get(2)?,
            summary: row.get(3)?,
            confidence: row.get(4)?,
            duration_ms: row.get(5)?,
            reasoning_snapshot: row.get(6)?,
            created_at: row.get(7)?,
        })
    }

    /// Parse the stored report, if any
    pub fn report(&self) -> Result<Option<ReportContent>> {
        self.content.as_deref().map(ReportContent::from_json).transpose()
    }

    /// Parse the stored reasoning snapshot, if any
    pub fn reasoning(&self) -> Result<Option<ReasoningSnapshot>> {
        self.reasoning_snapshot
            .as_deref()
            .map(ReasoningSnapshot::from_json)
            .transpose()
    }
}

/// Result insert parameters
#[derive(Debug, Clone)]
pub struct ResearchResultInsert<'a> {
    pub research_query_id: i64,
    pub content: Option<&'a str>,
    pub summary: Option<&'a str>,
    pub confidence: Option<f64>,
    pub duration_ms: Option<i64>,
    pub reasoning_snapshot: Option<&'a str>,
}

/// A source cited by a result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Citation {
    pub id: i64,
    pub research_result_id: i64,
    pub source_url: Option<String>,
    pub title: Option<String>,
    pub snippet: Option<String>,
    /// Chunk source id this citation was extracted from
    pub source_id: Option<String>,
    pub created_at: String,
}

impl Citation {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            research_result_id: row.get(1)?,
            source_url: row.get(2)?,
            title: row.get(3)?,
            snippet: row.get(4)?,
            source_id: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

/// Citation insert parameters
#[derive(Debug, Clone)]
pub struct CitationInsert<'a> {
    pub research_result_id: i64,
    pub source_url: Option<&'a str>,
    pub title: Option<&'a str>,
    pub snippet: Option<&'a str>,
    pub source_id: Option<&'a str>,
}

const RESULT_COLUMNS: &str =
    "id, research_query_id, content, summary, confidence, duration_ms, reasoning_snapshot, created_at";

const CITATION_COLUMNS: &str =
    "id, research_result_id, source_url, title, snippet, source_id, created_at";

impl Database {
    /// Persist a research result
    pub fn insert_result(&self, result: &ResearchResultInsert<'_>) -> Result<ResearchResult> {
        self.conn.execute(
            "INSERT INTO research_results
                (research_query_id, content, summary, confidence, duration_ms, reasoning_snapshot, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                result.research_query_id,
                result.content,
                result.summary,
                result.confidence,
                result.duration_ms,
                result.reasoning_snapshot,
                now()
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_result(id)?.ok_or(VaultscopeError::ResultNotFound(id))
    }

    /// Get result by id
    pub fn get_result(&self, id: i64) -> Result<Option<ResearchResult>> {
        optional(self.conn.query_row(
            &format!("SELECT {} FROM research_results WHERE id = ?1", RESULT_COLUMNS),
            params![id],
            ResearchResult::from_row,
        ))
    }

    /// All results for a query, newest first
    pub fn list_results_for_query(&self, query_id: i64) -> Result<Vec<ResearchResult>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM research_results WHERE research_query_id = ?1
             ORDER BY created_at DESC, id DESC",
            RESULT_COLUMNS
        ))?;
        let results = stmt
            .query_map(params![query_id], ResearchResult::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(results)
    }

    /// The authoritative (most recent) result for a query
    pub fn latest_result_for_query(&self, query_id: i64) -> Result<Option<ResearchResult>> {
        optional(self.conn.query_row(
            &format!(
                "SELECT {} FROM research_results WHERE research_query_id = ?1
                 ORDER BY created_at DESC, id DESC LIMIT 1",
                RESULT_COLUMNS
            ),
            params![query_id],
            ResearchResult::from_row,
        ))
    }

    /// Persist one citation
    pub fn insert_citation(&self, citation: &CitationInsert<'_>) -> Result<Citation> {
        self.conn.execute(
            "INSERT INTO citations (research_result_id, source_url, title, snippet, source_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                citation.research_result_id,
                citation.source_url,
                citation.title,
                citation.snippet,
                citation.source_id,
                now()
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        let citation = self.conn.query_row(
            &format!("SELECT {} FROM citations WHERE id = ?1", CITATION_COLUMNS),
            params![id],
            Citation::from_row,
        )?;
        Ok(citation)
    }

    /// Citations for a result in insertion order
    pub fn list_citations_for_result(&self, result_id: i64) -> Result<Vec<Citation>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM citations WHERE research_result_id = ?1 ORDER BY id",
            CITATION_COLUMNS
        ))?;
        let citations = stmt
            .query_map(params![result_id], Citation::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(citations)
    }
}
