//! Research query operations

use super::{now, optional, Database, MAX_QUERY_TEXT_CHARS};
use crate::error::{Result, VaultscopeError};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of a research query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl QueryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStatus::Pending => "pending",
            QueryStatus::InProgress => "in_progress",
            QueryStatus::Completed => "completed",
            QueryStatus::Failed => "failed",
        }
    }

    /// Completed and failed end a run; a new run may start from either
    pub fn is_terminal(&self) -> bool {
        matches!(self, QueryStatus::Completed | QueryStatus::Failed)
    }
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryStatus {
    type Err = VaultscopeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(QueryStatus::Pending),
            "in_progress" => Ok(QueryStatus::InProgress),
            "completed" => Ok(QueryStatus::Completed),
            "failed" => Ok(QueryStatus::Failed),
            other => Err(VaultscopeError::InvalidInput(format!(
                "Unknown query status: {}",
                other
            ))),
        }
    }
}

impl ToSql for QueryStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for QueryStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        text.parse().map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// Research query record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResearchQuery {
    pub id: i64,
    pub query_text: String,
    pub status: QueryStatus,
    /// Query this one refines, if any
    pub parent_query_id: Option<i64>,
    pub saved_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ResearchQuery {
    pub fn is_saved(&self) -> bool {
        self.saved_at.is_some()
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            query_text: row.get(1)?,
            status: row.get(2)?,
            parent_query_id: row.get(3)?,
            saved_at: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

const QUERY_COLUMNS: &str =
    "id, query_text, status, parent_query_id, saved_at, created_at, updated_at";

/// Filters for listing queries
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    pub status: Option<QueryStatus>,
    /// Only saved queries
    pub saved: bool,
    pub parent_query_id: Option<i64>,
    pub limit: Option<usize>,
}

/// Trim and bound query text
fn validate_query_text(text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(VaultscopeError::InvalidInput(
            "query text cannot be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_QUERY_TEXT_CHARS {
        return Err(VaultscopeError::InvalidInput(format!(
            "query text must be at most {} characters",
            MAX_QUERY_TEXT_CHARS
        )));
    }
    Ok(trimmed.to_string())
}

impl Database {
    /// Submit a new query in `pending` state
    pub fn insert_query(&self, query_text: &str, parent_query_id: Option<i64>) -> Result<ResearchQuery> {
        let text = validate_query_text(query_text)?;
        if let Some(parent) = parent_query_id {
            if self.get_query(parent)?.is_none() {
                return Err(VaultscopeError::QueryNotFound(parent));
            }
        }

        let now = now();
        self.conn.execute(
            "INSERT INTO research_queries (query_text, status, parent_query_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![text, QueryStatus::Pending, parent_query_id, now],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_query(id)?.ok_or(VaultscopeError::QueryNotFound(id))
    }

    /// Get query by id
    pub fn get_query(&self, id: i64) -> Result<Option<ResearchQuery>> {
        optional(self.conn.query_row(
            &format!("SELECT {} FROM research_queries WHERE id = ?1", QUERY_COLUMNS),
            params![id],
            ResearchQuery::from_row,
        ))
    }

    /// List queries, newest first
    pub fn list_queries(&self, filter: &QueryFilter) -> Result<Vec<ResearchQuery>> {
        let mut sql = format!("SELECT {} FROM research_queries WHERE 1 = 1", QUERY_COLUMNS);
        let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(status) = filter.status {
            sql.push_str(&format!(" AND status = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(status));
        }

        if filter.saved {
            sql.push_str(" AND saved_at IS NOT NULL");
        }

        if let Some(parent) = filter.parent_query_id {
            sql.push_str(&format!(" AND parent_query_id = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(parent));
        }

        sql.push_str(" ORDER BY created_at DESC, id DESC");

        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let queries = stmt
            .query_map(
                rusqlite::params_from_iter(params_vec.iter().map(|p| p.as_ref())),
                ResearchQuery::from_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(queries)
    }

    /// Queries that refine the given one
    pub fn list_related_queries(&self, id: i64) -> Result<Vec<ResearchQuery>> {
        self.list_queries(&QueryFilter {
            parent_query_id: Some(id),
            limit: Some(50),
            ..Default::default()
        })
    }

    /// Set status and bump `updated_at`; unknown ids are a no-op
    pub fn update_query_status(&self, id: i64, status: QueryStatus) -> Result<()> {
        self.conn.execute(
            "UPDATE research_queries SET status = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, status, now()],
        )?;
        Ok(())
    }

    /// Mark or unmark a query as saved. Returns false when the id is unknown.
    pub fn set_query_saved(&self, id: i64, saved: bool) -> Result<bool> {
        let now = now();
        let saved_at = saved.then(|| now.clone());
        let rows = self.conn.execute(
            "UPDATE research_queries SET saved_at = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, saved_at, now],
        )?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup();
        let q = db.insert_query("  What is agentic AI?  ", None).unwrap();
        assert_eq!(q.query_text, "What is agentic AI?");
        assert_eq!(q.status, QueryStatus::Pending);
        assert!(!q.is_saved());

        let fetched = db.get_query(q.id).unwrap().unwrap();
        assert_eq!(fetched, q);
        assert!(db.get_query(9999).unwrap().is_none());
    }

    #[test]
    fn test_insert_validation() {
        let db = setup();
        assert!(matches!(
            db.insert_query("   ", None),
            Err(VaultscopeError::InvalidInput(_))
        ));
        let too_long = "a".repeat(MAX_QUERY_TEXT_CHARS + 1);
        assert!(matches!(
            db.insert_query(&too_long, None),
            Err(VaultscopeError::InvalidInput(_))
        ));
        assert!(matches!(
            db.insert_query("refine", Some(77)),
            Err(VaultscopeError::QueryNotFound(77))
        ));
    }

    #[test]
    fn test_status_update_and_noop() {
        let db = setup();
        let q = db.insert_query("status", None).unwrap();
        db.update_query_status(q.id, QueryStatus::InProgress).unwrap();
        assert_eq!(db.get_query(q.id).unwrap().unwrap().status, QueryStatus::InProgress);

        // Unknown id must not error
        db.update_query_status(424242, QueryStatus::Failed).unwrap();
    }

    #[test]
    fn test_saved_toggle_and_filter() {
        let db = setup();
        let a = db.insert_query("first", None).unwrap();
        let b = db.insert_query("second", None).unwrap();

        assert!(db.set_query_saved(a.id, true).unwrap());
        assert!(!db.set_query_saved(999, true).unwrap());

        let saved = db
            .list_queries(&QueryFilter {
                saved: true,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, a.id);
        assert!(saved[0].saved_at.is_some());

        db.set_query_saved(a.id, false).unwrap();
        assert!(!db.get_query(a.id).unwrap().unwrap().is_saved());
        assert!(!db.get_query(b.id).unwrap().unwrap().is_saved());
    }

    #[test]
    fn test_list_newest_first_with_filters() {
        let db = setup();
        let a = db.insert_query("one", None).unwrap();
        let b = db.insert_query("two", None).unwrap();
        let c = db.insert_query("three", Some(a.id)).unwrap();
        db.update_query_status(b.id, QueryStatus::Completed).unwrap();

        let all = db.list_queries(&QueryFilter::default()).unwrap();
        let ids: Vec<_> = all.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);

        let completed = db
            .list_queries(&QueryFilter {
                status: Some(QueryStatus::Completed),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, b.id);

        let limited = db
            .list_queries(&QueryFilter {
                limit: Some(2),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(limited.len(), 2);

        let related = db.list_related_queries(a.id).unwrap();
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].id, c.id);
        assert_eq!(related[0].parent_query_id, Some(a.id));
    }

    #[test]
    fn test_status_parse_round_trip() {
        for status in [
            QueryStatus::Pending,
            QueryStatus::InProgress,
            QueryStatus::Completed,
            QueryStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<QueryStatus>().unwrap(), status);
        }
        assert!("running".parse::<QueryStatus>().is_err());
        assert!(QueryStatus::Failed.is_terminal());
        assert!(!QueryStatus::InProgress.is_terminal());
    }
}
