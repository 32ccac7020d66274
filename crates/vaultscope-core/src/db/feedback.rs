//! User feedback on queries and results

use super::{now, Database, MAX_FEEDBACK_TEXT_CHARS};
use crate::error::{Result, VaultscopeError};
use rusqlite::{params, Row};
use serde::Serialize;

/// Feedback record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserFeedback {
    pub id: i64,
    pub research_result_id: Option<i64>,
    pub research_query_id: Option<i64>,
    pub rating: Option<i64>,
    pub feedback_text: Option<String>,
    pub created_at: String,
}

impl UserFeedback {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            research_result_id: row.get(1)?,
            research_query_id: row.get(2)?,
            rating: row.get(3)?,
            feedback_text: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

/// Feedback insert parameters; at least one reference must be set
#[derive(Debug, Clone, Default)]
pub struct FeedbackInsert<'a> {
    pub research_result_id: Option<i64>,
    pub research_query_id: Option<i64>,
    pub rating: Option<i64>,
    pub feedback_text: Option<&'a str>,
}

impl FeedbackInsert<'_> {
    fn validate(&self) -> Result<()> {
        if self.research_result_id.is_none() && self.research_query_id.is_none() {
            return Err(VaultscopeError::InvalidInput(
                "feedback needs a result id or a query id".to_string(),
            ));
        }
        if let Some(rating) = self.rating {
            if !(1..=5).contains(&rating) {
                return Err(VaultscopeError::InvalidInput(format!(
                    "rating must be between 1 and 5, got {}",
                    rating
                )));
            }
        }
        if self
            .feedback_text
            .map(str::trim)
            .is_some_and(|t| t.chars().count() > MAX_FEEDBACK_TEXT_CHARS)
        {
            return Err(VaultscopeError::InvalidInput(format!(
                "feedback text must be at most {} characters",
                MAX_FEEDBACK_TEXT_CHARS
            )));
        }
        Ok(())
    }
}

const FEEDBACK_COLUMNS: &str =
    "id, research_result_id, research_query_id, rating, feedback_text, created_at";

impl Database {
    /// Append feedback
    pub fn insert_feedback(&self, feedback: &FeedbackInsert<'_>) -> Result<UserFeedback> {
        feedback.validate()?;
        let text = feedback
            .feedback_text
            .map(str::trim)
            .filter(|t| !t.is_empty());

        self.conn.execute(
            "INSERT INTO user_feedback (research_result_id, research_query_id, rating, feedback_text, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                feedback.research_result_id,
                feedback.research_query_id,
                feedback.rating,
                text,
                now()
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        let row = self.conn.query_row(
            &format!("SELECT {} FROM user_feedback WHERE id = ?1", FEEDBACK_COLUMNS),
            params![id],
            UserFeedback::from_row,
        )?;
        Ok(row)
    }

    /// Feedback attached to a result, newest first
    pub fn list_feedback_for_result(&self, result_id: i64) -> Result<Vec<UserFeedback>> {
        self.list_feedback_where("research_result_id", result_id)
    }

    /// Feedback attached to a query, newest first
    pub fn list_feedback_for_query(&self, query_id: i64) -> Result<Vec<UserFeedback>> {
        self.list_feedback_where("research_query_id", query_id)
    }

    fn list_feedback_where(&self, column: &str, id: i64) -> Result<Vec<UserFeedback>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM user_feedback WHERE {} = ?1 ORDER BY created_at DESC, id DESC",
            FEEDBACK_COLUMNS, column
        ))?;
        let rows = stmt
            .query_map(params![id], UserFeedback::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
