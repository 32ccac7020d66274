//! Database layer for vaultscope
//!
//! SQLite row store for research queries, vault documents and their notes,
//! results, citations and feedback.

mod annotations;
mod documents;
mod feedback;
mod queries;
mod results;
mod schema;
mod stats;

pub use annotations::DocumentAnnotation;
pub use documents::{VaultDocument, VaultDocumentInsert};
pub use feedback::{FeedbackInsert, UserFeedback};
pub use queries::{QueryFilter, QueryStatus, ResearchQuery};
pub use results::{Citation, CitationInsert, ResearchResult, ResearchResultInsert};
pub use schema::Database;
pub use stats::{RatingBucket, ResearchMetrics};

use std::path::PathBuf;

/// Longest accepted query text, in characters
pub const MAX_QUERY_TEXT_CHARS: usize = 10_000;
/// Longest accepted vault document title
pub const MAX_TITLE_CHARS: usize = 2_000;
/// Longest accepted source URL
pub const MAX_SOURCE_URL_CHARS: usize = 2_000;
/// Longest accepted feedback comment
pub const MAX_FEEDBACK_TEXT_CHARS: usize = 5_000;
/// Longest accepted document note
pub const MAX_NOTE_CHARS: usize = 5_000;

impl Database {
    /// Get the default database path
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::DATA_DIR_NAME)
            .join("research.sqlite")
    }
}

/// Fixed-width UTC timestamp so text ordering matches time ordering
pub(crate) fn now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// Convert `QueryReturnedNoRows` into `None`
pub(crate) fn optional<T>(result: rusqlite::Result<T>) -> crate::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
