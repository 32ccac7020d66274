//! Database schema and initialization

use crate::error::Result;
use rusqlite::{params, Connection};
use std::path::Path;

/// Main database handle
pub struct Database {
    pub(crate) conn: Connection,
}

const SCHEMA_VERSION: i32 = 3;

const CREATE_TABLES: &str = r#"
-- Research questions and their lifecycle
CREATE TABLE IF NOT EXISTS research_queries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    query_text TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending'
        CHECK (status IN ('pending', 'in_progress', 'completed', 'failed')),
    parent_query_id INTEGER REFERENCES research_queries(id) ON DELETE SET NULL,
    saved_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Private document vault
CREATE TABLE IF NOT EXISTS vault_documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    content TEXT,
    source_url TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- One row per successful research run
CREATE TABLE IF NOT EXISTS research_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    research_query_id INTEGER NOT NULL REFERENCES research_queries(id) ON DELETE CASCADE,
    content TEXT,
    summary TEXT,
    confidence REAL,
    duration_ms INTEGER,
    reasoning_snapshot TEXT,
    created_at TEXT NOT NULL
);

-- Sources cited by a result
CREATE TABLE IF NOT EXISTS citations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    research_result_id INTEGER NOT NULL REFERENCES research_results(id) ON DELETE CASCADE,
    source_url TEXT,
    title TEXT,
    snippet TEXT,
    source_id TEXT,
    created_at TEXT NOT NULL
);

-- Append-only user feedback
CREATE TABLE IF NOT EXISTS user_feedback (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    research_result_id INTEGER REFERENCES research_results(id) ON DELETE SET NULL,
    research_query_id INTEGER REFERENCES research_queries(id) ON DELETE SET NULL,
    rating INTEGER CHECK (rating IS NULL OR (rating >= 1 AND rating <= 5)),
    feedback_text TEXT,
    created_at TEXT NOT NULL,
    CHECK (research_result_id IS NOT NULL OR research_query_id IS NOT NULL)
);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_research_queries_status ON research_queries(status);
CREATE INDEX IF NOT EXISTS idx_research_results_query ON research_results(research_query_id);
CREATE INDEX IF NOT EXISTS idx_citations_result ON citations(research_result_id);
CREATE INDEX IF NOT EXISTS idx_user_feedback_result ON user_feedback(research_result_id);
CREATE INDEX IF NOT EXISTS idx_user_feedback_query ON user_feedback(research_query_id);
"#;

impl Database {
    /// Open database at path, creating if necessary
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Open in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Initialize database schema
    pub fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;

        self.conn.execute_batch(CREATE_TABLES)?;

        self.migrate()?;

        self.conn.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;

        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> Result<Option<i32>> {
        let version = self
            .conn
            .query_row(
                "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .ok();
        Ok(version)
    }

    /// Run migrations to upgrade schema to current version
    pub fn migrate(&self) -> Result<()> {
        let current = self.schema_version()?.unwrap_or(0);

        if current < 2 {
            self.migrate_to_v2()?;
        }
        if current < 3 {
            self.migrate_to_v3()?;
        }

        Ok(())
    }

    fn has_column(&self, table: &str, column: &str) -> bool {
        self.conn
            .query_row(
                &format!(
                    "SELECT COUNT(*) > 0 FROM pragma_table_info('{}') WHERE name = ?1",
                    table
                ),
                params![column],
                |row| row.get(0),
            )
            .unwrap_or(false)
    }

    /// v2 added run metrics, citation provenance, query lineage and saving
    fn migrate_to_v2(&self) -> Result<()> {
        let additions = [
            ("research_results", "confidence", "REAL"),
            ("research_results", "duration_ms", "INTEGER"),
            ("research_results", "reasoning_snapshot", "TEXT"),
            ("citations", "source_id", "TEXT"),
            ("research_queries", "saved_at", "TEXT"),
            (
                "research_queries",
                "parent_query_id",
                "INTEGER REFERENCES research_queries(id) ON DELETE SET NULL",
            ),
        ];

        for (table, column, decl) in additions {
            if !self.has_column(table, column) {
                self.conn.execute(
                    &format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, decl),
                    [],
                )?;
            }
        }

        self.conn.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
            params![2],
        )?;

        Ok(())
    }

    /// v3 added notes on vault documents
    fn migrate_to_v3(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS document_annotations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                vault_document_id INTEGER NOT NULL REFERENCES vault_documents(id) ON DELETE CASCADE,
                note TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_document_annotations_document
                ON document_annotations(vault_document_id);",
        )?;

        self.conn.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
            params![3],
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db.initialize().unwrap();
        assert_eq!(db.schema_version().unwrap(), Some(SCHEMA_VERSION));
    }

    #[test]
    fn test_migrates_v1_tables() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute_batch(
                "CREATE TABLE research_queries (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    query_text TEXT NOT NULL,
                    status TEXT NOT NULL DEFAULT 'pending',
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );
                CREATE TABLE research_results (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    research_query_id INTEGER NOT NULL,
                    content TEXT,
                    summary TEXT,
                    created_at TEXT NOT NULL
                );
                CREATE TABLE citations (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    research_result_id INTEGER NOT NULL,
                    source_url TEXT,
                    title TEXT,
                    snippet TEXT,
                    created_at TEXT NOT NULL
                );",
            )
            .unwrap();

        db.initialize().unwrap();

        assert!(db.has_column("research_results", "confidence"));
        assert!(db.has_column("research_results", "reasoning_snapshot"));
        assert!(db.has_column("citations", "source_id"));
        assert!(db.has_column("research_queries", "parent_query_id"));
        assert!(db.has_column("research_queries", "saved_at"));
    }

    #[test]
    fn test_migrates_v2_database_to_annotations() {
        let db = Database::open_in_memory().unwrap();
        db.conn.execute_batch(CREATE_TABLES).unwrap();
        db.conn
            .execute("INSERT INTO schema_version (version) VALUES (2)", [])
            .unwrap();
        assert!(!db.has_column("document_annotations", "note"));

        db.initialize().unwrap();

        assert!(db.has_column("document_annotations", "vault_document_id"));
        assert!(db.has_column("document_annotations", "note"));
        assert_eq!(db.schema_version().unwrap(), Some(SCHEMA_VERSION));
    }
}
