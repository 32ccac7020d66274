//! Vault document operations

use super::{now, optional, Database, MAX_SOURCE_URL_CHARS, MAX_TITLE_CHARS};
use crate::error::{Result, VaultscopeError};
use rusqlite::{params, Row};
use serde::Serialize;

/// Document record from the private vault
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VaultDocument {
    pub id: i64,
    pub title: String,
    pub content: Option<String>,
    pub source_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl VaultDocument {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            source_url: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

/// Vault document insert parameters
#[derive(Debug, Clone, Default)]
pub struct VaultDocumentInsert<'a> {
    pub title: &'a str,
    pub content: Option<&'a str>,
    pub source_url: Option<&'a str>,
}

const DOCUMENT_COLUMNS: &str = "id, title, content, source_url, created_at, updated_at";

impl Database {
    /// Add a document to the vault
    pub fn insert_vault_document(&self, doc: &VaultDocumentInsert<'_>) -> Result<VaultDocument> {
        let title = doc.title.trim();
        if title.is_empty() {
            return Err(VaultscopeError::InvalidInput(
                "title cannot be empty".to_string(),
            ));
        }
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(VaultscopeError::InvalidInput(format!(
                "title must be at most {} characters",
                MAX_TITLE_CHARS
            )));
        }
        let source_url = doc.source_url.map(str::trim).filter(|u| !u.is_empty());
        if source_url.is_some_and(|u| u.chars().count() > MAX_SOURCE_URL_CHARS) {
            return Err(VaultscopeError::InvalidInput(format!(
                "source URL must be at most {} characters",
                MAX_SOURCE_URL_CHARS
            )));
        }

        let now = now();
        self.conn.execute(
            "INSERT INTO vault_documents (title, content, source_url, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![title, doc.content, source_url, now],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_vault_document(id)?
            .ok_or(VaultscopeError::DocumentNotFound(id))
    }

    /// Get a vault document by id
    pub fn get_vault_document(&self, id: i64) -> Result<Option<VaultDocument>> {
        optional(self.conn.query_row(
            &format!("SELECT {} FROM vault_documents WHERE id = ?1", DOCUMENT_COLUMNS),
            params![id],
            VaultDocument::from_row,
        ))
    }

    /// List vault documents, newest first
    pub fn list_vault_documents(&self, limit: Option<usize>) -> Result<Vec<VaultDocument>> {
        let mut sql = format!(
            "SELECT {} FROM vault_documents ORDER BY created_at DESC, id DESC",
            DOCUMENT_COLUMNS
        );
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        let mut stmt = self.conn.prepare(&sql)?;
        let docs = stmt
            .query_map([], VaultDocument::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(docs)
    }

    /// Case-insensitive substring search over title and content
    pub fn search_vault_documents(&self, text: &str, limit: usize) -> Result<Vec<VaultDocument>> {
        let needle = text.trim();
        if needle.is_empty() {
            return self.list_vault_documents(Some(limit));
        }
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM vault_documents
             WHERE instr(lower(title), lower(?1)) > 0
                OR instr(lower(coalesce(content, '')), lower(?1)) > 0
             ORDER BY created_at DESC, id DESC
             LIMIT ?2",
            DOCUMENT_COLUMNS
        ))?;
        let docs = stmt
            .query_map(params![needle, limit as i64], VaultDocument::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(docs)
    }

    /// Fetch the given documents in id order; unknown ids are skipped
    pub fn get_vault_documents_by_ids(&self, ids: &[i64]) -> Result<Vec<VaultDocument>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = (1..=ids.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM vault_documents WHERE id IN ({}) ORDER BY id",
            DOCUMENT_COLUMNS, placeholders
        ))?;
        let docs = stmt
            .query_map(rusqlite::params_from_iter(ids.iter()), VaultDocument::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(docs)
    }

    /// Delete a vault document. Returns false when the id is unknown.
    pub fn delete_vault_document(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM vault_documents WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }
}
