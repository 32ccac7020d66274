//! Notes attached to vault documents

use super::{now, optional, Database, MAX_NOTE_CHARS};
use crate::error::{Result, VaultscopeError};
use rusqlite::{params, Row};
use serde::Serialize;

/// Free-text note on a vault document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentAnnotation {
    pub id: i64,
    pub vault_document_id: i64,
    pub note: String,
    pub created_at: String,
}

impl DocumentAnnotation {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            vault_document_id: row.get(1)?,
            note: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}

const ANNOTATION_COLUMNS: &str = "id, vault_document_id, note, created_at";

impl Database {
    /// Attach a note to a vault document
    pub fn insert_annotation(&self, document_id: i64, note: &str) -> Result<DocumentAnnotation> {
        let note = note.trim();
        if note.is_empty() {
            return Err(VaultscopeError::InvalidInput(
                "note cannot be empty".to_string(),
            ));
        }
        if note.chars().count() > MAX_NOTE_CHARS {
            return Err(VaultscopeError::InvalidInput(format!(
                "note must be at most {} characters",
                MAX_NOTE_CHARS
            )));
        }
        if self.get_vault_document(document_id)?.is_none() {
            return Err(VaultscopeError::DocumentNotFound(document_id));
        }

        self.conn.execute(
            "INSERT INTO document_annotations (vault_document_id, note, created_at)
             VALUES (?1, ?2, ?3)",
            params![document_id, note, now()],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_annotation(id)?
            .ok_or(VaultscopeError::AnnotationNotFound(id))
    }

    /// Get an annotation by id
    pub fn get_annotation(&self, id: i64) -> Result<Option<DocumentAnnotation>> {
        optional(self.conn.query_row(
            &format!(
                "SELECT {} FROM document_annotations WHERE id = ?1",
                ANNOTATION_COLUMNS
            ),
            params![id],
            DocumentAnnotation::from_row,
        ))
    }

    /// Notes on one document, newest first
    pub fn list_annotations_for_document(&self, document_id: i64) -> Result<Vec<DocumentAnnotation>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM document_annotations
             WHERE vault_document_id = ?1
             ORDER BY created_at DESC, id DESC",
            ANNOTATION_COLUMNS
        ))?;
        let notes = stmt
            .query_map(params![document_id], DocumentAnnotation::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(notes)
    }

    /// Delete an annotation. Returns false when the id is unknown.
    pub fn delete_annotation(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM document_annotations WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }
}
