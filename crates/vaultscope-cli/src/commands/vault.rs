//! Vault document commands

use crate::app::{NoteAction, OutputFormat, VaultAction, VaultArgs};
use crate::output::{json, terminal};
use anyhow::Result;
use vaultscope_core::db::VaultDocumentInsert;
use vaultscope_core::{Database, VaultscopeError};

const DEFAULT_SEARCH_LIMIT: usize = 50;

pub async fn run(args: VaultArgs, db: &Database, format: OutputFormat) -> Result<()> {
    match args.action {
        VaultAction::Add {
            title,
            content,
            file,
            url,
        } => {
            let content = match file {
                Some(path) => Some(std::fs::read_to_string(&path)?),
                None => content,
            };
            let doc = db.insert_vault_document(&VaultDocumentInsert {
                title: &title,
                content: content.as_deref(),
                source_url: url.as_deref(),
            })?;
            match format {
                OutputFormat::Json => json::print(&doc)?,
                OutputFormat::Cli => println!("Added document #{}: {}", doc.id, doc.title),
            }
        }
        VaultAction::List { limit, search } => {
            let docs = match search {
                Some(text) => {
                    db.search_vault_documents(&text, limit.unwrap_or(DEFAULT_SEARCH_LIMIT))?
                }
                None => db.list_vault_documents(limit)?,
            };
            match format {
                OutputFormat::Json => json::print(&docs)?,
                OutputFormat::Cli => {
                    if docs.is_empty() {
                        println!("No documents");
                    } else {
                        let mut out = terminal::stdout();
                        for doc in &docs {
                            terminal::write_document_line(&mut out, doc)?;
                        }
                    }
                }
            }
        }
        VaultAction::Remove { id } => {
            if !db.delete_vault_document(id)? {
                return Err(VaultscopeError::DocumentNotFound(id).into());
            }
            match format {
                OutputFormat::Json => json::print(&serde_json::json!({ "deleted": id }))?,
                OutputFormat::Cli => println!("Removed document #{}", id),
            }
        }
        VaultAction::Note { action } => run_note(action, db, format)?,
    }
    Ok(())
}

fn run_note(action: NoteAction, db: &Database, format: OutputFormat) -> Result<()> {
    match action {
        NoteAction::Add { doc_id, text } => {
            let note = db.insert_annotation(doc_id, &text.join(" "))?;
            match format {
                OutputFormat::Json => json::print(&note)?,
                OutputFormat::Cli => {
                    println!("Added note #{} to document #{}", note.id, note.vault_document_id)
                }
            }
        }
        NoteAction::List { doc_id } => {
            if db.get_vault_document(doc_id)?.is_none() {
                return Err(VaultscopeError::DocumentNotFound(doc_id).into());
            }
            let notes = db.list_annotations_for_document(doc_id)?;
            match format {
                OutputFormat::Json => json::print(&notes)?,
                OutputFormat::Cli => {
                    if notes.is_empty() {
                        println!("No notes");
                    } else {
                        let mut out = terminal::stdout();
                        for note in &notes {
                            terminal::write_annotation_line(&mut out, note)?;
                        }
                    }
                }
            }
        }
        NoteAction::Remove { id } => {
            if !db.delete_annotation(id)? {
                return Err(VaultscopeError::AnnotationNotFound(id).into());
            }
            match format {
                OutputFormat::Json => json::print(&serde_json::json!({ "deleted": id }))?,
                OutputFormat::Cli => println!("Removed note #{}", id),
            }
        }
    }
    Ok(())
}
