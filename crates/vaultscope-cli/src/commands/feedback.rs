//! Feedback commands

use crate::app::{FeedbackAction, FeedbackArgs, OutputFormat};
use crate::output::json;
use anyhow::Result;
use vaultscope_core::db::FeedbackInsert;
use vaultscope_core::{Database, VaultscopeError};

pub async fn run(args: FeedbackArgs, db: &Database, format: OutputFormat) -> Result<()> {
    match args.action {
        FeedbackAction::Add {
            result,
            query,
            rating,
            comment,
        } => {
            let feedback = db.insert_feedback(&FeedbackInsert {
                research_result_id: result,
                research_query_id: query,
                rating,
                feedback_text: comment.as_deref(),
            })?;
            match format {
                OutputFormat::Json => json::print(&feedback)?,
                OutputFormat::Cli => println!("Recorded feedback #{}", feedback.id),
            }
        }
        FeedbackAction::List { result, query } => {
            let entries = match (result, query) {
                (Some(id), _) => db.list_feedback_for_result(id)?,
                (None, Some(id)) => db.list_feedback_for_query(id)?,
                (None, None) => {
                    return Err(VaultscopeError::InvalidInput(
                        "pass --result or --query".to_string(),
                    )
                    .into())
                }
            };
            match format {
                OutputFormat::Json => json::print(&entries)?,
                OutputFormat::Cli => {
                    if entries.is_empty() {
                        println!("No feedback");
                    }
                    for entry in &entries {
                        let rating = entry
                            .rating
                            .map(|r| format!("{}/5", r))
                            .unwrap_or_else(|| "-".to_string());
                        println!(
                            "#{:<5} {:>3} {}",
                            entry.id,
                            rating,
                            entry.feedback_text.as_deref().unwrap_or("")
                        );
                    }
                }
            }
        }
    }
    Ok(())
}
