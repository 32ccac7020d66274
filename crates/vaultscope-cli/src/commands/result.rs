//! Research result commands

use crate::app::{OutputFormat, ResultAction, ResultArgs};
use crate::output::{json, terminal};
use anyhow::Result;
use std::io::Write;
use vaultscope_core::{Database, VaultscopeError};

pub async fn run(args: ResultArgs, db: &Database, format: OutputFormat) -> Result<()> {
    match args.action {
        ResultAction::Show { id } => {
            let result = db.get_result(id)?.ok_or(VaultscopeError::ResultNotFound(id))?;
            let report = result.report()?;
            let reasoning = result.reasoning()?;
            let citations = db.list_citations_for_result(id)?;
            let feedback = db.list_feedback_for_result(id)?;

            match format {
                OutputFormat::Json => json::print(&serde_json::json!({
                    "result": result,
                    "report": report,
                    "reasoning": reasoning,
                    "citations": citations,
                    "feedback": feedback,
                }))?,
                OutputFormat::Cli => {
                    let mut out = terminal::stdout();
                    write!(
                        out,
                        "Result #{} for query #{}  ",
                        result.id, result.research_query_id
                    )?;
                    if let Some(confidence) = result.confidence {
                        terminal::write_confidence(&mut out, confidence)?;
                    }
                    writeln!(out)?;
                    if let Some(ms) = result.duration_ms {
                        writeln!(out, "Duration: {} ms", ms)?;
                    }
                    writeln!(
                        out,
                        "Created:  {}",
                        terminal::format_timestamp(&result.created_at)
                    )?;

                    if let Some(report) = report {
                        writeln!(out)?;
                        writeln!(out, "{}", report.summary)?;
                        for section in &report.sections {
                            writeln!(out)?;
                            writeln!(out, "## {} [{}]", section.heading, section.source_ids.join(", "))?;
                            writeln!(out, "{}", section.text)?;
                        }
                    }

                    if !citations.is_empty() {
                        writeln!(out)?;
                        writeln!(out, "Citations:")?;
                        for (i, citation) in citations.iter().enumerate() {
                            write!(
                                out,
                                "  [{}] {}",
                                i + 1,
                                citation.title.as_deref().unwrap_or("(untitled)")
                            )?;
                            if let Some(ref url) = citation.source_url {
                                write!(out, " <{}>", url)?;
                            }
                            writeln!(out)?;
                        }
                    }

                    if !feedback.is_empty() {
                        writeln!(out)?;
                        writeln!(out, "Feedback:")?;
                        for entry in &feedback {
                            let rating = entry
                                .rating
                                .map(|r| format!("{}/5", r))
                                .unwrap_or_else(|| "-".to_string());
                            writeln!(
                                out,
                                "  {} {}",
                                rating,
                                entry.feedback_text.as_deref().unwrap_or("")
                            )?;
                        }
                    }
                }
            }
        }
        ResultAction::List { query_id } => {
            db.get_query(query_id)?
                .ok_or(VaultscopeError::QueryNotFound(query_id))?;
            let results = db.list_results_for_query(query_id)?;
            match format {
                OutputFormat::Json => json::print(&results)?,
                OutputFormat::Cli => {
                    if results.is_empty() {
                        println!("No results");
                    } else {
                        let mut out = terminal::stdout();
                        for result in &results {
                            terminal::write_result_line(&mut out, result)?;
                        }
                    }
                }
            }
        }
    }
    Ok(())
}
