//! Research query commands

use crate::app::{OutputFormat, QueryAction, QueryArgs};
use crate::output::{json, terminal};
use anyhow::Result;
use std::io::Write;
use vaultscope_core::db::QueryFilter;
use vaultscope_core::{Database, ResearchQuery, VaultscopeError};

pub async fn run(args: QueryArgs, db: &Database, format: OutputFormat) -> Result<()> {
    match args.action {
        QueryAction::Add { text, parent } => {
            let query = db.insert_query(&text.join(" "), parent)?;
            match format {
                OutputFormat::Json => json::print(&query)?,
                OutputFormat::Cli => println!("Added query #{}: {}", query.id, query.query_text),
            }
        }
        QueryAction::List {
            status,
            saved,
            parent,
            limit,
        } => {
            let filter = QueryFilter {
                status: status.map(|s| s.parse()).transpose()?,
                saved,
                parent_query_id: parent,
                limit,
            };
            let queries = db.list_queries(&filter)?;
            print_queries(&queries, format)?;
        }
        QueryAction::Show { id } => {
            let query = db.get_query(id)?.ok_or(VaultscopeError::QueryNotFound(id))?;
            let latest = db.latest_result_for_query(id)?;
            match format {
                OutputFormat::Json => json::print(&serde_json::json!({
                    "query": query,
                    "latestResult": latest,
                }))?,
                OutputFormat::Cli => {
                    let mut out = terminal::stdout();
                    write!(out, "Query #{}: ", query.id)?;
                    terminal::write_status(&mut out, query.status)?;
                    writeln!(out)?;
                    writeln!(out, "  {}", query.query_text)?;
                    if let Some(parent) = query.parent_query_id {
                        writeln!(out, "  Refines:  #{}", parent)?;
                    }
                    if let Some(ref saved_at) = query.saved_at {
                        writeln!(out, "  Saved:    {}", terminal::format_timestamp(saved_at))?;
                    }
                    writeln!(
                        out,
                        "  Created:  {}",
                        terminal::format_timestamp(&query.created_at)
                    )?;
                    writeln!(out)?;
                    match latest {
                        Some(result) => {
                            writeln!(out, "Latest result:")?;
                            terminal::write_result_line(&mut out, &result)?;
                        }
                        None => writeln!(out, "No results yet")?,
                    }
                }
            }
        }
        QueryAction::Save { id, unset } => {
            if !db.set_query_saved(id, !unset)? {
                return Err(VaultscopeError::QueryNotFound(id).into());
            }
            match format {
                OutputFormat::Json => {
                    let query = db.get_query(id)?.ok_or(VaultscopeError::QueryNotFound(id))?;
                    json::print(&query)?;
                }
                OutputFormat::Cli if unset => println!("Unsaved query #{}", id),
                OutputFormat::Cli => println!("Saved query #{}", id),
            }
        }
        QueryAction::Related { id } => {
            db.get_query(id)?.ok_or(VaultscopeError::QueryNotFound(id))?;
            let queries = db.list_related_queries(id)?;
            print_queries(&queries, format)?;
        }
    }
    Ok(())
}

fn print_queries(queries: &[ResearchQuery], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => json::print(queries)?,
        OutputFormat::Cli => {
            if queries.is_empty() {
                println!("No queries");
            } else {
                let mut out = terminal::stdout();
                for query in queries {
                    terminal::write_query_line(&mut out, query)?;
                }
            }
        }
    }
    Ok(())
}
