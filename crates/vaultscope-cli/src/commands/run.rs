//! Research run command

use crate::app::{OutputFormat, RunArgs};
use crate::output::{json, terminal};
use anyhow::Result;
use std::io::Write;
use vaultscope_core::{Config, Database, ResearchRunner, RunOptions};

pub async fn run(args: RunArgs, db: &Database, config: &Config, format: OutputFormat) -> Result<()> {
    let retrieval = config.retrieval.to_options()?;
    let options = RunOptions {
        vault_doc_ids: (!args.docs.is_empty()).then_some(args.docs),
    };

    let outcome = ResearchRunner::new(db)
        .with_retrieval_options(retrieval)
        .run(args.query_id, &options)
        .await?;

    match format {
        OutputFormat::Json => json::print(&outcome)?,
        OutputFormat::Cli => {
            let mut out = terminal::stdout();
            let rerun = if outcome.rerun { " (re-run)" } else { "" };
            writeln!(
                out,
                "Research complete for query #{}: result #{}{}",
                args.query_id, outcome.research_result_id, rerun
            )?;
            writeln!(out, "  {}", outcome.summary)?;
            write!(out, "  Confidence: ")?;
            terminal::write_confidence(&mut out, outcome.confidence)?;
            writeln!(out)?;
            writeln!(out, "  Citations:  {}", outcome.citation_count)?;
        }
    }
    Ok(())
}
