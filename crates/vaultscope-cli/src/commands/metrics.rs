//! Metrics command

use crate::app::OutputFormat;
use crate::output::json;
use anyhow::Result;
use vaultscope_core::Database;

fn fmt_avg(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{:.*}", precision, v))
        .unwrap_or_else(|| "-".to_string())
}

pub async fn run(db: &Database, format: OutputFormat) -> Result<()> {
    let metrics = db.research_metrics()?;

    match format {
        OutputFormat::Json => json::print(&metrics)?,
        OutputFormat::Cli => {
            println!("Queries:         {}", metrics.total_queries);
            println!("  Completed:     {}", metrics.completed_queries);
            println!("  Failed:        {}", metrics.failed_queries);
            println!("Runs:            {}", metrics.total_runs);
            println!("  Confidence:    {}", fmt_avg(metrics.avg_confidence, 3));
            println!("  Duration (ms): {}", fmt_avg(metrics.avg_duration_ms, 1));
            println!();
            println!("Feedback:        {}", metrics.total_feedback_count);
            println!("  Avg rating:    {}", fmt_avg(metrics.avg_rating, 2));
            for bucket in &metrics.rating_distribution {
                println!("  {} star(s):     {}", bucket.rating, bucket.count);
            }
        }
    }
    Ok(())
}
