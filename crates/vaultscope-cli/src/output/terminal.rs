//! Terminal output formatter

use chrono::{DateTime, Utc};
use std::io::{self, IsTerminal};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use vaultscope_core::db::DocumentAnnotation;
use vaultscope_core::{QueryStatus, ResearchQuery, ResearchResult, VaultDocument};

/// Stdout stream; colors only when attached to a terminal
pub fn stdout() -> StandardStream {
    let choice = if io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// RFC 3339 timestamp as `YYYY-MM-DD HH:MM UTC`; anything else is returned unchanged
pub fn format_timestamp(ts: &str) -> String {
    DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.with_timezone(&Utc).format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|_| ts.to_string())
}

fn status_color(status: QueryStatus) -> Color {
    match status {
        QueryStatus::Pending => Color::Yellow,
        QueryStatus::InProgress => Color::Cyan,
        QueryStatus::Completed => Color::Green,
        QueryStatus::Failed => Color::Red,
    }
}

fn confidence_color(confidence: f64) -> Color {
    if confidence >= 0.7 {
        Color::Green
    } else if confidence >= 0.4 {
        Color::Yellow
    } else {
        Color::Red
    }
}

pub fn write_status(out: &mut impl WriteColor, status: QueryStatus) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(status_color(status))).set_bold(true))?;
    write!(out, "{}", status)?;
    out.reset()
}

/// Confidence as a whole percentage
pub fn write_confidence(out: &mut impl WriteColor, confidence: f64) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(confidence_color(confidence))))?;
    write!(out, "{:>3}%", (confidence * 100.0).round() as u32)?;
    out.reset()
}

pub fn write_query_line(out: &mut impl WriteColor, query: &ResearchQuery) -> io::Result<()> {
    write!(out, "#{:<5} ", query.id)?;
    write_status(out, query.status)?;
    let saved = if query.is_saved() { " [saved]" } else { "" };
    writeln!(
        out,
        "{} {} ({})",
        saved,
        query.query_text,
        format_timestamp(&query.created_at)
    )
}

pub fn write_document_line(out: &mut impl WriteColor, doc: &VaultDocument) -> io::Result<()> {
    write!(out, "#{:<5} {}", doc.id, doc.title)?;
    if let Some(ref url) = doc.source_url {
        write!(out, " <{}>", url)?;
    }
    writeln!(out, " ({})", format_timestamp(&doc.created_at))
}

pub fn write_annotation_line(
    out: &mut impl WriteColor,
    note: &DocumentAnnotation,
) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_dimmed(true))?;
    write!(out, "#{:<5} {}", note.id, format_timestamp(&note.created_at))?;
    out.reset()?;
    writeln!(out, "  {}", note.note)
}

pub fn write_result_line(out: &mut impl WriteColor, result: &ResearchResult) -> io::Result<()> {
    write!(out, "#{:<5} ", result.id)?;
    match result.confidence {
        Some(confidence) => write_confidence(out, confidence)?,
        None => write!(out, "{:>4}", "-")?,
    }
    writeln!(
        out,
        " {} ({})",
        result.summary.as_deref().unwrap_or(""),
        format_timestamp(&result.created_at)
    )
}
