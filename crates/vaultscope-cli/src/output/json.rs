//! JSON output formatter

use anyhow::Result;
use serde::Serialize;

/// Pretty-print any record as JSON on stdout
pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
