//! CLI command handlers

pub mod feedback;
pub mod metrics;
pub mod query;
pub mod result;
pub mod run;
pub mod vault;
