//! Error types for vaultscope

use thiserror::Error;

/// Result type alias using VaultscopeError
pub type Result<T> = std::result::Result<T, VaultscopeError>;

/// Error type alias for convenience
pub type Error = VaultscopeError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
}

/// Main error type for vaultscope
#[derive(Debug, Error)]
pub enum VaultscopeError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Query not found: {0}")]
    QueryNotFound(i64),

    #[error("Result not found: {0}")]
    ResultNotFound(i64),

    #[error("Document not found: {0}")]
    DocumentNotFound(i64),

    #[error("Note not found: {0}")]
    AnnotationNotFound(i64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl VaultscopeError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::QueryNotFound(_)
            | Self::ResultNotFound(_)
            | Self::DocumentNotFound(_)
            | Self::AnnotationNotFound(_) => exit_codes::NOT_FOUND,
            Self::InvalidInput(_) | Self::Config(_) => exit_codes::INVALID_INPUT,
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}
