//! CLI error types and result alias.

use dbsync_merge::MergeError;
use dbsync_schema::SchemaError;
use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// IO error
    #[error("IO error: {0}")]
    #[diagnostic(code(dbsync::io))]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    #[diagnostic(code(dbsync::config))]
    Config(String),

    /// Schema loading error
    #[error("Schema error: {0}")]
    #[diagnostic(code(dbsync::schema))]
    Schema(String),

    /// Validation error
    #[error("Validation error: {0}")]
    #[diagnostic(code(dbsync::validation))]
    Validation(String),

    /// Merge error
    #[error("Merge error: {0}")]
    #[diagnostic(code(dbsync::merge))]
    Merge(String),

    /// Output formatting error
    #[error("Format error: {0}")]
    #[diagnostic(code(dbsync::format))]
    Format(String),
}

impl From<SchemaError> for CliError {
    fn from(err: SchemaError) -> Self {
        CliError::Schema(err.to_string())
    }
}

impl From<MergeError> for CliError {
    fn from(err: MergeError) -> Self {
        match err {
            MergeError::Config(msg) => CliError::Config(msg),
            MergeError::UnknownDialect(name) => {
                CliError::Config(format!("unknown dialect '{}'", name))
            }
            MergeError::Schema(err) => err.into(),
            other => CliError::Merge(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Format(format!("Failed to serialize JSON: {}", err))
    }
}
