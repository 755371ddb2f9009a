//! Error types for the merge engine.

use dbsync_schema::{SchemaError, SqlType};
use thiserror::Error;

/// Result type alias for merge operations.
pub type MergeResult<T> = Result<T, MergeError>;

/// Errors that abort a merge.
///
/// Failures of individual DDL statements are not errors: they are recorded in a
/// [`ValidationResult`](crate::validation::ValidationResult) and the merge continues.
#[derive(Debug, Error)]
pub enum MergeError {
    /// A column type has no database type in the active adapter.
    #[error("no database type for `{table}.{column}` of SQL type {sql_type}")]
    UnmappedType {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
        /// The unmapped SQL type.
        sql_type: SqlType,
    },

    /// Applying a token to the in-memory model failed.
    #[error("Model error: {0}")]
    Model(String),

    /// Schema loading or naming error.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A connection could not be opened.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A statement failed on the database.
    #[error("Database error: {0}")]
    Database(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unknown SQL dialect name.
    #[error("Unknown dialect '{0}'")]
    UnknownDialect(String),

    /// General merge error.
    #[error("Merge error: {0}")]
    Other(String),
}

impl MergeError {
    /// Create a model error.
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a database error.
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an other error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an unmapped type error.
    pub fn unmapped_type(
        table: impl Into<String>,
        column: impl Into<String>,
        sql_type: SqlType,
    ) -> Self {
        Self::UnmappedType {
            table: table.into(),
            column: column.into(),
            sql_type,
        }
    }

    /// Whether the executor records this error and moves on instead of aborting.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Database(_))
    }
}
