//! Accumulated statement failures of a merge run.

use std::fmt;

use serde::Serialize;

/// A statement that failed on the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    /// Token that produced the statement, as `name value`.
    pub token: String,
    /// Statement text.
    pub statement: String,
    /// Database or connection error message.
    pub message: String,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.token, self.message, self.statement)
    }
}

/// Failures collected while executing `ToDb` tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    failures: Vec<ValidationFailure>,
}

impl ValidationResult {
    /// An empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure.
    pub fn add_failure(
        &mut self,
        token: impl Into<String>,
        statement: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.failures.push(ValidationFailure {
            token: token.into(),
            statement: statement.into(),
            message: message.into(),
        });
    }

    /// Recorded failures in order.
    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }

    /// Whether every statement succeeded.
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of failures.
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Whether no failures were recorded.
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}
