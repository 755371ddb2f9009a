//! Running token batches.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::adapter::DbAdapter;
use crate::context::MergerContext;
use crate::error::MergeResult;
use crate::sort::sort_tokens;
use crate::sql::SqlStatement;
use crate::token::{MergeDirection, MergerToken};
use crate::validation::ValidationResult;

/// Executes tokens against a [`MergerContext`].
///
/// Tokens run one after another in the order given. Callers sort first with
/// [`sort_tokens`] or use a [`MergePlan`]. There is no rollback: tokens that
/// ran before an error stay applied.
pub struct MergeExecutor<'a> {
    context: MergerContext<'a>,
}

impl<'a> MergeExecutor<'a> {
    pub fn new(context: MergerContext<'a>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &MergerContext<'a> {
        &self.context
    }

    /// Hand the context back, e.g. to reuse its connection factory.
    pub fn into_context(self) -> MergerContext<'a> {
        self.context
    }

    /// Execute `tokens` in order.
    ///
    /// Returns the statement failures of this batch. Stops at the first
    /// rendering or model error.
    pub async fn execute(&mut self, tokens: &[MergerToken]) -> MergeResult<ValidationResult> {
        let start = Instant::now();

        for token in tokens {
            token.execute(&mut self.context).await?;
        }

        let validation = self.context.take_validation();
        info!(
            tokens = tokens.len(),
            failures = validation.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Merge finished"
        );

        Ok(validation)
    }

    /// Statements `tokens` would run, in order, without touching a database.
    pub fn dry_run(&self, tokens: &[MergerToken]) -> MergeResult<Vec<SqlStatement>> {
        let adapter = self.context.adapter();
        let mut statements = Vec::new();

        for token in tokens {
            statements.extend(token.create_sql(adapter)?);
        }

        debug!(statements = statements.len(), "Dry run rendered");
        Ok(statements)
    }
}

/// A sorted batch of tokens ready for display or execution.
#[derive(Debug, Clone, Default)]
pub struct MergePlan {
    tokens: Vec<MergerToken>,
}

/// One token of a rendered plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedToken {
    pub name: &'static str,
    pub value: String,
    pub direction: MergeDirection,
    /// Inline SQL. Empty for model tokens and for changes the dialect cannot express.
    pub statements: Vec<String>,
}

impl MergePlan {
    /// Sort `tokens` into execution order.
    pub fn new(mut tokens: Vec<MergerToken>) -> Self {
        sort_tokens(&mut tokens);
        Self { tokens }
    }

    pub fn tokens(&self) -> &[MergerToken] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<MergerToken> {
        self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Render every token with `adapter`.
    pub fn render(&self, adapter: &dyn DbAdapter) -> MergeResult<Vec<PlannedToken>> {
        self.tokens
            .iter()
            .map(|token| {
                Ok(PlannedToken {
                    name: token.token_name(),
                    value: token.token_value(),
                    direction: token.direction(),
                    statements: token
                        .create_sql(adapter)?
                        .iter()
                        .map(SqlStatement::to_inline_sql)
                        .collect(),
                })
            })
            .collect()
    }

    /// The whole plan as a SQL script, one statement per line.
    pub fn to_sql(&self, adapter: &dyn DbAdapter) -> MergeResult<String> {
        let mut script = String::new();
        for planned in self.render(adapter)? {
            for statement in planned.statements {
                script.push_str(&statement);
                script.push_str(";\n");
            }
        }
        Ok(script)
    }

    /// One-line description, e.g. `3 changes (2 to DB, 1 to model)`.
    pub fn summary(&self) -> String {
        if self.tokens.is_empty() {
            return "No changes".to_string();
        }

        let to_db = self
            .tokens
            .iter()
            .filter(|t| t.direction() == MergeDirection::ToDb)
            .count();
        let to_model = self.tokens.len() - to_db;

        let mut parts = Vec::new();
        if to_db > 0 {
            parts.push(format!("{} to DB", to_db));
        }
        if to_model > 0 {
            parts.push(format!("{} to model", to_model));
        }

        format!(
            "{} change{} ({})",
            self.tokens.len(),
            if self.tokens.len() == 1 { "" } else { "s" },
            parts.join(", ")
        )
    }
}
