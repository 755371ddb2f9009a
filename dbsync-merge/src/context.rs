//! Per-run state shared by executing tokens.

use std::sync::Arc;

use dbsync_schema::DataMap;

use crate::adapter::DbAdapter;
use crate::connection::ConnectionFactory;
use crate::delegate::{ModelMergeDelegate, NoopDelegate};
use crate::error::{MergeError, MergeResult};
use crate::sql::SqlStatement;
use crate::token::MergerToken;
use crate::validation::ValidationResult;

/// Everything a token needs while it runs.
///
/// `ToDb` tokens use the adapter and connection factory. `ToModel` tokens use
/// the data map and delegate. Statement failures accumulate in the
/// validation result.
pub struct MergerContext<'a> {
    adapter: &'a dyn DbAdapter,
    connections: Option<Arc<dyn ConnectionFactory>>,
    data_map: Option<&'a mut DataMap>,
    delegate: Box<dyn ModelMergeDelegate + 'a>,
    validation: ValidationResult,
}

impl<'a> MergerContext<'a> {
    /// A context without connections, model or delegate.
    pub fn new(adapter: &'a dyn DbAdapter) -> Self {
        Self {
            adapter,
            connections: None,
            data_map: None,
            delegate: Box::new(NoopDelegate),
            validation: ValidationResult::new(),
        }
    }

    /// Set the connection factory for `ToDb` tokens.
    pub fn with_connections(mut self, connections: Arc<dyn ConnectionFactory>) -> Self {
        self.connections = Some(connections);
        self
    }

    /// Set the model mutated by `ToModel` tokens.
    pub fn with_data_map(mut self, data_map: &'a mut DataMap) -> Self {
        self.data_map = Some(data_map);
        self
    }

    /// Set the delegate notified of model changes.
    pub fn with_delegate(mut self, delegate: impl ModelMergeDelegate + 'a) -> Self {
        self.delegate = Box::new(delegate);
        self
    }

    /// The adapter.
    pub fn adapter(&self) -> &'a dyn DbAdapter {
        self.adapter
    }

    /// The connection factory, if any.
    pub fn connections(&self) -> Option<Arc<dyn ConnectionFactory>> {
        self.connections.clone()
    }

    /// The model, if any.
    pub fn data_map(&self) -> Option<&DataMap> {
        self.data_map.as_deref()
    }

    /// Failures recorded so far.
    pub fn validation(&self) -> &ValidationResult {
        &self.validation
    }

    /// Take the recorded failures, leaving an empty result.
    pub fn take_validation(&mut self) -> ValidationResult {
        std::mem::take(&mut self.validation)
    }

    pub(crate) fn record_failure(
        &mut self,
        token: &MergerToken,
        statement: &SqlStatement,
        message: impl Into<String>,
    ) {
        self.validation.add_failure(
            format!("{} {}", token.token_name(), token.token_value()),
            statement.to_inline_sql(),
            message,
        );
    }

    pub(crate) fn model_parts(
        &mut self,
    ) -> MergeResult<(&mut DataMap, &mut (dyn ModelMergeDelegate + 'a))> {
        let map = self
            .data_map
            .as_deref_mut()
            .ok_or_else(|| MergeError::model("no data map for model tokens"))?;
        Ok((map, self.delegate.as_mut()))
    }
}
