//! Backfill values for columns that become mandatory.
//!
//! When a nullable column turns `NOT NULL`, or a mandatory column is added to
//! a populated table, existing rows need a value. The differ asks a
//! [`ValueForNullProvider`] for one and emits a `SetValueForNull` token ahead
//! of the `SetNotNull` token when it gets an answer.

use std::collections::HashMap;

use dbsync_schema::{DbAttribute, DbEntity};

use crate::sql::SqlValue;

/// Supplies the value written into existing `NULL` rows of a column.
pub trait ValueForNullProvider: Send + Sync {
    /// Value for `column` of `entity`, or `None` to skip the backfill.
    fn value_for(&self, entity: &DbEntity, column: &DbAttribute) -> Option<SqlValue>;
}

/// Never backfills.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValueForNull;

impl ValueForNullProvider for NoValueForNull {
    fn value_for(&self, _entity: &DbEntity, _column: &DbAttribute) -> Option<SqlValue> {
        None
    }
}

/// Backfills with the column's declared default value.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValueForNull;

impl ValueForNullProvider for DefaultValueForNull {
    fn value_for(&self, _entity: &DbEntity, column: &DbAttribute) -> Option<SqlValue> {
        column.default_value.as_deref().map(SqlValue::from_literal)
    }
}

/// Backfills from explicit `TABLE.COLUMN` entries, falling back to the column default.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredValueForNull {
    values: HashMap<String, SqlValue>,
}

impl ConfiguredValueForNull {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry for `table.column`.
    pub fn with_value(mut self, table: &str, column: &str, value: SqlValue) -> Self {
        self.values.insert(key(table, column), value);
        self
    }

    /// Build from `TABLE.COLUMN = literal` pairs. Keys without a dot are skipped.
    pub fn from_literals<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let values = entries
            .into_iter()
            .filter_map(|(k, literal)| {
                let (table, column) = k.split_once('.')?;
                Some((key(table, column), SqlValue::from_literal(literal)))
            })
            .collect();

        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ValueForNullProvider for ConfiguredValueForNull {
    fn value_for(&self, entity: &DbEntity, column: &DbAttribute) -> Option<SqlValue> {
        self.values
            .get(&key(&entity.name, &column.name))
            .cloned()
            .or_else(|| DefaultValueForNull.value_for(entity, column))
    }
}

fn key(table: &str, column: &str) -> String {
    format!("{}.{}", table.to_uppercase(), column.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbsync_schema::SqlType;

    #[test]
    fn test_default_value_provider() {
        let entity = DbEntity::new("ARTIST");
        let plain = DbAttribute::new("NAME", SqlType::VarChar);
        let defaulted = DbAttribute::new("RANK", SqlType::Integer).with_default("5");

        assert_eq!(DefaultValueForNull.value_for(&entity, &plain), None);
        assert_eq!(
            DefaultValueForNull.value_for(&entity, &defaulted),
            Some(SqlValue::Integer(5))
        );
        assert_eq!(NoValueForNull.value_for(&entity, &defaulted), None);
    }

    #[test]
    fn test_configured_values() {
        let provider = ConfiguredValueForNull::from_literals([
            ("artist.name", "'unknown'"),
            ("no_dot", "1"),
        ]);
        assert_eq!(provider.len(), 1);

        let entity = DbEntity::new("ARTIST");
        let name = DbAttribute::new("NAME", SqlType::VarChar);
        let rank = DbAttribute::new("RANK", SqlType::Integer).with_default("0");
        let other = DbAttribute::new("OTHER", SqlType::Integer);

        assert_eq!(
            provider.value_for(&entity, &name),
            Some(SqlValue::Text("unknown".into()))
        );
        assert_eq!(provider.value_for(&entity, &rank), Some(SqlValue::Integer(0)));
        assert_eq!(provider.value_for(&entity, &other), None);
    }
}
