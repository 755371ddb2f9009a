//! Merge configuration.
//!
//! Loaded from a TOML file (`dbsync.toml` by convention):
//!
//! ```toml
//! dialect = "postgres"
//! quote_identifiers = true
//!
//! [diff]
//! case_insensitive = true
//! exclude_tables = ["flyway_schema_history"]
//!
//! [values_for_null]
//! "ARTIST.NAME" = "'unknown'"
//! "PAINTING.PRICE" = "${DEFAULT_PRICE}"
//! ```
//!
//! `${VAR}` references are replaced with environment variables before
//! parsing. Unset variables are left as written.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapter::SqlAdapter;
use crate::dialect::Dialect;
use crate::diff::DiffOptions;
use crate::error::{MergeError, MergeResult};
use crate::factory::MergerTokenFactory;
use crate::value_for_null::ConfiguredValueForNull;

/// Settings for diffing and rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Target SQL dialect.
    pub dialect: Dialect,
    /// Quote identifiers in generated DDL. `None` defers to the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_identifiers: Option<bool>,
    /// Diff options.
    pub diff: DiffOptions,
    /// Backfill literals keyed by `TABLE.COLUMN`.
    pub values_for_null: BTreeMap<String, String>,
}

impl MergeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> MergeResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            MergeError::config(format!("cannot read {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), "Loading merge config");
        Self::from_toml_str(&content)
    }

    /// Parse from TOML text.
    pub fn from_toml_str(content: &str) -> MergeResult<Self> {
        let expanded = expand_env_vars(content)?;
        toml::from_str(&expanded).map_err(|e| MergeError::config(e.to_string()))
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> MergeResult<String> {
        toml::to_string_pretty(self).map_err(|e| MergeError::config(e.to_string()))
    }

    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn quote_identifiers(mut self, quote: bool) -> Self {
        self.quote_identifiers = Some(quote);
        self
    }

    pub fn diff_options(mut self, options: DiffOptions) -> Self {
        self.diff = options;
        self
    }

    /// Add a backfill literal for `table.column`.
    pub fn value_for_null(
        mut self,
        table: &str,
        column: &str,
        literal: impl Into<String>,
    ) -> Self {
        self.values_for_null
            .insert(format!("{}.{}", table, column), literal.into());
        self
    }

    /// Adapter for the configured dialect. `model_quotes` applies when the
    /// config does not set quoting itself.
    pub fn adapter(&self, model_quotes: bool) -> SqlAdapter {
        SqlAdapter::new(self.dialect)
            .with_identifier_quoting(self.quote_identifiers.unwrap_or(model_quotes))
    }

    /// Token factory for the configured dialect.
    pub fn factory(&self) -> MergerTokenFactory {
        MergerTokenFactory::new(self.dialect)
    }

    /// Backfill provider built from `[values_for_null]`, falling back to column defaults.
    pub fn value_for_null_provider(&self) -> ConfiguredValueForNull {
        ConfiguredValueForNull::from_literals(
            self.values_for_null
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        )
    }
}

fn expand_env_vars(content: &str) -> MergeResult<String> {
    let re = regex_lite::Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| MergeError::config(e.to_string()))?;

    let mut result = content.to_string();
    for cap in re.captures_iter(content) {
        if let Ok(value) = std::env::var(&cap[1]) {
            result = result.replace(&cap[0], &value);
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::DbAdapter;
    use crate::sql::SqlValue;
    use crate::value_for_null::ValueForNullProvider;
    use dbsync_schema::{DbAttribute, DbEntity, SqlType};

    #[test]
    fn test_defaults() {
        let config = MergeConfig::from_toml_str("").unwrap();
        assert_eq!(config.dialect, Dialect::Generic);
        assert_eq!(config.quote_identifiers, None);
        assert_eq!(config.diff, DiffOptions::default());
        assert!(config.values_for_null.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let config = MergeConfig::from_toml_str(
            r#"
            dialect = "mysql"
            quote_identifiers = true

            [diff]
            case_insensitive = true
            exclude_tables = ["AUTO_PK_SUPPORT"]
            skip_primary_keys = true

            [values_for_null]
            "ARTIST.NAME" = "'unknown'"
            "#,
        )
        .unwrap();

        assert_eq!(config.dialect, Dialect::MySql);
        assert!(config.diff.case_insensitive);
        assert!(config.diff.is_excluded("auto_pk_support"));
        assert!(config.diff.skip_primary_keys);
        assert!(!config.diff.skip_relationships);

        let adapter = config.adapter(false);
        assert_eq!(adapter.quoting_strategy().quote("A"), "`A`");

        let provider = config.value_for_null_provider();
        assert_eq!(
            provider.value_for(
                &DbEntity::new("ARTIST"),
                &DbAttribute::new("NAME", SqlType::VarChar)
            ),
            Some(SqlValue::Text("unknown".into()))
        );
    }

    #[test]
    fn test_env_var_expansion() {
        // SAFETY: test-local variable name.
        unsafe { std::env::set_var("DBSYNC_TEST_CONFIG_DIALECT", "sqlite") };

        let config =
            MergeConfig::from_toml_str(r#"dialect = "${DBSYNC_TEST_CONFIG_DIALECT}""#).unwrap();
        assert_eq!(config.dialect, Dialect::Sqlite);

        unsafe { std::env::remove_var("DBSYNC_TEST_CONFIG_DIALECT") };
    }

    #[test]
    fn test_rejects_unknown_dialect() {
        let err = MergeConfig::from_toml_str(r#"dialect = "oracle""#).unwrap_err();
        assert!(matches!(err, MergeError::Config(_)));
    }

    #[test]
    fn test_builder_round_trip() {
        let config = MergeConfig::new()
            .dialect(Dialect::Postgres)
            .quote_identifiers(false)
            .diff_options(DiffOptions::new().skip_relationships(true))
            .value_for_null("T", "C", "0");

        let parsed = MergeConfig::from_toml_str(&config.to_toml_string().unwrap()).unwrap();
        assert_eq!(parsed, config);
        assert_eq!(parsed.factory().dialect(), Dialect::Postgres);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = MergeConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }
}
