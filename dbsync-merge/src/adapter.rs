//! Database capability interface consumed by tokens.
//!
//! Tokens never talk to a database driver directly. Everything dialect-shaped
//! they need (type names, identifier quoting, table DDL, FK support) comes
//! through [`DbAdapter`]. [`SqlAdapter`] covers the built-in dialects.

use dbsync_schema::{DbAttribute, DbEntity, DbRelationship, SqlType};

use crate::dialect::Dialect;
use crate::error::{MergeError, MergeResult};

/// How identifiers are quoted in generated SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotingStrategy {
    /// Quote identifiers at all.
    pub enabled: bool,
    /// Opening quote character.
    pub open: char,
    /// Closing quote character.
    pub close: char,
}

impl QuotingStrategy {
    /// Quoting enabled with the given characters.
    pub const fn new(open: char, close: char) -> Self {
        Self {
            enabled: true,
            open,
            close,
        }
    }

    /// Identifiers rendered as-is.
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            open: '"',
            close: '"',
        }
    }

    /// Quote one identifier, doubling embedded closing quotes.
    pub fn quote(&self, ident: &str) -> String {
        if !self.enabled {
            return ident.to_string();
        }

        let escaped = ident.replace(self.close, &format!("{}{}", self.close, self.close));
        format!("{}{}{}", self.open, escaped, self.close)
    }

    /// Quote a table name with its catalog and schema qualifiers.
    pub fn quote_entity(&self, entity: &DbEntity) -> String {
        [entity.catalog.as_deref(), entity.schema.as_deref(), Some(entity.name.as_str())]
            .into_iter()
            .flatten()
            .map(|part| self.quote(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Quote and comma-join a list of identifiers.
    pub fn quote_list<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> String {
        names
            .into_iter()
            .map(|n| self.quote(n))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for QuotingStrategy {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Capabilities of a target database.
pub trait DbAdapter: Send + Sync {
    /// Database type names for a SQL type, preferred first. Empty when unmapped.
    fn external_types_for_sql_type(&self, sql_type: SqlType) -> Vec<String>;

    /// Identifier quoting in effect.
    fn quoting_strategy(&self) -> QuotingStrategy;

    /// Whether FK constraints can be added and dropped on `entity`.
    fn supports_fk_constraints(&self, _entity: &DbEntity) -> bool {
        true
    }

    /// Statements dropping `entity`.
    fn drop_table_statements(&self, entity: &DbEntity) -> Vec<String> {
        vec![format!(
            "DROP TABLE {}",
            self.quoting_strategy().quote_entity(entity)
        )]
    }

    /// Type of `column` as rendered in DDL, including length, precision and scale.
    fn column_type(&self, entity: &DbEntity, column: &DbAttribute) -> MergeResult<String> {
        let types = self.external_types_for_sql_type(column.sql_type);
        render_column_type(&types, entity, column)
    }

    /// One column definition inside `CREATE TABLE`.
    fn column_definition(&self, entity: &DbEntity, column: &DbAttribute) -> MergeResult<String> {
        let quoting = self.quoting_strategy();
        let mut parts = vec![quoting.quote(&column.name), self.column_type(entity, column)?];
        if column.mandatory {
            parts.push("NOT NULL".to_string());
        }
        Ok(parts.join(" "))
    }

    /// Whether the primary key of `entity` is declared within a column definition,
    /// leaving no separate `PRIMARY KEY` line in `CREATE TABLE`.
    fn inline_primary_key(&self, _entity: &DbEntity) -> bool {
        false
    }

    /// `CREATE TABLE` for `entity`, columns and primary key only.
    fn create_table(&self, entity: &DbEntity) -> MergeResult<String> {
        let quoting = self.quoting_strategy();
        let mut lines = Vec::with_capacity(entity.attribute_count() + 1);

        for column in entity.attributes() {
            lines.push(self.column_definition(entity, column)?);
        }

        let pk = entity.primary_key_names();
        if !pk.is_empty() && !self.inline_primary_key(entity) {
            lines.push(format!(
                "PRIMARY KEY ({})",
                quoting.quote_list(pk.iter().map(String::as_str))
            ));
        }

        Ok(format!(
            "CREATE TABLE {} (\n    {}\n)",
            quoting.quote_entity(entity),
            lines.join(",\n    ")
        ))
    }

    /// `ALTER TABLE ... ADD FOREIGN KEY` for a relationship, if FKs are supported.
    fn create_fk_constraint(
        &self,
        entity: &DbEntity,
        relationship: &DbRelationship,
    ) -> Option<String> {
        if !self.supports_fk_constraints(entity) || relationship.joins.is_empty() {
            return None;
        }

        let quoting = self.quoting_strategy();
        Some(format!(
            "ALTER TABLE {} ADD FOREIGN KEY ({}) REFERENCES {} ({})",
            quoting.quote_entity(entity),
            quoting.quote_list(relationship.source_columns()),
            quoting.quote(&relationship.target),
            quoting.quote_list(relationship.target_columns()),
        ))
    }
}

/// Render a column type from the adapter's candidates.
///
/// Appends `(length)` or `(precision, scale)` when the SQL type takes one and
/// the external name does not already carry it.
pub fn render_column_type(
    types: &[String],
    entity: &DbEntity,
    column: &DbAttribute,
) -> MergeResult<String> {
    let Some(base) = types.first() else {
        return Err(MergeError::unmapped_type(
            &entity.name,
            &column.name,
            column.sql_type,
        ));
    };

    if !column.sql_type.supports_length() || base.contains('(') {
        return Ok(base.clone());
    }

    let rendered = match (column.effective_length(), column.sql_type.is_decimal(), column.scale) {
        (Some(len), true, Some(scale)) => format!("{}({}, {})", base, len, scale),
        (Some(len), _, _) => format!("{}({})", base, len),
        (None, _, _) => base.clone(),
    };

    Ok(rendered)
}

/// Adapter for one of the built-in dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlAdapter {
    dialect: Dialect,
    quote_identifiers: bool,
}

impl SqlAdapter {
    /// Adapter for `dialect` with identifier quoting off.
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            quote_identifiers: false,
        }
    }

    /// Turn identifier quoting on or off, usually from
    /// [`DataMap::quote_sql_identifiers`](dbsync_schema::DataMap::quote_sql_identifiers).
    pub fn with_identifier_quoting(mut self, enabled: bool) -> Self {
        self.quote_identifiers = enabled;
        self
    }

    /// The dialect.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Generated-column type replacement, where the dialect has one.
    fn generated_type(&self, column: &DbAttribute) -> Option<&'static str> {
        match (self.dialect, column.sql_type) {
            (Dialect::Postgres, SqlType::Integer) => Some("SERIAL"),
            (Dialect::Postgres, SqlType::BigInt) => Some("BIGSERIAL"),
            _ => None,
        }
    }

    /// SQLite only auto-generates keys for a lone `INTEGER PRIMARY KEY` column.
    fn sqlite_rowid_key<'a>(&self, entity: &'a DbEntity) -> Option<&'a DbAttribute> {
        if self.dialect != Dialect::Sqlite {
            return None;
        }

        let mut pk = entity.primary_key();
        match (pk.next(), pk.next()) {
            (Some(col), None) if col.generated && col.sql_type == SqlType::Integer => Some(col),
            _ => None,
        }
    }
}

impl DbAdapter for SqlAdapter {
    fn external_types_for_sql_type(&self, sql_type: SqlType) -> Vec<String> {
        self.dialect
            .external_types(sql_type)
            .iter()
            .map(|t| t.to_string())
            .collect()
    }

    fn quoting_strategy(&self) -> QuotingStrategy {
        if !self.quote_identifiers {
            return QuotingStrategy::disabled();
        }
        let (open, close) = self.dialect.quote_chars();
        QuotingStrategy::new(open, close)
    }

    fn supports_fk_constraints(&self, _entity: &DbEntity) -> bool {
        self.dialect.supports_fk_constraints()
    }

    fn drop_table_statements(&self, entity: &DbEntity) -> Vec<String> {
        let table = self.quoting_strategy().quote_entity(entity);
        match self.dialect {
            Dialect::Postgres => vec![format!("DROP TABLE {} CASCADE", table)],
            _ => vec![format!("DROP TABLE {}", table)],
        }
    }

    fn column_definition(&self, entity: &DbEntity, column: &DbAttribute) -> MergeResult<String> {
        let quoting = self.quoting_strategy();
        let name = quoting.quote(&column.name);

        if self
            .sqlite_rowid_key(entity)
            .is_some_and(|key| key.name == column.name)
        {
            return Ok(format!("{} INTEGER PRIMARY KEY", name));
        }

        let ty = match self.generated_type(column).filter(|_| column.generated) {
            Some(serial) => serial.to_string(),
            None => self.column_type(entity, column)?,
        };

        let mut parts = vec![name, ty];
        if column.mandatory {
            parts.push("NOT NULL".to_string());
        }
        if column.generated {
            match self.dialect {
                Dialect::MySql => parts.push("AUTO_INCREMENT".to_string()),
                Dialect::SqlServer => parts.push("IDENTITY(1,1)".to_string()),
                _ => {}
            }
        }

        Ok(parts.join(" "))
    }

    fn inline_primary_key(&self, entity: &DbEntity) -> bool {
        self.sqlite_rowid_key(entity).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artist() -> DbEntity {
        DbEntity::new("ARTIST")
            .with_attribute(DbAttribute::new("ID", SqlType::Integer).primary_key())
            .with_attribute(
                DbAttribute::new("NAME", SqlType::VarChar)
                    .with_max_length(255)
                    .mandatory(),
            )
            .with_attribute(DbAttribute::new("FEE", SqlType::Decimal).with_precision(10, 2))
    }

    #[test]
    fn test_create_table_generic() {
        let adapter = SqlAdapter::new(Dialect::Generic);
        let sql = adapter.create_table(&artist()).unwrap();
        assert_eq!(
            sql,
            concat!(
                "CREATE TABLE ARTIST (\n",
                "    ID INTEGER NOT NULL,\n",
                "    NAME VARCHAR(255) NOT NULL,\n",
                "    FEE DECIMAL(10, 2),\n",
                "    PRIMARY KEY (ID)\n",
                ")"
            )
        );
    }

    #[test]
    fn test_quoting() {
        let adapter = SqlAdapter::new(Dialect::MySql).with_identifier_quoting(true);
        let q = adapter.quoting_strategy();
        assert_eq!(q.quote("ARTIST"), "`ARTIST`");

        let adapter = SqlAdapter::new(Dialect::SqlServer).with_identifier_quoting(true);
        assert_eq!(adapter.quoting_strategy().quote("A]B"), "[A]]B]");

        let mut entity = DbEntity::new("ARTIST");
        entity.schema = Some("public".to_string());
        let adapter = SqlAdapter::new(Dialect::Postgres).with_identifier_quoting(true);
        assert_eq!(
            adapter.quoting_strategy().quote_entity(&entity),
            "\"public\".\"ARTIST\""
        );
    }

    #[test]
    fn test_unmapped_type() {
        let adapter = SqlAdapter::new(Dialect::Generic);
        let entity = DbEntity::new("ARTIST");
        let column = DbAttribute::new("SHAPE", SqlType::Other(1111));

        let err = adapter.column_type(&entity, &column).unwrap_err();
        assert!(matches!(err, MergeError::UnmappedType { .. }));
    }

    #[test]
    fn test_sqlite_rowid_key() {
        let adapter = SqlAdapter::new(Dialect::Sqlite);
        let entity = DbEntity::new("T")
            .with_attribute(DbAttribute::new("ID", SqlType::Integer).primary_key().generated())
            .with_attribute(DbAttribute::new("V", SqlType::VarChar).with_max_length(10));

        let sql = adapter.create_table(&entity).unwrap();
        assert!(adapter.inline_primary_key(&entity));
        assert_eq!(
            sql,
            "CREATE TABLE T (\n    ID INTEGER PRIMARY KEY,\n    V VARCHAR(10)\n)"
        );

        let plain = DbEntity::new("T")
            .with_attribute(DbAttribute::new("ID", SqlType::Integer).primary_key());
        assert!(!adapter.inline_primary_key(&plain));
        assert_eq!(
            adapter.create_table(&plain).unwrap(),
            "CREATE TABLE T (\n    ID INTEGER NOT NULL,\n    PRIMARY KEY (ID)\n)"
        );
        assert!(!SqlAdapter::new(Dialect::Generic).inline_primary_key(&entity));
    }

    #[test]
    fn test_fk_constraint_respects_support() {
        let painting = DbEntity::new("PAINTING");
        let rel = DbRelationship::new("artist", "ARTIST").join("ARTIST_ID", "ID");

        let generic = SqlAdapter::new(Dialect::Generic);
        assert_eq!(
            generic.create_fk_constraint(&painting, &rel).as_deref(),
            Some("ALTER TABLE PAINTING ADD FOREIGN KEY (ARTIST_ID) REFERENCES ARTIST (ID)")
        );

        let sqlite = SqlAdapter::new(Dialect::Sqlite);
        assert!(sqlite.create_fk_constraint(&painting, &rel).is_none());
    }

    #[test]
    fn test_postgres_drop_cascades() {
        let adapter = SqlAdapter::new(Dialect::Postgres);
        assert_eq!(
            adapter.drop_table_statements(&DbEntity::new("ARTIST")),
            vec!["DROP TABLE ARTIST CASCADE".to_string()]
        );
    }
}
