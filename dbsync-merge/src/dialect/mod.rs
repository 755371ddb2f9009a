//! Built-in SQL dialects.
//!
//! Each dialect contributes three things: a type table for its
//! [`SqlAdapter`](crate::adapter::SqlAdapter), its identifier quote characters,
//! and a [`CreatorOverrides`] table whose creators attach dialect renderers.

mod generic;
mod mysql;
mod postgres;
mod sqlite;
mod sqlserver;

use std::fmt;
use std::str::FromStr;

use dbsync_schema::SqlType;
use serde::{Deserialize, Serialize};

use crate::error::MergeError;
use crate::factory::CreatorOverrides;

/// A supported SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Standard SQL forms.
    #[default]
    Generic,
    /// PostgreSQL.
    Postgres,
    /// MySQL / MariaDB.
    MySql,
    /// SQLite.
    Sqlite,
    /// Microsoft SQL Server.
    SqlServer,
}

impl Dialect {
    /// Every built-in dialect.
    pub const ALL: [Dialect; 5] = [
        Dialect::Generic,
        Dialect::Postgres,
        Dialect::MySql,
        Dialect::Sqlite,
        Dialect::SqlServer,
    ];

    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Generic => "generic",
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite",
            Dialect::SqlServer => "sqlserver",
        }
    }

    /// Database type names for a SQL type, preferred first.
    pub fn external_types(&self, sql_type: SqlType) -> &'static [&'static str] {
        match self {
            Dialect::Generic => generic::external_types(sql_type),
            Dialect::Postgres => postgres::external_types(sql_type),
            Dialect::MySql => mysql::external_types(sql_type),
            Dialect::Sqlite => sqlite::external_types(sql_type),
            Dialect::SqlServer => sqlserver::external_types(sql_type),
        }
    }

    /// Opening and closing identifier quote.
    pub fn quote_chars(&self) -> (char, char) {
        match self {
            Dialect::MySql => ('`', '`'),
            Dialect::SqlServer => ('[', ']'),
            _ => ('"', '"'),
        }
    }

    /// Whether FK constraints can be added and dropped after table creation.
    pub fn supports_fk_constraints(&self) -> bool {
        !matches!(self, Dialect::Sqlite)
    }

    /// Creator overrides installed by this dialect's factory.
    pub fn overrides(&self) -> CreatorOverrides {
        match self {
            Dialect::Generic => CreatorOverrides::NONE,
            Dialect::Postgres => postgres::OVERRIDES,
            Dialect::MySql => mysql::OVERRIDES,
            Dialect::Sqlite => sqlite::OVERRIDES,
            Dialect::SqlServer => sqlserver::OVERRIDES,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "generic" | "sql" => Ok(Dialect::Generic),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            "sqlserver" | "mssql" => Ok(Dialect::SqlServer),
            _ => Err(MergeError::UnknownDialect(s.to_string())),
        }
    }
}
