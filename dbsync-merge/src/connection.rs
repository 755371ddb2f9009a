//! Connection seam used by `ToDb` tokens.
//!
//! Each token opens its own connection through a [`ConnectionFactory`] and
//! drops it when done, whether its statements succeed or not.

use async_trait::async_trait;

use crate::error::MergeResult;
use crate::sql::SqlStatement;

/// A connection able to run DDL and simple DML statements.
#[async_trait]
pub trait DdlConnection: Send {
    /// Execute one statement, returning the number of affected rows.
    async fn execute(&mut self, statement: &SqlStatement) -> MergeResult<u64>;
}

/// Opens connections for `ToDb` tokens.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// Open a new connection.
    async fn connect(&self) -> MergeResult<Box<dyn DdlConnection>>;
}

#[cfg(feature = "sqlite")]
pub use self::sqlite::{SqliteConnection, SqliteConnectionFactory};

#[cfg(feature = "sqlite")]
mod sqlite {
    use std::path::PathBuf;

    use async_trait::async_trait;
    use rusqlite::types::Value;
    use tokio_rusqlite::Connection;
    use tracing::debug;

    use super::{ConnectionFactory, DdlConnection};
    use crate::error::{MergeError, MergeResult};
    use crate::sql::{SqlStatement, SqlValue};

    /// Opens SQLite connections on a database file.
    #[derive(Debug, Clone)]
    pub struct SqliteConnectionFactory {
        path: PathBuf,
    }

    impl SqliteConnectionFactory {
        /// Factory for the database file at `path`.
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        /// The database file.
        pub fn path(&self) -> &std::path::Path {
            &self.path
        }
    }

    #[async_trait]
    impl ConnectionFactory for SqliteConnectionFactory {
        async fn connect(&self) -> MergeResult<Box<dyn DdlConnection>> {
            debug!(path = %self.path.display(), "Opening SQLite connection");
            let conn = Connection::open(&self.path)
                .await
                .map_err(|e| MergeError::connection(e.to_string()))?;
            Ok(Box::new(SqliteConnection { conn }))
        }
    }

    /// A SQLite connection running statements on the blocking pool.
    pub struct SqliteConnection {
        conn: Connection,
    }

    fn to_sqlite(value: &SqlValue) -> Value {
        match value {
            SqlValue::Null => Value::Null,
            SqlValue::Bool(b) => Value::Integer(i64::from(*b)),
            SqlValue::Integer(i) => Value::Integer(*i),
            SqlValue::Real(f) => Value::Real(*f),
            SqlValue::Text(s) => Value::Text(s.clone()),
        }
    }

    #[async_trait]
    impl DdlConnection for SqliteConnection {
        async fn execute(&mut self, statement: &SqlStatement) -> MergeResult<u64> {
            let sql = statement.sql.clone();
            let params: Vec<Value> = statement.params.iter().map(to_sqlite).collect();

            let affected = self
                .conn
                .call(move |conn| {
                    let params_ref: Vec<&dyn rusqlite::ToSql> =
                        params.iter().map(|v| v as &dyn rusqlite::ToSql).collect();
                    Ok(conn.execute(&sql, params_ref.as_slice())?)
                })
                .await
                .map_err(|e| MergeError::database(e.to_string()))?;

            Ok(affected as u64)
        }
    }
}
