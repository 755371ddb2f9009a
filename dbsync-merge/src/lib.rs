//! # dbsync-merge
//!
//! Merge engine that synchronizes a relational schema model with a database.
//!
//! This crate provides:
//! - Merge tokens: one atomic schema change each, with a direction, a reverse
//!   and dialect-specific SQL
//! - Token factories per SQL dialect (generic, PostgreSQL, MySQL, SQLite, SQL Server)
//! - Schema diffing between two [`DataMap`](dbsync_schema::DataMap)s
//! - Dependency-safe ordering of token batches
//! - Execution against a database connection or an in-memory model
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌────────────────┐     ┌──────────────┐
//! │ Source map   │────▶│ Schema Differ  │────▶│ Merge Tokens │
//! │ Target map   │     └────────────────┘     └──────────────┘
//! └──────────────┘                                   │
//!                                                    ▼
//!                      ┌────────────────┐     ┌──────────────┐
//!                      │ Merge Executor │◀────│ Token Sorter │
//!                      └────────────────┘     └──────────────┘
//!                        │            │
//!                        ▼            ▼
//!                 ┌────────────┐ ┌────────────┐
//!                 │ DDL (ToDb) │ │ Model edit │
//!                 └────────────┘ │ (ToModel)  │
//!                                └────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use dbsync_merge::{
//!     Dialect, MergeDirection, MergeExecutor, MergePlan, MergerContext,
//!     MergerTokenFactory, SchemaDiffer, SqlAdapter, SqliteConnectionFactory,
//! };
//!
//! let factory = MergerTokenFactory::new(Dialect::Sqlite);
//! let tokens = SchemaDiffer::new(&factory).diff(&db_map, &model, MergeDirection::ToDb);
//! let plan = MergePlan::new(tokens);
//!
//! let adapter = SqlAdapter::new(Dialect::Sqlite);
//! let context = MergerContext::new(&adapter)
//!     .with_connections(Arc::new(SqliteConnectionFactory::new("app.db")));
//!
//! let result = MergeExecutor::new(context).execute(plan.tokens()).await?;
//! for failure in result.failures() {
//!     eprintln!("{}", failure);
//! }
//! ```

pub mod adapter;
pub mod config;
pub mod connection;
pub mod context;
pub mod delegate;
pub mod dialect;
pub mod diff;
pub mod error;
pub mod executor;
pub mod factory;
pub mod logging;
pub mod sort;
pub mod sql;
pub mod token;
pub mod validation;
pub mod value_for_null;

// Re-exports
pub use adapter::{DbAdapter, QuotingStrategy, SqlAdapter};
pub use config::MergeConfig;
pub use connection::{ConnectionFactory, DdlConnection};
#[cfg(feature = "sqlite")]
pub use connection::{SqliteConnection, SqliteConnectionFactory};
pub use context::MergerContext;
pub use delegate::{ModelChange, ModelChangeLog, ModelMergeDelegate, NoopDelegate};
pub use dialect::Dialect;
pub use diff::{DiffOptions, SchemaDiffer};
pub use error::{MergeError, MergeResult};
pub use executor::{MergeExecutor, MergePlan, PlannedToken};
pub use factory::{CreatorOverrides, MergerTokenFactory, TokenCreators};
pub use sort::{compare_tokens, sort_tokens, token_rank};
pub use sql::{SqlStatement, SqlValue};
pub use token::{MergeDirection, MergerToken, TokenOp};
pub use validation::{ValidationFailure, ValidationResult};
pub use value_for_null::{
    ConfiguredValueForNull, DefaultValueForNull, NoValueForNull, ValueForNullProvider,
};
