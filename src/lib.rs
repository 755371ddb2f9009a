//! # dbsync
//!
//! Schema merge engine for keeping a relational schema model and a live
//! database in step.
//!
//! dbsync provides:
//! - A schema model of tables, columns, relationships and object entities
//! - A differ that turns two schema snapshots into merge tokens
//! - Dependency-safe ordering of tokens
//! - DDL rendering for generic SQL, PostgreSQL, MySQL, SQLite and SQL Server
//! - Execution against a database connection or an in-memory model
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dbsync::prelude::*;
//!
//! let db = DataMap::from_file("db.toml")?;
//! let model = DataMap::from_file("model.toml")?;
//!
//! let factory = MergerTokenFactory::new(Dialect::Postgres);
//! let plan = MergePlan::new(SchemaDiffer::new(&factory).diff(&db, &model, MergeDirection::ToDb));
//!
//! let adapter = SqlAdapter::new(Dialect::Postgres);
//! println!("{}", plan.to_sql(&adapter)?);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Schema model, loading and validation.
pub mod schema {
    pub use dbsync_schema::*;
}

/// Merge tokens, diffing, ordering and execution.
pub mod merge {
    pub use dbsync_merge::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::merge::{
        DbAdapter, Dialect, DiffOptions, MergeConfig, MergeDirection, MergeError, MergeExecutor,
        MergePlan, MergeResult, MergerContext, MergerToken, MergerTokenFactory, SchemaDiffer,
        SqlAdapter, ValidationResult,
    };
    pub use crate::schema::{
        DataMap, DbAttribute, DbEntity, DbRelationship, ObjEntity, SqlType, validate_map,
    };
}

// Re-export key types at the crate root
pub use merge::{MergeError, MergeResult};
pub use schema::{DataMap, SchemaError};
