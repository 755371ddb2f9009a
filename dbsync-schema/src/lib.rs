//! # dbsync-schema
//!
//! Relational schema model for the dbsync merge engine.
//!
//! This crate provides:
//! - [`DataMap`], the schema container owning tables and object entities
//! - Table, column and relationship descriptors
//! - JDBC-style SQL type codes
//! - TOML/JSON loading of schema snapshots
//! - Structural validation
//!
//! ## Example
//!
//! ```rust,ignore
//! use dbsync_schema::{DataMap, validate_map};
//!
//! let map = DataMap::from_file("gallery.toml")?;
//! validate_map(&map)?;
//!
//! for table in map.db_entities() {
//!     println!("{} ({} columns)", table.name, table.attribute_count());
//! }
//! ```

pub mod error;
pub mod model;
pub mod naming;
pub mod types;
pub mod validator;

pub use error::{SchemaError, SchemaResult};
pub use model::*;
pub use types::SqlType;
pub use validator::{Validator, validate_map};
