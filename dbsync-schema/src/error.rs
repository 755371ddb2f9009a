//! Error types for loading and validating schema snapshots.

// Fields are read by the derive macros.
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur while loading, mutating or validating a schema.
#[derive(Error, Debug, Diagnostic)]
pub enum SchemaError {
    /// Error reading a schema file.
    #[error("failed to read file: {path}")]
    #[diagnostic(code(dbsync::schema::io_error))]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML")]
    #[diagnostic(code(dbsync::schema::toml_error))]
    TomlError {
        #[source]
        source: toml::de::Error,
    },

    /// TOML serialization error.
    #[error("failed to serialize TOML")]
    #[diagnostic(code(dbsync::schema::toml_error))]
    TomlSerialize {
        #[source]
        source: toml::ser::Error,
    },

    /// JSON parsing or serialization error.
    #[error("failed to process JSON")]
    #[diagnostic(code(dbsync::schema::json_error))]
    JsonError {
        #[source]
        source: serde_json::Error,
    },

    /// The file extension does not name a known schema format.
    #[error("unsupported schema format for `{path}` (expected .toml or .json)")]
    #[diagnostic(code(dbsync::schema::unsupported_format))]
    UnsupportedFormat { path: String },

    /// Duplicate definition.
    #[error("duplicate {kind} `{name}`")]
    #[diagnostic(code(dbsync::schema::duplicate))]
    Duplicate { kind: String, name: String },

    /// Reference to a table that does not exist.
    #[error("unknown table `{name}`")]
    #[diagnostic(code(dbsync::schema::unknown_entity))]
    UnknownEntity { name: String },

    /// Invalid table definition.
    #[error("invalid table `{name}`: {message}")]
    #[diagnostic(code(dbsync::schema::invalid_entity))]
    InvalidEntity { name: String, message: String },

    /// Invalid column definition.
    #[error("invalid column `{entity}.{attribute}`: {message}")]
    #[diagnostic(code(dbsync::schema::invalid_attribute))]
    InvalidAttribute {
        entity: String,
        attribute: String,
        message: String,
    },

    /// Invalid relationship definition.
    #[error("invalid relationship `{entity}.{relationship}`: {message}")]
    #[diagnostic(code(dbsync::schema::invalid_relationship))]
    InvalidRelationship {
        entity: String,
        relationship: String,
        message: String,
    },

    /// Invalid object entity definition.
    #[error("invalid object entity `{name}`: {message}")]
    #[diagnostic(code(dbsync::schema::invalid_obj_entity))]
    InvalidObjEntity { name: String, message: String },

    /// No free name could be found by suffixing.
    #[error("could not find a free name for `{base}` after {attempts} attempts")]
    #[diagnostic(
        code(dbsync::schema::name_exhausted),
        help("rename the colliding object entities")
    )]
    NameExhausted { base: String, attempts: usize },

    /// Validation error with multiple issues.
    #[error("schema validation failed with {count} error(s)")]
    #[diagnostic(code(dbsync::schema::validation_failed))]
    ValidationFailed {
        count: usize,
        #[related]
        errors: Vec<SchemaError>,
    },
}

impl SchemaError {
    /// Create a duplicate definition error.
    pub fn duplicate(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Duplicate {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create an unknown table error.
    pub fn unknown_entity(name: impl Into<String>) -> Self {
        Self::UnknownEntity { name: name.into() }
    }

    /// Create an invalid table error.
    pub fn invalid_entity(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEntity {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an invalid column error.
    pub fn invalid_attribute(
        entity: impl Into<String>,
        attribute: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            entity: entity.into(),
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    /// Create an invalid relationship error.
    pub fn invalid_relationship(
        entity: impl Into<String>,
        relationship: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidRelationship {
            entity: entity.into(),
            relationship: relationship.into(),
            message: message.into(),
        }
    }

    /// Create an invalid object entity error.
    pub fn invalid_obj_entity(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidObjEntity {
            name: name.into(),
            message: message.into(),
        }
    }
}
