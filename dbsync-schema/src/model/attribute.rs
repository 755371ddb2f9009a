//! Table columns.

use serde::{Deserialize, Serialize};

use crate::types::SqlType;

use super::Named;

/// A table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbAttribute {
    /// Column name.
    pub name: String,
    /// SQL type.
    #[serde(rename = "type")]
    pub sql_type: SqlType,
    /// Maximum length for character and binary types, precision fallback for decimals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    /// Numeric precision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    /// Numeric scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    /// `NOT NULL` when set.
    #[serde(default)]
    pub mandatory: bool,
    /// Member of the table's primary key.
    #[serde(default)]
    pub primary_key: bool,
    /// Participates in exactly one relationship join of its table.
    #[serde(default)]
    pub foreign_key: bool,
    /// Value generated by the database (identity, serial).
    #[serde(default)]
    pub generated: bool,
    /// SQL literal used to backfill existing rows when the column becomes mandatory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl DbAttribute {
    /// Create a nullable, non-key column.
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            max_length: None,
            precision: None,
            scale: None,
            mandatory: false,
            primary_key: false,
            foreign_key: false,
            generated: false,
            default_value: None,
        }
    }

    /// Set the maximum length.
    pub fn with_max_length(mut self, length: u32) -> Self {
        self.max_length = Some(length);
        self
    }

    /// Set precision and scale.
    pub fn with_precision(mut self, precision: u32, scale: u32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    /// Mark the column `NOT NULL`.
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Mark the column as a primary key member. Key columns are always mandatory.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.mandatory = true;
        self
    }

    /// Mark the column as a foreign key.
    pub fn foreign_key(mut self) -> Self {
        self.foreign_key = true;
        self
    }

    /// Mark the column as database-generated.
    pub fn generated(mut self) -> Self {
        self.generated = true;
        self
    }

    /// Set the backfill literal.
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Length as rendered in DDL: `max_length`, or `precision` for decimal types.
    pub fn effective_length(&self) -> Option<u32> {
        if self.sql_type.is_decimal() {
            self.precision.or(self.max_length)
        } else {
            self.max_length
        }
    }

    /// Whether type, length, precision or scale differ from `other`.
    pub fn type_differs(&self, other: &DbAttribute) -> bool {
        if self.sql_type != other.sql_type {
            return true;
        }

        if self.sql_type.supports_length() && self.max_length != other.max_length {
            return true;
        }

        self.sql_type.is_decimal()
            && (self.precision != other.precision || self.scale != other.scale)
    }
}

impl Named for DbAttribute {
    fn name(&self) -> &str {
        &self.name
    }
}
