//! Rendered SQL statements and bound values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A value bound to a statement placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// SQL `NULL`.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Integer(i64),
    /// Floating point.
    Real(f64),
    /// Text.
    Text(String),
}

impl SqlValue {
    /// Parse a SQL literal as written in schema and config files.
    ///
    /// `NULL`, `true`/`false`, integers and finite floats map to their variants.
    /// Single-quoted strings are unquoted with `''` unescaped. Anything else
    /// is taken as text verbatim.
    pub fn from_literal(literal: &str) -> Self {
        let trimmed = literal.trim();

        if trimmed.eq_ignore_ascii_case("null") {
            return SqlValue::Null;
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return SqlValue::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return SqlValue::Bool(false);
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return SqlValue::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            // `nan` and `inf` have no SQL literal form.
            if f.is_finite() {
                return SqlValue::Real(f);
            }
        }
        if trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'') {
            return SqlValue::Text(trimmed[1..trimmed.len() - 1].replace("''", "'"));
        }

        SqlValue::Text(trimmed.to_string())
    }

    /// Render as an inline SQL literal.
    pub fn to_literal(&self) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            SqlValue::Integer(i) => i.to_string(),
            SqlValue::Real(f) => f.to_string(),
            SqlValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_literal())
    }
}

/// One DDL or DML statement with positional `?` parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlStatement {
    /// Statement text.
    pub sql: String,
    /// Values bound to the placeholders, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<SqlValue>,
}

impl SqlStatement {
    /// A statement without parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Bind the next placeholder.
    pub fn bind(mut self, value: SqlValue) -> Self {
        self.params.push(value);
        self
    }

    /// Statement text with parameters inlined as literals, for display.
    pub fn to_inline_sql(&self) -> String {
        let mut params = self.params.iter();
        let mut out = String::with_capacity(self.sql.len());

        for ch in self.sql.chars() {
            if ch == '?' {
                if let Some(value) = params.next() {
                    out.push_str(&value.to_literal());
                    continue;
                }
            }
            out.push(ch);
        }

        out
    }
}

impl fmt::Display for SqlStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

impl From<String> for SqlStatement {
    fn from(sql: String) -> Self {
        Self::new(sql)
    }
}
