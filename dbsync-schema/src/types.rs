//! SQL column type codes.
//!
//! Types are identified by their JDBC type code so that schema snapshots taken
//! from different databases can be compared without dialect knowledge. Schema
//! files spell them by name (`"VARCHAR"`) or by numeric code (`"1111"`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A SQL column type, keyed by JDBC type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SqlType {
    Bit,
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Real,
    Double,
    Numeric,
    Decimal,
    Char,
    VarChar,
    LongVarChar,
    NChar,
    NVarChar,
    LongNVarChar,
    Clob,
    NClob,
    Date,
    Time,
    Timestamp,
    TimestampWithTimezone,
    Binary,
    VarBinary,
    LongVarBinary,
    Blob,
    /// Any code without a named variant.
    Other(i32),
}

/// Name and code of every named variant.
const NAMED_TYPES: &[(SqlType, &str, i32)] = &[
    (SqlType::Bit, "BIT", -7),
    (SqlType::Boolean, "BOOLEAN", 16),
    (SqlType::TinyInt, "TINYINT", -6),
    (SqlType::SmallInt, "SMALLINT", 5),
    (SqlType::Integer, "INTEGER", 4),
    (SqlType::BigInt, "BIGINT", -5),
    (SqlType::Float, "FLOAT", 6),
    (SqlType::Real, "REAL", 7),
    (SqlType::Double, "DOUBLE", 8),
    (SqlType::Numeric, "NUMERIC", 2),
    (SqlType::Decimal, "DECIMAL", 3),
    (SqlType::Char, "CHAR", 1),
    (SqlType::VarChar, "VARCHAR", 12),
    (SqlType::LongVarChar, "LONGVARCHAR", -1),
    (SqlType::NChar, "NCHAR", -15),
    (SqlType::NVarChar, "NVARCHAR", -9),
    (SqlType::LongNVarChar, "LONGNVARCHAR", -16),
    (SqlType::Clob, "CLOB", 2005),
    (SqlType::NClob, "NCLOB", 2011),
    (SqlType::Date, "DATE", 91),
    (SqlType::Time, "TIME", 92),
    (SqlType::Timestamp, "TIMESTAMP", 93),
    (SqlType::TimestampWithTimezone, "TIMESTAMP_WITH_TIMEZONE", 2014),
    (SqlType::Binary, "BINARY", -2),
    (SqlType::VarBinary, "VARBINARY", -3),
    (SqlType::LongVarBinary, "LONGVARBINARY", -4),
    (SqlType::Blob, "BLOB", 2004),
];

impl SqlType {
    /// The JDBC type code.
    pub fn code(self) -> i32 {
        match self {
            SqlType::Other(code) => code,
            named => NAMED_TYPES
                .iter()
                .find(|(t, _, _)| *t == named)
                .map(|(_, _, code)| *code)
                .unwrap_or_default(),
        }
    }

    /// Resolve a JDBC type code; unknown codes map to [`SqlType::Other`].
    pub fn from_code(code: i32) -> Self {
        NAMED_TYPES
            .iter()
            .find(|(_, _, c)| *c == code)
            .map(|(t, _, _)| *t)
            .unwrap_or(SqlType::Other(code))
    }

    /// The canonical upper-case name, if this is a named type.
    pub fn name(self) -> Option<&'static str> {
        NAMED_TYPES
            .iter()
            .find(|(t, _, _)| *t == self)
            .map(|(_, name, _)| *name)
    }

    /// Whether a declared length is meaningful for this type.
    pub fn supports_length(self) -> bool {
        matches!(
            self,
            SqlType::Char
                | SqlType::VarChar
                | SqlType::NChar
                | SqlType::NVarChar
                | SqlType::Binary
                | SqlType::VarBinary
                | SqlType::Numeric
                | SqlType::Decimal
        )
    }

    /// Whether this is an exact numeric type carrying precision and scale.
    pub fn is_decimal(self) -> bool {
        matches!(self, SqlType::Numeric | SqlType::Decimal)
    }

    /// Whether this is a character type.
    pub fn is_character(self) -> bool {
        matches!(
            self,
            SqlType::Char
                | SqlType::VarChar
                | SqlType::LongVarChar
                | SqlType::NChar
                | SqlType::NVarChar
                | SqlType::LongNVarChar
                | SqlType::Clob
                | SqlType::NClob
        )
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.code()),
        }
    }
}

impl FromStr for SqlType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<i32>() {
            return Ok(SqlType::from_code(code));
        }

        let upper = trimmed.to_ascii_uppercase().replace(' ', "_");
        NAMED_TYPES
            .iter()
            .find(|(_, name, _)| *name == upper)
            .map(|(t, _, _)| *t)
            .ok_or_else(|| format!("unknown SQL type `{}`", s))
    }
}

impl TryFrom<String> for SqlType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SqlType> for String {
    fn from(value: SqlType) -> Self {
        value.to_string()
    }
}
