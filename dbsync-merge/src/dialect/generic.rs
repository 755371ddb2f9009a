//! Standard SQL type names.

use dbsync_schema::SqlType;

pub(super) fn external_types(sql_type: SqlType) -> &'static [&'static str] {
    match sql_type {
        SqlType::Bit => &["BIT"],
        SqlType::Boolean => &["BOOLEAN"],
        SqlType::TinyInt => &["TINYINT", "SMALLINT"],
        SqlType::SmallInt => &["SMALLINT"],
        SqlType::Integer => &["INTEGER", "INT"],
        SqlType::BigInt => &["BIGINT"],
        SqlType::Float => &["FLOAT"],
        SqlType::Real => &["REAL"],
        SqlType::Double => &["DOUBLE PRECISION"],
        SqlType::Numeric => &["NUMERIC"],
        SqlType::Decimal => &["DECIMAL"],
        SqlType::Char => &["CHAR"],
        SqlType::VarChar => &["VARCHAR"],
        SqlType::LongVarChar => &["CLOB"],
        SqlType::NChar => &["NCHAR"],
        SqlType::NVarChar => &["NVARCHAR"],
        SqlType::LongNVarChar => &["NCLOB"],
        SqlType::Clob => &["CLOB"],
        SqlType::NClob => &["NCLOB"],
        SqlType::Date => &["DATE"],
        SqlType::Time => &["TIME"],
        SqlType::Timestamp => &["TIMESTAMP"],
        SqlType::TimestampWithTimezone => &["TIMESTAMP WITH TIME ZONE"],
        SqlType::Binary => &["BINARY"],
        SqlType::VarBinary => &["VARBINARY"],
        SqlType::LongVarBinary => &["BLOB"],
        SqlType::Blob => &["BLOB"],
        SqlType::Other(_) => &[],
    }
}
