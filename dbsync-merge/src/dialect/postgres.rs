//! PostgreSQL: `ALTER COLUMN` forms for type and nullability changes.

use dbsync_schema::{DbAttribute, DbEntity, SqlType};

use crate::adapter::DbAdapter;
use crate::error::MergeResult;
use crate::factory::CreatorOverrides;
use crate::sql::SqlStatement;
use crate::token::{MergerToken, TokenOp, alter_table, render_default};

pub(super) const OVERRIDES: CreatorOverrides = CreatorOverrides {
    set_column_type_to_db: Some(set_column_type_to_db),
    set_not_null_to_db: Some(set_not_null_to_db),
    set_allow_null_to_db: Some(set_allow_null_to_db),
    ..CreatorOverrides::NONE
};

fn set_column_type_to_db(entity: DbEntity, from: DbAttribute, to: DbAttribute) -> MergerToken {
    MergerToken::to_db(TokenOp::SetColumnType { entity, from, to }).with_renderer(render)
}

fn set_not_null_to_db(entity: DbEntity, column: DbAttribute) -> MergerToken {
    MergerToken::to_db(TokenOp::SetNotNull { entity, column }).with_renderer(render)
}

fn set_allow_null_to_db(entity: DbEntity, column: DbAttribute) -> MergerToken {
    MergerToken::to_db(TokenOp::SetAllowNull { entity, column }).with_renderer(render)
}

fn render(op: &TokenOp, adapter: &dyn DbAdapter) -> MergeResult<Vec<SqlStatement>> {
    let q = adapter.quoting_strategy();

    let sql = match op {
        TokenOp::SetColumnType { entity, to, .. } => format!(
            "{} ALTER COLUMN {} TYPE {}",
            alter_table(adapter, entity),
            q.quote(&to.name),
            adapter.column_type(entity, to)?
        ),
        TokenOp::SetNotNull { entity, column } => format!(
            "{} ALTER COLUMN {} SET NOT NULL",
            alter_table(adapter, entity),
            q.quote(&column.name)
        ),
        TokenOp::SetAllowNull { entity, column } => format!(
            "{} ALTER COLUMN {} DROP NOT NULL",
            alter_table(adapter, entity),
            q.quote(&column.name)
        ),
        other => return render_default(other, adapter),
    };

    Ok(vec![SqlStatement::new(sql)])
}

pub(super) fn external_types(sql_type: SqlType) -> &'static [&'static str] {
    match sql_type {
        SqlType::Bit | SqlType::Boolean => &["BOOLEAN", "BOOL"],
        SqlType::TinyInt | SqlType::SmallInt => &["SMALLINT", "INT2"],
        SqlType::Integer => &["INTEGER", "INT4", "SERIAL"],
        SqlType::BigInt => &["BIGINT", "INT8", "BIGSERIAL"],
        SqlType::Float | SqlType::Double => &["DOUBLE PRECISION", "FLOAT8"],
        SqlType::Real => &["REAL", "FLOAT4"],
        SqlType::Numeric | SqlType::Decimal => &["NUMERIC", "DECIMAL"],
        SqlType::Char | SqlType::NChar => &["CHAR", "BPCHAR"],
        SqlType::VarChar | SqlType::NVarChar => &["VARCHAR"],
        SqlType::LongVarChar | SqlType::LongNVarChar | SqlType::Clob | SqlType::NClob => &["TEXT"],
        SqlType::Date => &["DATE"],
        SqlType::Time => &["TIME"],
        SqlType::Timestamp => &["TIMESTAMP"],
        SqlType::TimestampWithTimezone => &["TIMESTAMPTZ"],
        SqlType::Binary
        | SqlType::VarBinary
        | SqlType::LongVarBinary
        | SqlType::Blob => &["BYTEA"],
        SqlType::Other(_) => &[],
    }
}
