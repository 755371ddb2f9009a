//! SQL Server: `ALTER COLUMN` restating type and nullability, `DROP COLUMN`.

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
    drop_column_to_db: Some(drop_column_to_db),
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

fn drop_column_to_db(entity: DbEntity, column: DbAttribute) -> MergerToken {
    MergerToken::to_db(TokenOp::DropColumn { entity, column }).with_renderer(render)
}

fn alter_column(
    adapter: &dyn DbAdapter,
    entity: &DbEntity,
    column: &DbAttribute,
    mandatory: bool,
) -> MergeResult<SqlStatement> {
    Ok(SqlStatement::new(format!(
        "{} ALTER COLUMN {} {} {}",
        alter_table(adapter, entity),
        adapter.quoting_strategy().quote(&column.name),
        adapter.column_type(entity, column)?,
        if mandatory { "NOT NULL" } else { "NULL" }
    )))
}

fn render(op: &TokenOp, adapter: &dyn DbAdapter) -> MergeResult<Vec<SqlStatement>> {
    match op {
        TokenOp::SetColumnType { entity, from, to } => {
            Ok(vec![alter_column(adapter, entity, to, from.mandatory)?])
        }
        TokenOp::SetNotNull { entity, column } => {
            Ok(vec![alter_column(adapter, entity, column, true)?])
        }
        TokenOp::SetAllowNull { entity, column } => {
            Ok(vec![alter_column(adapter, entity, column, false)?])
        }
        TokenOp::DropColumn { entity, column } => Ok(vec![SqlStatement::new(format!(
            "{} DROP COLUMN {}",
            alter_table(adapter, entity),
            adapter.quoting_strategy().quote(&column.name)
        ))]),
        other => render_default(other, adapter),
    }
}

pub(super) fn external_types(sql_type: SqlType) -> &'static [&'static str] {
    match sql_type {
        SqlType::Bit | SqlType::Boolean => &["BIT"],
        SqlType::TinyInt => &["TINYINT"],
        SqlType::SmallInt => &["SMALLINT"],
        SqlType::Integer => &["INT"],
        SqlType::BigInt => &["BIGINT"],
        SqlType::Float | SqlType::Double => &["FLOAT"],
        SqlType::Real => &["REAL"],
        SqlType::Numeric => &["NUMERIC"],
        SqlType::Decimal => &["DECIMAL"],
        SqlType::Char => &["CHAR"],
        SqlType::VarChar => &["VARCHAR"],
        SqlType::LongVarChar | SqlType::Clob => &["VARCHAR(MAX)", "TEXT"],
        SqlType::NChar => &["NCHAR"],
        SqlType::NVarChar => &["NVARCHAR"],
        SqlType::LongNVarChar | SqlType::NClob => &["NVARCHAR(MAX)", "NTEXT"],
        SqlType::Date => &["DATE"],
        SqlType::Time => &["TIME"],
        SqlType::Timestamp => &["DATETIME2"],
        SqlType::TimestampWithTimezone => &["DATETIMEOFFSET"],
        SqlType::Binary => &["BINARY"],
        SqlType::VarBinary => &["VARBINARY"],
        SqlType::LongVarBinary | SqlType::Blob => &["VARBINARY(MAX)", "IMAGE"],
        SqlType::Other(_) => &[],
    }
}
