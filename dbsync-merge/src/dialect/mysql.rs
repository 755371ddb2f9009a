//! MySQL: `MODIFY` for column changes, explicit FK and PK drops.

use dbsync_schema::{DbAttribute, DbEntity, DbRelationship, SqlType};

use crate::adapter::DbAdapter;
use crate::error::MergeResult;
use crate::factory::CreatorOverrides;
use crate::sql::SqlStatement;
use crate::token::{MergerToken, TokenOp, alter_table, render_default};

pub(super) const OVERRIDES: CreatorOverrides = CreatorOverrides {
    set_column_type_to_db: Some(set_column_type_to_db),
    set_not_null_to_db: Some(set_not_null_to_db),
    set_allow_null_to_db: Some(set_allow_null_to_db),
    drop_relationship_to_db: Some(drop_relationship_to_db),
    set_primary_key_to_db: Some(set_primary_key_to_db),
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

fn drop_relationship_to_db(entity: DbEntity, relationship: DbRelationship) -> MergerToken {
    MergerToken::to_db(TokenOp::DropRelationship {
        entity,
        relationship,
    })
    .with_renderer(render)
}

fn set_primary_key_to_db(
    entity: DbEntity,
    from: Vec<String>,
    to: Vec<String>,
    detected_name: Option<String>,
) -> MergerToken {
    MergerToken::to_db(TokenOp::SetPrimaryKey {
        entity,
        from,
        to,
        detected_name,
    })
    .with_renderer(render)
}

/// `ALTER TABLE t MODIFY c <type> [NOT] NULL`. MODIFY restates the whole column.
fn modify(
    adapter: &dyn DbAdapter,
    entity: &DbEntity,
    column: &DbAttribute,
    mandatory: bool,
) -> MergeResult<SqlStatement> {
    Ok(SqlStatement::new(format!(
        "{} MODIFY {} {} {}",
        alter_table(adapter, entity),
        adapter.quoting_strategy().quote(&column.name),
        adapter.column_type(entity, column)?,
        if mandatory { "NOT NULL" } else { "NULL" }
    )))
}

fn render(op: &TokenOp, adapter: &dyn DbAdapter) -> MergeResult<Vec<SqlStatement>> {
    let q = adapter.quoting_strategy();

    match op {
        TokenOp::SetColumnType { entity, from, to } => {
            Ok(vec![modify(adapter, entity, to, from.mandatory)?])
        }
        TokenOp::SetNotNull { entity, column } => Ok(vec![modify(adapter, entity, column, true)?]),
        TokenOp::SetAllowNull { entity, column } => {
            Ok(vec![modify(adapter, entity, column, false)?])
        }
        TokenOp::DropRelationship {
            entity,
            relationship,
        } => Ok(relationship
            .fk_name
            .iter()
            .map(|fk| {
                SqlStatement::new(format!(
                    "{} DROP FOREIGN KEY {}",
                    alter_table(adapter, entity),
                    q.quote(fk)
                ))
            })
            .collect()),
        TokenOp::SetPrimaryKey {
            entity, from, to, ..
        } => {
            let mut statements = Vec::with_capacity(2);
            if !from.is_empty() {
                statements.push(SqlStatement::new(format!(
                    "{} DROP PRIMARY KEY",
                    alter_table(adapter, entity)
                )));
            }
            if !to.is_empty() {
                statements.push(SqlStatement::new(format!(
                    "{} ADD PRIMARY KEY ({})",
                    alter_table(adapter, entity),
                    q.quote_list(to.iter().map(String::as_str))
                )));
            }
            Ok(statements)
        }
        other => render_default(other, adapter),
    }
}

pub(super) fn external_types(sql_type: SqlType) -> &'static [&'static str] {
    match sql_type {
        SqlType::Bit => &["BIT"],
        SqlType::Boolean => &["BOOL", "TINYINT(1)"],
        SqlType::TinyInt => &["TINYINT"],
        SqlType::SmallInt => &["SMALLINT"],
        SqlType::Integer => &["INT", "INTEGER", "MEDIUMINT"],
        SqlType::BigInt => &["BIGINT"],
        SqlType::Float | SqlType::Double => &["DOUBLE"],
        SqlType::Real => &["FLOAT"],
        SqlType::Numeric | SqlType::Decimal => &["DECIMAL"],
        SqlType::Char | SqlType::NChar => &["CHAR"],
        SqlType::VarChar | SqlType::NVarChar => &["VARCHAR"],
        SqlType::LongVarChar | SqlType::LongNVarChar | SqlType::Clob | SqlType::NClob => {
            &["LONGTEXT", "TEXT", "MEDIUMTEXT"]
        }
        SqlType::Date => &["DATE"],
        SqlType::Time => &["TIME"],
        SqlType::Timestamp => &["DATETIME", "TIMESTAMP"],
        SqlType::TimestampWithTimezone => &["TIMESTAMP"],
        SqlType::Binary => &["BINARY"],
        SqlType::VarBinary => &["VARBINARY"],
        SqlType::LongVarBinary | SqlType::Blob => &["LONGBLOB", "BLOB"],
        SqlType::Other(_) => &[],
    }
}
