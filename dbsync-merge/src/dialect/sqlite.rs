//! SQLite: no `ALTER COLUMN` and no standalone constraints.
//!
//! Type changes drop and re-add the column. Nullability, primary key and
//! relationship changes render nothing.

use dbsync_schema::{DbAttribute, DbEntity, DbRelationship, SqlType};
use tracing::debug;

use crate::adapter::DbAdapter;
use crate::error::MergeResult;
use crate::factory::CreatorOverrides;
use crate::sql::SqlStatement;
use crate::token::{MergerToken, TokenOp, alter_table, render_default};

pub(super) const OVERRIDES: CreatorOverrides = CreatorOverrides {
    set_column_type_to_db: Some(set_column_type_to_db),
    set_not_null_to_db: Some(set_not_null_to_db),
    set_allow_null_to_db: Some(set_allow_null_to_db),
    set_primary_key_to_db: Some(set_primary_key_to_db),
    add_relationship_to_db: Some(add_relationship_to_db),
    drop_relationship_to_db: Some(drop_relationship_to_db),
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

fn add_relationship_to_db(entity: DbEntity, relationship: DbRelationship) -> MergerToken {
    MergerToken::to_db(TokenOp::AddRelationship {
        entity,
        relationship,
    })
    .with_renderer(render)
}

fn drop_relationship_to_db(entity: DbEntity, relationship: DbRelationship) -> MergerToken {
    MergerToken::to_db(TokenOp::DropRelationship {
        entity,
        relationship,
    })
    .with_renderer(render)
}

fn render(op: &TokenOp, adapter: &dyn DbAdapter) -> MergeResult<Vec<SqlStatement>> {
    match op {
        TokenOp::SetColumnType { entity, to, .. } => {
            let q = adapter.quoting_strategy();
            let table = alter_table(adapter, entity);
            let column = q.quote(&to.name);
            Ok(vec![
                SqlStatement::new(format!("{} DROP COLUMN {}", table, column)),
                SqlStatement::new(format!(
                    "{} ADD COLUMN {} {}",
                    table,
                    column,
                    adapter.column_type(entity, to)?
                )),
            ])
        }
        TokenOp::SetNotNull { .. }
        | TokenOp::SetAllowNull { .. }
        | TokenOp::SetPrimaryKey { .. }
        | TokenOp::AddRelationship { .. }
        | TokenOp::DropRelationship { .. } => {
            debug!(table = op.table_name(), "SQLite cannot alter constraints in place");
            Ok(Vec::new())
        }
        other => render_default(other, adapter),
    }
}

pub(super) fn external_types(sql_type: SqlType) -> &'static [&'static str] {
    match sql_type {
        SqlType::Bit | SqlType::Boolean => &["BOOLEAN", "INTEGER"],
        SqlType::TinyInt | SqlType::SmallInt | SqlType::Integer | SqlType::BigInt => &["INTEGER"],
        SqlType::Float | SqlType::Real | SqlType::Double => &["REAL"],
        SqlType::Numeric | SqlType::Decimal => &["NUMERIC", "DECIMAL"],
        SqlType::Char | SqlType::NChar => &["CHAR", "TEXT"],
        SqlType::VarChar | SqlType::NVarChar => &["VARCHAR", "TEXT"],
        SqlType::LongVarChar | SqlType::LongNVarChar | SqlType::Clob | SqlType::NClob => &["TEXT"],
        SqlType::Date => &["DATE"],
        SqlType::Time => &["TIME"],
        SqlType::Timestamp | SqlType::TimestampWithTimezone => &["TIMESTAMP"],
        SqlType::Binary
        | SqlType::VarBinary
        | SqlType::LongVarBinary
        | SqlType::Blob => &["BLOB"],
        SqlType::Other(_) => &[],
    }
}
