//! Default SQL forms for `ToDb` tokens.

use dbsync_schema::DbEntity;

use crate::adapter::DbAdapter;
use crate::error::MergeResult;
use crate::sql::SqlStatement;

use super::TokenOp;

/// `ALTER TABLE <quoted table>`.
pub fn alter_table(adapter: &dyn DbAdapter, entity: &DbEntity) -> String {
    format!(
        "ALTER TABLE {}",
        adapter.quoting_strategy().quote_entity(entity)
    )
}

/// Render `op` in the base SQL forms shared by all dialects.
///
/// Dialect renderers handle the ops they override and delegate here for
/// everything else.
pub fn render_default(op: &TokenOp, adapter: &dyn DbAdapter) -> MergeResult<Vec<SqlStatement>> {
    let q = adapter.quoting_strategy();

    let statements = match op {
        TokenOp::CreateTable { entity } => vec![SqlStatement::new(adapter.create_table(entity)?)],

        TokenOp::DropTable { entity } => adapter
            .drop_table_statements(entity)
            .into_iter()
            .map(SqlStatement::new)
            .collect(),

        TokenOp::AddColumn { entity, column } => vec![SqlStatement::new(format!(
            "{} ADD {} {}",
            alter_table(adapter, entity),
            q.quote(&column.name),
            adapter.column_type(entity, column)?
        ))],

        TokenOp::DropColumn { entity, column } => vec![SqlStatement::new(format!(
            "{} DROP {}",
            alter_table(adapter, entity),
            q.quote(&column.name)
        ))],

        TokenOp::SetColumnType { entity, to, .. } => vec![SqlStatement::new(format!(
            "{} ALTER {} TYPE {}",
            alter_table(adapter, entity),
            q.quote(&to.name),
            adapter.column_type(entity, to)?
        ))],

        TokenOp::SetNotNull { entity, column } => vec![SqlStatement::new(format!(
            "{} ALTER {} SET NOT NULL",
            alter_table(adapter, entity),
            q.quote(&column.name)
        ))],

        TokenOp::SetAllowNull { entity, column } => vec![SqlStatement::new(format!(
            "{} ALTER {} DROP NOT NULL",
            alter_table(adapter, entity),
            q.quote(&column.name)
        ))],

        TokenOp::SetPrimaryKey {
            entity,
            to,
            detected_name,
            ..
        } => {
            let mut statements = Vec::with_capacity(2);
            if let Some(name) = detected_name {
                statements.push(SqlStatement::new(format!(
                    "{} DROP CONSTRAINT {}",
                    alter_table(adapter, entity),
                    q.quote(name)
                )));
            }
            if !to.is_empty() {
                statements.push(SqlStatement::new(format!(
                    "{} ADD PRIMARY KEY ({})",
                    alter_table(adapter, entity),
                    q.quote_list(to.iter().map(String::as_str))
                )));
            }
            statements
        }

        TokenOp::AddRelationship {
            entity,
            relationship,
        } => adapter
            .create_fk_constraint(entity, relationship)
            .map(SqlStatement::new)
            .into_iter()
            .collect(),

        TokenOp::DropRelationship {
            entity,
            relationship,
        } => match &relationship.fk_name {
            Some(fk) if adapter.supports_fk_constraints(entity) => {
                vec![SqlStatement::new(format!(
                    "{} DROP CONSTRAINT {}",
                    alter_table(adapter, entity),
                    q.quote(fk)
                ))]
            }
            _ => Vec::new(),
        },

        TokenOp::SetValueForNull {
            entity,
            column,
            value,
        } => {
            let col = q.quote(&column.name);
            vec![
                SqlStatement::new(format!(
                    "UPDATE {} SET {} = ? WHERE {} IS NULL",
                    q.quote_entity(entity),
                    col,
                    col
                ))
                .bind(value.clone()),
            ]
        }

        TokenOp::Reverse { .. } => Vec::new(),
    };

    Ok(statements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::SqlAdapter;
    use crate::dialect::Dialect;
    use crate::error::MergeError;
    use crate::sql::SqlValue;
    use dbsync_schema::{DbAttribute, DbRelationship, SqlType};

    fn sql(op: &TokenOp) -> Vec<String> {
        let adapter = SqlAdapter::new(Dialect::Generic);
        render_default(op, &adapter)
            .unwrap()
            .into_iter()
            .map(|s| s.sql)
            .collect()
    }

    fn entity() -> DbEntity {
        DbEntity::new("T")
    }

    #[test]
    fn test_set_primary_key_with_detected_name() {
        let op = TokenOp::SetPrimaryKey {
            entity: entity(),
            from: vec!["A".to_string()],
            to: vec!["B".to_string(), "C".to_string()],
            detected_name: Some("PK".to_string()),
        };

        assert_eq!(
            sql(&op),
            vec![
                "ALTER TABLE T DROP CONSTRAINT PK".to_string(),
                "ALTER TABLE T ADD PRIMARY KEY (B, C)".to_string(),
            ]
        );
    }

    #[test]
    fn test_set_primary_key_without_detected_name() {
        let op = TokenOp::SetPrimaryKey {
            entity: entity(),
            from: vec!["A".to_string()],
            to: vec!["B".to_string()],
            detected_name: None,
        };

        assert_eq!(sql(&op), vec!["ALTER TABLE T ADD PRIMARY KEY (B)".to_string()]);
    }

    #[test]
    fn test_drop_primary_key_only() {
        let op = TokenOp::SetPrimaryKey {
            entity: entity(),
            from: vec!["A".to_string()],
            to: vec![],
            detected_name: Some("T_PK".to_string()),
        };

        assert_eq!(sql(&op), vec!["ALTER TABLE T DROP CONSTRAINT T_PK".to_string()]);
    }

    #[test]
    fn test_column_forms() {
        let column = DbAttribute::new("NAME", SqlType::VarChar).with_max_length(50);

        let add = TokenOp::AddColumn {
            entity: entity(),
            column: column.clone(),
        };
        assert_eq!(sql(&add), vec!["ALTER TABLE T ADD NAME VARCHAR(50)".to_string()]);

        let drop = TokenOp::DropColumn {
            entity: entity(),
            column: column.clone(),
        };
        assert_eq!(sql(&drop), vec!["ALTER TABLE T DROP NAME".to_string()]);

        let retype = TokenOp::SetColumnType {
            entity: entity(),
            from: column.clone(),
            to: column.clone().with_max_length(80),
        };
        assert_eq!(
            sql(&retype),
            vec!["ALTER TABLE T ALTER NAME TYPE VARCHAR(80)".to_string()]
        );

        let not_null = TokenOp::SetNotNull {
            entity: entity(),
            column,
        };
        assert_eq!(
            sql(&not_null),
            vec!["ALTER TABLE T ALTER NAME SET NOT NULL".to_string()]
        );
    }

    #[test]
    fn test_set_column_type_unmapped() {
        let op = TokenOp::SetColumnType {
            entity: DbEntity::new("ARTIST"),
            from: DbAttribute::new("SHAPE", SqlType::VarChar),
            to: DbAttribute::new("SHAPE", SqlType::Other(1111)),
        };
        let adapter = SqlAdapter::new(Dialect::Generic);

        match render_default(&op, &adapter) {
            Err(MergeError::UnmappedType {
                table,
                column,
                sql_type,
            }) => {
                assert_eq!(format!("{}.{}", table, column), "ARTIST.SHAPE");
                assert_eq!(sql_type, SqlType::Other(1111));
            }
            other => panic!("expected unmapped type, got {:?}", other),
        }
    }

    #[test]
    fn test_value_for_null_binds_value() {
        let op = TokenOp::SetValueForNull {
            entity: entity(),
            column: DbAttribute::new("QTY", SqlType::Integer),
            value: SqlValue::Integer(0),
        };
        let adapter = SqlAdapter::new(Dialect::Generic);
        let statements = render_default(&op, &adapter).unwrap();

        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].sql, "UPDATE T SET QTY = ? WHERE QTY IS NULL");
        assert_eq!(statements[0].params, vec![SqlValue::Integer(0)]);
    }

    #[test]
    fn test_drop_relationship_needs_fk_name() {
        let rel = DbRelationship::new("artist", "ARTIST").join("ARTIST_ID", "ID");
        let op = TokenOp::DropRelationship {
            entity: DbEntity::new("PAINTING"),
            relationship: rel.clone(),
        };
        assert!(sql(&op).is_empty());

        let op = TokenOp::DropRelationship {
            entity: DbEntity::new("PAINTING"),
            relationship: rel.with_fk_name("FK_ARTIST"),
        };
        assert_eq!(
            sql(&op),
            vec!["ALTER TABLE PAINTING DROP CONSTRAINT FK_ARTIST".to_string()]
        );
    }
}
