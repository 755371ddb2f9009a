//! Merger tokens: atomic, reversible schema changes.
//!
//! A [`MergerToken`] pairs a [`TokenOp`] with a [`MergeDirection`]. `ToDb`
//! tokens render DDL through a [`DbAdapter`] and run it on a database;
//! `ToModel` tokens mutate a [`DataMap`](dbsync_schema::DataMap) in place.
//!
//! Tokens carry detached snapshots of the tables, columns and relationships
//! they describe. The live model is only reached by name when the token runs.

mod render;
mod to_model;

use std::fmt;

use dbsync_schema::{DbAttribute, DbEntity, DbRelationship};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::adapter::DbAdapter;
use crate::context::MergerContext;
use crate::error::{MergeError, MergeResult};
use crate::factory::MergerTokenFactory;
use crate::sql::{SqlStatement, SqlValue};

pub use render::{alter_table, render_default};

/// Which side a token changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeDirection {
    /// Apply to the database as DDL.
    ToDb,
    /// Apply to the in-memory model.
    ToModel,
}

impl MergeDirection {
    /// The other direction.
    pub fn reverse(self) -> Self {
        match self {
            MergeDirection::ToDb => MergeDirection::ToModel,
            MergeDirection::ToModel => MergeDirection::ToDb,
        }
    }

    /// Display label.
    pub fn as_str(self) -> &'static str {
        match self {
            MergeDirection::ToDb => "To DB",
            MergeDirection::ToModel => "To Model",
        }
    }
}

impl fmt::Display for MergeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a token changes.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenOp {
    /// Create a table with its columns and primary key.
    CreateTable { entity: DbEntity },
    /// Drop a table.
    DropTable { entity: DbEntity },
    /// Add a column.
    AddColumn { entity: DbEntity, column: DbAttribute },
    /// Drop a column.
    DropColumn { entity: DbEntity, column: DbAttribute },
    /// Change type, length, precision or scale of a column.
    SetColumnType {
        entity: DbEntity,
        from: DbAttribute,
        to: DbAttribute,
    },
    /// Make a column `NOT NULL`.
    SetNotNull { entity: DbEntity, column: DbAttribute },
    /// Make a column nullable.
    SetAllowNull { entity: DbEntity, column: DbAttribute },
    /// Replace the primary key column set.
    SetPrimaryKey {
        entity: DbEntity,
        from: Vec<String>,
        to: Vec<String>,
        /// Name of the existing PK constraint, when known.
        detected_name: Option<String>,
    },
    /// Add a relationship (FK constraint on the database side).
    AddRelationship {
        entity: DbEntity,
        relationship: DbRelationship,
    },
    /// Drop a relationship.
    DropRelationship {
        entity: DbEntity,
        relationship: DbRelationship,
    },
    /// Backfill `NULL`s in a column before it becomes mandatory.
    SetValueForNull {
        entity: DbEntity,
        column: DbAttribute,
        value: SqlValue,
    },
    /// Inert stand-in for the reverse of a token without a counterpart.
    Reverse { original: Box<MergerToken> },
}

impl TokenOp {
    /// Name of the table this op touches.
    pub fn table_name(&self) -> &str {
        match self {
            TokenOp::CreateTable { entity }
            | TokenOp::DropTable { entity }
            | TokenOp::AddColumn { entity, .. }
            | TokenOp::DropColumn { entity, .. }
            | TokenOp::SetColumnType { entity, .. }
            | TokenOp::SetNotNull { entity, .. }
            | TokenOp::SetAllowNull { entity, .. }
            | TokenOp::SetPrimaryKey { entity, .. }
            | TokenOp::AddRelationship { entity, .. }
            | TokenOp::DropRelationship { entity, .. }
            | TokenOp::SetValueForNull { entity, .. } => &entity.name,
            TokenOp::Reverse { original } => original.op().table_name(),
        }
    }
}

/// Renders the SQL of a `ToDb` token.
pub type SqlRenderer = fn(&TokenOp, &dyn DbAdapter) -> MergeResult<Vec<SqlStatement>>;

/// One schema change in one direction.
///
/// Build tokens through a [`MergerTokenFactory`] so dialect renderers are
/// attached.
#[derive(Debug, Clone)]
pub struct MergerToken {
    direction: MergeDirection,
    op: TokenOp,
    renderer: SqlRenderer,
}

impl MergerToken {
    /// A token rendered with the default SQL forms.
    pub fn new(direction: MergeDirection, op: TokenOp) -> Self {
        Self {
            direction,
            op,
            renderer: render_default,
        }
    }

    /// A `ToDb` token.
    pub fn to_db(op: TokenOp) -> Self {
        Self::new(MergeDirection::ToDb, op)
    }

    /// A `ToModel` token.
    pub fn to_model(op: TokenOp) -> Self {
        Self::new(MergeDirection::ToModel, op)
    }

    /// Replace the SQL renderer.
    pub fn with_renderer(mut self, renderer: SqlRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Direction of this token.
    pub fn direction(&self) -> MergeDirection {
        self.direction
    }

    /// The change.
    pub fn op(&self) -> &TokenOp {
        &self.op
    }

    /// Stable category name.
    pub fn token_name(&self) -> &'static str {
        match &self.op {
            TokenOp::CreateTable { .. } => "Create Table",
            TokenOp::DropTable { .. } => "Drop Table",
            TokenOp::AddColumn { .. } => "Add Column",
            TokenOp::DropColumn { .. } => "Drop Column",
            TokenOp::SetColumnType { .. } => "Set Column Type",
            TokenOp::SetNotNull { .. } => "Set Not Null",
            TokenOp::SetAllowNull { .. } => "Set Allow Null",
            TokenOp::SetPrimaryKey { .. } => "Set Primary Key",
            TokenOp::AddRelationship { .. } => "Add Relationship",
            TokenOp::DropRelationship { .. } => "Drop Relationship",
            TokenOp::SetValueForNull { .. } => "Set Value For Null",
            TokenOp::Reverse { .. } => "Reverse",
        }
    }

    /// Identifying value: table, `table.column`, or a richer description.
    pub fn token_value(&self) -> String {
        match &self.op {
            TokenOp::CreateTable { entity } | TokenOp::DropTable { entity } => entity.name.clone(),
            TokenOp::AddColumn { entity, column }
            | TokenOp::DropColumn { entity, column }
            | TokenOp::SetNotNull { entity, column }
            | TokenOp::SetAllowNull { entity, column }
            | TokenOp::SetValueForNull { entity, column, .. } => {
                format!("{}.{}", entity.name, column.name)
            }
            TokenOp::SetColumnType { entity, from, to } => column_type_value(entity, from, to),
            TokenOp::SetPrimaryKey {
                entity, from, to, ..
            } => format!("{} ({} -> {})", entity.name, from.join(", "), to.join(", ")),
            TokenOp::AddRelationship { entity, relationship }
            | TokenOp::DropRelationship { entity, relationship } => {
                relationship_value(entity, relationship)
            }
            TokenOp::Reverse { original } => original.token_value(),
        }
    }

    /// The inverse token, built through `factory`.
    ///
    /// Both the change and the direction flip: the reverse of a `ToDb`
    /// create is a `ToModel` drop. Reversing twice yields an equal token.
    pub fn create_reverse(&self, factory: &MergerTokenFactory) -> MergerToken {
        use MergeDirection::{ToDb, ToModel};

        match (&self.op, self.direction) {
            (TokenOp::CreateTable { entity }, ToDb) => factory.drop_table_to_model(entity.clone()),
            (TokenOp::CreateTable { entity }, ToModel) => factory.drop_table_to_db(entity.clone()),
            (TokenOp::DropTable { entity }, ToDb) => factory.create_table_to_model(entity.clone()),
            (TokenOp::DropTable { entity }, ToModel) => factory.create_table_to_db(entity.clone()),

            (TokenOp::AddColumn { entity, column }, ToDb) => {
                factory.drop_column_to_model(entity.clone(), column.clone())
            }
            (TokenOp::AddColumn { entity, column }, ToModel) => {
                factory.drop_column_to_db(entity.clone(), column.clone())
            }
            (TokenOp::DropColumn { entity, column }, ToDb) => {
                factory.add_column_to_model(entity.clone(), column.clone())
            }
            (TokenOp::DropColumn { entity, column }, ToModel) => {
                factory.add_column_to_db(entity.clone(), column.clone())
            }

            (TokenOp::SetNotNull { entity, column }, ToDb) => {
                factory.set_allow_null_to_model(entity.clone(), column.clone())
            }
            (TokenOp::SetNotNull { entity, column }, ToModel) => {
                factory.set_allow_null_to_db(entity.clone(), column.clone())
            }
            (TokenOp::SetAllowNull { entity, column }, ToDb) => {
                factory.set_not_null_to_model(entity.clone(), column.clone())
            }
            (TokenOp::SetAllowNull { entity, column }, ToModel) => {
                factory.set_not_null_to_db(entity.clone(), column.clone())
            }

            (TokenOp::SetColumnType { entity, from, to }, ToDb) => {
                factory.set_column_type_to_model(entity.clone(), to.clone(), from.clone())
            }
            (TokenOp::SetColumnType { entity, from, to }, ToModel) => {
                factory.set_column_type_to_db(entity.clone(), to.clone(), from.clone())
            }

            (
                TokenOp::SetPrimaryKey {
                    entity,
                    from,
                    to,
                    detected_name,
                },
                ToDb,
            ) => factory.set_primary_key_to_model(
                entity.clone(),
                to.clone(),
                from.clone(),
                detected_name.clone(),
            ),
            (
                TokenOp::SetPrimaryKey {
                    entity,
                    from,
                    to,
                    detected_name,
                },
                ToModel,
            ) => factory.set_primary_key_to_db(
                entity.clone(),
                to.clone(),
                from.clone(),
                detected_name.clone(),
            ),

            (TokenOp::AddRelationship { entity, relationship }, ToDb) => {
                factory.drop_relationship_to_model(entity.clone(), relationship.clone())
            }
            (TokenOp::AddRelationship { entity, relationship }, ToModel) => {
                factory.drop_relationship_to_db(entity.clone(), relationship.clone())
            }
            (TokenOp::DropRelationship { entity, relationship }, ToDb) => {
                factory.add_relationship_to_model(entity.clone(), relationship.clone())
            }
            (TokenOp::DropRelationship { entity, relationship }, ToModel) => {
                factory.add_relationship_to_db(entity.clone(), relationship.clone())
            }

            (TokenOp::SetValueForNull { .. }, direction) => MergerToken::new(
                direction.reverse(),
                TokenOp::Reverse {
                    original: Box::new(self.clone()),
                },
            ),
            (TokenOp::Reverse { original }, _) => original.as_ref().clone(),
        }
    }

    /// Statements this token runs. Empty for `ToModel` tokens.
    pub fn create_sql(&self, adapter: &dyn DbAdapter) -> MergeResult<Vec<SqlStatement>> {
        match self.direction {
            MergeDirection::ToDb => (self.renderer)(&self.op, adapter),
            MergeDirection::ToModel => Ok(Vec::new()),
        }
    }

    /// Apply the token.
    ///
    /// `ToDb` tokens execute their statements on a fresh connection. A failed
    /// statement or connection is recorded in the context and does not return
    /// an error. Rendering errors and every `ToModel` failure do.
    pub async fn execute(&self, ctx: &mut MergerContext<'_>) -> MergeResult<()> {
        debug!(
            token = self.token_name(),
            value = %self.token_value(),
            direction = %self.direction,
            "Executing merge token"
        );

        match self.direction {
            MergeDirection::ToDb => self.execute_to_db(ctx).await,
            MergeDirection::ToModel => {
                let (map, delegate) = ctx.model_parts()?;
                to_model::apply(&self.op, map, delegate)
            }
        }
    }

    async fn execute_to_db(&self, ctx: &mut MergerContext<'_>) -> MergeResult<()> {
        let statements = self.create_sql(ctx.adapter())?;
        if statements.is_empty() {
            return Ok(());
        }

        let factory = ctx
            .connections()
            .ok_or_else(|| MergeError::config("no connection factory for database tokens"))?;

        let mut connection = match factory.connect().await {
            Ok(connection) => connection,
            Err(e) => {
                warn!(error = %e, token = self.token_name(), "Could not open connection");
                for statement in &statements {
                    ctx.record_failure(self, statement, e.to_string());
                }
                return Ok(());
            }
        };

        for statement in &statements {
            debug!(sql = %statement, "Executing statement");
            if let Err(e) = connection.execute(statement).await {
                warn!(error = %e, sql = %statement, "Statement failed");
                ctx.record_failure(self, statement, e.to_string());
            }
        }

        Ok(())
    }
}

impl PartialEq for MergerToken {
    fn eq(&self, other: &Self) -> bool {
        self.direction == other.direction && self.op == other.op
    }
}

impl fmt::Display for MergerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.token_name(),
            self.token_value(),
            self.direction
        )
    }
}

fn column_type_value(entity: &DbEntity, from: &DbAttribute, to: &DbAttribute) -> String {
    fn opt(value: Option<u32>) -> String {
        value.map_or_else(|| "none".to_string(), |v| v.to_string())
    }

    let mut value = format!("{}.{}", entity.name, to.name);

    if from.sql_type != to.sql_type {
        value.push_str(&format!(" type: {} -> {}", from.sql_type, to.sql_type));
    }
    if from.max_length != to.max_length {
        value.push_str(&format!(
            " maxLength: {} -> {}",
            opt(from.max_length),
            opt(to.max_length)
        ));
    }
    if from.precision != to.precision {
        value.push_str(&format!(
            " precision: {} -> {}",
            opt(from.precision),
            opt(to.precision)
        ));
    }
    if from.scale != to.scale {
        value.push_str(&format!(" scale: {} -> {}", opt(from.scale), opt(to.scale)));
    }

    value
}

fn relationship_value(entity: &DbEntity, relationship: &DbRelationship) -> String {
    let joins = relationship
        .joins
        .iter()
        .map(|j| format!("{}={}", j.source, j.target))
        .collect::<Vec<_>>()
        .join(", ");

    format!("{}->{} ({})", entity.name, relationship.target, joins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbsync_schema::SqlType;

    fn artist() -> DbEntity {
        DbEntity::new("ARTIST")
            .with_attribute(DbAttribute::new("ID", SqlType::Integer).primary_key())
    }

    #[test]
    fn test_entity_token_value() {
        let token = MergerToken::to_db(TokenOp::CreateTable { entity: artist() });
        assert_eq!(token.token_name(), "Create Table");
        assert_eq!(token.token_value(), "ARTIST");
        assert_eq!(token.to_string(), "Create Table ARTIST (To DB)");
    }

    #[test]
    fn test_column_type_value_lists_differences() {
        let from = DbAttribute::new("NAME", SqlType::VarChar).with_max_length(100);
        let to = DbAttribute::new("NAME", SqlType::NVarChar).with_max_length(200);
        let token = MergerToken::to_db(TokenOp::SetColumnType {
            entity: artist(),
            from,
            to,
        });

        assert_eq!(
            token.token_value(),
            "ARTIST.NAME type: VARCHAR -> NVARCHAR maxLength: 100 -> 200"
        );
    }

    #[test]
    fn test_primary_key_value() {
        let token = MergerToken::to_db(TokenOp::SetPrimaryKey {
            entity: artist(),
            from: vec!["A".to_string(), "B".to_string()],
            to: vec!["C".to_string()],
            detected_name: None,
        });
        assert_eq!(token.token_value(), "ARTIST (A, B -> C)");
    }

    #[test]
    fn test_relationship_value() {
        let token = MergerToken::to_db(TokenOp::AddRelationship {
            entity: DbEntity::new("PAINTING"),
            relationship: DbRelationship::new("artist", "ARTIST").join("ARTIST_ID", "ID"),
        });
        assert_eq!(token.token_value(), "PAINTING->ARTIST (ARTIST_ID=ID)");
    }

    #[test]
    fn test_to_model_renders_nothing() {
        let adapter = crate::adapter::SqlAdapter::new(crate::dialect::Dialect::Generic);
        let token = MergerToken::to_model(TokenOp::CreateTable { entity: artist() });
        assert!(token.create_sql(&adapter).unwrap().is_empty());
    }
}
