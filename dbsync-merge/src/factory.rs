//! Token construction per dialect.
//!
//! A factory owns a [`TokenCreators`] table: one function pointer per token
//! kind. Every dialect starts from [`TokenCreators::DEFAULT`] and replaces the
//! entries named in its [`CreatorOverrides`].

use dbsync_schema::{DbAttribute, DbEntity, DbRelationship};

use crate::dialect::Dialect;
use crate::sql::SqlValue;
use crate::token::{MergerToken, TokenOp};

/// Creates a table-level token.
pub type EntityCreator = fn(DbEntity) -> MergerToken;
/// Creates a column-level token.
pub type ColumnCreator = fn(DbEntity, DbAttribute) -> MergerToken;
/// Creates a column type change token from the old and new column.
pub type ColumnTypeCreator = fn(DbEntity, DbAttribute, DbAttribute) -> MergerToken;
/// Creates a primary key change token from the old and new key columns and the
/// detected constraint name.
pub type PrimaryKeyCreator = fn(DbEntity, Vec<String>, Vec<String>, Option<String>) -> MergerToken;
/// Creates a relationship token.
pub type RelationshipCreator = fn(DbEntity, DbRelationship) -> MergerToken;
/// Creates a value-for-null token.
pub type ValueForNullCreator = fn(DbEntity, DbAttribute, SqlValue) -> MergerToken;

/// One creator per token kind and direction.
#[derive(Debug, Clone, Copy)]
pub struct TokenCreators {
    pub create_table_to_db: EntityCreator,
    pub create_table_to_model: EntityCreator,
    pub drop_table_to_db: EntityCreator,
    pub drop_table_to_model: EntityCreator,
    pub add_column_to_db: ColumnCreator,
    pub add_column_to_model: ColumnCreator,
    pub drop_column_to_db: ColumnCreator,
    pub drop_column_to_model: ColumnCreator,
    pub set_not_null_to_db: ColumnCreator,
    pub set_not_null_to_model: ColumnCreator,
    pub set_allow_null_to_db: ColumnCreator,
    pub set_allow_null_to_model: ColumnCreator,
    pub set_column_type_to_db: ColumnTypeCreator,
    pub set_column_type_to_model: ColumnTypeCreator,
    pub set_primary_key_to_db: PrimaryKeyCreator,
    pub set_primary_key_to_model: PrimaryKeyCreator,
    pub add_relationship_to_db: RelationshipCreator,
    pub add_relationship_to_model: RelationshipCreator,
    pub drop_relationship_to_db: RelationshipCreator,
    pub drop_relationship_to_model: RelationshipCreator,
    pub set_value_for_null_to_db: ValueForNullCreator,
}

/// Dialect replacements for entries of [`TokenCreators`]. `None` keeps the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreatorOverrides {
    pub create_table_to_db: Option<EntityCreator>,
    pub drop_table_to_db: Option<EntityCreator>,
    pub add_column_to_db: Option<ColumnCreator>,
    pub drop_column_to_db: Option<ColumnCreator>,
    pub set_not_null_to_db: Option<ColumnCreator>,
    pub set_allow_null_to_db: Option<ColumnCreator>,
    pub set_column_type_to_db: Option<ColumnTypeCreator>,
    pub set_primary_key_to_db: Option<PrimaryKeyCreator>,
    pub add_relationship_to_db: Option<RelationshipCreator>,
    pub drop_relationship_to_db: Option<RelationshipCreator>,
    pub set_value_for_null_to_db: Option<ValueForNullCreator>,
}

impl CreatorOverrides {
    /// No overrides.
    pub const NONE: CreatorOverrides = CreatorOverrides {
        create_table_to_db: None,
        drop_table_to_db: None,
        add_column_to_db: None,
        drop_column_to_db: None,
        set_not_null_to_db: None,
        set_allow_null_to_db: None,
        set_column_type_to_db: None,
        set_primary_key_to_db: None,
        add_relationship_to_db: None,
        drop_relationship_to_db: None,
        set_value_for_null_to_db: None,
    };
}

mod defaults {
    use super::*;

    pub fn create_table_to_db(entity: DbEntity) -> MergerToken {
        MergerToken::to_db(TokenOp::CreateTable { entity })
    }
    pub fn create_table_to_model(entity: DbEntity) -> MergerToken {
        MergerToken::to_model(TokenOp::CreateTable { entity })
    }
    pub fn drop_table_to_db(entity: DbEntity) -> MergerToken {
        MergerToken::to_db(TokenOp::DropTable { entity })
    }
    pub fn drop_table_to_model(entity: DbEntity) -> MergerToken {
        MergerToken::to_model(TokenOp::DropTable { entity })
    }
    pub fn add_column_to_db(entity: DbEntity, column: DbAttribute) -> MergerToken {
        MergerToken::to_db(TokenOp::AddColumn { entity, column })
    }
    pub fn add_column_to_model(entity: DbEntity, column: DbAttribute) -> MergerToken {
        MergerToken::to_model(TokenOp::AddColumn { entity, column })
    }
    pub fn drop_column_to_db(entity: DbEntity, column: DbAttribute) -> MergerToken {
        MergerToken::to_db(TokenOp::DropColumn { entity, column })
    }
    pub fn drop_column_to_model(entity: DbEntity, column: DbAttribute) -> MergerToken {
        MergerToken::to_model(TokenOp::DropColumn { entity, column })
    }
    pub fn set_not_null_to_db(entity: DbEntity, column: DbAttribute) -> MergerToken {
        MergerToken::to_db(TokenOp::SetNotNull { entity, column })
    }
    pub fn set_not_null_to_model(entity: DbEntity, column: DbAttribute) -> MergerToken {
        MergerToken::to_model(TokenOp::SetNotNull { entity, column })
    }
    pub fn set_allow_null_to_db(entity: DbEntity, column: DbAttribute) -> MergerToken {
        MergerToken::to_db(TokenOp::SetAllowNull { entity, column })
    }
    pub fn set_allow_null_to_model(entity: DbEntity, column: DbAttribute) -> MergerToken {
        MergerToken::to_model(TokenOp::SetAllowNull { entity, column })
    }
    pub fn set_column_type_to_db(
        entity: DbEntity,
        from: DbAttribute,
        to: DbAttribute,
    ) -> MergerToken {
        MergerToken::to_db(TokenOp::SetColumnType { entity, from, to })
    }
    pub fn set_column_type_to_model(
        entity: DbEntity,
        from: DbAttribute,
        to: DbAttribute,
    ) -> MergerToken {
        MergerToken::to_model(TokenOp::SetColumnType { entity, from, to })
    }
    pub fn set_primary_key_to_db(
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
    }
    pub fn set_primary_key_to_model(
        entity: DbEntity,
        from: Vec<String>,
        to: Vec<String>,
        detected_name: Option<String>,
    ) -> MergerToken {
        MergerToken::to_model(TokenOp::SetPrimaryKey {
            entity,
            from,
            to,
            detected_name,
        })
    }
    pub fn add_relationship_to_db(entity: DbEntity, relationship: DbRelationship) -> MergerToken {
        MergerToken::to_db(TokenOp::AddRelationship {
            entity,
            relationship,
        })
    }
    pub fn add_relationship_to_model(
        entity: DbEntity,
        relationship: DbRelationship,
    ) -> MergerToken {
        MergerToken::to_model(TokenOp::AddRelationship {
            entity,
            relationship,
        })
    }
    pub fn drop_relationship_to_db(entity: DbEntity, relationship: DbRelationship) -> MergerToken {
        MergerToken::to_db(TokenOp::DropRelationship {
            entity,
            relationship,
        })
    }
    pub fn drop_relationship_to_model(
        entity: DbEntity,
        relationship: DbRelationship,
    ) -> MergerToken {
        MergerToken::to_model(TokenOp::DropRelationship {
            entity,
            relationship,
        })
    }
    pub fn set_value_for_null_to_db(
        entity: DbEntity,
        column: DbAttribute,
        value: SqlValue,
    ) -> MergerToken {
        MergerToken::to_db(TokenOp::SetValueForNull {
            entity,
            column,
            value,
        })
    }
}

impl TokenCreators {
    /// Creators rendering the base SQL forms.
    pub const DEFAULT: TokenCreators = TokenCreators {
        create_table_to_db: defaults::create_table_to_db,
        create_table_to_model: defaults::create_table_to_model,
        drop_table_to_db: defaults::drop_table_to_db,
        drop_table_to_model: defaults::drop_table_to_model,
        add_column_to_db: defaults::add_column_to_db,
        add_column_to_model: defaults::add_column_to_model,
        drop_column_to_db: defaults::drop_column_to_db,
        drop_column_to_model: defaults::drop_column_to_model,
        set_not_null_to_db: defaults::set_not_null_to_db,
        set_not_null_to_model: defaults::set_not_null_to_model,
        set_allow_null_to_db: defaults::set_allow_null_to_db,
        set_allow_null_to_model: defaults::set_allow_null_to_model,
        set_column_type_to_db: defaults::set_column_type_to_db,
        set_column_type_to_model: defaults::set_column_type_to_model,
        set_primary_key_to_db: defaults::set_primary_key_to_db,
        set_primary_key_to_model: defaults::set_primary_key_to_model,
        add_relationship_to_db: defaults::add_relationship_to_db,
        add_relationship_to_model: defaults::add_relationship_to_model,
        drop_relationship_to_db: defaults::drop_relationship_to_db,
        drop_relationship_to_model: defaults::drop_relationship_to_model,
        set_value_for_null_to_db: defaults::set_value_for_null_to_db,
    };

    /// This table with `overrides` applied.
    pub fn merge(self, overrides: &CreatorOverrides) -> TokenCreators {
        TokenCreators {
            create_table_to_db: overrides.create_table_to_db.unwrap_or(self.create_table_to_db),
            drop_table_to_db: overrides.drop_table_to_db.unwrap_or(self.drop_table_to_db),
            add_column_to_db: overrides.add_column_to_db.unwrap_or(self.add_column_to_db),
            drop_column_to_db: overrides.drop_column_to_db.unwrap_or(self.drop_column_to_db),
            set_not_null_to_db: overrides.set_not_null_to_db.unwrap_or(self.set_not_null_to_db),
            set_allow_null_to_db: overrides
                .set_allow_null_to_db
                .unwrap_or(self.set_allow_null_to_db),
            set_column_type_to_db: overrides
                .set_column_type_to_db
                .unwrap_or(self.set_column_type_to_db),
            set_primary_key_to_db: overrides
                .set_primary_key_to_db
                .unwrap_or(self.set_primary_key_to_db),
            add_relationship_to_db: overrides
                .add_relationship_to_db
                .unwrap_or(self.add_relationship_to_db),
            drop_relationship_to_db: overrides
                .drop_relationship_to_db
                .unwrap_or(self.drop_relationship_to_db),
            set_value_for_null_to_db: overrides
                .set_value_for_null_to_db
                .unwrap_or(self.set_value_for_null_to_db),
            ..self
        }
    }
}

impl Default for TokenCreators {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Builds tokens for one dialect.
#[derive(Debug, Clone)]
pub struct MergerTokenFactory {
    dialect: Dialect,
    creators: TokenCreators,
}

impl MergerTokenFactory {
    /// Factory for a built-in dialect.
    pub fn new(dialect: Dialect) -> Self {
        Self::with_overrides(dialect, &dialect.overrides())
    }

    /// Factory for the generic dialect.
    pub fn generic() -> Self {
        Self::new(Dialect::Generic)
    }

    /// Factory with custom overrides on top of the default table.
    pub fn with_overrides(dialect: Dialect, overrides: &CreatorOverrides) -> Self {
        Self {
            dialect,
            creators: TokenCreators::DEFAULT.merge(overrides),
        }
    }

    /// The dialect this factory was built for.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The merged creator table.
    pub fn creators(&self) -> &TokenCreators {
        &self.creators
    }

    /// Create `entity` in the database with its columns and primary key.
    pub fn create_table_to_db(&self, entity: DbEntity) -> MergerToken {
        (self.creators.create_table_to_db)(entity)
    }

    /// Add `entity` to the model along with a synthesized object entity.
    pub fn create_table_to_model(&self, entity: DbEntity) -> MergerToken {
        (self.creators.create_table_to_model)(entity)
    }

    /// Drop `entity` from the database.
    pub fn drop_table_to_db(&self, entity: DbEntity) -> MergerToken {
        (self.creators.drop_table_to_db)(entity)
    }

    /// Remove `entity` from the model, cascading to relationships and object entities.
    pub fn drop_table_to_model(&self, entity: DbEntity) -> MergerToken {
        (self.creators.drop_table_to_model)(entity)
    }

    /// Add `column` to the database table.
    pub fn add_column_to_db(&self, entity: DbEntity, column: DbAttribute) -> MergerToken {
        (self.creators.add_column_to_db)(entity, column)
    }

    /// Add `column` to the model table and its mapped object entities.
    pub fn add_column_to_model(&self, entity: DbEntity, column: DbAttribute) -> MergerToken {
        (self.creators.add_column_to_model)(entity, column)
    }

    /// Drop `column` from the database table.
    pub fn drop_column_to_db(&self, entity: DbEntity, column: DbAttribute) -> MergerToken {
        (self.creators.drop_column_to_db)(entity, column)
    }

    /// Remove `column` from the model, along with relationships and properties using it.
    pub fn drop_column_to_model(&self, entity: DbEntity, column: DbAttribute) -> MergerToken {
        (self.creators.drop_column_to_model)(entity, column)
    }

    /// Make `column` `NOT NULL` in the database.
    pub fn set_not_null_to_db(&self, entity: DbEntity, column: DbAttribute) -> MergerToken {
        (self.creators.set_not_null_to_db)(entity, column)
    }

    /// Mark `column` mandatory in the model.
    pub fn set_not_null_to_model(&self, entity: DbEntity, column: DbAttribute) -> MergerToken {
        (self.creators.set_not_null_to_model)(entity, column)
    }

    /// Make `column` nullable in the database.
    pub fn set_allow_null_to_db(&self, entity: DbEntity, column: DbAttribute) -> MergerToken {
        (self.creators.set_allow_null_to_db)(entity, column)
    }

    /// Mark `column` optional in the model.
    pub fn set_allow_null_to_model(&self, entity: DbEntity, column: DbAttribute) -> MergerToken {
        (self.creators.set_allow_null_to_model)(entity, column)
    }

    /// Change a database column from `from` to the type and size of `to`.
    pub fn set_column_type_to_db(
        &self,
        entity: DbEntity,
        from: DbAttribute,
        to: DbAttribute,
    ) -> MergerToken {
        (self.creators.set_column_type_to_db)(entity, from, to)
    }

    /// Change a model column from `from` to the type and size of `to`.
    pub fn set_column_type_to_model(
        &self,
        entity: DbEntity,
        from: DbAttribute,
        to: DbAttribute,
    ) -> MergerToken {
        (self.creators.set_column_type_to_model)(entity, from, to)
    }

    /// Replace the database primary key. `detected_name` is the existing constraint, if known.
    pub fn set_primary_key_to_db(
        &self,
        entity: DbEntity,
        from: Vec<String>,
        to: Vec<String>,
        detected_name: Option<String>,
    ) -> MergerToken {
        (self.creators.set_primary_key_to_db)(entity, from, to, detected_name)
    }

    /// Replace the model primary key with the columns in `to`.
    pub fn set_primary_key_to_model(
        &self,
        entity: DbEntity,
        from: Vec<String>,
        to: Vec<String>,
        detected_name: Option<String>,
    ) -> MergerToken {
        (self.creators.set_primary_key_to_model)(entity, from, to, detected_name)
    }

    /// Drop the primary key of `entity` without replacing it.
    pub fn drop_primary_key_to_db(&self, entity: DbEntity) -> MergerToken {
        let from = entity.primary_key_names();
        let detected_name = entity.primary_key_name.clone();
        self.set_primary_key_to_db(entity, from, Vec::new(), detected_name)
    }

    /// Add the FK constraint behind `relationship`.
    pub fn add_relationship_to_db(
        &self,
        entity: DbEntity,
        relationship: DbRelationship,
    ) -> MergerToken {
        (self.creators.add_relationship_to_db)(entity, relationship)
    }

    /// Add `relationship` to the model.
    pub fn add_relationship_to_model(
        &self,
        entity: DbEntity,
        relationship: DbRelationship,
    ) -> MergerToken {
        (self.creators.add_relationship_to_model)(entity, relationship)
    }

    /// Drop the FK constraint behind `relationship`, if it is named.
    pub fn drop_relationship_to_db(
        &self,
        entity: DbEntity,
        relationship: DbRelationship,
    ) -> MergerToken {
        (self.creators.drop_relationship_to_db)(entity, relationship)
    }

    /// Remove `relationship` from the model.
    pub fn drop_relationship_to_model(
        &self,
        entity: DbEntity,
        relationship: DbRelationship,
    ) -> MergerToken {
        (self.creators.drop_relationship_to_model)(entity, relationship)
    }

    /// Backfill `NULL`s in `column` with `value`.
    pub fn set_value_for_null_to_db(
        &self,
        entity: DbEntity,
        column: DbAttribute,
        value: SqlValue,
    ) -> MergerToken {
        (self.creators.set_value_for_null_to_db)(entity, column, value)
    }
}

impl Default for MergerTokenFactory {
    fn default() -> Self {
        Self::generic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::MergeDirection;
    use dbsync_schema::SqlType;

    fn entity() -> DbEntity {
        DbEntity::new("ARTIST")
            .with_attribute(DbAttribute::new("ID", SqlType::Integer).primary_key())
            .with_attribute(DbAttribute::new("NAME", SqlType::VarChar).with_max_length(100))
    }

    fn column() -> DbAttribute {
        DbAttribute::new("NAME", SqlType::VarChar).with_max_length(100)
    }

    fn relationship() -> DbRelationship {
        DbRelationship::new("artist", "ARTIST").join("ARTIST_ID", "ID")
    }

    /// One token of every kind, both directions.
    fn every_token(f: &MergerTokenFactory) -> Vec<MergerToken> {
        let wider = column().with_max_length(200);
        vec![
            f.create_table_to_db(entity()),
            f.create_table_to_model(entity()),
            f.drop_table_to_db(entity()),
            f.drop_table_to_model(entity()),
            f.add_column_to_db(entity(), column()),
            f.add_column_to_model(entity(), column()),
            f.drop_column_to_db(entity(), column()),
            f.drop_column_to_model(entity(), column()),
            f.set_not_null_to_db(entity(), column()),
            f.set_not_null_to_model(entity(), column()),
            f.set_allow_null_to_db(entity(), column()),
            f.set_allow_null_to_model(entity(), column()),
            f.set_column_type_to_db(entity(), column(), wider.clone()),
            f.set_column_type_to_model(entity(), column(), wider),
            f.set_primary_key_to_db(
                entity(),
                vec!["ID".to_string()],
                vec!["NAME".to_string()],
                Some("ARTIST_PK".to_string()),
            ),
            f.set_primary_key_to_model(entity(), vec!["ID".to_string()], vec![], None),
            f.add_relationship_to_db(DbEntity::new("PAINTING"), relationship()),
            f.add_relationship_to_model(DbEntity::new("PAINTING"), relationship()),
            f.drop_relationship_to_db(DbEntity::new("PAINTING"), relationship()),
            f.drop_relationship_to_model(DbEntity::new("PAINTING"), relationship()),
            f.set_value_for_null_to_db(entity(), column(), SqlValue::Text("n/a".to_string())),
        ]
    }

    #[test]
    fn test_reverse_round_trip_every_kind() {
        for dialect in Dialect::ALL {
            let factory = MergerTokenFactory::new(dialect);
            for token in every_token(&factory) {
                let reverse = token.create_reverse(&factory);
                let back = reverse.create_reverse(&factory);
                assert_eq!(back, token, "round trip failed for {} ({})", token, dialect);
                assert_eq!(back.token_name(), token.token_name());
                assert_eq!(back.token_value(), token.token_value());
            }
        }
    }

    #[test]
    fn test_reverse_flips_direction_and_op() {
        let factory = MergerTokenFactory::generic();

        let create = factory.create_table_to_model(entity());
        let reverse = create.create_reverse(&factory);
        assert_eq!(reverse.token_name(), "Drop Table");
        assert_eq!(reverse.direction(), MergeDirection::ToDb);

        let add = factory.add_column_to_db(entity(), column());
        let reverse = add.create_reverse(&factory);
        assert_eq!(reverse.token_name(), "Drop Column");
        assert_eq!(reverse.direction(), MergeDirection::ToModel);

        let not_null = factory.set_not_null_to_db(entity(), column());
        assert_eq!(not_null.create_reverse(&factory).token_name(), "Set Allow Null");
    }

    #[test]
    fn test_reverse_swaps_before_and_after() {
        let factory = MergerTokenFactory::generic();
        let token = factory.set_primary_key_to_db(
            entity(),
            vec!["A".to_string(), "B".to_string()],
            vec!["C".to_string()],
            None,
        );
        assert_eq!(token.create_reverse(&factory).token_value(), "ARTIST (C -> A, B)");
    }

    #[test]
    fn test_value_for_null_reverses_to_marker() {
        let factory = MergerTokenFactory::generic();
        let token =
            factory.set_value_for_null_to_db(entity(), column(), SqlValue::Integer(0));
        let marker = token.create_reverse(&factory);

        assert!(matches!(marker.op(), TokenOp::Reverse { .. }));
        assert_eq!(marker.direction(), MergeDirection::ToModel);
        assert_eq!(marker.create_reverse(&factory), token);
    }

    #[test]
    fn test_drop_primary_key_uses_detected_name() {
        let factory = MergerTokenFactory::generic();
        let mut artist = entity();
        artist.primary_key_name = Some("ARTIST_PK".to_string());

        match factory.drop_primary_key_to_db(artist).op() {
            TokenOp::SetPrimaryKey {
                from,
                to,
                detected_name,
                ..
            } => {
                assert_eq!(from, &vec!["ID".to_string()]);
                assert!(to.is_empty());
                assert_eq!(detected_name.as_deref(), Some("ARTIST_PK"));
            }
            other => panic!("unexpected op {:?}", other),
        }
    }
}
