//! Schema diffing into merge tokens.
//!
//! [`SchemaDiffer`] compares a source [`DataMap`] with a target one and
//! emits the tokens that bring the source side in line with the target in the
//! given direction. For [`MergeDirection::ToDb`] the source is the current
//! database schema and the target the model. For [`MergeDirection::ToModel`]
//! the roles swap. Tokens come out unsorted; see [`crate::sort`].

use std::collections::BTreeSet;

use dbsync_schema::{DataMap, DbAttribute, DbEntity, DbJoin, DbRelationship};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::factory::MergerTokenFactory;
use crate::sql::SqlValue;
use crate::token::{MergeDirection, MergerToken};
use crate::value_for_null::{NoValueForNull, ValueForNullProvider};

/// Knobs for a diff run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Match table, column and relationship names ignoring ASCII case.
    pub case_insensitive: bool,
    /// Tables left out of the diff on both sides. Matched ignoring case.
    pub exclude_tables: Vec<String>,
    /// Emit no relationship tokens.
    pub skip_relationships: bool,
    /// Emit no primary key tokens.
    pub skip_primary_keys: bool,
}

impl DiffOptions {
    /// Options with every knob off: exact names, all tables, all token kinds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Match names ignoring ASCII case.
    pub fn case_insensitive(mut self, enabled: bool) -> Self {
        self.case_insensitive = enabled;
        self
    }

    /// Leave `table` out of the diff.
    pub fn exclude_table(mut self, table: impl Into<String>) -> Self {
        self.exclude_tables.push(table.into());
        self
    }

    /// Emit no relationship tokens.
    pub fn skip_relationships(mut self, skip: bool) -> Self {
        self.skip_relationships = skip;
        self
    }

    /// Emit no primary key tokens.
    pub fn skip_primary_keys(mut self, skip: bool) -> Self {
        self.skip_primary_keys = skip;
        self
    }

    /// Whether `table` is excluded.
    pub fn is_excluded(&self, table: &str) -> bool {
        self.exclude_tables
            .iter()
            .any(|t| t.eq_ignore_ascii_case(table))
    }

    fn key(&self, name: &str) -> String {
        if self.case_insensitive {
            name.to_uppercase()
        } else {
            name.to_string()
        }
    }
}

/// Identity of a relationship: target table and sorted join pairs.
type RelationshipKey = (String, Vec<DbJoin>);

/// Computes merge tokens between two schemas.
pub struct SchemaDiffer<'a> {
    factory: &'a MergerTokenFactory,
    value_for_null: Box<dyn ValueForNullProvider + 'a>,
    options: DiffOptions,
}

impl<'a> SchemaDiffer<'a> {
    /// A differ creating tokens through `factory`, without backfill values.
    pub fn new(factory: &'a MergerTokenFactory) -> Self {
        Self {
            factory,
            value_for_null: Box::new(NoValueForNull),
            options: DiffOptions::default(),
        }
    }

    /// Set the provider of backfill values for columns becoming mandatory.
    pub fn with_value_for_null(mut self, provider: impl ValueForNullProvider + 'a) -> Self {
        self.value_for_null = Box::new(provider);
        self
    }

    /// Replace the diff options.
    pub fn with_options(mut self, options: DiffOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    /// Tokens that turn `source` into `target` in `direction`.
    pub fn diff(
        &self,
        source: &DataMap,
        target: &DataMap,
        direction: MergeDirection,
    ) -> Vec<MergerToken> {
        let source_tables = self.tables(source);
        let target_tables = self.tables(target);
        let mut tokens = Vec::new();

        for (key, source_entity) in &source_tables {
            match target_tables.get(key) {
                Some(target_entity) => {
                    self.diff_entity(source_entity, target_entity, direction, &mut tokens)
                }
                None => {
                    tokens.push(self.drop_table(direction, source_entity.without_relationships()))
                }
            }
        }

        for (key, target_entity) in &target_tables {
            if source_tables.contains_key(key) {
                continue;
            }

            let snapshot = target_entity.without_relationships();
            tokens.push(self.create_table(direction, snapshot.clone()));

            if !self.options.skip_relationships {
                for relationship in self.relationships(target_entity, direction).into_values() {
                    tokens.push(self.add_relationship(
                        direction,
                        snapshot.clone(),
                        relationship.clone(),
                    ));
                }
            }
        }

        debug!(
            source = %source.name,
            target = %target.name,
            direction = %direction,
            tokens = tokens.len(),
            "Computed schema diff"
        );

        tokens
    }

    fn tables<'m>(&self, map: &'m DataMap) -> IndexMap<String, &'m DbEntity> {
        map.db_entities()
            .filter(|e| !self.options.is_excluded(&e.name))
            .map(|e| (self.options.key(&e.name), e))
            .collect()
    }

    fn relationships<'m>(
        &self,
        entity: &'m DbEntity,
        direction: MergeDirection,
    ) -> IndexMap<RelationshipKey, &'m DbRelationship> {
        entity
            .relationships()
            .filter(|r| direction == MergeDirection::ToModel || r.is_fk_side())
            .filter(|r| !self.options.is_excluded(&r.target))
            .map(|r| (self.relationship_key(r), r))
            .collect()
    }

    fn relationship_key(&self, relationship: &DbRelationship) -> RelationshipKey {
        let mut joins: Vec<DbJoin> = relationship
            .joins
            .iter()
            .map(|j| DbJoin::new(self.options.key(&j.source), self.options.key(&j.target)))
            .collect();
        joins.sort();
        (self.options.key(&relationship.target), joins)
    }

    fn diff_entity(
        &self,
        source: &DbEntity,
        target: &DbEntity,
        direction: MergeDirection,
        tokens: &mut Vec<MergerToken>,
    ) {
        let snapshot = source.without_relationships();

        let source_columns: IndexMap<String, &DbAttribute> = source
            .attributes()
            .map(|a| (self.options.key(&a.name), a))
            .collect();
        let target_columns: IndexMap<String, &DbAttribute> = target
            .attributes()
            .map(|a| (self.options.key(&a.name), a))
            .collect();

        for (key, source_column) in &source_columns {
            match target_columns.get(key) {
                Some(target_column) => self.diff_column(
                    &snapshot,
                    source_column,
                    target_column,
                    direction,
                    tokens,
                ),
                None => tokens.push(self.drop_column(
                    direction,
                    snapshot.clone(),
                    (*source_column).clone(),
                )),
            }
        }

        for (key, target_column) in &target_columns {
            if source_columns.contains_key(key) {
                continue;
            }

            tokens.push(self.add_column(direction, snapshot.clone(), (*target_column).clone()));
            if direction == MergeDirection::ToDb && target_column.mandatory {
                self.push_not_null(&snapshot, target_column, direction, tokens);
            }
        }

        if !self.options.skip_primary_keys {
            self.diff_primary_key(&snapshot, source, target, &source_columns, direction, tokens);
        }

        if !self.options.skip_relationships {
            let source_relationships = self.relationships(source, direction);
            let target_relationships = self.relationships(target, direction);

            for (key, relationship) in &source_relationships {
                if !target_relationships.contains_key(key) {
                    tokens.push(self.drop_relationship(
                        direction,
                        snapshot.clone(),
                        (*relationship).clone(),
                    ));
                }
            }
            for (key, relationship) in &target_relationships {
                if !source_relationships.contains_key(key) {
                    tokens.push(self.add_relationship(
                        direction,
                        snapshot.clone(),
                        (*relationship).clone(),
                    ));
                }
            }
        }
    }

    fn diff_column(
        &self,
        entity: &DbEntity,
        source: &DbAttribute,
        target: &DbAttribute,
        direction: MergeDirection,
        tokens: &mut Vec<MergerToken>,
    ) {
        // Tokens act on the source side, so they carry its spelling of the name.
        let mut target = target.clone();
        target.name.clone_from(&source.name);

        if source.type_differs(&target) {
            tokens.push(self.set_column_type(
                direction,
                entity.clone(),
                source.clone(),
                target.clone(),
            ));
        }

        match (source.mandatory, target.mandatory) {
            (false, true) => self.push_not_null(entity, &target, direction, tokens),
            (true, false) => tokens.push(self.set_allow_null(direction, entity.clone(), target)),
            _ => {}
        }
    }

    /// `SetNotNull`, preceded by a backfill when going to the database and a value is known.
    fn push_not_null(
        &self,
        entity: &DbEntity,
        column: &DbAttribute,
        direction: MergeDirection,
        tokens: &mut Vec<MergerToken>,
    ) {
        if direction == MergeDirection::ToDb {
            if let Some(value) = self.value_for_null.value_for(entity, column) {
                tokens.push(self.set_value_for_null(entity.clone(), column.clone(), value));
            }
        }
        tokens.push(self.set_not_null(direction, entity.clone(), column.clone()));
    }

    fn diff_primary_key(
        &self,
        snapshot: &DbEntity,
        source: &DbEntity,
        target: &DbEntity,
        source_columns: &IndexMap<String, &DbAttribute>,
        direction: MergeDirection,
        tokens: &mut Vec<MergerToken>,
    ) {
        let from = source.primary_key_names();
        let to: Vec<String> = target
            .primary_key_names()
            .into_iter()
            .map(|name| match source_columns.get(&self.options.key(&name)) {
                Some(column) => column.name.clone(),
                None => name,
            })
            .collect();

        let from_set: BTreeSet<String> = from.iter().map(|c| self.options.key(c)).collect();
        let to_set: BTreeSet<String> = to.iter().map(|c| self.options.key(c)).collect();
        if from_set == to_set {
            return;
        }

        let detected_name = source
            .primary_key_name
            .clone()
            .or_else(|| target.primary_key_name.clone());

        tokens.push(match direction {
            MergeDirection::ToDb => {
                self.factory
                    .set_primary_key_to_db(snapshot.clone(), from, to, detected_name)
            }
            MergeDirection::ToModel => {
                self.factory
                    .set_primary_key_to_model(snapshot.clone(), from, to, detected_name)
            }
        });
    }

    fn create_table(&self, direction: MergeDirection, entity: DbEntity) -> MergerToken {
        match direction {
            MergeDirection::ToDb => self.factory.create_table_to_db(entity),
            MergeDirection::ToModel => self.factory.create_table_to_model(entity),
        }
    }

    fn drop_table(&self, direction: MergeDirection, entity: DbEntity) -> MergerToken {
        match direction {
            MergeDirection::ToDb => self.factory.drop_table_to_db(entity),
            MergeDirection::ToModel => self.factory.drop_table_to_model(entity),
        }
    }

    fn add_column(
        &self,
        direction: MergeDirection,
        entity: DbEntity,
        column: DbAttribute,
    ) -> MergerToken {
        match direction {
            MergeDirection::ToDb => self.factory.add_column_to_db(entity, column),
            MergeDirection::ToModel => self.factory.add_column_to_model(entity, column),
        }
    }

    fn drop_column(
        &self,
        direction: MergeDirection,
        entity: DbEntity,
        column: DbAttribute,
    ) -> MergerToken {
        match direction {
            MergeDirection::ToDb => self.factory.drop_column_to_db(entity, column),
            MergeDirection::ToModel => self.factory.drop_column_to_model(entity, column),
        }
    }

    fn set_column_type(
        &self,
        direction: MergeDirection,
        entity: DbEntity,
        from: DbAttribute,
        to: DbAttribute,
    ) -> MergerToken {
        match direction {
            MergeDirection::ToDb => self.factory.set_column_type_to_db(entity, from, to),
            MergeDirection::ToModel => self.factory.set_column_type_to_model(entity, from, to),
        }
    }

    fn set_not_null(
        &self,
        direction: MergeDirection,
        entity: DbEntity,
        column: DbAttribute,
    ) -> MergerToken {
        match direction {
            MergeDirection::ToDb => self.factory.set_not_null_to_db(entity, column),
            MergeDirection::ToModel => self.factory.set_not_null_to_model(entity, column),
        }
    }

    fn set_allow_null(
        &self,
        direction: MergeDirection,
        entity: DbEntity,
        column: DbAttribute,
    ) -> MergerToken {
        match direction {
            MergeDirection::ToDb => self.factory.set_allow_null_to_db(entity, column),
            MergeDirection::ToModel => self.factory.set_allow_null_to_model(entity, column),
        }
    }

    fn set_value_for_null(
        &self,
        entity: DbEntity,
        column: DbAttribute,
        value: SqlValue,
    ) -> MergerToken {
        self.factory.set_value_for_null_to_db(entity, column, value)
    }

    fn add_relationship(
        &self,
        direction: MergeDirection,
        entity: DbEntity,
        relationship: DbRelationship,
    ) -> MergerToken {
        match direction {
            MergeDirection::ToDb => self.factory.add_relationship_to_db(entity, relationship),
            MergeDirection::ToModel => self.factory.add_relationship_to_model(entity, relationship),
        }
    }

    fn drop_relationship(
        &self,
        direction: MergeDirection,
        entity: DbEntity,
        relationship: DbRelationship,
    ) -> MergerToken {
        match direction {
            MergeDirection::ToDb => self.factory.drop_relationship_to_db(entity, relationship),
            MergeDirection::ToModel => {
                self.factory.drop_relationship_to_model(entity, relationship)
            }
        }
    }
}
