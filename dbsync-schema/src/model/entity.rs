//! Tables.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{DbAttribute, DbRelationship, Named, keyed};

/// A table: ordered columns plus the relationships it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbEntity {
    /// Table name, unique within its [`DataMap`](super::DataMap).
    pub name: String,
    /// Catalog qualifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,
    /// Schema qualifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Name of the existing primary key constraint, when detected from a database.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key_name: Option<String>,
    #[serde(default, with = "keyed")]
    attributes: IndexMap<String, DbAttribute>,
    #[serde(default, with = "keyed", skip_serializing_if = "IndexMap::is_empty")]
    relationships: IndexMap<String, DbRelationship>,
}

impl DbEntity {
    /// Create an empty table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            catalog: None,
            schema: None,
            primary_key_name: None,
            attributes: IndexMap::new(),
            relationships: IndexMap::new(),
        }
    }

    /// Add a column, replacing any column with the same name in place.
    pub fn add_attribute(&mut self, attribute: DbAttribute) {
        self.attributes.insert(attribute.name.clone(), attribute);
    }

    /// Builder form of [`add_attribute`](Self::add_attribute).
    pub fn with_attribute(mut self, attribute: DbAttribute) -> Self {
        self.add_attribute(attribute);
        self
    }

    /// Remove a column, keeping the order of the others.
    pub fn remove_attribute(&mut self, name: &str) -> Option<DbAttribute> {
        self.attributes.shift_remove(name)
    }

    /// Get a column by name.
    pub fn attribute(&self, name: &str) -> Option<&DbAttribute> {
        self.attributes.get(name)
    }

    /// Get a mutable column by name.
    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut DbAttribute> {
        self.attributes.get_mut(name)
    }

    /// Columns in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = &DbAttribute> {
        self.attributes.values()
    }

    /// Mutable columns in declaration order.
    pub fn attributes_mut(&mut self) -> impl Iterator<Item = &mut DbAttribute> {
        self.attributes.values_mut()
    }

    /// Number of columns.
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Primary key columns in declaration order.
    pub fn primary_key(&self) -> impl Iterator<Item = &DbAttribute> {
        self.attributes.values().filter(|a| a.primary_key)
    }

    /// Primary key column names in declaration order.
    pub fn primary_key_names(&self) -> Vec<String> {
        self.primary_key().map(|a| a.name.clone()).collect()
    }

    /// Attach a relationship to this table, replacing one with the same name.
    pub fn add_relationship(&mut self, mut relationship: DbRelationship) {
        relationship.source_entity = self.name.clone();
        self.relationships
            .insert(relationship.name.clone(), relationship);
    }

    /// Builder form of [`add_relationship`](Self::add_relationship).
    pub fn with_relationship(mut self, relationship: DbRelationship) -> Self {
        self.add_relationship(relationship);
        self
    }

    /// Remove a relationship.
    pub fn remove_relationship(&mut self, name: &str) -> Option<DbRelationship> {
        self.relationships.shift_remove(name)
    }

    /// Get a relationship by name.
    pub fn relationship(&self, name: &str) -> Option<&DbRelationship> {
        self.relationships.get(name)
    }

    /// Get a mutable relationship by name.
    pub fn relationship_mut(&mut self, name: &str) -> Option<&mut DbRelationship> {
        self.relationships.get_mut(name)
    }

    /// Relationships in declaration order.
    pub fn relationships(&self) -> impl Iterator<Item = &DbRelationship> {
        self.relationships.values()
    }

    /// Remove every relationship matching `predicate`, returning the removed ones.
    pub fn remove_relationships_where(
        &mut self,
        mut predicate: impl FnMut(&DbRelationship) -> bool,
    ) -> Vec<DbRelationship> {
        let names: Vec<String> = self
            .relationships
            .values()
            .filter(|r| predicate(r))
            .map(|r| r.name.clone())
            .collect();

        names
            .iter()
            .filter_map(|name| self.relationships.shift_remove(name))
            .collect()
    }

    /// A copy of this table without relationships.
    pub fn without_relationships(&self) -> DbEntity {
        DbEntity {
            relationships: IndexMap::new(),
            ..self.clone()
        }
    }

    /// Qualified name for DDL (`catalog.schema.name`, skipping absent parts).
    pub fn qualified_name(&self) -> String {
        [self.catalog.as_deref(), self.schema.as_deref(), Some(self.name.as_str())]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Re-establish relationship back references after deserialization.
    pub(crate) fn link(&mut self) {
        let name = self.name.clone();
        for rel in self.relationships.values_mut() {
            rel.source_entity = name.clone();
        }
    }
}

impl Named for DbEntity {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SqlType;

    #[test]
    fn test_primary_key_order_follows_columns() {
        let entity = DbEntity::new("T")
            .with_attribute(DbAttribute::new("B", SqlType::Integer).primary_key())
            .with_attribute(DbAttribute::new("X", SqlType::VarChar))
            .with_attribute(DbAttribute::new("A", SqlType::Integer).primary_key());

        assert_eq!(entity.primary_key_names(), vec!["B", "A"]);
    }

    #[test]
    fn test_remove_attribute_keeps_order() {
        let mut entity = DbEntity::new("T")
            .with_attribute(DbAttribute::new("A", SqlType::Integer))
            .with_attribute(DbAttribute::new("B", SqlType::Integer))
            .with_attribute(DbAttribute::new("C", SqlType::Integer));

        entity.remove_attribute("B");
        let names: Vec<_> = entity.attributes().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_relationship_gets_source() {
        let entity = DbEntity::new("PAINTING")
            .with_relationship(DbRelationship::new("artist", "ARTIST").join("ARTIST_ID", "ID"));
        assert_eq!(entity.relationship("artist").unwrap().source_entity, "PAINTING");
        assert!(entity.without_relationships().relationships().next().is_none());
    }

    #[test]
    fn test_qualified_name() {
        let mut entity = DbEntity::new("ARTIST");
        assert_eq!(entity.qualified_name(), "ARTIST");
        entity.schema = Some("public".to_string());
        assert_eq!(entity.qualified_name(), "public.ARTIST");
    }
}
