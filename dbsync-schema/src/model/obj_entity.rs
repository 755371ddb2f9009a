//! Object-layer entities bound to tables.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{Named, keyed};

/// A property of an object entity, mapped to one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjAttribute {
    /// Property name.
    pub name: String,
    /// Name of the mapped column in the bound table.
    pub db_attribute: String,
}

impl ObjAttribute {
    /// Create a property mapped to a column.
    pub fn new(name: impl Into<String>, db_attribute: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            db_attribute: db_attribute.into(),
        }
    }
}

impl Named for ObjAttribute {
    fn name(&self) -> &str {
        &self.name
    }
}

/// An object-layer entity bound to a table by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjEntity {
    /// Entity name, unique within its map.
    pub name: String,
    /// Name of the bound table.
    pub db_entity: String,
    #[serde(default, with = "keyed")]
    attributes: IndexMap<String, ObjAttribute>,
}

impl ObjEntity {
    /// Create an entity bound to `db_entity`.
    pub fn new(name: impl Into<String>, db_entity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            db_entity: db_entity.into(),
            attributes: IndexMap::new(),
        }
    }

    /// Add a property.
    pub fn add_attribute(&mut self, attribute: ObjAttribute) {
        self.attributes.insert(attribute.name.clone(), attribute);
    }

    /// Remove a property by name.
    pub fn remove_attribute(&mut self, name: &str) -> Option<ObjAttribute> {
        self.attributes.shift_remove(name)
    }

    /// Get a property by name.
    pub fn attribute(&self, name: &str) -> Option<&ObjAttribute> {
        self.attributes.get(name)
    }

    /// Properties in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = &ObjAttribute> {
        self.attributes.values()
    }

    /// The property mapped to `column`, if any.
    pub fn attribute_for_column(&self, column: &str) -> Option<&ObjAttribute> {
        self.attributes.values().find(|a| a.db_attribute == column)
    }

    /// Whether a property name is taken.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }
}

impl Named for ObjEntity {
    fn name(&self) -> &str {
        &self.name
    }
}
