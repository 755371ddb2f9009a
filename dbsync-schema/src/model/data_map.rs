//! The schema container.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SchemaError, SchemaResult};

use super::{DbEntity, ObjEntity, keyed};

/// A complete schema: tables plus the object entities bound to them.
///
/// The map owns every table exclusively. Cross references (relationship
/// targets, reverse relationships, object entity bindings) are names resolved
/// through lookups on the map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataMap {
    /// Map name.
    #[serde(default)]
    pub name: String,
    /// Quote identifiers in generated SQL.
    #[serde(default)]
    pub quote_sql_identifiers: bool,
    #[serde(default, rename = "tables", with = "keyed")]
    db_entities: IndexMap<String, DbEntity>,
    #[serde(
        default,
        rename = "objects",
        with = "keyed",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    obj_entities: IndexMap<String, ObjEntity>,
}

impl DataMap {
    /// Create an empty map.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Enable or disable identifier quoting.
    pub fn with_quoted_identifiers(mut self, quote: bool) -> Self {
        self.quote_sql_identifiers = quote;
        self
    }

    // ---- tables -------------------------------------------------------

    /// Add a table, replacing any table with the same name.
    pub fn add_db_entity(&mut self, mut entity: DbEntity) -> Option<DbEntity> {
        entity.link();
        self.db_entities.insert(entity.name.clone(), entity)
    }

    /// Builder form of [`add_db_entity`](Self::add_db_entity).
    pub fn with_db_entity(mut self, entity: DbEntity) -> Self {
        self.add_db_entity(entity);
        self
    }

    /// Remove a table without touching anything that refers to it.
    pub fn remove_db_entity(&mut self, name: &str) -> Option<DbEntity> {
        self.db_entities.shift_remove(name)
    }

    /// Get a table by exact name.
    pub fn db_entity(&self, name: &str) -> Option<&DbEntity> {
        self.db_entities.get(name)
    }

    /// Get a mutable table by exact name.
    pub fn db_entity_mut(&mut self, name: &str) -> Option<&mut DbEntity> {
        self.db_entities.get_mut(name)
    }

    /// Get a table by name, ignoring ASCII case.
    pub fn db_entity_ignore_case(&self, name: &str) -> Option<&DbEntity> {
        self.db_entity(name).or_else(|| {
            self.db_entities
                .values()
                .find(|e| e.name.eq_ignore_ascii_case(name))
        })
    }

    /// Whether a table exists.
    pub fn has_db_entity(&self, name: &str) -> bool {
        self.db_entities.contains_key(name)
    }

    /// Tables in declaration order.
    pub fn db_entities(&self) -> impl Iterator<Item = &DbEntity> {
        self.db_entities.values()
    }

    /// Mutable tables in declaration order.
    pub fn db_entities_mut(&mut self) -> impl Iterator<Item = &mut DbEntity> {
        self.db_entities.values_mut()
    }

    /// Number of tables.
    pub fn db_entity_count(&self) -> usize {
        self.db_entities.len()
    }

    /// `(source table, relationship name)` of every relationship targeting `table`
    /// from another table.
    pub fn relationships_targeting(&self, table: &str) -> Vec<(String, String)> {
        self.db_entities
            .values()
            .filter(|e| e.name != table)
            .flat_map(|e| {
                e.relationships()
                    .filter(|r| r.target == table)
                    .map(|r| (e.name.clone(), r.name.clone()))
            })
            .collect()
    }

    // ---- object layer -------------------------------------------------

    /// Add an object entity, replacing any with the same name.
    pub fn add_obj_entity(&mut self, entity: ObjEntity) -> Option<ObjEntity> {
        self.obj_entities.insert(entity.name.clone(), entity)
    }

    /// Remove an object entity.
    pub fn remove_obj_entity(&mut self, name: &str) -> Option<ObjEntity> {
        self.obj_entities.shift_remove(name)
    }

    /// Get an object entity by name.
    pub fn obj_entity(&self, name: &str) -> Option<&ObjEntity> {
        self.obj_entities.get(name)
    }

    /// Get a mutable object entity by name.
    pub fn obj_entity_mut(&mut self, name: &str) -> Option<&mut ObjEntity> {
        self.obj_entities.get_mut(name)
    }

    /// Whether an object entity name is taken.
    pub fn has_obj_entity(&self, name: &str) -> bool {
        self.obj_entities.contains_key(name)
    }

    /// Object entities in declaration order.
    pub fn obj_entities(&self) -> impl Iterator<Item = &ObjEntity> {
        self.obj_entities.values()
    }

    /// Names of object entities bound to `table`.
    pub fn mapped_obj_entities(&self, table: &str) -> Vec<String> {
        self.obj_entities
            .values()
            .filter(|o| o.db_entity == table)
            .map(|o| o.name.clone())
            .collect()
    }

    // ---- persistence --------------------------------------------------

    /// Re-establish back references after deserialization.
    pub fn link(&mut self) {
        for entity in self.db_entities.values_mut() {
            entity.link();
        }
    }

    /// Parse a map from TOML.
    pub fn from_toml_str(input: &str) -> SchemaResult<Self> {
        let mut map: DataMap =
            toml::from_str(input).map_err(|source| SchemaError::TomlError { source })?;
        map.link();
        Ok(map)
    }

    /// Parse a map from JSON.
    pub fn from_json_str(input: &str) -> SchemaResult<Self> {
        let mut map: DataMap =
            serde_json::from_str(input).map_err(|source| SchemaError::JsonError { source })?;
        map.link();
        Ok(map)
    }

    /// Load a map from a `.toml` or `.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| SchemaError::IoError {
            path: shown.clone(),
            source,
        })?;

        debug!(path = %shown, "Loading schema file");

        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(SchemaError::UnsupportedFormat { path: shown }),
        }
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> SchemaResult<String> {
        toml::to_string_pretty(self).map_err(|source| SchemaError::TomlSerialize { source })
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> SchemaResult<String> {
        serde_json::to_string_pretty(self).map_err(|source| SchemaError::JsonError { source })
    }

    /// Write to a `.toml` or `.json` file.
    pub fn save(&self, path: impl AsRef<Path>) -> SchemaResult<()> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        let content = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => self.to_toml_string()?,
            Some("json") => self.to_json_string()?,
            _ => return Err(SchemaError::UnsupportedFormat { path: shown }),
        };

        std::fs::write(path, content).map_err(|source| SchemaError::IoError {
            path: shown,
            source,
        })
    }
}
