//! Structural validation of schema maps.
//!
//! The validator checks that a [`DataMap`] is internally consistent:
//! - Primary key columns are mandatory
//! - Foreign key columns participate in exactly one relationship join
//! - Relationship targets and join columns exist
//! - Reverse relationship names resolve
//! - Object entities are bound to existing tables and columns

use crate::error::{SchemaError, SchemaResult};
use crate::model::{DataMap, DbEntity, DbRelationship, ObjEntity};

/// Schema validator collecting every violation.
#[derive(Debug)]
pub struct Validator {
    /// Collected validation errors.
    errors: Vec<SchemaError>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self { errors: vec![] }
    }

    /// Validate a map, returning all violations at once.
    pub fn validate(&mut self, map: &DataMap) -> SchemaResult<()> {
        self.errors.clear();

        for entity in map.db_entities() {
            self.validate_entity(entity, map);
        }

        for obj in map.obj_entities() {
            self.validate_obj_entity(obj, map);
        }

        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed {
                count: self.errors.len(),
                errors: std::mem::take(&mut self.errors),
            })
        }
    }

    fn validate_entity(&mut self, entity: &DbEntity, map: &DataMap) {
        if entity.name.trim().is_empty() {
            self.errors
                .push(SchemaError::invalid_entity(&entity.name, "table name is empty"));
        }

        for attr in entity.attributes() {
            if attr.primary_key && !attr.mandatory {
                self.errors.push(SchemaError::invalid_attribute(
                    &entity.name,
                    &attr.name,
                    "primary key column must be mandatory",
                ));
            }

            if attr.foreign_key {
                let uses = entity
                    .relationships()
                    .filter(|r| r.is_fk_side() && r.uses_source_column(&attr.name))
                    .count();
                if uses != 1 {
                    self.errors.push(SchemaError::invalid_attribute(
                        &entity.name,
                        &attr.name,
                        format!(
                            "foreign key column must participate in exactly one join, found {}",
                            uses
                        ),
                    ));
                }
            }
        }

        for rel in entity.relationships() {
            self.validate_relationship(entity, rel, map);
        }
    }

    fn validate_relationship(&mut self, entity: &DbEntity, rel: &DbRelationship, map: &DataMap) {
        let Some(target) = map.db_entity(&rel.target) else {
            self.errors.push(SchemaError::invalid_relationship(
                &entity.name,
                &rel.name,
                format!("target table `{}` does not exist", rel.target),
            ));
            return;
        };

        if rel.joins.is_empty() {
            self.errors.push(SchemaError::invalid_relationship(
                &entity.name,
                &rel.name,
                "relationship has no joins",
            ));
        }

        for join in &rel.joins {
            if entity.attribute(&join.source).is_none() {
                self.errors.push(SchemaError::invalid_relationship(
                    &entity.name,
                    &rel.name,
                    format!("source column `{}` does not exist", join.source),
                ));
            }
            if target.attribute(&join.target).is_none() {
                self.errors.push(SchemaError::invalid_relationship(
                    &entity.name,
                    &rel.name,
                    format!("target column `{}.{}` does not exist", target.name, join.target),
                ));
            }
        }

        if let Some(reverse) = &rel.reverse {
            if target.relationship(reverse).is_none() {
                self.errors.push(SchemaError::invalid_relationship(
                    &entity.name,
                    &rel.name,
                    format!("reverse relationship `{}.{}` does not exist", target.name, reverse),
                ));
            }
        }
    }

    fn validate_obj_entity(&mut self, obj: &ObjEntity, map: &DataMap) {
        let Some(table) = map.db_entity(&obj.db_entity) else {
            self.errors.push(SchemaError::invalid_obj_entity(
                &obj.name,
                format!("bound table `{}` does not exist", obj.db_entity),
            ));
            return;
        };

        for attr in obj.attributes() {
            if table.attribute(&attr.db_attribute).is_none() {
                self.errors.push(SchemaError::invalid_obj_entity(
                    &obj.name,
                    format!(
                        "property `{}` maps to missing column `{}.{}`",
                        attr.name, table.name, attr.db_attribute
                    ),
                ));
            }
        }
    }
}

/// Validate a map with a fresh [`Validator`].
pub fn validate_map(map: &DataMap) -> SchemaResult<()> {
    Validator::new().validate(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DbAttribute, ObjAttribute};
    use crate::types::SqlType;

    fn errors_of(map: &DataMap) -> Vec<String> {
        match validate_map(map) {
            Ok(()) => vec![],
            Err(SchemaError::ValidationFailed { errors, .. }) => {
                errors.iter().map(|e| e.to_string()).collect()
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    fn valid_map() -> DataMap {
        let artist = DbEntity::new("ARTIST")
            .with_attribute(DbAttribute::new("ID", SqlType::Integer).primary_key());
        let painting = DbEntity::new("PAINTING")
            .with_attribute(DbAttribute::new("ID", SqlType::Integer).primary_key())
            .with_attribute(DbAttribute::new("ARTIST_ID", SqlType::Integer).foreign_key())
            .with_relationship(DbRelationship::new("artist", "ARTIST").join("ARTIST_ID", "ID"));

        DataMap::new("gallery")
            .with_db_entity(artist)
            .with_db_entity(painting)
    }

    #[test]
    fn test_valid_map() {
        assert!(validate_map(&valid_map()).is_ok());
    }

    #[test]
    fn test_missing_target_table() {
        let mut map = valid_map();
        map.remove_db_entity("ARTIST");

        let errors = errors_of(&map);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("target table `ARTIST` does not exist"));
    }

    #[test]
    fn test_fk_without_join() {
        let mut map = valid_map();
        map.db_entity_mut("PAINTING")
            .unwrap()
            .remove_relationship("artist");

        let errors = errors_of(&map);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("PAINTING.ARTIST_ID"));
    }

    #[test]
    fn test_nullable_primary_key() {
        let mut map = valid_map();
        map.db_entity_mut("ARTIST")
            .unwrap()
            .attribute_mut("ID")
            .unwrap()
            .mandatory = false;

        let errors = errors_of(&map);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("must be mandatory"));
    }

    #[test]
    fn test_unresolved_reverse_and_missing_column() {
        let mut map = valid_map();
        let rel = map
            .db_entity_mut("PAINTING")
            .unwrap()
            .relationship_mut("artist")
            .unwrap();
        rel.reverse = Some("paintings".to_string());
        rel.joins[0].target = "MISSING".to_string();

        let errors = errors_of(&map);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_obj_entity_binding() {
        let mut map = valid_map();
        let mut obj = ObjEntity::new("Artist", "ARTIST");
        obj.add_attribute(ObjAttribute::new("name", "NAME"));
        map.add_obj_entity(obj);
        map.add_obj_entity(ObjEntity::new("Ghost", "GHOST"));

        let errors = errors_of(&map);
        assert_eq!(errors.len(), 2);
    }
}
