//! Applying tokens to the in-memory model.

use dbsync_schema::naming::{entity_name_for_table, property_name_for_column, unique_name};
use dbsync_schema::{DataMap, DbAttribute, DbEntity, DbRelationship, ObjAttribute, ObjEntity};
use tracing::debug;

use crate::delegate::{ModelChange, ModelMergeDelegate};
use crate::error::{MergeError, MergeResult};

use super::TokenOp;

/// Mutate `map` according to `op`, notifying `delegate` after each change.
pub(crate) fn apply(
    op: &TokenOp,
    map: &mut DataMap,
    delegate: &mut dyn ModelMergeDelegate,
) -> MergeResult<()> {
    match op {
        TokenOp::CreateTable { entity } => create_table(entity, map, delegate),
        TokenOp::DropTable { entity } => drop_table(&entity.name, map, delegate),
        TokenOp::AddColumn { entity, column } => add_column(&entity.name, column, map, delegate),
        TokenOp::DropColumn { entity, column } => {
            drop_column(&entity.name, &column.name, map, delegate)
        }
        TokenOp::SetColumnType { entity, to, .. } => {
            modify_column(&entity.name, &to.name, map, delegate, |attr| {
                attr.sql_type = to.sql_type;
                attr.max_length = to.max_length;
                attr.precision = to.precision;
                attr.scale = to.scale;
            })
        }
        TokenOp::SetNotNull { entity, column } => {
            modify_column(&entity.name, &column.name, map, delegate, |attr| {
                attr.mandatory = true
            })
        }
        TokenOp::SetAllowNull { entity, column } => {
            modify_column(&entity.name, &column.name, map, delegate, |attr| {
                attr.mandatory = false
            })
        }
        TokenOp::SetPrimaryKey { entity, to, .. } => {
            set_primary_key(&entity.name, to, map, delegate)
        }
        TokenOp::AddRelationship {
            entity,
            relationship,
        } => add_relationship(&entity.name, relationship, map, delegate),
        TokenOp::DropRelationship {
            entity,
            relationship,
        } => drop_relationship(&entity.name, &relationship.name, map, delegate),
        // Data backfills have no model-side effect.
        TokenOp::SetValueForNull { .. } | TokenOp::Reverse { .. } => Ok(()),
    }
}

fn table_mut<'m>(map: &'m mut DataMap, table: &str) -> MergeResult<&'m mut DbEntity> {
    map.db_entity_mut(table)
        .ok_or_else(|| MergeError::model(format!("table `{}` does not exist", table)))
}

/// Columns that become object properties: everything except FK-only columns.
fn is_property_column(column: &DbAttribute) -> bool {
    !column.foreign_key || column.primary_key
}

fn create_table(
    entity: &DbEntity,
    map: &mut DataMap,
    delegate: &mut dyn ModelMergeDelegate,
) -> MergeResult<()> {
    if map.has_db_entity(&entity.name) {
        return Err(MergeError::model(format!(
            "table `{}` already exists",
            entity.name
        )));
    }

    map.add_db_entity(entity.clone());
    delegate.on_change(&ModelChange::DbEntityAdded {
        table: entity.name.clone(),
    });

    let obj_name = unique_name(&entity_name_for_table(&entity.name), |n| {
        map.has_obj_entity(n)
    })?;

    let mut obj = ObjEntity::new(&obj_name, &entity.name);
    for column in entity.attributes().filter(|c| is_property_column(c)) {
        let name = unique_name(&property_name_for_column(&column.name), |n| {
            obj.has_attribute(n)
        })?;
        obj.add_attribute(ObjAttribute::new(name, &column.name));
    }

    debug!(table = %entity.name, obj_entity = %obj_name, "Synthesized object entity");
    map.add_obj_entity(obj);
    delegate.on_change(&ModelChange::ObjEntityAdded { name: obj_name });

    Ok(())
}

fn drop_table(
    table: &str,
    map: &mut DataMap,
    delegate: &mut dyn ModelMergeDelegate,
) -> MergeResult<()> {
    if !map.has_db_entity(table) {
        return Err(MergeError::model(format!("table `{}` does not exist", table)));
    }

    for (source, relationship) in map.relationships_targeting(table) {
        if let Some(entity) = map.db_entity_mut(&source) {
            entity.remove_relationship(&relationship);
            delegate.on_change(&ModelChange::DbRelationshipRemoved {
                table: source,
                relationship,
            });
        }
    }

    for name in map.mapped_obj_entities(table) {
        map.remove_obj_entity(&name);
        delegate.on_change(&ModelChange::ObjEntityRemoved { name });
    }

    map.remove_db_entity(table);
    delegate.on_change(&ModelChange::DbEntityRemoved {
        table: table.to_string(),
    });

    Ok(())
}

fn add_column(
    table: &str,
    column: &DbAttribute,
    map: &mut DataMap,
    delegate: &mut dyn ModelMergeDelegate,
) -> MergeResult<()> {
    let entity = table_mut(map, table)?;
    if entity.attribute(&column.name).is_some() {
        return Err(MergeError::model(format!(
            "column `{}.{}` already exists",
            table, column.name
        )));
    }

    entity.add_attribute(column.clone());
    delegate.on_change(&ModelChange::DbAttributeAdded {
        table: table.to_string(),
        column: column.name.clone(),
    });

    if !is_property_column(column) {
        return Ok(());
    }

    for obj_name in map.mapped_obj_entities(table) {
        let Some(obj) = map.obj_entity_mut(&obj_name) else {
            continue;
        };
        if obj.attribute_for_column(&column.name).is_some() {
            continue;
        }

        let name = unique_name(&property_name_for_column(&column.name), |n| {
            obj.has_attribute(n)
        })?;
        obj.add_attribute(ObjAttribute::new(&name, &column.name));
        delegate.on_change(&ModelChange::ObjAttributeAdded {
            entity: obj_name,
            attribute: name,
        });
    }

    Ok(())
}

fn drop_column(
    table: &str,
    column: &str,
    map: &mut DataMap,
    delegate: &mut dyn ModelMergeDelegate,
) -> MergeResult<()> {
    let entity = table_mut(map, table)?;
    if entity.attribute(column).is_none() {
        return Err(MergeError::model(format!(
            "column `{}.{}` does not exist",
            table, column
        )));
    }

    for rel in entity.remove_relationships_where(|r| r.uses_source_column(column)) {
        delegate.on_change(&ModelChange::DbRelationshipRemoved {
            table: table.to_string(),
            relationship: rel.name,
        });
    }

    for (source, relationship) in map.relationships_targeting(table) {
        let Some(entity) = map.db_entity_mut(&source) else {
            continue;
        };
        let uses_column = entity
            .relationship(&relationship)
            .is_some_and(|r| r.target_columns().any(|c| c == column));
        if uses_column {
            entity.remove_relationship(&relationship);
            delegate.on_change(&ModelChange::DbRelationshipRemoved {
                table: source,
                relationship,
            });
        }
    }

    for obj_name in map.mapped_obj_entities(table) {
        let Some(obj) = map.obj_entity_mut(&obj_name) else {
            continue;
        };
        let Some(property) = obj.attribute_for_column(column).map(|a| a.name.clone()) else {
            continue;
        };
        obj.remove_attribute(&property);
        delegate.on_change(&ModelChange::ObjAttributeRemoved {
            entity: obj_name,
            attribute: property,
        });
    }

    table_mut(map, table)?.remove_attribute(column);
    delegate.on_change(&ModelChange::DbAttributeRemoved {
        table: table.to_string(),
        column: column.to_string(),
    });

    Ok(())
}

fn modify_column(
    table: &str,
    column: &str,
    map: &mut DataMap,
    delegate: &mut dyn ModelMergeDelegate,
    change: impl FnOnce(&mut DbAttribute),
) -> MergeResult<()> {
    let attr = table_mut(map, table)?
        .attribute_mut(column)
        .ok_or_else(|| {
            MergeError::model(format!("column `{}.{}` does not exist", table, column))
        })?;

    change(attr);
    delegate.on_change(&ModelChange::DbAttributeModified {
        table: table.to_string(),
        column: column.to_string(),
    });

    Ok(())
}

fn set_primary_key(
    table: &str,
    columns: &[String],
    map: &mut DataMap,
    delegate: &mut dyn ModelMergeDelegate,
) -> MergeResult<()> {
    let entity = table_mut(map, table)?;

    if let Some(missing) = columns.iter().find(|c| entity.attribute(c).is_none()) {
        return Err(MergeError::model(format!(
            "primary key column `{}.{}` does not exist",
            table, missing
        )));
    }

    for attr in entity.attributes_mut() {
        let is_key = columns.contains(&attr.name);
        if attr.primary_key != is_key {
            attr.primary_key = is_key;
            if is_key {
                attr.mandatory = true;
            }
            delegate.on_change(&ModelChange::DbAttributeModified {
                table: table.to_string(),
                column: attr.name.clone(),
            });
        }
    }

    Ok(())
}

fn add_relationship(
    table: &str,
    relationship: &DbRelationship,
    map: &mut DataMap,
    delegate: &mut dyn ModelMergeDelegate,
) -> MergeResult<()> {
    let entity = table_mut(map, table)?;

    if relationship.is_fk_side() {
        for column in relationship.source_columns() {
            if let Some(attr) = entity.attribute_mut(column) {
                attr.foreign_key = true;
            }
        }
    }

    entity.add_relationship(relationship.clone());
    delegate.on_change(&ModelChange::DbRelationshipAdded {
        table: table.to_string(),
        relationship: relationship.name.clone(),
    });

    Ok(())
}

fn drop_relationship(
    table: &str,
    relationship: &str,
    map: &mut DataMap,
    delegate: &mut dyn ModelMergeDelegate,
) -> MergeResult<()> {
    let entity = table_mut(map, table)?;

    if entity.remove_relationship(relationship).is_none() {
        return Err(MergeError::model(format!(
            "relationship `{}.{}` does not exist",
            table, relationship
        )));
    }

    delegate.on_change(&ModelChange::DbRelationshipRemoved {
        table: table.to_string(),
        relationship: relationship.to_string(),
    });

    Ok(())
}
