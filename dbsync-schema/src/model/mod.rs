//! Schema model: tables, columns, relationships and the object layer.

mod attribute;
mod data_map;
mod entity;
mod obj_entity;
mod relationship;

pub use attribute::DbAttribute;
pub use data_map::DataMap;
pub use entity::DbEntity;
pub use obj_entity::{ObjAttribute, ObjEntity};
pub use relationship::{DbJoin, DbRelationship};

/// Anything identified by a name within its container.
pub trait Named {
    /// The name.
    fn name(&self) -> &str;
}

/// Serializes name-keyed maps as plain sequences.
pub(crate) mod keyed {
    use indexmap::IndexMap;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Named;

    pub fn serialize<S, T>(map: &IndexMap<String, T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        serializer.collect_seq(map.values())
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<IndexMap<String, T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Named,
    {
        let items = Vec::<T>::deserialize(deserializer)?;
        let mut map = IndexMap::with_capacity(items.len());

        for item in items {
            let name = item.name().to_string();
            if map.contains_key(&name) {
                return Err(D::Error::custom(format!("duplicate name `{}`", name)));
            }
            map.insert(name, item);
        }

        Ok(map)
    }
}
