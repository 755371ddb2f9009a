//! Notifications about model mutations.

use std::fmt;

use serde::Serialize;

/// One mutation applied to the model by a `ToModel` token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ModelChange {
    DbEntityAdded { table: String },
    DbEntityRemoved { table: String },
    DbAttributeAdded { table: String, column: String },
    DbAttributeRemoved { table: String, column: String },
    DbAttributeModified { table: String, column: String },
    DbRelationshipAdded { table: String, relationship: String },
    DbRelationshipRemoved { table: String, relationship: String },
    ObjEntityAdded { name: String },
    ObjEntityRemoved { name: String },
    ObjAttributeAdded { entity: String, attribute: String },
    ObjAttributeRemoved { entity: String, attribute: String },
}

impl fmt::Display for ModelChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelChange::DbEntityAdded { table } => write!(f, "added table {}", table),
            ModelChange::DbEntityRemoved { table } => write!(f, "removed table {}", table),
            ModelChange::DbAttributeAdded { table, column } => {
                write!(f, "added column {}.{}", table, column)
            }
            ModelChange::DbAttributeRemoved { table, column } => {
                write!(f, "removed column {}.{}", table, column)
            }
            ModelChange::DbAttributeModified { table, column } => {
                write!(f, "modified column {}.{}", table, column)
            }
            ModelChange::DbRelationshipAdded { table, relationship } => {
                write!(f, "added relationship {}.{}", table, relationship)
            }
            ModelChange::DbRelationshipRemoved { table, relationship } => {
                write!(f, "removed relationship {}.{}", table, relationship)
            }
            ModelChange::ObjEntityAdded { name } => write!(f, "added object entity {}", name),
            ModelChange::ObjEntityRemoved { name } => write!(f, "removed object entity {}", name),
            ModelChange::ObjAttributeAdded { entity, attribute } => {
                write!(f, "added property {}.{}", entity, attribute)
            }
            ModelChange::ObjAttributeRemoved { entity, attribute } => {
                write!(f, "removed property {}.{}", entity, attribute)
            }
        }
    }
}

/// Receives every model mutation, in order.
pub trait ModelMergeDelegate {
    /// Called after each mutation.
    fn on_change(&mut self, change: &ModelChange);
}

impl<T: ModelMergeDelegate + ?Sized> ModelMergeDelegate for &mut T {
    fn on_change(&mut self, change: &ModelChange) {
        (**self).on_change(change);
    }
}

/// Ignores all notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDelegate;

impl ModelMergeDelegate for NoopDelegate {
    fn on_change(&mut self, _change: &ModelChange) {}
}

/// Records notifications for later inspection.
#[derive(Debug, Default, Clone)]
pub struct ModelChangeLog {
    changes: Vec<ModelChange>,
}

impl ModelChangeLog {
    /// Recorded changes in order.
    pub fn changes(&self) -> &[ModelChange] {
        &self.changes
    }

    /// Take the recorded changes, leaving the log empty.
    pub fn drain(&mut self) -> Vec<ModelChange> {
        std::mem::take(&mut self.changes)
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl ModelMergeDelegate for ModelChangeLog {
    fn on_change(&mut self, change: &ModelChange) {
        self.changes.push(change.clone());
    }
}
