//! Relationships between tables.

use serde::{Deserialize, Serialize};

use super::{DataMap, Named};

/// One column pair of a relationship join.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DbJoin {
    /// Column in the source table.
    pub source: String,
    /// Column in the target table.
    pub target: String,
}

impl DbJoin {
    /// Create a join between two columns.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// A relationship from one table to another.
///
/// The relationship is owned by its source table. The reverse relationship is
/// referenced by name only and resolved through the owning [`DataMap`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbRelationship {
    /// Relationship name, unique within the source table.
    pub name: String,
    /// Source table name. Filled in when the relationship is attached to a table.
    #[serde(skip)]
    pub source_entity: String,
    /// Target table name.
    pub target: String,
    /// Join column pairs.
    #[serde(default)]
    pub joins: Vec<DbJoin>,
    /// To-many cardinality.
    #[serde(default)]
    pub to_many: bool,
    /// The target's primary key depends on this relationship.
    #[serde(default)]
    pub to_dependent_pk: bool,
    /// Name of the reverse relationship in the target table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverse: Option<String>,
    /// Foreign key constraint name, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fk_name: Option<String>,
}

impl DbRelationship {
    /// Create a to-one relationship without joins.
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_entity: String::new(),
            target: target.into(),
            joins: Vec::new(),
            to_many: false,
            to_dependent_pk: false,
            reverse: None,
            fk_name: None,
        }
    }

    /// Add a join column pair.
    pub fn join(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.joins.push(DbJoin::new(source, target));
        self
    }

    /// Mark as to-many.
    pub fn to_many(mut self) -> Self {
        self.to_many = true;
        self
    }

    /// Set the reverse relationship name.
    pub fn with_reverse(mut self, name: impl Into<String>) -> Self {
        self.reverse = Some(name.into());
        self
    }

    /// Set the foreign key constraint name.
    pub fn with_fk_name(mut self, name: impl Into<String>) -> Self {
        self.fk_name = Some(name.into());
        self
    }

    /// Whether this relationship is backed by a foreign key constraint on its source table.
    pub fn is_fk_side(&self) -> bool {
        !self.to_many && !self.to_dependent_pk
    }

    /// Source columns of the join, in join order.
    pub fn source_columns(&self) -> impl Iterator<Item = &str> {
        self.joins.iter().map(|j| j.source.as_str())
    }

    /// Target columns of the join, in join order.
    pub fn target_columns(&self) -> impl Iterator<Item = &str> {
        self.joins.iter().map(|j| j.target.as_str())
    }

    /// Whether any join uses `column` on the source side.
    pub fn uses_source_column(&self, column: &str) -> bool {
        self.joins.iter().any(|j| j.source == column)
    }

    /// Sorted join pairs, the identity used when comparing relationships.
    pub fn join_signature(&self) -> Vec<DbJoin> {
        let mut joins = self.joins.clone();
        joins.sort();
        joins
    }

    /// Resolve the reverse relationship in `map`.
    ///
    /// Uses the declared reverse name when present, otherwise looks for a
    /// relationship in the target table whose joins mirror this one.
    pub fn reverse_relationship<'a>(&self, map: &'a DataMap) -> Option<&'a DbRelationship> {
        let target = map.db_entity(&self.target)?;

        if let Some(name) = &self.reverse {
            return target.relationship(name);
        }

        let mut mirrored: Vec<DbJoin> = self
            .joins
            .iter()
            .map(|j| DbJoin::new(&j.target, &j.source))
            .collect();
        mirrored.sort();

        target.relationships().find(|r| {
            r.target == self.source_entity && r.join_signature() == mirrored
        })
    }
}

impl Named for DbRelationship {
    fn name(&self) -> &str {
        &self.name
    }
}
