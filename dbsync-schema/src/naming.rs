//! Object-layer name derivation.

use convert_case::{Case, Casing};

use crate::error::{SchemaError, SchemaResult};

/// Upper bound on candidates tried by [`unique_name`].
pub const MAX_NAME_ATTEMPTS: usize = 1000;

/// Object entity name for a table: `PAINTING_INFO` becomes `PaintingInfo`.
pub fn entity_name_for_table(table: &str) -> String {
    let name = table.to_lowercase().to_case(Case::Pascal);
    if name.is_empty() {
        "Entity".to_string()
    } else {
        name
    }
}

/// Property name for a column: `ARTIST_NAME` becomes `artistName`.
pub fn property_name_for_column(column: &str) -> String {
    let name = column.to_lowercase().to_case(Case::Camel);
    if name.is_empty() {
        "property".to_string()
    } else {
        name
    }
}

/// First of `base`, `base1`, `base2`, ... for which `taken` is false.
///
/// Gives up after [`MAX_NAME_ATTEMPTS`] candidates.
pub fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> SchemaResult<String> {
    if !taken(base) {
        return Ok(base.to_string());
    }

    (1..MAX_NAME_ATTEMPTS)
        .map(|i| format!("{}{}", base, i))
        .find(|candidate| !taken(candidate))
        .ok_or_else(|| SchemaError::NameExhausted {
            base: base.to_string(),
            attempts: MAX_NAME_ATTEMPTS,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_name_for_table() {
        assert_eq!(entity_name_for_table("PAINTING_INFO"), "PaintingInfo");
        assert_eq!(entity_name_for_table("artist"), "Artist");
    }

    #[test]
    fn test_property_name_for_column() {
        assert_eq!(property_name_for_column("ARTIST_NAME"), "artistName");
        assert_eq!(property_name_for_column("ID"), "id");
    }

    #[test]
    fn test_unique_name_suffixes() {
        let taken = ["Artist", "Artist1"];
        let name = unique_name("Artist", |n| taken.contains(&n)).unwrap();
        assert_eq!(name, "Artist2");
    }

    #[test]
    fn test_unique_name_terminates() {
        let err = unique_name("Artist", |_| true).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::NameExhausted { attempts: MAX_NAME_ATTEMPTS, .. }
        ));
    }
}
