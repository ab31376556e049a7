//! Built-in catalog loader
//!
//! The Thana & Jail catalog is loaded from `catalog/thana_jail.toml` at
//! compile time, embedding it directly in the binary.

use super::ReportCatalog;
use crate::compiler::errors::ReportError;

/// Thana & Jail Management System catalog - loaded from catalog/thana_jail.toml
const THANA_JAIL_CATALOG: &str = include_str!("../../catalog/thana_jail.toml");

/// Parse and validate the built-in catalog
pub fn builtin_catalog() -> Result<ReportCatalog, ReportError> {
    ReportCatalog::from_toml(THANA_JAIL_CATALOG)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EntityKind;

    #[test]
    fn test_builtin_catalog_parses() {
        let catalog = builtin_catalog().unwrap();
        assert_eq!(
            catalog.document.title,
            "Bangladesh Thana & Jail Management System"
        );
        assert_eq!(catalog.sections.len(), 5);
        assert_eq!(catalog.entities.len(), 19);
        assert_eq!(catalog.relationships.len(), 19);
        assert_eq!(catalog.participation_rules.len(), 8);
        assert_eq!(catalog.cardinality_rows.len(), 19);
    }

    #[test]
    fn test_builtin_catalog_order_is_preserved() {
        let catalog = builtin_catalog().unwrap();
        let names: Vec<&str> = catalog.entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names.first(), Some(&"admin"));
        assert_eq!(names.last(), Some(&"criminal_locations"));

        let users = &catalog.entities[5];
        assert_eq!(users.name, "users");
        assert_eq!(users.attributes.len(), 7);
        assert_eq!(users.attributes[6].name, "password_hash");
    }

    #[test]
    fn test_only_incarcerations_carries_notes() {
        let catalog = builtin_catalog().unwrap();
        let with_notes: Vec<&str> = catalog
            .entities
            .iter()
            .filter(|e| !e.extended_notes.is_empty())
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(with_notes, vec!["incarcerations"]);

        let incarcerations = catalog
            .entities
            .iter()
            .find(|e| e.name == "incarcerations")
            .unwrap();
        assert_eq!(incarcerations.extended_notes.len(), 2);
        assert_eq!(
            incarcerations.extended_notes[0].lead.as_deref(),
            Some("Scenario:")
        );
    }

    #[test]
    fn test_relationship_tables() {
        let catalog = builtin_catalog().unwrap();
        assert_eq!(
            catalog.entities_of_kind(EntityKind::Relationship),
            vec!["criminal_organizations", "criminal_relations"]
        );
        assert!(catalog.entities_of_kind(EntityKind::Weak).is_empty());
    }
}
