//! Entity catalog: the data the report is rendered from
//!
//! A catalog describes the narrative sections, every table of the ER model
//! with its attributes, and the relationship/cardinality statements. The
//! built-in catalog lives in `catalog/thana_jail.toml` and is embedded in the
//! binary; other catalogs can be loaded from disk with [`ReportCatalog::from_file`].

pub mod embedded;

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compiler::errors::ReportError;

pub use embedded::builtin_catalog;

/// Complete input for one report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportCatalog {
    /// Title block and PDF metadata
    pub document: DocumentInfo,
    /// Numbered narrative sections rendered before the entity pages
    #[serde(default)]
    pub sections: Vec<Section>,
    /// Entities in page order
    pub entities: Vec<EntityDescriptor>,
    /// One bullet per cardinality statement
    #[serde(default)]
    pub relationships: Vec<RelationshipStatement>,
    /// Total vs partial participation rules
    #[serde(default)]
    pub participation_rules: Vec<String>,
    /// Paragraph introducing the Chen cardinality table
    #[serde(default)]
    pub chen_intro: String,
    /// Rows of the Chen cardinality table
    #[serde(default)]
    pub cardinality_rows: Vec<CardinalityRow>,
    /// Closing scope paragraph
    #[serde(default)]
    pub scope: String,
}

/// Title block of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub author: Vec<String>,
}

/// A numbered narrative section
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    /// Rendered as a single paragraph, one line each
    #[serde(default)]
    pub lines: Vec<String>,
    #[serde(default)]
    pub bullets: Vec<String>,
    #[serde(default)]
    pub subsections: Vec<Section>,
    /// Append a generated strong/weak entity classification subsection
    #[serde(default)]
    pub entity_classification: bool,
}

/// One table of the ER model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    pub name: String,
    pub purpose: String,
    #[serde(default)]
    pub related_entities: Vec<String>,
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub kind: EntityKind,
    /// Free-text explanation rendered after the attribute table
    #[serde(default)]
    pub extended_notes: Vec<Note>,
}

/// Chen classification of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Identified by its own primary key
    #[default]
    Strong,
    /// Identified only through an owner's key
    Weak,
    /// Membership or relation table linking other entities
    Relationship,
}

/// A column of an entity, written as `["name", "description"]` in TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "[String; 2]")]
pub struct Attribute {
    pub name: String,
    pub description: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

impl TryFrom<Vec<String>> for Attribute {
    type Error = String;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        match <[String; 2]>::try_from(value) {
            Ok([name, description]) => Ok(Attribute { name, description }),
            Err(value) => Err(format!(
                "attribute must be [name, description], got {} element(s): {:?}",
                value.len(),
                value
            )),
        }
    }
}

impl From<Attribute> for [String; 2] {
    fn from(attribute: Attribute) -> Self {
        [attribute.name, attribute.description]
    }
}

/// An explanatory paragraph with an optional bold lead-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    #[serde(default)]
    pub lead: Option<String>,
    pub text: String,
}

/// Display text for one relationship, e.g. "Admin 1 → N Thanas"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipStatement(pub String);

impl RelationshipStatement {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One row of the Chen cardinality table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardinalityRow {
    pub relation: String,
    pub cardinality: String,
    pub rationale: String,
}

impl ReportCatalog {
    /// Load and validate a catalog from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ReportError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ReportError::CatalogRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a catalog from a TOML string
    pub fn from_toml(s: &str) -> Result<Self, ReportError> {
        let catalog: ReportCatalog =
            toml::from_str(s).map_err(|e| ReportError::MalformedCatalog(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check the invariants the story builder relies on
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.document.title.trim().is_empty() {
            return Err(ReportError::MalformedCatalog(
                "document title is empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for (index, entity) in self.entities.iter().enumerate() {
            if entity.name.trim().is_empty() {
                return Err(ReportError::MalformedCatalog(format!(
                    "entity #{} has an empty name",
                    index + 1
                )));
            }
            if !seen.insert(entity.name.as_str()) {
                return Err(ReportError::MalformedCatalog(format!(
                    "entity '{}' is declared more than once",
                    entity.name
                )));
            }
            if entity.attributes.is_empty() {
                return Err(ReportError::MalformedCatalog(format!(
                    "entity '{}' has no attributes",
                    entity.name
                )));
            }
            for attribute in &entity.attributes {
                if attribute.name.trim().is_empty() {
                    return Err(ReportError::MalformedCatalog(format!(
                        "entity '{}' has an attribute without a name",
                        entity.name
                    )));
                }
                if attribute.description.trim().is_empty() {
                    return Err(ReportError::MalformedCatalog(format!(
                        "attribute '{}.{}' is missing a description",
                        entity.name, attribute.name
                    )));
                }
            }
        }

        for (index, row) in self.cardinality_rows.iter().enumerate() {
            if row.relation.trim().is_empty()
                || row.cardinality.trim().is_empty()
                || row.rationale.trim().is_empty()
            {
                return Err(ReportError::MalformedCatalog(format!(
                    "cardinality row #{} has an empty field",
                    index + 1
                )));
            }
        }

        Ok(())
    }

    /// Names of entities of the given kind, in catalog order
    pub fn entities_of_kind(&self, kind: EntityKind) -> Vec<&str> {
        self.entities
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MINIMAL: &str = r#"
        [document]
        title = "Test Report"

        [[entities]]
        name = "jails"
        purpose = "Jail facilities."
        related_entities = ["cell_blocks"]
        attributes = [["jail_id", "Unique jail ID"], ["name", "Jail name"]]
    "#;

    #[test]
    fn test_parse_minimal_catalog() {
        let catalog = ReportCatalog::from_toml(MINIMAL).unwrap();
        assert_eq!(catalog.entities.len(), 1);
        assert_eq!(
            catalog.entities[0].attributes,
            vec![
                Attribute::new("jail_id", "Unique jail ID"),
                Attribute::new("name", "Jail name"),
            ]
        );
        assert!(catalog.sections.is_empty());
        assert!(catalog.entities[0].extended_notes.is_empty());
    }

    #[test]
    fn test_attribute_without_description_is_rejected() {
        let toml = MINIMAL.replace(r#"["name", "Jail name"]"#, r#"["name"]"#);
        let err = ReportCatalog::from_toml(&toml).unwrap_err();
        assert!(matches!(err, ReportError::MalformedCatalog(_)));
        assert!(err.to_string().contains("[name, description]"));
    }

    #[test]
    fn test_blank_description_is_rejected() {
        let toml = MINIMAL.replace("Jail name", "  ");
        let err = ReportCatalog::from_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("jails.name"));
    }

    #[test]
    fn test_duplicate_entity_is_rejected() {
        let mut catalog = ReportCatalog::from_toml(MINIMAL).unwrap();
        catalog.entities.push(catalog.entities[0].clone());
        let err = catalog.validate().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_empty_cardinality_field_is_rejected() {
        let mut catalog = ReportCatalog::from_toml(MINIMAL).unwrap();
        catalog.cardinality_rows.push(CardinalityRow {
            relation: "Jail has Blocks".to_string(),
            cardinality: String::new(),
            rationale: "Each block belongs to one jail.".to_string(),
        });
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = ReportCatalog::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ReportError::CatalogRead { .. }));
    }

    #[test]
    fn test_entities_of_kind() {
        let toml = format!(
            "{}{}",
            MINIMAL,
            r#"
        [[entities]]
        name = "jail_staff"
        purpose = "Staff assignments."
        kind = "relationship"
        attributes = [["jail_id", "Linked jail"]]
            "#
        );
        let catalog = ReportCatalog::from_toml(&toml).unwrap();

        assert_eq!(catalog.entities_of_kind(EntityKind::Strong), vec!["jails"]);
        assert_eq!(
            catalog.entities_of_kind(EntityKind::Relationship),
            vec!["jail_staff"]
        );
        assert!(catalog.entities_of_kind(EntityKind::Weak).is_empty());
    }
}
