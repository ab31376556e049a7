//! Post-render check of the PDF contents
//!
//! Text is pulled back out of the rendered PDF with `pdf-extract` and every
//! entity of the catalog must appear as a `Table: <name>` heading. Text
//! extraction does not preserve spacing reliably, so whitespace is ignored on
//! both sides of the comparison.

use pdf_extract::extract_text_from_mem;
use serde::{Deserialize, Serialize};

use crate::catalog::ReportCatalog;
use crate::compiler::errors::ReportError;
use crate::story::ENTITY_HEADING_PREFIX;

/// Outcome of checking a rendered report against its catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    /// Number of entity headings expected
    pub expected: usize,
    /// Expected headings that were not found, in catalog order
    pub missing: Vec<String>,
}

impl Verification {
    /// True when every expected heading was found
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Extract the PDF text and look for every entity heading
pub fn verify_report(pdf_bytes: &[u8], catalog: &ReportCatalog) -> Result<Verification, ReportError> {
    let text = extract_text_from_mem(pdf_bytes)
        .map_err(|e| ReportError::Extraction(e.to_string()))?;

    let missing = missing_headings(&text, catalog);
    let verification = Verification {
        expected: catalog.entities.len(),
        missing,
    };

    if verification.is_complete() {
        tracing::info!(headings = verification.expected, "all entity headings present");
    } else {
        tracing::warn!(missing = ?verification.missing, "entity headings missing from PDF");
    }

    Ok(verification)
}

/// Entity headings absent from `text`, compared without whitespace
pub fn missing_headings(text: &str, catalog: &ReportCatalog) -> Vec<String> {
    let haystack = squash(text);

    catalog
        .entities
        .iter()
        .map(|entity| format!("{}{}", ENTITY_HEADING_PREFIX, entity.name))
        .filter(|heading| !haystack.contains(&squash(heading)))
        .collect()
}

fn squash(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin_catalog;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_all_headings_found() {
        let catalog = builtin_catalog().unwrap();
        let text: String = catalog
            .entities
            .iter()
            .map(|e| format!("Table: {}\nPurpose: ...\n", e.name))
            .collect();
        assert!(missing_headings(&text, &catalog).is_empty());
    }

    #[test]
    fn test_whitespace_is_ignored() {
        let catalog = builtin_catalog().unwrap();
        let text: String = catalog
            .entities
            .iter()
            .map(|e| format!("Table:\n  {} ", e.name))
            .collect();
        assert!(missing_headings(&text, &catalog).is_empty());
    }

    #[test]
    fn test_missing_headings_in_order() {
        let catalog = builtin_catalog().unwrap();
        let text = "Table: admin\nTable: thanas\n";
        let missing = missing_headings(text, &catalog);

        assert_eq!(missing.len(), catalog.entities.len() - 2);
        assert_eq!(missing[0], format!("Table: {}", catalog.entities[1].name));
        assert!(!missing.contains(&"Table: admin".to_string()));
    }

    #[test]
    fn test_garbage_bytes_fail_extraction() {
        let catalog = builtin_catalog().unwrap();
        let err = verify_report(b"not a pdf", &catalog).unwrap_err();
        assert!(matches!(err, ReportError::Extraction(_)));
    }
}
