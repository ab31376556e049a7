//! The `report` and `fix-layout` commands
//!
//! Each command returns the lines to print on success.

use drawio_layout::{fix_layout, CoordinateMap, FixOptions};
use erd_report::{builtin_catalog, verify_report, write_report, ReportCatalog};

use crate::cli::{LayoutSettings, ReportSettings};
use crate::error::ToolError;

/// Render the catalog and write the PDF
pub fn run_report(settings: &ReportSettings) -> Result<Vec<String>, ToolError> {
    let catalog = match &settings.catalog {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading catalog");
            ReportCatalog::from_file(path)?
        }
        None => builtin_catalog()?,
    };

    let report = write_report(&catalog, &settings.output)?;
    let mut lines = vec![format!(
        "Wrote {} ({} pages)",
        settings.output.display(),
        report.page_count
    )];

    if settings.verify {
        let verification = verify_report(&report.pdf, &catalog)?;
        if !verification.is_complete() {
            return Err(ToolError::Verification(verification.missing));
        }
        lines.push(format!(
            "Verified {} entity headings",
            verification.expected
        ));
    }

    Ok(lines)
}

/// Rewrite the diagram with the configured layout
pub fn run_fix_layout(settings: &LayoutSettings) -> Result<Vec<String>, ToolError> {
    let map = match &settings.coordinates {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading layout");
            CoordinateMap::from_file(path)?
        }
        None => CoordinateMap::builtin()?,
    };

    let options = FixOptions {
        dry_run: settings.dry_run,
        strict: settings.strict,
    };
    let summary = fix_layout(&settings.diagram, &map, options)?;

    let headline = if settings.dry_run {
        format!("Dry run: {} not modified.", settings.diagram.display())
    } else {
        "Successfully updated Drawio layout.".to_string()
    };
    Ok(vec![headline, summary.to_string()])
}
