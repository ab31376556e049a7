//! Core rendering logic
//!
//! The story is handed to the embedded template as `sys.inputs`, compiled in
//! a [`ReportWorld`], and exported with `typst-pdf`.

use std::fs;
use std::path::Path;

use typst::diag::{Severity, SourceDiagnostic};

use super::errors::{CompileError, ReportError};
use super::RenderedReport;
use crate::catalog::ReportCatalog;
use crate::story::{build_story, Story, TableStyle};
use crate::templates::report_template;
use crate::world::ReportWorld;

/// Memoization entries older than this many compilations are dropped
const CACHE_MAX_AGE: usize = 10;

/// Validate the catalog, lay out the story and compile it to PDF
pub fn build_report(catalog: &ReportCatalog) -> Result<RenderedReport, ReportError> {
    catalog.validate()?;
    let story = build_story(catalog)?;
    compile_story(&story, &TableStyle::default())
}

/// Build the report and write it to `output`
///
/// Missing parent directories are created and an existing file is
/// overwritten.
pub fn write_report(
    catalog: &ReportCatalog,
    output: &Path,
) -> Result<RenderedReport, ReportError> {
    check_output_path(output)?;

    let report = build_report(catalog)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ReportError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(output, &report.pdf).map_err(|source| ReportError::Write {
        path: output.to_path_buf(),
        source,
    })?;

    tracing::info!(
        path = %output.display(),
        pages = report.page_count,
        bytes = report.pdf.len(),
        "report written"
    );

    Ok(report)
}

fn check_output_path(output: &Path) -> Result<(), ReportError> {
    if output.as_os_str().is_empty() || output.is_dir() || output.file_name().is_none() {
        return Err(ReportError::InvalidOutputPath(output.to_path_buf()));
    }
    Ok(())
}

/// Compile a story with the given table style
pub fn compile_story(story: &Story, style: &TableStyle) -> Result<RenderedReport, ReportError> {
    let inputs = serde_json::json!({
        "meta": {
            "title": story.title,
            "author": story.author,
        },
        "table_style": serde_json::to_value(style)?,
        "story": serde_json::to_value(&story.blocks)?,
    });

    let world = ReportWorld::new(report_template(), &inputs)?;

    let warned = typst::compile(&world);
    let (_, warnings) = categorize_diagnostics(&warned.warnings);
    for warning in &warnings {
        tracing::warn!("typst: {}", warning);
    }

    let result = match warned.output {
        Ok(document) => typst_pdf::pdf(&document, &typst_pdf::PdfOptions::default())
            .map(|pdf| RenderedReport {
                pdf,
                page_count: document.pages.len(),
                warnings,
            })
            .map_err(|diagnostics| {
                let (errors, _) = categorize_diagnostics(&diagnostics);
                let detail = errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                ReportError::Export(detail)
            }),
        Err(diagnostics) => {
            let (errors, _) = categorize_diagnostics(&diagnostics);
            if errors.is_empty() {
                Err(ReportError::Compile(vec![CompileError::new(
                    "Compilation failed with unknown error",
                )]))
            } else {
                Err(ReportError::Compile(errors))
            }
        }
    };

    comemo::evict(CACHE_MAX_AGE);

    let report = result?;
    tracing::debug!(pages = report.page_count, "report compiled");
    Ok(report)
}

/// Validate Typst syntax without full compilation
pub fn validate_syntax(source: &str) -> Vec<CompileError> {
    typst::syntax::parse(source)
        .errors()
        .into_iter()
        .map(|error| CompileError::new(error.message.to_string()))
        .collect()
}

/// Categorize diagnostics into errors and warnings
fn categorize_diagnostics(
    diagnostics: &[SourceDiagnostic],
) -> (Vec<CompileError>, Vec<CompileError>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for diag in diagnostics {
        let mut compile_error = CompileError::new(diag.message.to_string());

        if !diag.hints.is_empty() {
            let hint = diag
                .hints
                .iter()
                .map(|h| h.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            compile_error = compile_error.with_hint(hint);
        }

        match diag.severity {
            Severity::Error => errors.push(compile_error),
            Severity::Warning => warnings.push(compile_error.as_warning()),
        }
    }

    (errors, warnings)
}
