//! Error types for catalog loading, compilation and output

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A Typst diagnostic raised while compiling the report template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileError {
    /// Human-readable error message
    pub message: String,
    /// Helpful hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Severity level
    pub severity: ErrorSeverity,
}

/// Error severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSeverity {
    Error,
    Warning,
}

impl CompileError {
    /// Create a new compile error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            hint: None,
            severity: ErrorSeverity::Error,
        }
    }

    /// Set a hint
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Set as warning
    pub fn as_warning(mut self) -> Self {
        self.severity = ErrorSeverity::Warning;
        self
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, " (hint: {})", hint)?;
        }
        Ok(())
    }
}

/// Everything that can go wrong between loading a catalog and writing the PDF
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Malformed entity catalog: {0}")]
    MalformedCatalog(String),

    #[error("Failed to read catalog {}: {source}", .path.display())]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed table: {0}")]
    MalformedTable(String),

    #[error("Invalid output path: '{}'", .0.display())]
    InvalidOutputPath(PathBuf),

    #[error("Failed to write report to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Report template failed to compile: {}", join_diagnostics(.0))]
    Compile(Vec<CompileError>),

    #[error("PDF export failed: {0}")]
    Export(String),

    #[error("Invalid template input: {0}")]
    InvalidInput(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PDF text extraction failed: {0}")]
    Extraction(String),
}

impl ReportError {
    /// Process exit status for this failure
    pub fn exit_code(&self) -> u8 {
        match self {
            ReportError::CatalogRead { source, .. }
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                2
            }
            ReportError::MalformedCatalog(_)
            | ReportError::MalformedTable(_)
            | ReportError::InvalidInput(_)
            | ReportError::Json(_) => 3,
            ReportError::InvalidOutputPath(_) | ReportError::Write { .. } => 4,
            _ => 1,
        }
    }
}

fn join_diagnostics(errors: &[CompileError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
