//! Typst compilation of a story into PDF bytes

pub mod errors;
pub mod render;

pub use errors::{CompileError, ErrorSeverity, ReportError};
pub use render::{build_report, compile_story, validate_syntax, write_report};

/// A compiled report ready to be written out
#[derive(Debug, Clone)]
pub struct RenderedReport {
    /// The PDF file contents
    pub pdf: Vec<u8>,
    /// Number of pages in the document
    pub page_count: usize,
    /// Non-fatal diagnostics raised while compiling
    pub warnings: Vec<CompileError>,
}
