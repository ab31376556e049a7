//! Embedded report template
//!
//! The Typst layout is loaded from `templates/report.typ` at compile time,
//! embedding it directly in the binary.

/// Report layout - loaded from templates/report.typ
const REPORT_TEMPLATE: &str = include_str!("../../templates/report.typ");

/// Source of the report template
pub fn report_template() -> &'static str {
    REPORT_TEMPLATE
}
