//! ERD report renderer
//!
//! Turns an entity catalog into the paginated PDF that explains the
//! Thana & Jail Management System ER model:
//! - [`catalog`]: the data (sections, entities, relationships) and its validation
//! - [`story`]: ordering and numbering of everything that is printed
//! - [`compiler`] and [`world`]: Typst compilation of the story to PDF
//! - [`verifier`]: text-level check of a rendered PDF

pub mod catalog;
pub mod compiler;
pub mod story;
pub mod templates;
pub mod verifier;
pub mod world;

pub use catalog::{
    builtin_catalog, Attribute, CardinalityRow, DocumentInfo, EntityDescriptor, EntityKind, Note,
    RelationshipStatement, ReportCatalog, Section,
};
pub use compiler::{
    build_report, compile_story, write_report, CompileError, RenderedReport, ReportError,
};
pub use story::{build_story, Block, Story, Table, TableStyle};
pub use verifier::{missing_headings, verify_report, Verification};
