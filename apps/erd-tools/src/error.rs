use drawio_layout::LayoutError;
use erd_report::ReportError;
use thiserror::Error;

/// Any failure of an `erd-tools` command
#[derive(Error, Debug)]
pub enum ToolError {
    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("Report is missing {} entity heading(s): {}", .0.len(), .0.join(", "))]
    Verification(Vec<String>),

    #[error("{0:#}")]
    Config(#[from] anyhow::Error),
}

impl ToolError {
    /// Process exit status: 2 not found, 3 malformed input, 4 write failure,
    /// 5 missing nodes or failed verification, 1 anything else
    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::Report(e) => e.exit_code(),
            ToolError::Layout(e) => e.exit_code(),
            ToolError::Verification(_) => 5,
            ToolError::Config(e) => match e.root_cause().downcast_ref::<std::io::Error>() {
                Some(io) if io.kind() == std::io::ErrorKind::NotFound => 2,
                Some(_) => 1,
                None => 3,
            },
        }
    }
}
