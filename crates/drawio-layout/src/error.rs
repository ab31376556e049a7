use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse diagram {}: {detail}", .path.display())]
    Parse { path: PathBuf, detail: String },

    #[error("Failed to write diagram {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid coordinate layout: {0}")]
    InvalidLayout(String),

    #[error("Mapped node(s) not found in diagram: {}", .0.join(", "))]
    MissingNodes(Vec<String>),
}

impl LayoutError {
    /// Process exit status for this failure
    pub fn exit_code(&self) -> u8 {
        match self {
            LayoutError::NotFound(_) => 2,
            LayoutError::Parse { .. } | LayoutError::InvalidLayout(_) => 3,
            LayoutError::Write { .. } => 4,
            LayoutError::MissingNodes(_) => 5,
            LayoutError::Read { .. } => 1,
        }
    }

    /// Map a failed read of `path` to `NotFound` or `Read`
    pub(crate) fn from_read(path: &std::path::Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            LayoutError::NotFound(path.to_path_buf())
        } else {
            LayoutError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}
