//! Optional `erd-tools.toml` configuration
//!
//! ```toml
//! [report]
//! output = "docs/ERD_Report_Updated.pdf"
//! catalog = "catalog.toml"
//! verify = false
//!
//! [layout]
//! diagram = "finaderdiagram.drawio"
//! coordinates = "layout.toml"
//! strict = false
//! ```
//!
//! Every key is optional. Command line flags win over the file, the file
//! wins over built-in defaults.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "erd-tools.toml";

/// Contents of a configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    pub report: ReportConfig,
    pub layout: LayoutConfig,
}

/// `[report]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Where the PDF is written
    pub output: Option<PathBuf>,
    /// Catalog to render instead of the built-in one
    pub catalog: Option<PathBuf>,
    /// Check the rendered PDF for every entity heading
    pub verify: Option<bool>,
}

/// `[layout]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Diagram rewritten in place
    pub diagram: Option<PathBuf>,
    /// Layout file to use instead of the built-in one
    pub coordinates: Option<PathBuf>,
    /// Fail when a mapped node is missing from the diagram
    pub strict: Option<bool>,
}

impl ToolConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }

    /// Load `explicit` if given, otherwise `erd-tools.toml` in `dir` when it
    /// exists, otherwise the defaults
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "using configuration file");
            Self::from_file(candidate)
        } else {
            Ok(Self::default())
        }
    }
}
