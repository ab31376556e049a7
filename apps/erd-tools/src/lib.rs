//! `erd-tools` command line
//!
//! The binary only parses arguments and installs logging; everything else
//! lives here so it can be tested without spawning a process.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

use std::path::Path;

pub use cli::{usage_exit_code, Cli, Command};
pub use error::ToolError;

use config::ToolConfig;

/// Run a parsed command line, with `dir` as the working directory used to
/// find `erd-tools.toml`
pub fn run(cli: Cli, dir: &Path) -> Result<Vec<String>, ToolError> {
    let config = ToolConfig::discover(cli.config.as_deref(), dir)?;

    match cli.command {
        Command::Report(args) => commands::run_report(&args.resolve(&config)),
        Command::FixLayout(args) => commands::run_fix_layout(&args.resolve(&config)),
    }
}
