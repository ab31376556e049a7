//! Command line definition and flag/config resolution

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::config::ToolConfig;

/// Report output path when neither a flag nor the config names one
pub const DEFAULT_OUTPUT: &str = "docs/ERD_Report_Updated.pdf";

/// Diagram path when neither a flag nor the config names one
pub const DEFAULT_DIAGRAM: &str = "finaderdiagram.drawio";

/// Exit status for a bad command line, kept clear of the 1-5 failure codes
pub const USAGE_EXIT_CODE: u8 = 64;

#[derive(Parser, Debug)]
#[command(name = "erd-tools")]
#[command(
    version,
    about = "ERD report renderer and draw.io layout fixer for the Thana & Jail Management System"
)]
pub struct Cli {
    /// Configuration file (default: ./erd-tools.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the ERD explanation report to PDF
    Report(ReportArgs),
    /// Reposition nodes and reset edge routing in a draw.io diagram
    FixLayout(FixLayoutArgs),
}

#[derive(Args, Debug, Default)]
pub struct ReportArgs {
    /// Output PDF path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Catalog TOML to render instead of the built-in one
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Check that every entity heading made it into the PDF
    #[arg(long)]
    pub verify: bool,
}

#[derive(Args, Debug, Default)]
pub struct FixLayoutArgs {
    /// Diagram to rewrite in place
    #[arg(short, long)]
    pub diagram: Option<PathBuf>,

    /// Layout TOML to use instead of the built-in one
    #[arg(long)]
    pub layout: Option<PathBuf>,

    /// Fail if a mapped node is not in the diagram
    #[arg(long)]
    pub strict: bool,

    /// Report what would change without writing
    #[arg(long)]
    pub dry_run: bool,
}

/// Effective options of the `report` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    pub output: PathBuf,
    pub catalog: Option<PathBuf>,
    pub verify: bool,
}

/// Effective options of the `fix-layout` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSettings {
    pub diagram: PathBuf,
    pub coordinates: Option<PathBuf>,
    pub strict: bool,
    pub dry_run: bool,
}

impl ReportArgs {
    /// Merge flags over the config file over the defaults
    pub fn resolve(self, config: &ToolConfig) -> ReportSettings {
        let report = &config.report;
        ReportSettings {
            output: self
                .output
                .or_else(|| report.output.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            catalog: self.catalog.or_else(|| report.catalog.clone()),
            verify: self.verify || report.verify.unwrap_or(false),
        }
    }
}

impl FixLayoutArgs {
    /// Merge flags over the config file over the defaults
    pub fn resolve(self, config: &ToolConfig) -> LayoutSettings {
        let layout = &config.layout;
        LayoutSettings {
            diagram: self
                .diagram
                .or_else(|| layout.diagram.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DIAGRAM)),
            coordinates: self.layout.or_else(|| layout.coordinates.clone()),
            strict: self.strict || layout.strict.unwrap_or(false),
            dry_run: self.dry_run,
        }
    }
}

/// Exit status for a command line clap refused; help and version exit 0
pub fn usage_exit_code(err: &clap::Error) -> u8 {
    if err.use_stderr() {
        USAGE_EXIT_CODE
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_report_defaults() {
        let cli = Cli::try_parse_from(["erd-tools", "report"]).unwrap();
        let Command::Report(args) = cli.command else {
            panic!("expected report command");
        };
        assert_eq!(
            args.resolve(&ToolConfig::default()),
            ReportSettings {
                output: PathBuf::from("docs/ERD_Report_Updated.pdf"),
                catalog: None,
                verify: false,
            }
        );
    }

    #[test]
    fn test_fix_layout_defaults() {
        let cli = Cli::try_parse_from(["erd-tools", "fix-layout"]).unwrap();
        let Command::FixLayout(args) = cli.command else {
            panic!("expected fix-layout command");
        };
        let settings = args.resolve(&ToolConfig::default());
        assert_eq!(settings.diagram, PathBuf::from("finaderdiagram.drawio"));
        assert_eq!(settings.coordinates, None);
        assert!(!settings.strict);
        assert!(!settings.dry_run);
    }

    #[test]
    fn test_flag_beats_config_beats_default() {
        let config = ToolConfig::from_str(
            "[report]\noutput = \"from-config.pdf\"\ncatalog = \"c.toml\"\nverify = true\n",
        )
        .unwrap();

        let cli =
            Cli::try_parse_from(["erd-tools", "report", "--output", "from-flag.pdf"]).unwrap();
        let Command::Report(args) = cli.command else {
            panic!("expected report command");
        };
        let settings = args.resolve(&config);

        assert_eq!(settings.output, PathBuf::from("from-flag.pdf"));
        assert_eq!(settings.catalog, Some(PathBuf::from("c.toml")));
        assert!(settings.verify);
    }

    #[test]
    fn test_layout_config_used_when_no_flags() {
        let config = ToolConfig::from_str(
            "[layout]\ndiagram = \"er.drawio\"\ncoordinates = \"l.toml\"\nstrict = true\n",
        )
        .unwrap();
        let settings = FixLayoutArgs::default().resolve(&config);

        assert_eq!(settings.diagram, PathBuf::from("er.drawio"));
        assert_eq!(settings.coordinates, Some(PathBuf::from("l.toml")));
        assert!(settings.strict);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "erd-tools",
            "fix-layout",
            "--dry-run",
            "-vv",
            "--config",
            "custom.toml",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(cli.command, Command::FixLayout(FixLayoutArgs { dry_run: true, .. })));
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["erd-tools", "render"]).is_err());
    }

    #[test]
    fn test_usage_errors_do_not_share_failure_codes() {
        let err = Cli::try_parse_from(["erd-tools", "render"]).unwrap_err();
        assert_eq!(usage_exit_code(&err), USAGE_EXIT_CODE);
        assert!(!(1..=5).contains(&usage_exit_code(&err)));

        let err = Cli::try_parse_from(["erd-tools", "report", "--bogus"]).unwrap_err();
        assert_eq!(usage_exit_code(&err), USAGE_EXIT_CODE);
    }

    #[test]
    fn test_help_exits_successfully() {
        let err = Cli::try_parse_from(["erd-tools", "--help"]).unwrap_err();
        assert_eq!(usage_exit_code(&err), 0);
    }
}
