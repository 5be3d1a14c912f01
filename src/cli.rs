use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::component::RenderFormat;
use crate::version::SchemaVersion;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Only show critical errors
    Quiet,
    /// Show standard information
    #[default]
    Normal,
    /// Show detailed information
    Verbose,
    /// Show all available debugging information
    Debug,
}

impl VerbosityLevel {
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            VerbosityLevel::Quiet
        } else if verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }

    /// Default `tracing` filter directive when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        match self {
            VerbosityLevel::Quiet => "error",
            VerbosityLevel::Normal => "warn",
            VerbosityLevel::Verbose => "info",
            VerbosityLevel::Debug => "debug",
        }
    }
}

/// How batch results are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One line per file plus a summary
    #[default]
    Human,
    /// Machine-readable results
    Json,
    /// Summary line only
    Summary,
}

/// Validate DDMS metadata records
#[derive(Parser, Debug, Clone)]
#[command(name = "ddms-validate")]
#[command(about = "Parse and validate DDMS metadata records in any supported schema version")]
#[command(version)]
pub struct Cli {
    /// Directory or single record to validate
    #[arg(help = "Directory or file to validate")]
    pub path: PathBuf,

    /// File extensions to process (comma-separated)
    #[arg(
        short = 'e',
        long = "extensions",
        default_value = "xml",
        help = "File extensions to process (e.g., 'xml,ddms')"
    )]
    pub extensions: String,

    /// Number of validation threads
    #[arg(short = 't', long = "threads", help = "Number of validation threads")]
    pub threads: Option<usize>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", help = "Enable verbose output")]
    pub verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Quiet mode",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Require every record to use this DDMS version
    #[arg(long = "ddms-version", value_parser = parse_version)]
    pub ddms_version: Option<SchemaVersion>,

    /// Root directory of the controlled vocabulary files
    #[arg(long = "vocabularies")]
    pub vocabularies: Option<PathBuf>,

    /// Configuration file (TOML or JSON)
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Print the rendered record when validating a single file
    #[arg(long = "render", value_enum)]
    pub render: Option<RenderFormat>,

    /// Include file patterns (glob syntax)
    #[arg(long = "include", action = clap::ArgAction::Append)]
    pub include_patterns: Vec<String>,

    /// Exclude file patterns (glob syntax)
    #[arg(long = "exclude", action = clap::ArgAction::Append)]
    pub exclude_patterns: Vec<String>,

    /// Stop after the first record that fails
    #[arg(long = "fail-fast")]
    pub fail_fast: bool,
}

fn parse_version(value: &str) -> Result<SchemaVersion, String> {
    value.parse().map_err(|e: crate::error::DdmsError| e.to_string())
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn get_extensions(&self) -> Vec<String> {
        self.extensions
            .split(',')
            .map(|s| s.trim().trim_start_matches('.').to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.path.exists() {
            return Err(format!("Path does not exist: {}", self.path.display()));
        }
        if let Some(threads) = self.threads
            && threads == 0
        {
            return Err("Number of threads must be greater than 0".to_string());
        }
        if let Some(root) = &self.vocabularies
            && !root.is_dir()
        {
            return Err(format!(
                "Vocabulary directory does not exist: {}",
                root.display()
            ));
        }
        Ok(())
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        VerbosityLevel::from_flags(self.verbose, self.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_basic_cli_parsing() {
        let args = vec!["ddms-validate", "/tmp"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.path, PathBuf::from("/tmp"));
        assert_eq!(cli.output_format, OutputFormat::Human);
        assert_eq!(cli.get_extensions(), vec!["xml"]);
        assert!(cli.ddms_version.is_none());
        assert!(cli.render.is_none());
    }

    #[test]
    fn test_full_cli_parsing() {
        let args = vec![
            "ddms-validate",
            "-e",
            "xml, .ddms",
            "-t",
            "3",
            "--ddms-version",
            "4.0",
            "--format",
            "json",
            "--render",
            "html",
            "--include",
            "*.xml",
            "--include",
            "records/**",
            "--fail-fast",
            "-q",
            "records",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.get_extensions(), vec!["xml", "ddms"]);
        assert_eq!(cli.threads, Some(3));
        assert_eq!(cli.ddms_version, Some(SchemaVersion::V4_0_1));
        assert_eq!(cli.output_format, OutputFormat::Json);
        assert_eq!(cli.render, Some(RenderFormat::Html));
        assert_eq!(cli.include_patterns, vec!["*.xml", "records/**"]);
        assert!(cli.fail_fast);
        assert_eq!(cli.verbosity(), VerbosityLevel::Quiet);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(vec!["ddms-validate", "-v", "-q", "/tmp"]).is_err());
    }

    #[test]
    fn test_unknown_version_rejected() {
        let result = Cli::try_parse_from(vec!["ddms-validate", "--ddms-version", "5.0", "/tmp"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_str().unwrap();

        let cli = Cli::try_parse_from(vec!["ddms-validate", path]).unwrap();
        assert!(cli.validate().is_ok());

        let cli = Cli::try_parse_from(vec!["ddms-validate", "-t", "0", path]).unwrap();
        assert!(cli.validate().is_err());

        let cli = Cli::try_parse_from(vec!["ddms-validate", "/nonexistent/records"]).unwrap();
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_log_filter_follows_verbosity() {
        assert_eq!(VerbosityLevel::from_flags(false, true).log_filter(), "error");
        assert_eq!(VerbosityLevel::from_flags(false, false).log_filter(), "warn");
        assert_eq!(VerbosityLevel::from_flags(true, false).log_filter(), "info");
    }
}
