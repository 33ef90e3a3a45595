//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::config::Layout;
use clap::Parser;
use std::path::PathBuf;

/// barrier-report - compare perceived CPA licensure barriers by respondent group
///
/// Reads a survey export, computes the share of undergraduate and graduate
/// respondents endorsing each barrier statement, and writes a markdown report.
///
/// Examples:
///   barrier-report --input survey.csv
///   barrier-report --input survey.csv --output analysis/barrier_by_group.md
///   barrier-report --input responses.csv --layout plain --group-column level
///   barrier-report --input survey.csv --dry-run
///   barrier-report --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Survey export (CSV) to analyze
    #[arg(short, long, value_name = "FILE", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Output file path for the report
    ///
    /// Defaults to barrier_by_group.md or the config file setting.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Chart image path referenced from the report
    ///
    /// The image itself is produced by a separate charting tool.
    #[arg(long, value_name = "PATH")]
    pub chart: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .barrier-report.toml in the current directory
    #[arg(short, long, value_name = "FILE", env = "BARRIER_REPORT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Header layout of the survey export
    #[arg(long, value_name = "LAYOUT")]
    pub layout: Option<Layout>,

    /// Question text or header of the group column
    #[arg(long, value_name = "TEXT")]
    pub group_column: Option<String>,

    /// Skip records with a blank group label; blank answers count as not endorsing
    #[arg(long)]
    pub skip_incomplete: bool,

    /// Also report every column whose question text mentions a barrier keyword
    #[arg(long)]
    pub discover: bool,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Dry run: load and aggregate, print the table, write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .barrier-report.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        let Some(ref input) = self.input else {
            return Err("An input file is required (--input)".to_string());
        };
        if !input.exists() {
            return Err(format!("Input file does not exist: {}", input.display()));
        }
        if !input.is_file() {
            return Err(format!("Input path is not a file: {}", input.display()));
        }

        if let Some(ref chart) = self.chart {
            if chart.trim().is_empty() {
                return Err("Chart path must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `RUST_LOG`, when set, takes precedence over this level.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
