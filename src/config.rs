//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.barrier-report.toml` files.

use crate::models::{BarrierIndicator, Polarity};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".barrier-report.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Survey layout settings.
    #[serde(default)]
    pub survey: SurveyConfig,

    /// Barrier items to report on.
    #[serde(default = "default_barriers")]
    pub barriers: Vec<BarrierIndicator>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            survey: SurveyConfig::default(),
            barriers: default_barriers(),
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Chart image referenced from the report.
    #[serde(default = "default_chart")]
    pub chart: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            chart: default_chart(),
        }
    }
}

fn default_output() -> String {
    "barrier_by_group.md".to_string()
}

fn default_chart() -> String {
    "barrier_by_group.svg".to_string()
}

/// How the survey export lays out its header rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Column ids, question text, import ids, then data.
    #[default]
    Qualtrics,
    /// A single header row of column names, then data.
    Plain,
}

impl Layout {
    /// Number of rows preceding the first data row.
    pub fn header_rows(&self) -> usize {
        match self {
            Layout::Qualtrics => 3,
            Layout::Plain => 1,
        }
    }

    /// Index of the row columns are matched against.
    pub fn label_row(&self) -> usize {
        match self {
            Layout::Qualtrics => 1,
            Layout::Plain => 0,
        }
    }
}

/// Survey export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyConfig {
    #[serde(default)]
    pub layout: Layout,

    /// Question text (or header) of the column holding the group label.
    #[serde(default = "default_group_question")]
    pub group_question: String,

    /// Column id holding the respondent id. Looked up in the first row.
    #[serde(default = "default_id_column")]
    pub id_column: String,

    /// Skip records with a blank group label and treat blank answers as
    /// not endorsing, instead of failing.
    #[serde(default)]
    pub skip_incomplete: bool,

    /// Also report every column whose question text mentions a keyword.
    #[serde(default)]
    pub discover_barriers: bool,

    /// Keywords matched (case-insensitively) against question text.
    #[serde(default = "default_barrier_keywords")]
    pub barrier_keywords: Vec<String>,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            group_question: default_group_question(),
            id_column: default_id_column(),
            skip_incomplete: false,
            discover_barriers: false,
            barrier_keywords: default_barrier_keywords(),
        }
    }
}

fn default_barrier_keywords() -> Vec<String> {
    vec!["barrier", "obstacle", "challenge", "difficulty", "difficult"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_group_question() -> String {
    "Are you currently an undergraduate student or graduate student?".to_string()
}

fn default_id_column() -> String {
    "ResponseId".to_string()
}

fn default_barriers() -> Vec<BarrierIndicator> {
    vec![BarrierIndicator {
        id: "graduate_degree_delay".to_string(),
        label: "Graduate degree may delay career advancement".to_string(),
        question: "To what extent do you agree with the following statement about the value \
                   of a graduate accounting degree?\n\nEarning a graduate degree may delay my \
                   career advancement compared to peers who started full-time jobs earlier."
            .to_string(),
        polarity: Polarity::Negative,
    }]
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only explicitly provided CLI values override config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(ref chart) = args.chart {
            self.general.chart = chart.clone();
        }
        if let Some(layout) = args.layout {
            self.survey.layout = layout;
        }
        if let Some(ref group_column) = args.group_column {
            self.survey.group_question = group_column.clone();
        }
        if args.skip_incomplete {
            self.survey.skip_incomplete = true;
        }
        if args.discover {
            self.survey.discover_barriers = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.output, "barrier_by_group.md");
        assert_eq!(config.general.chart, "barrier_by_group.svg");
        assert_eq!(config.survey.layout, Layout::Qualtrics);
        assert!(!config.survey.skip_incomplete);
        assert!(!config.survey.discover_barriers);
        assert!(config.survey.barrier_keywords.contains(&"obstacle".to_string()));
        assert_eq!(config.barriers.len(), 1);
        assert_eq!(config.barriers[0].polarity, Polarity::Negative);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "custom.md"
chart = "charts/custom.svg"

[survey]
layout = "plain"
group_question = "level"
skip_incomplete = true
discover_barriers = true
barrier_keywords = ["hurdle"]

[[barriers]]
id = "cost"
label = "Exam cost"
question = "exam_cost"

[[barriers]]
id = "support"
label = "Employer support"
question = "employer_support"
polarity = "positive"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "custom.md");
        assert_eq!(config.general.chart, "charts/custom.svg");
        assert_eq!(config.survey.layout, Layout::Plain);
        assert_eq!(config.survey.group_question, "level");
        assert_eq!(config.survey.id_column, "ResponseId");
        assert!(config.survey.skip_incomplete);
        assert!(config.survey.discover_barriers);
        assert_eq!(config.survey.barrier_keywords, vec!["hurdle"]);
        assert_eq!(config.barriers.len(), 2);
        assert_eq!(config.barriers[0].polarity, Polarity::Negative);
        assert_eq!(config.barriers[1].polarity, Polarity::Positive);
    }

    #[test]
    fn test_missing_barriers_use_default() {
        let config: Config = toml::from_str("[general]\nchart = \"c.svg\"\n").unwrap();
        assert_eq!(config.general.chart, "c.svg");
        assert_eq!(config.barriers, default_barriers());
    }

    #[test]
    fn test_layout_rows() {
        assert_eq!(Layout::Qualtrics.header_rows(), 3);
        assert_eq!(Layout::Qualtrics.label_row(), 1);
        assert_eq!(Layout::Plain.header_rows(), 1);
        assert_eq!(Layout::Plain.label_row(), 0);
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        let mut args = crate::cli::tests::make_args();
        args.output = Some(PathBuf::from("out.md"));
        args.layout = Some(Layout::Plain);
        args.skip_incomplete = true;
        args.discover = true;

        config.merge_with_args(&args);

        assert_eq!(config.general.output, "out.md");
        assert_eq!(config.general.chart, "barrier_by_group.svg");
        assert_eq!(config.survey.layout, Layout::Plain);
        assert!(config.survey.skip_incomplete);
        assert!(config.survey.discover_barriers);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[survey]"));
        assert!(toml_str.contains("[[barriers]]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.barriers, default_barriers());
    }
}
