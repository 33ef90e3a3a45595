//! barrier-report - perceived CPA licensure barriers by respondent group
//!
//! A CLI tool that reads a survey export, compares how often undergraduate
//! and graduate respondents endorse each barrier statement, and writes a
//! Markdown (or JSON) report referencing an externally rendered chart.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any error (bad arguments, malformed record, empty group, I/O)

mod analysis;
mod cli;
mod config;
mod error;
mod loader;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use models::{Report, ReportMetadata, Survey};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    init_logging(&args);

    info!("barrier-report v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        error!("Report failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Handle --init-config: generate a default .barrier-report.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::CONFIG_FILE);

    if path.exists() {
        anyhow::bail!(
            "{} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE
        );
    }

    std::fs::write(path, Config::default_toml())
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE);
    println!("   Edit it to describe your survey's group column and barrier items.");
    Ok(())
}

/// Initialize logging based on verbosity settings, overridable via `RUST_LOG`.
fn init_logging(args: &Args) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(args.log_level()).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load, aggregate and render.
fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let input = args
        .input
        .clone()
        .context("An input file is required (--input)")?;

    let survey = loader::load_from_path(&input, &config.survey, &config.barriers)
        .with_context(|| format!("Failed to load survey export {}", input.display()))?;

    let report = build_report(&survey, &config, &input)?;

    if args.dry_run {
        println!("\n🔍 Dry run: nothing written.\n");
        print!("{}", report::generate_stats_table(&report.stats));
        for comparison in &report.comparisons {
            println!("\n{}", report::summary_sentence(comparison));
        }
        return Ok(());
    }

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    let output_path = PathBuf::from(&config.general.output);
    report::save_report(&output, &output_path)?;

    if !args.quiet {
        println!("\n📊 Barrier Summary:");
        for comparison in &report.comparisons {
            println!("   {}", report::summary_sentence(comparison));
        }
        println!("\n✅ Report saved to: {}", output_path.display());
    }

    Ok(())
}

/// Aggregate a loaded survey into a complete report.
fn build_report(survey: &Survey, config: &Config, input: &Path) -> Result<Report> {
    let respondents = &survey.respondents;
    let indicators = &survey.indicators;

    let stats = analysis::aggregate(respondents, indicators)?;
    let comparisons = analysis::compare(&stats);
    let ranking = analysis::overall_ranking(respondents, indicators);

    info!(
        "Aggregated {} barrier(s) across {} respondents",
        indicators.len(),
        respondents.len()
    );

    let metadata = ReportMetadata {
        source: input.display().to_string(),
        grouping_question: config.survey.group_question.clone(),
        generated_at: Utc::now(),
        total_respondents: respondents.len(),
        group_sizes: analysis::group_sizes(respondents),
    };

    Ok(Report {
        metadata,
        stats,
        comparisons,
        ranking,
        chart_path: config.general.chart.clone(),
    })
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", config::CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Layout;
    use crate::error::ReportError;
    use crate::models::{BarrierIndicator, Group, Polarity};

    fn plain_config() -> Config {
        let mut config = Config::default();
        config.survey.layout = Layout::Plain;
        config.survey.group_question = "group".to_string();
        config.barriers = vec![BarrierIndicator {
            id: "delay".to_string(),
            label: "Graduate degree may delay career advancement".to_string(),
            question: "delay".to_string(),
            polarity: Polarity::Negative,
        }];
        config
    }

    fn fixture_csv() -> String {
        let mut csv = String::from("group,delay\n");
        for i in 0..55 {
            let answer = if i < 15 { "Agree" } else { "Disagree" };
            csv.push_str(&format!("Graduate student,{}\n", answer));
        }
        for _ in 0..147 {
            csv.push_str("Undergraduate student,Strongly disagree\n");
        }
        csv
    }

    #[test]
    fn test_end_to_end_report() {
        let config = plain_config();
        let survey =
            loader::load_survey(fixture_csv().as_bytes(), &config.survey, &config.barriers)
                .unwrap();

        let report = build_report(&survey, &config, Path::new("survey.csv")).unwrap();
        let markdown = report::generate_markdown_report(&report);

        assert_eq!(report.metadata.total_respondents, 202);
        assert_eq!(report.metadata.group_sizes.get(&Group::Graduate), Some(&55));
        assert!(markdown.contains("| Graduate | 15 / 55 | 27.3% |"));
        assert!(markdown.contains("| Undergraduate | 0 / 147 | 0.0% |"));
        assert!(markdown.contains(
            "Graduate respondents were more likely to report the barrier \
             \"Graduate degree may delay career advancement\" than Undergraduate respondents \
             (27.3% vs. 0.0%, a 27.3 percentage point gap)."
        ));
        assert!(markdown.contains("![Barrier comparison chart](barrier_by_group.svg)"));
    }

    #[test]
    fn test_build_report_empty_group_is_fatal() {
        let config = plain_config();
        let csv = "group,delay\nGraduate,Agree\n";
        let survey =
            loader::load_survey(csv.as_bytes(), &config.survey, &config.barriers).unwrap();

        let err = build_report(&survey, &config, Path::new("survey.csv")).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ReportError>(),
            Some(ReportError::EmptyGroup { .. })
        ));
    }

    #[test]
    fn test_run_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("survey.csv");
        let output = dir.path().join("out").join("report.md");
        let config_path = dir.path().join("config.toml");
        std::fs::write(&input, fixture_csv()).unwrap();
        std::fs::write(
            &config_path,
            "[survey]\nlayout = \"plain\"\ngroup_question = \"group\"\n\n\
             [[barriers]]\nid = \"delay\"\nlabel = \"Delay\"\nquestion = \"delay\"\n",
        )
        .unwrap();

        let mut args = cli::tests::make_args();
        args.input = Some(input);
        args.output = Some(output.clone());
        args.config = Some(config_path);
        args.chart = Some("charts/delay.svg".to_string());
        args.quiet = true;

        run(args).unwrap();

        let markdown = std::fs::read_to_string(&output).unwrap();
        assert!(markdown.contains("| Delay | Graduate | 15 / 55 | 27.3% |"));
        assert!(markdown.contains("![Barrier comparison chart](charts/delay.svg)"));
    }

    #[test]
    fn test_run_with_discovery_reports_keyword_columns() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("survey.csv");
        let output = dir.path().join("report.md");
        std::fs::write(
            &input,
            "group,delay,Biggest obstacle: exam cost\n\
             Graduate,Agree,Selected\n\
             Graduate,Disagree,Not Selected\n\
             Undergraduate,Disagree,Selected\n",
        )
        .unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            "[survey]\nlayout = \"plain\"\ngroup_question = \"group\"\n\n\
             [[barriers]]\nid = \"delay\"\nlabel = \"Delay\"\nquestion = \"delay\"\n",
        )
        .unwrap();

        let mut args = cli::tests::make_args();
        args.input = Some(input);
        args.output = Some(output.clone());
        args.config = Some(config_path);
        args.discover = true;
        args.quiet = true;

        run(args).unwrap();

        let markdown = std::fs::read_to_string(&output).unwrap();
        assert!(markdown.contains("| Delay | Graduate | 1 / 2 | 50.0% |"));
        assert!(markdown.contains("| Biggest obstacle: exam cost | Graduate | 1 / 2 | 50.0% |"));
        assert!(
            markdown.contains("| Biggest obstacle: exam cost | Undergraduate | 1 / 1 | 100.0% |")
        );
    }

    #[test]
    fn test_run_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("survey.csv");
        let output = dir.path().join("report.md");
        std::fs::write(&input, fixture_csv()).unwrap();

        let mut args = cli::tests::make_args();
        args.input = Some(input);
        args.output = Some(output.clone());
        args.layout = Some(Layout::Plain);
        args.group_column = Some("group".to_string());
        args.config = Some(dir.path().join("missing.toml"));
        args.dry_run = true;

        // Missing explicit config is an error, not a silent default
        assert!(run(args.clone()).is_err());

        let config_path = dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            "[[barriers]]\nid = \"delay\"\nlabel = \"Delay\"\nquestion = \"delay\"\n",
        )
        .unwrap();
        args.config = Some(config_path);

        run(args).unwrap();
        assert!(!output.exists());
    }
}
