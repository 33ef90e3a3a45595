//! Markdown report generation.
//!
//! This module renders the aggregated barrier statistics as a
//! Markdown report or JSON document.

use crate::models::{BarrierTotal, GroupComparison, GroupStat, Report, ReportMetadata};
use anyhow::{Context, Result};
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# Perceived CPA Licensure Barriers by Respondent Group\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));

    output.push_str("## Barrier indicators\n\n");
    output.push_str(&generate_stats_table(&report.stats));
    output.push('\n');

    output.push_str(&generate_summary_section(&report.comparisons));
    output.push_str(&generate_ranking_section(&report.ranking));
    output.push_str(&generate_chart_section(&report.chart_path));
    output.push_str(&generate_notes_section());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "Grouping question: **{}**\n\n",
        single_line(&metadata.grouping_question)
    ));
    section.push_str(&format!("- **Source:** `{}`\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Respondents:** {}\n",
        metadata.total_respondents
    ));
    for (group, size) in &metadata.group_sizes {
        section.push_str(&format!("  - {}: {}\n", group, size));
    }
    section.push('\n');

    section
}

/// Render the per-group table, one row per (barrier, group) pair.
pub fn generate_stats_table(stats: &[GroupStat]) -> String {
    let mut table = String::new();

    table.push_str("| Barrier | Group | Respondents | Percentage |\n");
    table.push_str("| --- | --- | ---: | ---: |\n");

    for stat in stats {
        table.push_str(&format!(
            "| {} | {} | {} | {:.1}% |\n",
            escape_cell(&stat.barrier_label),
            stat.group,
            stat.ratio(),
            stat.percentage
        ));
    }

    table
}

/// One sentence per barrier naming the group that reported it more often.
pub fn summary_sentence(comparison: &GroupComparison) -> String {
    if comparison.is_tie() {
        return format!(
            "{} and {} respondents reported the barrier \"{}\" at the same rate ({:.1}%).",
            comparison.higher,
            comparison.lower,
            comparison.barrier_label,
            comparison.higher_percentage
        );
    }

    format!(
        "{} respondents were more likely to report the barrier \"{}\" than {} respondents \
         ({:.1}% vs. {:.1}%, a {:.1} percentage point gap).",
        comparison.higher,
        comparison.barrier_label,
        comparison.lower,
        comparison.higher_percentage,
        comparison.lower_percentage,
        comparison.gap
    )
}

/// Generate the summary section.
fn generate_summary_section(comparisons: &[GroupComparison]) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");

    if comparisons.is_empty() {
        section.push_str("No group comparisons were available.\n\n");
        return section;
    }

    for comparison in comparisons {
        section.push_str(&format!("- {}\n", summary_sentence(comparison)));
    }
    section.push('\n');

    section
}

/// Generate the overall ranking section.
fn generate_ranking_section(ranking: &[BarrierTotal]) -> String {
    if ranking.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Overall ranking\n\n");
    section.push_str("| Barrier | Respondents | Percentage |\n");
    section.push_str("| --- | ---: | ---: |\n");

    for entry in ranking {
        section.push_str(&format!(
            "| {} | {} / {} | {:.1}% |\n",
            escape_cell(&entry.barrier_label),
            entry.count,
            entry.respondents,
            entry.percentage
        ));
    }
    section.push('\n');

    section
}

/// Generate the chart section. The image is rendered elsewhere.
fn generate_chart_section(chart_path: &str) -> String {
    format!("## Chart\n\n![Barrier comparison chart]({})\n\n", chart_path)
}

fn generate_notes_section() -> String {
    let mut section = String::new();

    section.push_str("## Notes\n\n");
    section.push_str(
        "- A respondent endorses a barrier when they agree with a statement phrased as an \
         obstacle, disagree with a statement phrased favourably, or select it in a \
         multi-select item.\n",
    );
    section.push_str("- Percentages are rounded to one decimal place.\n");

    section
}

fn escape_cell(text: &str) -> String {
    single_line(text).replace('|', "\\|")
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write rendered report content, creating parent directories as needed.
pub fn save_report(content: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
