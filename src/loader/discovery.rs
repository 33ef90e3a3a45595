//! Keyword-based discovery of barrier columns.
//!
//! Finds columns whose question text mentions a barrier keyword and
//! classifies each by the answers it holds, so the report can rank
//! barriers that were never listed in the configuration.

use crate::models::{Answer, BarrierIndicator, Likert, Polarity};
use csv::StringRecord;
use std::collections::BTreeSet;
use tracing::debug;

/// Rating scales recognised in discovered columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Agreement,
    Importance,
    Likelihood,
}

impl Scale {
    const ALL: [Scale; 3] = [Scale::Agreement, Scale::Importance, Scale::Likelihood];

    fn contains(&self, value: &str) -> bool {
        match self {
            Scale::Agreement => Likert::parse(value).is_some(),
            Scale::Importance => matches!(
                value,
                "extremely important"
                    | "very important"
                    | "moderately important"
                    | "slightly important"
                    | "not at all important"
            ),
            Scale::Likelihood => matches!(
                value,
                "very likely"
                    | "somewhat likely"
                    | "neither likely nor unlikely"
                    | "somewhat unlikely"
                    | "very unlikely"
            ),
        }
    }

    /// Whether a value sits in the top of the scale.
    fn is_top(&self, value: &str) -> bool {
        match self {
            Scale::Agreement => Likert::parse(value).is_some_and(|l| l.is_agreement()),
            Scale::Importance => matches!(value, "extremely important" | "very important"),
            Scale::Likelihood => matches!(value, "very likely" | "somewhat likely"),
        }
    }
}

/// How answers in a discovered column are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// `Selected` / `Not Selected` cells.
    MultiSelect,
    Scale(Scale),
    /// Anything else: a non-blank answer endorses.
    FreeText,
}

impl ColumnKind {
    /// Classify a column from its distinct, lowercased, non-blank values.
    fn classify(values: &BTreeSet<String>) -> Self {
        if values
            .iter()
            .all(|v| v == "selected" || v == "not selected")
        {
            return ColumnKind::MultiSelect;
        }

        Scale::ALL
            .into_iter()
            .find(|scale| values.iter().all(|v| scale.contains(v)))
            .map(ColumnKind::Scale)
            .unwrap_or(ColumnKind::FreeText)
    }

    /// Read a cell. Blank cells yield `None`.
    pub fn answer(&self, raw: &str) -> Option<Answer> {
        let value = raw.trim().to_lowercase();
        if value.is_empty() {
            return None;
        }

        let endorsed = match self {
            ColumnKind::MultiSelect => value == "selected",
            ColumnKind::Scale(scale) => scale.is_top(&value),
            ColumnKind::FreeText => true,
        };
        Some(Answer::Flag(endorsed))
    }
}

/// A barrier column found by keyword.
#[derive(Debug, Clone)]
pub struct DiscoveredColumn {
    pub index: usize,
    pub kind: ColumnKind,
    pub indicator: BarrierIndicator,
}

/// Scan `labels` for keyword matches, skipping `excluded` columns and
/// columns nobody answered.
pub fn discover(
    labels: &StringRecord,
    data: &[StringRecord],
    keywords: &[String],
    excluded: &[usize],
) -> Vec<DiscoveredColumn> {
    let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

    labels
        .iter()
        .enumerate()
        .filter(|(index, _)| !excluded.contains(index))
        .filter(|(_, label)| {
            let lower = label.to_lowercase();
            keywords.iter().any(|keyword| lower.contains(keyword.as_str()))
        })
        .filter_map(|(index, label)| {
            let values: BTreeSet<String> = data
                .iter()
                .filter_map(|record| record.get(index))
                .map(|cell| cell.trim().to_lowercase())
                .filter(|cell| !cell.is_empty())
                .collect();

            if values.is_empty() {
                debug!("Skipping unanswered column {}: {}", index, label);
                return None;
            }

            let kind = ColumnKind::classify(&values);
            debug!("Discovered column {} as {:?}: {}", index, kind, label);

            let question = label.trim().to_string();
            Some(DiscoveredColumn {
                index,
                kind,
                indicator: BarrierIndicator {
                    id: format!("column_{}", index),
                    label: question.split_whitespace().collect::<Vec<_>>().join(" "),
                    question,
                    polarity: Polarity::Negative,
                },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cells: &[&str]) -> StringRecord {
        StringRecord::from(cells.to_vec())
    }

    fn keywords() -> Vec<String> {
        vec!["barrier".to_string(), "difficult".to_string()]
    }

    #[test]
    fn test_discover_matches_keywords_case_insensitively() {
        let labels = record(&["Group", "Biggest BARRIER to licensure", "Favourite course"]);
        let data = vec![
            record(&["Graduate", "Selected", "Audit"]),
            record(&["Undergraduate", "Not Selected", "Tax"]),
        ];

        let found = discover(&labels, &data, &keywords(), &[]);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].index, 1);
        assert_eq!(found[0].kind, ColumnKind::MultiSelect);
        assert_eq!(found[0].indicator.id, "column_1");
        assert_eq!(found[0].indicator.label, "Biggest BARRIER to licensure");
    }

    #[test]
    fn test_discover_skips_excluded_and_unanswered_columns() {
        let labels = record(&["barrier group", "barrier a", "barrier b"]);
        let data = vec![record(&["Graduate", "", "Agree"])];

        let found = discover(&labels, &data, &keywords(), &[0]);

        let indices: Vec<_> = found.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![2]);
    }

    #[test]
    fn test_classify_scales() {
        let set = |values: &[&str]| -> BTreeSet<String> {
            values.iter().map(|v| v.to_lowercase()).collect()
        };

        assert_eq!(
            ColumnKind::classify(&set(&["Strongly agree", "Disagree"])),
            ColumnKind::Scale(Scale::Agreement)
        );
        assert_eq!(
            ColumnKind::classify(&set(&["Very important", "Not at all important"])),
            ColumnKind::Scale(Scale::Importance)
        );
        assert_eq!(
            ColumnKind::classify(&set(&["Somewhat likely", "Very unlikely"])),
            ColumnKind::Scale(Scale::Likelihood)
        );
        assert_eq!(
            ColumnKind::classify(&set(&["Cost of exams", "Time"])),
            ColumnKind::FreeText
        );
    }

    #[test]
    fn test_answer_by_kind() {
        assert_eq!(
            ColumnKind::MultiSelect.answer("Selected"),
            Some(Answer::Flag(true))
        );
        assert_eq!(
            ColumnKind::MultiSelect.answer("Not Selected"),
            Some(Answer::Flag(false))
        );
        assert_eq!(
            ColumnKind::Scale(Scale::Importance).answer("Extremely important"),
            Some(Answer::Flag(true))
        );
        assert_eq!(
            ColumnKind::Scale(Scale::Importance).answer("Moderately important"),
            Some(Answer::Flag(false))
        );
        assert_eq!(
            ColumnKind::Scale(Scale::Likelihood).answer("Somewhat likely"),
            Some(Answer::Flag(true))
        );
        assert_eq!(
            ColumnKind::FreeText.answer("Too expensive"),
            Some(Answer::Flag(true))
        );
        assert_eq!(ColumnKind::FreeText.answer("  "), None);
    }
}
