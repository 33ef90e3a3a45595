//! Data models for the barrier report.
//!
//! This module contains the core data structures used throughout
//! the pipeline: respondents and their answers, barrier definitions,
//! and the derived per-group statistics.

use crate::error::{ReportError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// Respondent classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Group {
    Undergraduate,
    Graduate,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::Undergraduate => write!(f, "Undergraduate"),
            Group::Graduate => write!(f, "Graduate"),
        }
    }
}

impl Group {
    /// Groups in report order.
    pub fn ordered() -> [Group; 2] {
        [Group::Undergraduate, Group::Graduate]
    }

    /// Parse a raw group label, ignoring case and a trailing "student".
    pub fn parse(raw: &str) -> Option<Self> {
        let lower = raw.trim().to_lowercase();
        let label = lower
            .strip_suffix("students")
            .or_else(|| lower.strip_suffix("student"))
            .unwrap_or(&lower)
            .trim();

        match label {
            "undergraduate" | "undergrad" => Some(Group::Undergraduate),
            "graduate" | "grad" => Some(Group::Graduate),
            _ => None,
        }
    }
}

/// A response on an agree/disagree scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Likert {
    StronglyAgree,
    Agree,
    SomewhatAgree,
    Neutral,
    SomewhatDisagree,
    Disagree,
    StronglyDisagree,
}

impl Likert {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "strongly agree" => Some(Likert::StronglyAgree),
            "agree" => Some(Likert::Agree),
            "somewhat agree" => Some(Likert::SomewhatAgree),
            "neither agree nor disagree" | "neutral" => Some(Likert::Neutral),
            "somewhat disagree" => Some(Likert::SomewhatDisagree),
            "disagree" => Some(Likert::Disagree),
            "strongly disagree" => Some(Likert::StronglyDisagree),
            _ => None,
        }
    }

    pub fn is_agreement(&self) -> bool {
        matches!(
            self,
            Likert::StronglyAgree | Likert::Agree | Likert::SomewhatAgree
        )
    }

    pub fn is_disagreement(&self) -> bool {
        matches!(
            self,
            Likert::StronglyDisagree | Likert::Disagree | Likert::SomewhatDisagree
        )
    }
}

/// A parsed answer to a barrier item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Likert(Likert),
    /// Multi-select or yes/no style answer.
    Flag(bool),
}

impl Answer {
    /// Parse a raw cell. Returns `None` for empty or unrecognised text.
    pub fn parse(raw: &str) -> Option<Self> {
        if let Some(likert) = Likert::parse(raw) {
            return Some(Answer::Likert(likert));
        }

        match raw.trim().to_lowercase().as_str() {
            "selected" | "yes" | "true" => Some(Answer::Flag(true)),
            "not selected" | "no" | "false" => Some(Answer::Flag(false)),
            _ => None,
        }
    }
}

/// How a barrier statement is phrased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// Phrased as an obstacle: agreement endorses the barrier.
    #[default]
    Negative,
    /// Phrased favourably: disagreement endorses the barrier.
    Positive,
}

/// A survey statement representing a perceived obstacle to licensure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarrierIndicator {
    /// Stable identifier used to key answers.
    pub id: String,
    /// Short label shown in the report.
    pub label: String,
    /// Column to read: full question text or header name, depending on layout.
    pub question: String,
    #[serde(default)]
    pub polarity: Polarity,
}

impl BarrierIndicator {
    /// Whether an answer counts as perceiving this barrier.
    pub fn endorsed_by(&self, answer: &Answer) -> bool {
        match (answer, self.polarity) {
            (Answer::Flag(selected), _) => *selected,
            (Answer::Likert(likert), Polarity::Negative) => likert.is_agreement(),
            (Answer::Likert(likert), Polarity::Positive) => likert.is_disagreement(),
        }
    }
}

/// Reject an empty indicator list or two indicators sharing an id.
pub fn check_indicators(indicators: &[BarrierIndicator]) -> Result<()> {
    if indicators.is_empty() {
        return Err(ReportError::NoIndicators);
    }

    let mut seen = HashSet::with_capacity(indicators.len());
    for indicator in indicators {
        if !seen.insert(indicator.id.as_str()) {
            return Err(ReportError::DuplicateBarrier {
                id: indicator.id.clone(),
            });
        }
    }

    Ok(())
}

/// A single loaded survey response.
#[derive(Debug, Clone)]
pub struct Respondent {
    pub id: String,
    pub group: Group,
    /// Answers keyed by barrier id.
    pub answers: HashMap<String, Answer>,
}

impl Respondent {
    pub fn endorses(&self, indicator: &BarrierIndicator) -> bool {
        self.answers
            .get(&indicator.id)
            .is_some_and(|answer| indicator.endorsed_by(answer))
    }
}

/// Everything the loader produces: the barriers to report on (configured
/// plus discovered) and the respondents answering them.
#[derive(Debug, Clone)]
pub struct Survey {
    pub indicators: Vec<BarrierIndicator>,
    pub respondents: Vec<Respondent>,
}

/// Round to one decimal place, ties to even (6.25 becomes 6.2).
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// `numerator / denominator` as a percentage rounded to one decimal.
///
/// Returns `None` when the denominator is zero.
pub fn percentage(numerator: usize, denominator: usize) -> Option<f64> {
    if denominator == 0 {
        return None;
    }
    Some(round_one_decimal(
        numerator as f64 / denominator as f64 * 100.0,
    ))
}

/// Endorsement of one barrier within one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStat {
    pub barrier_id: String,
    pub barrier_label: String,
    pub group: Group,
    /// Respondents in the group endorsing the barrier.
    pub numerator: usize,
    /// Group size.
    pub denominator: usize,
    pub percentage: f64,
}

impl GroupStat {
    /// Formatted `n / N` cell.
    pub fn ratio(&self) -> String {
        format!("{} / {}", self.numerator, self.denominator)
    }
}

/// Which group reported a barrier more often, and by how much.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupComparison {
    pub barrier_id: String,
    pub barrier_label: String,
    pub higher: Group,
    pub higher_percentage: f64,
    pub lower: Group,
    pub lower_percentage: f64,
    /// Absolute percentage-point gap, one decimal.
    pub gap: f64,
}

impl GroupComparison {
    pub fn is_tie(&self) -> bool {
        self.gap == 0.0
    }
}

/// Endorsement of one barrier across every respondent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarrierTotal {
    pub barrier_id: String,
    pub barrier_label: String,
    pub count: usize,
    pub respondents: usize,
    pub percentage: f64,
}

/// Metadata about the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Path of the survey export.
    pub source: String,
    /// Question or column used to classify respondents.
    pub grouping_question: String,
    pub generated_at: DateTime<Utc>,
    pub total_respondents: usize,
    pub group_sizes: BTreeMap<Group, usize>,
}

/// The complete barrier report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub stats: Vec<GroupStat>,
    pub comparisons: Vec<GroupComparison>,
    pub ranking: Vec<BarrierTotal>,
    /// Reference to the externally rendered chart image.
    pub chart_path: String,
}
