//! Survey export loading.
//!
//! Reads respondent records from a CSV export, locating the group and
//! barrier columns by their question text, and validates every record
//! before it reaches the aggregator.

pub mod discovery;

use crate::config::SurveyConfig;
use crate::error::{ReportError, Result};
use crate::models::{check_indicators, Answer, BarrierIndicator, Group, Respondent, Survey};
use csv::StringRecord;
use discovery::ColumnKind;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Where a barrier's answers live and how to read them.
#[derive(Debug, Clone, PartialEq)]
struct BarrierColumn {
    index: usize,
    /// `None` for configured barriers, which are parsed strictly.
    discovered: Option<ColumnKind>,
}

/// Column positions resolved from the header rows.
#[derive(Debug, Clone, PartialEq)]
struct ColumnMap {
    group: usize,
    id: Option<usize>,
    /// One entry per indicator, in definition order.
    barriers: Vec<BarrierColumn>,
}

/// Load a survey export on disk.
pub fn load_from_path(
    path: &Path,
    survey: &SurveyConfig,
    indicators: &[BarrierIndicator],
) -> Result<Survey> {
    info!("Loading survey export: {}", path.display());
    let file = File::open(path)?;
    load_survey(file, survey, indicators)
}

/// Load and validate respondents from CSV text.
///
/// With `discover_barriers` set, keyword-matched columns are appended to
/// the configured indicators.
pub fn load_survey<R: Read>(
    reader: R,
    survey: &SurveyConfig,
    configured: &[BarrierIndicator],
) -> Result<Survey> {
    check_indicators(configured).or_else(|err| match err {
        ReportError::NoIndicators if survey.discover_barriers => Ok(()),
        other => Err(other),
    })?;

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let records = csv_reader
        .records()
        .collect::<std::result::Result<Vec<StringRecord>, csv::Error>>()?;

    let header_rows = survey.layout.header_rows();
    if records.len() < header_rows {
        return Err(ReportError::InsufficientRows {
            expected: header_rows,
            found: records.len(),
        });
    }

    let (columns, indicators) = resolve_columns(&records, header_rows, survey, configured)?;
    check_indicators(&indicators)?;
    debug!("Resolved columns: {:?}", columns);

    let mut respondents = Vec::new();
    let mut skipped = 0usize;

    for (index, record) in records.iter().enumerate().skip(header_rows) {
        let row = index + 1;
        match parse_record(record, row, &columns, &indicators, survey.skip_incomplete)? {
            Some(respondent) => {
                debug!("Row {}: {} ({})", row, respondent.id, respondent.group);
                respondents.push(respondent);
            }
            None => {
                warn!("Skipping row {}: missing group label", row);
                skipped += 1;
            }
        }
    }

    info!(
        "Loaded {} respondents ({} skipped) for {} barrier(s)",
        respondents.len(),
        skipped,
        indicators.len()
    );

    Ok(Survey {
        indicators,
        respondents,
    })
}

fn resolve_columns(
    records: &[StringRecord],
    header_rows: usize,
    survey: &SurveyConfig,
    configured: &[BarrierIndicator],
) -> Result<(ColumnMap, Vec<BarrierIndicator>)> {
    let labels = &records[survey.layout.label_row()];

    let group = find_column(labels, &survey.group_question).ok_or_else(|| {
        ReportError::MissingColumn {
            column: survey.group_question.clone(),
        }
    })?;

    let id = find_column(&records[0], &survey.id_column);
    if id.is_none() {
        debug!(
            "No '{}' column; using row numbers as respondent ids",
            survey.id_column
        );
    }

    let mut barriers = configured
        .iter()
        .map(|indicator| {
            find_column(labels, &indicator.question)
                .map(|index| BarrierColumn {
                    index,
                    discovered: None,
                })
                .ok_or_else(|| ReportError::MissingColumn {
                    column: indicator.question.clone(),
                })
        })
        .collect::<Result<Vec<_>>>()?;
    let mut indicators = configured.to_vec();

    if survey.discover_barriers {
        let mut excluded: Vec<usize> = barriers.iter().map(|b| b.index).collect();
        excluded.push(group);
        excluded.extend(id);

        let found = discovery::discover(
            labels,
            &records[header_rows..],
            &survey.barrier_keywords,
            &excluded,
        );
        info!("Discovered {} barrier column(s) by keyword", found.len());

        for column in found {
            barriers.push(BarrierColumn {
                index: column.index,
                discovered: Some(column.kind),
            });
            indicators.push(column.indicator);
        }
    }

    Ok((
        ColumnMap {
            group,
            id,
            barriers,
        },
        indicators,
    ))
}

fn find_column(labels: &StringRecord, wanted: &str) -> Option<usize> {
    let wanted = wanted.trim();
    labels.iter().position(|label| label.trim() == wanted)
}

/// Parse one data row. Returns `Ok(None)` when the row is skipped.
fn parse_record(
    record: &StringRecord,
    row: usize,
    columns: &ColumnMap,
    indicators: &[BarrierIndicator],
    skip_incomplete: bool,
) -> Result<Option<Respondent>> {
    let cell = |index: usize| record.get(index).unwrap_or("").trim();

    let raw_group = cell(columns.group);
    if raw_group.is_empty() {
        if skip_incomplete {
            return Ok(None);
        }
        return Err(ReportError::malformed(row, "missing group label"));
    }
    let group = Group::parse(raw_group).ok_or_else(|| {
        ReportError::malformed(row, format!("unrecognised group label '{}'", raw_group))
    })?;

    let mut answers = HashMap::with_capacity(indicators.len());
    for (indicator, column) in indicators.iter().zip(&columns.barriers) {
        let raw_answer = cell(column.index);

        let answer = match column.discovered {
            Some(kind) => kind.answer(raw_answer),
            None if raw_answer.is_empty() => {
                if !skip_incomplete {
                    return Err(ReportError::malformed(
                        row,
                        format!("missing answer for barrier '{}'", indicator.label),
                    ));
                }
                // Blank answers keep the respondent in the group total
                debug!("Row {}: no answer for barrier '{}'", row, indicator.label);
                None
            }
            None => Some(Answer::parse(raw_answer).ok_or_else(|| {
                ReportError::malformed(
                    row,
                    format!(
                        "unparseable answer '{}' for barrier '{}'",
                        raw_answer, indicator.label
                    ),
                )
            })?),
        };

        if let Some(answer) = answer {
            answers.insert(indicator.id.clone(), answer);
        }
    }

    let id = columns
        .id
        .map(cell)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| row.to_string());

    Ok(Some(Respondent { id, group, answers }))
}
