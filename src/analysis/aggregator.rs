//! Barrier aggregation and statistics.
//!
//! This module groups respondents by group label and computes
//! endorsement counts, percentages and group comparisons.

use crate::error::{ReportError, Result};
use crate::models::{
    check_indicators, percentage, round_one_decimal, BarrierIndicator, BarrierTotal, Group,
    GroupComparison, GroupStat, Respondent,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Count respondents per group. Groups with no respondents are present with zero.
pub fn group_sizes(respondents: &[Respondent]) -> BTreeMap<Group, usize> {
    let mut sizes: BTreeMap<Group, usize> = Group::ordered().into_iter().map(|g| (g, 0)).collect();

    for respondent in respondents {
        *sizes.entry(respondent.group).or_default() += 1;
    }

    sizes
}

/// Compute one [`GroupStat`] per (barrier, group) pair.
///
/// Output is ordered by barrier definition order, then group order.
/// Fails with [`ReportError::EmptyGroup`] when a group has no respondents,
/// and with [`ReportError::DuplicateBarrier`] when two indicators share an id.
pub fn aggregate(
    respondents: &[Respondent],
    indicators: &[BarrierIndicator],
) -> Result<Vec<GroupStat>> {
    check_indicators(indicators)?;

    let sizes = group_sizes(respondents);
    let mut stats = Vec::with_capacity(indicators.len() * sizes.len());

    for indicator in indicators {
        for group in Group::ordered() {
            let denominator = sizes.get(&group).copied().unwrap_or(0);
            let numerator = respondents
                .iter()
                .filter(|r| r.group == group && r.endorses(indicator))
                .count();

            let percentage =
                percentage(numerator, denominator).ok_or_else(|| ReportError::EmptyGroup {
                    barrier: indicator.label.clone(),
                    group: group.to_string(),
                })?;

            debug!(
                "{} / {}: {}/{} = {:.1}%",
                indicator.id, group, numerator, denominator, percentage
            );

            stats.push(GroupStat {
                barrier_id: indicator.id.clone(),
                barrier_label: indicator.label.clone(),
                group,
                numerator,
                denominator,
                percentage,
            });
        }
    }

    Ok(stats)
}

/// Compare groups for each barrier.
///
/// Barriers with fewer than two groups in `stats` are skipped. Equal
/// percentages yield a zero gap with groups in report order.
pub fn compare(stats: &[GroupStat]) -> Vec<GroupComparison> {
    let mut comparisons = Vec::new();

    for barrier_stats in stats.chunk_by(|a, b| a.barrier_id == b.barrier_id) {
        let Some(lowest) = barrier_stats
            .iter()
            .min_by(|a, b| a.percentage.total_cmp(&b.percentage))
        else {
            continue;
        };
        // max_by returns the last maximum, so ties resolve to the earlier group via rev()
        let Some(highest) = barrier_stats
            .iter()
            .rev()
            .max_by(|a, b| a.percentage.total_cmp(&b.percentage))
        else {
            continue;
        };

        let (higher, lower) = if highest.group == lowest.group {
            match barrier_stats {
                [first, second, ..] => (first, second),
                _ => continue,
            }
        } else {
            (highest, lowest)
        };

        comparisons.push(GroupComparison {
            barrier_id: higher.barrier_id.clone(),
            barrier_label: higher.barrier_label.clone(),
            higher: higher.group,
            higher_percentage: higher.percentage,
            lower: lower.group,
            lower_percentage: lower.percentage,
            gap: round_one_decimal((higher.percentage - lower.percentage).abs()),
        });
    }

    comparisons
}

/// Rank barriers by endorsement across all respondents, highest count first.
pub fn overall_ranking(
    respondents: &[Respondent],
    indicators: &[BarrierIndicator],
) -> Vec<BarrierTotal> {
    let total = respondents.len();

    let mut ranking: Vec<BarrierTotal> = indicators
        .iter()
        .map(|indicator| {
            let count = respondents.iter().filter(|r| r.endorses(indicator)).count();
            BarrierTotal {
                barrier_id: indicator.id.clone(),
                barrier_label: indicator.label.clone(),
                count,
                respondents: total,
                percentage: percentage(count, total).unwrap_or(0.0),
            }
        })
        .collect();

    // Stable sort keeps definition order for equal counts
    ranking.sort_by_key(|entry| std::cmp::Reverse(entry.count));
    ranking
}
