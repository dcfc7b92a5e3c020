use std::path::Path;
use tracing::{debug, warn};

use crate::analyzers::grouping::{GroupValue, Grouping};
use crate::analyzers::types::{DistributionRow, GroupRow, GroupedSummary};
use crate::analyzers::utility::{mean, pct, quantile, round2, sample_stddev};
use crate::error::{Error, Result};
use crate::record::{Category, PassengerRecord, Satisfaction};

#[derive(Default)]
struct Tally {
    count: usize,
    satisfied: usize,
    sum: f64,
}

/// Groups `records` by `grouping` and computes the satisfaction rate per group.
///
/// Every record must land in exactly one bucket; one that lands in none is a
/// domain error. Buckets nobody landed in are logged and listed in
/// [`GroupedSummary::empty_groups`] instead of producing a row.
pub fn aggregate_groups(
    source: &Path,
    records: &[PassengerRecord],
    grouping: &Grouping,
) -> Result<GroupedSummary> {
    if records.is_empty() {
        return Err(Error::EmptyDataset {
            path: source.to_path_buf(),
        });
    }

    let labels = grouping.bucketing.labels();
    let mut tallies: Vec<Tally> = labels.iter().map(|_| Tally::default()).collect();
    let mut numeric = false;

    for r in records {
        let value = (grouping.extract)(r);
        let idx = grouping
            .bucketing
            .index_of(value)
            .ok_or_else(|| Error::OutOfDomain {
                path: source.to_path_buf(),
                id: r.id,
                column: grouping.column,
                value: match value {
                    GroupValue::Numeric(v) => v.to_string(),
                    GroupValue::Category(c) => c.to_string(),
                },
                expected: "a defined group",
            })?;

        let t = &mut tallies[idx];
        t.count += 1;
        if r.satisfaction.is_satisfied() {
            t.satisfied += 1;
        }
        if let GroupValue::Numeric(v) = value {
            numeric = true;
            t.sum += v;
        }
    }

    let total = records.len();
    let satisfied: usize = tallies.iter().map(|t| t.satisfied).sum();

    let mut rows = Vec::new();
    let mut empty_groups = Vec::new();
    for (label, t) in labels.into_iter().zip(tallies) {
        if t.count == 0 {
            warn!(dimension = grouping.name, group = %label, "Group has no records; omitted from table");
            empty_groups.push(label);
            continue;
        }
        let percent_satisfied = pct(t.satisfied, t.count);
        rows.push(GroupRow {
            group: label,
            count: t.count,
            satisfied: t.satisfied,
            percent_satisfied,
            percent_unsatisfied: 100.0 - percent_satisfied,
            contribution_pct: pct(t.satisfied, total),
            mean_value: numeric.then(|| t.sum / t.count as f64),
        });
    }

    debug!(
        dimension = grouping.name,
        groups = rows.len(),
        empty = empty_groups.len(),
        "Groups aggregated"
    );

    Ok(GroupedSummary {
        dimension: grouping.name,
        column: grouping.column,
        total,
        satisfied,
        overall_pct: pct(satisfied, total),
        rows,
        empty_groups,
    })
}

/// Count, mean, median, sample std and quartiles of a numeric field, one row
/// per satisfaction label. Labels without records are logged and skipped.
pub fn describe_by_satisfaction(
    records: &[PassengerRecord],
    field: &str,
    extract: fn(&PassengerRecord) -> f64,
) -> Vec<DistributionRow> {
    let mut rows = Vec::new();

    for &label in [Satisfaction::NeutralOrDissatisfied, Satisfaction::Satisfied].iter() {
        let mut values: Vec<f64> = records
            .iter()
            .filter(|r| r.satisfaction == label)
            .map(extract)
            .collect();

        if values.is_empty() {
            warn!(field, satisfaction = label.label(), "No records for label; omitted from table");
            continue;
        }
        values.sort_by(f64::total_cmp);

        let m = mean(&values);
        rows.push(DistributionRow {
            satisfaction: label.display_name().to_string(),
            count: values.len(),
            mean: round2(m),
            median: round2(quantile(&values, 0.5)),
            std: round2(sample_stddev(&values, m)),
            min: round2(values[0]),
            q1: round2(quantile(&values, 0.25)),
            q3: round2(quantile(&values, 0.75)),
            max: round2(values[values.len() - 1]),
        });
    }

    rows
}
