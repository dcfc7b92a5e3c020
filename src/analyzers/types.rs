//! Data types produced by the aggregation pipeline.

use serde::Serialize;

use crate::output::TableRow;

/// Satisfaction figures for one non-empty group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
    pub group: String,
    pub count: usize,
    pub satisfied: usize,
    pub percent_satisfied: f64,
    pub percent_unsatisfied: f64,
    /// Satisfied members of this group as a percentage of the whole population.
    pub contribution_pct: f64,
    /// Mean of the grouping field, for numeric groupings.
    pub mean_value: Option<f64>,
}

impl TableRow for GroupRow {
    const HEADER: &'static [&'static str] = &[
        "group",
        "count",
        "satisfied",
        "percent_satisfied",
        "percent_unsatisfied",
        "contribution_pct",
        "mean_value",
    ];
}

/// Satisfaction rate per group over a complete partition of the records.
#[derive(Debug, Clone, Serialize)]
pub struct GroupedSummary {
    pub dimension: &'static str,
    pub column: &'static str,
    pub total: usize,
    pub satisfied: usize,
    pub overall_pct: f64,
    pub rows: Vec<GroupRow>,
    /// Groups that matched no record; never emitted as rows.
    pub empty_groups: Vec<String>,
}

impl GroupedSummary {
    pub fn row(&self, group: &str) -> Option<&GroupRow> {
        self.rows.iter().find(|r| r.group == group)
    }
}

/// Summary statistics of a numeric field for one satisfaction label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionRow {
    pub satisfaction: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub q3: f64,
    pub max: f64,
}

impl TableRow for DistributionRow {
    const HEADER: &'static [&'static str] = &[
        "satisfaction",
        "count",
        "mean",
        "median",
        "std",
        "min",
        "q1",
        "q3",
        "max",
    ];
}

/// Correlation of one service rating with satisfaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationRow {
    pub rank: usize,
    pub feature: String,
    pub coefficient: f64,
    pub percent: f64,
}

impl TableRow for CorrelationRow {
    const HEADER: &'static [&'static str] = &["rank", "feature", "coefficient", "percent"];
}

/// Service features ranked by absolute correlation with satisfaction.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationReport {
    pub total: usize,
    pub rows: Vec<CorrelationRow>,
    /// Features whose coefficient is undefined (no variance).
    pub undefined: Vec<String>,
}

impl CorrelationReport {
    pub fn most_correlated(&self) -> Option<&CorrelationRow> {
        self.rows.first()
    }

    pub fn least_correlated(&self) -> Option<&CorrelationRow> {
        self.rows.last()
    }

    /// Sum of absolute coefficients; the correlation pie needs it above zero.
    pub fn total_magnitude(&self) -> f64 {
        self.rows.iter().map(|r| r.coefficient.abs()).sum()
    }
}
