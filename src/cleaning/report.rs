use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

/// Why a raw row was discarded.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum DropReason {
    Missing(&'static str),
    Invalid(&'static str),
    DuplicateId,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::Missing(column) => write!(f, "missing {}", column),
            DropReason::Invalid(column) => write!(f, "invalid {}", column),
            DropReason::DuplicateId => f.write_str("duplicate id"),
        }
    }
}

/// Outcome of one cleaning pass.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CleaningReport {
    pub source: PathBuf,
    pub output: Option<PathBuf>,
    pub rows_read: usize,
    pub rows_written: usize,
    /// Dropped row count per reason, e.g. `"missing Age" -> 1`.
    pub dropped: BTreeMap<String, usize>,
    /// Imputed cell count per column.
    pub imputed: BTreeMap<String, usize>,
    /// Fill value per imputable column.
    pub imputed_values: BTreeMap<String, String>,
    pub ignored_columns: Vec<String>,
}

impl CleaningReport {
    pub fn record_drop(&mut self, reason: &DropReason) {
        *self.dropped.entry(reason.to_string()).or_default() += 1;
    }

    pub fn record_imputed(&mut self, column: &str) {
        *self.imputed.entry(column.to_string()).or_default() += 1;
    }

    pub fn rows_dropped(&self) -> usize {
        self.dropped.values().sum()
    }

    pub fn drop_fraction(&self) -> f64 {
        if self.rows_read == 0 {
            0.0
        } else {
            self.rows_dropped() as f64 / self.rows_read as f64
        }
    }

    /// True when more than `max` of the rows read were dropped.
    pub fn exceeds_drop_threshold(&self, max: f64) -> bool {
        self.drop_fraction() > max
    }

    /// Logs the counts; warns when more than `max_drop_fraction` of rows went.
    pub fn log(&self, max_drop_fraction: f64) {
        info!(
            rows_read = self.rows_read,
            rows_written = self.rows_written,
            rows_dropped = self.rows_dropped(),
            imputed_cells = self.imputed.values().sum::<usize>(),
            "Cleaning finished"
        );

        for (reason, count) in &self.dropped {
            info!(reason = %reason, count, "Rows dropped");
        }
        for (column, count) in &self.imputed {
            info!(
                column = %column,
                count,
                value = self.imputed_values.get(column).map(String::as_str).unwrap_or(""),
                "Cells imputed"
            );
        }

        if self.exceeds_drop_threshold(max_drop_fraction) {
            warn!(
                rows_dropped = self.rows_dropped(),
                rows_read = self.rows_read,
                fraction = %format!("{:.3}", self.drop_fraction()),
                threshold = max_drop_fraction,
                "Dropped row fraction exceeds threshold"
            );
        }
        if self.rows_written == 0 {
            warn!(source = %self.source.display(), "No rows survived cleaning");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_counts_and_fraction() {
        let mut report = CleaningReport {
            rows_read: 4,
            ..Default::default()
        };
        report.record_drop(&DropReason::Missing("Age"));
        report.record_drop(&DropReason::Missing("Age"));
        report.record_drop(&DropReason::DuplicateId);

        assert_eq!(report.rows_dropped(), 3);
        assert_eq!(report.dropped["missing Age"], 2);
        assert_eq!(report.dropped["duplicate id"], 1);
        assert_eq!(report.drop_fraction(), 0.75);
    }

    #[test]
    fn test_drop_fraction_empty_input() {
        assert_eq!(CleaningReport::default().drop_fraction(), 0.0);
    }

    #[test]
    fn test_drop_threshold() {
        let mut report = CleaningReport {
            rows_read: 20,
            ..Default::default()
        };
        report.record_drop(&DropReason::Missing("Age"));
        assert!(!report.exceeds_drop_threshold(0.05));

        report.record_drop(&DropReason::DuplicateId);
        assert!(report.exceeds_drop_threshold(0.05));
        assert!(!report.exceeds_drop_threshold(0.5));

        assert!(!CleaningReport::default().exceeds_drop_threshold(0.0));
    }
}
