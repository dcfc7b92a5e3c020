use std::path::Path;
use tracing::{info, warn};

use crate::analyzers::types::{CorrelationReport, CorrelationRow};
use crate::analyzers::utility::pearson;
use crate::error::{Error, Result};
use crate::record::{Category, PassengerRecord, ServiceFeature};

/// Pearson correlation of each service rating with satisfaction (1 = satisfied).
///
/// Rows are ranked by absolute coefficient, strongest first; equal
/// magnitudes keep `features` order. Features with an undefined coefficient
/// are logged and listed in [`CorrelationReport::undefined`].
pub fn correlate_services(
    source: &Path,
    records: &[PassengerRecord],
    features: &[ServiceFeature],
) -> Result<CorrelationReport> {
    if records.is_empty() {
        return Err(Error::EmptyDataset {
            path: source.to_path_buf(),
        });
    }

    let target: Vec<f64> = records.iter().map(|r| r.satisfaction.as_indicator()).collect();

    let mut scored = Vec::new();
    let mut undefined = Vec::new();
    for &feature in features {
        let ratings: Vec<f64> = records.iter().map(|r| feature.rating(r) as f64).collect();
        match pearson(&ratings, &target) {
            Some(r) => scored.push((feature, r)),
            None => {
                warn!(feature = feature.label(), "Correlation undefined (no variance); skipped");
                undefined.push(feature.label().to_string());
            }
        }
    }

    // stable, so ties keep declaration order
    scored.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));

    let rows: Vec<CorrelationRow> = scored
        .into_iter()
        .enumerate()
        .map(|(i, (feature, r))| CorrelationRow {
            rank: i + 1,
            feature: feature.label().to_string(),
            coefficient: r,
            percent: r * 100.0,
        })
        .collect();

    let report = CorrelationReport {
        total: records.len(),
        rows,
        undefined,
    };

    if let (Some(most), Some(least)) = (report.most_correlated(), report.least_correlated()) {
        info!(
            most = %most.feature,
            most_pct = %format!("{:.1}", most.percent),
            least = %least.feature,
            least_pct = %format!("{:.1}", least.percent),
            "Service correlation ranked"
        );
    }
    Ok(report)
}

/// Resolves feature names given on the command line, case-insensitively.
/// An empty list selects every feature; repeats keep their first position.
pub fn select_features(names: &[String]) -> std::result::Result<Vec<ServiceFeature>, String> {
    if names.is_empty() {
        return Ok(ServiceFeature::ALL.to_vec());
    }
    let mut picked = Vec::new();
    for n in names {
        let feature = ServiceFeature::parse_label(n).ok_or_else(|| {
            let known: Vec<_> = ServiceFeature::ALL.iter().map(|f| f.label()).collect();
            format!("unknown service feature '{}'; expected one of: {}", n, known.join(", "))
        })?;
        if !picked.contains(&feature) {
            picked.push(feature);
        }
    }
    Ok(picked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::record;
    use crate::record::{Gender, Satisfaction};

    fn sample() -> Vec<PassengerRecord> {
        (0..10u64)
            .map(|i| {
                let satisfied = i % 2 == 0;
                let s = if satisfied {
                    Satisfaction::Satisfied
                } else {
                    Satisfaction::NeutralOrDissatisfied
                };
                let mut r = record(i, 30, Gender::Male, 100, s);
                // tracks satisfaction exactly
                r.cleanliness = if satisfied { 5 } else { 1 };
                // weakly related
                r.seat_comfort = [3, 2, 4, 4, 2, 1, 5, 3, 3, 2][i as usize];
                // inverse
                r.inflight_wifi = if satisfied { 0 } else { 4 };
                r
            })
            .collect()
    }

    #[test]
    fn test_perfect_correlation_ranks_first() {
        let features = [
            ServiceFeature::SeatComfort,
            ServiceFeature::Cleanliness,
            ServiceFeature::InflightWifi,
        ];
        let report = correlate_services(Path::new("p.csv"), &sample(), &features).unwrap();

        assert_eq!(report.rows[0].feature, "Cleanliness");
        assert!((report.rows[0].coefficient - 1.0).abs() < 1e-12);
        assert_eq!(report.rows[0].rank, 1);
        // |-1.0| ties with Cleanliness and keeps its later position
        assert_eq!(report.rows[1].feature, "Inflight wifi service");
        assert!((report.rows[1].coefficient + 1.0).abs() < 1e-12);
        assert_eq!(report.least_correlated().unwrap().feature, "Seat comfort");
    }

    #[test]
    fn test_constant_rating_is_undefined() {
        let features = [ServiceFeature::Checkin, ServiceFeature::Cleanliness];
        let report = correlate_services(Path::new("p.csv"), &sample(), &features).unwrap();

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.undefined, vec!["Checkin service".to_string()]);
    }

    #[test]
    fn test_uncorrelated_ratings_have_no_magnitude() {
        let records: Vec<PassengerRecord> = (0..4u64)
            .map(|i| {
                let s = if i % 2 == 0 {
                    Satisfaction::Satisfied
                } else {
                    Satisfaction::NeutralOrDissatisfied
                };
                let mut r = record(i, 30, Gender::Male, 100, s);
                r.cleanliness = if i < 2 { 1 } else { 2 };
                r
            })
            .collect();
        let report =
            correlate_services(Path::new("p.csv"), &records, &[ServiceFeature::Cleanliness]).unwrap();

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].coefficient, 0.0);
        assert_eq!(report.total_magnitude(), 0.0);
        assert!(correlate_services(Path::new("p.csv"), &sample(), ServiceFeature::ALL)
            .unwrap()
            .total_magnitude()
            > 0.0);
    }

    #[test]
    fn test_select_features() {
        assert_eq!(select_features(&[]).unwrap().len(), 14);
        let picked = select_features(&["cleanliness".into(), "Seat comfort".into()]).unwrap();
        assert_eq!(picked, vec![ServiceFeature::Cleanliness, ServiceFeature::SeatComfort]);
        assert!(select_features(&["legroom".into()]).is_err());
    }

    #[test]
    fn test_select_features_drops_repeats() {
        let names = ["Cleanliness", "Seat comfort", "cleanliness"].map(String::from);
        let picked = select_features(&names).unwrap();
        assert_eq!(picked, vec![ServiceFeature::Cleanliness, ServiceFeature::SeatComfort]);

        let report = correlate_services(Path::new("p.csv"), &sample(), &picked).unwrap();
        assert_eq!(report.rows.len() + report.undefined.len(), 2);
    }
}
