use chrono::Local;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::analyzers::aggregate::{aggregate_groups, describe_by_satisfaction};
use crate::analyzers::correlation::correlate_services;
use crate::analyzers::grouping::Grouping;
use crate::analyzers::types::{CorrelationReport, DistributionRow, GroupedSummary};
use crate::charts;
use crate::config::PathConfig;
use crate::dataset::load_processed;
use crate::error::{Error, Result};
use crate::output::{OutputNaming, OutputOptions, TableRow, open_in_viewer, print_json, write_table};
use crate::record::{Category, FLIGHT_DISTANCE, PassengerRecord, Satisfaction, ServiceFeature};

/// The summary an analysis computed and the files it wrote.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome<T> {
    pub summary: T,
    pub tables: Vec<PathBuf>,
    pub charts: Vec<PathBuf>,
}

/// Band table plus the per-label distribution of flight distance.
#[derive(Debug, Clone, Serialize)]
pub struct DistanceSummary {
    pub bands: GroupedSummary,
    pub distribution: Vec<DistributionRow>,
}

/// Satisfaction by age band.
#[tracing::instrument(skip_all, fields(analysis = "age"))]
pub fn run_age(paths: &PathConfig, options: &OutputOptions) -> Result<Outcome<GroupedSummary>> {
    let grouping = Grouping::age();
    let records = load_processed(&paths.processed_path, &[grouping.column])?;
    let summary = aggregate_groups(&paths.processed_path, &records, &grouping)?;
    log_groups(&summary);

    let mut out = Publisher::new(paths, options);
    out.table("age_satisfaction_percent.csv", &summary.rows)?;
    out.chart("age_satisfaction.png", |p| {
        charts::render_grouped_bars(p, &summary, "Satisfaction by age band")
    })?;
    out.finish(summary)
}

/// Satisfaction by gender.
#[tracing::instrument(skip_all, fields(analysis = "gender"))]
pub fn run_gender(paths: &PathConfig, options: &OutputOptions) -> Result<Outcome<GroupedSummary>> {
    let grouping = Grouping::gender();
    let records = load_processed(&paths.processed_path, &[grouping.column])?;
    let summary = aggregate_groups(&paths.processed_path, &records, &grouping)?;
    log_groups(&summary);

    let mut out = Publisher::new(paths, options);
    out.table("gender_satisfaction_percent.csv", &summary.rows)?;
    out.chart("gender_satisfaction_stacked.png", |p| {
        charts::render_stacked_bars(p, &summary, "Satisfaction by gender")
    })?;
    out.chart("gender_satisfaction_pies.png", |p| {
        charts::render_group_pies(p, &summary, "Satisfaction split per gender")
    })?;
    out.finish(summary)
}

/// Satisfaction by flight distance band, plus the distance distribution per
/// satisfaction label.
#[tracing::instrument(skip_all, fields(analysis = "distance"))]
pub fn run_distance(paths: &PathConfig, options: &OutputOptions) -> Result<Outcome<DistanceSummary>> {
    let grouping = Grouping::distance();
    let records = load_processed(&paths.processed_path, &[grouping.column])?;
    let bands = aggregate_groups(&paths.processed_path, &records, &grouping)?;
    log_groups(&bands);

    let distance = |r: &PassengerRecord| r.flight_distance as f64;
    let distribution = describe_by_satisfaction(&records, FLIGHT_DISTANCE, distance);
    for row in &distribution {
        info!(
            satisfaction = %row.satisfaction,
            count = row.count,
            mean = row.mean,
            median = row.median,
            std = row.std,
            "Flight distance distribution"
        );
    }

    let mut out = Publisher::new(paths, options);
    out.table("flight_distance_satisfaction_percent.csv", &bands.rows)?;
    out.table("flight_distance_satisfaction_stats.csv", &distribution)?;
    out.chart("flight_distance_satisfaction.png", |p| {
        let samples: Vec<(&str, Vec<f64>)> = [Satisfaction::NeutralOrDissatisfied, Satisfaction::Satisfied]
            .into_iter()
            .map(|label| {
                let values = records
                    .iter()
                    .filter(|r| r.satisfaction == label)
                    .map(distance)
                    .collect();
                (label.display_name(), values)
            })
            .collect();
        charts::render_distance_panels(p, &bands, &distribution, &samples)
    })?;
    out.finish(DistanceSummary {
        bands,
        distribution,
    })
}

/// Correlation of each selected service rating with satisfaction.
#[tracing::instrument(skip_all, fields(analysis = "service", features = features.len()))]
pub fn run_service(
    paths: &PathConfig,
    options: &OutputOptions,
    features: &[ServiceFeature],
) -> Result<Outcome<CorrelationReport>> {
    let columns: Vec<&str> = features.iter().map(|f| f.label()).collect();
    let records = load_processed(&paths.processed_path, &columns)?;
    let report = correlate_services(&paths.processed_path, &records, features)?;

    let mut out = Publisher::new(paths, options);
    out.table("service_correlation.csv", &report.rows)?;
    if report.rows.is_empty() {
        warn!("No feature has a defined correlation; charts skipped");
    } else {
        out.chart("service_correlation_bar.png", |p| {
            charts::render_correlation_bars(p, &report)
        })?;
        if report.total_magnitude() > 0.0 {
            out.chart("service_correlation_pie.png", |p| {
                charts::render_correlation_pie(p, &report)
            })?;
        } else {
            warn!("Every coefficient is zero; correlation pie skipped");
        }
    }
    out.finish(report)
}

/// Runs every analysis with shared options. A failing analysis is logged and
/// the rest still run; the failures are returned by analysis name.
#[tracing::instrument(skip_all)]
pub fn run_report(paths: &PathConfig, options: &OutputOptions) -> Vec<(&'static str, Error)> {
    let results: [(&'static str, Result<()>); 4] = [
        ("age", run_age(paths, options).map(|_| ())),
        ("gender", run_gender(paths, options).map(|_| ())),
        ("distance", run_distance(paths, options).map(|_| ())),
        (
            "service",
            run_service(paths, options, ServiceFeature::ALL).map(|_| ()),
        ),
    ];

    let mut failures = Vec::new();
    for (name, result) in results {
        match result {
            Ok(()) => info!(analysis = name, "Analysis complete"),
            Err(e) => {
                error!(analysis = name, error = %e, "Analysis failed");
                failures.push((name, e));
            }
        }
    }
    failures
}

fn log_groups(summary: &GroupedSummary) {
    for row in &summary.rows {
        info!(
            dimension = summary.dimension,
            group = %row.group,
            count = row.count,
            satisfied_pct = %format!("{:.1}", row.percent_satisfied),
            "Group satisfaction"
        );
    }
    info!(
        dimension = summary.dimension,
        total = summary.total,
        satisfied_pct = %format!("{:.1}", summary.overall_pct),
        empty_groups = summary.empty_groups.len(),
        "Overall satisfaction"
    );
}

/// Routes tables and charts to their destinations according to the output
/// options, then opens or prints them once the analysis is done.
struct Publisher<'a> {
    paths: &'a PathConfig,
    options: &'a OutputOptions,
    naming: OutputNaming,
    tables: Vec<PathBuf>,
    charts: Vec<PathBuf>,
}

impl<'a> Publisher<'a> {
    fn new(paths: &'a PathConfig, options: &'a OutputOptions) -> Self {
        Self {
            paths,
            options,
            naming: OutputNaming::new(options, Local::now()),
            tables: Vec::new(),
            charts: Vec::new(),
        }
    }

    fn table<T: TableRow>(&mut self, file_name: &str, rows: &[T]) -> Result<()> {
        if !self.options.save {
            return Ok(());
        }
        let path = self.paths.table(&self.naming.apply(file_name));
        write_table(&path, rows)?;
        info!(path = %path.display(), rows = rows.len(), "Table saved");
        self.tables.push(path);
        Ok(())
    }

    /// Renders into the figures dir when saving; with `--no-save --show`
    /// into a scratch dir under the system temp dir.
    fn chart(&mut self, file_name: &str, render: impl FnOnce(&Path) -> Result<()>) -> Result<()> {
        if !self.options.charts || !(self.options.save || self.options.show) {
            return Ok(());
        }
        let dir = if self.options.save {
            self.paths.figures_dir.clone()
        } else {
            std::env::temp_dir().join("airline_satisfaction")
        };
        std::fs::create_dir_all(&dir).map_err(|source| Error::Write {
            path: dir.clone(),
            source,
        })?;

        let path = dir.join(self.naming.apply(file_name));
        render(&path)?;
        info!(path = %path.display(), "Chart saved");
        self.charts.push(path);
        Ok(())
    }

    fn finish<T: Serialize>(self, summary: T) -> Result<Outcome<T>> {
        if self.options.open {
            self.tables.iter().for_each(|p| open_in_viewer(p));
        }
        if self.options.show || self.options.open {
            self.charts.iter().for_each(|p| open_in_viewer(p));
        }
        if self.options.json {
            print_json(&summary)?;
        }
        Ok(Outcome {
            summary,
            tables: self.tables,
            charts: self.charts,
        })
    }
}
