use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

use super::{SATISFIED, UNSATISFIED, WIDE, category_label, rendered};
use crate::analyzers::types::{CorrelationReport, GroupedSummary};
use crate::error::Result;

pub(crate) type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Satisfied and unsatisfied percentages side by side for each group.
pub fn render_grouped_bars(path: &Path, summary: &GroupedSummary, title: &str) -> Result<()> {
    rendered(path, draw_grouped(path, summary, title))
}

/// One 100 % bar per group, split into satisfied and unsatisfied.
pub fn render_stacked_bars(path: &Path, summary: &GroupedSummary, title: &str) -> Result<()> {
    rendered(path, draw_stacked_file(path, summary, title))
}

/// Horizontal bars of correlation percent per feature, strongest on top.
pub fn render_correlation_bars(path: &Path, report: &CorrelationReport) -> Result<()> {
    rendered(path, draw_correlation(path, report))
}

fn draw_grouped(path: &Path, summary: &GroupedSummary, title: &str) -> anyhow::Result<()> {
    let labels: Vec<String> = summary.rows.iter().map(|r| r.group.clone()).collect();
    let n = labels.len() as f64;

    let root = BitMapBackend::new(path, WIDE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(n - 0.5), 0f64..105f64)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|x| category_label(&labels, *x))
        .x_desc(summary.column)
        .y_desc("Passengers in group (%)")
        .draw()?;

    chart
        .draw_series(summary.rows.iter().enumerate().map(|(i, r)| {
            let x = i as f64;
            Rectangle::new([(x - 0.38, 0.0), (x, r.percent_satisfied)], SATISFIED.filled())
        }))?
        .label("Satisfied")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], SATISFIED.filled()));

    chart
        .draw_series(summary.rows.iter().enumerate().map(|(i, r)| {
            let x = i as f64;
            Rectangle::new([(x, 0.0), (x + 0.38, r.percent_unsatisfied)], UNSATISFIED.filled())
        }))?
        .label("Neutral/Dissatisfied")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], UNSATISFIED.filled()));

    chart.draw_series(summary.rows.iter().enumerate().map(|(i, r)| {
        Text::new(
            format!("{:.1}%", r.percent_satisfied),
            (i as f64 - 0.34, r.percent_satisfied + 3.0),
            ("sans-serif", 14).into_font(),
        )
    }))?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_stacked_file(path: &Path, summary: &GroupedSummary, title: &str) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, WIDE).into_drawing_area();
    root.fill(&WHITE)?;
    draw_stacked(&root, summary, title)?;
    root.present()?;
    Ok(())
}

pub(crate) fn draw_stacked(area: &Area, summary: &GroupedSummary, title: &str) -> anyhow::Result<()> {
    let labels: Vec<String> = summary.rows.iter().map(|r| r.group.clone()).collect();
    let n = labels.len() as f64;

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 26))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(n - 0.5), 0f64..100f64)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|x| category_label(&labels, *x))
        .x_desc(summary.column)
        .y_desc("Passengers in group (%)")
        .draw()?;

    chart
        .draw_series(summary.rows.iter().enumerate().map(|(i, r)| {
            let x = i as f64;
            Rectangle::new(
                [(x - 0.35, 0.0), (x + 0.35, r.percent_satisfied)],
                SATISFIED.filled(),
            )
        }))?
        .label("Satisfied")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], SATISFIED.filled()));

    chart
        .draw_series(summary.rows.iter().enumerate().map(|(i, r)| {
            let x = i as f64;
            Rectangle::new(
                [(x - 0.35, r.percent_satisfied), (x + 0.35, 100.0)],
                UNSATISFIED.filled(),
            )
        }))?
        .label("Neutral/Dissatisfied")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], UNSATISFIED.filled()));

    chart.draw_series(summary.rows.iter().enumerate().map(|(i, r)| {
        Text::new(
            format!("{:.1}%", r.percent_satisfied),
            (i as f64 - 0.1, r.percent_satisfied / 2.0),
            ("sans-serif", 16).into_font().color(&WHITE),
        )
    }))?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn draw_correlation(path: &Path, report: &CorrelationReport) -> anyhow::Result<()> {
    let n = report.rows.len();
    // rank 1 at the top
    let labels: Vec<String> = report.rows.iter().rev().map(|r| r.feature.clone()).collect();
    let low = report.rows.iter().map(|r| r.percent).fold(0.0f64, f64::min);
    let high = report.rows.iter().map(|r| r.percent).fold(0.0f64, f64::max);

    let root = BitMapBackend::new(path, WIDE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Correlation of service ratings with satisfaction",
            ("sans-serif", 30),
        )
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(260)
        .build_cartesian_2d((low - 5.0)..(high + 5.0), -0.5f64..(n as f64 - 0.5))?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(n)
        .y_label_formatter(&|y| category_label(&labels, *y))
        .x_desc("Correlation with satisfaction (%)")
        .draw()?;

    chart.draw_series(report.rows.iter().enumerate().map(|(i, r)| {
        let y = (n - 1 - i) as f64;
        let color = if r.percent >= 0.0 { SATISFIED } else { UNSATISFIED };
        Rectangle::new([(0.0, y - 0.35), (r.percent, y + 0.35)], color.filled())
    }))?;

    chart.draw_series(report.rows.iter().enumerate().map(|(i, r)| {
        let y = (n - 1 - i) as f64;
        Text::new(
            format!("{:.1}", r.percent),
            (r.percent.max(0.0) + 0.5, y + 0.15),
            ("sans-serif", 14).into_font(),
        )
    }))?;

    root.present()?;
    Ok(())
}
