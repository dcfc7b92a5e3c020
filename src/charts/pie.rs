use plotters::prelude::*;
use std::path::Path;

use super::bars::Area;
use super::{PALETTE, SATISFIED, UNSATISFIED, rendered};
use crate::analyzers::types::{CorrelationReport, GroupedSummary};
use crate::error::Result;

/// One satisfied/unsatisfied pie per group, side by side.
pub fn render_group_pies(path: &Path, summary: &GroupedSummary, title: &str) -> Result<()> {
    rendered(path, draw_group_pies(path, summary, title))
}

/// Share of total absolute correlation held by each feature.
pub fn render_correlation_pie(path: &Path, report: &CorrelationReport) -> Result<()> {
    rendered(path, draw_correlation_pie(path, report))
}

fn draw_group_pies(path: &Path, summary: &GroupedSummary, title: &str) -> anyhow::Result<()> {
    let cols = summary.rows.len().max(1);
    let root = BitMapBackend::new(path, (520 * cols as u32, 560)).into_drawing_area();
    root.fill(&WHITE)?;
    let body = root.titled(title, ("sans-serif", 30).into_font())?;

    let colors = [SATISFIED, UNSATISFIED];
    let labels = ["Satisfied", "Neutral/Dissatisfied"];
    for (area, row) in body.split_evenly((1, cols)).iter().zip(&summary.rows) {
        let sizes = [row.percent_satisfied, row.percent_unsatisfied];
        draw_pie(area, &format!("{} (n={})", row.group, row.count), &sizes, &colors, &labels)?;
    }

    root.present()?;
    Ok(())
}

fn draw_correlation_pie(path: &Path, report: &CorrelationReport) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, (1100, 900)).into_drawing_area();
    root.fill(&WHITE)?;
    let body = root.titled(
        "Share of absolute correlation with satisfaction",
        ("sans-serif", 30).into_font(),
    )?;

    let sizes: Vec<f64> = report.rows.iter().map(|r| r.coefficient.abs()).collect();
    let colors: Vec<RGBColor> = (0..sizes.len()).map(|i| PALETTE[i % PALETTE.len()]).collect();
    let labels: Vec<&str> = report.rows.iter().map(|r| r.feature.as_str()).collect();
    draw_pie(&body, "", &sizes, &colors, &labels)?;

    root.present()?;
    Ok(())
}

fn draw_pie<L: std::fmt::Display>(
    area: &Area,
    caption: &str,
    sizes: &[f64],
    colors: &[RGBColor],
    labels: &[L],
) -> anyhow::Result<()> {
    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = f64::from(w.min(h)) * 0.3;

    if !caption.is_empty() {
        area.draw(&Text::new(
            caption.to_string(),
            (10, 10),
            ("sans-serif", 22).into_font(),
        ))?;
    }

    let mut pie = Pie::new(&center, &radius, sizes, colors, labels);
    pie.start_angle(-90.0);
    pie.label_style(("sans-serif", 16).into_font().color(&BLACK));
    pie.percentages(("sans-serif", radius * 0.09).into_font().color(&WHITE));
    area.draw(&pie)?;
    Ok(())
}
