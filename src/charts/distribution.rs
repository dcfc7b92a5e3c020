use plotters::prelude::*;
use std::path::Path;

use super::bars::{Area, draw_stacked};
use super::{SATISFIED, UNSATISFIED, category_label, rendered};
use crate::analyzers::types::{DistributionRow, GroupedSummary};
use crate::error::Result;
use crate::record::Satisfaction;

const HISTOGRAM_BINS: usize = 20;

/// Box plot, overlaid histogram, and band bars for flight distance.
///
/// `samples` pairs each satisfaction display name with its raw values.
pub fn render_distance_panels(
    path: &Path,
    summary: &GroupedSummary,
    stats: &[DistributionRow],
    samples: &[(&str, Vec<f64>)],
) -> Result<()> {
    rendered(path, draw_panels(path, summary, stats, samples))
}

fn label_color(name: &str) -> RGBColor {
    if name == Satisfaction::Satisfied.display_name() {
        SATISFIED
    } else {
        UNSATISFIED
    }
}

fn draw_panels(
    path: &Path,
    summary: &GroupedSummary,
    stats: &[DistributionRow],
    samples: &[(&str, Vec<f64>)],
) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, (1920, 640)).into_drawing_area();
    root.fill(&WHITE)?;

    let panels = root.split_evenly((1, 3));
    draw_box_plot(&panels[0], stats)?;
    draw_histogram(&panels[1], samples)?;
    draw_stacked(&panels[2], summary, "Satisfaction by distance band")?;

    root.present()?;
    Ok(())
}

fn draw_box_plot(area: &Area, stats: &[DistributionRow]) -> anyhow::Result<()> {
    let labels: Vec<String> = stats.iter().map(|s| s.satisfaction.clone()).collect();
    let n = labels.len() as f64;
    let top = stats.iter().map(|s| s.max).fold(1.0f64, f64::max) * 1.05;

    let mut chart = ChartBuilder::on(area)
        .caption("Flight distance by satisfaction", ("sans-serif", 26))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(n - 0.5), 0f64..top)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|x| category_label(&labels, *x))
        .y_desc("Flight Distance")
        .draw()?;

    chart.draw_series(stats.iter().enumerate().map(|(i, s)| {
        let x = i as f64;
        Rectangle::new(
            [(x - 0.25, s.q1), (x + 0.25, s.q3)],
            label_color(&s.satisfaction).mix(0.6).filled(),
        )
    }))?;
    chart.draw_series(stats.iter().enumerate().map(|(i, s)| {
        let x = i as f64;
        Rectangle::new([(x - 0.25, s.q1), (x + 0.25, s.q3)], BLACK.stroke_width(1))
    }))?;

    // median, whiskers and caps
    for (i, s) in stats.iter().enumerate() {
        let x = i as f64;
        let lines = [
            vec![(x - 0.25, s.median), (x + 0.25, s.median)],
            vec![(x, s.min), (x, s.q1)],
            vec![(x, s.q3), (x, s.max)],
            vec![(x - 0.1, s.min), (x + 0.1, s.min)],
            vec![(x - 0.1, s.max), (x + 0.1, s.max)],
        ];
        chart.draw_series(
            lines
                .into_iter()
                .map(|pts| PathElement::new(pts, BLACK.stroke_width(2))),
        )?;
    }
    Ok(())
}

/// Per-bin counts of `values` over `[0, upper)`; the last bin is closed.
pub(crate) fn bin_counts(values: &[f64], upper: f64, bins: usize) -> Vec<usize> {
    let mut counts = vec![0; bins];
    if bins == 0 || upper <= 0.0 {
        return counts;
    }
    let width = upper / bins as f64;
    for &v in values {
        let idx = ((v / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
}

fn draw_histogram(area: &Area, samples: &[(&str, Vec<f64>)]) -> anyhow::Result<()> {
    let upper = samples
        .iter()
        .flat_map(|(_, v)| v.iter().copied())
        .fold(1.0f64, f64::max);
    let width = upper / HISTOGRAM_BINS as f64;

    let binned: Vec<(&str, Vec<usize>)> = samples
        .iter()
        .map(|(name, values)| (*name, bin_counts(values, upper, HISTOGRAM_BINS)))
        .collect();
    let peak = binned
        .iter()
        .flat_map(|(_, c)| c.iter().copied())
        .max()
        .unwrap_or(0)
        .max(1);

    let mut chart = ChartBuilder::on(area)
        .caption("Flight distance histogram", ("sans-serif", 26))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..upper, 0f64..(peak as f64 * 1.1))?;

    chart
        .configure_mesh()
        .x_desc("Flight Distance")
        .y_desc("Passengers")
        .draw()?;

    for (name, counts) in &binned {
        let color = label_color(name);
        chart
            .draw_series(counts.iter().enumerate().map(|(b, &c)| {
                let x0 = b as f64 * width;
                Rectangle::new([(x0, 0.0), (x0 + width, c as f64)], color.mix(0.5).filled())
            }))?
            .label(name.to_string())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_counts() {
        let counts = bin_counts(&[0.0, 9.9, 10.0, 99.0, 100.0], 100.0, 10);
        assert_eq!(counts.len(), 10);
        assert_eq!(counts[0], 2);
        assert_eq!(counts[1], 1);
        // the maximum lands in the last bin
        assert_eq!(counts[9], 2);
        assert_eq!(counts.iter().sum::<usize>(), 5);
    }

    #[test]
    fn test_label_color() {
        assert_eq!(label_color("Satisfied").rgb(), SATISFIED.rgb());
        assert_eq!(label_color("Neutral/Dissatisfied").rgb(), UNSATISFIED.rgb());
    }
}
