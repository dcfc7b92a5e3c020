//! PNG charts rendered with `plotters`.
//!
//! Rendering needs a system font for captions and labels. Each public
//! function maps drawing failures to [`Error::Chart`] naming the target file.

pub mod bars;
pub mod distribution;
pub mod pie;

pub use bars::{render_correlation_bars, render_grouped_bars, render_stacked_bars};
pub use distribution::render_distance_panels;
pub use pie::{render_correlation_pie, render_group_pies};

use plotters::style::RGBColor;
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};

pub(crate) const SATISFIED: RGBColor = RGBColor(46, 125, 190);
pub(crate) const UNSATISFIED: RGBColor = RGBColor(214, 96, 77);

/// Cycled for pie slices and per-feature bars.
pub(crate) const PALETTE: [RGBColor; 8] = [
    RGBColor(46, 125, 190),
    RGBColor(214, 96, 77),
    RGBColor(90, 174, 97),
    RGBColor(153, 112, 171),
    RGBColor(244, 165, 60),
    RGBColor(64, 176, 166),
    RGBColor(225, 126, 172),
    RGBColor(140, 140, 140),
];

pub(crate) const WIDE: (u32, u32) = (1280, 720);

pub(crate) fn rendered(path: &Path, result: anyhow::Result<()>) -> Result<()> {
    result.map_err(|e| Error::Chart {
        path: path.to_path_buf(),
        message: format!("{:#}", e),
    })?;
    debug!(path = %path.display(), "Chart rendered");
    Ok(())
}

/// Tick formatter for a category axis laid out as `-0.5..n-0.5`, one
/// category centred on each integer.
pub(crate) fn category_label(labels: &[String], x: f64) -> String {
    let i = x.round();
    if (x - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    labels.get(i as usize).cloned().unwrap_or_default()
}
