//! Truth-value scatter plots.
//!
//! Renders 2-D sample sets colored by predicate truth values to PNG.
//! Diagnostic output only; nothing here is a stable format.

use std::path::Path;

use candle_core::Tensor;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::{LtnError, Result};
use crate::runtime::Truth;

/// One panel of a scatter figure.
pub struct Panel<'a> {
    pub title: &'a str,
    pub points: &'a Tensor,
    pub truth: &'a Truth,
}

/// Render a single truth scatter to `path`.
pub fn scatter_truth(path: &Path, title: &str, points: &Tensor, truth: &Truth) -> Result<()> {
    let root = BitMapBackend::new(path, (640, 480)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| LtnError::Plot(format!("backend error: {e}")))?;

    draw_panel(
        &root,
        &Panel {
            title,
            points,
            truth,
        },
    )?;

    root.present()
        .map_err(|e| LtnError::Plot(format!("render error: {e}")))?;
    Ok(())
}

/// Render a grid of truth scatters to one PNG (row-major panel order).
pub fn scatter_grid(path: &Path, rows: usize, cols: usize, panels: &[Panel<'_>]) -> Result<()> {
    if panels.len() > rows * cols {
        return Err(LtnError::Plot(format!(
            "{} panels do not fit a {}x{} grid",
            panels.len(),
            rows,
            cols
        )));
    }

    let root =
        BitMapBackend::new(path, (640 * cols as u32, 480 * rows as u32)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| LtnError::Plot(format!("backend error: {e}")))?;

    let areas = root.split_evenly((rows, cols));
    for (panel, area) in panels.iter().zip(areas.iter()) {
        draw_panel(area, panel)?;
    }

    root.present()
        .map_err(|e| LtnError::Plot(format!("render error: {e}")))?;
    Ok(())
}

fn draw_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    panel: &Panel<'_>,
) -> Result<()> {
    let coords = panel.points.to_vec2::<f32>()?;
    let truths = panel.truth.to_vec()?;
    if coords.len() != truths.len() {
        return Err(LtnError::Plot(format!(
            "{} points vs {} truth values",
            coords.len(),
            truths.len()
        )));
    }

    let (x_range, y_range) = ranges(&coords);

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .caption(panel.title, ("sans-serif", 24.0))
        .set_label_area_size(LabelAreaPosition::Left, 40)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x_range, y_range)
        .map_err(|e| LtnError::Plot(format!("chart build error: {e}")))?;

    chart
        .configure_mesh()
        .disable_mesh()
        .draw()
        .map_err(|e| LtnError::Plot(format!("mesh error: {e}")))?;

    chart
        .draw_series(coords.iter().zip(truths.iter()).map(|(row, &t)| {
            Circle::new((row[0], row[1]), 3, truth_color(t).filled())
        }))
        .map_err(|e| LtnError::Plot(format!("draw error: {e}")))?;

    Ok(())
}

fn ranges(coords: &[Vec<f32>]) -> (std::ops::Range<f32>, std::ops::Range<f32>) {
    let mut x_min = f32::INFINITY;
    let mut x_max = f32::NEG_INFINITY;
    let mut y_min = f32::INFINITY;
    let mut y_max = f32::NEG_INFINITY;
    for row in coords {
        x_min = x_min.min(row[0]);
        x_max = x_max.max(row[0]);
        y_min = y_min.min(row[1]);
        y_max = y_max.max(row[1]);
    }
    if coords.is_empty() {
        return (0.0..1.0, 0.0..1.0);
    }
    let pad = 0.05;
    (x_min - pad..x_max + pad, y_min - pad..y_max + pad)
}

/// Cold-to-warm gradient over truth values in [0,1].
fn truth_color(t: f32) -> RGBColor {
    let t = t.clamp(0.0, 1.0) as f64;
    let r = (255.0 * t) as u8;
    let g = (64.0 + 64.0 * (1.0 - (2.0 * t - 1.0).abs())) as u8;
    let b = (255.0 * (1.0 - t)) as u8;
    RGBColor(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truth_color_endpoints() {
        assert_eq!(truth_color(0.0), RGBColor(0, 64, 255));
        assert_eq!(truth_color(1.0), RGBColor(255, 64, 0));
    }

    #[test]
    fn test_ranges_pad_bounds() {
        let coords = vec![vec![0.0f32, 0.0], vec![1.0, 1.0]];
        let (x, y) = ranges(&coords);
        assert!(x.start < 0.0 && x.end > 1.0);
        assert!(y.start < 0.0 && y.end > 1.0);
    }
}
