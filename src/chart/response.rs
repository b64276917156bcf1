//! Adoption and inflation against the transfer level

use std::path::Path;

use plotters::prelude::*;

use super::{chart_error, draw_dashed, draw_error_bars, padded, series_color};
use crate::core::error::{AnalysisError, Result};
use crate::overview::response::{ResponseCurve, ResponsePoint};

const LINE_COLOR: RGBColor = RGBColor(0x33, 0x33, 0x33);

/// `(bdp, mean, std)` of one outcome per point
fn whiskers(
    curve: &ResponseCurve,
    moments: fn(&ResponsePoint) -> (f64, f64),
) -> Vec<(f64, f64, f64)> {
    curve
        .points
        .iter()
        .map(|p| {
            let (m, sd) = moments(p);
            (p.bdp_amount, m, sd)
        })
        .collect()
}

/// Left: mean adoption ± std per scenario. Right: the same for inflation.
pub fn render_response(path: &Path, curve: &ResponseCurve) -> Result<()> {
    if curve.points.is_empty() {
        return Err(AnalysisError::EmptySample("response curve".to_string()));
    }

    let root = BitMapBackend::new(path, (1300, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;
    let panels = root.split_evenly((1, 2));

    draw_panel(
        &panels[0],
        "A. Adoption response",
        "technology adoption M120 (%)",
        &whiskers(curve, |p| (p.adoption_mean, p.adoption_std)),
        false,
    )?;
    draw_panel(
        &panels[1],
        "B. Inflation response",
        "inflation M120 (%)",
        &whiskers(curve, |p| (p.inflation_mean, p.inflation_std)),
        true,
    )?;

    root.present().map_err(chart_error)?;
    tracing::info!("Saved {}", path.display());
    Ok(())
}

fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    caption: &str,
    y_desc: &str,
    points: &[(f64, f64, f64)],
    zero_line: bool,
) -> Result<()> {
    let x_lo = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let x_hi = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let y_lo = points.iter().map(|p| p.1 - p.2).fold(f64::INFINITY, f64::min);
    let y_hi = points.iter().map(|p| p.1 + p.2).fold(f64::NEG_INFINITY, f64::max);

    // Single scenario or no spread still needs a non-empty axis
    let widen = |lo: f64, hi: f64, min_span: f64| {
        let half = (min_span - (hi - lo)).max(0.0) / 2.0;
        padded((lo - half, hi + half), 0.1)
    };
    let (x_min, x_max) = widen(x_lo, x_hi, 1000.0);
    let (y_min, y_max) = widen(y_lo, y_hi, 1.0);
    let cap = (x_max - x_min) * 0.03;

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .x_desc("BDP (PLN/month)")
        .y_desc(y_desc)
        .draw()
        .map_err(chart_error)?;

    draw_error_bars(&mut chart, points, cap, LINE_COLOR.stroke_width(2))?;

    chart
        .draw_series(LineSeries::new(
            points.iter().map(|&(x, y, _)| (x, y)),
            LINE_COLOR.stroke_width(2),
        ))
        .map_err(chart_error)?;

    chart
        .draw_series(
            points
                .iter()
                .enumerate()
                .map(|(i, &(x, y, _))| Circle::new((x, y), 8, series_color(i).filled())),
        )
        .map_err(chart_error)?;

    if zero_line && y_min < 0.0 && y_max > 0.0 {
        draw_dashed(&mut chart, (x_min, 0.0), (x_max, 0.0), BLACK.mix(0.4).stroke_width(1))?;
    }
    Ok(())
}
