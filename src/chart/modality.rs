//! Adoption density, mixture model selection and per-scenario densities

use std::path::Path;

use plotters::prelude::*;

use super::{band_polygon, chart_error, histogram_counts, series_color, value_range};
use crate::core::config::ChartConfig;
use crate::core::error::{AnalysisError, Result};
use crate::overview::modality::ModalityReport;
use crate::stats::kde::{linspace, GaussianKde};

const GRID_POINTS: usize = 200;
const HIST_COLOR: RGBColor = RGBColor(0x4C, 0xAF, 0x50);
const BIC_COLOR: RGBColor = RGBColor(0x90, 0xCA, 0xF9);
const BEST_COLOR: RGBColor = RGBColor(0xF4, 0x43, 0x36);

/// Evaluation grid 5 points beyond the data, clipped to [0, 100]
fn adoption_grid(values: &[f64]) -> Option<Vec<f64>> {
    let (lo, hi) = value_range([values])?;
    Some(linspace((lo - 5.0).max(0.0), (hi + 5.0).min(100.0), GRID_POINTS))
}

/// Histogram normalised to unit area
fn density_histogram(values: &[f64], bins: usize) -> Option<(f64, Vec<(f64, f64)>)> {
    let (lo, hi) = value_range([values])?;
    let width = (hi - lo) / bins.max(1) as f64;
    let norm = values.len() as f64 * width;
    let bars = histogram_counts(values, lo, hi, width)
        .into_iter()
        .map(|(start, count)| (start, count as f64 / norm))
        .collect();
    Some((width, bars))
}

/// A: histogram, KDE and fitted components of `detail`. B: BIC per
/// mixture size, the winner highlighted. C: KDE of every scenario.
pub fn render_modality(
    path: &Path,
    detail: &ModalityReport,
    scenarios: &[ModalityReport],
    charts: &ChartConfig,
) -> Result<()> {
    let root = BitMapBackend::new(path, (1800, 650)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;
    let panels = root.split_evenly((1, 3));

    draw_density(&panels[0], detail, charts.histogram_bins)?;
    draw_bic(&panels[1], detail)?;
    draw_scenario_kdes(&panels[2], scenarios)?;

    root.present().map_err(chart_error)?;
    tracing::info!("Saved {}", path.display());
    Ok(())
}

fn draw_density<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    report: &ModalityReport,
    bins: usize,
) -> Result<()> {
    let empty = || AnalysisError::EmptySample(format!("{}: adoption", report.label));
    let (width, bars) = density_histogram(&report.values, bins).ok_or_else(empty)?;
    let grid = adoption_grid(&report.values).ok_or_else(empty)?;
    let kde = GaussianKde::new(&report.values)?;
    let kde_line: Vec<(f64, f64)> = grid.iter().map(|&x| (x, kde.density(x))).collect();
    let components = &report.selection.best.components;

    let y_max = bars
        .iter()
        .map(|&(_, d)| d)
        .chain(kde_line.iter().map(|&(_, d)| d))
        .chain(
            components
                .iter()
                .flat_map(|c| grid.iter().map(move |&x| c.weighted_pdf(x))),
        )
        .fold(0.0f64, f64::max)
        * 1.1;
    let x_min = grid.first().copied().unwrap_or(0.0);
    let x_max = grid.last().copied().unwrap_or(100.0);

    let mut chart = ChartBuilder::on(area)
        .caption(format!("A. KDE + GMM ({})", report.label), ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max.max(f64::EPSILON))
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .x_desc("technology adoption M120 (%)")
        .y_desc("density")
        .draw()
        .map_err(chart_error)?;

    chart
        .draw_series(bars.iter().map(|&(start, d)| {
            Rectangle::new([(start, 0.0), (start + width, d)], HIST_COLOR.mix(0.4).filled())
        }))
        .map_err(chart_error)?;

    chart
        .draw_series(LineSeries::new(kde_line, BLACK.stroke_width(2)))
        .map_err(chart_error)?
        .label("KDE")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK.stroke_width(2)));

    for (j, c) in components.iter().enumerate() {
        let color = series_color(j + 2);
        chart
            .draw_series(LineSeries::new(
                grid.iter().map(|&x| (x, c.weighted_pdf(x))),
                color.stroke_width(2),
            ))
            .map_err(chart_error)?
            .label(format!("GMM k={}: μ={:.0}%", j + 1, c.mean))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(chart_error)?;
    Ok(())
}

fn draw_bic<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    report: &ModalityReport,
) -> Result<()> {
    let bics = &report.selection.bics;
    let best_k = report.selection.best_k();
    let (lo, hi) = bics
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, b)| {
            (lo.min(b), hi.max(b))
        });
    if lo > hi {
        return Err(AnalysisError::EmptySample("BIC table".to_string()));
    }
    // Bars grow from the axis floor so they work for negative BIC too
    let pad = ((hi - lo) * 0.1).max(1.0);
    let floor = lo - pad;

    let mut chart = ChartBuilder::on(area)
        .caption("B. Model selection (BIC)", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.5..(bics.len() as f64 + 0.5), floor..(hi + pad))
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bics.len())
        .x_label_formatter(&|x| format!("{:.0}", x))
        .x_desc("components (K)")
        .y_desc("BIC")
        .draw()
        .map_err(chart_error)?;

    chart
        .draw_series(bics.iter().map(|&(k, bic)| {
            let color = if k == best_k { BEST_COLOR } else { BIC_COLOR };
            let x = k as f64;
            Rectangle::new([(x - 0.4, floor), (x + 0.4, bic)], color.filled())
        }))
        .map_err(chart_error)?;
    Ok(())
}

fn draw_scenario_kdes<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    scenarios: &[ModalityReport],
) -> Result<()> {
    let mut curves = Vec::new();
    for (i, report) in scenarios.iter().enumerate() {
        let Some(grid) = adoption_grid(&report.values) else {
            continue;
        };
        match GaussianKde::new(&report.values) {
            Ok(kde) => {
                let density = kde.evaluate(&grid);
                curves.push((report.label.as_str(), series_color(i), grid, density));
            }
            Err(err) => tracing::warn!("{}: no density estimate ({})", report.label, err),
        }
    }
    if curves.is_empty() {
        tracing::warn!("No scenario density to draw; panel left empty");
        return Ok(());
    }

    let x_min = curves.iter().filter_map(|c| c.2.first()).fold(100.0f64, |a, &b| a.min(b));
    let x_max = curves.iter().filter_map(|c| c.2.last()).fold(0.0f64, |a, &b| a.max(b));
    let y_max = curves
        .iter()
        .flat_map(|c| c.3.iter().copied())
        .fold(0.0f64, f64::max)
        * 1.1;

    let mut chart = ChartBuilder::on(area)
        .caption("C. KDE by scenario", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max.max(x_min + 1.0), 0.0..y_max.max(f64::EPSILON))
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .x_desc("technology adoption M120 (%)")
        .y_desc("density")
        .draw()
        .map_err(chart_error)?;

    for (label, color, grid, density) in &curves {
        let color = *color;
        let zeros = vec![0.0; grid.len()];
        chart
            .draw_series(std::iter::once(Polygon::new(
                band_polygon(grid, &zeros, density),
                color.mix(0.15).filled(),
            )))
            .map_err(chart_error)?;
        chart
            .draw_series(LineSeries::new(
                grid.iter().copied().zip(density.iter().copied()),
                color.stroke_width(2),
            ))
            .map_err(chart_error)?
            .label(*label)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(chart_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::BimodalityConfig;

    fn report(label: &str, values: &[f64]) -> ModalityReport {
        let config = BimodalityConfig {
            max_components: 3,
            n_init: 3,
            ..BimodalityConfig::default()
        };
        ModalityReport::from_values(label, values, &config).unwrap()
    }

    fn bimodal() -> Vec<f64> {
        let mut values: Vec<f64> = (0..40).map(|i| 30.0 + (i % 8) as f64 * 0.7).collect();
        values.extend((0..40).map(|i| 72.0 + (i % 9) as f64 * 0.6));
        values
    }

    #[test]
    fn test_density_histogram_has_unit_area() {
        let values = bimodal();
        let (width, bars) = density_histogram(&values, 20).unwrap();
        let area: f64 = bars.iter().map(|&(_, d)| d * width).sum();
        assert!((area - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_grid_clipped_to_percent_range() {
        let grid = adoption_grid(&[2.0, 98.0]).unwrap();
        assert_eq!(grid.len(), GRID_POINTS);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[GRID_POINTS - 1], 100.0);
    }

    #[test]
    fn test_renders_png() {
        let dir =
            std::env::temp_dir().join(format!("mc_welfare_modality_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bimodality.png");

        let detail = report("BDP=2000", &bimodal());
        let flat: Vec<f64> = (0..50).map(|i| 35.0 + (i % 10) as f64).collect();
        // Constant sample has no density estimate and is skipped in panel C
        let constant = vec![40.0; 10];
        let scenarios = vec![
            report("BDP=0", &flat),
            detail.clone(),
            report("BDP=3000", &constant),
        ];

        render_modality(&path, &detail, &scenarios, &ChartConfig::default()).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);

        std::fs::remove_dir_all(&dir).ok();
    }
}
