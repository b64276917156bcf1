//! Bifurcation diagram of the BDP sweep

use std::path::Path;

use plotters::prelude::*;

use super::{band_polygon, chart_error, draw_dashed, padded, value_range};
use crate::core::error::{AnalysisError, Result};
use crate::sweep::{SweepAnalysis, SweepLevel, SweepLevelStats};

const STD_COLOR: RGBColor = RGBColor(0xFF, 0x57, 0x22);
const MARKER_COLOR: RGBColor = RGBColor(0x4C, 0xAF, 0x50);

/// Width of a std bar in transfer units
const BAR_WIDTH: f64 = 200.0;

/// Horizontal extent of the sweep, padded by a bar width on each side
fn bdp_range(stats: &[SweepLevelStats]) -> Option<(f64, f64)> {
    let lo = stats.iter().map(|s| s.bdp).min()? as f64;
    let hi = stats.iter().map(|s| s.bdp).max()? as f64;
    Some((lo - BAR_WIDTH, hi + BAR_WIDTH))
}

/// One outcome across the sweep: per-seed values and the level mean ± std
struct Outcome {
    caption: &'static str,
    y_desc: &'static str,
    color: RGBColor,
    seeds: fn(&SweepLevel) -> &[f64],
    moments: fn(&SweepLevelStats) -> (f64, f64),
    /// Fixed axis; derived from the data when `None`
    y_range: Option<(f64, f64)>,
    zero_line: bool,
}

const ADOPTION: Outcome = Outcome {
    caption: "A. Adoption",
    y_desc: "adoption M120 (%)",
    color: RGBColor(0x21, 0x96, 0xF3),
    seeds: |l| l.adoption.as_slice(),
    moments: |s| (s.adoption_mean, s.adoption_std),
    y_range: Some((0.0, 100.0)),
    zero_line: false,
};

const INFLATION: Outcome = Outcome {
    caption: "B. Inflation",
    y_desc: "inflation M120 (%)",
    color: RGBColor(0xF4, 0x43, 0x36),
    seeds: |l| l.inflation.as_slice(),
    moments: |s| (s.inflation_mean, s.inflation_std),
    y_range: None,
    zero_line: true,
};

const UNEMPLOYMENT: Outcome = Outcome {
    caption: "D. Unemployment",
    y_desc: "unemployment M120 (%)",
    color: RGBColor(0x9C, 0x27, 0xB0),
    seeds: |l| l.unemployment.as_slice(),
    moments: |s| (s.unemployment_mean, s.unemployment_std),
    y_range: None,
    zero_line: false,
};

/// Outline of mean ± std across the levels
fn sigma_band(
    stats: &[SweepLevelStats],
    moments: fn(&SweepLevelStats) -> (f64, f64),
) -> Vec<(f64, f64)> {
    let xs: Vec<f64> = stats.iter().map(|s| s.bdp as f64).collect();
    let (lower, upper): (Vec<f64>, Vec<f64>) = stats
        .iter()
        .map(|s| {
            let (m, sd) = moments(s);
            (m - sd, m + sd)
        })
        .unzip();
    band_polygon(&xs, &lower, &upper)
}

/// Four panels: adoption, inflation and unemployment against the transfer
/// with their ±σ bands, plus the adoption spread per level. `marker` draws
/// a dashed reference line at that transfer on every panel.
pub fn render_bifurcation(
    path: &Path,
    analysis: &SweepAnalysis,
    marker: Option<f64>,
) -> Result<()> {
    let stats = analysis.stats();
    let x_range =
        bdp_range(&stats).ok_or_else(|| AnalysisError::EmptySample("sweep".to_string()))?;

    let root = BitMapBackend::new(path, (1400, 1100)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;
    let panels = root.split_evenly((2, 2));

    draw_outcome(&panels[0], analysis, &stats, &ADOPTION, x_range, marker)?;
    draw_outcome(&panels[1], analysis, &stats, &INFLATION, x_range, marker)?;
    draw_spread(&panels[2], analysis, &stats, x_range, marker)?;
    draw_outcome(&panels[3], analysis, &stats, &UNEMPLOYMENT, x_range, marker)?;

    root.present().map_err(chart_error)?;
    tracing::info!("Saved {}", path.display());
    Ok(())
}

fn draw_outcome<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    analysis: &SweepAnalysis,
    stats: &[SweepLevelStats],
    outcome: &Outcome,
    (x_min, x_max): (f64, f64),
    marker: Option<f64>,
) -> Result<()> {
    let band = sigma_band(stats, outcome.moments);
    let (y_min, y_max) = match outcome.y_range {
        Some(range) => range,
        None => {
            let band_y: Vec<f64> = band.iter().map(|&(_, y)| y).collect();
            let range = value_range(
                analysis
                    .levels
                    .iter()
                    .map(outcome.seeds)
                    .chain(std::iter::once(band_y.as_slice())),
            )
            .ok_or_else(|| AnalysisError::EmptySample(outcome.caption.to_string()))?;
            padded(range, 0.05)
        }
    };

    let mut chart = ChartBuilder::on(area)
        .caption(outcome.caption, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .x_desc("BDP (PLN/month)")
        .y_desc(outcome.y_desc)
        .draw()
        .map_err(chart_error)?;

    let color = outcome.color;
    for level in &analysis.levels {
        let bdp = level.bdp as f64;
        chart
            .draw_series(
                (outcome.seeds)(level)
                    .iter()
                    .map(|&v| Circle::new((bdp, v), 2, color.mix(0.3).filled())),
            )
            .map_err(chart_error)?;
    }

    chart
        .draw_series(std::iter::once(Polygon::new(band, color.mix(0.15).filled())))
        .map_err(chart_error)?
        .label("±σ")
        .legend(move |(x, y)| {
            Rectangle::new([(x, y - 5), (x + 20, y + 5)], color.mix(0.15).filled())
        });

    chart
        .draw_series(LineSeries::new(
            stats.iter().map(|s| (s.bdp as f64, (outcome.moments)(s).0)),
            BLACK.stroke_width(2),
        ))
        .map_err(chart_error)?
        .label("mean")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));

    if outcome.zero_line && y_min < 0.0 && y_max > 0.0 {
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(x_min, 0.0), (x_max, 0.0)],
                BLACK.mix(0.4),
            )))
            .map_err(chart_error)?;
    }

    if let Some(x) = marker {
        draw_dashed(&mut chart, (x, y_min), (x, y_max), MARKER_COLOR.stroke_width(1))?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(chart_error)?;
    Ok(())
}

/// Adoption std per level, the critical point highlighted
fn draw_spread<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    analysis: &SweepAnalysis,
    stats: &[SweepLevelStats],
    (x_min, x_max): (f64, f64),
    marker: Option<f64>,
) -> Result<()> {
    let critical = analysis.critical_point().map(|c| c.bdp);
    let std_max = stats
        .iter()
        .map(|s| s.adoption_std)
        .fold(0.0f64, f64::max)
        .max(1.0)
        * 1.15;

    let mut chart = ChartBuilder::on(area)
        .caption(
            format!("C. Adoption spread (N={})", analysis.total_points()),
            ("sans-serif", 20),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0.0..std_max)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .x_desc("BDP (PLN/month)")
        .y_desc("σ adoption (pp)")
        .draw()
        .map_err(chart_error)?;

    chart
        .draw_series(stats.iter().map(|s| {
            let x = s.bdp as f64;
            let color = if Some(s.bdp) == critical {
                RED
            } else {
                STD_COLOR
            };
            Rectangle::new(
                [(x - BAR_WIDTH / 2.0, 0.0), (x + BAR_WIDTH / 2.0, s.adoption_std)],
                color.mix(0.7).filled(),
            )
        }))
        .map_err(chart_error)?;

    if let Some(x) = marker {
        draw_dashed(&mut chart, (x, 0.0), (x, std_max), MARKER_COLOR.stroke_width(1))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(bdp: u32, adoption: &[f64]) -> SweepLevel {
        SweepLevel {
            bdp,
            adoption: adoption.to_vec(),
            inflation: adoption.iter().map(|a| a / 20.0 - 1.0).collect(),
            unemployment: adoption.iter().map(|a| 8.0 - a / 25.0).collect(),
        }
    }

    #[test]
    fn test_bdp_range_pads_both_ends() {
        let analysis =
            SweepAnalysis::from_levels(vec![level(500, &[10.0]), level(0, &[20.0])], vec![]);
        assert_eq!(bdp_range(&analysis.stats()), Some((-200.0, 700.0)));
    }

    #[test]
    fn test_sigma_band_spans_mean_plus_minus_std() {
        let analysis = SweepAnalysis::from_levels(
            vec![level(0, &[10.0, 20.0]), level(250, &[40.0, 40.0])],
            vec![],
        );
        let band = sigma_band(&analysis.stats(), ADOPTION.moments);
        let sd = 50f64.sqrt();
        assert_eq!(band.len(), 4);
        assert_eq!(band[0], (0.0, 15.0 + sd));
        assert_eq!(band[1], (250.0, 40.0));
        assert_eq!(band[2], (250.0, 40.0));
        assert_eq!(band[3], (0.0, 15.0 - sd));
    }

    #[test]
    fn test_empty_sweep_is_rejected() {
        let analysis = SweepAnalysis::from_levels(vec![], vec![0]);
        let err = render_bifurcation(Path::new("unused.png"), &analysis, None).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptySample(_)));
    }

    #[test]
    fn test_renders_four_panel_png() {
        let dir = std::env::temp_dir()
            .join(format!("mc_welfare_bifurcation_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bifurcation.png");

        let levels = (0..=8)
            .map(|i| {
                let bdp = i * 500;
                let spread = if bdp == 2000 { 20.0 } else { 2.0 };
                let centre = 30.0 + i as f64 * 3.0;
                level(bdp, &[centre - spread, centre + spread])
            })
            .collect();
        let analysis = SweepAnalysis::from_levels(levels, vec![]);

        render_bifurcation(&path, &analysis, Some(2000.0)).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);

        std::fs::remove_dir_all(&dir).ok();
    }
}
