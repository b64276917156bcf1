//! Adoption distribution, sector adoption and the adoption/inflation phase plot

use std::path::Path;

use plotters::prelude::*;

use super::{
    chart_error, draw_dashed, draw_error_bars, histogram_counts, padded, series_color,
    value_range,
};
use crate::core::config::ChartConfig;
use crate::core::error::{AnalysisError, Result};
use crate::overview::profile::ScenarioProfile;
use crate::overview::scenario::SECTOR_METRICS;

/// Sector names present in any profile, in display order
fn sector_names(profiles: &[ScenarioProfile]) -> Vec<&'static str> {
    SECTOR_METRICS
        .iter()
        .map(|&(_, name)| name)
        .filter(|name| profiles.iter().any(|p| p.sector(name).is_some()))
        .collect()
}

/// Three panels: adoption histogram per scenario with the mean of
/// `reference` marked, sector adoption bars with ±std whiskers, and
/// per-seed adoption against inflation.
pub fn render_adoption_profile(
    path: &Path,
    profiles: &[ScenarioProfile],
    reference: Option<&str>,
    charts: &ChartConfig,
) -> Result<()> {
    if profiles.is_empty() {
        return Err(AnalysisError::EmptySample("adoption profile".to_string()));
    }

    let root = BitMapBackend::new(path, (1800, 650)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;
    let panels = root.split_evenly((1, 3));

    draw_histogram(&panels[0], profiles, reference, charts.histogram_bins)?;
    draw_sector_bars(&panels[1], profiles)?;
    draw_phase(&panels[2], profiles)?;

    root.present().map_err(chart_error)?;
    tracing::info!("Saved {}", path.display());
    Ok(())
}

fn draw_histogram<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    profiles: &[ScenarioProfile],
    reference: Option<&str>,
    bins: usize,
) -> Result<()> {
    let (min, max) = value_range(profiles.iter().map(|p| p.adoption_pct.as_slice()))
        .ok_or_else(|| AnalysisError::EmptySample("adoption".to_string()))?;
    let bin_width = (max - min) / bins.max(1) as f64;

    let binned: Vec<Vec<(f64, usize)>> = profiles
        .iter()
        .map(|p| histogram_counts(&p.adoption_pct, min, max, bin_width))
        .collect();
    let y_max = binned
        .iter()
        .flatten()
        .map(|&(_, count)| count as f64)
        .fold(0.0f64, f64::max)
        .max(1.0)
        * 1.1;

    let mut chart = ChartBuilder::on(area)
        .caption("A. Adoption distribution", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(min..max, 0.0..y_max)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .x_desc("technology adoption M120 (%)")
        .y_desc("seeds")
        .draw()
        .map_err(chart_error)?;

    for (i, (profile, counts)) in profiles.iter().zip(&binned).enumerate() {
        let color = series_color(i);
        chart
            .draw_series(counts.iter().map(|&(start, count)| {
                Rectangle::new(
                    [(start, 0.0), (start + bin_width, count as f64)],
                    color.mix(0.5).filled(),
                )
            }))
            .map_err(chart_error)?
            .label(profile.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));

        if reference == Some(profile.label.as_str()) {
            let m = profile.adoption_mean();
            draw_dashed(&mut chart, (m, 0.0), (m, y_max), color.stroke_width(2))?;
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(chart_error)?;
    Ok(())
}

fn draw_sector_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    profiles: &[ScenarioProfile],
) -> Result<()> {
    let names = sector_names(profiles);
    if names.is_empty() {
        tracing::warn!("No sector columns in any scenario; sector panel left empty");
        return Ok(());
    }

    let y_max = profiles
        .iter()
        .flat_map(|p| p.sectors.iter().map(|s| s.mean + s.std))
        .fold(0.0f64, f64::max)
        .max(1.0)
        * 1.1;
    let bar_width = 0.8 / profiles.len() as f64;

    let mut chart = ChartBuilder::on(area)
        .caption("B. Adoption by sector", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..names.len() as f64, 0.0..y_max)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(names.len() * 2 + 1)
        .x_label_formatter(&|x| {
            if (x - x.floor() - 0.5).abs() < 1e-6 {
                names
                    .get(x.floor() as usize)
                    .map(|name| name.to_string())
                    .unwrap_or_default()
            } else {
                String::new()
            }
        })
        .y_desc("adoption (%)")
        .draw()
        .map_err(chart_error)?;

    for (i, profile) in profiles.iter().enumerate() {
        let color = series_color(i);
        let bars: Vec<(f64, f64, f64)> = names
            .iter()
            .enumerate()
            .filter_map(|(g, name)| {
                profile.sector(name).map(|s| {
                    let centre = g as f64 + 0.1 + (i as f64 + 0.5) * bar_width;
                    (centre, s.mean, s.std)
                })
            })
            .collect();

        chart
            .draw_series(bars.iter().map(|&(x, mean, _)| {
                Rectangle::new(
                    [(x - bar_width / 2.0, 0.0), (x + bar_width / 2.0, mean)],
                    color.mix(0.8).filled(),
                )
            }))
            .map_err(chart_error)?
            .label(profile.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));

        draw_error_bars(&mut chart, &bars, bar_width * 0.4, BLACK.stroke_width(1))?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(chart_error)?;
    Ok(())
}

fn draw_phase<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    profiles: &[ScenarioProfile],
) -> Result<()> {
    let x_range = value_range(profiles.iter().map(|p| p.adoption_pct.as_slice()))
        .ok_or_else(|| AnalysisError::EmptySample("adoption".to_string()))?;
    let y_range = value_range(profiles.iter().map(|p| p.inflation_pct.as_slice()))
        .ok_or_else(|| AnalysisError::EmptySample("inflation".to_string()))?;
    let (x_min, x_max) = padded(x_range, 0.05);
    let (y_min, y_max) = padded(y_range, 0.05);

    let mut chart = ChartBuilder::on(area)
        .caption("C. Phase space: adoption x inflation", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .x_desc("technology adoption (%)")
        .y_desc("inflation (%)")
        .draw()
        .map_err(chart_error)?;

    for (i, profile) in profiles.iter().enumerate() {
        let color = series_color(i);
        let points = profile
            .adoption_pct
            .iter()
            .copied()
            .zip(profile.inflation_pct.iter().copied());
        chart
            .draw_series(points.map(|(x, y)| Circle::new((x, y), 3, color.mix(0.4).filled())))
            .map_err(chart_error)?
            .label(profile.label.as_str())
            .legend(move |(x, y)| Circle::new((x + 5, y), 3, color.filled()));
    }

    if y_min < 0.0 && y_max > 0.0 {
        draw_dashed(&mut chart, (x_min, 0.0), (x_max, 0.0), BLACK.mix(0.4).stroke_width(1))?;
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
    use crate::overview::profile::SectorShare;

    fn profile(label: &str, bdp: f64, centre: f64, sectors: &[&str]) -> ScenarioProfile {
        ScenarioProfile {
            label: label.to_string(),
            bdp_amount: bdp,
            adoption_pct: (0..30).map(|i| centre + (i % 7) as f64 * 1.5).collect(),
            inflation_pct: (0..30).map(|i| (i % 5) as f64 * 0.8 - 1.0).collect(),
            sectors: sectors
                .iter()
                .map(|name| SectorShare {
                    name: name.to_string(),
                    mean: centre,
                    std: 4.0,
                })
                .collect(),
        }
    }

    #[test]
    fn test_sector_names_keep_display_order() {
        let profiles = vec![
            profile("BDP=0", 0.0, 30.0, &["Manufacturing"]),
            profile("BDP=2000", 2000.0, 60.0, &["Healthcare", "BPO/SSC"]),
        ];
        assert_eq!(
            sector_names(&profiles),
            vec!["BPO/SSC", "Manufacturing", "Healthcare"]
        );
    }

    #[test]
    fn test_renders_png() {
        let dir = std::env::temp_dir().join(format!("mc_welfare_profile_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("adoption_profile.png");

        let sectors = ["BPO/SSC", "Manufacturing", "Retail/Services", "Healthcare"];
        let profiles = vec![
            profile("BDP=0", 0.0, 30.0, &sectors),
            profile("BDP=2000", 2000.0, 55.0, &sectors),
            profile("BDP=3000", 3000.0, 45.0, &sectors),
        ];
        render_adoption_profile(&path, &profiles, Some("BDP=2000"), &ChartConfig::default())
            .unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_no_profiles_rejected() {
        let err =
            render_adoption_profile(Path::new("unused.png"), &[], None, &ChartConfig::default())
                .unwrap_err();
        assert!(matches!(err, AnalysisError::EmptySample(_)));
    }
}
