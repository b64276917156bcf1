//! Four-panel welfare comparison across scenarios

use std::path::Path;

use plotters::prelude::*;

use super::{chart_error, histogram_counts, series_color, value_range};
use crate::core::config::ChartConfig;
use crate::core::error::{AnalysisError, Result};
use crate::welfare::report::{ScenarioWelfare, WelfareReport};

/// Grouped bar metrics, each scaled to a comparable height
const BAR_METRICS: [&str; 4] = [
    "Real cons. (x1000 PLN)",
    "Gini (x10)",
    "Adoption (x10%)",
    "Unemployment (x10%)",
];

fn bar_values(s: &ScenarioWelfare) -> [f64; 4] {
    [
        s.real_consumption.mean / 1000.0,
        s.gini.mean * 10.0,
        s.adoption_mean_pct / 10.0,
        s.unemployment_mean_pct / 10.0,
    ]
}

pub fn render_welfare_panel(
    path: &Path,
    report: &WelfareReport,
    charts: &ChartConfig,
) -> Result<()> {
    if report.scenarios.is_empty() {
        return Err(AnalysisError::EmptySample("welfare panel".to_string()));
    }

    let root = BitMapBackend::new(path, (1400, 1000)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;
    let panels = root.split_evenly((2, 2));

    let consumption: Vec<Vec<f64>> = report
        .scenarios
        .iter()
        .map(ScenarioWelfare::real_consumption_values)
        .collect();
    let gini: Vec<Vec<f64>> = report
        .scenarios
        .iter()
        .map(ScenarioWelfare::gini_values)
        .collect();

    draw_histograms(
        &panels[0],
        "Real consumption per capita",
        "PLN (deflated)",
        report,
        &consumption,
        charts.histogram_bins,
    )?;
    draw_histograms(
        &panels[1],
        "Gini coefficient",
        "Gini",
        report,
        &gini,
        charts.histogram_bins,
    )?;
    draw_scatter(&panels[2], report, &gini, &consumption)?;
    draw_bars(&panels[3], report)?;

    root.present().map_err(chart_error)?;
    tracing::info!("Saved {}", path.display());
    Ok(())
}

fn draw_histograms<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    caption: &str,
    x_desc: &str,
    report: &WelfareReport,
    series: &[Vec<f64>],
    bins: usize,
) -> Result<()> {
    let Some((min, max)) = value_range(series.iter().map(Vec::as_slice)) else {
        return Err(AnalysisError::EmptySample(caption.to_string()));
    };
    let bin_width = (max - min) / bins.max(1) as f64;

    let binned: Vec<Vec<(f64, usize)>> = series
        .iter()
        .map(|values| histogram_counts(values, min, max, bin_width))
        .collect();
    let y_max = binned
        .iter()
        .flatten()
        .map(|&(_, count)| count as f64)
        .fold(0.0f64, f64::max)
        .max(1.0);

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(min..max, 0.0..(y_max * 1.1))
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc("seeds")
        .draw()
        .map_err(chart_error)?;

    for (i, (scenario, counts)) in report.scenarios.iter().zip(&binned).enumerate() {
        let color = series_color(i);
        chart
            .draw_series(counts.iter().map(|&(start, count)| {
                Rectangle::new(
                    [(start, 0.0), (start + bin_width, count as f64)],
                    color.mix(0.5).filled(),
                )
            }))
            .map_err(chart_error)?
            .label(scenario.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(chart_error)?;
    Ok(())
}

/// Inequality on x, welfare on y, one point per seed
fn draw_scatter<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    report: &WelfareReport,
    gini: &[Vec<f64>],
    consumption: &[Vec<f64>],
) -> Result<()> {
    let (x_min, x_max) = value_range(gini.iter().map(Vec::as_slice))
        .ok_or_else(|| AnalysisError::EmptySample("gini".to_string()))?;
    let (y_min, y_max) = value_range(consumption.iter().map(Vec::as_slice))
        .ok_or_else(|| AnalysisError::EmptySample("real consumption".to_string()))?;
    let x_pad = (x_max - x_min) * 0.05;
    let y_pad = (y_max - y_min) * 0.05;

    let mut chart = ChartBuilder::on(area)
        .caption("Welfare vs inequality", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            (x_min - x_pad)..(x_max + x_pad),
            (y_min - y_pad)..(y_max + y_pad),
        )
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .x_desc("Gini")
        .y_desc("real consumption per capita")
        .draw()
        .map_err(chart_error)?;

    for (i, scenario) in report.scenarios.iter().enumerate() {
        let color = series_color(i);
        let points = scatter_points(&gini[i], &consumption[i]);
        chart
            .draw_series(
                points
                    .into_iter()
                    .map(|(x, y)| Circle::new((x, y), 3, color.mix(0.6).filled())),
            )
            .map_err(chart_error)?
            .label(scenario.label.as_str())
            .legend(move |(x, y)| Circle::new((x + 5, y), 3, color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(chart_error)?;
    Ok(())
}

/// `(gini, real consumption)` pairs of one scenario
fn scatter_points(gini: &[f64], consumption: &[f64]) -> Vec<(f64, f64)> {
    gini.iter().copied().zip(consumption.iter().copied()).collect()
}

fn draw_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    report: &WelfareReport,
) -> Result<()> {
    let values: Vec<[f64; 4]> = report.scenarios.iter().map(bar_values).collect();
    let y_max = values
        .iter()
        .flatten()
        .copied()
        .fold(0.0f64, f64::max)
        .max(1.0);

    let groups = BAR_METRICS.len() as f64;
    let bar_width = 0.8 / report.scenarios.len() as f64;

    let mut chart = ChartBuilder::on(area)
        .caption("Scenario comparison", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..groups, 0.0..(y_max * 1.15))
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(BAR_METRICS.len() * 2 + 1)
        .x_label_formatter(&|x| {
            let offset = x - x.floor();
            if (offset - 0.5).abs() < 1e-6 {
                BAR_METRICS
                    .get(x.floor() as usize)
                    .map(|name| name.to_string())
                    .unwrap_or_default()
            } else {
                String::new()
            }
        })
        .y_desc("scaled value")
        .draw()
        .map_err(chart_error)?;

    for (i, (scenario, vals)) in report.scenarios.iter().zip(&values).enumerate() {
        let color = series_color(i);
        chart
            .draw_series(vals.iter().enumerate().map(|(g, &v)| {
                let x0 = g as f64 + 0.1 + i as f64 * bar_width;
                Rectangle::new([(x0, 0.0), (x0 + bar_width, v)], color.mix(0.8).filled())
            }))
            .map_err(chart_error)?
            .label(scenario.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
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
    use crate::core::config::{Scenario, WelfareConfig};
    use crate::core::types::SeedRecord;
    use crate::welfare::calculator::WelfareCalculator;

    #[test]
    fn test_bar_values_scaling() {
        let calc = WelfareCalculator::new(WelfareConfig::default()).unwrap();
        let seeds = vec![SeedRecord::new(0.05, 4000.0, 1.0).with_adoption(0.6)];
        let scenario = Scenario::new("BDP=2000", "baseline_terminal.csv", 2000.0);
        let welfare = ScenarioWelfare::compute(&calc, &scenario, &seeds).unwrap();

        let [cons, gini, adoption, unemployment] = bar_values(&welfare);
        assert!((cons - 4.756).abs() < 1e-9);
        assert!((gini - welfare.gini.mean * 10.0).abs() < 1e-12);
        assert!((adoption - 6.0).abs() < 1e-9);
        assert!((unemployment - 0.5).abs() < 1e-9);
    }

    fn report() -> WelfareReport {
        let calc = WelfareCalculator::new(WelfareConfig::default()).unwrap();
        let scenarios = [
            Scenario::new("BDP=0", "nobdp_terminal.csv", 0.0),
            Scenario::new("BDP=2000", "baseline_terminal.csv", 2000.0),
        ]
        .iter()
        .enumerate()
        .map(|(i, scenario)| {
            let seeds: Vec<SeedRecord> = (0..12)
                .map(|s| {
                    let u = 0.04 + 0.01 * (s % 4) as f64 + 0.02 * i as f64;
                    SeedRecord::new(u, 3800.0 + 40.0 * s as f64, 1.0 + 0.01 * s as f64)
                        .with_adoption(0.3 + 0.04 * s as f64)
                })
                .collect();
            ScenarioWelfare::compute(&calc, scenario, &seeds).unwrap()
        })
        .collect();
        WelfareReport { scenarios }
    }

    #[test]
    fn test_scatter_puts_gini_on_x() {
        let report = report();
        let s = &report.scenarios[1];
        let points = scatter_points(&s.gini_values(), &s.real_consumption_values());
        assert_eq!(points.len(), s.n_seeds());
        assert_eq!(points[0].0, s.records[0].gini);
        assert_eq!(points[0].1, s.records[0].real_consumption);
    }

    #[test]
    fn test_empty_report_is_rejected() {
        let report = WelfareReport { scenarios: vec![] };
        let err = render_welfare_panel(Path::new("unused.png"), &report, &ChartConfig::default())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::EmptySample(_)));
    }

    #[test]
    fn test_renders_png() {
        let dir = std::env::temp_dir().join(format!("mc_welfare_panel_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("welfare_panel.png");

        render_welfare_panel(&path, &report(), &ChartConfig::default()).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);

        std::fs::remove_dir_all(&dir).ok();
    }
}
