//! Mean and 90% bands over simulated months

use std::path::Path;

use plotters::prelude::*;

use super::{band_polygon, chart_error, draw_dashed, padded, series_color, value_range};
use crate::core::config::ChartConfig;
use crate::core::error::{AnalysisError, Result};
use crate::data::timeseries::{Band, TimeseriesTable};

const SHOCK_COLOR: RGBColor = RGBColor(0x80, 0x80, 0x80);

/// Column prefix, caption, unit, multiplier, zero reference line
const PANEL_METRICS: [(&str, &str, &str, f64, bool); 6] = [
    ("Inflation", "Inflation (annual)", "%", 100.0, true),
    ("Unemployment", "Unemployment", "%", 100.0, false),
    ("TotalAdoption", "Technology adoption", "%", 100.0, false),
    ("ExRate", "Exchange rate", "PLN/EUR", 1.0, false),
    ("MarketWage", "Market wage", "PLN/month", 1.0, false),
    ("GovDebt", "Public debt", "bn PLN", 1e-9, false),
];

/// Sector column prefix, label, colour
const SECTOR_SERIES: [(&str, &str, RGBColor); 4] = [
    ("BPO_Auto", "BPO/SSC", RGBColor(0xE9, 0x1E, 0x63)),
    ("Manuf_Auto", "Manufacturing", RGBColor(0xFF, 0x98, 0x00)),
    ("Retail_Auto", "Retail/Services", RGBColor(0x00, 0xBC, 0xD4)),
    ("Health_Auto", "Healthcare", RGBColor(0x79, 0x55, 0x48)),
];

struct BandSeries {
    label: String,
    color: RGBColor,
    months: Vec<f64>,
    band: Band,
}

struct BandPanel<'a> {
    caption: &'a str,
    y_desc: &'a str,
    /// Fixed axis; derived from the bands when `None`
    y_range: Option<(f64, f64)>,
    zero_line: bool,
    /// Legend entry for the shock line
    shock_label: Option<String>,
}

fn months_range(series: &[BandSeries]) -> Option<(f64, f64)> {
    value_range(series.iter().map(|s| s.months.as_slice()))
}

/// Six macro panels, one line and band per scenario
pub fn render_confidence_panel(
    path: &Path,
    scenarios: &[(String, TimeseriesTable)],
    charts: &ChartConfig,
) -> Result<()> {
    if scenarios.is_empty() {
        return Err(AnalysisError::EmptySample("confidence panel".to_string()));
    }

    let root = BitMapBackend::new(path, (1800, 1000)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;
    let panels = root.split_evenly((2, 3));

    for (area, &(metric, caption, unit, factor, zero_line)) in panels.iter().zip(&PANEL_METRICS)
    {
        let mut series = Vec::new();
        for (i, (label, table)) in scenarios.iter().enumerate() {
            if !table.has_metric(metric) {
                tracing::debug!("{}: no {} band, skipped", label, metric);
                continue;
            }
            series.push(BandSeries {
                label: label.clone(),
                color: series_color(i),
                months: table.months()?,
                band: table.band(metric, factor)?,
            });
        }

        if series.is_empty() {
            tracing::warn!("No scenario has a {} band; panel left empty", metric);
            continue;
        }

        let panel = BandPanel {
            caption,
            y_desc: unit,
            y_range: None,
            zero_line,
            shock_label: None,
        };
        draw_band_panel(area, &panel, &series, charts.shock_month)?;
    }

    root.present().map_err(chart_error)?;
    tracing::info!("Saved {}", path.display());
    Ok(())
}

/// Sector adoption bands of a single scenario
pub fn render_sector_timeseries(
    path: &Path,
    label: &str,
    table: &TimeseriesTable,
    charts: &ChartConfig,
) -> Result<()> {
    let mut series = Vec::new();
    for (metric, name, color) in SECTOR_SERIES {
        if !table.has_metric(metric) {
            tracing::debug!("{}: no {} band, skipped", label, metric);
            continue;
        }
        series.push(BandSeries {
            label: name.to_string(),
            color,
            months: table.months()?,
            band: table.band(metric, 100.0)?,
        });
    }
    if series.is_empty() {
        return Err(AnalysisError::EmptySample(format!(
            "{}: no sector bands",
            label
        )));
    }

    let root = BitMapBackend::new(path, (1000, 650)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let caption = format!("Sector adoption, {} (bands = 90% CI)", label);
    let panel = BandPanel {
        caption: &caption,
        y_desc: "technology adoption (%)",
        y_range: Some((0.0, 100.0)),
        zero_line: false,
        shock_label: Some(format!("BDP shock (M{})", charts.shock_month)),
    };
    draw_band_panel(&root, &panel, &series, charts.shock_month)?;

    root.present().map_err(chart_error)?;
    tracing::info!("Saved {}", path.display());
    Ok(())
}

fn draw_band_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    panel: &BandPanel<'_>,
    series: &[BandSeries],
    shock_month: f64,
) -> Result<()> {
    let (x_min, x_max) = months_range(series)
        .ok_or_else(|| AnalysisError::EmptySample(panel.caption.to_string()))?;
    let (y_min, y_max) = match panel.y_range {
        Some(range) => range,
        None => {
            let extent = series
                .iter()
                .filter_map(|s| s.band.extent())
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (a, b)| {
                    (lo.min(a), hi.max(b))
                });
            let means = value_range(series.iter().map(|s| s.band.mean.as_slice()))
                .ok_or_else(|| AnalysisError::EmptySample(panel.caption.to_string()))?;
            padded((extent.0.min(means.0), extent.1.max(means.1)), 0.05)
        }
    };

    let mut chart = ChartBuilder::on(area)
        .caption(panel.caption, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .x_desc("month")
        .y_desc(panel.y_desc)
        .draw()
        .map_err(chart_error)?;

    for s in series {
        let color = s.color;
        chart
            .draw_series(std::iter::once(Polygon::new(
                band_polygon(&s.months, &s.band.p05, &s.band.p95),
                color.mix(0.15).filled(),
            )))
            .map_err(chart_error)?;
        chart
            .draw_series(LineSeries::new(
                s.months.iter().copied().zip(s.band.mean.iter().copied()),
                color.stroke_width(2),
            ))
            .map_err(chart_error)?
            .label(s.label.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    if panel.zero_line && y_min < 0.0 && y_max > 0.0 {
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(x_min, 0.0), (x_max, 0.0)],
                BLACK.mix(0.4),
            )))
            .map_err(chart_error)?;
    }

    if shock_month >= x_min && shock_month <= x_max {
        draw_dashed(
            &mut chart,
            (shock_month, y_min),
            (shock_month, y_max),
            SHOCK_COLOR.stroke_width(1),
        )?;
        if let Some(label) = &panel.shock_label {
            chart
                .draw_series(std::iter::empty::<PathElement<(f64, f64)>>())
                .map_err(chart_error)?
                .label(label.as_str())
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], SHOCK_COLOR));
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
