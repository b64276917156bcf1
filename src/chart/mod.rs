//! PNG figures of the welfare comparison, the scenario profiles,
//! adoption modality and the BDP sweep

pub mod bifurcation;
pub mod modality;
pub mod profile;
pub mod response;
pub mod timeseries;
pub mod welfare_panel;

pub use bifurcation::render_bifurcation;
pub use modality::render_modality;
pub use profile::render_adoption_profile;
pub use response::render_response;
pub use timeseries::{render_confidence_panel, render_sector_timeseries};
pub use welfare_panel::render_welfare_panel;

use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

use crate::core::error::{AnalysisError, Result};

type Chart2d<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Dash count of reference lines
const DASHES: usize = 24;

/// Scenario colours, cycled when there are more scenarios than entries
pub const SERIES_COLORS: [RGBColor; 4] = [
    RGBColor(0xF4, 0x43, 0x36),
    RGBColor(0x4C, 0xAF, 0x50),
    RGBColor(0x21, 0x96, 0xF3),
    RGBColor(0xFF, 0x98, 0x00),
];

pub fn series_color(index: usize) -> RGBColor {
    SERIES_COLORS[index % SERIES_COLORS.len()]
}

pub(crate) fn chart_error<E: std::fmt::Display>(err: E) -> AnalysisError {
    AnalysisError::Chart(err.to_string())
}

/// Outline of the area between `lower` and `upper` along `xs`
pub fn band_polygon(xs: &[f64], lower: &[f64], upper: &[f64]) -> Vec<(f64, f64)> {
    let n = xs.len().min(lower.len()).min(upper.len());
    let mut outline = Vec::with_capacity(2 * n);
    outline.extend((0..n).map(|i| (xs[i], upper[i])));
    outline.extend((0..n).rev().map(|i| (xs[i], lower[i])));
    outline
}

/// Every other piece of the segment `from -> to` cut into `2 * dashes` pieces
pub fn dashed_segments(from: (f64, f64), to: (f64, f64), dashes: usize) -> Vec<[(f64, f64); 2]> {
    let pieces = (2 * dashes.max(1)) as f64;
    let at = |t: f64| (from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t);
    (0..dashes.max(1))
        .map(|i| {
            let t = 2.0 * i as f64 / pieces;
            [at(t), at(t + 1.0 / pieces)]
        })
        .collect()
}

/// Whisker from `y - err` to `y + err` with horizontal caps `cap` wide
pub fn error_bar(x: f64, y: f64, err: f64, cap: f64) -> [Vec<(f64, f64)>; 3] {
    let (lo, hi) = (y - err, y + err);
    let half = cap / 2.0;
    [
        vec![(x, lo), (x, hi)],
        vec![(x - half, lo), (x + half, lo)],
        vec![(x - half, hi), (x + half, hi)],
    ]
}

pub(crate) fn draw_dashed<DB: DrawingBackend>(
    chart: &mut Chart2d<'_, DB>,
    from: (f64, f64),
    to: (f64, f64),
    style: ShapeStyle,
) -> Result<()> {
    chart
        .draw_series(
            dashed_segments(from, to, DASHES)
                .into_iter()
                .map(|segment| PathElement::new(segment.to_vec(), style)),
        )
        .map_err(chart_error)?;
    Ok(())
}

pub(crate) fn draw_error_bars<DB: DrawingBackend>(
    chart: &mut Chart2d<'_, DB>,
    bars: &[(f64, f64, f64)],
    cap: f64,
    style: ShapeStyle,
) -> Result<()> {
    chart
        .draw_series(
            bars.iter()
                .flat_map(|&(x, y, err)| error_bar(x, y, err, cap))
                .map(|path| PathElement::new(path, style)),
        )
        .map_err(chart_error)?;
    Ok(())
}

/// `(lo, hi)` widened by `frac` of its span on both sides
pub fn padded(range: (f64, f64), frac: f64) -> (f64, f64) {
    let pad = (range.1 - range.0) * frac;
    (range.0 - pad, range.1 + pad)
}

/// Bin `values` into equal-width bins covering `[min, max]`.
///
/// Returns `(bin_start, count)` per bin. Values outside the range are
/// dropped; `max` itself falls into the last bin.
pub fn histogram_counts(values: &[f64], min: f64, max: f64, bin_width: f64) -> Vec<(f64, usize)> {
    if bin_width <= 0.0 || max < min {
        return Vec::new();
    }
    let bins = ((max - min) / bin_width).ceil().max(1.0) as usize;
    let mut counts = vec![0usize; bins];
    for &value in values {
        if value < min || value > max {
            continue;
        }
        let idx = (((value - min) / bin_width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| (min + i as f64 * bin_width, count))
        .collect()
}

/// Smallest and largest value across all series, widened when they coincide
pub fn value_range<'a, I>(series: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = &'a [f64]>,
{
    let (lo, hi) = series
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return None;
    }
    if hi - lo < f64::EPSILON * lo.abs().max(1.0) {
        let pad = (lo.abs() * 0.01).max(0.5);
        return Some((lo - pad, hi + pad));
    }
    Some((lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_counts_basic() {
        let counts = histogram_counts(&[0.0, 0.5, 1.0, 1.5, 2.0], 0.0, 2.0, 1.0);
        assert_eq!(counts, vec![(0.0, 2), (1.0, 3)]);
    }

    #[test]
    fn test_histogram_drops_out_of_range() {
        let counts = histogram_counts(&[-1.0, 0.2, 3.5], 0.0, 2.0, 0.5);
        assert_eq!(counts.len(), 4);
        assert_eq!(counts.iter().map(|(_, c)| c).sum::<usize>(), 1);
    }

    #[test]
    fn test_histogram_rejects_bad_width() {
        assert!(histogram_counts(&[1.0], 0.0, 2.0, 0.0).is_empty());
        assert!(histogram_counts(&[1.0], 2.0, 0.0, 0.5).is_empty());
    }

    #[test]
    fn test_value_range() {
        let a = [3.0, 1.0];
        let b = [7.0];
        assert_eq!(value_range([&a[..], &b[..]]), Some((1.0, 7.0)));
        assert_eq!(value_range(std::iter::empty::<&[f64]>()), None);
    }

    #[test]
    fn test_value_range_widens_constant_series() {
        let a = [2000.0, 2000.0];
        let (lo, hi) = value_range([&a[..]]).unwrap();
        assert!(lo < 2000.0 && hi > 2000.0);
    }

    #[test]
    fn test_band_polygon_closes_around_band() {
        let outline = band_polygon(&[1.0, 2.0, 3.0], &[0.0, 1.0, 2.0], &[5.0, 6.0, 7.0]);
        assert_eq!(
            outline,
            vec![(1.0, 5.0), (2.0, 6.0), (3.0, 7.0), (3.0, 2.0), (2.0, 1.0), (1.0, 0.0)]
        );
    }

    #[test]
    fn test_dashed_segments_alternate() {
        let dashes = dashed_segments((30.0, 0.0), (30.0, 8.0), 2);
        assert_eq!(
            dashes,
            vec![[(30.0, 0.0), (30.0, 2.0)], [(30.0, 4.0), (30.0, 6.0)]]
        );
    }

    #[test]
    fn test_error_bar_shape() {
        let [stem, low_cap, high_cap] = error_bar(2000.0, 50.0, 10.0, 100.0);
        assert_eq!(stem, vec![(2000.0, 40.0), (2000.0, 60.0)]);
        assert_eq!(low_cap, vec![(1950.0, 40.0), (2050.0, 40.0)]);
        assert_eq!(high_cap, vec![(1950.0, 60.0), (2050.0, 60.0)]);
    }

    #[test]
    fn test_padded() {
        assert_eq!(padded((0.0, 10.0), 0.1), (-1.0, 11.0));
    }

    #[test]
    fn test_series_colors_cycle() {
        let (a, b) = (series_color(1), series_color(SERIES_COLORS.len() + 1));
        assert_eq!((a.0, a.1, a.2), (b.0, b.1, b.2));
    }
}
