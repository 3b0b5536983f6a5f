//! Sampled views of a transformation for visual inspection.

use qmap_spline::MonotoneCurve;

use crate::error::QuantileMapError;
use crate::shift::QuantileShifter;

/// Default number of points in a transformation scan.
pub const DEFAULT_SCAN_POINTS: usize = 101;

/// Default number of bins in an event-density profile.
pub const DEFAULT_DENSITY_BINS: usize = 40;

/// One sample of a transformation scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanPoint {
    /// Input value.
    pub input: f64,
    /// Shifted value.
    pub output: f64,
}

impl ScanPoint {
    /// `output - input`.
    pub fn delta(&self) -> f64 {
        self.output - self.input
    }
}

/// Expected event density at a bin centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityBin {
    /// Bin centre.
    pub center: f64,
    /// CDF slope at the centre.
    pub density: f64,
}

/// Intersects an optional user range with the domain of `curve`.
///
/// # Errors
///
/// Returns [`QuantileMapError::InvalidConfig`] if the clipped range is empty.
pub fn scan_range<C: MonotoneCurve + ?Sized>(
    curve: &C,
    x_min: Option<f64>,
    x_max: Option<f64>,
) -> Result<(f64, f64), QuantileMapError> {
    let lo = x_min.map_or(curve.x_min(), |v| v.max(curve.x_min()));
    let hi = x_max.map_or(curve.x_max(), |v| v.min(curve.x_max()));
    if lo >= hi {
        return Err(QuantileMapError::InvalidConfig {
            reason: format!(
                "scan range [{lo}, {hi}] is empty within the domain [{}, {}]",
                curve.x_min(),
                curve.x_max()
            ),
        });
    }
    Ok((lo, hi))
}

/// Evaluates `shifter` at `n_points` evenly spaced inputs across `range`,
/// both ends included.
pub fn scan_transformation<C: MonotoneCurve>(
    shifter: &QuantileShifter<C>,
    range: (f64, f64),
    n_points: usize,
) -> Vec<ScanPoint> {
    linspace(range, n_points)
        .map(|input| ScanPoint {
            input,
            output: shifter.shift(input),
        })
        .collect()
}

/// Slope of `curve` at the centres of `n_bins` equal bins across `range`.
pub fn event_density<C: MonotoneCurve + ?Sized>(
    curve: &C,
    range: (f64, f64),
    n_bins: usize,
) -> Vec<DensityBin> {
    let (lo, hi) = range;
    let width = (hi - lo) / n_bins as f64;
    (0..n_bins)
        .map(|i| {
            let center = lo + (i as f64 + 0.5) * width;
            DensityBin {
                center,
                density: curve.derivative(center),
            }
        })
        .collect()
}

fn linspace((lo, hi): (f64, f64), n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 { (hi - lo) / (n - 1) as f64 } else { 0.0 };
    (0..n).map(move |i| if i + 1 == n && n > 1 { hi } else { lo + i as f64 * step })
}
