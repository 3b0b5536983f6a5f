//! Cumulative distribution curves built from histograms.

use qmap_spline::{ClampedCubicSpline, Knot, MonotoneCurve};
use tracing::debug;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::QuantileMapError;
use crate::histogram::Histogram;

/// Number of evenly spaced points sampled by the regularity check.
pub const REGULARITY_SAMPLES: usize = 1000;

/// A named, normalised CDF curve.
///
/// Knot `i` sits at the right edge of bin `i` (knot 0 at the first left
/// edge) with the cumulative fraction of counts up to that edge, so the curve
/// runs from exactly 0 to exactly 1. Between knots it is a clamped cubic
/// spline with zero slope at both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct CdfCurve {
    name: String,
    spline: ClampedCubicSpline,
}

impl CdfCurve {
    /// Wraps an already fitted spline, for example one loaded from disk.
    pub fn from_spline(name: impl Into<String>, spline: ClampedCubicSpline) -> Self {
        Self {
            name: name.into(),
            spline,
        }
    }

    /// Identifying name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying spline.
    pub fn spline(&self) -> &ClampedCubicSpline {
        &self.spline
    }

    /// Samples the curve and counts irregular points.
    pub fn regularity(&self) -> RegularityReport {
        check_regularity(self, REGULARITY_SAMPLES)
    }
}

impl MonotoneCurve for CdfCurve {
    fn evaluate(&self, x: f64) -> f64 {
        self.spline.evaluate(x)
    }

    fn derivative(&self, x: f64) -> f64 {
        self.spline.derivative(x)
    }

    fn knot_count(&self) -> usize {
        self.spline.knot_count()
    }

    fn knot(&self, index: usize) -> Knot {
        self.spline.knot(index)
    }

    fn find_interval_by_x(&self, x: f64) -> usize {
        self.spline.find_interval_by_x(x)
    }

    fn find_interval_by_y(&self, y: f64) -> usize {
        self.spline.find_interval_by_y(y)
    }
}

/// Outcome of sampling a curve for monotonicity and range violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegularityReport {
    /// Number of sample points.
    pub n_samples: usize,
    /// Samples whose value lies outside `[0, 1]`.
    pub n_out_of_range: usize,
    /// Samples with a negative derivative.
    pub n_negative_derivative: usize,
}

impl RegularityReport {
    /// Out-of-range samples in permille.
    pub fn out_of_range_permille(&self) -> f64 {
        permille(self.n_out_of_range, self.n_samples)
    }

    /// Negative-derivative samples in permille.
    pub fn negative_derivative_permille(&self) -> f64 {
        permille(self.n_negative_derivative, self.n_samples)
    }

    /// Returns `true` if no sample was flagged.
    pub fn is_regular(&self) -> bool {
        self.n_out_of_range == 0 && self.n_negative_derivative == 0
    }
}

fn permille(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 1000.0 / total as f64
    }
}

/// Samples `curve` at the midpoints of `n_samples` equal sub-intervals of
/// its domain.
pub fn check_regularity<C: MonotoneCurve + ?Sized>(curve: &C, n_samples: usize) -> RegularityReport {
    let lo = curve.x_min();
    let step = (curve.x_max() - lo) / n_samples as f64;

    let mut report = RegularityReport {
        n_samples,
        n_out_of_range: 0,
        n_negative_derivative: 0,
    };
    for i in 0..n_samples {
        let x = lo + (i as f64 + 0.5) * step;
        let y = curve.evaluate(x);
        if !(0.0..=1.0).contains(&y) {
            report.n_out_of_range += 1;
        }
        if curve.derivative(x) < 0.0 {
            report.n_negative_derivative += 1;
        }
    }
    report
}

/// Knot coordinates of the normalised CDF of `histogram`.
///
/// # Errors
///
/// Returns [`QuantileMapError::DegenerateDistribution`] if the total count is
/// zero.
pub fn cdf_knots(histogram: &Histogram, name: &str) -> Result<(Vec<f64>, Vec<f64>), QuantileMapError> {
    let xs = histogram.edges().to_vec();

    let mut ys = Vec::with_capacity(xs.len());
    let mut running = 0.0;
    ys.push(running);
    for &count in histogram.counts() {
        running += count;
        ys.push(running);
    }

    let total = running;
    if total <= 0.0 {
        return Err(QuantileMapError::DegenerateDistribution {
            name: name.to_string(),
        });
    }
    for y in &mut ys {
        *y /= total;
    }
    Ok((xs, ys))
}

/// Builds the CDF curve of `histogram`.
///
/// After fitting, the curve is sampled at [`REGULARITY_SAMPLES`] points;
/// values outside `[0, 1]` and negative slopes are reported to `sink` as
/// warnings, but the curve is returned either way.
///
/// # Errors
///
/// - [`QuantileMapError::DegenerateDistribution`] if all counts are zero.
/// - [`QuantileMapError::Spline`] if the spline cannot be fitted.
///
/// # Example
///
/// ```
/// use qmap_quantile_map::{Histogram, MonotoneCurve, TracingSink, build_cdf};
///
/// let hist = Histogram::uniform(0.0, 4.0, vec![10.0, 20.0, 20.0, 10.0]).unwrap();
/// let cdf = build_cdf(&hist, "example", &TracingSink).unwrap();
/// assert_eq!(cdf.evaluate(0.0), 0.0);
/// assert_eq!(cdf.evaluate(4.0), 1.0);
/// assert_eq!(cdf.evaluate(2.0), 0.5);
/// ```
pub fn build_cdf(
    histogram: &Histogram,
    name: &str,
    sink: &dyn DiagnosticSink,
) -> Result<CdfCurve, QuantileMapError> {
    build_cdf_with_report(histogram, name, sink).map(|(curve, _)| curve)
}

/// Like [`build_cdf`], also returning the regularity report computed while
/// building.
///
/// # Errors
///
/// Same as [`build_cdf`].
#[tracing::instrument(skip(histogram, sink), fields(n_bins = histogram.n_bins()))]
pub fn build_cdf_with_report(
    histogram: &Histogram,
    name: &str,
    sink: &dyn DiagnosticSink,
) -> Result<(CdfCurve, RegularityReport), QuantileMapError> {
    let (xs, ys) = cdf_knots(histogram, name)?;
    debug!(?xs, ?ys, "CDF knots");

    let spline = ClampedCubicSpline::flat_ends(&xs, &ys)?;
    let curve = CdfCurve::from_spline(name, spline);

    let report = curve.regularity();
    if report.n_out_of_range > 0 {
        sink.report(Diagnostic::CurveOutOfRange {
            curve: name.to_string(),
            permille: report.out_of_range_permille(),
        });
    }
    if report.n_negative_derivative > 0 {
        sink.report(Diagnostic::NegativeDerivative {
            curve: name.to_string(),
            permille: report.negative_derivative_permille(),
        });
    }
    debug!(?report, "regularity check");

    Ok((curve, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use approx::assert_relative_eq;

    fn hist(counts: &[f64]) -> Histogram {
        Histogram::uniform(0.0, counts.len() as f64, counts.to_vec()).unwrap()
    }

    #[test]
    fn knots_of_symmetric_histogram() {
        let (xs, ys) = cdf_knots(&hist(&[10.0, 20.0, 20.0, 10.0]), "h").unwrap();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(ys[0], 0.0);
        assert_relative_eq!(ys[1], 1.0 / 6.0, epsilon = 1e-15);
        assert_eq!(ys[2], 0.5);
        assert_relative_eq!(ys[3], 5.0 / 6.0, epsilon = 1e-15);
        assert_eq!(ys[4], 1.0);
    }

    #[test]
    fn knots_are_monotone() {
        let (xs, ys) = cdf_knots(&hist(&[0.0, 3.0, 0.0, 1.0, 7.0, 0.0]), "h").unwrap();
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
        assert!(ys.windows(2).all(|w| w[0] <= w[1]));
        assert!(ys.iter().all(|y| (0.0..=1.0).contains(y)));
    }

    #[test]
    fn degenerate_histogram() {
        let err = build_cdf(&hist(&[0.0; 4]), "empty", &CollectingSink::new()).unwrap_err();
        assert_eq!(
            err,
            QuantileMapError::DegenerateDistribution {
                name: "empty".to_string()
            }
        );
    }

    #[test]
    fn endpoints_are_exact() {
        let h = Histogram::new(vec![-3.2, -1.0, 0.4, 2.9, 7.7], vec![1.0, 13.0, 2.0, 5.0]).unwrap();
        let cdf = build_cdf(&h, "h", &CollectingSink::new()).unwrap();
        assert_eq!(cdf.evaluate(-3.2), 0.0);
        assert_eq!(cdf.evaluate(7.7), 1.0);
    }

    #[test]
    fn curve_keeps_name_and_knots() {
        let cdf = build_cdf(&hist(&[1.0, 2.0, 1.0]), "mc_eta", &CollectingSink::new()).unwrap();
        assert_eq!(cdf.name(), "mc_eta");
        assert_eq!(cdf.knot_count(), 4);
        assert_eq!(cdf.knot(1), Knot::new(1.0, 0.25));
        assert_eq!(cdf.x_min(), 0.0);
        assert_eq!(cdf.x_max(), 3.0);
    }

    #[test]
    fn end_slopes_are_zero() {
        let cdf = build_cdf(&hist(&[10.0, 20.0, 20.0, 10.0]), "h", &CollectingSink::new()).unwrap();
        assert_eq!(cdf.spline().start_slope(), 0.0);
        assert_eq!(cdf.spline().end_slope(), 0.0);
        assert!(cdf.derivative(0.0).abs() < 1e-12);
        assert!(cdf.derivative(4.0).abs() < 1e-12);
    }

    #[test]
    fn smooth_histogram_is_regular_and_silent() {
        let sink = CollectingSink::new();
        let cdf = build_cdf(&hist(&[10.0, 20.0, 20.0, 10.0]), "h", &sink).unwrap();
        let report = cdf.regularity();
        assert!(report.is_regular());
        assert_eq!(report.n_samples, REGULARITY_SAMPLES);
        assert!(sink.is_empty());
    }

    #[test]
    fn flat_histogram_is_regular() {
        let report = build_cdf(&hist(&[1.0; 4]), "h", &CollectingSink::new())
            .unwrap()
            .regularity();
        assert!(report.is_regular());
    }

    #[test]
    fn spike_histogram_warns_but_succeeds() {
        let sink = CollectingSink::new();
        let cdf = build_cdf(&hist(&[0.0, 0.0, 100.0, 0.0, 0.0]), "spike", &sink).unwrap();

        let report = cdf.regularity();
        assert!(report.n_out_of_range > 0);
        assert!(report.n_negative_derivative > 0);

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            Diagnostic::CurveOutOfRange {
                curve: "spike".to_string(),
                permille: report.out_of_range_permille(),
            }
        );
        assert!(matches!(
            &events[1],
            Diagnostic::NegativeDerivative { curve, .. } if curve == "spike"
        ));
    }

    #[test]
    fn returned_report_matches_resampling() {
        let sink = CollectingSink::new();
        let (cdf, report) =
            build_cdf_with_report(&hist(&[0.0, 0.0, 100.0, 0.0, 0.0]), "spike", &sink).unwrap();
        assert_eq!(report, cdf.regularity());
        assert_eq!(report.n_samples, REGULARITY_SAMPLES);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn permille_uses_sample_count() {
        let report = RegularityReport {
            n_samples: 1000,
            n_out_of_range: 25,
            n_negative_derivative: 0,
        };
        assert_eq!(report.out_of_range_permille(), 25.0);
        assert_eq!(report.negative_derivative_permille(), 0.0);
        assert!(!report.is_regular());

        let coarse = RegularityReport {
            n_samples: 10,
            n_out_of_range: 1,
            n_negative_derivative: 2,
        };
        assert_eq!(coarse.out_of_range_permille(), 100.0);
        assert_eq!(coarse.negative_derivative_permille(), 200.0);
    }

    #[test]
    fn curve_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<CdfCurve>();
    }
}
