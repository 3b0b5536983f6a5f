//! Mapping values from a source distribution onto a target distribution.

use std::fmt;
use std::sync::Arc;

use qmap_spline::MonotoneCurve;
use tracing::debug;

use crate::cdf::CdfCurve;
use crate::config::{ShifterConfig, validate_tail_threshold};
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::error::QuantileMapError;
use crate::invert::invert;

/// Maps values so that their rank under the source CDF is preserved under
/// the target CDF.
///
/// Holds shared, read-only references to both curves; a shifter is cheap to
/// clone and safe to share across threads.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use qmap_quantile_map::{Histogram, QuantileShifter, ShifterConfig, TracingSink, build_cdf};
///
/// let hist = Histogram::uniform(0.0, 4.0, vec![10.0, 20.0, 20.0, 10.0]).unwrap();
/// let cdf = Arc::new(build_cdf(&hist, "mc", &TracingSink).unwrap());
/// let shifter = QuantileShifter::new(cdf.clone(), cdf, ShifterConfig::new()).unwrap();
///
/// assert_eq!(shifter.shift(2.0), 2.0);
/// assert_eq!(shifter.shift(9.0), 9.0); // outside the source domain
/// ```
#[derive(Clone)]
pub struct QuantileShifter<C = CdfCurve> {
    source: Arc<C>,
    target: Arc<C>,
    config: ShifterConfig,
    sink: Arc<dyn DiagnosticSink>,
}

impl<C: MonotoneCurve> QuantileShifter<C> {
    /// Creates a shifter reporting diagnostics through [`TracingSink`].
    ///
    /// # Errors
    ///
    /// Returns [`QuantileMapError::InvalidConfig`] if the tail threshold is
    /// not finite or outside `[0, 0.5]`.
    pub fn new(source: Arc<C>, target: Arc<C>, config: ShifterConfig) -> Result<Self, QuantileMapError> {
        config.validate()?;
        debug!(
            method = ?config.method(),
            tail_threshold = config.tail_threshold(),
            "quantile shifter configured"
        );
        Ok(Self {
            source,
            target,
            config,
            sink: Arc::new(TracingSink),
        })
    }

    /// Replaces the diagnostics sink.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Source curve.
    pub fn source(&self) -> &C {
        &self.source
    }

    /// Target curve.
    pub fn target(&self) -> &C {
        &self.target
    }

    /// Shifter configuration.
    pub fn config(&self) -> &ShifterConfig {
        &self.config
    }

    /// Source domain `[x_min, x_max]`; values outside it pass through.
    pub fn domain(&self) -> (f64, f64) {
        (self.source.x_min(), self.source.x_max())
    }

    /// Maps `value` using the configured tail threshold.
    pub fn shift(&self, value: f64) -> f64 {
        self.shift_impl(value, self.config.tail_threshold())
    }

    /// Maps `value` with a per-call tail threshold.
    ///
    /// # Errors
    ///
    /// Returns [`QuantileMapError::InvalidConfig`] if `tail_threshold` is not
    /// finite or outside `[0, 0.5]`.
    pub fn shift_with_threshold(&self, value: f64, tail_threshold: f64) -> Result<f64, QuantileMapError> {
        validate_tail_threshold(tail_threshold)?;
        Ok(self.shift_impl(value, tail_threshold))
    }

    /// Maps every value in `values`.
    pub fn shift_all(&self, values: &[f64]) -> Vec<f64> {
        let t = self.config.tail_threshold();
        values.iter().map(|&v| self.shift_impl(v, t)).collect()
    }

    fn shift_impl(&self, value: f64, tail_threshold: f64) -> f64 {
        let (lower, upper) = self.domain();
        if !(lower..=upper).contains(&value) {
            self.sink.report(Diagnostic::OutOfDomain {
                value,
                lower,
                upper,
            });
            return value;
        }

        let p = self.source.evaluate(value).clamp(0.0, 1.0);
        if tail_threshold > 0.0 && (p < tail_threshold || p > 1.0 - tail_threshold) {
            return self.shift_tail(value);
        }
        invert(&*self.target, p, self.config.method(), &*self.sink)
    }

    /// Piecewise-linear mapping through the knots of both curves.
    fn shift_tail(&self, value: f64) -> f64 {
        let source = &*self.source;
        let target = &*self.target;

        let k = source.find_interval_by_x(value);
        if k >= source.knot_count() - 1 {
            return target.x_max();
        }
        let (lo, hi) = (source.knot(k), source.knot(k + 1));
        let p = lo.y + (value - lo.x) * (hi.y - lo.y) / (hi.x - lo.x);

        let j = target.find_interval_by_y(p);
        let (lo, hi) = (target.knot(j), target.knot(j + 1));
        if lo.y == hi.y {
            return lo.x;
        }
        lo.x + (p - lo.y) / (hi.y - lo.y) * (hi.x - lo.x)
    }
}

impl<C: fmt::Debug> fmt::Debug for QuantileShifter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuantileShifter")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
