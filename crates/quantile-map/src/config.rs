//! Configuration for quantile shifting.

use crate::error::QuantileMapError;

/// Root-finding strategy used to invert the target CDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InversionMethod {
    /// One Newton step seeded by linear interpolation inside the bracketing
    /// knot interval, falling back to bisection when the step is unusable.
    #[default]
    Newton,
    /// Fixed-iteration bisection followed by a linear correction.
    Bisection,
}

/// Configuration for a [`QuantileShifter`](crate::QuantileShifter).
///
/// Use the builder methods to customise parameters.
///
/// # Example
///
/// ```
/// use qmap_quantile_map::{InversionMethod, ShifterConfig};
///
/// let config = ShifterConfig::new()
///     .with_method(InversionMethod::Bisection)
///     .with_tail_threshold(0.01);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ShifterConfig {
    method: InversionMethod,
    tail_threshold: f64,
}

impl ShifterConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: `method = Newton`, `tail_threshold = 0.0` (tail
    /// linearization disabled).
    pub fn new() -> Self {
        Self {
            method: InversionMethod::Newton,
            tail_threshold: 0.0,
        }
    }

    // --- Builder methods ---

    /// Sets the inversion method.
    pub fn with_method(mut self, method: InversionMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the tail-linearization threshold.
    ///
    /// Source probabilities below `t` or above `1 - t` are mapped by linear
    /// interpolation between knots instead of spline inversion.
    pub fn with_tail_threshold(mut self, t: f64) -> Self {
        self.tail_threshold = t;
        self
    }

    // --- Accessors ---

    /// Returns the inversion method.
    pub fn method(&self) -> InversionMethod {
        self.method
    }

    /// Returns the tail-linearization threshold.
    pub fn tail_threshold(&self) -> f64 {
        self.tail_threshold
    }

    /// Validates this configuration.
    ///
    /// Checks that `tail_threshold` is finite and in `[0, 0.5]`.
    pub fn validate(&self) -> Result<(), QuantileMapError> {
        validate_tail_threshold(self.tail_threshold)
    }
}

impl Default for ShifterConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn validate_tail_threshold(t: f64) -> Result<(), QuantileMapError> {
    if !t.is_finite() || !(0.0..=0.5).contains(&t) {
        return Err(QuantileMapError::InvalidConfig {
            reason: format!("tail_threshold must be finite and in [0, 0.5], got {t}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ShifterConfig::new();
        assert_eq!(cfg.method(), InversionMethod::Newton);
        assert_eq!(cfg.tail_threshold(), 0.0);
    }

    #[test]
    fn builder_chaining() {
        let cfg = ShifterConfig::new()
            .with_method(InversionMethod::Bisection)
            .with_tail_threshold(0.05);
        assert_eq!(cfg.method(), InversionMethod::Bisection);
        assert!((cfg.tail_threshold() - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn validate_ok() {
        assert!(ShifterConfig::new().validate().is_ok());
        assert!(
            ShifterConfig::new()
                .with_tail_threshold(0.5)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn validate_negative_threshold() {
        let err = ShifterConfig::new()
            .with_tail_threshold(-0.1)
            .validate()
            .unwrap_err();
        assert!(matches!(err, QuantileMapError::InvalidConfig { .. }));
    }

    #[test]
    fn validate_threshold_above_half() {
        assert!(
            ShifterConfig::new()
                .with_tail_threshold(0.6)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn validate_nan_threshold() {
        assert!(
            ShifterConfig::new()
                .with_tail_threshold(f64::NAN)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn default_trait() {
        assert_eq!(ShifterConfig::default(), ShifterConfig::new());
    }
}
