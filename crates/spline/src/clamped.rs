//! Cubic spline with prescribed first derivatives at both boundary knots.

use crate::curve::{Knot, MonotoneCurve};
use crate::error::SplineError;

/// Cubic interpolant through a knot sequence with clamped end slopes.
///
/// The spline is stored as its knots plus the second derivative (moment) at
/// each knot. On interval `[x_i, x_{i+1}]` with `h = x_{i+1} - x_i`,
/// `A = (x_{i+1} - x) / h` and `B = (x - x_i) / h`:
///
/// ```text
/// S(x) = A·y_i + B·y_{i+1} + ((A³ - A)·m_i + (B³ - B)·m_{i+1})·h² / 6
/// ```
///
/// This form reproduces every knot value exactly, including the last one.
/// Outside `[x_0, x_n]` the boundary cubic is extrapolated.
#[derive(Debug, Clone, PartialEq)]
pub struct ClampedCubicSpline {
    knots: Vec<Knot>,
    moments: Vec<f64>,
    start_slope: f64,
    end_slope: f64,
}

impl ClampedCubicSpline {
    /// Fits a clamped spline through `(xs[i], ys[i])` with first derivative
    /// `start_slope` at the first knot and `end_slope` at the last.
    ///
    /// # Errors
    ///
    /// Returns [`SplineError`] if fewer than two knots are given, the slices
    /// differ in length, any value is non-finite, or `xs` is not strictly
    /// increasing.
    pub fn new(
        xs: &[f64],
        ys: &[f64],
        start_slope: f64,
        end_slope: f64,
    ) -> Result<Self, SplineError> {
        let knots = validate_knots(xs, ys)?;
        if !start_slope.is_finite() || !end_slope.is_finite() {
            return Err(SplineError::NonFiniteSlope {
                start: start_slope,
                end: end_slope,
            });
        }
        let moments = solve_moments(&knots, start_slope, end_slope);
        Ok(Self {
            knots,
            moments,
            start_slope,
            end_slope,
        })
    }

    /// Fits a clamped spline with zero slope at both ends.
    pub fn flat_ends(xs: &[f64], ys: &[f64]) -> Result<Self, SplineError> {
        Self::new(xs, ys, 0.0, 0.0)
    }

    /// Rebuilds a spline from previously fitted parts without re-solving.
    ///
    /// # Errors
    ///
    /// Returns [`SplineError`] on the same knot problems as [`Self::new`],
    /// or if `moments` does not hold one finite value per knot.
    pub fn from_parts(
        xs: &[f64],
        ys: &[f64],
        moments: Vec<f64>,
        start_slope: f64,
        end_slope: f64,
    ) -> Result<Self, SplineError> {
        let knots = validate_knots(xs, ys)?;
        if moments.len() != knots.len() {
            return Err(SplineError::MomentCountMismatch {
                expected: knots.len(),
                got: moments.len(),
            });
        }
        if let Some(index) = moments.iter().position(|m| !m.is_finite()) {
            return Err(SplineError::NonFiniteMoment { index });
        }
        if !start_slope.is_finite() || !end_slope.is_finite() {
            return Err(SplineError::NonFiniteSlope {
                start: start_slope,
                end: end_slope,
            });
        }
        Ok(Self {
            knots,
            moments,
            start_slope,
            end_slope,
        })
    }

    /// All knots in order.
    pub fn knots(&self) -> &[Knot] {
        &self.knots
    }

    /// Second derivative at each knot.
    pub fn moments(&self) -> &[f64] {
        &self.moments
    }

    /// Prescribed first derivative at the first knot.
    pub fn start_slope(&self) -> f64 {
        self.start_slope
    }

    /// Prescribed first derivative at the last knot.
    pub fn end_slope(&self) -> f64 {
        self.end_slope
    }

    /// Interval whose cubic is used at `x`; the last knot and anything past
    /// it use the final interval.
    fn segment(&self, x: f64) -> usize {
        self.find_interval_by_x(x).min(self.knots.len() - 2)
    }
}

impl MonotoneCurve for ClampedCubicSpline {
    fn evaluate(&self, x: f64) -> f64 {
        let i = self.segment(x);
        let (lo, hi) = (self.knots[i], self.knots[i + 1]);
        let h = hi.x - lo.x;
        let a = (hi.x - x) / h;
        let b = (x - lo.x) / h;
        a * lo.y
            + b * hi.y
            + ((a * a * a - a) * self.moments[i] + (b * b * b - b) * self.moments[i + 1]) * h * h
                / 6.0
    }

    fn derivative(&self, x: f64) -> f64 {
        let i = self.segment(x);
        let (lo, hi) = (self.knots[i], self.knots[i + 1]);
        let h = hi.x - lo.x;
        let a = (hi.x - x) / h;
        let b = (x - lo.x) / h;
        (hi.y - lo.y) / h - (3.0 * a * a - 1.0) / 6.0 * h * self.moments[i]
            + (3.0 * b * b - 1.0) / 6.0 * h * self.moments[i + 1]
    }

    fn knot_count(&self) -> usize {
        self.knots.len()
    }

    fn knot(&self, index: usize) -> Knot {
        self.knots[index]
    }
}

fn validate_knots(xs: &[f64], ys: &[f64]) -> Result<Vec<Knot>, SplineError> {
    if xs.len() != ys.len() {
        return Err(SplineError::LengthMismatch {
            xs_len: xs.len(),
            ys_len: ys.len(),
        });
    }
    if xs.len() < 2 {
        return Err(SplineError::TooFewKnots { got: xs.len() });
    }

    let mut knots = Vec::with_capacity(xs.len());
    for (index, (&x, &y)) in xs.iter().zip(ys).enumerate() {
        if !x.is_finite() || !y.is_finite() {
            return Err(SplineError::NonFiniteKnot { index });
        }
        if let Some(prev) = knots.last().map(|k: &Knot| k.x) {
            if x <= prev {
                return Err(SplineError::NonIncreasingX {
                    index,
                    previous: prev,
                    current: x,
                });
            }
        }
        knots.push(Knot::new(x, y));
    }
    Ok(knots)
}

/// Solves for the knot moments of a clamped spline.
///
/// Interior rows come from C² continuity:
///
/// ```text
/// h[i-1]·m[i-1] + 2(h[i-1] + h[i])·m[i] + h[i]·m[i+1] = 6(s[i] - s[i-1])
/// ```
///
/// with secants `s[i] = (y[i+1] - y[i]) / h[i]`. The boundary rows fix the
/// end slopes:
///
/// ```text
/// 2h[0]·m[0] + h[0]·m[1]           = 6(s[0] - start_slope)
/// h[n-1]·m[n-1] + 2h[n-1]·m[n]     = 6(end_slope - s[n-1])
/// ```
///
/// The system is strictly diagonally dominant, so the Thomas sweep needs no
/// pivoting.
fn solve_moments(knots: &[Knot], start_slope: f64, end_slope: f64) -> Vec<f64> {
    let n = knots.len() - 1;
    let h: Vec<f64> = knots.windows(2).map(|w| w[1].x - w[0].x).collect();
    let secant: Vec<f64> = knots
        .windows(2)
        .zip(&h)
        .map(|(w, &hi)| (w[1].y - w[0].y) / hi)
        .collect();

    let mut sub = vec![0.0; n + 1];
    let mut diag = vec![0.0; n + 1];
    let mut sup = vec![0.0; n + 1];
    let mut rhs = vec![0.0; n + 1];

    diag[0] = 2.0 * h[0];
    sup[0] = h[0];
    rhs[0] = 6.0 * (secant[0] - start_slope);

    for i in 1..n {
        sub[i] = h[i - 1];
        diag[i] = 2.0 * (h[i - 1] + h[i]);
        sup[i] = h[i];
        rhs[i] = 6.0 * (secant[i] - secant[i - 1]);
    }

    sub[n] = h[n - 1];
    diag[n] = 2.0 * h[n - 1];
    rhs[n] = 6.0 * (end_slope - secant[n - 1]);

    solve_tridiagonal(&sub, &diag, &sup, rhs)
}

/// Thomas algorithm for a tridiagonal system. `sub[0]` and `sup[last]` are
/// ignored.
fn solve_tridiagonal(sub: &[f64], diag: &[f64], sup: &[f64], mut rhs: Vec<f64>) -> Vec<f64> {
    let n = diag.len();
    let mut c = vec![0.0; n];

    c[0] = sup[0] / diag[0];
    rhs[0] /= diag[0];
    for i in 1..n {
        let denom = diag[i] - sub[i] * c[i - 1];
        c[i] = sup[i] / denom;
        rhs[i] = (rhs[i] - sub[i] * rhs[i - 1]) / denom;
    }

    for i in (0..n - 1).rev() {
        rhs[i] -= c[i] * rhs[i + 1];
    }
    rhs
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cdf_like() -> ClampedCubicSpline {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [0.0, 1.0 / 6.0, 0.5, 5.0 / 6.0, 1.0];
        ClampedCubicSpline::flat_ends(&xs, &ys).unwrap()
    }

    #[test]
    fn passes_through_knots_exactly() {
        let s = cdf_like();
        for k in s.knots().to_vec() {
            assert_eq!(s.evaluate(k.x), k.y, "knot at x={}", k.x);
        }
    }

    #[test]
    fn clamped_slopes_at_ends() {
        let s = cdf_like();
        assert_relative_eq!(s.derivative(0.0), 0.0, epsilon = 1e-12);
        assert_relative_eq!(s.derivative(4.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn nonzero_clamped_slopes() {
        let xs = [0.0, 1.0, 3.0];
        let ys = [1.0, 2.0, 0.0];
        let s = ClampedCubicSpline::new(&xs, &ys, 2.0, -0.5).unwrap();
        assert_relative_eq!(s.derivative(0.0), 2.0, epsilon = 1e-12);
        assert_relative_eq!(s.derivative(3.0), -0.5, epsilon = 1e-12);
    }

    #[test]
    fn two_knots_is_smoothstep() {
        // Zero end slopes on [0, 1] give 3t² - 2t³.
        let s = ClampedCubicSpline::flat_ends(&[0.0, 1.0], &[0.0, 1.0]).unwrap();
        assert_relative_eq!(s.evaluate(0.5), 0.5, epsilon = 1e-14);
        assert_relative_eq!(s.evaluate(0.25), 0.15625, epsilon = 1e-14);
        assert_relative_eq!(s.derivative(0.5), 1.5, epsilon = 1e-14);
        assert_relative_eq!(s.moments()[0], 6.0, epsilon = 1e-12);
        assert_relative_eq!(s.moments()[1], -6.0, epsilon = 1e-12);
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let s = cdf_like();
        let dx = 1e-6;
        for &x in &[0.3, 1.2, 1.9, 2.5, 3.7] {
            let fd = (s.evaluate(x + dx) - s.evaluate(x - dx)) / (2.0 * dx);
            assert_relative_eq!(s.derivative(x), fd, epsilon = 1e-6);
        }
    }

    #[test]
    fn first_derivative_continuous_at_knots() {
        let s = cdf_like();
        let eps = 1e-9;
        for &x in &[1.0, 2.0, 3.0] {
            assert_relative_eq!(s.derivative(x - eps), s.derivative(x + eps), epsilon = 1e-6);
        }
    }

    #[test]
    fn symmetric_data_gives_symmetric_curve() {
        let s = cdf_like();
        for &t in &[0.1, 0.7, 1.3, 1.8] {
            assert_relative_eq!(s.evaluate(2.0 - t) + s.evaluate(2.0 + t), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn from_parts_reproduces_fit() {
        let s = cdf_like();
        let xs: Vec<f64> = s.knots().iter().map(|k| k.x).collect();
        let ys: Vec<f64> = s.knots().iter().map(|k| k.y).collect();
        let rebuilt = ClampedCubicSpline::from_parts(
            &xs,
            &ys,
            s.moments().to_vec(),
            s.start_slope(),
            s.end_slope(),
        )
        .unwrap();
        assert_eq!(rebuilt, s);
    }

    #[test]
    fn from_parts_wrong_moment_count() {
        let err = ClampedCubicSpline::from_parts(&[0.0, 1.0], &[0.0, 1.0], vec![0.0], 0.0, 0.0)
            .unwrap_err();
        assert_eq!(
            err,
            SplineError::MomentCountMismatch {
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn from_parts_nan_moment() {
        let err = ClampedCubicSpline::from_parts(
            &[0.0, 1.0],
            &[0.0, 1.0],
            vec![0.0, f64::NAN],
            0.0,
            0.0,
        )
        .unwrap_err();
        assert_eq!(err, SplineError::NonFiniteMoment { index: 1 });
    }

    #[test]
    fn rejects_single_knot() {
        let err = ClampedCubicSpline::flat_ends(&[1.0], &[0.0]).unwrap_err();
        assert_eq!(err, SplineError::TooFewKnots { got: 1 });
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = ClampedCubicSpline::flat_ends(&[0.0, 1.0, 2.0], &[0.0, 1.0]).unwrap_err();
        assert!(matches!(err, SplineError::LengthMismatch { .. }));
    }

    #[test]
    fn rejects_repeated_x() {
        let err = ClampedCubicSpline::flat_ends(&[0.0, 1.0, 1.0], &[0.0, 0.5, 1.0]).unwrap_err();
        assert!(matches!(err, SplineError::NonIncreasingX { index: 2, .. }));
    }

    #[test]
    fn rejects_nan_knot() {
        let err = ClampedCubicSpline::flat_ends(&[0.0, f64::NAN], &[0.0, 1.0]).unwrap_err();
        assert_eq!(err, SplineError::NonFiniteKnot { index: 1 });
    }

    #[test]
    fn rejects_infinite_slope() {
        let err = ClampedCubicSpline::new(&[0.0, 1.0], &[0.0, 1.0], f64::INFINITY, 0.0)
            .unwrap_err();
        assert!(matches!(err, SplineError::NonFiniteSlope { .. }));
    }

    #[test]
    fn spline_is_send_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<ClampedCubicSpline>();
    }
}
