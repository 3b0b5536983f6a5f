//! The curve capability consumed by CDF inversion and quantile shifting.

/// A control point of an interpolating curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Knot {
    /// Abscissa.
    pub x: f64,
    /// Ordinate.
    pub y: f64,
}

impl Knot {
    /// Creates a knot at `(x, y)`.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A curve through an ordered knot sequence with strictly increasing `x` and
/// non-decreasing `y`.
///
/// Implementors must hold at least two knots. Values outside
/// `[x_min, x_max]` are backend-defined and callers must range-check first.
///
/// The interval searches have default binary-search implementations built on
/// [`MonotoneCurve::knot`], so a backend only needs evaluation and knot access.
pub trait MonotoneCurve {
    /// Curve value at `x`.
    fn evaluate(&self, x: f64) -> f64;

    /// First derivative at `x`.
    fn derivative(&self, x: f64) -> f64;

    /// Number of knots (`n + 1` for `n` intervals).
    fn knot_count(&self) -> usize;

    /// Knot at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.knot_count()`.
    fn knot(&self, index: usize) -> Knot;

    /// Smallest knot abscissa.
    fn x_min(&self) -> f64 {
        self.knot(0).x
    }

    /// Largest knot abscissa.
    fn x_max(&self) -> f64 {
        self.knot(self.knot_count() - 1).x
    }

    /// Index `i` of the interval with `x_i <= x < x_{i+1}`.
    ///
    /// Returns 0 for `x <= x_0` and the last knot index for `x >= x_n`, so an
    /// input sitting exactly on the upper boundary is distinguishable from
    /// one inside the last interval.
    fn find_interval_by_x(&self, x: f64) -> usize {
        let last = self.knot_count() - 1;
        if x <= self.knot(0).x {
            return 0;
        }
        if x >= self.knot(last).x {
            return last;
        }

        let (mut lo, mut hi) = (0, last);
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if self.knot(mid).x <= x {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Index `i` of the interval bracketing `y`, with `y_i < y <= y_{i+1}`.
    ///
    /// Runs of equal `y` resolve to the lowest interval whose upper knot
    /// reaches `y`. Values at or below `y_0` give 0; values above `y_n` give
    /// the last interval.
    fn find_interval_by_y(&self, y: f64) -> usize {
        let (mut lo, mut hi) = (0, self.knot_count() - 1);
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if self.knot(mid).y < y {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Piecewise-linear curve exercising only the default trait methods.
    struct Polyline(Vec<Knot>);

    impl MonotoneCurve for Polyline {
        fn evaluate(&self, x: f64) -> f64 {
            let i = self.find_interval_by_x(x).min(self.0.len() - 2);
            let (a, b) = (self.0[i], self.0[i + 1]);
            a.y + (x - a.x) * (b.y - a.y) / (b.x - a.x)
        }

        fn derivative(&self, x: f64) -> f64 {
            let i = self.find_interval_by_x(x).min(self.0.len() - 2);
            let (a, b) = (self.0[i], self.0[i + 1]);
            (b.y - a.y) / (b.x - a.x)
        }

        fn knot_count(&self) -> usize {
            self.0.len()
        }

        fn knot(&self, index: usize) -> Knot {
            self.0[index]
        }
    }

    fn polyline(points: &[(f64, f64)]) -> Polyline {
        Polyline(points.iter().map(|&(x, y)| Knot::new(x, y)).collect())
    }

    #[test]
    fn x_bounds() {
        let c = polyline(&[(-1.0, 0.0), (0.5, 0.5), (2.0, 1.0)]);
        assert_eq!(c.x_min(), -1.0);
        assert_eq!(c.x_max(), 2.0);
    }

    #[test]
    fn interval_by_x_interior() {
        let c = polyline(&[(0.0, 0.0), (1.0, 0.2), (2.0, 0.5), (3.0, 1.0)]);
        assert_eq!(c.find_interval_by_x(0.5), 0);
        assert_eq!(c.find_interval_by_x(1.0), 1);
        assert_eq!(c.find_interval_by_x(1.999), 1);
        assert_eq!(c.find_interval_by_x(2.5), 2);
    }

    #[test]
    fn interval_by_x_boundaries() {
        let c = polyline(&[(0.0, 0.0), (1.0, 0.2), (2.0, 0.5), (3.0, 1.0)]);
        assert_eq!(c.find_interval_by_x(-5.0), 0);
        assert_eq!(c.find_interval_by_x(0.0), 0);
        assert_eq!(c.find_interval_by_x(3.0), 3);
        assert_eq!(c.find_interval_by_x(10.0), 3);
    }

    #[test]
    fn interval_by_y_on_knot_takes_lower_interval() {
        let c = polyline(&[(0.0, 0.0), (1.0, 0.2), (2.0, 0.5), (3.0, 1.0)]);
        assert_eq!(c.find_interval_by_y(0.5), 1);
        assert_eq!(c.find_interval_by_y(0.2), 0);
        assert_eq!(c.find_interval_by_y(0.3), 1);
        assert_eq!(c.find_interval_by_y(1.0), 2);
    }

    #[test]
    fn interval_by_y_flat_run_resolves_lowest() {
        let c = polyline(&[
            (0.0, 0.0),
            (1.0, 0.2),
            (2.0, 0.5),
            (3.0, 0.5),
            (4.0, 0.5),
            (5.0, 1.0),
        ]);
        assert_eq!(c.find_interval_by_y(0.5), 1);
        assert_eq!(c.find_interval_by_y(0.50001), 4);
    }

    #[test]
    fn interval_by_y_leading_zeros() {
        let c = polyline(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 1.0)]);
        assert_eq!(c.find_interval_by_y(0.0), 0);
        assert_eq!(c.find_interval_by_y(0.1), 2);
    }
}
