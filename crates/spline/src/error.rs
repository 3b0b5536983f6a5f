//! Error types for the qmap-spline crate.

/// Error type for spline construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SplineError {
    /// Returned when fewer than two knots are supplied.
    #[error("need at least 2 knots, got {got}")]
    TooFewKnots {
        /// Number of knots supplied.
        got: usize,
    },

    /// Returned when the x and y sequences differ in length.
    #[error("length mismatch: {xs_len} x values, {ys_len} y values")]
    LengthMismatch {
        /// Length of the x sequence.
        xs_len: usize,
        /// Length of the y sequence.
        ys_len: usize,
    },

    /// Returned when a knot coordinate is NaN or infinite.
    #[error("knot {index} is not finite")]
    NonFiniteKnot {
        /// Index of the offending knot.
        index: usize,
    },

    /// Returned when knot abscissae are not strictly increasing.
    #[error("x values must be strictly increasing: x[{index}] = {current} after {previous}")]
    NonIncreasingX {
        /// Index of the offending knot.
        index: usize,
        /// Abscissa of the preceding knot.
        previous: f64,
        /// Abscissa of the offending knot.
        current: f64,
    },

    /// Returned when a boundary slope is NaN or infinite.
    #[error("boundary slopes must be finite, got start={start}, end={end}")]
    NonFiniteSlope {
        /// Slope at the first knot.
        start: f64,
        /// Slope at the last knot.
        end: f64,
    },

    /// Returned when persisted moments do not match the knot count.
    #[error("moment count mismatch: expected {expected}, got {got}")]
    MomentCountMismatch {
        /// Expected number of moments (one per knot).
        expected: usize,
        /// Number of moments supplied.
        got: usize,
    },

    /// Returned when a persisted moment is NaN or infinite.
    #[error("moment {index} is not finite")]
    NonFiniteMoment {
        /// Index of the offending moment.
        index: usize,
    },
}
