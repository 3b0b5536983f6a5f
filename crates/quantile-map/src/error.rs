//! Error types for the qmap-quantile-map crate.

use qmap_spline::SplineError;

/// Error type for all fallible operations in the qmap-quantile-map crate.
///
/// Only malformed construction inputs fail. Numerical edge cases during
/// shifting (flat regions, boundary hits, out-of-domain values, unstable
/// Newton steps) are recovered locally and surface as
/// [`Diagnostic`](crate::Diagnostic)s instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuantileMapError {
    /// Returned when a histogram has no bins.
    #[error("histogram has no bins")]
    EmptyHistogram,

    /// Returned when edge and count sequences disagree.
    #[error("length mismatch: {edges_len} edges for {counts_len} counts (need counts + 1)")]
    LengthMismatch {
        /// Number of bin edges supplied.
        edges_len: usize,
        /// Number of bin counts supplied.
        counts_len: usize,
    },

    /// Returned when bin edges are not finite and strictly increasing.
    #[error("bin edge {index} is invalid: {reason}")]
    InvalidEdge {
        /// Index of the offending edge.
        index: usize,
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a bin's right edge does not meet the next bin's left edge.
    #[error("bins {index} and {next} are not contiguous: right edge {right}, next left edge {left}", next = index + 1)]
    NonContiguousBins {
        /// Index of the earlier bin.
        index: usize,
        /// Right edge of bin `index`.
        right: f64,
        /// Left edge of bin `index + 1`.
        left: f64,
    },

    /// Returned when a bin count is negative or not finite.
    #[error("bin {index} has invalid count {count} (must be finite and >= 0)")]
    InvalidCount {
        /// Index of the offending bin.
        index: usize,
        /// The offending count.
        count: f64,
    },

    /// Returned when a histogram's total count is zero, so no CDF exists.
    #[error("distribution '{name}' is degenerate: total count is zero")]
    DegenerateDistribution {
        /// Name of the curve being built.
        name: String,
    },

    /// Returned when a configuration parameter is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Wraps a spline construction failure.
    #[error("spline construction failed: {0}")]
    Spline(#[from] SplineError),
}
