//! Binned empirical distributions.

use crate::error::QuantileMapError;

/// Relative tolerance when checking that explicit bins are contiguous.
const CONTIGUITY_TOLERANCE: f64 = 1e-9;

/// A single histogram bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    /// Left edge.
    pub left: f64,
    /// Bin width.
    pub width: f64,
    /// Number (or weight) of entries.
    pub count: f64,
}

impl Bin {
    /// Right edge, `left + width`.
    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// A histogram over contiguous bins with strictly increasing edges and
/// non-negative, finite counts.
///
/// Stored as `n + 1` edges and `n` counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    edges: Vec<f64>,
    counts: Vec<f64>,
}

impl Histogram {
    /// Creates a histogram from `counts.len() + 1` bin edges.
    ///
    /// # Errors
    ///
    /// - [`QuantileMapError::EmptyHistogram`] if `counts` is empty.
    /// - [`QuantileMapError::LengthMismatch`] if `edges.len() != counts.len() + 1`.
    /// - [`QuantileMapError::InvalidEdge`] if an edge is not finite or the
    ///   edges are not strictly increasing.
    /// - [`QuantileMapError::InvalidCount`] if a count is negative or not finite.
    pub fn new(edges: Vec<f64>, counts: Vec<f64>) -> Result<Self, QuantileMapError> {
        if counts.is_empty() {
            return Err(QuantileMapError::EmptyHistogram);
        }
        if edges.len() != counts.len() + 1 {
            return Err(QuantileMapError::LengthMismatch {
                edges_len: edges.len(),
                counts_len: counts.len(),
            });
        }

        for (index, &edge) in edges.iter().enumerate() {
            if !edge.is_finite() {
                return Err(QuantileMapError::InvalidEdge {
                    index,
                    reason: format!("edge {edge} is not finite"),
                });
            }
            if index > 0 && edge <= edges[index - 1] {
                return Err(QuantileMapError::InvalidEdge {
                    index,
                    reason: format!(
                        "edges must be strictly increasing, got {edge} after {}",
                        edges[index - 1]
                    ),
                });
            }
        }

        if let Some((index, &count)) = counts
            .iter()
            .enumerate()
            .find(|&(_, &c)| !c.is_finite() || c < 0.0)
        {
            return Err(QuantileMapError::InvalidCount { index, count });
        }

        Ok(Self { edges, counts })
    }

    /// Creates a histogram with `counts.len()` equal-width bins over `[lo, hi]`.
    ///
    /// # Errors
    ///
    /// As [`Histogram::new`]; a range with `hi <= lo` reports an invalid edge.
    pub fn uniform(lo: f64, hi: f64, counts: Vec<f64>) -> Result<Self, QuantileMapError> {
        if counts.is_empty() {
            return Err(QuantileMapError::EmptyHistogram);
        }
        let n = counts.len();
        let width = (hi - lo) / n as f64;
        let mut edges: Vec<f64> = (0..n).map(|i| lo + i as f64 * width).collect();
        edges.push(hi);
        Self::new(edges, counts)
    }

    /// Creates a histogram from explicit `(left, width, count)` bins.
    ///
    /// The right edge of each bin must meet the left edge of the next. The
    /// stored edges are the first bin's left edge followed by every bin's
    /// right edge.
    ///
    /// # Errors
    ///
    /// - [`QuantileMapError::NonContiguousBins`] if consecutive bins do not
    ///   touch.
    /// - Otherwise as [`Histogram::new`].
    pub fn from_bins(bins: &[Bin]) -> Result<Self, QuantileMapError> {
        let Some(first) = bins.first() else {
            return Err(QuantileMapError::EmptyHistogram);
        };

        for (index, pair) in bins.windows(2).enumerate() {
            let right = pair[0].right();
            let left = pair[1].left;
            let scale = pair[0].width.abs().max(left.abs()).max(1.0);
            if (right - left).abs() > CONTIGUITY_TOLERANCE * scale {
                return Err(QuantileMapError::NonContiguousBins { index, right, left });
            }
        }

        let edges = std::iter::once(first.left)
            .chain(bins.iter().map(Bin::right))
            .collect();
        let counts = bins.iter().map(|b| b.count).collect();
        Self::new(edges, counts)
    }

    /// Number of bins.
    pub fn n_bins(&self) -> usize {
        self.counts.len()
    }

    /// Bin edges (`n_bins + 1` values).
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Bin counts.
    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    /// Sum of all counts.
    pub fn total(&self) -> f64 {
        self.counts.iter().sum()
    }

    /// Iterates over the bins in order.
    pub fn bins(&self) -> impl Iterator<Item = Bin> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(e, &count)| Bin {
                left: e[0],
                width: e[1] - e[0],
                count,
            })
    }
}
