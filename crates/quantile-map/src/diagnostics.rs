//! Observer channel for degraded-but-completed events.
//!
//! Building and shifting never fail on numerical trouble; they recover and
//! report what happened to a [`DiagnosticSink`]. The default sink forwards
//! every event to `tracing` at warn level.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use tracing::warn;

/// Why a Newton step was abandoned in favour of bisection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstabilityCause {
    /// The curve slope at the initial guess is zero.
    ZeroDerivative,
    /// The Newton correction exceeds half the bracket width.
    CorrectionTooLarge,
    /// The corrected point leaves the bracketing interval.
    OutsideBracket,
}

impl fmt::Display for InstabilityCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ZeroDerivative => "zero derivative",
            Self::CorrectionTooLarge => "correction larger than half the bracket",
            Self::OutsideBracket => "step leaves the bracket",
        };
        f.write_str(s)
    }
}

/// A recoverable event reported during curve building or shifting.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Sampled curve values left `[0, 1]`.
    CurveOutOfRange {
        /// Curve name.
        curve: String,
        /// Fraction of regularity samples affected, in permille.
        permille: f64,
    },
    /// Sampled curve derivatives were negative.
    NegativeDerivative {
        /// Curve name.
        curve: String,
        /// Fraction of regularity samples affected, in permille.
        permille: f64,
    },
    /// A value outside the source domain was passed through unchanged.
    OutOfDomain {
        /// The input value.
        value: f64,
        /// Lower bound of the source domain.
        lower: f64,
        /// Upper bound of the source domain.
        upper: f64,
    },
    /// Newton inversion was replaced by bisection.
    UnstableInversion {
        /// The probability being inverted.
        probability: f64,
        /// Why the Newton step was rejected.
        cause: InstabilityCause,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CurveOutOfRange { curve, permille } => write!(
                f,
                "CDF '{curve}' leaves [0, 1] in about {permille:.0} per mille of the range"
            ),
            Self::NegativeDerivative { curve, permille } => write!(
                f,
                "CDF '{curve}' has negative derivative in about {permille:.0} per mille of the range"
            ),
            Self::OutOfDomain {
                value,
                lower,
                upper,
            } => write!(
                f,
                "value {value} outside source domain [{lower}, {upper}], returned unchanged"
            ),
            Self::UnstableInversion { probability, cause } => write!(
                f,
                "numerically unstable inversion at p = {probability} ({cause}), using bisection"
            ),
        }
    }
}

/// Receiver for [`Diagnostic`]s.
pub trait DiagnosticSink: Send + Sync {
    /// Handles one diagnostic.
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing::warn!`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::CurveOutOfRange { curve, permille }
            | Diagnostic::NegativeDerivative { curve, permille } => {
                warn!(curve = %curve, permille, "{diagnostic}");
            }
            Diagnostic::OutOfDomain { value, .. } => {
                warn!(value, "{diagnostic}");
            }
            Diagnostic::UnstableInversion { probability, .. } => {
                warn!(probability, "{diagnostic}");
            }
        }
    }
}

/// Stores every diagnostic in memory, in arrival order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the collected diagnostics.
    pub fn events(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    /// Removes and returns the collected diagnostics.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.lock())
    }

    /// Number of collected diagnostics.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Diagnostic>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.lock().push(diagnostic);
    }
}
