//! Histogram-based quantile mapping.
//!
//! This crate corrects a measured quantity so that its distribution matches a
//! reference distribution while preserving each value's rank. Both
//! distributions are given as histograms and turned into smooth CDF curves.
//!
//! # Pipeline
//!
//! 1. **Build** a [`CdfCurve`] per histogram: cumulative, normalised knots at
//!    the bin edges and a clamped cubic spline through them
//! 2. **Evaluate** the source curve at the input value to get its probability
//! 3. **Invert** the target curve at that probability (Newton step with a
//!    bisection fallback, or bisection only)
//!
//! Values outside the source domain (and NaN) pass through unchanged. With a
//! tail threshold `t > 0`, probabilities below `t` or above `1 - t` are mapped
//! by linear interpolation between knots instead.
//!
//! Numerical trouble never fails an operation: it is recovered locally and
//! reported as a [`Diagnostic`] through a [`DiagnosticSink`].
//!
//! # Glossary
//!
//! - **CDF**: cumulative distribution function
//! - **Knot**: a control point the curve passes through exactly
//! - **Tail linearization**: piecewise-linear mapping for extreme probabilities
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use qmap_quantile_map::{
//!     Histogram, InversionMethod, QuantileShifter, ShifterConfig, TracingSink, build_cdf,
//! };
//!
//! let data = Histogram::uniform(0.0, 4.0, vec![10.0, 20.0, 20.0, 10.0]).unwrap();
//! let mc = Histogram::uniform(0.0, 4.0, vec![5.0, 25.0, 25.0, 5.0]).unwrap();
//!
//! let source = Arc::new(build_cdf(&mc, "mc", &TracingSink).unwrap());
//! let target = Arc::new(build_cdf(&data, "data", &TracingSink).unwrap());
//!
//! let config = ShifterConfig::new().with_method(InversionMethod::Bisection);
//! let shifter = QuantileShifter::new(source, target, config).unwrap();
//!
//! let corrected = shifter.shift_all(&[0.7, 2.0, 3.1, 12.0]);
//! assert_eq!(corrected[3], 12.0);
//! ```

mod cdf;
mod config;
mod diagnostics;
mod error;
mod histogram;
mod invert;
mod scan;
mod shift;

pub use cdf::{CdfCurve, REGULARITY_SAMPLES, RegularityReport, build_cdf, build_cdf_with_report, cdf_knots, check_regularity};
pub use config::{InversionMethod, ShifterConfig};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, InstabilityCause, TracingSink};
pub use error::QuantileMapError;
pub use histogram::{Bin, Histogram};
pub use invert::{BISECTION_STEPS, bisect, bracket, invert};
pub use qmap_spline::{ClampedCubicSpline, Knot, MonotoneCurve};
pub use scan::{
    DEFAULT_DENSITY_BINS, DEFAULT_SCAN_POINTS, DensityBin, ScanPoint, event_density, scan_range,
    scan_transformation,
};
pub use shift::QuantileShifter;
