//! Curve capability and clamped cubic spline backend.
//!
//! The [`MonotoneCurve`] trait is everything the quantile-mapping engine needs
//! from a cumulative distribution curve: value and slope evaluation, knot
//! access, and the two interval searches. [`ClampedCubicSpline`] is the
//! provided implementation, a C² cubic interpolant whose first derivative is
//! fixed at both boundary knots.
//!
//! # Glossary
//!
//! - **Knot**: a control point `(x, y)` the curve passes through exactly.
//! - **Moment**: the spline's second derivative at a knot.
//! - **Clamped**: boundary condition fixing the first derivative at both ends.
//!
//! # Quick Start
//!
//! ```
//! use qmap_spline::{ClampedCubicSpline, MonotoneCurve};
//!
//! let xs = [0.0, 1.0, 2.0, 3.0];
//! let ys = [0.0, 0.2, 0.8, 1.0];
//! let spline = ClampedCubicSpline::flat_ends(&xs, &ys).unwrap();
//!
//! assert_eq!(spline.evaluate(0.0), 0.0);
//! assert_eq!(spline.evaluate(3.0), 1.0);
//! assert_eq!(spline.find_interval_by_x(1.5), 1);
//! ```

mod clamped;
mod curve;
mod error;

pub use clamped::ClampedCubicSpline;
pub use curve::{Knot, MonotoneCurve};
pub use error::SplineError;
