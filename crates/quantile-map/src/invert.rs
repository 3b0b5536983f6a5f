//! Numerical inversion of monotone CDF curves.

use qmap_spline::{Knot, MonotoneCurve};

use crate::config::InversionMethod;
use crate::diagnostics::{Diagnostic, DiagnosticSink, InstabilityCause};

/// Number of halvings performed by the bisection fallback.
pub const BISECTION_STEPS: usize = 5;

/// Finds `x` with `curve(x) ≈ p`.
///
/// The search is confined to the knot interval that brackets `p`. Newton
/// inversion takes a single step from the linear-interpolation guess and
/// falls back to bisection (reporting an
/// [`UnstableInversion`](Diagnostic::UnstableInversion)) when that step is
/// unusable. Never fails; `p` is expected in `[0, 1]`.
pub fn invert<C: MonotoneCurve + ?Sized>(
    curve: &C,
    p: f64,
    method: InversionMethod,
    sink: &dyn DiagnosticSink,
) -> f64 {
    let (down, up) = bracket(curve, p);
    match method {
        InversionMethod::Bisection => bisect(curve, p, down.x, up.x),
        InversionMethod::Newton => match newton_step(curve, p, down, up) {
            Ok(x) => x,
            Err(cause) => {
                sink.report(Diagnostic::UnstableInversion {
                    probability: p,
                    cause,
                });
                bisect(curve, p, down.x, up.x)
            }
        },
    }
}

/// Knots enclosing the interval where the curve reaches `p`.
///
/// Leading intervals whose upper knot is still at zero are skipped, so
/// `p = 0` lands at the start of the support rather than the domain.
pub fn bracket<C: MonotoneCurve + ?Sized>(curve: &C, p: f64) -> (Knot, Knot) {
    let last = curve.knot_count() - 2;
    let mut i = curve.find_interval_by_y(p);
    while i < last && curve.knot(i + 1).y == 0.0 {
        i += 1;
    }
    (curve.knot(i), curve.knot(i + 1))
}

fn newton_step<C: MonotoneCurve + ?Sized>(
    curve: &C,
    p: f64,
    down: Knot,
    up: Knot,
) -> Result<f64, InstabilityCause> {
    let width = up.x - down.x;
    let guess = if up.y > down.y {
        down.x + (p - down.y) / (up.y - down.y) * width
    } else {
        down.x + 0.5 * width
    };

    let slope = curve.derivative(guess);
    if slope == 0.0 {
        return Err(InstabilityCause::ZeroDerivative);
    }

    let correction = (p - curve.evaluate(guess)) / slope;
    if correction.abs() > 0.5 * width {
        return Err(InstabilityCause::CorrectionTooLarge);
    }

    let x = guess + correction;
    if !(down.x..=up.x).contains(&x) {
        return Err(InstabilityCause::OutsideBracket);
    }
    Ok(x)
}

/// Bisects `[down, up]` for [`BISECTION_STEPS`] iterations, then
/// interpolates linearly between the final endpoints.
///
/// Expects `curve(down) <= p <= curve(up)`; the result then stays inside
/// the starting interval.
pub fn bisect<C: MonotoneCurve + ?Sized>(curve: &C, p: f64, mut down: f64, mut up: f64) -> f64 {
    for _ in 0..BISECTION_STEPS {
        let middle = 0.5 * (down + up);
        if p > curve.evaluate(middle) {
            down = middle;
        } else {
            up = middle;
        }
    }

    let f_down = curve.evaluate(down);
    let f_up = curve.evaluate(up);
    if f_up == f_down {
        return down;
    }
    down + (p - f_down) / (f_up - f_down) * (up - down)
}
