//! Internal root-finding utilities for implied-volatility inversion.

/// Configuration for Brent's bracketed root finder.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BrentConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Absolute tolerance on the root location.
    pub x_tol: f64,
}

impl Default for BrentConfig {
    fn default() -> Self {
        Self {
            max_iter: 100,
            x_tol: 1e-12,
        }
    }
}

/// Why Brent's method did not produce a root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RootFailure {
    /// `f(a)` and `f(b)` have the same sign (or either is NaN).
    NotBracketed,
    /// The iteration limit was reached without meeting the tolerance.
    NoConvergence,
}

/// Find a root of `f` in `[a, b]` using Brent's method.
///
/// Combines bisection, the secant step, and inverse quadratic interpolation,
/// falling back to bisection whenever an interpolated step would leave the
/// bracket or shrink it too slowly. Requires `f(a)` and `f(b)` to straddle zero.
pub(crate) fn brent_root<F>(f: F, a: f64, b: f64, config: &BrentConfig) -> Result<f64, RootFailure>
where
    F: Fn(f64) -> f64,
{
    let mut a = a;
    let mut b = b;
    let mut fa = f(a);
    let mut fb = f(b);

    if fa.is_nan() || fb.is_nan() || fa * fb > 0.0 {
        return Err(RootFailure::NotBracketed);
    }
    if fa == 0.0 {
        return Ok(a);
    }
    if fb == 0.0 {
        return Ok(b);
    }

    // b is the best estimate, c the previous b, [b, c] always brackets.
    let mut c = a;
    let mut fc = fa;
    let mut d = b - a;
    let mut e = d;

    for _ in 0..config.max_iter {
        if fb * fc > 0.0 {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol = 2.0 * f64::EPSILON * b.abs() + 0.5 * config.x_tol;
        let m = 0.5 * (c - b);
        if m.abs() <= tol || fb == 0.0 {
            return Ok(b);
        }

        if e.abs() >= tol && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                // Secant
                (2.0 * m * s, 1.0 - s)
            } else {
                // Inverse quadratic interpolation
                let q = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * m * q * (q - r) - (b - a) * (r - 1.0)),
                    (q - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            } else {
                p = -p;
            }
            if 2.0 * p < (3.0 * m * q - (tol * q).abs()).min((e * q).abs()) {
                e = d;
                d = p / q;
            } else {
                d = m;
                e = m;
            }
        } else {
            d = m;
            e = m;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol { d } else { tol.copysign(m) };
        fb = f(b);
        if fb.is_nan() {
            return Err(RootFailure::NoConvergence);
        }
    }

    Err(RootFailure::NoConvergence)
}
