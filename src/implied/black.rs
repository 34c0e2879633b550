//! Black-Scholes-Merton price of a European call with continuous dividend yield.
//!
//! # Formula
//! ```text
//! C = S·e^(−qT)·N(d₁) − K·e^(−rT)·N(d₂)
//! d₁ = (ln(S/K) + (r − q + σ²/2)·T) / (σ√T)
//! d₂ = d₁ − σ√T
//! ```

use std::f64::consts::SQRT_2;

/// Standard normal cumulative distribution function Φ(x).
///
/// Evaluated through the complementary error function so both tails keep
/// full relative precision.
///
/// ```
/// use volgrid::implied::norm_cdf;
/// assert!((norm_cdf(0.0) - 0.5).abs() < 1e-15);
/// assert!(norm_cdf(-40.0) >= 0.0);
/// ```
#[inline]
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * libm::erfc(-x / SQRT_2)
}

/// Discounted expected payoff of a European call under constant volatility.
///
/// # Arguments
/// * `sigma` — Volatility (numerically stable for `0 < sigma ≤ 5`)
/// * `strike` — Strike price `K`
/// * `spot` — Spot price `S`
/// * `expiry` — Time to expiry in years; must be `> 0`, the caller guards this
/// * `rate` — Continuously compounded risk-free rate `r`
/// * `dividend_yield` — Continuous dividend yield `q`
///
/// Strictly increasing in `sigma` for fixed other arguments.
///
/// ```
/// use volgrid::implied::call_price;
/// let p = call_price(0.2, 100.0, 100.0, 1.0, 0.0, 0.0);
/// assert!((p - 7.9656).abs() < 1e-4);
/// ```
pub fn call_price(
    sigma: f64,
    strike: f64,
    spot: f64,
    expiry: f64,
    rate: f64,
    dividend_yield: f64,
) -> f64 {
    let sig_sqrt_t = sigma * expiry.sqrt();
    let d1 = ((spot / strike).ln() + (rate - dividend_yield + 0.5 * sigma * sigma) * expiry)
        / sig_sqrt_t;
    let d2 = d1 - sig_sqrt_t;
    spot * (-dividend_yield * expiry).exp() * norm_cdf(d1)
        - strike * (-rate * expiry).exp() * norm_cdf(d2)
}
