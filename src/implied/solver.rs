//! Implied volatility by bracketed root-finding on the call price.
//!
//! The call price is strictly increasing in σ, so a price has at most one
//! implied volatility inside a volatility bracket, and one exists exactly when
//! the price lies between the bracket-endpoint prices.

use serde::{Deserialize, Serialize};

use crate::error::VolGridError;
use crate::implied::black::call_price;
use crate::optim::{BrentConfig, RootFailure, brent_root};
use crate::types::Vol;

/// Lower end of the default volatility search bracket.
pub const MIN_VOL: f64 = 1e-6;

/// Upper end of the default volatility search bracket.
pub const MAX_VOL: f64 = 5.0;

/// Closed volatility interval searched for an implied volatility.
///
/// # Examples
/// ```
/// use volgrid::implied::VolBracket;
/// let b = VolBracket::default();
/// assert_eq!((b.lower, b.upper), (1e-6, 5.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "VolBracketRaw", into = "VolBracketRaw")]
pub struct VolBracket {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Serialize, Deserialize)]
struct VolBracketRaw {
    lower: f64,
    upper: f64,
}

impl TryFrom<VolBracketRaw> for VolBracket {
    type Error = VolGridError;
    fn try_from(raw: VolBracketRaw) -> Result<Self, Self::Error> {
        Self::new(raw.lower, raw.upper)
    }
}

impl From<VolBracket> for VolBracketRaw {
    fn from(b: VolBracket) -> Self {
        Self {
            lower: b.lower,
            upper: b.upper,
        }
    }
}

impl VolBracket {
    /// Create a bracket, rejecting non-finite, non-positive, or empty intervals.
    ///
    /// # Errors
    /// Returns [`VolGridError::InvalidInput`] unless `0 < lower < upper < ∞`.
    pub fn new(lower: f64, upper: f64) -> crate::error::Result<Self> {
        if !lower.is_finite() || !upper.is_finite() || lower <= 0.0 || lower >= upper {
            return Err(VolGridError::InvalidInput {
                message: format!("vol bracket must satisfy 0 < lower < upper, got [{lower}, {upper}]"),
            });
        }
        Ok(Self { lower, upper })
    }
}

impl Default for VolBracket {
    fn default() -> Self {
        Self {
            lower: MIN_VOL,
            upper: MAX_VOL,
        }
    }
}

/// Why a quote has no implied volatility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolveFailure {
    /// Non-positive price or expiry, or a non-finite argument.
    InvalidInput,
    /// The price lies outside the range spanned by the bracket.
    NotBracketed,
    /// The root finder hit its iteration limit.
    NoConvergence,
}

/// Implied volatility solver for European calls.
///
/// Stateless apart from its bracket and tolerances, so a single instance can
/// be shared by reference across worker threads.
///
/// # Examples
/// ```
/// use volgrid::implied::{call_price, ImpliedVolSolver};
///
/// let solver = ImpliedVolSolver::new();
/// let price = call_price(0.2, 100.0, 100.0, 1.0, 0.0, 0.0);
/// let vol = solver.solve(price, 100.0, 100.0, 1.0, 0.0, 0.0).unwrap();
/// assert!((vol.0 - 0.2).abs() < 1e-8);
///
/// // Above the price reachable with σ = 5: no solution.
/// assert!(solver.solve(150.0, 100.0, 100.0, 1.0, 0.0, 0.0).is_none());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ImpliedVolSolver {
    bracket: VolBracket,
    config: BrentConfig,
}

impl ImpliedVolSolver {
    /// Solver over the default bracket `[1e-6, 5]`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Solver over a custom bracket.
    pub fn with_bracket(bracket: VolBracket) -> Self {
        Self {
            bracket,
            config: BrentConfig::default(),
        }
    }

    /// The volatility bracket searched by this solver.
    pub fn bracket(&self) -> VolBracket {
        self.bracket
    }

    /// Implied volatility reproducing `price`, or `None` when no solution exists.
    pub fn solve(
        &self,
        price: f64,
        strike: f64,
        spot: f64,
        expiry: f64,
        rate: f64,
        dividend_yield: f64,
    ) -> Option<Vol> {
        self.try_solve(price, strike, spot, expiry, rate, dividend_yield)
            .ok()
    }

    /// Like [`solve`](Self::solve) but reports why no solution was found.
    pub fn try_solve(
        &self,
        price: f64,
        strike: f64,
        spot: f64,
        expiry: f64,
        rate: f64,
        dividend_yield: f64,
    ) -> Result<Vol, SolveFailure> {
        if expiry <= 0.0 || price <= 0.0 || strike <= 0.0 || spot <= 0.0 {
            return Err(SolveFailure::InvalidInput);
        }
        if ![price, strike, spot, expiry, rate, dividend_yield]
            .iter()
            .all(|x| x.is_finite())
        {
            return Err(SolveFailure::InvalidInput);
        }

        let objective =
            |sigma: f64| call_price(sigma, strike, spot, expiry, rate, dividend_yield) - price;

        match brent_root(objective, self.bracket.lower, self.bracket.upper, &self.config) {
            Ok(sigma) => Ok(Vol(sigma)),
            Err(RootFailure::NotBracketed) => Err(SolveFailure::NotBracketed),
            Err(RootFailure::NoConvergence) => Err(SolveFailure::NoConvergence),
        }
    }
}
