//! Implied volatility extraction from call option prices.
//!
//! - [`call_price`] — Black-Scholes-Merton call price with continuous dividend yield
//! - [`ImpliedVolSolver`] — Brent root-finding inversion over a fixed volatility bracket

pub mod black;
pub mod solver;

pub use black::{call_price, norm_cdf};
pub use solver::{ImpliedVolSolver, MAX_VOL, MIN_VOL, SolveFailure, VolBracket};
