//! Newtypes for values the crate hands back or takes as grid coordinates.
//!
//! - [`Vol`] is what the solver returns and what [`CalibratedQuote`] stores.
//! - [`Tenor`] and [`Strike`] name the two axes of an off-grid query to
//!   [`SurfaceBuilder::interpolate`], where swapping them would silently
//!   transpose the lookup.
//!
//! Everything on the per-quote path (pricer, solver arguments, quote fields)
//! stays a named `f64`. Only `PartialEq`/`PartialOrd` are derived, since the
//! wrapped values may be NaN.
//!
//! [`CalibratedQuote`]: crate::pipeline::CalibratedQuote
//! [`SurfaceBuilder::interpolate`]: crate::surface::SurfaceBuilder::interpolate

use serde::{Deserialize, Serialize};

/// Strike coordinate of a surface query.
///
/// # Examples
/// ```
/// use volgrid::types::Strike;
/// assert_eq!(Strike(575.0).0, 575.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Strike(pub f64);

/// Time-to-expiry coordinate of a surface query, in years (whole days / 365).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Tenor(pub f64);

/// Annualized Black-Scholes implied volatility; 0.2 is 20%.
///
/// # Examples
/// ```
/// use volgrid::implied::{call_price, ImpliedVolSolver};
/// use volgrid::types::Vol;
///
/// let p = call_price(0.3, 100.0, 100.0, 0.5, 0.0, 0.0);
/// let vol: Vol = ImpliedVolSolver::new().solve(p, 100.0, 100.0, 0.5, 0.0, 0.0).unwrap();
/// assert!((vol.0 - 0.3).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Vol(pub f64);
