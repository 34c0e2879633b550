//! # volgrid
//!
//! Implied-volatility surfaces from listed call option quotes.
//!
//! Provides the full pipeline: raw option quotes → eligibility filtering →
//! Black-Scholes implied vol extraction → scattered-to-grid interpolation →
//! a renderable (time, strike, value) grid.
//!
//! ## Architecture
//!
//! - **`implied`** — Black-Scholes-Merton call price and its Brent-based inversion
//! - **`pipeline`** — Expiry and liquidity filters, mid price, per-quote calibration
//! - **`surface`** — Field selection, Delaunay triangulation, linear interpolation onto a grid
//! - **`provider`** — Market-data boundary (spot price and per-expiry call chains)
//! - **`engine`** — One call from provider snapshot and [`SurfaceConfig`] to [`SurfaceOutput`]
//!
//! ## Design
//!
//! - **Newtypes for outputs, bare `f64` for inputs.** [`Vol`], [`Strike`],
//!   [`Tenor`] wrap values handed back to callers. The pricer and solver take
//!   raw `f64` since they sit on the per-quote hot path.
//! - **Bad data is not an error.** Illiquid quotes, prices with no implied
//!   volatility, and grid nodes outside the data's convex hull are dropped or
//!   `None`. Only a missing spot price, a failing provider, or invalid
//!   configuration produce an `Err`.
//! - **No panics.** Library code never calls `unwrap()` or `expect()`.
//! - **Stateless calibration.** Each quote is calibrated independently against
//!   a shared read-only [`MarketContext`](market::MarketContext); with the
//!   `parallel` feature the pipeline runs on the rayon pool.
//! - **Serializable.** Quotes, grids, configuration, and engine output
//!   implement Serde `Serialize` / `Deserialize`.
//!
//! ## Quick start
//!
//! ```
//! use chrono::NaiveDate;
//! use volgrid::implied::call_price;
//! use volgrid::market::{MarketContext, RawQuote};
//! use volgrid::pipeline::QuoteFilterPipeline;
//! use volgrid::surface::{select_points, DisplayMode, SurfaceBuilder};
//!
//! let eval = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let market = MarketContext::new(100.0, 0.015, 0.013, eval)?;
//!
//! let mut quotes = Vec::new();
//! for (days, strike) in [(30, 90.0), (30, 110.0), (365, 90.0), (365, 110.0)] {
//!     let expiration = eval.date() + chrono::Duration::days(days);
//!     let t = days as f64 / 365.0;
//!     let p = call_price(0.2, strike, 100.0, t, 0.015, 0.013);
//!     quotes.push(RawQuote { strike, bid: p - 0.01, ask: p + 0.01, expiration, reference_vol: None });
//! }
//!
//! let calibrated = QuoteFilterPipeline::new().run(&quotes, &market);
//! let grid = SurfaceBuilder::new()
//!     .add_points(select_points(&calibrated, DisplayMode::ModelVol))
//!     .build()?;
//! assert_eq!(grid.defined_count(), 30 * 30);
//! # Ok::<(), volgrid::VolGridError>(())
//! ```

pub mod config;
pub mod conventions;
pub mod engine;
pub mod error;
pub mod implied;
pub mod market;
mod optim;
pub mod pipeline;
pub mod provider;
pub mod surface;
pub mod types;
mod validate;

#[doc(inline)]
pub use config::SurfaceConfig;
#[doc(inline)]
pub use engine::{SurfaceOutput, compute_surface};
#[doc(inline)]
pub use error::{Result, VolGridError};
#[doc(inline)]
pub use provider::MarketDataProvider;
#[doc(inline)]
pub use surface::{SurfaceBuilder, SurfaceGrid};
#[doc(inline)]
pub use types::{Strike, Tenor, Vol};
