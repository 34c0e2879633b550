//! Quote filtering and per-quote calibration.
//!
//! Each raw quote passes through, in order:
//!
//! 1. **Expiry window**: the contract must expire more than
//!    [`EXPIRY_CUTOFF_DAYS`] days after evaluation.
//! 2. **Liquidity**: both bid and ask must be strictly positive.
//! 3. **Derivation**: mid price and ACT/365 time-to-expiry.
//! 4. **Calibration**: the mid price is inverted into an implied volatility.
//! 5. **Discard**: quotes with no implied volatility are dropped.
//!
//! Stages 1–2 produce an [`EligibleQuote`], stage 4 a [`CalibratedQuote`].
//! Rejected quotes are not errors; they are counted in a [`PipelineReport`]
//! and otherwise vanish. Calibration is a pure function of one quote and the
//! shared [`MarketContext`], so with the `parallel` feature it runs on the
//! rayon pool.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::conventions::{self, EXPIRY_CUTOFF_DAYS};
use crate::implied::{ImpliedVolSolver, VolBracket};
use crate::market::{MarketContext, RawQuote};
use crate::surface::field;
use crate::types::Vol;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A quote that passed the expiry-window and liquidity filters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EligibleQuote {
    pub strike: f64,
    pub expiration: NaiveDate,
    /// `(bid + ask) / 2`.
    pub mid_price: f64,
    /// ACT/365 years from evaluation to expiration.
    pub time_to_expiry: f64,
    pub reference_vol: Option<f64>,
}

/// Why a raw quote never became an [`EligibleQuote`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ineligible {
    /// Expires within the cutoff window (or already expired).
    Expired,
    /// No two-sided market, or a non-finite bid or ask.
    Illiquid,
    /// Strike is not positive and finite.
    InvalidStrike,
}

impl EligibleQuote {
    /// Apply the expiry-window and liquidity filters to a raw quote.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use volgrid::market::RawQuote;
    /// use volgrid::pipeline::{EligibleQuote, Ineligible};
    ///
    /// let eval = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap().and_hms_opt(9, 30, 0).unwrap();
    /// let quote = RawQuote {
    ///     strike: 100.0,
    ///     bid: 0.0,
    ///     ask: 5.0,
    ///     expiration: NaiveDate::from_ymd_opt(2027, 1, 15).unwrap(),
    ///     reference_vol: None,
    /// };
    /// assert_eq!(EligibleQuote::from_raw(&quote, eval, 7), Err(Ineligible::Illiquid));
    /// ```
    pub fn from_raw(
        raw: &RawQuote,
        evaluation: chrono::NaiveDateTime,
        cutoff_days: i64,
    ) -> Result<Self, Ineligible> {
        if !conventions::is_beyond_cutoff(raw.expiration, evaluation, cutoff_days) {
            return Err(Ineligible::Expired);
        }
        if !(raw.bid > 0.0 && raw.ask > 0.0) || !raw.bid.is_finite() || !raw.ask.is_finite() {
            return Err(Ineligible::Illiquid);
        }
        if !raw.strike.is_finite() || raw.strike <= 0.0 {
            return Err(Ineligible::InvalidStrike);
        }

        Ok(Self {
            strike: raw.strike,
            expiration: raw.expiration,
            mid_price: conventions::mid_price(raw.bid, raw.ask),
            time_to_expiry: conventions::year_fraction(evaluation, raw.expiration),
            reference_vol: raw.reference_vol,
        })
    }
}

/// An eligible quote with a model implied volatility.
///
/// Only quotes whose mid price could be inverted exist as `CalibratedQuote`s;
/// there is no placeholder for a failed inversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibratedQuote {
    pub strike: f64,
    pub expiration: NaiveDate,
    pub mid_price: f64,
    pub time_to_expiry: f64,
    pub reference_vol: Option<f64>,
    /// Black-Scholes implied volatility of the mid price.
    pub implied_vol: Vol,
    /// `implied_vol − reference_vol`, when a reference is present.
    pub vol_diff: Option<f64>,
}

impl CalibratedQuote {
    fn new(quote: &EligibleQuote, implied_vol: Vol) -> Self {
        Self {
            strike: quote.strike,
            expiration: quote.expiration,
            mid_price: quote.mid_price,
            time_to_expiry: quote.time_to_expiry,
            reference_vol: quote.reference_vol,
            implied_vol,
            vol_diff: field::difference(implied_vol.0, quote.reference_vol),
        }
    }
}

/// Aggregate outcome counts of one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub total: usize,
    pub expired: usize,
    pub illiquid: usize,
    #[serde(default)]
    pub invalid_strike: usize,
    pub no_solution: usize,
    pub calibrated: usize,
}

enum Outcome {
    Calibrated(CalibratedQuote),
    Rejected(Ineligible),
    NoSolution,
}

/// Filters raw quotes and calibrates an implied volatility for each survivor.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use volgrid::implied::call_price;
/// use volgrid::market::{MarketContext, RawQuote};
/// use volgrid::pipeline::QuoteFilterPipeline;
///
/// let eval = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let ctx = MarketContext::new(100.0, 0.0, 0.0, eval)?;
/// let price = call_price(0.2, 100.0, 100.0, 1.0, 0.0, 0.0);
/// let quote = RawQuote {
///     strike: 100.0,
///     bid: price - 0.01,
///     ask: price + 0.01,
///     expiration: NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(),
///     reference_vol: Some(0.19),
/// };
///
/// let calibrated = QuoteFilterPipeline::new().run(&[quote], &ctx);
/// assert_eq!(calibrated.len(), 1);
/// assert!((calibrated[0].implied_vol.0 - 0.2).abs() < 1e-9);
/// # Ok::<(), volgrid::VolGridError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct QuoteFilterPipeline {
    solver: ImpliedVolSolver,
    cutoff_days: i64,
}

impl QuoteFilterPipeline {
    /// Pipeline with the default solver bracket and a 7-day expiry cutoff.
    pub fn new() -> Self {
        Self {
            solver: ImpliedVolSolver::new(),
            cutoff_days: EXPIRY_CUTOFF_DAYS,
        }
    }

    /// Use a custom implied-volatility solver.
    pub fn solver(mut self, solver: ImpliedVolSolver) -> Self {
        self.solver = solver;
        self
    }

    /// Override the expiry cutoff in calendar days.
    pub fn cutoff_days(mut self, days: i64) -> Self {
        self.cutoff_days = days;
        self
    }

    /// Volatility bracket of the underlying solver.
    pub fn bracket(&self) -> VolBracket {
        self.solver.bracket()
    }

    pub fn expiry_cutoff_days(&self) -> i64 {
        self.cutoff_days
    }

    /// Filter and calibrate `quotes`; the result preserves input order.
    pub fn run(&self, quotes: &[RawQuote], market: &MarketContext) -> Vec<CalibratedQuote> {
        self.run_with_report(quotes, market).0
    }

    /// Like [`run`](Self::run), also returning per-outcome counts.
    pub fn run_with_report(
        &self,
        quotes: &[RawQuote],
        market: &MarketContext,
    ) -> (Vec<CalibratedQuote>, PipelineReport) {
        #[cfg(feature = "parallel")]
        let outcomes: Vec<Outcome> = quotes
            .par_iter()
            .map(|q| self.process(q, market))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<Outcome> = quotes.iter().map(|q| self.process(q, market)).collect();

        let mut report = PipelineReport {
            total: quotes.len(),
            ..PipelineReport::default()
        };
        let calibrated: Vec<CalibratedQuote> = outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                Outcome::Calibrated(q) => Some(q),
                Outcome::Rejected(Ineligible::Expired) => {
                    report.expired += 1;
                    None
                }
                Outcome::Rejected(Ineligible::Illiquid) => {
                    report.illiquid += 1;
                    None
                }
                Outcome::Rejected(Ineligible::InvalidStrike) => {
                    report.invalid_strike += 1;
                    None
                }
                Outcome::NoSolution => {
                    report.no_solution += 1;
                    None
                }
            })
            .collect();
        report.calibrated = calibrated.len();

        #[cfg(feature = "logging")]
        tracing::debug!(
            total = report.total,
            expired = report.expired,
            illiquid = report.illiquid,
            invalid_strike = report.invalid_strike,
            no_solution = report.no_solution,
            calibrated = report.calibrated,
            "quote pipeline complete"
        );

        (calibrated, report)
    }

    fn process(&self, raw: &RawQuote, market: &MarketContext) -> Outcome {
        let eligible = match EligibleQuote::from_raw(raw, market.evaluation(), self.cutoff_days) {
            Ok(q) => q,
            Err(reason) => return Outcome::Rejected(reason),
        };
        match self.solver.try_solve(
            eligible.mid_price,
            eligible.strike,
            market.spot(),
            eligible.time_to_expiry,
            market.rate(),
            market.dividend_yield(),
        ) {
            Ok(vol) => Outcome::Calibrated(CalibratedQuote::new(&eligible, vol)),
            Err(_) => Outcome::NoSolution,
        }
    }
}

impl Default for QuoteFilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
