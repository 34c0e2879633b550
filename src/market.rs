//! Market inputs for one surface computation.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::VolGridError;
use crate::validate::{validate_finite, validate_positive};

/// Spot, rates, and evaluation time shared by every quote in a run.
///
/// Read-only once constructed; the pipeline borrows it from every worker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MarketContextRaw", into = "MarketContextRaw")]
pub struct MarketContext {
    spot: f64,
    rate: f64,
    dividend_yield: f64,
    evaluation: NaiveDateTime,
}

#[derive(Serialize, Deserialize)]
struct MarketContextRaw {
    spot: f64,
    rate: f64,
    dividend_yield: f64,
    evaluation: NaiveDateTime,
}

impl TryFrom<MarketContextRaw> for MarketContext {
    type Error = VolGridError;
    fn try_from(raw: MarketContextRaw) -> Result<Self, Self::Error> {
        Self::new(raw.spot, raw.rate, raw.dividend_yield, raw.evaluation)
    }
}

impl From<MarketContext> for MarketContextRaw {
    fn from(m: MarketContext) -> Self {
        Self {
            spot: m.spot,
            rate: m.rate,
            dividend_yield: m.dividend_yield,
            evaluation: m.evaluation,
        }
    }
}

impl MarketContext {
    /// Create a market context.
    ///
    /// # Errors
    /// Returns [`VolGridError::InvalidInput`](crate::VolGridError::InvalidInput)
    /// if `spot` is not positive and finite or `rate` / `dividend_yield` are not finite.
    pub fn new(
        spot: f64,
        rate: f64,
        dividend_yield: f64,
        evaluation: NaiveDateTime,
    ) -> crate::error::Result<Self> {
        validate_positive(spot, "spot")?;
        validate_finite(rate, "rate")?;
        validate_finite(dividend_yield, "dividend_yield")?;
        Ok(Self {
            spot,
            rate,
            dividend_yield,
            evaluation,
        })
    }

    pub fn spot(&self) -> f64 {
        self.spot
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn dividend_yield(&self) -> f64 {
        self.dividend_yield
    }

    pub fn evaluation(&self) -> NaiveDateTime {
        self.evaluation
    }
}

/// A call option quote as delivered by the market-data provider.
///
/// `bid` or `ask` at or below zero means there is no market on that side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawQuote {
    pub strike: f64,
    pub bid: f64,
    pub ask: f64,
    pub expiration: NaiveDate,
    /// Implied volatility published by the provider, if any.
    #[serde(default)]
    pub reference_vol: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn context_accessors() {
        let ctx = MarketContext::new(100.0, 0.015, 0.013, eval()).unwrap();
        assert_eq!(ctx.spot(), 100.0);
        assert_eq!(ctx.rate(), 0.015);
        assert_eq!(ctx.dividend_yield(), 0.013);
        assert_eq!(ctx.evaluation(), eval());
    }

    #[test]
    fn context_rejects_bad_spot() {
        assert!(MarketContext::new(0.0, 0.0, 0.0, eval()).is_err());
        assert!(MarketContext::new(f64::NAN, 0.0, 0.0, eval()).is_err());
    }

    #[test]
    fn context_allows_negative_rate() {
        assert!(MarketContext::new(100.0, -0.005, 0.0, eval()).is_ok());
        assert!(MarketContext::new(100.0, f64::INFINITY, 0.0, eval()).is_err());
    }

    #[test]
    fn context_serde_round_trip() {
        let ctx = MarketContext::new(100.0, 0.015, 0.013, eval()).unwrap();
        let json = serde_json::to_string(&ctx).unwrap();
        let back: MarketContext = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ctx);
    }

    #[test]
    fn context_deserialize_rejects_invalid() {
        let negative_spot = r#"{"spot": -5.0, "rate": 0.015, "dividend_yield": 0.013, "evaluation": "2026-10-15T10:00:00"}"#;
        let err = serde_json::from_str::<MarketContext>(negative_spot).unwrap_err();
        assert!(err.to_string().contains("spot"), "{err}");

        let zero_spot = r#"{"spot": 0.0, "rate": 0.0, "dividend_yield": 0.0, "evaluation": "2026-10-15T10:00:00"}"#;
        assert!(serde_json::from_str::<MarketContext>(zero_spot).is_err());
    }

    #[test]
    fn raw_quote_deserializes_without_reference() {
        let q: RawQuote = serde_json::from_str(
            r#"{"strike": 100.0, "bid": 1.0, "ask": 1.2, "expiration": "2026-12-18"}"#,
        )
        .unwrap();
        assert_eq!(q.reference_vol, None);
        assert_eq!(q.expiration, NaiveDate::from_ymd_opt(2026, 12, 18).unwrap());
    }
}
