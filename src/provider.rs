//! Market-data boundary: spot price and per-expiry call chains.
//!
//! The engine never talks to a data vendor directly. It asks a
//! [`MarketDataProvider`] for the spot, the listed expirations, and the call
//! chain of each expiration it still cares about. [`StaticProvider`] serves
//! a snapshot held in memory (typically loaded from JSON).

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::conventions;
use crate::error::VolGridError;
use crate::market::RawQuote;

/// One row of a call-option chain, before it is tagged with its expiration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainQuote {
    pub strike: f64,
    pub bid: f64,
    pub ask: f64,
    /// Provider-published implied volatility.
    #[serde(default)]
    pub implied_volatility: Option<f64>,
}

/// Source of spot prices and option chains for one underlying.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait MarketDataProvider: Send + Sync {
    /// Ticker or other identifier, used in error messages.
    fn symbol(&self) -> Option<&str> {
        None
    }

    /// Latest spot price, `None` if the provider has none.
    fn spot_price(&self) -> crate::error::Result<Option<f64>>;

    /// Listed expiration dates.
    fn expirations(&self) -> crate::error::Result<Vec<NaiveDate>>;

    /// Call quotes for a single expiration.
    fn call_chain(&self, expiration: NaiveDate) -> crate::error::Result<Vec<ChainQuote>>;
}

/// Fetch the spot price, failing if it is missing or unusable.
///
/// # Errors
/// [`VolGridError::MissingSpotPrice`] when the provider returns `None` or a
/// non-positive / non-finite value; provider errors pass through.
pub fn require_spot(provider: &dyn MarketDataProvider) -> crate::error::Result<f64> {
    match provider.spot_price()? {
        Some(spot) if spot.is_finite() && spot > 0.0 => Ok(spot),
        _ => Err(VolGridError::MissingSpotPrice {
            symbol: provider.symbol().map(str::to_owned),
        }),
    }
}

/// Gather raw call quotes for every expiration beyond the cutoff.
///
/// Expirations at or inside `evaluation + cutoff_days` are skipped without
/// requesting their chains. Expirations are visited in ascending order.
pub fn collect_quotes(
    provider: &dyn MarketDataProvider,
    evaluation: NaiveDateTime,
    cutoff_days: i64,
) -> crate::error::Result<Vec<RawQuote>> {
    let mut expirations = provider.expirations()?;
    expirations.sort_unstable();
    expirations.dedup();

    let mut quotes = Vec::new();
    let mut skipped = 0usize;
    for expiration in expirations {
        if !conventions::is_beyond_cutoff(expiration, evaluation, cutoff_days) {
            skipped += 1;
            continue;
        }
        let chain = provider.call_chain(expiration)?;
        quotes.extend(chain.into_iter().map(|row| RawQuote {
            strike: row.strike,
            bid: row.bid,
            ask: row.ask,
            expiration,
            reference_vol: row.implied_volatility,
        }));
    }

    #[cfg(feature = "logging")]
    tracing::debug!(
        quotes = quotes.len(),
        skipped_expirations = skipped,
        "collected option chains"
    );
    #[cfg(not(feature = "logging"))]
    let _ = skipped;

    Ok(quotes)
}

/// In-memory market snapshot.
///
/// # JSON format
/// ```json
/// {
///   "symbol": "SPY",
///   "spot": 100.0,
///   "chains": {
///     "2026-12-18": [
///       { "strike": 95.0, "bid": 7.1, "ask": 7.3, "implied_volatility": 0.21 }
///     ]
///   }
/// }
/// ```
///
/// # Examples
/// ```
/// use volgrid::provider::{MarketDataProvider, StaticProvider};
///
/// let provider = StaticProvider::from_json(
///     r#"{"spot": 100.0, "chains": {"2026-12-18": [{"strike": 95.0, "bid": 7.1, "ask": 7.3}]}}"#,
/// )?;
/// assert_eq!(provider.spot_price()?, Some(100.0));
/// assert_eq!(provider.expirations()?.len(), 1);
/// # Ok::<(), volgrid::VolGridError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticProvider {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub spot: Option<f64>,
    #[serde(default)]
    pub chains: BTreeMap<NaiveDate, Vec<ChainQuote>>,
}

impl StaticProvider {
    pub fn new(spot: Option<f64>) -> Self {
        Self {
            spot,
            ..Self::default()
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Add (or replace) the call chain of one expiration.
    pub fn with_chain(mut self, expiration: NaiveDate, chain: Vec<ChainQuote>) -> Self {
        self.chains.insert(expiration, chain);
        self
    }

    /// # Errors
    /// [`VolGridError::Provider`] if `json` is not a valid snapshot.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        serde_json::from_str(json).map_err(|e| VolGridError::Provider {
            message: format!("invalid market snapshot: {e}"),
        })
    }

    /// # Errors
    /// [`VolGridError::Provider`] if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| VolGridError::Provider {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        Self::from_json(&contents)
    }
}

impl MarketDataProvider for StaticProvider {
    fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    fn spot_price(&self) -> crate::error::Result<Option<f64>> {
        Ok(self.spot)
    }

    fn expirations(&self) -> crate::error::Result<Vec<NaiveDate>> {
        Ok(self.chains.keys().copied().collect())
    }

    fn call_chain(&self, expiration: NaiveDate) -> crate::error::Result<Vec<ChainQuote>> {
        self.chains
            .get(&expiration)
            .cloned()
            .ok_or_else(|| VolGridError::Provider {
                message: format!("no call chain for {expiration}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn eval() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(strike: f64, iv: Option<f64>) -> ChainQuote {
        ChainQuote {
            strike,
            bid: 1.0,
            ask: 1.2,
            implied_volatility: iv,
        }
    }

    /// Records which chains were requested.
    struct Recording {
        inner: StaticProvider,
        requested: Mutex<Vec<NaiveDate>>,
    }

    impl MarketDataProvider for Recording {
        fn spot_price(&self) -> crate::error::Result<Option<f64>> {
            self.inner.spot_price()
        }
        fn expirations(&self) -> crate::error::Result<Vec<NaiveDate>> {
            self.inner.expirations()
        }
        fn call_chain(&self, expiration: NaiveDate) -> crate::error::Result<Vec<ChainQuote>> {
            self.requested.lock().unwrap().push(expiration);
            self.inner.call_chain(expiration)
        }
    }

    #[test]
    fn collect_tags_rows_with_expiration() {
        let provider = StaticProvider::new(Some(100.0))
            .with_chain(date(2026, 12, 18), vec![row(95.0, Some(0.2)), row(105.0, None)])
            .with_chain(date(2027, 3, 19), vec![row(100.0, Some(0.22))]);
        let quotes = collect_quotes(&provider, eval(), 7).unwrap();
        assert_eq!(quotes.len(), 3);
        assert_eq!(quotes[0].expiration, date(2026, 12, 18));
        assert_eq!(quotes[0].reference_vol, Some(0.2));
        assert_eq!(quotes[1].reference_vol, None);
        assert_eq!(quotes[2].expiration, date(2027, 3, 19));
        assert_eq!(quotes[2].strike, 100.0);
    }

    #[test]
    fn near_expirations_are_never_requested() {
        let provider = Recording {
            inner: StaticProvider::new(Some(100.0))
                .with_chain(date(2026, 10, 16), vec![row(100.0, None)])
                .with_chain(date(2026, 10, 22), vec![row(100.0, None)])
                .with_chain(date(2026, 10, 23), vec![row(100.0, None)]),
            requested: Mutex::new(Vec::new()),
        };
        let quotes = collect_quotes(&provider, eval(), 7).unwrap();
        // 10-22 midnight is before eval + 7 days (10-22 12:00); 10-23 is after.
        assert_eq!(*provider.requested.lock().unwrap(), vec![date(2026, 10, 23)]);
        assert_eq!(quotes.len(), 1);
    }

    #[test]
    fn require_spot_rejects_missing_and_bad_values() {
        for spot in [None, Some(0.0), Some(-5.0), Some(f64::NAN)] {
            let provider = StaticProvider::new(spot).with_symbol("XYZ");
            match require_spot(&provider) {
                Err(VolGridError::MissingSpotPrice { symbol }) => {
                    assert_eq!(symbol.as_deref(), Some("XYZ"));
                }
                other => panic!("expected MissingSpotPrice, got {other:?}"),
            }
        }
        assert_eq!(require_spot(&StaticProvider::new(Some(412.5))).unwrap(), 412.5);
    }

    #[test]
    fn parses_snapshot_json() {
        let provider = StaticProvider::from_json(
            r#"{
                "symbol": "SPY",
                "spot": 512.3,
                "chains": {
                    "2027-01-15": [
                        {"strike": 500.0, "bid": 30.1, "ask": 30.6, "implied_volatility": 0.18},
                        {"strike": 520.0, "bid": 19.8, "ask": 20.2}
                    ]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(provider.symbol(), Some("SPY"));
        assert_eq!(provider.spot_price().unwrap(), Some(512.3));
        let chain = provider.call_chain(date(2027, 1, 15)).unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[1].implied_volatility, None);
    }

    #[test]
    fn malformed_json_is_provider_error() {
        assert!(matches!(
            StaticProvider::from_json("{\"spot\": \"abc\"}"),
            Err(VolGridError::Provider { .. })
        ));
    }

    #[test]
    fn unknown_expiration_is_provider_error() {
        let provider = StaticProvider::new(Some(100.0));
        assert!(matches!(
            provider.call_chain(date(2027, 1, 15)),
            Err(VolGridError::Provider { .. })
        ));
    }

    #[test]
    fn missing_file_is_provider_error() {
        assert!(matches!(
            StaticProvider::from_file("/nonexistent/volgrid/snapshot.json"),
            Err(VolGridError::Provider { .. })
        ));
    }
}
