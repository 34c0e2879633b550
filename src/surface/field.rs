//! Selection of the scalar field that feeds the surface.
//!
//! A calibrated quote carries three candidate values: the model implied
//! volatility, the provider's reference volatility, and their difference.
//! [`DisplayMode`] picks one; [`select_points`] projects the calibrated
//! quotes onto `(time, strike, value)` triples, dropping quotes where the
//! chosen value is missing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VolGridError;
use crate::pipeline::CalibratedQuote;
use crate::surface::SurfacePoint;

/// Which per-quote value is interpolated onto the grid.
///
/// Deserialization goes through [`FromStr`], so every config source accepts
/// the same case-insensitive names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum DisplayMode {
    /// Black-Scholes implied volatility of the mid price.
    #[default]
    #[serde(rename = "model")]
    ModelVol,
    /// Implied volatility published by the market-data provider.
    #[serde(rename = "reference")]
    ReferenceVol,
    /// Model minus reference.
    #[serde(rename = "diff")]
    VolDiff,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::ModelVol => "model",
            DisplayMode::ReferenceVol => "reference",
            DisplayMode::VolDiff => "diff",
        }
    }

    /// The value this mode reads from a calibrated quote.
    pub fn value_of(&self, quote: &CalibratedQuote) -> Option<f64> {
        match self {
            DisplayMode::ModelVol => Some(quote.implied_vol.0),
            DisplayMode::ReferenceVol => quote.reference_vol.filter(|v| v.is_finite()),
            DisplayMode::VolDiff => vol_diff(quote),
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayMode {
    type Err = VolGridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "model" => Ok(DisplayMode::ModelVol),
            "reference" => Ok(DisplayMode::ReferenceVol),
            "diff" => Ok(DisplayMode::VolDiff),
            other => Err(VolGridError::InvalidInput {
                message: format!(
                    "unknown display mode '{other}', expected one of: model, reference, diff"
                ),
            }),
        }
    }
}

impl TryFrom<String> for DisplayMode {
    type Error = VolGridError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Axis and chart titles for a rendered surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisLabels {
    pub title: String,
    pub x: String,
    pub y: String,
    pub z: String,
}

impl AxisLabels {
    pub fn for_mode(mode: DisplayMode) -> Self {
        let z = match mode {
            DisplayMode::ModelVol => "Implied Volatility",
            DisplayMode::ReferenceVol => "Reference Implied Volatility",
            DisplayMode::VolDiff => "Volatility Diff (Model - Reference)",
        };
        Self {
            title: "Black Scholes Implied Volatility Surface".into(),
            x: "Time to Maturity (Years)".into(),
            y: "Strike Price".into(),
            z: z.into(),
        }
    }
}

/// Model implied volatility minus the quote's reference volatility.
///
/// `None` when the quote has no usable reference.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use volgrid::pipeline::CalibratedQuote;
/// use volgrid::surface::vol_diff;
/// use volgrid::types::Vol;
///
/// let quote = CalibratedQuote {
///     strike: 100.0,
///     expiration: NaiveDate::from_ymd_opt(2027, 1, 15).unwrap(),
///     mid_price: 4.2,
///     time_to_expiry: 0.25,
///     reference_vol: Some(0.19),
///     implied_vol: Vol(0.21),
///     vol_diff: None,
/// };
/// assert!((vol_diff(&quote).unwrap() - 0.02).abs() < 1e-12);
/// ```
pub fn vol_diff(quote: &CalibratedQuote) -> Option<f64> {
    difference(quote.implied_vol.0, quote.reference_vol)
}

pub(crate) fn difference(computed: f64, reference: Option<f64>) -> Option<f64> {
    reference
        .filter(|r| r.is_finite())
        .map(|r| computed - r)
}

/// Project calibrated quotes onto surface points for `mode`.
///
/// Quotes whose selected value is missing are left out.
pub fn select_points(quotes: &[CalibratedQuote], mode: DisplayMode) -> Vec<SurfacePoint> {
    quotes
        .iter()
        .filter_map(|q| {
            mode.value_of(q).map(|value| SurfacePoint {
                time: q.time_to_expiry,
                strike: q.strike,
                value,
            })
        })
        .collect()
}
