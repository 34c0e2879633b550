//! Error types for the volgrid library.
//!
//! Only hard failures are errors. Data-quality outcomes (an illiquid quote, a
//! price with no implied volatility, a grid node outside the convex hull) are
//! expressed as `Option`s or dropped rows, never as `Err`.

use thiserror::Error;

/// Convenience type alias for results in this crate.
pub type Result<T> = std::result::Result<T, VolGridError>;

/// Errors that can abort a surface computation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VolGridError {
    /// The market-data provider has no usable spot price for the underlying.
    #[error("missing spot price{}", .symbol.as_deref().map(|s| format!(" for {s}")).unwrap_or_default())]
    MissingSpotPrice {
        /// Instrument identifier, when the provider knows one.
        symbol: Option<String>,
    },

    /// Input data or parameters are invalid (e.g., zero resolution, NaN rate).
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// The market-data provider failed to deliver data.
    #[error("market data provider error: {message}")]
    Provider { message: String },

    /// Configuration could not be read, parsed, or validated.
    #[error("configuration error: {message}")]
    Config { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_spot_display_with_symbol() {
        let err = VolGridError::MissingSpotPrice {
            symbol: Some("FAKE".into()),
        };
        assert_eq!(format!("{err}"), "missing spot price for FAKE");
    }

    #[test]
    fn missing_spot_display_without_symbol() {
        let err = VolGridError::MissingSpotPrice { symbol: None };
        assert_eq!(format!("{err}"), "missing spot price");
    }

    #[test]
    fn error_display_includes_message() {
        let err = VolGridError::InvalidInput {
            message: "bad input".into(),
        };
        assert!(format!("{err}").contains("bad input"));

        let err = VolGridError::Provider {
            message: "chain unavailable".into(),
        };
        assert!(format!("{err}").contains("chain unavailable"));

        let err = VolGridError::Config {
            message: "rate must be finite".into(),
        };
        assert!(format!("{err}").contains("rate must be finite"));
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<VolGridError>();
    }
}
