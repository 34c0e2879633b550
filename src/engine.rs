//! End-to-end surface computation.
//!
//! ```text
//! provider ─► spot ─► MarketContext
//!          └► chains ─► RawQuote ─► QuoteFilterPipeline ─► CalibratedQuote
//!                                                             │ select_points(mode)
//!                                                             ▼
//!                                                   SurfaceBuilder ─► SurfaceGrid
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::config::SurfaceConfig;
use crate::market::MarketContext;
use crate::pipeline::{CalibratedQuote, PipelineReport};
use crate::provider::{self, MarketDataProvider};
use crate::surface::{AxisLabels, SurfaceGrid, SurfacePoint, select_points};

/// Everything a renderer needs to draw one surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceOutput {
    pub grid: SurfaceGrid,
    /// Scattered points that fed the grid.
    pub points: Vec<SurfacePoint>,
    /// Every quote that calibrated, regardless of display mode.
    pub quotes: Vec<CalibratedQuote>,
    pub labels: AxisLabels,
    pub report: PipelineReport,
}

/// Compute the surface for one provider snapshot.
///
/// Too few usable quotes is not an error: the grid then comes back
/// fully undefined (or empty when no point survives).
///
/// # Errors
/// - [`VolGridError::MissingSpotPrice`](crate::VolGridError::MissingSpotPrice)
///   if the provider has no usable spot price
/// - [`VolGridError::Provider`](crate::VolGridError::Provider) if the
///   provider fails
/// - [`VolGridError::Config`](crate::VolGridError::Config) for an invalid
///   configuration
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use volgrid::config::SurfaceConfig;
/// use volgrid::engine::compute_surface;
/// use volgrid::provider::StaticProvider;
/// use volgrid::VolGridError;
///
/// let eval = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap().and_hms_opt(10, 0, 0).unwrap();
/// let err = compute_surface(&StaticProvider::new(None), &SurfaceConfig::default(), eval).unwrap_err();
/// assert!(matches!(err, VolGridError::MissingSpotPrice { .. }));
/// ```
pub fn compute_surface(
    provider: &dyn MarketDataProvider,
    config: &SurfaceConfig,
    evaluation: NaiveDateTime,
) -> crate::error::Result<SurfaceOutput> {
    config.validate()?;
    let spot = provider::require_spot(provider)?;
    let market = MarketContext::new(spot, config.rate, config.dividend_yield, evaluation)?;

    #[cfg(feature = "logging")]
    tracing::info!(
        symbol = provider.symbol().unwrap_or("-"),
        spot,
        rate = config.rate,
        dividend_yield = config.dividend_yield,
        mode = %config.display_mode,
        "computing surface"
    );

    let raw = provider::collect_quotes(provider, evaluation, config.expiry_cutoff_days)?;
    let (quotes, report) = config.pipeline()?.run_with_report(&raw, &market);
    let points = select_points(&quotes, config.display_mode);
    let grid = config
        .surface_builder()
        .add_points(points.iter().copied())
        .build()?;

    #[cfg(feature = "logging")]
    tracing::info!(
        quotes = report.total,
        calibrated = report.calibrated,
        points = points.len(),
        defined_nodes = grid.defined_count(),
        "surface ready"
    );

    Ok(SurfaceOutput {
        grid,
        points,
        quotes,
        labels: AxisLabels::for_mode(config.display_mode),
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VolGridError;
    use crate::conventions;
    use crate::implied::call_price;
    use crate::provider::{ChainQuote, StaticProvider};
    use crate::surface::DisplayMode;
    use chrono::{Duration, NaiveDate};

    const SPOT: f64 = 100.0;

    fn eval() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 15)
            .unwrap()
            .and_hms_opt(16, 0, 0)
            .unwrap()
    }

    /// Snapshot priced off a flat 25% vol, reference quoted at 24%.
    fn snapshot(config: &SurfaceConfig) -> StaticProvider {
        let mut provider = StaticProvider::new(Some(SPOT)).with_symbol("TEST");
        for days in [3, 30, 90, 180, 365] {
            let expiration = eval().date() + Duration::days(days);
            let t = conventions::year_fraction(eval(), expiration);
            let chain = [80.0, 90.0, 100.0, 110.0, 120.0]
                .iter()
                .map(|&k| {
                    let p = call_price(0.25, k, SPOT, t.max(1e-4), config.rate, config.dividend_yield);
                    ChainQuote {
                        strike: k,
                        bid: p - 0.005,
                        ask: p + 0.005,
                        implied_volatility: Some(0.24),
                    }
                })
                .collect();
            provider = provider.with_chain(expiration, chain);
        }
        provider
    }

    #[test]
    fn flat_vol_snapshot_yields_flat_surface() {
        let config = SurfaceConfig::default();
        let out = compute_surface(&snapshot(&config), &config, eval()).unwrap();

        // The 3-day expiry is inside the cutoff and never fetched.
        assert_eq!(out.report.total, 20);
        assert_eq!(out.report.calibrated, 20);
        assert_eq!(out.points.len(), 20);
        assert_eq!(out.grid.shape(), (30, 30));
        // Points cover a rectangle, so every node is inside the hull.
        assert_eq!(out.grid.defined_count(), 900);
        for v in out.grid.z.iter().flatten().flatten() {
            assert!((v - 0.25).abs() < 1e-6, "value {v}");
        }
        assert_eq!(out.labels.z, "Implied Volatility");
    }

    #[test]
    fn diff_mode_surfaces_model_minus_reference() {
        let config = SurfaceConfig {
            display_mode: DisplayMode::VolDiff,
            ..SurfaceConfig::default()
        };
        let out = compute_surface(&snapshot(&config), &config, eval()).unwrap();
        assert_eq!(out.labels.z, "Volatility Diff (Model - Reference)");
        for p in &out.points {
            assert!((p.value - 0.01).abs() < 1e-6);
        }
    }

    #[test]
    fn missing_spot_aborts() {
        let config = SurfaceConfig::default();
        let provider = StaticProvider {
            spot: None,
            ..snapshot(&config)
        };
        match compute_surface(&provider, &config, eval()) {
            Err(VolGridError::MissingSpotPrice { symbol }) => {
                assert_eq!(symbol.as_deref(), Some("TEST"));
            }
            other => panic!("expected MissingSpotPrice, got {other:?}"),
        }
    }

    #[test]
    fn no_eligible_quotes_gives_empty_grid() {
        let provider = StaticProvider::new(Some(SPOT)).with_chain(
            eval().date() + Duration::days(60),
            vec![ChainQuote {
                strike: 100.0,
                bid: 0.0,
                ask: 0.0,
                implied_volatility: None,
            }],
        );
        let out = compute_surface(&provider, &SurfaceConfig::default(), eval()).unwrap();
        assert_eq!(out.report.illiquid, 1);
        assert!(out.points.is_empty());
        assert_eq!(out.grid.shape(), (0, 0));
    }

    #[test]
    fn invalid_config_is_rejected_before_fetching() {
        let config = SurfaceConfig {
            axis_resolution: 0,
            ..SurfaceConfig::default()
        };
        assert!(matches!(
            compute_surface(&StaticProvider::new(None), &config, eval()),
            Err(VolGridError::Config { .. })
        ));
    }

    #[test]
    fn output_serializes_to_json() {
        let config = SurfaceConfig::default();
        let out = compute_surface(&snapshot(&config), &config, eval()).unwrap();
        let json = serde_json::to_string(&out).unwrap();
        let back: SurfaceOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(back.report, out.report);
        assert_eq!(back.grid.shape(), (30, 30));
    }
}
