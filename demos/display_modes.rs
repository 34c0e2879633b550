//! Compare the model, reference, and diff views of the same quotes.
//!
//! The provider's published vols are shifted from the model vols, so the
//! diff view shows the shift as a (nearly) flat surface.
//!
//! Run with: `cargo run --example display_modes`

use chrono::{Duration, NaiveDate};
use volgrid::conventions;
use volgrid::implied::call_price;
use volgrid::provider::{ChainQuote, StaticProvider};
use volgrid::surface::DisplayMode;
use volgrid::{SurfaceConfig, compute_surface};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let evaluation = NaiveDate::from_ymd_opt(2026, 10, 15)
        .ok_or("bad date")?
        .and_hms_opt(10, 0, 0)
        .ok_or("bad time")?;
    let spot = 250.0;
    let base = SurfaceConfig::default();

    let mut provider = StaticProvider::new(Some(spot));
    for days in [21, 63, 126, 252] {
        let expiration = evaluation.date() + Duration::days(days);
        let t = conventions::year_fraction(evaluation, expiration);
        let chain = (0..11)
            .map(|i| {
                let k = 200.0 + 10.0 * i as f64;
                let sigma = 0.3 - 0.0005 * (k - spot);
                let p = call_price(sigma, k, spot, t, base.rate, base.dividend_yield);
                ChainQuote {
                    strike: k,
                    bid: p * 0.995,
                    ask: p * 1.005,
                    // Every third strike has no published vol.
                    implied_volatility: (i % 3 != 0).then_some(sigma + 0.015),
                }
            })
            .collect();
        provider = provider.with_chain(expiration, chain);
    }

    for mode in [DisplayMode::ModelVol, DisplayMode::ReferenceVol, DisplayMode::VolDiff] {
        let config = SurfaceConfig {
            display_mode: mode,
            ..base.clone()
        };
        let out = compute_surface(&provider, &config, evaluation)?;
        let values: Vec<f64> = out.grid.z.iter().flatten().flatten().copied().collect();
        let (lo, hi) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        println!("[{mode}] {}", out.labels.z);
        println!(
            "  {} points -> {} of {} nodes defined, range [{lo:.4}, {hi:.4}]",
            out.points.len(),
            values.len(),
            out.grid.shape().0 * out.grid.shape().1,
        );
    }

    Ok(())
}
