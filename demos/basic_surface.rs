//! Build a volatility surface from a market snapshot.
//!
//! Demonstrates the core workflow:
//!   1. Assemble a snapshot of call chains (normally loaded from JSON)
//!   2. Run the full engine: filter, calibrate, interpolate
//!   3. Inspect the pipeline report and the grid
//!
//! Run with: `cargo run --example basic_surface`

use chrono::{Duration, NaiveDate};
use volgrid::conventions;
use volgrid::implied::call_price;
use volgrid::provider::{ChainQuote, StaticProvider};
use volgrid::{SurfaceConfig, compute_surface};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let evaluation = NaiveDate::from_ymd_opt(2026, 10, 15)
        .ok_or("bad date")?
        .and_hms_opt(15, 0, 0)
        .ok_or("bad time")?;
    let config = SurfaceConfig::default();
    let spot = 100.0;

    // ---------------------------------------------------------------
    // 1. Snapshot: equity-like skew, vols fall with maturity
    // ---------------------------------------------------------------

    let strikes = [80.0, 85.0, 90.0, 95.0, 100.0, 105.0, 110.0, 115.0, 120.0];
    let mut provider = StaticProvider::new(Some(spot)).with_symbol("DEMO");
    for days in [4, 30, 60, 120, 240, 480] {
        let expiration = evaluation.date() + Duration::days(days);
        let t = conventions::year_fraction(evaluation, expiration);
        let chain = strikes
            .iter()
            .map(|&k| {
                let m = (k - spot) / spot;
                let sigma = 0.22 - 0.15 * m + 0.2 * m * m - 0.01 * t;
                let p = call_price(sigma, k, spot, t, config.rate, config.dividend_yield);
                ChainQuote {
                    strike: k,
                    bid: (p - 0.02).max(0.0),
                    ask: p + 0.02,
                    implied_volatility: Some(sigma),
                }
            })
            .collect();
        provider = provider.with_chain(expiration, chain);
    }

    // ---------------------------------------------------------------
    // 2. Compute the surface
    // ---------------------------------------------------------------

    let out = compute_surface(&provider, &config, evaluation)?;
    let r = &out.report;
    println!("Quotes: {} total, {} calibrated", r.total, r.calibrated);
    println!(
        "  dropped: {} expired, {} illiquid, {} without an implied vol",
        r.expired, r.illiquid, r.no_solution
    );

    // ---------------------------------------------------------------
    // 3. Print a coarse view of the grid
    // ---------------------------------------------------------------

    let (rows, cols) = out.grid.shape();
    println!(
        "\n{} ({} x {}, {} nodes defined)\n",
        out.labels.title,
        rows,
        cols,
        out.grid.defined_count()
    );
    print!("{:>8}", "K \\ T");
    for j in (0..cols).step_by(6) {
        print!("{:>8.3}", out.grid.times[j]);
    }
    println!();
    for i in (0..rows).step_by(4) {
        print!("{:>8.1}", out.grid.strikes[i]);
        for j in (0..cols).step_by(6) {
            match out.grid.value_at(i, j) {
                Some(v) => print!("{:>7.2}%", v * 100.0),
                None => print!("{:>8}", "-"),
            }
        }
        println!();
    }

    Ok(())
}
