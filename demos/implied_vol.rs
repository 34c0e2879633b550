//! Price calls with Black-Scholes-Merton and recover their implied vols.
//!
//! Shows how to:
//!   - Price a call with a continuous dividend yield
//!   - Invert the price with the Brent-based solver
//!   - See which prices have no implied volatility
//!
//! Run with: `cargo run --example implied_vol`

use volgrid::implied::{ImpliedVolSolver, MAX_VOL, MIN_VOL, SolveFailure, call_price};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let spot = 100.0;
    let expiry = 0.5; // 6 months
    let rate = 0.015;
    let q = 0.013;
    let vol = 0.25;

    // ---------------------------------------------------------------
    // 1. Reference price
    // ---------------------------------------------------------------

    let atm = call_price(0.2, 100.0, 100.0, 1.0, 0.0, 0.0);
    println!("ATM 1y call at 20% vol, r = q = 0: {atm:.4}");

    // ---------------------------------------------------------------
    // 2. Round trip across strikes
    // ---------------------------------------------------------------

    let solver = ImpliedVolSolver::new();
    println!("\n--- Round trip at {:.0}% vol ---\n", vol * 100.0);
    println!("{:>8} {:>12} {:>14} {:>14}", "Strike", "Call Price", "Implied Vol", "Error");
    println!("{}", "-".repeat(52));

    for k in [80.0, 90.0, 95.0, 100.0, 105.0, 110.0, 120.0] {
        let price = call_price(vol, k, spot, expiry, rate, q);
        let iv = solver
            .solve(price, k, spot, expiry, rate, q)
            .ok_or("expected an implied vol")?;
        println!(
            "{k:>8.0} {price:>12.6} {:>13.8}% {:>14.2e}",
            iv.0 * 100.0,
            (iv.0 - vol).abs()
        );
    }

    // ---------------------------------------------------------------
    // 3. Prices outside the [MIN_VOL, MAX_VOL] range
    // ---------------------------------------------------------------

    let floor = call_price(MIN_VOL, 80.0, spot, expiry, rate, q);
    let ceiling = call_price(MAX_VOL, 100.0, spot, expiry, rate, q);
    println!("\n--- No-solution cases ---\n");

    let cases = [
        ("below discounted intrinsic", floor - 0.5, 80.0),
        ("above the 500% vol price", ceiling + 0.5, 100.0),
        ("zero price", 0.0, 100.0),
    ];
    for (label, price, k) in cases {
        let outcome = solver.try_solve(price, k, spot, expiry, rate, q);
        let reason = match outcome {
            Ok(v) => format!("solved: {:.4}", v.0),
            Err(SolveFailure::NotBracketed) => "not bracketed".to_string(),
            Err(SolveFailure::InvalidInput) => "invalid input".to_string(),
            Err(SolveFailure::NoConvergence) => "no convergence".to_string(),
        };
        println!("  {label:<28} K={k:<5} price={price:>9.4} -> {reason}");
    }

    Ok(())
}
