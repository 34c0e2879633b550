//! Market conventions for quote preparation.
//!
//! Day counting, the near-expiry cutoff, and the observed-price convention
//! used when turning a raw quote into a calibration input.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Days per year in the ACT/365 day count.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Contracts expiring within this many calendar days of the evaluation time
/// are excluded from calibration.
pub const EXPIRY_CUTOFF_DAYS: i64 = 7;

/// The instant a contract expires, taken as midnight at the start of its
/// expiration date.
pub fn expiration_instant(expiration: NaiveDate) -> NaiveDateTime {
    expiration.and_time(NaiveTime::MIN)
}

/// Whether `expiration` lies strictly after `evaluation + cutoff_days`.
///
/// ```
/// use chrono::NaiveDate;
/// use volgrid::conventions::is_beyond_cutoff;
///
/// let eval = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap().and_hms_opt(12, 0, 0).unwrap();
/// let near = NaiveDate::from_ymd_opt(2026, 10, 22).unwrap();
/// let far = NaiveDate::from_ymd_opt(2026, 10, 23).unwrap();
/// assert!(!is_beyond_cutoff(near, eval, 7));
/// assert!(is_beyond_cutoff(far, eval, 7));
/// ```
pub fn is_beyond_cutoff(expiration: NaiveDate, evaluation: NaiveDateTime, cutoff_days: i64) -> bool {
    expiration_instant(expiration) > evaluation + Duration::days(cutoff_days)
}

/// ACT/365 year fraction from `evaluation` to the expiration instant.
///
/// Counts whole elapsed days (partial days are floored), so an evaluation at
/// noon and one at 9am on the same date give the same time-to-expiry.
/// Returns a non-positive value for expired contracts.
pub fn year_fraction(evaluation: NaiveDateTime, expiration: NaiveDate) -> f64 {
    let elapsed = expiration_instant(expiration) - evaluation;
    let whole_days = elapsed.num_seconds().div_euclid(86_400);
    whole_days as f64 / DAYS_PER_YEAR
}

/// Mid price `(bid + ask) / 2`, the observed price used for calibration.
pub fn mid_price(bid: f64, ask: f64) -> f64 {
    (bid + ask) / 2.0
}
