//! Checks on market inputs and configuration values.

use crate::error::VolGridError;

fn rejected(name: &str, requirement: &str, value: f64) -> VolGridError {
    VolGridError::InvalidInput {
        message: format!("{name} must be {requirement}, got {value}"),
    }
}

/// Spot-like quantities: strictly positive and finite.
pub(crate) fn validate_positive(value: f64, name: &str) -> crate::error::Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(rejected(name, "positive and finite", value))
    }
}

/// Rate-like quantities: any finite value, negatives included.
pub(crate) fn validate_finite(value: f64, name: &str) -> crate::error::Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(rejected(name, "finite", value))
    }
}
