//! Parameter validation shared by the generators and the propagation
//! engine.
//!
//! Malformed numeric configuration is a fatal error reported before any
//! simulation work begins, never silently defaulted.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a fraction in [0, 1], got {value}")]
    FractionOutOfRange { name: &'static str, value: f64 },
    #[error("{name} must be finite and non-negative, got {value}")]
    Invalid { name: &'static str, value: f64 },
    #[error("{name} must be at least {min}, got {value}")]
    TooSmall {
        name: &'static str,
        min: usize,
        value: usize,
    },
}

pub(crate) fn check_fraction(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::FractionOutOfRange { name, value });
    }
    Ok(())
}

pub(crate) fn check_non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Invalid { name, value });
    }
    Ok(())
}

pub(crate) fn check_at_least(
    name: &'static str,
    min: usize,
    value: usize,
) -> Result<(), ConfigError> {
    if value < min {
        return Err(ConfigError::TooSmall { name, min, value });
    }
    Ok(())
}
