//! Error types for the IDX trade engine

use thiserror::Error;

/// Main error type for the IDX trade engine
///
/// Only contract violations end up here. Degenerate numeric cases
/// (zero cost basis, not enough capital for one lot) resolve to `0`, and
/// a ladder running into the regulatory floor is reported through
/// [`crate::exchange::LadderEnd`].
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid price for {field}: {price}")]
    InvalidPrice { field: &'static str, price: f64 },

    #[error("Invalid lot count: {lots} (must be greater than zero)")]
    InvalidLots { lots: f64 },

    #[error("Invalid {side} fee rate: {rate} (must be within [0, 1))")]
    InvalidFeeRate { side: &'static str, rate: f64 },

    #[error("Invalid ratio for {field}: {value} (must be greater than zero)")]
    InvalidRatio { field: &'static str, value: f64 },

    #[error("Unknown broker: {0}")]
    UnknownBroker(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Result type alias for trade engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Reject negative or non-finite prices. Zero is allowed.
pub(crate) fn ensure_price(field: &'static str, price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(EngineError::InvalidPrice { field, price });
    }
    Ok(())
}

/// Reject zero, negative or non-finite prices.
pub(crate) fn ensure_positive_price(field: &'static str, price: f64) -> Result<()> {
    if !price.is_finite() || price <= 0.0 {
        return Err(EngineError::InvalidPrice { field, price });
    }
    Ok(())
}

pub(crate) fn ensure_fee_rate(side: &'static str, rate: f64) -> Result<()> {
    if !rate.is_finite() || !(0.0..1.0).contains(&rate) {
        return Err(EngineError::InvalidFeeRate { side, rate });
    }
    Ok(())
}
