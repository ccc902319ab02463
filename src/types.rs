//! Core types shared across the exchange rules and the calculators

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

/// Ticker symbol
pub type Symbol = String;

/// Price per share in IDR
pub type Price = f64;

/// Money amount in IDR
pub type Cash = f64;

/// Fraction (0.25 means 25%)
pub type Percentage = f64;

/// Number of whole lots
pub type Lots = u64;

/// Listing board, selects the auto-reject table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardType {
    /// Papan Utama / Papan Pengembangan
    #[default]
    Regular,
    /// Papan Akselerasi
    Accelerated,
}

impl fmt::Display for BoardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardType::Regular => write!(f, "regular"),
            BoardType::Accelerated => write!(f, "accelerated"),
        }
    }
}

impl FromStr for BoardType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regular" | "utama" | "pengembangan" | "main" => Ok(BoardType::Regular),
            "accelerated" | "acceleration" | "akselerasi" => Ok(BoardType::Accelerated),
            other => Err(EngineError::InvalidInput(format!(
                "unknown board type '{}'",
                other
            ))),
        }
    }
}

/// Direction of travel along a price ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards the upper limit (ARA)
    Ascending,
    /// Towards the lower limit (ARB)
    Descending,
}

impl Direction {
    /// +1.0 for ascending, -1.0 for descending
    pub fn sign(self) -> f64 {
        match self {
            Direction::Ascending => 1.0,
            Direction::Descending => -1.0,
        }
    }
}

/// Round a money amount to 2 decimal places
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
