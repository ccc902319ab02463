//! Broker fee schedules
//!
//! IDX brokers charge a flat fraction of the gross trade value, with a
//! higher rate on the sell side (it carries the transaction levy). The
//! presets are an immutable registry; calculators always receive a
//! resolved [`FeeSchedule`] value, never a broker name.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_fee_rate, EngineError, Result};
use crate::types::{Cash, Percentage};

/// Buy/sell fee rates as fractions of gross value
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub buy_rate: Percentage,
    pub sell_rate: Percentage,
}

/// Named fee preset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrokerPreset {
    pub name: &'static str,
    pub fees: FeeSchedule,
}

/// Name of the user-supplied preset
pub const CUSTOM_BROKER: &str = "Custom";

/// Known broker presets
pub const BROKER_PRESETS: &[BrokerPreset] = &[
    BrokerPreset {
        name: "IPOT",
        fees: FeeSchedule {
            buy_rate: 0.0019,
            sell_rate: 0.0029,
        },
    },
    BrokerPreset {
        name: "Stockbit",
        fees: FeeSchedule {
            buy_rate: 0.0015,
            sell_rate: 0.0025,
        },
    },
    BrokerPreset {
        name: "BNI Bions",
        fees: FeeSchedule {
            buy_rate: 0.0017,
            sell_rate: 0.0027,
        },
    },
    BrokerPreset {
        name: CUSTOM_BROKER,
        fees: FeeSchedule {
            buy_rate: 0.0,
            sell_rate: 0.0,
        },
    },
];

impl FeeSchedule {
    /// Create a validated schedule; both rates must lie in `[0, 1)`
    pub fn new(buy_rate: Percentage, sell_rate: Percentage) -> Result<Self> {
        let fees = Self { buy_rate, sell_rate };
        fees.validate()?;
        Ok(fees)
    }

    /// No fees on either side
    pub fn zero() -> Self {
        Self::default()
    }

    /// Look up a preset by name (case-insensitive)
    pub fn preset(name: &str) -> Result<Self> {
        let wanted = name.trim();
        BROKER_PRESETS
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(wanted))
            .map(|p| p.fees)
            .ok_or_else(|| EngineError::UnknownBroker(wanted.to_string()))
    }

    /// Default schedule used by the warrant calculator
    pub fn stockbit() -> Self {
        BROKER_PRESETS[1].fees
    }

    pub fn validate(&self) -> Result<()> {
        ensure_fee_rate("buy", self.buy_rate)?;
        ensure_fee_rate("sell", self.sell_rate)?;
        Ok(())
    }

    /// Same schedule with the buy fee switched off
    pub fn without_buy_fee(self) -> Self {
        Self { buy_rate: 0.0, ..self }
    }

    /// Same schedule with the sell fee switched off
    pub fn without_sell_fee(self) -> Self {
        Self { sell_rate: 0.0, ..self }
    }

    pub fn buy_fee(&self, gross: Cash) -> Cash {
        gross * self.buy_rate
    }

    pub fn sell_fee(&self, gross: Cash) -> Cash {
        gross * self.sell_rate
    }
}

/// Resolve a broker name, letting explicit custom rates override the preset
///
/// `Custom` with no override resolves to zero fees.
pub fn resolve_fees(
    broker: &str,
    buy_override: Option<Percentage>,
    sell_override: Option<Percentage>,
) -> Result<FeeSchedule> {
    let base = FeeSchedule::preset(broker)?;
    FeeSchedule::new(
        buy_override.unwrap_or(base.buy_rate),
        sell_override.unwrap_or(base.sell_rate),
    )
}
