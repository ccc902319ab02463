//! Warrant round trips
//!
//! Warrants trade in lots like shares but the calculator accepts
//! fractional lots (half a lot minimum). Inputs are normalized rather
//! than rejected: lot counts become `max(0.5, |lots|)` and prices are
//! clamped to zero.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::exchange::constants::{MIN_WARRANT_LOTS, SHARES_PER_LOT};
use crate::finance::fees::FeeSchedule;
use crate::finance::portfolio::{PortfolioAggregate, PositionResult};
use crate::finance::trade::TradeResult;
use crate::types::{Price, Symbol};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarrantPosition {
    pub symbol: Symbol,
    pub lots: f64,
    pub buy_price: Price,
    pub sell_price: Price,
}

impl WarrantPosition {
    pub fn new(symbol: impl Into<Symbol>, lots: f64, buy_price: Price, sell_price: Price) -> Self {
        Self {
            symbol: symbol.into(),
            lots,
            buy_price,
            sell_price,
        }
    }

    /// Copy with lots and prices brought into range
    pub fn normalized(&self) -> Self {
        let lots = if self.lots.is_finite() {
            self.lots.abs().max(MIN_WARRANT_LOTS)
        } else {
            MIN_WARRANT_LOTS
        };
        if lots != self.lots {
            log::warn!(
                "warrant {}: lot count {} normalized to {}",
                self.symbol,
                self.lots,
                lots
            );
        }
        Self {
            symbol: self.symbol.trim().to_uppercase(),
            lots,
            buy_price: clamp_price(self.buy_price),
            sell_price: clamp_price(self.sell_price),
        }
    }
}

fn clamp_price(price: Price) -> Price {
    if price.is_finite() {
        price.max(0.0)
    } else {
        0.0
    }
}

/// Settle a warrant round trip after normalizing it
pub fn compute_warrant(position: &WarrantPosition, fees: &FeeSchedule) -> Result<TradeResult> {
    fees.validate()?;
    let p = position.normalized();
    Ok(TradeResult::settle(
        p.lots * SHARES_PER_LOT,
        p.buy_price,
        p.sell_price,
        fees,
    ))
}

/// Settle a batch of warrants under one fee schedule
pub fn aggregate_warrants(
    positions: &[WarrantPosition],
    fees: &FeeSchedule,
) -> Result<PortfolioAggregate> {
    fees.validate()?;
    let lines = positions
        .iter()
        .map(|raw| {
            let p = raw.normalized();
            let result =
                TradeResult::settle(p.lots * SHARES_PER_LOT, p.buy_price, p.sell_price, fees);
            PositionResult {
                symbol: p.symbol,
                lots: p.lots,
                buy_price: p.buy_price,
                sell_price: p.sell_price,
                result,
            }
        })
        .collect();
    Ok(PortfolioAggregate::from_results(lines))
}
