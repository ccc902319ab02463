//! Fee-aware trade economics
//!
//! Cash flows of a round trip: buy N lots, sell them later, pay the
//! broker's fee on both sides. Every monetary output is rounded to 2
//! decimals when it is computed so that aggregating results is reproducible.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_price, EngineError, Result};
use crate::exchange::constants::SHARES_PER_LOT;
use crate::finance::fees::FeeSchedule;
use crate::types::{round_cents, Cash, Lots, Price, Symbol};

/// A round-trip position in whole lots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: Symbol,
    pub lots: Lots,
    pub buy_price: Price,
    pub sell_price: Price,
    pub fees: FeeSchedule,
}

impl Position {
    pub fn new(
        symbol: impl Into<Symbol>,
        lots: Lots,
        buy_price: Price,
        sell_price: Price,
        fees: FeeSchedule,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            lots,
            buy_price,
            sell_price,
            fees,
        }
    }

    /// Number of shares held
    pub fn shares(&self) -> f64 {
        self.lots as f64 * SHARES_PER_LOT
    }

    pub fn validate(&self) -> Result<()> {
        if self.lots == 0 {
            return Err(EngineError::InvalidLots { lots: 0.0 });
        }
        ensure_price("buy_price", self.buy_price)?;
        ensure_price("sell_price", self.sell_price)?;
        self.fees.validate()
    }
}

/// Cash flows of one round trip
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TradeResult {
    pub gross_buy: Cash,
    pub buy_fee: Cash,
    /// Cash paid: gross plus buy fee
    pub total_buy: Cash,
    pub gross_sell: Cash,
    pub sell_fee: Cash,
    /// Cash received: gross minus sell fee
    pub total_sell: Cash,
    pub profit_loss: Cash,
    /// Profit or loss relative to `total_buy`, in percent
    pub profit_loss_percent: f64,
}

impl TradeResult {
    /// Settle a round trip over a share count
    ///
    /// Inputs are assumed validated. A zero cost basis gives a 0% return.
    pub(crate) fn settle(
        shares: f64,
        buy_price: Price,
        sell_price: Price,
        fees: &FeeSchedule,
    ) -> Self {
        let gross_buy = shares * buy_price;
        let buy_fee = fees.buy_fee(gross_buy);
        let gross_sell = shares * sell_price;
        let sell_fee = fees.sell_fee(gross_sell);

        let total_buy = round_cents(gross_buy + buy_fee);
        let total_sell = round_cents(gross_sell - sell_fee);
        let profit_loss = round_cents(total_sell - total_buy);

        Self {
            gross_buy: round_cents(gross_buy),
            buy_fee: round_cents(buy_fee),
            total_buy,
            gross_sell: round_cents(gross_sell),
            sell_fee: round_cents(sell_fee),
            total_sell,
            profit_loss,
            profit_loss_percent: percent_of(profit_loss, total_buy),
        }
    }

    pub fn is_profit(&self) -> bool {
        self.profit_loss > 0.0
    }

    /// Total fees paid on both sides
    pub fn total_fees(&self) -> Cash {
        round_cents(self.buy_fee + self.sell_fee)
    }
}

/// `part / whole` in percent, rounded to 2 decimals; 0 when `whole` is 0
pub(crate) fn percent_of(part: Cash, whole: Cash) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        round_cents(part / whole * 100.0)
    }
}

/// Compute the cash flows of a position
pub fn compute_trade(position: &Position) -> Result<TradeResult> {
    position.validate()?;
    Ok(TradeResult::settle(
        position.shares(),
        position.buy_price,
        position.sell_price,
        &position.fees,
    ))
}

/// Dividend income for a holding
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DividendProjection {
    pub total_dividend: Cash,
    /// Dividend per share over buy price, in percent
    pub dividend_yield: f64,
}

/// Project dividend income and yield
///
/// The yield is 0 when the buy price is 0.
pub fn dividend_projection(
    lots: Lots,
    buy_price: Price,
    dividend_per_share: Price,
) -> Result<DividendProjection> {
    if lots == 0 {
        return Err(EngineError::InvalidLots { lots: 0.0 });
    }
    ensure_price("buy_price", buy_price)?;
    ensure_price("dividend_per_share", dividend_per_share)?;

    let shares = lots as f64 * SHARES_PER_LOT;
    let dividend_yield = if buy_price == 0.0 {
        0.0
    } else {
        round_cents(dividend_per_share / buy_price * 100.0)
    };

    Ok(DividendProjection {
        total_dividend: round_cents(shares * dividend_per_share),
        dividend_yield,
    })
}
