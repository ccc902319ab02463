//! Position sizing against available capital
//!
//! A limit order fills at the price the user typed. A market order during
//! a run-up may fill as high as the day's upper auto-reject price, so the
//! worst-case size is computed against that safety price instead.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_fee_rate, ensure_positive_price, EngineError, Result};
use crate::exchange::constants::SHARES_PER_LOT;
use crate::exchange::ladder::next_limit;
use crate::types::{round_cents, BoardType, Cash, Direction, Lots, Percentage, Price};

fn ensure_capital(capital: Cash) -> Result<()> {
    if !capital.is_finite() || capital < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "capital must be a non-negative amount, got {}",
            capital
        )));
    }
    Ok(())
}

/// Cost of one lot including the buy fee
pub fn lot_cost(price_per_share: Price, fee_rate: Percentage) -> Cash {
    price_per_share * SHARES_PER_LOT * (1.0 + fee_rate)
}

/// Whole lots of `per_lot` that `cash` pays for, never more than it covers
pub(crate) fn whole_lots(cash: Cash, per_lot: Cash) -> Lots {
    if !(per_lot > 0.0) || !(cash > 0.0) {
        return 0;
    }
    let mut lots = (cash / per_lot).floor();
    // the quotient can land one ulp either side of a whole count
    if (lots + 1.0) * per_lot <= cash {
        lots += 1.0;
    } else if lots > 0.0 && lots * per_lot > cash {
        lots -= 1.0;
    }
    lots as Lots
}

/// Largest whole number of lots the capital can pay for, buy fee included
///
/// Returns 0 when the capital does not cover a single lot.
pub fn max_lots_for_capital(
    capital: Cash,
    price_per_share: Price,
    fee_rate: Percentage,
) -> Result<Lots> {
    ensure_capital(capital)?;
    ensure_positive_price("price_per_share", price_per_share)?;
    ensure_fee_rate("buy", fee_rate)?;

    Ok(whole_lots(capital, lot_cost(price_per_share, fee_rate)))
}

/// Lots bought at one execution price and what is left over
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LotAllocation {
    pub price: Price,
    pub lots: Lots,
    /// Cash spent, buy fee included
    pub cost: Cash,
    pub remaining_capital: Cash,
    /// Share of the capital spent, in percent
    pub utilization_percent: f64,
    /// Extra cash needed to afford one more lot
    pub shortfall_next_lot: Cash,
}

impl LotAllocation {
    /// Allocate capital at an execution price
    pub fn at_price(capital: Cash, price: Price, fee_rate: Percentage) -> Result<Self> {
        let lots = max_lots_for_capital(capital, price, fee_rate)?;
        let per_lot = lot_cost(price, fee_rate);
        let cost = round_cents(lots as f64 * per_lot);
        let remaining_capital = round_cents(capital - cost).max(0.0);
        let utilization_percent = if capital == 0.0 {
            0.0
        } else {
            round_cents(cost / capital * 100.0)
        };

        Ok(Self {
            price,
            lots,
            cost,
            remaining_capital,
            utilization_percent,
            shortfall_next_lot: round_cents((per_lot - remaining_capital).max(0.0)),
        })
    }
}

/// Limit-order size next to the worst-case size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizingComparison {
    pub capital: Cash,
    pub fee_rate: Percentage,
    pub limit_order: LotAllocation,
    pub worst_case: LotAllocation,
    /// Lots given up by sizing for the worst case
    pub lot_difference: i64,
    /// Difference in cash spent (limit minus worst case)
    pub capital_difference: Cash,
}

/// Compare sizing at a limit price with sizing at a safety price
pub fn compare_sizing(
    capital: Cash,
    limit_price: Price,
    safety_price: Price,
    fee_rate: Percentage,
) -> Result<SizingComparison> {
    let limit_order = LotAllocation::at_price(capital, limit_price, fee_rate)?;
    let worst_case = LotAllocation::at_price(capital, safety_price, fee_rate)?;

    log::debug!(
        "sizing {}: {} lots at {} vs {} lots at {}",
        capital,
        limit_order.lots,
        limit_price,
        worst_case.lots,
        safety_price
    );

    Ok(SizingComparison {
        capital,
        fee_rate,
        limit_order,
        worst_case,
        lot_difference: limit_order.lots as i64 - worst_case.lots as i64,
        capital_difference: round_cents(limit_order.cost - worst_case.cost),
    })
}

/// Worst case taken as the next session's upper auto-reject price
///
/// When the price has no upper limit (below the regulated floor) the
/// entry price itself is used as the safety price.
pub fn size_against_ara(
    capital: Cash,
    price: Price,
    board: BoardType,
    fee_rate: Percentage,
) -> Result<SizingComparison> {
    ensure_positive_price("price", price)?;
    let safety_price = next_limit(price, board, Direction::Ascending).unwrap_or(price);
    compare_sizing(capital, price, safety_price, fee_rate)
}
