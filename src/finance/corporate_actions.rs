//! Rights issue (HMETD) simulation
//!
//! Holders receive `new` rights for every `old` shares and may exercise them
//! at the exercise price or sell them. The price of the parent stock is
//! expected to settle at the theoretical ex-rights price.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_fee_rate, ensure_price, EngineError, Result};
use crate::exchange::constants::SHARES_PER_LOT;
use crate::types::{round_cents, Cash, Lots, Percentage, Price};

/// Terms of a rights issue
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RightsIssue {
    /// Closing price on the cum date
    pub cum_price: Price,
    /// Existing shares per ratio unit
    pub old_ratio: f64,
    /// Rights granted per ratio unit
    pub new_ratio: f64,
    pub exercise_price: Price,
}

impl RightsIssue {
    pub fn new(
        cum_price: Price,
        old_ratio: f64,
        new_ratio: f64,
        exercise_price: Price,
    ) -> Result<Self> {
        let issue = Self {
            cum_price,
            old_ratio,
            new_ratio,
            exercise_price,
        };
        issue.validate()?;
        Ok(issue)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_price("cum_price", self.cum_price)?;
        ensure_price("exercise_price", self.exercise_price)?;
        for (field, value) in [("old_ratio", self.old_ratio), ("new_ratio", self.new_ratio)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(EngineError::InvalidRatio { field, value });
            }
        }
        Ok(())
    }

    /// Theoretical ex-rights price
    pub fn theoretical_ex_price(&self) -> Price {
        (self.cum_price * self.old_ratio + self.exercise_price * self.new_ratio)
            / (self.old_ratio + self.new_ratio)
    }

    /// Fair value of one right, never negative
    pub fn right_fair_value(&self) -> Price {
        (self.theoretical_ex_price() - self.exercise_price).max(0.0)
    }

    /// Ownership dilution for a holder who does not exercise, in percent
    pub fn dilution_percent(&self) -> f64 {
        self.new_ratio / (self.old_ratio + self.new_ratio) * 100.0
    }

    /// Project both choices for a holding
    pub fn simulate(&self, lots_held: Lots, sell_fee_rate: Percentage) -> Result<RightsOutcome> {
        self.validate()?;
        if lots_held == 0 {
            return Err(EngineError::InvalidLots { lots: 0.0 });
        }
        ensure_fee_rate("sell", sell_fee_rate)?;

        let ex_price = self.theoretical_ex_price();
        let right_value = self.right_fair_value();
        let held_shares = lots_held as f64 * SHARES_PER_LOT;
        // fractional rights are kept as-is
        let rights_shares = held_shares / self.old_ratio * self.new_ratio;
        let rights_lots = rights_shares / SHARES_PER_LOT;
        let final_lots = lots_held as f64 + rights_lots;

        let sale_proceeds = rights_shares * right_value * (1.0 - sell_fee_rate);
        let remaining_stock_value = held_shares * ex_price;

        Ok(RightsOutcome {
            theoretical_ex_price: round_cents(ex_price),
            right_fair_value: round_cents(right_value),
            dilution_percent: round_cents(self.dilution_percent()),
            rights_shares,
            rights_lots,
            exercise: ExerciseScenario {
                exercise_cost: round_cents(rights_shares * self.exercise_price),
                final_lots,
                asset_value: round_cents(final_lots * SHARES_PER_LOT * ex_price),
            },
            sell_rights: SellRightsScenario {
                proceeds: round_cents(sale_proceeds),
                remaining_stock_value: round_cents(remaining_stock_value),
                total_wealth: round_cents(remaining_stock_value + sale_proceeds),
            },
        })
    }
}

/// Holder exercises every right
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExerciseScenario {
    pub exercise_cost: Cash,
    pub final_lots: f64,
    /// Holding valued at the ex-rights price
    pub asset_value: Cash,
}

/// Holder sells every right at fair value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SellRightsScenario {
    /// Cash from the sale, net of the sell fee
    pub proceeds: Cash,
    pub remaining_stock_value: Cash,
    pub total_wealth: Cash,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RightsOutcome {
    pub theoretical_ex_price: Price,
    pub right_fair_value: Price,
    pub dilution_percent: f64,
    pub rights_shares: f64,
    pub rights_lots: f64,
    pub exercise: ExerciseScenario,
    pub sell_rights: SellRightsScenario,
}
