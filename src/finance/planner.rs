//! Risk-based trade planning
//!
//! Derives stop-loss and take-profit levels from an entry price, then sizes
//! the trade either by how much of the portfolio may be lost on it or by a
//! fixed capital allocation.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive_price, EngineError, Result};
use crate::exchange::constants::SHARES_PER_LOT;
use crate::exchange::rounding::{round_to_tick, RoundMode};
use crate::finance::sizing::whole_lots;
use crate::types::{round_cents, Cash, Lots, Price};

/// How the lot count is decided
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SizingMode {
    /// Risk a percentage of the whole portfolio
    RiskBased { portfolio: Cash, risk_percent: f64 },
    /// Put a fixed amount into this trade
    FixedCapital { capital: Cash },
}

/// What bounded the lot count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitReason {
    /// Sized by the risk budget
    RiskBound,
    /// The risk budget asked for more than the portfolio holds
    CapitalBound,
    /// Sized by the fixed allocation
    CapitalAllocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub entry_price: Price,
    /// Stop-loss distance below entry, in percent
    pub stop_loss_percent: f64,
    /// Reward multiple of the risk (1 : X)
    pub reward_risk_ratio: f64,
    pub mode: SizingMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradePlan {
    pub entry_price: Price,
    pub stop_loss_price: Price,
    pub take_profit_price: Price,
    pub risk_per_share: Price,
    pub reward_per_share: Price,
    pub lots: Lots,
    pub limit_reason: LimitReason,
    /// Cash at risk if the stop is hit
    pub risk_amount: Cash,
    pub entry_value: Cash,
    pub potential_loss: Cash,
    pub potential_profit: Cash,
    /// Potential loss over entry value, in percent
    pub implied_risk_percent: f64,
    /// Win rate needed to break even at this reward:risk, in percent
    pub breakeven_win_rate: f64,
}

fn ensure_non_negative(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "{} must be non-negative, got {}",
            field, value
        )));
    }
    Ok(())
}

/// Build a trade plan
pub fn plan_trade(request: &PlanRequest) -> Result<TradePlan> {
    let entry = request.entry_price;
    ensure_positive_price("entry_price", entry)?;
    if !(request.stop_loss_percent > 0.0 && request.stop_loss_percent < 100.0) {
        return Err(EngineError::InvalidInput(format!(
            "stop loss must be within (0, 100) percent, got {}",
            request.stop_loss_percent
        )));
    }
    if !(request.reward_risk_ratio.is_finite() && request.reward_risk_ratio > 0.0) {
        return Err(EngineError::InvalidInput(format!(
            "reward:risk ratio must be positive, got {}",
            request.reward_risk_ratio
        )));
    }

    let stop_loss_price = round_to_tick(
        entry * (1.0 - request.stop_loss_percent / 100.0),
        RoundMode::Down,
    );
    let risk_per_share = entry - stop_loss_price;
    let take_profit_price = round_to_tick(
        entry + risk_per_share * request.reward_risk_ratio,
        RoundMode::Down,
    );
    let reward_per_share = take_profit_price - entry;
    let lot_value = entry * SHARES_PER_LOT;

    let (lots, limit_reason, risk_amount) = match request.mode {
        SizingMode::RiskBased {
            portfolio,
            risk_percent,
        } => {
            ensure_non_negative("portfolio", portfolio)?;
            ensure_non_negative("risk_percent", risk_percent)?;
            let risk_amount = portfolio * risk_percent / 100.0;
            let by_risk = whole_lots(risk_amount, SHARES_PER_LOT * risk_per_share);
            if by_risk as f64 * lot_value > portfolio {
                (whole_lots(portfolio, lot_value), LimitReason::CapitalBound, risk_amount)
            } else {
                (by_risk, LimitReason::RiskBound, risk_amount)
            }
        }
        SizingMode::FixedCapital { capital } => {
            ensure_non_negative("capital", capital)?;
            let lots = whole_lots(capital, lot_value);
            let risk_amount = lots as f64 * SHARES_PER_LOT * risk_per_share;
            (lots, LimitReason::CapitalAllocation, risk_amount)
        }
    };

    let shares = lots as f64 * SHARES_PER_LOT;
    let entry_value = shares * entry;
    let potential_loss = shares * risk_per_share;
    let implied_risk_percent = if entry_value > 0.0 {
        round_cents(potential_loss / entry_value * 100.0)
    } else {
        0.0
    };

    Ok(TradePlan {
        entry_price: entry,
        stop_loss_price,
        take_profit_price,
        risk_per_share,
        reward_per_share,
        lots,
        limit_reason,
        risk_amount: round_cents(risk_amount),
        entry_value: round_cents(entry_value),
        potential_loss: round_cents(potential_loss),
        potential_profit: round_cents(shares * reward_per_share),
        implied_risk_percent,
        breakeven_win_rate: round_cents(100.0 / (1.0 + request.reward_risk_ratio)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(entry: Price, mode: SizingMode) -> PlanRequest {
        PlanRequest {
            entry_price: entry,
            stop_loss_percent: 3.0,
            reward_risk_ratio: 2.0,
            mode,
        }
    }

    #[test]
    fn test_risk_based_plan() {
        let plan = plan_trade(&request(
            1_000.0,
            SizingMode::RiskBased {
                portfolio: 10_000_000.0,
                risk_percent: 2.0,
            },
        ))
        .unwrap();

        assert_eq!(plan.stop_loss_price, 970.0);
        assert_eq!(plan.risk_per_share, 30.0);
        assert_eq!(plan.take_profit_price, 1_060.0);
        // 200,000 / (100 * 30) = 66.67
        assert_eq!(plan.lots, 66);
        assert_eq!(plan.limit_reason, LimitReason::RiskBound);
        assert_eq!(plan.risk_amount, 200_000.0);
        assert_eq!(plan.potential_loss, 198_000.0);
        assert_eq!(plan.potential_profit, 396_000.0);
        assert_eq!(plan.entry_value, 6_600_000.0);
        assert_eq!(plan.implied_risk_percent, 3.0);
        assert_eq!(plan.breakeven_win_rate, 33.33);
    }

    #[test]
    fn test_risk_based_capped_by_capital() {
        let plan = plan_trade(&PlanRequest {
            entry_price: 1_000.0,
            stop_loss_percent: 1.0,
            reward_risk_ratio: 2.0,
            mode: SizingMode::RiskBased {
                portfolio: 1_000_000.0,
                risk_percent: 10.0,
            },
        })
        .unwrap();
        // the risk budget asks for 100 lots, the portfolio pays for 10
        assert_eq!(plan.limit_reason, LimitReason::CapitalBound);
        assert_eq!(plan.lots, 10);
    }

    #[test]
    fn test_fixed_capital_plan() {
        let plan = plan_trade(&request(
            1_000.0,
            SizingMode::FixedCapital {
                capital: 1_000_000.0,
            },
        ))
        .unwrap();
        assert_eq!(plan.lots, 10);
        assert_eq!(plan.limit_reason, LimitReason::CapitalAllocation);
        assert_eq!(plan.risk_amount, 30_000.0);
    }

    #[test]
    fn test_fixed_capital_too_small() {
        let plan = plan_trade(&request(
            1_000.0,
            SizingMode::FixedCapital { capital: 50_000.0 },
        ))
        .unwrap();
        assert_eq!(plan.lots, 0);
        assert_eq!(plan.implied_risk_percent, 0.0);
        assert_eq!(plan.entry_value, 0.0);
    }

    #[test]
    fn test_levels_are_tick_aligned() {
        let plan = plan_trade(&request(
            2_530.0,
            SizingMode::FixedCapital { capital: 10_000_000.0 },
        ))
        .unwrap();
        // 2530 * 0.97 = 2454.1 -> 2450; risk 80; target 2690
        assert_eq!(plan.stop_loss_price, 2_450.0);
        assert_eq!(plan.take_profit_price, 2_690.0);
    }

    #[test]
    fn test_invalid_requests() {
        let mode = SizingMode::FixedCapital { capital: 1.0 };
        assert!(plan_trade(&request(0.0, mode)).is_err());

        let mut bad = request(1_000.0, mode);
        bad.stop_loss_percent = 0.0;
        assert!(plan_trade(&bad).is_err());

        let mut bad = request(1_000.0, mode);
        bad.reward_risk_ratio = -1.0;
        assert!(plan_trade(&bad).is_err());
    }

    #[test]
    fn test_fixed_capital_never_overspends() {
        let plan = plan_trade(&request(
            200.0,
            SizingMode::FixedCapital { capital: 19_999.99 },
        ))
        .unwrap();
        assert_eq!(plan.lots, 0);
        assert_eq!(plan.entry_value, 0.0);

        let plan = plan_trade(&request(
            200.0,
            SizingMode::FixedCapital { capital: 40_000.0 },
        ))
        .unwrap();
        assert_eq!(plan.lots, 2);
    }
}
