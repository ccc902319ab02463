//! Batch aggregation of round-trip results

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::finance::trade::{compute_trade, percent_of, Position, TradeResult};
use crate::types::{round_cents, Cash, Price, Symbol};

/// Per-position line of an aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionResult {
    pub symbol: Symbol,
    /// Lot count; fractional only for warrants
    pub lots: f64,
    pub buy_price: Price,
    pub sell_price: Price,
    pub result: TradeResult,
}

/// Totals across a batch of positions
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioAggregate {
    pub positions: Vec<PositionResult>,
    pub total_gross_buy: Cash,
    pub total_buy_fee: Cash,
    /// Total invested, fees included
    pub total_buy: Cash,
    pub total_gross_sell: Cash,
    pub total_sell_fee: Cash,
    /// Total proceeds, net of fees
    pub total_sell: Cash,
    pub total_profit_loss: Cash,
    /// Recomputed from the summed totals, never averaged
    pub total_profit_loss_percent: f64,
}

impl PortfolioAggregate {
    /// Sum already-computed lines in order
    pub fn from_results(positions: Vec<PositionResult>) -> Self {
        let mut agg = Self::default();
        for line in &positions {
            let r = &line.result;
            agg.total_gross_buy += r.gross_buy;
            agg.total_buy_fee += r.buy_fee;
            agg.total_buy += r.total_buy;
            agg.total_gross_sell += r.gross_sell;
            agg.total_sell_fee += r.sell_fee;
            agg.total_sell += r.total_sell;
            agg.total_profit_loss += r.profit_loss;
        }

        agg.total_gross_buy = round_cents(agg.total_gross_buy);
        agg.total_buy_fee = round_cents(agg.total_buy_fee);
        agg.total_buy = round_cents(agg.total_buy);
        agg.total_gross_sell = round_cents(agg.total_gross_sell);
        agg.total_sell_fee = round_cents(agg.total_sell_fee);
        agg.total_sell = round_cents(agg.total_sell);
        agg.total_profit_loss = round_cents(agg.total_profit_loss);
        agg.total_profit_loss_percent = percent_of(agg.total_profit_loss, agg.total_buy);
        agg.positions = positions;
        agg
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Positions closed at a profit
    pub fn winners(&self) -> impl Iterator<Item = &PositionResult> {
        self.positions.iter().filter(|p| p.result.is_profit())
    }
}

/// Compute every position and sum the results
///
/// Positions are evaluated in parallel; the first invalid position fails
/// the whole batch. An empty batch gives all-zero totals.
pub fn aggregate(positions: &[Position]) -> Result<PortfolioAggregate> {
    let lines = positions
        .par_iter()
        .map(|p| {
            compute_trade(p).map(|result| PositionResult {
                symbol: p.symbol.clone(),
                lots: p.lots as f64,
                buy_price: p.buy_price,
                sell_price: p.sell_price,
                result,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    log::debug!("aggregated {} positions", lines.len());
    Ok(PortfolioAggregate::from_results(lines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::fees::FeeSchedule;

    #[test]
    fn test_aggregate_two_positions() {
        let fees = FeeSchedule::new(0.0015, 0.0025).unwrap();
        let positions = vec![
            Position::new("BBCA", 100, 1_000.0, 1_200.0, fees),
            Position::new("TLKM", 10, 1_000.0, 900.0, fees),
        ];
        let agg = aggregate(&positions).unwrap();

        assert_eq!(agg.len(), 2);
        assert_eq!(agg.positions[0].symbol, "BBCA");
        assert_eq!(agg.total_buy, 10_015_000.0 + 1_001_500.0);
        assert_eq!(agg.total_sell, 11_970_000.0 + 897_750.0);
        assert_eq!(agg.total_profit_loss, 1_955_000.0 - 103_750.0);
        assert_eq!(agg.total_buy_fee, 15_000.0 + 1_500.0);
        assert_eq!(agg.total_sell_fee, 30_000.0 + 2_250.0);
        // 1,851,250 / 11,016,500
        assert_eq!(agg.total_profit_loss_percent, 16.8);
        assert_eq!(agg.winners().count(), 1);
    }

    #[test]
    fn test_percent_not_averaged() {
        let positions = vec![
            Position::new("A", 1, 100.0, 200.0, FeeSchedule::zero()),
            Position::new("B", 100, 100.0, 100.0, FeeSchedule::zero()),
        ];
        let agg = aggregate(&positions).unwrap();
        // average of 100% and 0% would be 50%
        assert_eq!(agg.total_profit_loss_percent, 0.99);
    }

    #[test]
    fn test_empty_batch() {
        let agg = aggregate(&[]).unwrap();
        assert!(agg.is_empty());
        assert_eq!(agg.total_buy, 0.0);
        assert_eq!(agg.total_profit_loss_percent, 0.0);
    }

    #[test]
    fn test_invalid_position_fails_batch() {
        let positions = vec![
            Position::new("A", 1, 100.0, 200.0, FeeSchedule::zero()),
            Position::new("B", 0, 100.0, 100.0, FeeSchedule::zero()),
        ];
        assert!(aggregate(&positions).is_err());
    }
}
