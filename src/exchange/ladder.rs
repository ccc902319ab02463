//! ARA/ARB ladder generation
//!
//! Walks the limit policy across consecutive trading days starting from a
//! base (usually the previous close). The upper walk assumes the stock hits
//! auto-reject-above every day, the lower walk assumes auto-reject-below.
//! The two walks are independent and both start from the base price.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::{ensure_positive_price, Result};
use crate::exchange::constants::DEFAULT_LADDER_STEPS;
use crate::exchange::price_limit::{limit_rule, LimitRule};
use crate::exchange::rounding::round_limit_price;
use crate::types::{BoardType, Direction, Price};

/// One trading day of a ladder
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LimitStep {
    /// Day number, starting at 1
    pub step_index: usize,
    /// Tick-aligned limit price
    pub price: Price,
    /// Change from the previous step's price
    pub absolute_change: Price,
    /// Change from the previous step, in percent
    pub percent_change: f64,
    /// Change from the base price, in percent
    pub cumulative_percent_change: f64,
    pub direction: Direction,
}

/// Why a ladder stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LadderEnd {
    /// All requested steps were produced
    StepsExhausted,
    /// The price left every regulated band (below Rp 50 on the regular board)
    BelowLimitFloor,
    /// A descending walk reached the minimum price of Rp 1
    MinimumPrice,
    /// The next limit is not representable as a finite price
    PriceOverflow,
}

impl LadderEnd {
    /// Short explanation for display
    pub fn describe(&self) -> &'static str {
        match self {
            LadderEnd::StepsExhausted => "all requested days generated",
            LadderEnd::BelowLimitFloor => "price is below the lowest auto-reject band",
            LadderEnd::MinimumPrice => "price reached the minimum of Rp 1",
            LadderEnd::PriceOverflow => "next limit price is out of range",
        }
    }
}

/// Ladder in one direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ladder {
    pub direction: Direction,
    pub steps: Vec<LimitStep>,
    pub end: LadderEnd,
}

impl Ladder {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Price of the first day, the next session's limit
    pub fn first_price(&self) -> Option<Price> {
        self.steps.first().map(|s| s.price)
    }

    pub fn last_price(&self) -> Option<Price> {
        self.steps.last().map(|s| s.price)
    }

    /// True when the ladder stopped on a policy condition rather than the step count
    pub fn ended_early(&self) -> bool {
        self.end != LadderEnd::StepsExhausted
    }

    pub fn prices(&self) -> Vec<Price> {
        self.steps.iter().map(|s| s.price).collect()
    }
}

/// Row kind in the combined view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Base,
    Ara,
    Arb,
}

/// Row of the combined, price-sorted view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LadderRow {
    pub kind: RowKind,
    pub price: Price,
    pub absolute_change: Price,
    pub percent_change: f64,
    pub cumulative_percent_change: f64,
}

impl From<&LimitStep> for LadderRow {
    fn from(step: &LimitStep) -> Self {
        Self {
            kind: match step.direction {
                Direction::Ascending => RowKind::Ara,
                Direction::Descending => RowKind::Arb,
            },
            price: step.price,
            absolute_change: step.absolute_change,
            percent_change: step.percent_change,
            cumulative_percent_change: step.cumulative_percent_change,
        }
    }
}

/// Both ladders generated from one base price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitLadders {
    pub base_price: Price,
    pub board: BoardType,
    pub max_steps: usize,
    /// ARA ladder, strictly increasing
    pub ascending: Ladder,
    /// ARB ladder, strictly decreasing
    pub descending: Ladder,
}

impl LimitLadders {
    /// Base, ARA and ARB rows sorted by price, highest first
    pub fn combined(&self) -> Vec<LadderRow> {
        let mut rows = Vec::with_capacity(1 + self.ascending.len() + self.descending.len());
        rows.push(LadderRow {
            kind: RowKind::Base,
            price: self.base_price,
            absolute_change: 0.0,
            percent_change: 0.0,
            cumulative_percent_change: 0.0,
        });
        rows.extend(self.ascending.steps.iter().map(LadderRow::from));
        rows.extend(self.descending.steps.iter().map(LadderRow::from));
        rows.sort_by(|a, b| b.price.partial_cmp(&a.price).unwrap_or(Ordering::Equal));
        rows
    }

    /// Next session's upper limit, if any
    pub fn next_ara(&self) -> Option<Price> {
        self.ascending.first_price()
    }

    /// Next session's lower limit, if any
    pub fn next_arb(&self) -> Option<Price> {
        self.descending.first_price()
    }
}

/// Ladder generator for a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LadderGenerator {
    pub board: BoardType,
    pub max_steps: usize,
}

impl Default for LadderGenerator {
    fn default() -> Self {
        Self::new(BoardType::Regular, DEFAULT_LADDER_STEPS)
    }
}

impl LadderGenerator {
    pub fn new(board: BoardType, max_steps: usize) -> Self {
        Self { board, max_steps }
    }

    /// Generate both ladders from a base price
    ///
    /// A base price that is not strictly positive is rejected; a step count
    /// of zero gives two empty ladders.
    pub fn generate(&self, base_price: Price) -> Result<LimitLadders> {
        ensure_positive_price("base_price", base_price)?;

        let ascending = self.walk(base_price, Direction::Ascending);
        let descending = self.walk(base_price, Direction::Descending);

        log::debug!(
            "ladder for {} on {} board: {} ARA steps ({:?}), {} ARB steps ({:?})",
            base_price,
            self.board,
            ascending.len(),
            ascending.end,
            descending.len(),
            descending.end
        );

        Ok(LimitLadders {
            base_price,
            board: self.board,
            max_steps: self.max_steps,
            ascending,
            descending,
        })
    }

    /// Walk one direction until the step budget runs out or the policy stops it
    fn walk(&self, base_price: Price, direction: Direction) -> Ladder {
        let mut steps = Vec::with_capacity(self.max_steps.min(64));
        let mut current = base_price;
        let mut end = LadderEnd::StepsExhausted;

        for step_index in 1..=self.max_steps {
            let next = match next_limit(current, self.board, direction) {
                Ok(price) => price,
                Err(reason) => {
                    end = reason;
                    break;
                }
            };

            let absolute_change = next - current;
            steps.push(LimitStep {
                step_index,
                price: next,
                absolute_change,
                percent_change: absolute_change / current * 100.0,
                cumulative_percent_change: (next - base_price) / base_price * 100.0,
                direction,
            });
            current = next;
        }

        Ladder {
            direction,
            steps,
            end,
        }
    }
}

/// Limit price one trading day away from `current`
///
/// The error side carries the reason the walk cannot continue; it is a
/// normal end of the ladder, not a failure.
pub fn next_limit(
    current: Price,
    board: BoardType,
    direction: Direction,
) -> std::result::Result<Price, LadderEnd> {
    let raw = match limit_rule(current, board) {
        LimitRule::Absolute(delta) => current + direction.sign() * delta,
        LimitRule::Percent(pct) => current * (1.0 + direction.sign() * pct),
        LimitRule::Terminal => return Err(LadderEnd::BelowLimitFloor),
    };
    if !raw.is_finite() {
        return Err(LadderEnd::PriceOverflow);
    }
    match round_limit_price(raw, current, direction) {
        Some(price) if price.is_finite() => Ok(price),
        Some(_) => Err(LadderEnd::PriceOverflow),
        None => Err(LadderEnd::MinimumPrice),
    }
}

/// Generate both ladders for a base price
pub fn generate_ladder(
    base_price: Price,
    board: BoardType,
    max_steps: usize,
) -> Result<LimitLadders> {
    LadderGenerator::new(board, max_steps).generate(base_price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_step_regular() {
        let ladders = generate_ladder(975.0, BoardType::Regular, 1).unwrap();
        assert_eq!(ladders.ascending.prices(), vec![1_215.0]);
        assert_eq!(ladders.descending.prices(), vec![735.0]);
        assert_eq!(ladders.ascending.end, LadderEnd::StepsExhausted);

        let up = &ladders.ascending.steps[0];
        assert_eq!(up.step_index, 1);
        assert_eq!(up.absolute_change, 240.0);
        assert_relative_eq!(up.percent_change, 24.615_384_615, epsilon = 1e-6);
        assert_relative_eq!(up.cumulative_percent_change, up.percent_change);

        let down = &ladders.descending.steps[0];
        assert_eq!(down.absolute_change, -240.0);
        assert_eq!(down.direction, Direction::Descending);
    }

    #[test]
    fn test_multi_step_regular() {
        let ladders = generate_ladder(1_000.0, BoardType::Regular, 3).unwrap();
        // 1000 -> 1250 -> 1562.5 floor 5 -> 1560 -> 1950
        assert_eq!(ladders.ascending.prices(), vec![1_250.0, 1_560.0, 1_950.0]);
        // 1000 -> 750 -> 562.5 ceil 5 -> 565 -> 423.75 ceil 2 -> 424
        assert_eq!(ladders.descending.prices(), vec![750.0, 565.0, 424.0]);
        assert_relative_eq!(
            ladders.ascending.steps[2].cumulative_percent_change,
            95.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_regular_crosses_into_twenty_percent_band() {
        let ladders = generate_ladder(5_000.0, BoardType::Regular, 2).unwrap();
        // 5000 is still in the 25% band, 6250 is in the 20% band
        assert_eq!(ladders.ascending.prices(), vec![6_250.0, 7_500.0]);
    }

    #[test]
    fn test_regular_descending_stops_below_floor() {
        let ladders = generate_ladder(100.0, BoardType::Regular, 10).unwrap();
        // 100 -> 65 -> 42.25 ceil -> 43, then below 50
        assert_eq!(ladders.descending.prices(), vec![65.0, 43.0]);
        assert_eq!(ladders.descending.end, LadderEnd::BelowLimitFloor);
        assert!(ladders.descending.ended_early());
        assert_eq!(ladders.ascending.len(), 10);
    }

    #[test]
    fn test_regular_base_below_floor() {
        let ladders = generate_ladder(30.0, BoardType::Regular, 5).unwrap();
        assert!(ladders.ascending.is_empty());
        assert!(ladders.descending.is_empty());
        assert_eq!(ladders.ascending.end, LadderEnd::BelowLimitFloor);
        assert_eq!(ladders.descending.end, LadderEnd::BelowLimitFloor);
    }

    #[test]
    fn test_accelerated_absolute_zone() {
        let ladders = generate_ladder(5.0, BoardType::Accelerated, 10).unwrap();
        assert_eq!(
            ladders.ascending.prices(),
            vec![6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0]
        );
        assert_eq!(ladders.descending.prices(), vec![4.0, 3.0, 2.0, 1.0]);
        assert_eq!(ladders.descending.end, LadderEnd::MinimumPrice);
    }

    #[test]
    fn test_accelerated_percent_zone() {
        let ladders = generate_ladder(100.0, BoardType::Accelerated, 2).unwrap();
        assert_eq!(ladders.ascending.prices(), vec![110.0, 121.0]);
        // 100 -> 90 -> 81
        assert_eq!(ladders.descending.prices(), vec![90.0, 81.0]);
    }

    #[test]
    fn test_accelerated_below_one_rupiah() {
        let ladders = generate_ladder(0.5, BoardType::Accelerated, 4).unwrap();
        // 0.55 rounds back to 0, so the first step moves a whole tick to 1
        assert_eq!(ladders.ascending.prices(), vec![1.0, 2.0, 3.0, 4.0]);
        assert!(ladders.descending.is_empty());
        assert_eq!(ladders.descending.end, LadderEnd::MinimumPrice);
    }

    #[test]
    fn test_regular_below_one_rupiah_is_terminal() {
        let ladders = generate_ladder(0.5, BoardType::Regular, 4).unwrap();
        assert!(ladders.ascending.is_empty());
        assert_eq!(ladders.ascending.end, LadderEnd::BelowLimitFloor);
        assert_eq!(ladders.descending.end, LadderEnd::BelowLimitFloor);
    }

    #[test]
    fn test_overflow_ends_the_walk() {
        let ladders = generate_ladder(1e308, BoardType::Regular, 10).unwrap();
        // 1e308 * 1.2^4 is past f64::MAX
        assert_eq!(ladders.ascending.len(), 3);
        assert_eq!(ladders.ascending.end, LadderEnd::PriceOverflow);
        assert!(ladders.ascending.prices().iter().all(|p| p.is_finite()));
        assert!(ladders
            .ascending
            .steps
            .windows(2)
            .all(|w| w[1].price > w[0].price));
        assert_eq!(ladders.descending.len(), 10);
    }

    #[test]
    fn test_zero_steps() {
        let ladders = generate_ladder(975.0, BoardType::Regular, 0).unwrap();
        assert!(ladders.ascending.is_empty());
        assert!(ladders.descending.is_empty());
        assert_eq!(ladders.ascending.end, LadderEnd::StepsExhausted);
    }

    #[test]
    fn test_invalid_base_price() {
        assert!(generate_ladder(0.0, BoardType::Regular, 3).is_err());
        assert!(generate_ladder(-100.0, BoardType::Regular, 3).is_err());
        assert!(generate_ladder(f64::NAN, BoardType::Accelerated, 3).is_err());
    }

    #[test]
    fn test_combined_sorted() {
        let ladders = generate_ladder(975.0, BoardType::Regular, 2).unwrap();
        let rows = ladders.combined();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].kind, RowKind::Ara);
        assert_eq!(rows[2].kind, RowKind::Base);
        assert_eq!(rows[2].price, 975.0);
        assert_eq!(rows[4].kind, RowKind::Arb);
        assert!(rows.windows(2).all(|w| w[0].price > w[1].price));
    }

    #[test]
    fn test_next_limits() {
        let ladders = generate_ladder(975.0, BoardType::Regular, 3).unwrap();
        assert_eq!(ladders.next_ara(), Some(1_215.0));
        assert_eq!(ladders.next_arb(), Some(735.0));
        assert_eq!(
            next_limit(40.0, BoardType::Regular, Direction::Ascending),
            Err(LadderEnd::BelowLimitFloor)
        );
        assert_eq!(
            next_limit(1.0, BoardType::Accelerated, Direction::Descending),
            Err(LadderEnd::MinimumPrice)
        );
    }
}
