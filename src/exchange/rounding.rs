//! Tick rounding for limit prices
//!
//! Upper limits are floored to a tick so the result never exceeds the raw
//! regulatory limit; lower limits are ceiled so they never undercut it.
//! The tick is always looked up at the price being rounded, since crossing
//! a band changes the increment.

use serde::{Deserialize, Serialize};

use crate::exchange::constants::{MIN_PRICE, ZERO_TOLERANCE};
use crate::exchange::tick_size::tick_size;
use crate::types::{Direction, Price};

/// Rounding direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundMode {
    /// Floor to the tick below
    Down,
    /// Ceil to the tick above
    Up,
}

impl From<Direction> for RoundMode {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Ascending => RoundMode::Down,
            Direction::Descending => RoundMode::Up,
        }
    }
}

/// Round a price to a multiple of its tick size
///
/// Tick-aligned prices come back unchanged in both modes.
pub fn round_to_tick(price: Price, mode: RoundMode) -> Price {
    let tick = f64::from(tick_size(price));
    let ticks = price / tick;
    let rounded = match mode {
        RoundMode::Down => (ticks + ZERO_TOLERANCE).floor(),
        RoundMode::Up => (ticks - ZERO_TOLERANCE).ceil(),
    };
    rounded * tick
}

/// Round a raw limit boundary reached from `previous`
///
/// Rounds in the direction that keeps the result inside the regulatory
/// limit, clamps lower limits to [`MIN_PRICE`], and nudges the result one
/// tick further when rounding would leave it at (or behind) `previous`.
/// Returns `None` when a descending walk is already at the minimum price.
pub fn round_limit_price(raw: Price, previous: Price, direction: Direction) -> Option<Price> {
    match direction {
        Direction::Ascending => {
            let mut price = round_to_tick(raw, RoundMode::Down);
            if price <= previous + ZERO_TOLERANCE {
                let step = f64::from(tick_size(previous));
                price = round_to_tick(previous + step, RoundMode::Down);
                log::trace!("nudged ascending limit from {} to {}", previous, price);
            }
            Some(price)
        }
        Direction::Descending => {
            let mut price = round_to_tick(raw.max(MIN_PRICE), RoundMode::Up).max(MIN_PRICE);
            if price >= previous - ZERO_TOLERANCE {
                // step with the tick of the band just below `previous`
                let step = f64::from(tick_size(previous - ZERO_TOLERANCE));
                price = round_to_tick(previous - step, RoundMode::Up);
                log::trace!("nudged descending limit from {} to {}", previous, price);
            }
            if price < MIN_PRICE - ZERO_TOLERANCE || price >= previous - ZERO_TOLERANCE {
                return None;
            }
            Some(price)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_tick() {
        assert_eq!(round_to_tick(202.0, RoundMode::Down), 202.0);
        assert_eq!(round_to_tick(202.0, RoundMode::Up), 202.0);
        assert_eq!(round_to_tick(203.0, RoundMode::Down), 202.0);
        assert_eq!(round_to_tick(203.0, RoundMode::Up), 204.0);
        assert_eq!(round_to_tick(503.0, RoundMode::Down), 500.0);
        assert_eq!(round_to_tick(503.0, RoundMode::Up), 505.0);
        assert_eq!(round_to_tick(1_218.75, RoundMode::Down), 1_215.0);
        assert_eq!(round_to_tick(731.25, RoundMode::Up), 735.0);
    }

    #[test]
    fn test_round_tolerates_float_noise() {
        // 1000 * 0.9 is not exactly 900 in binary
        assert_eq!(round_to_tick(1_000.0 * 0.9, RoundMode::Down), 900.0);
        assert_eq!(round_to_tick(1_000.0 * 0.9, RoundMode::Up), 900.0);
        assert_eq!(round_to_tick(1_000.0 * 1.1, RoundMode::Down), 1_100.0);
    }

    #[test]
    fn test_ceil_across_band_boundary() {
        // ceiling just under a band edge lands on the edge, which is valid in both bands
        assert_eq!(round_to_tick(1_997.5, RoundMode::Up), 2_000.0);
        assert_eq!(round_to_tick(4_995.5, RoundMode::Up), 5_000.0);
    }

    #[test]
    fn test_round_limit_price() {
        assert_eq!(
            round_limit_price(1_218.75, 975.0, Direction::Ascending),
            Some(1_215.0)
        );
        assert_eq!(
            round_limit_price(731.25, 975.0, Direction::Descending),
            Some(735.0)
        );
    }

    #[test]
    fn test_nudge_forward() {
        // rounding back onto the previous price moves one tick instead
        assert_eq!(round_limit_price(10.5, 10.0, Direction::Ascending), Some(11.0));
        assert_eq!(round_limit_price(498.5, 498.0, Direction::Ascending), Some(500.0));
        assert_eq!(round_limit_price(499.0, 500.0, Direction::Descending), Some(498.0));
        assert_eq!(round_limit_price(2.5, 3.0, Direction::Descending), Some(2.0));
    }

    #[test]
    fn test_descending_floor() {
        assert_eq!(round_limit_price(0.4, 2.0, Direction::Descending), Some(1.0));
        assert_eq!(round_limit_price(0.0, 1.0, Direction::Descending), None);
    }
}
