//! Auto-reject (ARA/ARB) price limit policy
//!
//! Maps a reference price and board to the maximum move allowed for the
//! next trading day. Like the tick table, both boards are described as
//! ordered band lists.

use serde::{Deserialize, Serialize};
use std::ops::{Bound, RangeBounds};

use crate::exchange::constants::ACCELERATED_ABSOLUTE_STEP;
use crate::types::{BoardType, Percentage, Price};

/// Allowed daily move for a price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LimitRule {
    /// Move by a fraction of the reference price
    Percent(Percentage),
    /// Move by a fixed amount of currency
    Absolute(Price),
    /// No limit defined below this price; the ladder stops
    Terminal,
}

/// One band of a limit table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimitBand {
    pub lower: Bound<Price>,
    pub upper: Bound<Price>,
    pub rule: LimitRule,
}

impl LimitBand {
    pub fn contains(&self, price: Price) -> bool {
        (self.lower, self.upper).contains(&price)
    }
}

/// Papan Utama / Pengembangan. Prices below 50 match no band.
pub const REGULAR_LIMIT_BANDS: &[LimitBand] = &[
    LimitBand {
        lower: Bound::Included(50.0),
        upper: Bound::Excluded(200.0),
        rule: LimitRule::Percent(0.35),
    },
    LimitBand {
        lower: Bound::Included(200.0),
        upper: Bound::Included(5_000.0),
        rule: LimitRule::Percent(0.25),
    },
    LimitBand {
        lower: Bound::Excluded(5_000.0),
        upper: Bound::Unbounded,
        rule: LimitRule::Percent(0.20),
    },
];

/// Papan Akselerasi
pub const ACCELERATED_LIMIT_BANDS: &[LimitBand] = &[
    LimitBand {
        lower: Bound::Included(0.0),
        upper: Bound::Excluded(1.0),
        rule: LimitRule::Percent(0.10),
    },
    LimitBand {
        lower: Bound::Included(1.0),
        upper: Bound::Included(10.0),
        rule: LimitRule::Absolute(ACCELERATED_ABSOLUTE_STEP),
    },
    LimitBand {
        lower: Bound::Excluded(10.0),
        upper: Bound::Unbounded,
        rule: LimitRule::Percent(0.10),
    },
];

/// Band table for a board
pub fn limit_bands(board: BoardType) -> &'static [LimitBand] {
    match board {
        BoardType::Regular => REGULAR_LIMIT_BANDS,
        BoardType::Accelerated => ACCELERATED_LIMIT_BANDS,
    }
}

/// Limit rule for a reference price on a board
pub fn limit_rule(price: Price, board: BoardType) -> LimitRule {
    limit_bands(board)
        .iter()
        .find(|band| band.contains(price))
        .map(|band| band.rule)
        .unwrap_or(LimitRule::Terminal)
}

/// Percentage form of the policy
///
/// Returns `None` when the price sits in the accelerated absolute-step
/// zone or below the lowest regulated band; use [`limit_rule`] to tell the
/// two apart.
pub fn limit_percent(price: Price, board: BoardType) -> Option<Percentage> {
    match limit_rule(price, board) {
        LimitRule::Percent(pct) => Some(pct),
        LimitRule::Absolute(_) | LimitRule::Terminal => None,
    }
}
