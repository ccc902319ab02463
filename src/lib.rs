//! # IDX Trade Engine
//!
//! Exchange rules and trade economics for the Indonesia Stock Exchange.
//!
//! - tick sizes (fraksi harga) and tick rounding
//! - auto-reject limits (ARA/ARB) for the regular and acceleration boards,
//!   walked across consecutive trading days
//! - fee-aware profit/loss, batch aggregation, warrants and dividends
//! - lot sizing against capital, including the worst case of filling at the
//!   day's upper limit
//!
//! Every calculation is a pure function of its inputs.
//!
//! ## Example
//!
//! ```rust
//! use idx_trade_engine::prelude::*;
//!
//! let ladders = generate_ladder(975.0, BoardType::Regular, 3).unwrap();
//! assert_eq!(ladders.next_ara(), Some(1215.0));
//! assert_eq!(ladders.next_arb(), Some(735.0));
//!
//! let fees = FeeSchedule::new(0.0015, 0.0025).unwrap();
//! let result = compute_trade(&Position::new("BBCA", 100, 1000.0, 1200.0, fees)).unwrap();
//! assert_eq!(result.profit_loss, 1_955_000.0);
//! ```

#[cfg(feature = "cli")]
pub mod config;
pub mod error;
pub mod exchange;
pub mod finance;
pub mod types;

pub mod prelude {
    //! Commonly used types and functions
    pub use crate::error::{EngineError, Result};
    pub use crate::exchange::{
        generate_ladder, limit_percent, limit_rule, round_to_tick, tick_size, Ladder, LadderEnd,
        LadderGenerator, LimitLadders, LimitRule, LimitStep, RoundMode,
    };
    pub use crate::finance::{
        aggregate, compute_trade, max_lots_for_capital, size_against_ara, FeeSchedule,
        PortfolioAggregate, Position, TradeResult,
    };
    pub use crate::types::*;
}
