//! Exchange rules - tick sizes, auto-reject limits, ladders

pub mod constants;
pub mod ladder;
pub mod price_limit;
pub mod rounding;
pub mod tick_size;

pub use ladder::{
    generate_ladder, next_limit, Ladder, LadderEnd, LadderGenerator, LadderRow, LimitLadders,
    LimitStep, RowKind,
};
pub use price_limit::{limit_percent, limit_rule, LimitBand, LimitRule};
pub use rounding::{round_limit_price, round_to_tick, RoundMode};
pub use tick_size::{is_tick_aligned, tick_size, tick_table, TickBand, TICK_BANDS};
