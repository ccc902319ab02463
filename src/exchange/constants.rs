//! Exchange constants and defaults
//!
//! Fixed conventions of the Indonesia Stock Exchange used throughout the engine

/// Shares per lot
pub const LOT_SIZE: u64 = 100;

/// Shares per lot as a float, for cash arithmetic
pub const SHARES_PER_LOT: f64 = LOT_SIZE as f64;

/// Minimum tradable price (Rp 1)
pub const MIN_PRICE: f64 = 1.0;

/// Lowest price with a regular-board auto-reject band
pub const REGULAR_LIMIT_FLOOR: f64 = 50.0;

/// Upper bound (inclusive) of the accelerated board's absolute-step zone
pub const ACCELERATED_ABSOLUTE_CEILING: f64 = 10.0;

/// Fixed step for accelerated prices within [1, 10]
pub const ACCELERATED_ABSOLUTE_STEP: f64 = 1.0;

/// Default number of trading days in a generated ladder
pub const DEFAULT_LADDER_STEPS: usize = 6;

/// Smallest lot a warrant calculation accepts
pub const MIN_WARRANT_LOTS: f64 = 0.5;

/// Tolerance applied before flooring/ceiling prices to ticks
pub const ZERO_TOLERANCE: f64 = 1e-6;
