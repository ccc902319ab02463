//! Tick size (fraksi harga) table
//!
//! Every quoted price must be a multiple of the tick size of the band it
//! falls in. The bands are kept as data so that contiguity and totality can
//! be checked mechanically.

use serde::{Deserialize, Serialize};

use crate::exchange::constants::ZERO_TOLERANCE;
use crate::types::Price;

/// One band of the tick table: `[lower, upper)` maps to `tick`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickBand {
    /// Inclusive lower bound
    pub lower: Price,
    /// Exclusive upper bound (`f64::INFINITY` for the last band)
    pub upper: Price,
    /// Minimum price increment within the band
    pub tick: u32,
}

impl TickBand {
    /// Check whether a price falls in this band
    pub fn contains(&self, price: Price) -> bool {
        price >= self.lower && price < self.upper
    }
}

/// IDX tick table, ordered and contiguous over `[0, inf)`
pub const TICK_BANDS: &[TickBand] = &[
    TickBand {
        lower: 0.0,
        upper: 200.0,
        tick: 1,
    },
    TickBand {
        lower: 200.0,
        upper: 500.0,
        tick: 2,
    },
    TickBand {
        lower: 500.0,
        upper: 2_000.0,
        tick: 5,
    },
    TickBand {
        lower: 2_000.0,
        upper: 5_000.0,
        tick: 10,
    },
    TickBand {
        lower: 5_000.0,
        upper: f64::INFINITY,
        tick: 25,
    },
];

/// Get the tick table for display
pub fn tick_table() -> &'static [TickBand] {
    TICK_BANDS
}

/// Find the band a price falls in
///
/// Negative and NaN prices are clamped to 0 before the lookup.
pub fn band_for(price: Price) -> &'static TickBand {
    let price = if price.is_nan() { 0.0 } else { price.max(0.0) };
    TICK_BANDS
        .iter()
        .find(|band| band.contains(price))
        .unwrap_or(&TICK_BANDS[TICK_BANDS.len() - 1])
}

/// Minimum price increment for a price
pub fn tick_size(price: Price) -> u32 {
    band_for(price).tick
}

/// Check whether a price is a multiple of its own tick size
pub fn is_tick_aligned(price: Price) -> bool {
    let tick = f64::from(tick_size(price));
    let ticks = price / tick;
    (ticks - ticks.round()).abs() < ZERO_TOLERANCE
}
