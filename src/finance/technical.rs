//! Support and resistance levels from a session's high, low and close
//!
//! Pivot points (classic, Woodie, Camarilla), Fibonacci retracements of a
//! swing, and confluence zones where a pivot level and a retracement level
//! sit close together. Levels are raw prices; they are not tick-rounded.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{ensure_positive_price, EngineError, Result};
use crate::types::Price;

/// Retracement ratios, shallowest first
pub const FIBONACCI_RATIOS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

/// Ratios bounding the golden pocket
pub const GOLDEN_POCKET: (f64, f64) = (0.618, 0.65);

/// Maximum distance, in percent of the Fibonacci level, for two levels to overlap
pub const DEFAULT_CONFLUENCE_THRESHOLD: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PivotMethod {
    #[default]
    Classic,
    /// Close weighted twice
    Woodie,
    Camarilla,
}

impl fmt::Display for PivotMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PivotMethod::Classic => write!(f, "classic"),
            PivotMethod::Woodie => write!(f, "woodie"),
            PivotMethod::Camarilla => write!(f, "camarilla"),
        }
    }
}

impl FromStr for PivotMethod {
    type Err = EngineError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" | "standard" => Ok(PivotMethod::Classic),
            "woodie" => Ok(PivotMethod::Woodie),
            "camarilla" => Ok(PivotMethod::Camarilla),
            other => Err(EngineError::InvalidInput(format!(
                "unknown pivot method '{}'",
                other
            ))),
        }
    }
}

/// Direction of the swing being retraced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// Low to high; retracements measured down from the high
    #[default]
    Uptrend,
    /// High to low; retracements measured up from the low
    Downtrend,
}

impl FromStr for Trend {
    type Err = EngineError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "uptrend" => Ok(Trend::Uptrend),
            "down" | "downtrend" => Ok(Trend::Downtrend),
            other => Err(EngineError::InvalidInput(format!("unknown trend '{}'", other))),
        }
    }
}

/// A named price level, e.g. `R1` or `61.8%`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub name: String,
    pub price: Price,
}

impl PriceLevel {
    fn new(name: impl Into<String>, price: Price) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }

    pub fn is_resistance(&self) -> bool {
        self.name.starts_with('R')
    }

    pub fn is_support(&self) -> bool {
        self.name.starts_with('S')
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotLevels {
    pub method: PivotMethod,
    pub levels: Vec<PriceLevel>,
}

impl PivotLevels {
    pub fn get(&self, name: &str) -> Option<Price> {
        self.levels.iter().find(|l| l.name == name).map(|l| l.price)
    }

    /// Central pivot; Camarilla has none
    pub fn pivot(&self) -> Option<Price> {
        self.get("P")
    }

    /// Levels ordered from highest to lowest price
    pub fn sorted_desc(&self) -> Vec<PriceLevel> {
        let mut levels = self.levels.clone();
        levels.sort_by(|a, b| b.price.partial_cmp(&a.price).unwrap_or(Ordering::Equal));
        levels
    }
}

fn ensure_high_low(high: Price, low: Price) -> Result<()> {
    ensure_positive_price("high", high)?;
    ensure_positive_price("low", low)?;
    if high < low {
        return Err(EngineError::InvalidInput(format!(
            "high {} is below low {}",
            high, low
        )));
    }
    Ok(())
}

/// Pivot levels for the next session
pub fn pivot_points(
    high: Price,
    low: Price,
    close: Price,
    method: PivotMethod,
) -> Result<PivotLevels> {
    ensure_high_low(high, low)?;
    ensure_positive_price("close", close)?;

    let range = high - low;
    let levels = match method {
        PivotMethod::Classic => {
            let p = (high + low + close) / 3.0;
            vec![
                PriceLevel::new("P", p),
                PriceLevel::new("R1", 2.0 * p - low),
                PriceLevel::new("S1", 2.0 * p - high),
                PriceLevel::new("R2", p + range),
                PriceLevel::new("S2", p - range),
                PriceLevel::new("R3", high + 2.0 * (p - low)),
                PriceLevel::new("S3", low - 2.0 * (high - p)),
            ]
        }
        PivotMethod::Woodie => {
            let p = (high + low + 2.0 * close) / 4.0;
            vec![
                PriceLevel::new("P", p),
                PriceLevel::new("R1", 2.0 * p - low),
                PriceLevel::new("S1", 2.0 * p - high),
                PriceLevel::new("R2", p + range),
                PriceLevel::new("S2", p - range),
            ]
        }
        PivotMethod::Camarilla => {
            let spread = range * 1.1;
            [(4, 2.0), (3, 4.0), (2, 6.0), (1, 12.0)]
                .iter()
                .flat_map(|&(n, div)| {
                    [
                        PriceLevel::new(format!("R{}", n), close + spread / div),
                        PriceLevel::new(format!("S{}", n), close - spread / div),
                    ]
                })
                .collect()
        }
    };

    Ok(PivotLevels { method, levels })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FibonacciLevels {
    pub trend: Trend,
    pub swing_high: Price,
    pub swing_low: Price,
    /// One level per entry of [`FIBONACCI_RATIOS`], named like `61.8%`
    pub levels: Vec<PriceLevel>,
    /// Prices at the 0.618 and 0.65 retracements
    pub golden_pocket: (Price, Price),
}

/// Retracement levels of a swing
///
/// The swing high must be strictly above the swing low.
pub fn fibonacci_retracement(
    swing_high: Price,
    swing_low: Price,
    trend: Trend,
) -> Result<FibonacciLevels> {
    ensure_high_low(swing_high, swing_low)?;
    if swing_high == swing_low {
        return Err(EngineError::InvalidInput(
            "swing high must be above swing low".to_string(),
        ));
    }

    let diff = swing_high - swing_low;
    let at = |ratio: f64| match trend {
        Trend::Uptrend => swing_high - diff * ratio,
        Trend::Downtrend => swing_low + diff * ratio,
    };

    Ok(FibonacciLevels {
        trend,
        swing_high,
        swing_low,
        levels: FIBONACCI_RATIOS
            .iter()
            .map(|&r| PriceLevel::new(format!("{:.1}%", r * 100.0), at(r)))
            .collect(),
        golden_pocket: (at(GOLDEN_POCKET.0), at(GOLDEN_POCKET.1)),
    })
}

/// A pivot level and a retracement level close enough to reinforce each other
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfluenceZone {
    pub pivot: PriceLevel,
    pub fibonacci: PriceLevel,
    /// Distance between the two, in percent of the Fibonacci level
    pub diff_percent: f64,
    /// Midpoint of the two levels
    pub zone_price: Price,
}

/// Pair every pivot level with every retracement level within `threshold_percent`
///
/// Zones come back tightest first; ties keep pivot order.
pub fn confluence_zones(
    pivots: &[PriceLevel],
    fibonacci: &[PriceLevel],
    threshold_percent: f64,
) -> Result<Vec<ConfluenceZone>> {
    if !threshold_percent.is_finite() || threshold_percent < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "confluence threshold must be non-negative, got {}",
            threshold_percent
        )));
    }

    let mut zones: Vec<ConfluenceZone> = pivots
        .iter()
        .flat_map(|p| fibonacci.iter().map(move |f| (p, f)))
        .filter(|(_, f)| f.price > 0.0)
        .filter_map(|(p, f)| {
            let diff_percent = (p.price - f.price).abs() / f.price * 100.0;
            (diff_percent <= threshold_percent).then(|| ConfluenceZone {
                pivot: p.clone(),
                fibonacci: f.clone(),
                diff_percent,
                zone_price: (p.price + f.price) / 2.0,
            })
        })
        .collect();

    zones.sort_by(|a, b| {
        a.diff_percent
            .partial_cmp(&b.diff_percent)
            .unwrap_or(Ordering::Equal)
    });
    log::debug!("{} confluence zones within {}%", zones.len(), threshold_percent);
    Ok(zones)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_classic_pivots() {
        let pivots = pivot_points(1_000.0, 900.0, 950.0, PivotMethod::Classic).unwrap();
        assert_eq!(pivots.pivot(), Some(950.0));
        assert_eq!(pivots.get("R1"), Some(1_000.0));
        assert_eq!(pivots.get("S1"), Some(900.0));
        assert_eq!(pivots.get("R2"), Some(1_050.0));
        assert_eq!(pivots.get("S2"), Some(850.0));
        assert_eq!(pivots.get("R3"), Some(1_100.0));
        assert_eq!(pivots.get("S3"), Some(800.0));
    }

    #[test]
    fn test_woodie_weights_close() {
        let pivots = pivot_points(1_000.0, 900.0, 980.0, PivotMethod::Woodie).unwrap();
        // (1000 + 900 + 2 * 980) / 4
        assert_eq!(pivots.pivot(), Some(965.0));
        assert_eq!(pivots.get("R1"), Some(1_030.0));
        assert_eq!(pivots.get("S2"), Some(865.0));
        assert_eq!(pivots.levels.len(), 5);
    }

    #[test]
    fn test_camarilla_levels() {
        let pivots = pivot_points(1_000.0, 900.0, 950.0, PivotMethod::Camarilla).unwrap();
        assert_eq!(pivots.pivot(), None);
        assert_relative_eq!(pivots.get("R4").unwrap(), 1_005.0, epsilon = 1e-9);
        assert_relative_eq!(pivots.get("S4").unwrap(), 895.0, epsilon = 1e-9);
        assert_relative_eq!(pivots.get("R3").unwrap(), 977.5, epsilon = 1e-9);
        assert_relative_eq!(pivots.get("R1").unwrap(), 959.166_666_67, epsilon = 1e-6);

        let sorted = pivots.sorted_desc();
        assert_eq!(sorted[0].name, "R4");
        assert_eq!(sorted[7].name, "S4");
        assert!(sorted[0].is_resistance());
        assert!(sorted[7].is_support());
    }

    #[test]
    fn test_pivot_validation() {
        assert!(pivot_points(900.0, 1_000.0, 950.0, PivotMethod::Classic).is_err());
        assert!(pivot_points(1_000.0, 0.0, 950.0, PivotMethod::Classic).is_err());
        assert!(pivot_points(1_000.0, 900.0, f64::NAN, PivotMethod::Woodie).is_err());
    }

    #[test]
    fn test_fibonacci_uptrend() {
        let fib = fibonacci_retracement(1_100.0, 900.0, Trend::Uptrend).unwrap();
        let prices: Vec<f64> = fib.levels.iter().map(|l| l.price).collect();
        let expected = [1_100.0, 1_052.8, 1_023.6, 1_000.0, 976.4, 942.8, 900.0];
        for (got, want) in prices.iter().zip(expected) {
            assert_relative_eq!(*got, want, epsilon = 1e-9);
        }
        assert_eq!(fib.levels[4].name, "61.8%");
        assert_eq!(fib.levels[0].name, "0.0%");
        assert_relative_eq!(fib.golden_pocket.0, 976.4, epsilon = 1e-9);
        assert_relative_eq!(fib.golden_pocket.1, 970.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fibonacci_downtrend() {
        let fib = fibonacci_retracement(1_100.0, 900.0, Trend::Downtrend).unwrap();
        assert_eq!(fib.levels[0].price, 900.0);
        assert_relative_eq!(fib.levels[4].price, 1_023.6, epsilon = 1e-9);
        assert_eq!(fib.levels[6].price, 1_100.0);
    }

    #[test]
    fn test_fibonacci_needs_a_swing() {
        assert!(fibonacci_retracement(1_000.0, 1_000.0, Trend::Uptrend).is_err());
        assert!(fibonacci_retracement(900.0, 1_000.0, Trend::Uptrend).is_err());
    }

    #[test]
    fn test_confluence_zones() {
        let pivots = pivot_points(1_000.0, 900.0, 950.0, PivotMethod::Classic).unwrap();
        let fib = fibonacci_retracement(1_100.0, 900.0, Trend::Uptrend).unwrap();
        let zones =
            confluence_zones(&pivots.levels, &fib.levels, DEFAULT_CONFLUENCE_THRESHOLD).unwrap();

        // R1/50%, S1/100% and R3/0% coincide; R2 and P sit close to 23.6% and 78.6%
        assert_eq!(zones.len(), 5);
        assert_eq!(zones[0].pivot.name, "R1");
        assert_eq!(zones[0].diff_percent, 0.0);
        assert_eq!(zones[3].pivot.name, "R2");
        assert_eq!(zones[4].pivot.name, "P");
        assert_eq!(zones[4].fibonacci.name, "78.6%");
        assert_relative_eq!(zones[4].zone_price, 946.4, epsilon = 1e-9);
        assert!(zones.windows(2).all(|w| w[0].diff_percent <= w[1].diff_percent));
    }

    #[test]
    fn test_confluence_threshold() {
        let pivots = pivot_points(1_000.0, 900.0, 950.0, PivotMethod::Classic).unwrap();
        let fib = fibonacci_retracement(1_100.0, 900.0, Trend::Uptrend).unwrap();
        assert_eq!(confluence_zones(&pivots.levels, &fib.levels, 0.0).unwrap().len(), 3);
        assert!(confluence_zones(&pivots.levels, &fib.levels, -1.0).is_err());
        assert!(confluence_zones(&[], &fib.levels, 2.0).unwrap().is_empty());
    }

    #[test]
    fn test_parse_method_and_trend() {
        assert_eq!("Camarilla".parse::<PivotMethod>().unwrap(), PivotMethod::Camarilla);
        assert_eq!("down".parse::<Trend>().unwrap(), Trend::Downtrend);
        assert!("fib".parse::<PivotMethod>().is_err());
    }
}
