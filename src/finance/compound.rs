//! Compound growth with monthly contributions

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::types::{round_cents, Cash};

/// Longest horizon a schedule may cover
pub const MAX_COMPOUND_YEARS: f64 = 100.0;

/// Balance at the end of a month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompoundPoint {
    /// Year number, starting at 1
    pub year: u32,
    /// Month number across the whole schedule, starting at 1
    pub month: u32,
    pub amount: Cash,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundSchedule {
    pub points: Vec<CompoundPoint>,
    pub final_amount: Cash,
    /// Initial amount plus every monthly contribution
    pub total_contributed: Cash,
}

impl CompoundSchedule {
    pub fn growth(&self) -> Cash {
        round_cents(self.final_amount - self.total_contributed)
    }

    /// Points belonging to one year
    pub fn year(&self, year: u32) -> impl Iterator<Item = &CompoundPoint> {
        self.points.iter().filter(move |p| p.year == year)
    }
}

/// Build a monthly compounding schedule
///
/// Each month the contribution is added first, then interest at
/// `annual_rate_percent / 12` is applied and the balance is rounded to
/// 2 decimals. The schedule covers `floor(years * 12)` months, for at most
/// [`MAX_COMPOUND_YEARS`].
pub fn compound_schedule(
    initial: Cash,
    annual_rate_percent: f64,
    years: f64,
    monthly_contribution: Cash,
) -> Result<CompoundSchedule> {
    for (field, value) in [
        ("initial", initial),
        ("annual_rate_percent", annual_rate_percent),
        ("years", years),
        ("monthly_contribution", monthly_contribution),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "{} must be non-negative, got {}",
                field, value
            )));
        }
    }

    if years > MAX_COMPOUND_YEARS {
        return Err(EngineError::InvalidInput(format!(
            "years must be at most {}, got {}",
            MAX_COMPOUND_YEARS, years
        )));
    }

    let months = (years * 12.0).floor() as u32;
    let monthly_rate = annual_rate_percent / 100.0 / 12.0;
    let mut amount = initial;
    let mut points = Vec::with_capacity(months as usize);

    for month in 1..=months {
        amount += monthly_contribution;
        amount = round_cents(amount * (1.0 + monthly_rate));
        points.push(CompoundPoint {
            year: (month - 1) / 12 + 1,
            month,
            amount,
        });
    }

    Ok(CompoundSchedule {
        final_amount: points.last().map(|p| p.amount).unwrap_or(initial),
        total_contributed: round_cents(initial + monthly_contribution * months as f64),
        points,
    })
}
