//! Finance module - fees, trade economics, sizing, corporate actions, price levels

pub mod compound;
pub mod corporate_actions;
pub mod fees;
pub mod planner;
pub mod portfolio;
pub mod sizing;
pub mod technical;
pub mod trade;
pub mod warrant;

pub use compound::{compound_schedule, CompoundPoint, CompoundSchedule, MAX_COMPOUND_YEARS};
pub use corporate_actions::{ExerciseScenario, RightsIssue, RightsOutcome, SellRightsScenario};
pub use fees::{resolve_fees, BrokerPreset, FeeSchedule, BROKER_PRESETS, CUSTOM_BROKER};
pub use planner::{plan_trade, LimitReason, PlanRequest, SizingMode, TradePlan};
pub use portfolio::{aggregate, PortfolioAggregate, PositionResult};
pub use sizing::{
    compare_sizing, lot_cost, max_lots_for_capital, size_against_ara, LotAllocation,
    SizingComparison,
};
pub use technical::{
    confluence_zones, fibonacci_retracement, pivot_points, ConfluenceZone, FibonacciLevels,
    PivotLevels, PivotMethod, PriceLevel, Trend, DEFAULT_CONFLUENCE_THRESHOLD,
};
pub use trade::{compute_trade, dividend_projection, DividendProjection, Position, TradeResult};
pub use warrant::{aggregate_warrants, compute_warrant, WarrantPosition};
