//! idx-calc - command-line front end for the IDX trade engine
//!
//! ## Example Usage
//!
//! ```bash
//! # ARA/ARB ladder for a closing price of 975
//! idx-calc ladder 975 --steps 6
//!
//! # Profit/loss of a round trip with Stockbit fees
//! idx-calc trade --lots 100 --buy 1000 --sell 1200 --broker stockbit
//!
//! # How many lots 1,000,000 buys at 200, and at the day's ARA
//! idx-calc size --capital 1000000 --price 200
//! ```

use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use std::process;

use idx_trade_engine::config::Config;
use idx_trade_engine::exchange::{generate_ladder, tick_size, tick_table, LimitLadders, RowKind};
use idx_trade_engine::finance::{
    aggregate, aggregate_warrants, compare_sizing, compound_schedule, compute_trade,
    compute_warrant, confluence_zones, dividend_projection, fibonacci_retracement,
    pivot_points, plan_trade, size_against_ara, FeeSchedule, PivotMethod, PlanRequest,
    PortfolioAggregate, Position, PriceLevel, RightsIssue, SizingMode, TradeResult, Trend,
    WarrantPosition, BROKER_PRESETS, DEFAULT_CONFLUENCE_THRESHOLD,
};
use idx_trade_engine::types::BoardType;

/// idx-calc: IDX tick sizes, ARA/ARB ladders and trade calculators
#[derive(Parser)]
#[command(name = "idx-calc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "IDX exchange rules and trade economics calculator", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the tick size table, or the tick for one price
    Ticks {
        #[arg(value_name = "PRICE")]
        price: Option<f64>,
    },

    /// Generate ARA/ARB ladders from a closing price
    Ladder {
        #[arg(value_name = "PRICE")]
        price: f64,

        /// Board type (regular, accelerated)
        #[arg(short = 'b', long)]
        board: Option<BoardType>,

        /// Number of trading days
        #[arg(short = 'n', long)]
        steps: Option<usize>,
    },

    /// Profit/loss of a single round trip
    Trade {
        #[arg(short = 'l', long)]
        lots: u64,

        #[arg(long)]
        buy: f64,

        #[arg(long)]
        sell: f64,

        /// Broker preset (IPOT, Stockbit, BNI Bions, Custom)
        #[arg(long)]
        broker: Option<String>,

        /// Custom buy fee in percent (overrides the preset)
        #[arg(long)]
        buy_fee: Option<f64>,

        /// Custom sell fee in percent (overrides the preset)
        #[arg(long)]
        sell_fee: Option<f64>,

        /// Leave the buy fee out
        #[arg(long)]
        no_buy_fee: bool,

        /// Leave the sell fee out
        #[arg(long)]
        no_sell_fee: bool,

        /// Dividend per share, to project income and yield
        #[arg(long)]
        dividend: Option<f64>,
    },

    /// Aggregate several round trips (SYMBOL:LOTS:BUY:SELL)
    Portfolio {
        #[arg(short = 'p', long = "position", required = true)]
        positions: Vec<String>,

        #[arg(long)]
        broker: Option<String>,
    },

    /// Largest position for a capital, at the limit price and at the day's ARA
    Size {
        #[arg(long)]
        capital: f64,

        #[arg(long)]
        price: f64,

        #[arg(long)]
        broker: Option<String>,

        #[arg(short = 'b', long)]
        board: Option<BoardType>,

        /// Worst-case execution price (defaults to the next ARA)
        #[arg(long)]
        safety_price: Option<f64>,
    },

    /// Plan a trade from stop-loss distance and reward:risk
    Plan {
        #[arg(long)]
        entry: f64,

        /// Stop-loss distance in percent
        #[arg(long, default_value = "3.0")]
        stop_loss: f64,

        /// Reward:risk ratio (1 : X)
        #[arg(long, default_value = "2.0")]
        rrr: f64,

        /// Total portfolio, to size by risk
        #[arg(long, conflicts_with = "capital", required_unless_present = "capital")]
        portfolio: Option<f64>,

        /// Risk per trade in percent of the portfolio
        #[arg(long, default_value = "2.0")]
        risk: f64,

        /// Fixed capital for this trade
        #[arg(long)]
        capital: Option<f64>,
    },

    /// Warrant round trips (SYMBOL:LOTS:BUY:SELL, fractional lots allowed)
    Warrant {
        #[arg(short = 'p', long = "position", required = true)]
        positions: Vec<String>,

        /// Broker preset (defaults to Stockbit)
        #[arg(long)]
        broker: Option<String>,
    },

    /// Rights issue simulation
    Rights {
        /// Closing price on the cum date
        #[arg(long)]
        cum: f64,

        /// Old shares per ratio unit
        #[arg(long)]
        old: f64,

        /// Rights per ratio unit
        #[arg(long)]
        new: f64,

        #[arg(long)]
        exercise: f64,

        /// Lots held
        #[arg(long)]
        lots: u64,

        #[arg(long)]
        broker: Option<String>,
    },

    /// Compound growth with monthly contributions
    Compound {
        #[arg(long)]
        initial: f64,

        /// Annual rate in percent
        #[arg(long)]
        rate: f64,

        #[arg(long)]
        years: f64,

        #[arg(long, default_value = "0")]
        monthly: f64,
    },

    /// Pivot point levels from a session's high, low and close
    Pivot {
        #[arg(long)]
        high: f64,

        #[arg(long)]
        low: f64,

        #[arg(long)]
        close: f64,

        /// classic, woodie or camarilla
        #[arg(short = 'm', long, default_value = "classic")]
        method: PivotMethod,
    },

    /// Fibonacci retracement of a swing
    Fibonacci {
        #[arg(long)]
        swing_high: f64,

        #[arg(long)]
        swing_low: f64,

        /// up (low to high) or down (high to low)
        #[arg(short = 't', long, default_value = "up")]
        trend: Trend,
    },

    /// Zones where pivot and Fibonacci levels overlap
    Confluence {
        #[arg(long)]
        high: f64,

        #[arg(long)]
        low: f64,

        #[arg(long)]
        close: f64,

        #[arg(short = 'm', long, default_value = "classic")]
        method: PivotMethod,

        #[arg(long)]
        swing_high: f64,

        #[arg(long)]
        swing_low: f64,

        #[arg(short = 't', long, default_value = "up")]
        trend: Trend,

        /// Maximum distance between levels, in percent
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// List broker fee presets
    Brokers,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref());

    if cli.verbose {
        println!(
            "{} v{}",
            "idx-calc".cyan().bold(),
            env!("CARGO_PKG_VERSION")
        );
        println!(
            "Broker: {}  Board: {}",
            config.default_broker.dimmed(),
            config.default_board.to_string().dimmed()
        );
    }

    if let Err(e) = run(cli, &config) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: Cli, config: &Config) -> Result<()> {
    let json = cli.json;
    match cli.command {
        Commands::Ticks { price } => show_ticks(price, json),
        Commands::Ladder {
            price,
            board,
            steps,
        } => {
            let board = board.unwrap_or(config.default_board);
            let steps = steps.unwrap_or(config.default_steps);
            let ladders = generate_ladder(price, board, steps)?;
            if json {
                return print_json(&ladders);
            }
            show_ladder(&ladders);
            Ok(())
        }
        Commands::Trade {
            lots,
            buy,
            sell,
            broker,
            buy_fee,
            sell_fee,
            no_buy_fee,
            no_sell_fee,
            dividend,
        } => {
            let mut fees = fees_with_overrides(config, broker.as_deref(), buy_fee, sell_fee)?;
            if no_buy_fee {
                fees = fees.without_buy_fee();
            }
            if no_sell_fee {
                fees = fees.without_sell_fee();
            }
            let result = compute_trade(&Position::new("-", lots, buy, sell, fees))?;
            let dividend = dividend
                .map(|dps| dividend_projection(lots, buy, dps))
                .transpose()?;
            if json {
                return print_json(&(result, dividend));
            }
            show_trade(&result, &fees);
            if let Some(d) = dividend {
                println!("  Total Dividend:   {}", rupiah(d.total_dividend));
                println!("  Dividend Yield:   {:.2}%", d.dividend_yield);
            }
            Ok(())
        }
        Commands::Portfolio { positions, broker } => {
            let fees = config.fees_for(broker.as_deref())?;
            let positions = positions
                .iter()
                .map(|raw| -> Result<Position> {
                    let (symbol, lots, buy, sell) = parse_position(raw)?;
                    if lots.fract() != 0.0 || lots < 0.0 {
                        bail!("lot count must be a whole number in '{}'", raw);
                    }
                    Ok(Position::new(symbol, lots as u64, buy, sell, fees))
                })
                .collect::<Result<Vec<_>>>()?;
            let agg = aggregate(&positions)?;
            if json {
                return print_json(&agg);
            }
            show_aggregate(&agg);
            Ok(())
        }
        Commands::Size {
            capital,
            price,
            broker,
            board,
            safety_price,
        } => {
            let fees = config.fees_for(broker.as_deref())?;
            let board = board.unwrap_or(config.default_board);
            let cmp = match safety_price {
                Some(safety) => compare_sizing(capital, price, safety, fees.buy_rate)?,
                None => size_against_ara(capital, price, board, fees.buy_rate)?,
            };
            if json {
                return print_json(&cmp);
            }
            println!("{}", "Position Size".green().bold());
            println!("{}", "=============".green());
            let rows = [
                ("Limit order", &cmp.limit_order),
                ("Worst case", &cmp.worst_case),
            ];
            for (label, alloc) in rows {
                println!(
                    "  {:<12} {} lots at {}  cost {}  left {}  ({:.2}% used)",
                    label.bold(),
                    alloc.lots.to_string().cyan(),
                    rupiah(alloc.price),
                    rupiah(alloc.cost),
                    rupiah(alloc.remaining_capital),
                    alloc.utilization_percent
                );
            }
            println!(
                "  Sizing for the worst case gives up {} lots ({})",
                cmp.lot_difference,
                rupiah(cmp.capital_difference)
            );
            Ok(())
        }
        Commands::Plan {
            entry,
            stop_loss,
            rrr,
            portfolio,
            risk,
            capital,
        } => {
            let mode = match (portfolio, capital) {
                (Some(portfolio), _) => SizingMode::RiskBased {
                    portfolio,
                    risk_percent: risk,
                },
                (None, Some(capital)) => SizingMode::FixedCapital { capital },
                (None, None) => bail!("either --portfolio or --capital is required"),
            };
            let plan = plan_trade(&PlanRequest {
                entry_price: entry,
                stop_loss_percent: stop_loss,
                reward_risk_ratio: rrr,
                mode,
            })?;
            if json {
                return print_json(&plan);
            }
            println!("{}", "Trade Plan".green().bold());
            println!("{}", "==========".green());
            println!("  Entry:            {}", rupiah(plan.entry_price));
            println!("  Stop Loss:        {}", rupiah(plan.stop_loss_price).red());
            println!("  Take Profit:      {}", rupiah(plan.take_profit_price).bright_green());
            println!("  Lots:             {} ({:?})", plan.lots, plan.limit_reason);
            println!("  Entry Value:      {}", rupiah(plan.entry_value));
            println!("  Potential Loss:   {}", rupiah(plan.potential_loss).red());
            println!("  Potential Profit: {}", rupiah(plan.potential_profit).bright_green());
            println!("  Implied Risk:     {:.2}%", plan.implied_risk_percent);
            println!("  Break-even Win:   {:.2}%", plan.breakeven_win_rate);
            Ok(())
        }
        Commands::Warrant { positions, broker } => {
            let fees = match broker.as_deref() {
                Some(name) => config.fees_for(Some(name))?,
                None => FeeSchedule::stockbit(),
            };
            let rows = positions
                .iter()
                .map(|raw| -> Result<WarrantPosition> {
                    let (symbol, lots, buy, sell) = parse_position(raw)?;
                    Ok(WarrantPosition::new(symbol, lots, buy, sell))
                })
                .collect::<Result<Vec<_>>>()?;
            if rows.len() == 1 {
                let result = compute_warrant(&rows[0], &fees)?;
                if json {
                    return print_json(&result);
                }
                show_trade(&result, &fees);
                return Ok(());
            }
            let agg = aggregate_warrants(&rows, &fees)?;
            if json {
                return print_json(&agg);
            }
            show_aggregate(&agg);
            Ok(())
        }
        Commands::Rights {
            cum,
            old,
            new,
            exercise,
            lots,
            broker,
        } => {
            let fees = config.fees_for(broker.as_deref())?;
            let outcome =
                RightsIssue::new(cum, old, new, exercise)?.simulate(lots, fees.sell_rate)?;
            if json {
                return print_json(&outcome);
            }
            println!("{}", "Rights Issue".green().bold());
            println!("{}", "============".green());
            println!("  Theoretical Ex-Price: {}", rupiah(outcome.theoretical_ex_price));
            println!("  Right Fair Value:     {}", rupiah(outcome.right_fair_value));
            println!("  Dilution:             {:.2}%", outcome.dilution_percent);
            println!(
                "  Rights Received:      {:.2} lots ({:.0} shares)",
                outcome.rights_lots, outcome.rights_shares
            );
            println!();
            println!("{}", "Exercise all".bold());
            println!("  Cost:        {}", rupiah(outcome.exercise.exercise_cost));
            println!("  Final Lots:  {:.2}", outcome.exercise.final_lots);
            println!("  Asset Value: {}", rupiah(outcome.exercise.asset_value));
            println!();
            println!("{}", "Sell rights".bold());
            println!("  Proceeds:     {}", rupiah(outcome.sell_rights.proceeds));
            println!("  Stock Value:  {}", rupiah(outcome.sell_rights.remaining_stock_value));
            println!("  Total Wealth: {}", rupiah(outcome.sell_rights.total_wealth));
            Ok(())
        }
        Commands::Compound {
            initial,
            rate,
            years,
            monthly,
        } => {
            let schedule = compound_schedule(initial, rate, years, monthly)?;
            if json {
                return print_json(&schedule);
            }
            println!("{}", "Compound Growth".green().bold());
            println!("{}", "===============".green());
            for point in schedule.points.iter().filter(|p| p.month % 12 == 0) {
                println!("  Year {:>3}: {}", point.year, rupiah(point.amount));
            }
            println!("  Final Amount:     {}", rupiah(schedule.final_amount).bright_green());
            println!("  Total Contributed: {}", rupiah(schedule.total_contributed));
            println!("  Growth:           {}", rupiah(schedule.growth()));
            Ok(())
        }
        Commands::Pivot {
            high,
            low,
            close,
            method,
        } => {
            let pivots = pivot_points(high, low, close, method)?;
            if json {
                return print_json(&pivots);
            }
            println!(
                "{}",
                format!("Pivot Points ({})", pivots.method).green().bold()
            );
            println!("{}", "====================".green());
            show_levels(&pivots.sorted_desc());
            Ok(())
        }
        Commands::Fibonacci {
            swing_high,
            swing_low,
            trend,
        } => {
            let fib = fibonacci_retracement(swing_high, swing_low, trend)?;
            if json {
                return print_json(&fib);
            }
            println!("{}", "Fibonacci Retracement".green().bold());
            println!("{}", "=====================".green());
            show_levels(&fib.levels);
            println!(
                "  {} {} - {}",
                "Golden Pocket:".yellow().bold(),
                rupiah(fib.golden_pocket.0),
                rupiah(fib.golden_pocket.1)
            );
            Ok(())
        }
        Commands::Confluence {
            high,
            low,
            close,
            method,
            swing_high,
            swing_low,
            trend,
            threshold,
        } => {
            let pivots = pivot_points(high, low, close, method)?;
            let fib = fibonacci_retracement(swing_high, swing_low, trend)?;
            let threshold = threshold.unwrap_or(DEFAULT_CONFLUENCE_THRESHOLD);
            let zones = confluence_zones(&pivots.levels, &fib.levels, threshold)?;
            if json {
                return print_json(&zones);
            }
            println!("{}", "Confluence Zones".green().bold());
            println!("{}", "================".green());
            if zones.is_empty() {
                println!(
                    "  {} no pivot and Fibonacci levels within {:.2}%",
                    "Note:".yellow(),
                    threshold
                );
            }
            for zone in &zones {
                println!(
                    "  {:>16}  pivot {} ({})  fib {} ({})  {:.2}% apart",
                    rupiah(zone.zone_price).cyan().bold(),
                    zone.pivot.name,
                    rupiah(zone.pivot.price),
                    zone.fibonacci.name,
                    rupiah(zone.fibonacci.price),
                    zone.diff_percent
                );
            }
            Ok(())
        }
        Commands::Brokers => {
            if json {
                let presets: Vec<_> = BROKER_PRESETS
                    .iter()
                    .map(|p| (p.name, p.fees))
                    .collect();
                return print_json(&presets);
            }
            println!("{}", "Broker Fee Presets".cyan().bold());
            println!("{}", "==================".cyan());
            for preset in BROKER_PRESETS {
                println!(
                    "  {:<10} buy {:.2}%  sell {:.2}%",
                    preset.name.bold(),
                    preset.fees.buy_rate * 100.0,
                    preset.fees.sell_rate * 100.0
                );
            }
            Ok(())
        }
    }
}

fn fees_with_overrides(
    config: &Config,
    broker: Option<&str>,
    buy_fee_percent: Option<f64>,
    sell_fee_percent: Option<f64>,
) -> Result<FeeSchedule> {
    let base = config.fees_for(broker)?;
    Ok(FeeSchedule::new(
        buy_fee_percent.map(|p| p / 100.0).unwrap_or(base.buy_rate),
        sell_fee_percent.map(|p| p / 100.0).unwrap_or(base.sell_rate),
    )?)
}

/// Parse `SYMBOL:LOTS:BUY:SELL`
fn parse_position(raw: &str) -> Result<(String, f64, f64, f64)> {
    let parts: Vec<&str> = raw.split(':').map(str::trim).collect();
    if parts.len() != 4 {
        bail!("expected SYMBOL:LOTS:BUY:SELL, got '{}'", raw);
    }
    let number = |s: &str, what: &str| -> Result<f64> {
        s.parse::<f64>()
            .with_context(|| format!("invalid {} '{}' in '{}'", what, s, raw))
    };
    Ok((
        parts[0].to_uppercase(),
        number(parts[1], "lots")?,
        number(parts[2], "buy price")?,
        number(parts[3], "sell price")?,
    ))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn show_ticks(price: Option<f64>, json: bool) -> Result<()> {
    if let Some(price) = price {
        let tick = tick_size(price);
        if json {
            return print_json(&serde_json::json!({ "price": price, "tick": tick }));
        }
        println!("Tick size for {}: {}", rupiah(price), rupiah(f64::from(tick)).cyan());
        return Ok(());
    }
    if json {
        return print_json(&tick_table());
    }
    println!("{}", "IDX Tick Sizes".cyan().bold());
    println!("{}", "==============".cyan());
    for band in tick_table() {
        let range = if band.upper.is_infinite() {
            format!("{} and above", rupiah(band.lower))
        } else {
            format!("{} - {}", rupiah(band.lower), rupiah(band.upper))
        };
        println!("  {:<28} {}", range, rupiah(f64::from(band.tick)));
    }
    Ok(())
}

fn show_ladder(ladders: &LimitLadders) {
    println!(
        "{}",
        format!("ARA/ARB from {} ({} board)", rupiah(ladders.base_price), ladders.board)
            .cyan()
            .bold()
    );
    println!("{}", "========================================".cyan());
    for row in ladders.combined() {
        let line = format!(
            "  {:>14}  {:>+10.0} ({:>+7.2}%)  cum {:>+8.2}%",
            rupiah(row.price),
            row.absolute_change,
            row.percent_change,
            row.cumulative_percent_change
        );
        match row.kind {
            RowKind::Ara => println!("{}", line.green()),
            RowKind::Arb => println!("{}", line.red()),
            RowKind::Base => println!("{}", line.bold()),
        }
    }
    for ladder in [&ladders.ascending, &ladders.descending] {
        if ladder.ended_early() {
            println!(
                "  {} {:?} stopped after {} days: {}",
                "Note:".yellow(),
                ladder.direction,
                ladder.len(),
                ladder.end.describe()
            );
        }
    }
}

fn show_levels(levels: &[PriceLevel]) {
    for level in levels {
        let line = format!("  {:<6} {}", level.name, rupiah(level.price));
        if level.is_resistance() {
            println!("{}", line.red());
        } else if level.is_support() {
            println!("{}", line.green());
        } else {
            println!("{}", line.bold());
        }
    }
}

fn show_trade(result: &TradeResult, fees: &FeeSchedule) {
    println!("{}", "Trade Result".green().bold());
    println!("{}", "============".green());
    println!(
        "  Fees:             buy {:.2}% | sell {:.2}%",
        fees.buy_rate * 100.0,
        fees.sell_rate * 100.0
    );
    println!("  Total Buy:        {}", rupiah(result.total_buy));
    println!("  Total Sell:       {}", rupiah(result.total_sell));
    let pl = format!(
        "{} ({:+.2}%)",
        rupiah(result.profit_loss),
        result.profit_loss_percent
    );
    if result.is_profit() {
        println!("  Profit/Loss:      {}", pl.bright_green().bold());
    } else {
        println!("  Profit/Loss:      {}", pl.red().bold());
    }
}

fn show_aggregate(agg: &PortfolioAggregate) {
    println!("{}", "Portfolio".green().bold());
    println!("{}", "=========".green());
    for line in &agg.positions {
        println!(
            "  {:<8} {:>6} lots  {:>12} -> {:<12} {:>18} ({:+.2}%)",
            line.symbol,
            line.lots,
            rupiah(line.buy_price),
            rupiah(line.sell_price),
            rupiah(line.result.profit_loss),
            line.result.profit_loss_percent
        );
    }
    println!();
    println!("  Total Investment: {}", rupiah(agg.total_buy));
    println!("  Total Proceeds:   {}", rupiah(agg.total_sell));
    println!("  Total Buy Fee:    {}", rupiah(agg.total_buy_fee));
    println!("  Total Sell Fee:   {}", rupiah(agg.total_sell_fee));
    println!(
        "  Profit/Loss:      {} ({:+.2}%)",
        rupiah(agg.total_profit_loss),
        agg.total_profit_loss_percent
    );
}

/// `Rp 1,234,567` with cents only when present
fn rupiah(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    if frac == 0 {
        format!("{}Rp {}", sign, grouped)
    } else {
        format!("{}Rp {}.{:02}", sign, grouped, frac)
    }
}
