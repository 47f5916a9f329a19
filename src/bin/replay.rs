//! Replay CLI
//!
//! Headless replay of the record dataset.
//! Usage:
//!   cargo run --bin replay -- days
//!   cargo run --bin replay -- run --day 2025-02-10 --markers
//!   cargo run --bin replay -- run --day 2025-02-10 --json

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::time::Duration;
use tradereplay::config::Config;
use tradereplay::data::RecordLoader;
use tradereplay::replay::{
    group_by_day, parse_timezone, ChartView, DayBuckets, Marker, ReplayDriver, TradeLogEntry,
    TradeSummary,
};

#[derive(Parser, Debug)]
#[command(name = "replay")]
#[command(about = "Replay intraday signal records and print the annotations")]
struct Cli {
    /// Record dataset (JSON array), overrides config
    #[arg(short, long, global = true)]
    data: Option<String>,

    /// Timezone used to split days, overrides config
    #[arg(short, long, global = true)]
    timezone: Option<String>,

    /// Fail on malformed records instead of skipping them
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the days in the dataset
    Days,

    /// Replay a single day
    Run {
        /// Day to replay (YYYY-MM-DD), defaults to the first day
        #[arg(long)]
        day: Option<String>,

        /// Delay between ticks in milliseconds
        #[arg(short, long)]
        interval_ms: Option<u64>,

        /// Show chart markers
        #[arg(long)]
        markers: bool,

        /// Print the final chart view as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tradereplay=warn".parse()?)
                .add_directive("replay=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;

    if let Some(data) = cli.data {
        config.data.path = data;
    }
    if let Some(tz) = cli.timezone {
        config.replay.timezone = tz;
    }
    config.data.strict |= cli.strict;

    let tz = parse_timezone(&config.replay.timezone)?;
    let records = RecordLoader::new(&config.data.path)
        .strict(config.data.strict)
        .load()?;
    let buckets = group_by_day(&records, tz);

    match cli.command {
        Commands::Days => {
            print_days(&buckets);
            Ok(())
        }

        Commands::Run {
            day,
            interval_ms,
            markers,
            json,
        } => {
            let cadence = interval_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| config.replay.tick_interval());
            let day = resolve_day(&buckets, day.as_deref())?;

            let driver = ReplayDriver::new(buckets, tz, cadence);
            let epoch = driver.select_day(day).await?;
            if !driver.wait_finished(epoch).await {
                anyhow::bail!("Replay of {} was interrupted", day);
            }

            let view = driver
                .view(&config.chart)
                .await
                .context("Replay produced no view")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_run(&view, markers);
            }
            Ok(())
        }
    }
}

fn resolve_day(buckets: &DayBuckets, day: Option<&str>) -> Result<NaiveDate> {
    match day {
        Some(day) => NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .map_err(|e| anyhow::anyhow!("Invalid day '{}': {}", day, e)),
        None => buckets.first_day().context("Dataset contains no days"),
    }
}

fn print_days(buckets: &DayBuckets) {
    println!();
    println!("\x1b[1;33mDAYS\x1b[0m");
    println!("{:<14} {:>8}", "Day", "Records");
    println!("{}", "-".repeat(23));
    for (day, records) in buckets.iter() {
        println!("{:<14} {:>8}", day.format("%d %b %Y"), records.len());
    }
}

fn print_run(view: &ChartView, show_markers: bool) {
    print_header(view);

    if show_markers && !view.markers.is_empty() {
        print_markers(&view.markers);
        println!();
    }

    print_trades(&view.trades);
    println!();
    print_summary(&view.summary);
    print_footer();
}

fn print_header(view: &ChartView) {
    println!();
    println!("\x1b[1;36m{}\x1b[0m", "═".repeat(78));
    println!(
        "\x1b[1;36m                    REPLAY: {}\x1b[0m",
        view.day.format("%d %b %Y")
    );
    println!("\x1b[1;36m{}\x1b[0m", "═".repeat(78));
    println!(
        "Records: {}/{} | Markers: {} | Price axis: {:.2} → {:.2}",
        view.revealed,
        view.total,
        view.markers.len(),
        view.price_range.min,
        view.price_range.max
    );
    println!();
}

fn print_markers(markers: &[Marker]) {
    println!("\x1b[1;33mMARKERS\x1b[0m");
    println!("{:<10} {:>6} {:>12}", "Time", "Kind", "Price");
    println!("{}", "-".repeat(30));

    for marker in markers {
        println!(
            "{:<10} {:>6} {:>12.2}",
            marker.time,
            marker.kind.tag(),
            marker.price
        );
    }
}

fn print_trades(trades: &[TradeLogEntry]) {
    println!("\x1b[1;33mTRADE SUMMARY\x1b[0m");
    if trades.is_empty() {
        println!("  No closed trades");
        return;
    }

    println!(
        "{:<10} {:>10} {:>10} {:>10} {:>8}  {:<32} {:>8}",
        "Time", "Entry", "Stop", "Exit", "Type", "Signal", "Points"
    );
    println!("{}", "-".repeat(96));

    for trade in trades {
        let stop = trade
            .stop_loss
            .map(|sl| format!("{:.2}", sl))
            .unwrap_or_else(|| "-".to_string());

        let pnl_color = if trade.points_captured >= Decimal::ZERO {
            "\x1b[32m"
        } else {
            "\x1b[31m"
        };

        println!(
            "{:<10} {:>10.2} {:>10} {:>10.2} {:>8}  {:<32} {}{:>+8.2}\x1b[0m",
            trade.timestamp,
            trade.entry_price,
            stop,
            trade.exit_price,
            trade.trade_type.to_string(),
            trade.signal,
            pnl_color,
            trade.points_f64()
        );
    }
}

fn print_summary(summary: &TradeSummary) {
    println!("\x1b[1;33mTOTALS\x1b[0m");
    println!("  Closed Trades:    {}", summary.total_trades);
    println!(
        "  Win Rate:         {:.1}%  ({} wins / {} losses)",
        summary.win_rate, summary.winning_trades, summary.losing_trades
    );
    println!(
        "  Total Points:     {:+.2}",
        summary.total_points.to_f64().unwrap_or(0.0)
    );
    println!(
        "  Avg Points:       {:+.2}",
        summary.avg_points.to_f64().unwrap_or(0.0)
    );

    let best = summary
        .best_trade
        .map(|p| format!("{:+.2}", p.to_f64().unwrap_or(0.0)))
        .unwrap_or_else(|| "-".to_string());
    let worst = summary
        .worst_trade
        .map(|p| format!("{:+.2}", p.to_f64().unwrap_or(0.0)))
        .unwrap_or_else(|| "-".to_string());
    println!("  Best / Worst:     {} / {}", best, worst);
}

fn print_footer() {
    println!("\x1b[1;36m{}\x1b[0m", "═".repeat(78));
}
