//! Read-only projections handed to the chart and table renderers

use super::markers::Marker;
use super::session::{ReplaySession, ReplayState};
use super::summary::TradeSummary;
use super::trade_log::TradeLogEntry;
use crate::config::ChartConfig;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    /// Revealed close range padded by the buffer, or the configured default
    /// range before anything is revealed.
    pub fn from_closes<I>(closes: I, chart: &ChartConfig) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let (min, max) = closes
            .into_iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
                (lo.min(c), hi.max(c))
            });

        Self {
            min: if min.is_finite() {
                min - chart.price_buffer
            } else {
                chart.default_min
            },
            max: if max.is_finite() {
                max + chart.price_buffer
            } else {
                chart.default_max
            },
        }
    }
}

/// Everything the dashboard draws for the selected day
#[derive(Debug, Clone, Serialize)]
pub struct ChartView {
    pub day: NaiveDate,
    pub state: ReplayState,
    pub revealed: usize,
    pub total: usize,
    /// x-axis labels for the whole day
    pub timestamps: Vec<String>,
    /// `[open, close, low, high]` per revealed record
    pub candles: Vec<[f64; 4]>,
    /// RSI of revealed records, nulls dropped
    pub rsi: Vec<f64>,
    pub price_range: PriceRange,
    pub markers: Vec<Marker>,
    pub trades: Vec<TradeLogEntry>,
    pub summary: TradeSummary,
}

impl ChartView {
    pub fn build(session: &ReplaySession, chart: &ChartConfig) -> Self {
        let revealed = session.revealed();

        Self {
            day: session.day(),
            state: session.state(),
            revealed: revealed.len(),
            total: session.len(),
            timestamps: session.times().to_vec(),
            candles: revealed.iter().map(|r| r.candle()).collect(),
            rsi: revealed.iter().filter_map(|r| r.rsi).collect(),
            price_range: PriceRange::from_closes(revealed.iter().map(|r| r.close), chart),
            markers: session.markers().to_vec(),
            trades: session.trades().to_vec(),
            summary: TradeSummary::from_trades(session.trades()),
        }
    }
}
