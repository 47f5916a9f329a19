//! Aggregate statistics over a day's closed trades

use super::trade_log::TradeLogEntry;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeSummary {
    pub total_trades: u32,
    pub winning_trades: u32,
    pub losing_trades: u32,
    pub win_rate: f64,

    #[serde(with = "rust_decimal::serde::float")]
    pub total_points: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub avg_points: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub best_trade: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub worst_trade: Option<Decimal>,
}

impl Default for TradeSummary {
    fn default() -> Self {
        Self {
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            win_rate: 0.0,
            total_points: Decimal::ZERO,
            avg_points: Decimal::ZERO,
            best_trade: None,
            worst_trade: None,
        }
    }
}

impl TradeSummary {
    pub fn from_trades(trades: &[TradeLogEntry]) -> Self {
        if trades.is_empty() {
            return Self::default();
        }

        let points: Vec<Decimal> = trades.iter().map(|t| t.points_captured).collect();

        let total_trades = points.len() as u32;
        let winning_trades = points.iter().filter(|p| p.is_sign_positive() && !p.is_zero()).count() as u32;
        let losing_trades = points.iter().filter(|p| p.is_sign_negative() && !p.is_zero()).count() as u32;
        let total_points: Decimal = points.iter().sum();

        Self {
            total_trades,
            winning_trades,
            losing_trades,
            win_rate: (winning_trades as f64 / total_trades as f64) * 100.0,
            total_points,
            avg_points: (total_points / Decimal::from(total_trades)).round_dp(2),
            best_trade: points.iter().max().copied(),
            worst_trade: points.iter().min().copied(),
        }
    }
}
