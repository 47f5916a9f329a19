use chrono::{DateTime, Utc};
use serde::Serialize;

/// Signal emitted while the strategy waits for a setup
pub const HOLD_SIGNAL: &str = "HOLD";

/// Stop-loss exit that must never be read as a fresh entry
pub const STOP_LOSS_EXIT_SIGNAL: &str = "SQUARE OFF PUT (Stop-Loss Hit)";

const EXIT_MARKERS: [&str; 2] = ["SQUARE OFF", "EXIT"];

/// One precomputed minute bar with its strategy signal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub rsi: Option<f64>,
    pub entry_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub signal: String,
}

impl Record {
    pub fn is_hold(&self) -> bool {
        self.signal == HOLD_SIGNAL
    }

    pub fn is_stop_loss_exit(&self) -> bool {
        self.signal == STOP_LOSS_EXIT_SIGNAL
    }

    /// Square-off or exit signal, regardless of direction
    pub fn is_exit(&self) -> bool {
        EXIT_MARKERS.iter().any(|m| self.signal.contains(m))
    }

    /// Candle in `[open, close, low, high]` order
    pub fn candle(&self) -> [f64; 4] {
        [self.open, self.close, self.low, self.high]
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    /// Minute bar at 03:45 UTC + `minute` (09:15 IST onwards) on 2025-02-10
    pub fn record(minute: i64, signal: &str) -> Record {
        let ts = Utc.with_ymd_and_hms(2025, 2, 10, 3, 45, 0).unwrap() + chrono::Duration::minutes(minute);
        Record {
            timestamp: ts,
            open: 100.0,
            high: 101.0,
            low: 99.0,
            close: 100.5,
            rsi: Some(50.0),
            entry_price: None,
            stop_loss: None,
            take_profit: None,
            signal: signal.to_string(),
        }
    }

    pub fn entry(minute: i64, signal: &str, entry: f64, stop: Option<f64>) -> Record {
        Record {
            entry_price: Some(entry),
            stop_loss: stop,
            ..record(minute, signal)
        }
    }

    pub fn exit(minute: i64, signal: &str, entry: f64, close: f64) -> Record {
        Record {
            entry_price: Some(entry),
            close,
            ..record(minute, signal)
        }
    }
}
