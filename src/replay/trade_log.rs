//! Closed-trade log built from square-off/exit records

use crate::data::Record;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeType {
    Call,
    Put,
    Unknown,
}

impl TradeType {
    /// Direction named in the signal text. CALL wins when both appear.
    pub fn from_signal(signal: &str) -> Self {
        if signal.contains("CALL") {
            TradeType::Call
        } else if signal.contains("PUT") {
            TradeType::Put
        } else {
            TradeType::Unknown
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeType::Call => write!(f, "CALL"),
            TradeType::Put => write!(f, "PUT"),
            TradeType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// One closed trade row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeLogEntry {
    pub timestamp: String,
    pub entry_price: f64,
    pub stop_loss: Option<f64>,
    pub exit_price: f64,
    pub trade_type: TradeType,
    pub signal: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub points_captured: Decimal,
}

impl TradeLogEntry {
    pub fn points_f64(&self) -> f64 {
        self.points_captured.to_f64().unwrap_or(0.0)
    }
}

/// `exit - entry`, rounded half away from zero to 2 decimal places
pub fn points_captured(entry_price: f64, exit_price: f64) -> Decimal {
    let entry = Decimal::try_from(entry_price).unwrap_or_default();
    let exit = Decimal::try_from(exit_price).unwrap_or_default();
    (exit - entry).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, Default)]
pub struct TradeLog {
    entries: Vec<TradeLogEntry>,
}

impl TradeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TradeLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, entry_price: f64, time: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.entry_price == entry_price && e.timestamp == time)
    }

    /// Record the close described by `record`, if it is one.
    ///
    /// Returns `None` for non-exit records and for an exit already logged
    /// under the same `(entry_price, time)` key.
    pub fn record(&mut self, record: &Record, time: &str) -> Option<&TradeLogEntry> {
        if !record.is_exit() {
            return None;
        }

        let entry_price = record.entry_price.filter(|p| *p != 0.0)?;
        if self.contains(entry_price, time) {
            return None;
        }

        let exit_price = record.close;
        self.entries.push(TradeLogEntry {
            timestamp: time.to_string(),
            entry_price,
            stop_loss: record.stop_loss.filter(|sl| *sl != 0.0),
            exit_price,
            trade_type: TradeType::from_signal(&record.signal),
            signal: record.signal.clone(),
            points_captured: points_captured(entry_price, exit_price),
        });

        self.entries.last()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::fixtures::{entry, exit};
    use rust_decimal_macros::dec;

    #[test]
    fn test_points_captured_rounds_half_up() {
        assert_eq!(points_captured(100.0, 105.256), dec!(5.26));
        assert_eq!(points_captured(100.0, 100.005), dec!(0.01));
        assert_eq!(points_captured(100.0, 97.5), dec!(-2.50));
        assert_eq!(points_captured(100.0, 99.995), dec!(-0.01));
    }

    #[test]
    fn test_trade_type_classification() {
        assert_eq!(TradeType::from_signal("SQUARE OFF CALL (Stop-Loss Hit)"), TradeType::Call);
        assert_eq!(TradeType::from_signal("EXIT PUT"), TradeType::Put);
        assert_eq!(TradeType::from_signal("SQUARE OFF (Timeout)"), TradeType::Unknown);
    }

    #[test]
    fn test_records_exit() {
        let mut log = TradeLog::new();
        let mut close = exit(5, "SQUARE OFF CALL", 100.0, 103.0);
        close.stop_loss = Some(95.0);

        let row = log.record(&close, "09:20:00").cloned().unwrap();
        assert_eq!(row.entry_price, 100.0);
        assert_eq!(row.exit_price, 103.0);
        assert_eq!(row.stop_loss, Some(95.0));
        assert_eq!(row.points_captured, dec!(3.00));
        assert_eq!(row.trade_type, TradeType::Call);
        assert_eq!(row.signal, "SQUARE OFF CALL");
    }

    #[test]
    fn test_duplicate_exit_is_ignored() {
        let mut log = TradeLog::new();
        let close = exit(5, "EXIT PUT", 100.0, 98.0);

        assert!(log.record(&close, "09:20:00").is_some());
        assert!(log.record(&close, "09:20:00").is_none());
        assert_eq!(log.len(), 1);

        // Same trade closing at a different time is a separate row
        assert!(log.record(&close, "09:21:00").is_some());
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_non_exit_is_ignored() {
        let mut log = TradeLog::new();
        assert!(log.record(&entry(1, "BUY CALL", 100.0, Some(95.0)), "09:16:00").is_none());
        assert!(log.is_empty());
    }

    #[test]
    fn test_serializes_points_as_number() {
        let mut log = TradeLog::new();
        log.record(&exit(5, "EXIT PUT", 100.0, 98.0), "09:20:00");

        let json = serde_json::to_value(&log.entries()[0]).unwrap();
        assert_eq!(json["points_captured"], serde_json::json!(-2.0));
        assert_eq!(json["trade_type"], "PUT");
        assert_eq!(json["stop_loss"], serde_json::Value::Null);
    }
}
