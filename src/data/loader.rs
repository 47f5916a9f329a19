//! Record loader for the static replay dataset (a JSON array of minute bars)

use super::record::Record;
use crate::error::ReplayError;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Wire shape of a record. Accepts both plain and `_1m` suffixed column names.
#[derive(Debug, Deserialize)]
struct RawRecord {
    timestamp: Value,
    #[serde(alias = "open_1m")]
    open: f64,
    #[serde(alias = "high_1m")]
    high: f64,
    #[serde(alias = "low_1m")]
    low: f64,
    #[serde(alias = "close_1m")]
    close: f64,
    #[serde(default, alias = "RSI_1m", alias = "RSI")]
    rsi: Option<f64>,
    #[serde(default)]
    entry_price: Option<f64>,
    #[serde(default)]
    stop_loss: Option<f64>,
    #[serde(default)]
    take_profit: Option<f64>,
    signal: String,
}

/// A rejected input row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordIssue {
    pub index: usize,
    pub reason: String,
}

/// Accepted records plus every row that failed to parse, in input order
#[derive(Debug, Default)]
pub struct LoadReport {
    pub records: Vec<Record>,
    pub issues: Vec<RecordIssue>,
}

impl LoadReport {
    /// Apply the malformed-row policy: strict fails on any issue, lenient drops them.
    pub fn into_records(self, strict: bool) -> Result<Vec<Record>, ReplayError> {
        if self.issues.is_empty() {
            return Ok(self.records);
        }

        if strict {
            return Err(ReplayError::MalformedRecords {
                indices: self.issues.iter().map(|i| i.index).collect(),
                issues: self.issues,
            });
        }

        for issue in &self.issues {
            warn!("Skipping record {}: {}", issue.index, issue.reason);
        }
        Ok(self.records)
    }
}

/// Parse a JSON document holding an array of records.
///
/// Rows keep their input order; bad rows are reported by index rather than
/// aborting the whole document.
pub fn parse_records(json: &str) -> Result<LoadReport, ReplayError> {
    let document: Value =
        serde_json::from_str(json).map_err(|e| ReplayError::InvalidDocument(e.to_string()))?;

    let Value::Array(rows) = document else {
        return Err(ReplayError::InvalidDocument(
            "top-level value is not an array".to_string(),
        ));
    };

    let mut report = LoadReport::default();

    for (index, row) in rows.into_iter().enumerate() {
        match parse_row(row) {
            Ok(record) => report.records.push(record),
            Err(reason) => report.issues.push(RecordIssue { index, reason }),
        }
    }

    Ok(report)
}

fn parse_row(row: Value) -> Result<Record, String> {
    let raw: RawRecord = serde_json::from_value(row).map_err(|e| e.to_string())?;
    let timestamp = parse_timestamp(&raw.timestamp)?;

    Ok(Record {
        timestamp,
        open: raw.open,
        high: raw.high,
        low: raw.low,
        close: raw.close,
        rsi: raw.rsi,
        entry_price: raw.entry_price,
        stop_loss: raw.stop_loss,
        take_profit: raw.take_profit,
        signal: raw.signal,
    })
}

/// Timestamps arrive as epoch milliseconds, RFC 3339, or naive UTC strings
fn parse_timestamp(value: &Value) -> Result<DateTime<Utc>, String> {
    match value {
        Value::Number(n) => {
            let ms = n
                .as_i64()
                .ok_or_else(|| format!("timestamp {} is not an integer", n))?;
            Utc.timestamp_millis_opt(ms)
                .single()
                .ok_or_else(|| format!("timestamp {} out of range", ms))
        }
        Value::String(s) => parse_timestamp_str(s),
        other => Err(format!("unsupported timestamp value: {}", other)),
    }
}

fn parse_timestamp_str(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];

    for format in &formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    Err(format!("unable to parse timestamp: {}", s))
}

/// Loader for the replay dataset on disk
pub struct RecordLoader {
    path: PathBuf,
    strict: bool,
}

impl RecordLoader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            strict: false,
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn load(&self) -> Result<Vec<Record>> {
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read records from {}", self.path.display()))?;

        let report = parse_records(&json)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;

        let total = report.records.len() + report.issues.len();
        let records = report.into_records(self.strict)?;

        info!(
            "Loaded {}/{} records from {}",
            records.len(),
            total,
            self.path.display()
        );

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parses_suffixed_columns() {
        let json = r#"[
            {"timestamp": "2025-02-10 03:45:00", "open_1m": 1.0, "high_1m": 2.0, "low_1m": 0.5,
             "close_1m": 1.5, "RSI_1m": null, "entry_price": null, "stop_loss": null,
             "take_profit": null, "signal": "HOLD"},
            {"timestamp": "2025-02-10T03:46:00Z", "open": 1.5, "high": 2.5, "low": 1.0,
             "close": 2.0, "rsi": 55.2, "entry_price": 2.0, "stop_loss": 1.0, "signal": "BUY CALL"}
        ]"#;

        let report = parse_records(json).unwrap();
        assert!(report.issues.is_empty());
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].close, 1.5);
        assert_eq!(report.records[0].rsi, None);
        assert_eq!(report.records[1].rsi, Some(55.2));
        assert_eq!(report.records[1].timestamp.minute(), 46);
        assert_eq!(report.records[1].take_profit, None);
    }

    #[test]
    fn test_epoch_millis_timestamp() {
        assert_eq!(
            parse_timestamp(&serde_json::json!(1739159100000_i64)).unwrap(),
            Utc.with_ymd_and_hms(2025, 2, 10, 3, 45, 0).unwrap()
        );
    }

    #[test]
    fn test_reports_bad_rows_by_index() {
        let json = r#"[
            {"timestamp": "2025-02-10 03:45:00", "open": 1, "high": 1, "low": 1, "close": 1, "signal": "HOLD"},
            {"timestamp": "yesterday", "open": 1, "high": 1, "low": 1, "close": 1, "signal": "HOLD"},
            {"timestamp": "2025-02-10 03:47:00", "open": 1, "high": 1, "low": 1, "signal": "HOLD"},
            {"timestamp": "2025-02-10 03:48:00", "open": 1, "high": 1, "low": 1, "close": 1, "signal": "HOLD"}
        ]"#;

        let report = parse_records(json).unwrap();
        let indices: Vec<usize> = report.issues.iter().map(|i| i.index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert!(report.issues[0].reason.contains("yesterday"));
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[1].timestamp.minute(), 48);
    }

    #[test]
    fn test_null_close_drops_whole_row() {
        let json = r#"[
            {"timestamp": "2025-02-10 03:45:00", "open": 1, "high": 1, "low": 1, "close": null,
             "entry_price": 1.0, "stop_loss": 0.5, "signal": "BUY CALL"},
            {"timestamp": "2025-02-10 03:46:00", "open": 1, "high": 1, "low": 1, "close": 1, "signal": "HOLD"}
        ]"#;

        let report = parse_records(json).unwrap();
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].index, 0);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].signal, "HOLD");
    }

    #[test]
    fn test_strict_policy_rejects() {
        let json = r#"[{"timestamp": true, "open": 1, "high": 1, "low": 1, "close": 1, "signal": "HOLD"}]"#;

        let err = parse_records(json).unwrap().into_records(true).unwrap_err();
        match err {
            ReplayError::MalformedRecords { indices, .. } => assert_eq!(indices, vec![0]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_lenient_policy_skips() {
        let json = r#"[{"timestamp": true, "open": 1, "high": 1, "low": 1, "close": 1, "signal": "HOLD"}]"#;

        let records = parse_records(json).unwrap().into_records(false).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_rejects_non_array_document() {
        assert!(matches!(
            parse_records(r#"{"timestamp": 1}"#),
            Err(ReplayError::InvalidDocument(_))
        ));
    }
}
