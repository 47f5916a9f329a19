//! Target-timezone helpers shared by the grouper and the chart labels

use crate::error::ReplayError;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";

pub fn parse_timezone(name: &str) -> Result<Tz, ReplayError> {
    name.parse::<Tz>()
        .map_err(|e| ReplayError::InvalidTimezone(format!("{}: {}", name, e)))
}

/// Calendar date of an instant in the target timezone
pub fn day_key(ts: &DateTime<Utc>, tz: Tz) -> NaiveDate {
    ts.with_timezone(&tz).date_naive()
}

/// `HH:MM:SS` wall-clock label in the target timezone
pub fn format_time(ts: &DateTime<Utc>, tz: Tz) -> String {
    ts.with_timezone(&tz).format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_day_key_crosses_midnight() {
        let tz = parse_timezone(DEFAULT_TIMEZONE).unwrap();
        // 20:00 UTC is 01:30 next day in IST
        let ts = Utc.with_ymd_and_hms(2025, 2, 10, 20, 0, 0).unwrap();
        assert_eq!(day_key(&ts, tz), NaiveDate::from_ymd_opt(2025, 2, 11).unwrap());
        assert_eq!(format_time(&ts, tz), "01:30:00");
    }

    #[test]
    fn test_rejects_unknown_timezone() {
        assert!(matches!(
            parse_timezone("Mars/Olympus"),
            Err(ReplayError::InvalidTimezone(_))
        ));
    }
}
