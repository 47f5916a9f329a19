//! Day grouper: splits the record stream into per-calendar-day buckets

use super::clock::day_key;
use crate::data::Record;
use chrono::NaiveDate;
use chrono_tz::Tz;
use std::collections::HashMap;

/// Records bucketed by target-timezone date.
///
/// Days iterate in first-seen order and each bucket keeps input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayBuckets {
    days: Vec<NaiveDate>,
    buckets: HashMap<NaiveDate, Vec<Record>>,
}

impl DayBuckets {
    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.days.first().copied()
    }

    pub fn get(&self, day: NaiveDate) -> Option<&[Record]> {
        self.buckets.get(&day).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &[Record])> {
        self.days
            .iter()
            .map(move |day| (*day, self.buckets[day].as_slice()))
    }

    fn push(&mut self, day: NaiveDate, record: Record) {
        let days = &mut self.days;
        self.buckets
            .entry(day)
            .or_insert_with(|| {
                days.push(day);
                Vec::new()
            })
            .push(record);
    }
}

pub fn group_by_day(records: &[Record], tz: Tz) -> DayBuckets {
    let mut grouped = DayBuckets::default();

    for record in records {
        grouped.push(day_key(&record.timestamp, tz), record.clone());
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::fixtures::record;
    use chrono::Duration;

    fn ist() -> Tz {
        chrono_tz::Asia::Kolkata
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, d).unwrap()
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let mut late = record(0, "HOLD");
        late.timestamp += Duration::days(1);

        let records = vec![late.clone(), record(0, "HOLD"), record(1, "BUY CALL"), late];
        let grouped = group_by_day(&records, ist());

        assert_eq!(grouped.days(), &[day(11), day(10)]);
        assert_eq!(grouped.get(day(11)).unwrap().len(), 2);

        let signals: Vec<&str> = grouped
            .get(day(10))
            .unwrap()
            .iter()
            .map(|r| r.signal.as_str())
            .collect();
        assert_eq!(signals, vec!["HOLD", "BUY CALL"]);
    }

    #[test]
    fn test_every_record_in_exactly_one_bucket() {
        let records: Vec<Record> = (0..900).map(|m| record(m, "HOLD")).collect();
        let grouped = group_by_day(&records, ist());

        let total: usize = grouped.iter().map(|(_, bucket)| bucket.len()).sum();
        assert_eq!(total, records.len());
        // 09:15 IST + 900 minutes spills past midnight
        assert_eq!(grouped.len(), 2);
    }

    #[test]
    fn test_grouping_is_idempotent() {
        let records: Vec<Record> = (0..50).map(|m| record(m * 37, "HOLD")).collect();
        assert_eq!(group_by_day(&records, ist()), group_by_day(&records, ist()));
    }

    #[test]
    fn test_empty_input() {
        let grouped = group_by_day(&[], ist());
        assert!(grouped.is_empty());
        assert_eq!(grouped.first_day(), None);
    }
}
