//! Per-day replay state
//!
//! A `ReplaySession` is built when a day is selected and discarded on the next
//! selection. It owns the reveal index together with the marker history and
//! the trade log derived from the revealed prefix, so a day switch is simply
//! a new session.

use super::clock::format_time;
use super::markers::{Marker, MarkerSynthesizer, SignalEvent};
use super::trade_log::{TradeLog, TradeLogEntry};
use crate::data::Record;
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Serialize;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplayState {
    /// Built but not started
    Idle,
    Playing,
    Finished,
}

impl fmt::Display for ReplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayState::Idle => write!(f, "idle"),
            ReplayState::Playing => write!(f, "playing"),
            ReplayState::Finished => write!(f, "finished"),
        }
    }
}

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Record at this index was revealed; more remain
    Revealed(usize),
    /// The last record was revealed by this tick, or the day was already done
    Finished,
    /// Session not started
    Idle,
}

#[derive(Debug, Clone)]
pub struct ReplaySession {
    day: NaiveDate,
    records: Vec<Record>,
    times: Vec<String>,
    index: usize,
    state: ReplayState,
    markers: MarkerSynthesizer,
    trade_log: TradeLog,
}

impl ReplaySession {
    pub fn new(day: NaiveDate, records: Vec<Record>, tz: Tz) -> Self {
        let times = records
            .iter()
            .map(|r| format_time(&r.timestamp, tz))
            .collect();

        Self {
            day,
            records,
            times,
            index: 0,
            state: ReplayState::Idle,
            markers: MarkerSynthesizer::new(),
            trade_log: TradeLog::new(),
        }
    }

    /// Reset to the start of the day. An empty day finishes immediately.
    pub fn start(&mut self) {
        self.index = 0;
        self.markers.clear();
        self.trade_log.clear();
        self.state = if self.records.is_empty() {
            ReplayState::Finished
        } else {
            ReplayState::Playing
        };
    }

    /// Reveal the next record and fold it into the markers and trade log
    pub fn tick(&mut self) -> TickOutcome {
        match self.state {
            ReplayState::Idle => return TickOutcome::Idle,
            ReplayState::Finished => return TickOutcome::Finished,
            ReplayState::Playing => {}
        }

        let Some(record) = self.records.get(self.index) else {
            self.state = ReplayState::Finished;
            return TickOutcome::Finished;
        };
        let time = &self.times[self.index];

        match self.markers.apply(record, time) {
            SignalEvent::Exit => {
                if let Some(row) = self.trade_log.record(record, time) {
                    debug!(
                        "{} closed {} @ {} -> {} ({} pts)",
                        row.timestamp, row.trade_type, row.entry_price, row.exit_price, row.points_captured
                    );
                }
            }
            SignalEvent::Entry { .. } => {
                debug!("{} entry @ {:?} [{}]", time, record.entry_price, record.signal);
            }
            SignalEvent::Ignored => {}
        }

        let revealed = self.index;
        self.index += 1;

        if self.index >= self.records.len() {
            self.state = ReplayState::Finished;
            return TickOutcome::Finished;
        }

        TickOutcome::Revealed(revealed)
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn state(&self) -> ReplayState {
        self.state
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records with index below the reveal cursor
    pub fn revealed(&self) -> &[Record] {
        &self.records[..self.index]
    }

    /// Wall-clock labels for the whole day, revealed or not
    pub fn times(&self) -> &[String] {
        &self.times
    }

    pub fn markers(&self) -> &[Marker] {
        self.markers.markers()
    }

    pub fn trades(&self) -> &[TradeLogEntry] {
        self.trade_log.entries()
    }
}
