//! Marker synthesizer
//!
//! Folds revealed records, one at a time and in replay order, into the chart
//! annotations for the day. Entry and stop-loss pins are emitted when a new
//! trade opens; square-off/exit records emit no pin and are handed to the
//! trade log instead.

use crate::data::Record;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerKind {
    Entry,
    StopLoss,
    TakeProfit,
    Exit,
}

impl MarkerKind {
    /// Short tag used in the pin label
    pub fn tag(&self) -> &'static str {
        match self {
            MarkerKind::Entry => "Entry",
            MarkerKind::StopLoss => "SL",
            MarkerKind::TakeProfit => "TP",
            MarkerKind::Exit => "Exit",
        }
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A chart pin at a time/price pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub kind: MarkerKind,
    pub time: String,
    pub price: f64,
    pub label: String,
}

impl Marker {
    pub fn new(kind: MarkerKind, time: &str, price: f64) -> Self {
        Self {
            kind,
            time: time.to_string(),
            price,
            label: format!("{}\n{}", kind.tag(), price),
        }
    }
}

/// How a revealed record was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    /// A new trade opened; `stop_loss` says whether an SL pin went with it
    Entry { stop_loss: bool },
    /// Square-off or exit of an open trade
    Exit,
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct MarkerSynthesizer {
    markers: Vec<Marker>,
}

impl MarkerSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn into_markers(self) -> Vec<Marker> {
        self.markers
    }

    /// Price of the most recent Entry pin
    pub fn last_entry_price(&self) -> Option<f64> {
        self.markers
            .iter()
            .rev()
            .find(|m| m.kind == MarkerKind::Entry)
            .map(|m| m.price)
    }

    fn has_marker(&self, kind: MarkerKind, price: f64) -> bool {
        self.markers
            .iter()
            .any(|m| m.kind == kind && m.price == price)
    }

    /// Classify `record` and append any pins it opens.
    ///
    /// The entry rule is checked first; the exit rule only applies when no
    /// entry fired, so a record is never both.
    pub fn apply(&mut self, record: &Record, time: &str) -> SignalEvent {
        if let Some(entry) = self.opens_trade(record) {
            self.markers.push(Marker::new(MarkerKind::Entry, time, entry));

            let stop_loss = match record.stop_loss {
                Some(sl)
                    if sl != 0.0 && sl != entry && !self.has_marker(MarkerKind::StopLoss, sl) =>
                {
                    self.markers.push(Marker::new(MarkerKind::StopLoss, time, sl));
                    true
                }
                _ => false,
            };

            return SignalEvent::Entry { stop_loss };
        }

        if record.is_exit() && record.entry_price.is_some_and(|p| p != 0.0) {
            return SignalEvent::Exit;
        }

        SignalEvent::Ignored
    }

    fn opens_trade(&self, record: &Record) -> Option<f64> {
        if record.is_hold() || record.is_stop_loss_exit() {
            return None;
        }

        let entry = record.entry_price?;
        if self.last_entry_price() == Some(entry) || self.has_marker(MarkerKind::Entry, entry) {
            return None;
        }

        Some(entry)
    }

    pub fn clear(&mut self) {
        self.markers.clear();
    }
}
