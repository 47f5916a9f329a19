//! Replay-and-annotate engine: day grouping, timed reveal, marker and
//! trade-log derivation, and the projections handed to the renderer

pub mod clock;
mod driver;
mod grouper;
mod markers;
mod session;
mod summary;
mod trade_log;
mod view;

pub use clock::{day_key, format_time, parse_timezone};
pub use driver::{ReplayDriver, ReplayProgress};
pub use grouper::{group_by_day, DayBuckets};
pub use markers::{Marker, MarkerKind, MarkerSynthesizer, SignalEvent};
pub use session::{ReplaySession, ReplayState, TickOutcome};
pub use summary::TradeSummary;
pub use trade_log::{points_captured, TradeLog, TradeLogEntry, TradeType};
pub use view::{ChartView, PriceRange};
