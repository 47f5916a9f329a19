pub mod loader;
pub mod record;

pub use loader::{parse_records, LoadReport, RecordIssue, RecordLoader};
pub use record::{Record, HOLD_SIGNAL, STOP_LOSS_EXIT_SIGNAL};
