use crate::data::RecordIssue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("invalid record document: {0}")]
    InvalidDocument(String),

    #[error("malformed records at indices {indices:?}")]
    MalformedRecords {
        indices: Vec<usize>,
        issues: Vec<RecordIssue>,
    },

    #[error("unknown day: {0}")]
    UnknownDay(String),

    #[error("no day selected")]
    NoDaySelected,

    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),
}
