use crate::query::FieldErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("Encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("BSON: {0}")]
    Bson(#[from] bson::error::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Invalid record ID: {0}")]
    InvalidIdentifier(String),

    #[error("stale update: record {id} submitted at version {submitted}, current version is {current}")]
    StaleUpdate { id: String, submitted: u64, current: u64 },

    #[error("stale update: record {id} changed concurrently (expected version {expected})")]
    RaceLost { id: String, expected: u64 },

    #[error("Invalid query: {0}")]
    InvalidQuery(FieldErrors),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("request deadline exceeded")]
    DeadlineExceeded,

    #[error("Config error: {0}")]
    Config(String),
}

impl DbError {
    /// True for both flavours of optimistic-concurrency rejection.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::StaleUpdate { .. } | Self::RaceLost { .. })
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
