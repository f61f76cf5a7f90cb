//! Versioned record store: a query-parameter filter compiler and an optimistic-concurrency
//! update protocol over a pluggable document store.

pub mod cli;
pub mod config;
pub mod context;
pub mod errors;
pub mod logger;
pub mod query;
pub mod record;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use context::RequestContext;
pub use errors::DbError;
pub use record::Record;
pub use service::{RecordList, RecordService, StaleUpdate, UpdateOutcome};
pub use store::{MemoryStore, RecordStore};
pub use types::{RecordId, User};

/// Initializes logging from `RECORDLITE_LOG_*` environment variables.
///
/// # Errors
/// Returns an error if the log directory cannot be created or a logger is already installed.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    logger::configure_from_env()
}
