//! Storage collaborator: the `RecordStore` contract plus an in-memory implementation that can
//! persist through a write-ahead log.

mod memory;
mod traits;
pub mod wal;

pub use memory::MemoryStore;
pub use traits::{DeleteReport, RecordPatch, RecordStore, UpdateReport};
