mod audit;
mod list;
mod records;
mod update;

pub use list::RecordList;
pub use records::RecordService;
pub use update::{StaleUpdate, UpdateOutcome};
