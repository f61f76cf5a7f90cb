mod core;
mod sanitize;
mod transform;
pub mod types;

pub use self::core::{Record, from_bson_datetime, now_millis, to_bson_datetime};
pub use sanitize::{WriteRole, sanitize_for_write};
pub use types::{Audit, fields};
