use crate::types::User;
use chrono::{DateTime, Utc};

/// Server-owned audit block. Clients may echo it back but never set it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Audit {
    pub created_by: Option<User>,
    pub created_ts: Option<DateTime<Utc>>,
    pub updated_by: Option<User>,
    pub updated_ts: Option<DateTime<Utc>>,
    pub version: u64,
}

/// Field names shared by the storage form, the JSON form and the filter compiler.
pub mod fields {
    pub const ID: &str = "_id";
    pub const DTO_ID: &str = "id";
    pub const CREATED_BY: &str = "createdBy";
    pub const CREATED_TS: &str = "createdTs";
    pub const UPDATED_BY: &str = "updatedBy";
    pub const UPDATED_TS: &str = "updatedTs";
    pub const VERSION: &str = "version";

    /// Keys a client can never write through the data fields.
    pub const RESERVED: [&str; 7] = [ID, DTO_ID, CREATED_BY, CREATED_TS, UPDATED_BY, UPDATED_TS, VERSION];

    #[must_use]
    pub fn is_reserved(key: &str) -> bool {
        RESERVED.contains(&key)
    }
}
