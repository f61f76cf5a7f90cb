use crate::record::core::Record;
use crate::record::types::{Audit, fields};
use crate::types::User;
use chrono::{DateTime, Utc};

/// Which write path a record is being prepared for.
#[derive(Debug, Clone)]
pub enum WriteRole {
    /// New record: everything server-owned is stamped fresh.
    Create { by: User, at: DateTime<Utc> },
    /// Existing record: server-owned fields are cleared so the store keeps its own values.
    Update { by: User },
}

/// Strips every read-only field a client may have supplied and stamps the server-owned ones.
///
/// Both write paths run records through here before they reach the store; nothing else
/// mutates identity or audit fields on the way in.
#[must_use]
pub fn sanitize_for_write(record: Record, role: WriteRole) -> Record {
    let mut data = record.data;
    for key in fields::RESERVED {
        data.remove(key);
    }
    let audit = match role {
        WriteRole::Create { by, at } => Audit {
            created_by: Some(by.clone()),
            created_ts: Some(at),
            updated_by: Some(by),
            updated_ts: Some(at),
            version: 1,
        },
        WriteRole::Update { by } => Audit {
            created_by: None,
            created_ts: None,
            updated_by: Some(by),
            updated_ts: None,
            version: 0,
        },
    };
    Record { id: None, audit, data }
}
