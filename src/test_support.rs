// Test-only fixtures shared by unit tests.
use bson::Document;

use crate::context::RequestContext;
use crate::record::{Audit, Record, now_millis};
use crate::service::RecordService;
use crate::store::{MemoryStore, RecordStore};
use crate::types::{RecordId, User};

/// A record as the create path would stamp it, at the given version.
pub fn stamped(data: Document, version: u64) -> Record {
    let at = now_millis();
    let mut rec = Record::new(data);
    rec.audit = Audit {
        created_by: Some(User::anonymous()),
        created_ts: Some(at),
        updated_by: Some(User::anonymous()),
        updated_ts: Some(at),
        version,
    };
    rec
}

/// Inserts a version-1 record straight into the store.
pub fn seed(store: &MemoryStore, data: Document) -> RecordId {
    store.insert_one(&RequestContext::new(), stamped(data, 1)).expect("seed insert")
}

/// A service over a fresh in-memory store with `n` records `{ "n": i }`.
pub fn service_with(n: i32) -> (RecordService<MemoryStore>, Vec<RecordId>) {
    let svc = RecordService::new(MemoryStore::new());
    let ids = (0..n).map(|i| seed(svc.store(), bson::doc! {"n": i})).collect();
    (svc, ids)
}
