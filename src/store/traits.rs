use bson::Document as BsonDocument;

use crate::context::RequestContext;
use crate::errors::DbError;
use crate::query::{Filter, SortSpec};
use crate::record::Record;
use crate::types::{RecordId, User};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub matched: u64,
    pub modified: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub deleted: u64,
}

/// Client-writable part of an update. Built from a sanitized record, so it never carries
/// identity, creation metadata or version.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub set: BsonDocument,
    pub updated_by: Option<User>,
}

impl From<Record> for RecordPatch {
    fn from(rec: Record) -> Self {
        Self { set: rec.data, updated_by: rec.audit.updated_by }
    }
}

/// Operations the service needs from a document store.
///
/// Every call takes the request context and must return `Cancelled`/`DeadlineExceeded`
/// without side effects once the context says stop.
pub trait RecordStore: Send + Sync {
    fn find_one(&self, ctx: &RequestContext, id: RecordId) -> Result<Option<Record>, DbError>;

    fn version_of(&self, ctx: &RequestContext, id: RecordId) -> Result<Option<u64>, DbError>;

    /// Stores a new record and returns its generated id. Any id on `record` is ignored.
    fn insert_one(&self, ctx: &RequestContext, record: Record) -> Result<RecordId, DbError>;

    /// Compare-and-swap on version: applies `patch` only if the stored record has `id` and
    /// `expected_version`, stamping the modification time and incrementing the version by one
    /// in the same atomic step. A zero `matched` means the record is gone or moved on.
    fn conditional_update(
        &self,
        ctx: &RequestContext,
        id: RecordId,
        expected_version: u64,
        patch: &RecordPatch,
    ) -> Result<UpdateReport, DbError>;

    fn delete_one(&self, ctx: &RequestContext, id: RecordId) -> Result<DeleteReport, DbError>;

    fn find(
        &self,
        ctx: &RequestContext,
        filter: &Filter,
        sort: &[SortSpec],
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Record>, DbError>;

    fn count(&self, ctx: &RequestContext, filter: &Filter) -> Result<u64, DbError>;
}
