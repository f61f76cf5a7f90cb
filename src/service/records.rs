use std::sync::Arc;

use super::audit::{log_audit, log_rejected};
use super::list::RecordList;
use super::update::{StaleUpdate, UpdateOutcome};
use crate::context::RequestContext;
use crate::errors::DbError;
use crate::query::{
    FieldErrors, Filter, PageOptions, QueryParams, build_links, compile_filter, sort_from_query,
};
use crate::record::{Record, WriteRole, now_millis, sanitize_for_write};
use crate::store::{RecordPatch, RecordStore};
use crate::types::{RecordId, User};

/// Record operations over a shared store. Holds no locks of its own; the store's atomic
/// conditional write is the only thing serialising concurrent updates.
#[derive(Debug)]
pub struct RecordService<S: RecordStore> {
    store: Arc<S>,
}

impl<S: RecordStore> Clone for RecordService<S> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store) }
    }
}

impl<S: RecordStore> RecordService<S> {
    pub fn new(store: S) -> Self {
        Self { store: Arc::new(store) }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates a record. Client-supplied id, audit fields and version are discarded; the
    /// record starts at version 1 with both timestamps set to the same instant.
    ///
    /// # Errors
    /// Store failures, or `Cancelled`/`DeadlineExceeded` from the context. A write the store
    /// has committed is always reported, even if cancellation arrives afterwards.
    pub fn insert(&self, ctx: &RequestContext, user: &User, record: Record) -> Result<RecordId, DbError> {
        let clean = sanitize_for_write(record, WriteRole::Create { by: user.clone(), at: now_millis() });
        let id = self.store.insert_one(ctx, clean)?;
        log_audit("insert", id, user, ctx);
        Ok(id)
    }

    /// # Errors
    /// `InvalidIdentifier` for a malformed id, `NotFound` when absent.
    pub fn get(&self, ctx: &RequestContext, id: &str) -> Result<Record, DbError> {
        let id = RecordId::parse(id)?;
        let found = self.store.find_one(ctx, id)?;
        ctx.check()?;
        found.ok_or_else(|| DbError::NotFound(id.to_hex()))
    }

    /// Runs a query-string search: filter, sort and page are all read from `query`.
    ///
    /// # Errors
    /// `InvalidQuery` carrying every field error when any parameter was rejected.
    pub fn find(&self, ctx: &RequestContext, path: &str, query: &QueryParams) -> Result<RecordList, DbError> {
        let (filter, errors, warnings) = compile_filter(query).into_parts();
        if !errors.is_empty() {
            return Err(DbError::InvalidQuery(FieldErrors(errors)));
        }
        let sort = sort_from_query(query);
        let page = PageOptions::from_query(query);
        let fetch = usize::try_from(page.fetch_limit()).unwrap_or(usize::MAX);
        let mut records = self.store.find(ctx, &filter, &sort, page.offset(), fetch)?;
        let has_more = records.len() > usize::try_from(page.limit).unwrap_or(usize::MAX);
        records.truncate(fetch.saturating_sub(1));
        let links = build_links(path, page.page, page.limit, has_more, query);
        ctx.check()?;
        Ok(RecordList { records, page: page.page, count: page.limit, links, warnings })
    }

    /// Counts records matching the filter part of `query`; paging and sort keys are ignored.
    ///
    /// # Errors
    /// `InvalidQuery` when any parameter was rejected.
    pub fn count(&self, ctx: &RequestContext, query: &QueryParams) -> Result<u64, DbError> {
        let (filter, errors, _) = compile_filter(query).into_parts();
        if !errors.is_empty() {
            return Err(DbError::InvalidQuery(FieldErrors(errors)));
        }
        self.count_matching(ctx, &filter)
    }

    /// # Errors
    /// Store failures.
    pub fn count_matching(&self, ctx: &RequestContext, filter: &Filter) -> Result<u64, DbError> {
        let n = self.store.count(ctx, filter)?;
        ctx.check()?;
        Ok(n)
    }

    /// Version-gated update.
    ///
    /// `record.audit.version` is the version the client last read. The stored version is
    /// looked up fresh, compared, and the write is then issued as a compare-and-swap on that
    /// same version, so a writer that loses a race after the comparison still gets `Stale`.
    /// Nothing is retried.
    ///
    /// # Errors
    /// Store failures and context cancellation. Conflicts and missing records are outcomes,
    /// not errors.
    pub fn update(
        &self,
        ctx: &RequestContext,
        user: &User,
        id: &str,
        record: Record,
    ) -> Result<UpdateOutcome, DbError> {
        let Ok(rid) = RecordId::parse(id) else {
            log_rejected("update", id, "invalid id", ctx);
            return Ok(UpdateOutcome::InvalidIdentifier(id.to_string()));
        };
        let submitted = record.version();
        let Some(current) = self.store.version_of(ctx, rid)? else {
            return Ok(UpdateOutcome::NotFound(rid));
        };
        if current != submitted {
            log_rejected("update", id, "stale version", ctx);
            return Ok(UpdateOutcome::Stale(StaleUpdate::VersionMismatch { id: rid, submitted, current }));
        }

        let patch = RecordPatch::from(sanitize_for_write(record, WriteRole::Update { by: user.clone() }));
        let report = self.store.conditional_update(ctx, rid, submitted, &patch)?;
        if report.matched == 0 {
            log_rejected("update", id, "lost race", ctx);
            return Ok(UpdateOutcome::Stale(StaleUpdate::RaceLost { id: rid, expected: submitted }));
        }
        log_audit("update", rid, user, ctx);
        Ok(UpdateOutcome::Applied { id: rid, version: submitted + 1 })
    }

    /// Unconditional delete by id.
    ///
    /// # Errors
    /// `InvalidIdentifier` for a malformed id, `NotFound` when nothing was deleted.
    pub fn delete(&self, ctx: &RequestContext, user: &User, id: &str) -> Result<(), DbError> {
        let rid = RecordId::parse(id)?;
        let report = self.store.delete_one(ctx, rid)?;
        if report.deleted == 0 {
            return Err(DbError::NotFound(rid.to_hex()));
        }
        log_audit("delete", rid, user, ctx);
        Ok(())
    }
}
