use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use super::traits::{DeleteReport, RecordPatch, RecordStore, UpdateReport};
use super::wal::{OpKind, Wal, WalRecord};
use crate::context::RequestContext;
use crate::errors::DbError;
use crate::query::{Filter, SortSpec, compare_docs, eval_filter};
use crate::record::{Record, now_millis};
use crate::types::RecordId;

/// Records keyed by id, held in their storage (BSON) form.
///
/// Writers take the map's write lock for the whole check-log-apply sequence, which is what
/// makes `conditional_update` a single atomic compare-and-swap.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<BTreeMap<RecordId, bson::Document>>,
    wal: Option<Mutex<Wal>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a WAL-backed store, replaying every logged mutation.
    ///
    /// # Errors
    /// I/O or decode errors from the log.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let (wal, entries) = Wal::open(path)?;
        let mut docs = BTreeMap::new();
        for rec in &entries {
            match rec.op {
                OpKind::Put => {
                    docs.insert(rec.record_id(), rec.document()?);
                }
                OpKind::Delete => {
                    docs.remove(&rec.record_id());
                }
            }
        }
        log::debug!("replayed {} WAL entries into {} records", entries.len(), docs.len());
        Ok(Self { docs: RwLock::new(docs), wal: Some(Mutex::new(wal)) })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    fn log(&self, rec: &WalRecord) -> Result<(), DbError> {
        match &self.wal {
            Some(wal) => wal.lock().append(rec),
            None => Ok(()),
        }
    }

    fn matching(&self, filter: &Filter) -> Vec<bson::Document> {
        self.docs.read().values().filter(|d| eval_filter(d, filter)).cloned().collect()
    }
}

fn elapsed_ms(start: Instant) -> u128 {
    start.elapsed().as_millis()
}

impl RecordStore for MemoryStore {
    fn find_one(&self, ctx: &RequestContext, id: RecordId) -> Result<Option<Record>, DbError> {
        let start = Instant::now();
        ctx.check()?;
        let found = self.docs.read().get(&id).cloned();
        log::debug!("find_one {id} found={} in {}ms", found.is_some(), elapsed_ms(start));
        found.map(Record::from_document).transpose()
    }

    fn version_of(&self, ctx: &RequestContext, id: RecordId) -> Result<Option<u64>, DbError> {
        Ok(self.find_one(ctx, id)?.map(|r| r.version()))
    }

    fn insert_one(&self, ctx: &RequestContext, mut record: Record) -> Result<RecordId, DbError> {
        let start = Instant::now();
        let id = RecordId::new();
        record.id = Some(id);
        let doc = record.to_document();
        let mut docs = self.docs.write();
        ctx.check()?;
        self.log(&WalRecord::put(id, &doc)?)?;
        docs.insert(id, doc);
        log::debug!("insert_one {id} in {}ms", elapsed_ms(start));
        Ok(id)
    }

    fn conditional_update(
        &self,
        ctx: &RequestContext,
        id: RecordId,
        expected_version: u64,
        patch: &RecordPatch,
    ) -> Result<UpdateReport, DbError> {
        let start = Instant::now();
        let mut docs = self.docs.write();
        ctx.check()?;
        let Some(current) = docs.get(&id) else {
            log::debug!("conditional_update {id}: no such record");
            return Ok(UpdateReport::default());
        };
        let mut rec = Record::from_document(current.clone())?;
        if rec.version() != expected_version {
            log::debug!(
                "conditional_update {id}: expected version {expected_version}, found {}",
                rec.version()
            );
            return Ok(UpdateReport::default());
        }
        for (k, v) in &patch.set {
            rec.data.insert(k.clone(), v.clone());
        }
        if let Some(by) = &patch.updated_by {
            rec.audit.updated_by = Some(by.clone());
        }
        rec.audit.updated_ts = Some(now_millis());
        rec.audit.version += 1;
        let doc = rec.to_document();
        self.log(&WalRecord::put(id, &doc)?)?;
        docs.insert(id, doc);
        log::debug!("conditional_update {id} -> v{} in {}ms", rec.version(), elapsed_ms(start));
        Ok(UpdateReport { matched: 1, modified: 1 })
    }

    fn delete_one(&self, ctx: &RequestContext, id: RecordId) -> Result<DeleteReport, DbError> {
        let start = Instant::now();
        let mut docs = self.docs.write();
        ctx.check()?;
        if !docs.contains_key(&id) {
            return Ok(DeleteReport::default());
        }
        self.log(&WalRecord::delete(id))?;
        docs.remove(&id);
        log::debug!("delete_one {id} in {}ms", elapsed_ms(start));
        Ok(DeleteReport { deleted: 1 })
    }

    fn find(
        &self,
        ctx: &RequestContext,
        filter: &Filter,
        sort: &[SortSpec],
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Record>, DbError> {
        let start = Instant::now();
        ctx.check()?;
        let mut hits = self.matching(filter);
        hits.sort_by(|a, b| compare_docs(a, b, sort));
        let out = hits
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(Record::from_document)
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("find skip={skip} limit={limit} -> {} in {}ms", out.len(), elapsed_ms(start));
        Ok(out)
    }

    fn count(&self, ctx: &RequestContext, filter: &Filter) -> Result<u64, DbError> {
        ctx.check()?;
        let n = self.docs.read().values().filter(|d| eval_filter(d, filter)).count();
        Ok(u64::try_from(n).unwrap_or(u64::MAX))
    }
}
