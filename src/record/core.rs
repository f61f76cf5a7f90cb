use crate::errors::DbError;
use crate::record::types::{Audit, fields};
use crate::types::{RecordId, User};
use bson::{Bson, Document as BsonDocument};
use chrono::{DateTime, Utc};

/// A versioned record: identifier, audit block and free-form data fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub id: Option<RecordId>,
    pub audit: Audit,
    pub data: BsonDocument,
}

impl Record {
    #[must_use]
    pub fn new(data: BsonDocument) -> Self {
        Self { id: None, audit: Audit::default(), data }
    }

    #[must_use]
    pub const fn version(&self) -> u64 {
        self.audit.version
    }

    /// Storage form: `_id`, audit fields at top level, then data fields.
    #[must_use]
    pub fn to_document(&self) -> BsonDocument {
        let mut d = BsonDocument::new();
        if let Some(id) = self.id {
            d.insert(fields::ID, id.0);
        }
        if let Some(u) = &self.audit.created_by {
            d.insert(fields::CREATED_BY, u.to_document());
        }
        if let Some(ts) = self.audit.created_ts {
            d.insert(fields::CREATED_TS, to_bson_datetime(ts));
        }
        if let Some(u) = &self.audit.updated_by {
            d.insert(fields::UPDATED_BY, u.to_document());
        }
        if let Some(ts) = self.audit.updated_ts {
            d.insert(fields::UPDATED_TS, to_bson_datetime(ts));
        }
        if self.audit.version > 0 {
            d.insert(fields::VERSION, i64::try_from(self.audit.version).unwrap_or(i64::MAX));
        }
        for (k, v) in &self.data {
            if !fields::is_reserved(k) {
                d.insert(k.clone(), v.clone());
            }
        }
        d
    }

    /// Inverse of [`Record::to_document`].
    ///
    /// # Errors
    /// `DbError::InvalidRecord` when an audit field carries the wrong BSON type.
    pub fn from_document(mut d: BsonDocument) -> Result<Self, DbError> {
        let id = match d.remove(fields::ID) {
            Some(Bson::ObjectId(oid)) => Some(RecordId(oid)),
            None | Some(Bson::Null) => None,
            Some(other) => {
                return Err(DbError::InvalidRecord(format!("_id must be an object id, got {other}")));
            }
        };
        let created_by = take_user(&mut d, fields::CREATED_BY)?;
        let created_ts = take_datetime(&mut d, fields::CREATED_TS)?;
        let updated_by = take_user(&mut d, fields::UPDATED_BY)?;
        let updated_ts = take_datetime(&mut d, fields::UPDATED_TS)?;
        let version = match d.remove(fields::VERSION) {
            None | Some(Bson::Null) => 0,
            Some(Bson::Int64(v)) => u64::try_from(v).map_err(|_| negative_version(v))?,
            Some(Bson::Int32(v)) => u64::try_from(v).map_err(|_| negative_version(i64::from(v)))?,
            Some(other) => {
                return Err(DbError::InvalidRecord(format!("version must be an integer, got {other}")));
            }
        };
        d.remove("id");
        Ok(Self { id, audit: Audit { created_by, created_ts, updated_by, updated_ts, version }, data: d })
    }
}

fn negative_version(v: i64) -> DbError {
    DbError::InvalidRecord(format!("version must not be negative, got {v}"))
}

fn take_user(d: &mut BsonDocument, key: &str) -> Result<Option<User>, DbError> {
    match d.remove(key) {
        None | Some(Bson::Null) => Ok(None),
        Some(Bson::Document(u)) => Ok(Some(User::from_document(&u))),
        Some(other) => Err(DbError::InvalidRecord(format!("{key} must be a document, got {other}"))),
    }
}

fn take_datetime(d: &mut BsonDocument, key: &str) -> Result<Option<DateTime<Utc>>, DbError> {
    match d.remove(key) {
        None | Some(Bson::Null) => Ok(None),
        Some(Bson::DateTime(dt)) => Ok(from_bson_datetime(dt)),
        Some(other) => Err(DbError::InvalidRecord(format!("{key} must be a datetime, got {other}"))),
    }
}

#[must_use]
pub fn to_bson_datetime(ts: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(ts.timestamp_millis())
}

#[must_use]
pub fn from_bson_datetime(dt: bson::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(dt.timestamp_millis())
}

/// Current instant truncated to the millisecond precision the storage form keeps.
#[must_use]
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn document_round_trip_keeps_audit_and_data() {
        let ts = now_millis();
        let rec = Record {
            id: Some(RecordId::parse("000000000000000000000001").unwrap()),
            audit: Audit {
                created_by: Some(User::named("john.doe")),
                created_ts: Some(ts),
                updated_by: Some(User::named("jane.doe")),
                updated_ts: Some(ts),
                version: 5,
            },
            data: doc! {"name": "alice", "age": 30},
        };
        let d = rec.to_document();
        assert_eq!(d.get_i64("version").unwrap(), 5);
        assert!(d.get_datetime("createdTs").is_ok());
        let back = Record::from_document(d).unwrap();
        assert_eq!(back, rec);
    }

    #[test]
    fn from_document_rejects_wrong_types() {
        assert!(Record::from_document(doc! {"_id": "nope"}).is_err());
        assert!(Record::from_document(doc! {"version": "one"}).is_err());
        assert!(Record::from_document(doc! {"version": -1i64}).is_err());
        assert!(Record::from_document(doc! {"createdTs": 3}).is_err());
    }

    #[test]
    fn reserved_keys_in_data_do_not_leak_into_storage_form() {
        let mut rec = Record::new(doc! {"version": 99, "x": 1});
        rec.audit.version = 2;
        let d = rec.to_document();
        assert_eq!(d.get_i64("version").unwrap(), 2);
        assert_eq!(d.get_i32("x").unwrap(), 1);
    }
}
