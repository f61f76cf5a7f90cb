//! JSON (client-facing) form of a record.
//!
//! The client form uses `id` for the identifier and camelCase audit keys; every other key is a
//! data field. Storage uses `_id`, see [`Record::to_document`].

use crate::errors::DbError;
use crate::record::core::Record;
use crate::record::types::{Audit, fields};
use crate::types::{RecordId, User};
use bson::Bson;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

impl Record {
    /// # Errors
    /// `DbError::InvalidRecord` if the value is not an object or an audit key is malformed;
    /// `DbError::InvalidIdentifier` if a supplied `id` is not a valid identifier.
    pub fn from_json(value: Value) -> Result<Self, DbError> {
        let Value::Object(mut obj) = value else {
            return Err(DbError::InvalidRecord("expected JSON object".into()));
        };
        let id = match obj.remove(fields::DTO_ID) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(RecordId::parse(&s)?),
            Some(other) => return Err(DbError::InvalidRecord(format!("id must be a string, got {other}"))),
        };
        obj.remove(fields::ID);
        let audit = Audit {
            created_by: take_user(&mut obj, fields::CREATED_BY)?,
            created_ts: take_ts(&mut obj, fields::CREATED_TS)?,
            updated_by: take_user(&mut obj, fields::UPDATED_BY)?,
            updated_ts: take_ts(&mut obj, fields::UPDATED_TS)?,
            version: match obj.remove(fields::VERSION) {
                None | Some(Value::Null) => 0,
                Some(v) => v.as_u64().ok_or_else(|| {
                    DbError::InvalidRecord(format!("version must be a non-negative integer, got {v}"))
                })?,
            },
        };
        let data = bson::Document::try_from(obj).map_err(|e| DbError::InvalidRecord(e.to_string()))?;
        Ok(Self { id, audit, data })
    }

    /// # Errors
    /// `DbError::Json` if the text is not JSON; otherwise as [`Record::from_json`].
    pub fn from_json_str(json: &str) -> Result<Self, DbError> {
        Self::from_json(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        if let Some(id) = self.id {
            obj.insert(fields::DTO_ID.into(), Value::String(id.to_hex()));
        }
        let user = |u: &Option<User>| serde_json::to_value(u.clone().unwrap_or_default()).unwrap_or(Value::Null);
        obj.insert(fields::CREATED_BY.into(), user(&self.audit.created_by));
        if let Some(ts) = self.audit.created_ts {
            obj.insert(fields::CREATED_TS.into(), Value::String(format_ts(ts)));
        }
        obj.insert(fields::UPDATED_BY.into(), user(&self.audit.updated_by));
        if let Some(ts) = self.audit.updated_ts {
            obj.insert(fields::UPDATED_TS.into(), Value::String(format_ts(ts)));
        }
        obj.insert(fields::VERSION.into(), Value::from(self.audit.version));
        if let Value::Object(data) = Bson::Document(self.data.clone()).into_relaxed_extjson() {
            for (k, v) in data {
                if !fields::is_reserved(&k) {
                    obj.insert(k, v);
                }
            }
        }
        Value::Object(obj)
    }
}

fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn take_user(obj: &mut Map<String, Value>, key: &str) -> Result<Option<User>, DbError> {
    match obj.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v)
            .map(Some)
            .map_err(|e| DbError::InvalidRecord(format!("{key}: {e}"))),
    }
}

fn take_ts(obj: &mut Map<String, Value>, key: &str) -> Result<Option<DateTime<Utc>>, DbError> {
    match obj.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| DbError::InvalidRecord(format!("{key}: {e}"))),
        Some(other) => Err(DbError::InvalidRecord(format!("{key} must be an RFC 3339 string, got {other}"))),
    }
}
