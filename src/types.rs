use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::DbError;

/// Stable record identifier: a 12-byte object id, rendered as 24 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(pub ObjectId);

impl RecordId {
    /// Generates a fresh server-side identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    /// Parses the 24-hex-character wire form.
    ///
    /// # Errors
    /// Returns `DbError::InvalidIdentifier` when the input is not exactly 24 hex characters.
    pub fn parse(hex: &str) -> Result<Self, DbError> {
        ObjectId::parse_str(hex)
            .map(Self)
            .map_err(|e| DbError::InvalidIdentifier(format!("'{hex}': {e}")))
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl FromStr for RecordId {
    type Err = DbError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<ObjectId> for RecordId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

/// The acting identity stamped into audit fields. Authorization itself is out of scope;
/// callers hand in whoever the request claims to be.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
}

impl User {
    pub const ANONYMOUS: &'static str = "ANONYMOUS";

    #[must_use]
    pub fn anonymous() -> Self {
        Self::named(Self::ANONYMOUS)
    }

    #[must_use]
    pub fn named(username: &str) -> Self {
        Self { username: username.to_string(), ..Self::default() }
    }

    pub(crate) fn to_document(&self) -> bson::Document {
        let mut d = bson::Document::new();
        if !self.first_name.is_empty() {
            d.insert("firstName", self.first_name.clone());
        }
        if !self.last_name.is_empty() {
            d.insert("lastName", self.last_name.clone());
        }
        if !self.username.is_empty() {
            d.insert("username", self.username.clone());
        }
        d
    }

    pub(crate) fn from_document(d: &bson::Document) -> Self {
        let field = |k: &str| d.get_str(k).map(str::to_string).unwrap_or_default();
        Self { first_name: field("firstName"), last_name: field("lastName"), username: field("username") }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_hex() {
        let id = RecordId::parse("000000000000000000000001").unwrap();
        assert_eq!(id.to_hex(), "000000000000000000000001");
        assert_eq!(id.to_string(), "000000000000000000000001");
    }

    #[test]
    fn parse_rejects_bad_lengths_and_digits() {
        assert!(matches!(RecordId::parse(""), Err(DbError::InvalidIdentifier(_))));
        assert!(RecordId::parse("00000000000000000000001").is_err());
        assert!(RecordId::parse("zz0000000000000000000001").is_err());
    }

    #[test]
    fn user_document_round_trip() {
        let u = User { first_name: "John".into(), last_name: "Doe".into(), username: "john.doe".into() };
        assert_eq!(User::from_document(&u.to_document()), u);
        assert!(User::default().to_document().is_empty());
    }
}
