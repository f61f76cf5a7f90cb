use serde_json::{Value, json};

use crate::query::{FieldWarning, Link};
use crate::record::Record;

/// One page of `find` results with navigation links and any non-fatal query warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordList {
    pub records: Vec<Record>,
    pub page: i64,
    pub count: i64,
    pub links: Vec<Link>,
    pub warnings: Vec<FieldWarning>,
}

impl RecordList {
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "records": self.records.iter().map(Record::to_json).collect::<Vec<_>>(),
            "page": self.page,
            "count": self.count,
            "links": self.links,
            "warnings": self.warnings.iter().map(ToString::to_string).collect::<Vec<_>>(),
        })
    }
}
