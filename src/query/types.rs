use bson::{Bson, Document as BsonDocument, doc};
use serde::{Deserialize, Serialize};
use std::fmt;

// Safety limits to prevent resource abuse
pub(crate) const MAX_PATH_DEPTH: usize = 32;
pub(crate) const MAX_IN_SET: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    /// `"desc"` is descending; every other token, including empty, is ascending.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        if token == "desc" { Self::Desc } else { Self::Asc }
    }

    #[must_use]
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub order: Order,
}

/// Renders a sort list in document-store form, e.g. `{"createdTs": -1}`.
#[must_use]
pub fn sort_to_document(sort: &[SortSpec]) -> BsonDocument {
    let mut d = BsonDocument::new();
    for s in sort {
        d.insert(s.field.clone(), s.order.as_i32());
    }
    d
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CmpOp {
    const fn operator(self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
        }
    }
}

/// Predicate tree. Compiled filters are always a top-level `And`; an empty `And` matches
/// every record.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    In { path: String, values: Vec<Bson> },
    Cmp { path: String, op: CmpOp, value: Bson },
    /// Half-open interval `[gte, lt)`.
    Range { path: String, gte: Bson, lt: Bson },
}

impl Filter {
    #[must_use]
    pub const fn match_all() -> Self {
        Self::And(Vec::new())
    }

    #[must_use]
    pub fn eq(path: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::Cmp { path: path.into(), op: CmpOp::Eq, value: value.into() }
    }

    #[must_use]
    pub fn is_match_all(&self) -> bool {
        matches!(self, Self::And(clauses) if clauses.is_empty())
    }

    /// Top-level conjuncts; a non-`And` filter is its own single clause.
    #[must_use]
    pub fn clauses(&self) -> &[Self] {
        match self {
            Self::And(clauses) => clauses,
            other => std::slice::from_ref(other),
        }
    }

    /// Renders the predicate in document-store query form.
    #[must_use]
    pub fn to_document(&self) -> BsonDocument {
        let nested = |fs: &[Self]| fs.iter().map(|f| Bson::Document(f.to_document())).collect::<Vec<_>>();
        let mut out = BsonDocument::new();
        match self {
            Self::And(fs) if fs.is_empty() => {}
            Self::And(fs) => {
                out.insert("$and", nested(fs));
            }
            Self::Or(fs) => {
                out.insert("$or", nested(fs));
            }
            Self::In { path, values } => {
                out.insert(path.clone(), doc! {"$in": values.clone()});
            }
            Self::Cmp { path, op: CmpOp::Eq, value } => {
                out.insert(path.clone(), value.clone());
            }
            Self::Cmp { path, op, value } => {
                let mut cond = BsonDocument::new();
                cond.insert(op.operator(), value.clone());
                out.insert(path.clone(), cond);
            }
            Self::Range { path, gte, lt } => {
                out.insert(path.clone(), doc! {"$gte": gte.clone(), "$lt": lt.clone()});
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldErrorCause {
    InvalidIdentifier(String),
    InvalidDate,
    MissingKey,
    UnknownParameter,
    /// More distinct identifiers than one membership clause accepts.
    TooManyValues { limit: usize },
}

/// One rejected query value. Never aborts compilation of the remaining parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub key: String,
    pub value: Option<String>,
    pub cause: FieldErrorCause,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = &self.key;
        let value = self.value.as_deref().unwrap_or("");
        match &self.cause {
            FieldErrorCause::InvalidIdentifier(reason) => {
                write!(f, "invalid input: '{key}={value}'; {reason}")
            }
            FieldErrorCause::InvalidDate => write!(
                f,
                "invalid input: '{key}={value}'; date must be in the format of 'YYYY-MM-DD' ({key}=2006-01-02)"
            ),
            FieldErrorCause::MissingKey => write!(f, "no key supplied for '={value}'"),
            FieldErrorCause::UnknownParameter => {
                write!(f, "'{key}={value}' not processable: '{key}' is not a valid query parameter")
            }
            FieldErrorCause::TooManyValues { limit } => {
                write!(f, "invalid input: '{key}={value}'; at most {limit} values allowed")
            }
        }
    }
}

impl std::error::Error for FieldError {}

/// The fatal half of a compilation result, carried by `DbError::InvalidQuery`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(pub Vec<FieldError>);

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msgs: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&msgs.join("; "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    EmptyValue { index: usize },
    DuplicateControl { count: usize },
}

/// Non-fatal signal that accompanies an otherwise usable filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldWarning {
    pub key: String,
    pub kind: WarningKind,
}

impl fmt::Display for FieldWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            WarningKind::EmptyValue { index } => {
                write!(f, "no value supplied for '{}='[{index}]", self.key)
            }
            WarningKind::DuplicateControl { count } => {
                write!(f, "param '{}' used {count} times (limit 1)", self.key)
            }
        }
    }
}

/// Result of compiling a query: the filter plus separate error and warning channels.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFilter {
    pub filter: Filter,
    pub errors: Vec<FieldError>,
    pub warnings: Vec<FieldWarning>,
}

impl CompiledFilter {
    #[must_use]
    pub fn into_parts(self) -> (Filter, Vec<FieldError>, Vec<FieldWarning>) {
        (self.filter, self.errors, self.warnings)
    }
}
