//! Query-parameter filter compiler.
//!
//! Turns untrusted `key -> [value]` parameters into a [`Filter`]. Compilation is total: every
//! parameter is visited, each problem becomes one [`FieldError`] or [`FieldWarning`], and a
//! usable (possibly match-all) filter is always returned.

use bson::Bson;
use chrono::{Duration, NaiveDate};

use super::params::QueryParams;
use super::types::{
    CmpOp, CompiledFilter, FieldError, FieldErrorCause, FieldWarning, Filter, MAX_IN_SET, WarningKind,
};
use crate::record::{fields, to_bson_datetime};
use crate::types::RecordId;

/// Pagination and sort keys: recognised, never part of the filter.
pub const CONTROL_KEYS: [&str; 4] = ["page", "count", "sortBy", "sortOrder"];

pub const ID_KEY: &str = "id";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateBound {
    On,
    After,
    Before,
}

enum KeyKind {
    Control,
    Id,
    Date { path: &'static str, bound: DateBound },
    Missing,
    Unknown,
}

impl KeyKind {
    fn classify(key: &str) -> Self {
        if CONTROL_KEYS.contains(&key) {
            return Self::Control;
        }
        match key {
            "" => Self::Missing,
            ID_KEY => Self::Id,
            "createdOn" => Self::Date { path: fields::CREATED_TS, bound: DateBound::On },
            "createdAfter" => Self::Date { path: fields::CREATED_TS, bound: DateBound::After },
            "createdBefore" => Self::Date { path: fields::CREATED_TS, bound: DateBound::Before },
            "updatedOn" => Self::Date { path: fields::UPDATED_TS, bound: DateBound::On },
            "updatedAfter" => Self::Date { path: fields::UPDATED_TS, bound: DateBound::After },
            "updatedBefore" => Self::Date { path: fields::UPDATED_TS, bound: DateBound::Before },
            _ => Self::Unknown,
        }
    }
}

/// Compiles query parameters into a filter plus error and warning lists.
///
/// Keys are visited in sorted order. Clauses produced by different keys are AND-combined;
/// multiple values of one date key are OR-combined.
#[must_use]
pub fn compile_filter(query: &QueryParams) -> CompiledFilter {
    let mut clauses = Vec::new();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for (key, values) in query.iter() {
        for (index, value) in values.iter().enumerate() {
            if value.is_empty() {
                warnings.push(FieldWarning { key: key.to_string(), kind: WarningKind::EmptyValue { index } });
            }
        }

        match KeyKind::classify(key) {
            KeyKind::Control => {
                if values.len() > 1 {
                    warnings.push(FieldWarning {
                        key: key.to_string(),
                        kind: WarningKind::DuplicateControl { count: values.len() },
                    });
                }
            }
            KeyKind::Id => {
                if let Some(clause) = compile_ids(key, values, &mut errors) {
                    clauses.push(clause);
                }
            }
            KeyKind::Date { path, bound } => {
                if let Some(clause) = compile_dates(key, path, bound, values, &mut errors) {
                    clauses.push(clause);
                }
            }
            KeyKind::Missing => {
                for value in values {
                    errors.push(FieldError {
                        key: String::new(),
                        value: Some(value.clone()),
                        cause: FieldErrorCause::MissingKey,
                    });
                }
            }
            KeyKind::Unknown => {
                for value in values {
                    errors.push(FieldError {
                        key: key.to_string(),
                        value: Some(value.clone()),
                        cause: FieldErrorCause::UnknownParameter,
                    });
                }
            }
        }
    }

    if !errors.is_empty() || !warnings.is_empty() {
        log::debug!("query compiled with {} error(s), {} warning(s)", errors.len(), warnings.len());
    }
    CompiledFilter { filter: Filter::And(clauses), errors, warnings }
}

fn compile_ids(key: &str, values: &[String], errors: &mut Vec<FieldError>) -> Option<Filter> {
    let mut ids = Vec::new();
    for value in values.iter().filter(|v| !v.is_empty()) {
        match RecordId::parse(value) {
            Ok(_) if ids.len() >= MAX_IN_SET => errors.push(FieldError {
                key: key.to_string(),
                value: Some(value.clone()),
                cause: FieldErrorCause::TooManyValues { limit: MAX_IN_SET },
            }),
            Ok(id) => ids.push(Bson::ObjectId(id.0)),
            Err(e) => errors.push(FieldError {
                key: key.to_string(),
                value: Some(value.clone()),
                cause: FieldErrorCause::InvalidIdentifier(e.to_string()),
            }),
        }
    }
    if ids.is_empty() { None } else { Some(Filter::In { path: fields::ID.to_string(), values: ids }) }
}

fn compile_dates(
    key: &str,
    path: &str,
    bound: DateBound,
    values: &[String],
    errors: &mut Vec<FieldError>,
) -> Option<Filter> {
    let mut any = Vec::new();
    for value in values.iter().filter(|v| !v.is_empty()) {
        match parse_date(value) {
            Some(day) => any.push(date_clause(path, bound, day)),
            None => errors.push(FieldError {
                key: key.to_string(),
                value: Some(value.clone()),
                cause: FieldErrorCause::InvalidDate,
            }),
        }
    }
    match any.len() {
        0 => None,
        1 => any.pop(),
        _ => Some(Filter::Or(any)),
    }
}

fn date_clause(path: &str, bound: DateBound, day: NaiveDate) -> Filter {
    let start = day.and_time(chrono::NaiveTime::MIN).and_utc();
    let next = start + Duration::hours(24);
    let at = |ts| Bson::DateTime(to_bson_datetime(ts));
    match bound {
        DateBound::On => Filter::Range { path: path.to_string(), gte: at(start), lt: at(next) },
        // "after" skips the whole named day
        DateBound::After => Filter::Cmp { path: path.to_string(), op: CmpOp::Gte, value: at(next) },
        DateBound::Before => Filter::Cmp { path: path.to_string(), op: CmpOp::Lt, value: at(start) },
    }
}

/// Strict `YYYY-MM-DD`: ten characters, zero-padded month and day.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let b = value.as_bytes();
    let shape_ok = b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b.iter().enumerate().all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit());
    if !shape_ok {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}
