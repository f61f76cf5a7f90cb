use bson::{Bson, Document as BsonDocument};
use std::cmp::Ordering;

use super::types::{CmpOp, Filter, MAX_PATH_DEPTH, Order, SortSpec};
use crate::record::fields;

pub fn eval_filter(doc: &BsonDocument, filter: &Filter) -> bool {
    match filter {
        Filter::And(fs) => fs.iter().all(|f| eval_filter(doc, f)),
        Filter::Or(fs) => fs.iter().any(|f| eval_filter(doc, f)),
        Filter::In { path, values } => get_path(doc, path).is_some_and(|v| is_in_set(v, values)),
        Filter::Cmp { path, op, value } => get_path(doc, path).is_some_and(|v| {
            let c = compare_bson(v, value);
            match op {
                CmpOp::Eq => c == Ordering::Equal,
                CmpOp::Gt => c == Ordering::Greater,
                CmpOp::Gte => c != Ordering::Less,
                CmpOp::Lt => c == Ordering::Less,
                CmpOp::Lte => c != Ordering::Greater,
            }
        }),
        Filter::Range { path, gte, lt } => get_path(doc, path).is_some_and(|v| {
            compare_bson(v, gte) != Ordering::Less && compare_bson(v, lt) == Ordering::Less
        }),
    }
}

/// Orders two stored documents by `sort`, breaking ties on `_id` so paging is stable.
pub fn compare_docs(a: &BsonDocument, b: &BsonDocument, sort: &[SortSpec]) -> Ordering {
    for s in sort {
        let ord = match (a.get(&s.field), b.get(&s.field)) {
            (Some(x), Some(y)) => compare_bson(x, y),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return if s.order == Order::Asc { ord } else { ord.reverse() };
        }
    }
    match (a.get(fields::ID), b.get(fields::ID)) {
        (Some(x), Some(y)) => compare_bson(x, y),
        _ => Ordering::Equal,
    }
}

fn is_in_set(v: &Bson, set: &[Bson]) -> bool {
    set.iter().any(|x| compare_bson(v, x) == Ordering::Equal)
}

pub(crate) fn get_path<'a>(doc: &'a BsonDocument, path: &str) -> Option<&'a Bson> {
    if path.is_empty() || path.len() > 1024 {
        return None;
    }
    let mut parts = path.split('.');
    let mut cur = doc.get(parts.next()?)?;
    for (depth, part) in parts.enumerate() {
        if depth + 1 >= MAX_PATH_DEPTH {
            return None;
        }
        match cur {
            Bson::Document(d) => cur = d.get(part)?,
            _ => return None,
        }
    }
    Some(cur)
}

pub fn compare_bson(a: &Bson, b: &Bson) -> Ordering {
    use bson::Bson as T;
    fn as_f64_num(x: &T) -> Option<f64> {
        match x {
            T::Int32(i) => Some(f64::from(*i)),
            #[allow(clippy::cast_precision_loss)]
            T::Int64(i) => Some(*i as f64),
            T::Double(f) => Some(*f),
            _ => None,
        }
    }
    if let (Some(x), Some(y)) = (as_f64_num(a), as_f64_num(b)) {
        return x.total_cmp(&y);
    }
    match (a, b) {
        (T::String(x), T::String(y)) => x.cmp(y),
        (T::Boolean(x), T::Boolean(y)) => x.cmp(y),
        (T::DateTime(x), T::DateTime(y)) => x.cmp(y),
        (T::ObjectId(x), T::ObjectId(y)) => x.bytes().cmp(&y.bytes()),
        (T::Null, T::Null) => Ordering::Equal,
        _ if a == b => Ordering::Equal,
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(v: &Bson) -> u8 {
    use bson::Bson as T;
    match v {
        T::MinKey => 0,
        T::Null | T::Undefined => 1,
        T::Int32(_) | T::Int64(_) | T::Double(_) | T::Decimal128(_) => 2,
        T::String(_) | T::Symbol(_) => 3,
        T::Document(_) => 4,
        T::Array(_) => 5,
        T::Binary(_) => 6,
        T::ObjectId(_) => 7,
        T::Boolean(_) => 8,
        T::DateTime(_) => 9,
        T::Timestamp(_) => 10,
        T::RegularExpression(_) => 11,
        T::DbPointer(_) | T::JavaScriptCode(_) | T::JavaScriptCodeWithScope(_) => 12,
        T::MaxKey => 255,
    }
}
