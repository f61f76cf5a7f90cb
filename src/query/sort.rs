use std::collections::HashMap;

use super::params::QueryParams;
use super::types::{Order, SortSpec};
use crate::record::fields;

/// Sortable fields, in precedence order. When several are supplied at once the first one
/// listed here wins; everything else is ignored.
pub const SORTABLE_FIELDS: [&str; 2] = [fields::CREATED_TS, fields::UPDATED_TS];

/// Maps `field -> direction` pairs onto at most one sort key.
///
/// Unknown fields are dropped silently. `"asc"` and `"desc"` pick the direction; any other
/// token (including empty) sorts ascending.
#[must_use]
pub fn compile_sort<I, K, V>(fields: I) -> Vec<SortSpec>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let requested: HashMap<String, String> =
        fields.into_iter().map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string())).collect();
    SORTABLE_FIELDS
        .iter()
        .find_map(|field| {
            requested
                .get(*field)
                .map(|dir| SortSpec { field: (*field).to_string(), order: Order::from_token(dir) })
        })
        .into_iter()
        .collect()
}

/// Reads the first `sortBy` and `sortOrder` values from a query.
#[must_use]
pub fn sort_from_query(query: &QueryParams) -> Vec<SortSpec> {
    let by = query.get("sortBy").unwrap_or("");
    let order = query.get("sortOrder").unwrap_or("");
    compile_sort([(by, order)])
}
