//! Query surface: parameter parsing, filter and sort compilation, pagination, navigation
//! links and in-memory predicate evaluation.

mod eval;
mod filter;
mod links;
mod page;
mod params;
mod sort;
mod types;

pub use eval::{compare_bson, compare_docs, eval_filter};
pub use filter::{CONTROL_KEYS, ID_KEY, compile_filter};
pub use links::{Link, build_links};
pub use page::{DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT, PageOptions};
pub use params::QueryParams;
pub use sort::{SORTABLE_FIELDS, compile_sort, sort_from_query};
pub use types::{
    CmpOp, CompiledFilter, FieldError, FieldErrorCause, FieldErrors, FieldWarning, Filter, Order,
    SortSpec, WarningKind, sort_to_document,
};
