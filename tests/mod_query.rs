use bson::{Bson, doc, oid::ObjectId};
use chrono::{TimeZone, Utc};
use recordlite::query::{
    CmpOp, FieldErrorCause, Filter, QueryParams, WarningKind, compile_filter, eval_filter,
};

fn q(pairs: &[(&str, &str)]) -> QueryParams {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

fn day(y: i32, m: u32, d: u32) -> Bson {
    let ms = Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap().timestamp_millis();
    Bson::DateTime(bson::DateTime::from_millis(ms))
}

#[test]
fn single_id_becomes_membership_clause() {
    let out = compile_filter(&q(&[("id", "000000000000000000000001")]));
    assert!(out.errors.is_empty());
    assert!(out.warnings.is_empty());
    let oid = ObjectId::parse_str("000000000000000000000001").unwrap();
    assert_eq!(
        out.filter,
        Filter::And(vec![Filter::In { path: "_id".into(), values: vec![Bson::ObjectId(oid)] }])
    );
    assert_eq!(out.filter.to_document(), doc! {"$and": [{"_id": {"$in": [oid]}}]});
}

#[test]
fn created_on_is_a_one_day_half_open_range() {
    let out = compile_filter(&q(&[("createdOn", "2020-01-01")]));
    assert!(out.errors.is_empty());
    assert_eq!(
        out.filter.clauses(),
        [Filter::Range { path: "createdTs".into(), gte: day(2020, 1, 1), lt: day(2020, 1, 2) }]
    );
}

#[test]
fn invalid_date_gives_empty_filter_and_one_error() {
    let out = compile_filter(&q(&[("createdOn", "NaN")]));
    assert!(out.filter.is_match_all());
    assert_eq!(out.errors.len(), 1);
    assert_eq!(out.errors[0].cause, FieldErrorCause::InvalidDate);
    assert!(out.errors[0].to_string().contains("YYYY-MM-DD"));
}

#[test]
fn unknown_key_is_an_error_per_value() {
    let out = compile_filter(&q(&[("color", "red"), ("color", "blue")]));
    assert!(out.filter.is_match_all());
    assert_eq!(out.errors.len(), 2);
    assert!(out.errors.iter().all(|e| e.cause == FieldErrorCause::UnknownParameter));
    assert_eq!(
        out.errors[0].to_string(),
        "'color=red' not processable: 'color' is not a valid query parameter"
    );
}

#[test]
fn empty_values_warn_and_are_skipped() {
    let out = compile_filter(&q(&[("createdOn", ""), ("id", "")]));
    assert!(out.filter.is_match_all());
    assert!(out.errors.is_empty());
    assert_eq!(out.warnings.len(), 2);
    assert!(out.warnings.iter().all(|w| w.kind == WarningKind::EmptyValue { index: 0 }));
}

#[test]
fn duplicate_control_keys_warn_but_never_filter() {
    let out = compile_filter(&QueryParams::parse("page=1&page=2&sortBy=createdTs&count=5"));
    assert!(out.filter.is_match_all());
    assert!(out.errors.is_empty());
    assert_eq!(out.warnings.len(), 1);
    assert_eq!(out.warnings[0].key, "page");
    assert_eq!(out.warnings[0].kind, WarningKind::DuplicateControl { count: 2 });
}

#[test]
fn different_keys_are_and_combined() {
    let out = compile_filter(&QueryParams::parse("createdAfter=2020-01-01&updatedBefore=2021-01-01"));
    assert_eq!(out.filter.clauses().len(), 2);
    let inside = doc! {"createdTs": day(2020, 6, 1), "updatedTs": day(2020, 6, 1)};
    let too_early = doc! {"createdTs": day(2020, 1, 1), "updatedTs": day(2020, 6, 1)};
    assert!(eval_filter(&inside, &out.filter));
    assert!(!eval_filter(&too_early, &out.filter));
}

#[test]
fn created_after_excludes_the_named_day() {
    let out = compile_filter(&q(&[("createdAfter", "2020-01-01")]));
    assert_eq!(
        out.filter.clauses(),
        [Filter::Cmp { path: "createdTs".into(), op: CmpOp::Gte, value: day(2020, 1, 2) }]
    );
    assert_eq!(out.filter.to_document(), doc! {"$and": [{"createdTs": {"$gte": day(2020, 1, 2)}}]});
}

#[test]
fn errors_follow_sorted_key_order() {
    let out = compile_filter(&QueryParams::parse("zeta=1&alpha=2&id=bad"));
    let keys: Vec<_> = out.errors.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, ["alpha", "id", "zeta"]);
}
