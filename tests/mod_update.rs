use bson::doc;
use recordlite::{
    DbError, MemoryStore, Record, RecordService, RequestContext, StaleUpdate, UpdateOutcome, User,
};

fn setup() -> (RecordService<MemoryStore>, RequestContext) {
    (RecordService::new(MemoryStore::new()), RequestContext::new())
}

#[test]
fn insert_stamps_version_one_and_equal_timestamps() {
    let (svc, ctx) = setup();
    let mut rec = Record::from_json_str(r#"{"id":"000000000000000000000042","version":9,"name":"a"}"#).unwrap();
    rec.audit.created_by = Some(User::named("mallory"));
    let id = svc.insert(&ctx, &User::named("alice"), rec).unwrap();
    assert_ne!(id.to_hex(), "000000000000000000000042");

    let stored = svc.get(&ctx, &id.to_hex()).unwrap();
    assert_eq!(stored.version(), 1);
    assert_eq!(stored.audit.created_ts, stored.audit.updated_ts);
    assert_eq!(stored.audit.created_by.unwrap().username, "alice");
    assert_eq!(stored.data.get_str("name").unwrap(), "a");
}

#[test]
fn matching_version_applies_and_stale_resubmit_conflicts() {
    let (svc, ctx) = setup();
    let user = User::named("alice");
    let id = svc.insert(&ctx, &user, Record::new(doc! {"n": 1})).unwrap();
    let before = svc.get(&ctx, &id.to_hex()).unwrap();

    let mut edit = before.clone();
    edit.data.insert("n", 2);
    let outcome = svc.update(&ctx, &User::named("bob"), &id.to_hex(), edit.clone()).unwrap();
    assert_eq!(outcome, UpdateOutcome::Applied { id, version: 2 });

    let after = svc.get(&ctx, &id.to_hex()).unwrap();
    assert_eq!(after.version(), 2);
    assert_eq!(after.data.get_i32("n").unwrap(), 2);
    assert_eq!(after.audit.created_ts, before.audit.created_ts);
    assert_eq!(after.audit.created_by, before.audit.created_by);
    assert_eq!(after.audit.updated_by.as_ref().unwrap().username, "bob");
    assert!(after.audit.updated_ts >= before.audit.updated_ts);

    edit.data.insert("n", 3);
    let stale = svc.update(&ctx, &user, &id.to_hex(), edit).unwrap();
    assert_eq!(stale, UpdateOutcome::Stale(StaleUpdate::VersionMismatch { id, submitted: 1, current: 2 }));
    let unchanged = svc.get(&ctx, &id.to_hex()).unwrap();
    assert_eq!(unchanged, after);
}

#[test]
fn client_cannot_overwrite_server_fields() {
    let (svc, ctx) = setup();
    let id = svc.insert(&ctx, &User::anonymous(), Record::default()).unwrap();
    let json = format!(
        r#"{{"id":"{}","version":1,"createdTs":"1999-01-01T00:00:00.000Z","createdBy":{{"username":"eve"}},"_id":"x"}}"#,
        id.to_hex()
    );
    let outcome = svc.update(&ctx, &User::named("bob"), &id.to_hex(), Record::from_json_str(&json).unwrap());
    assert!(outcome.unwrap().is_applied());
    let rec = svc.get(&ctx, &id.to_hex()).unwrap();
    assert_eq!(rec.audit.created_by.unwrap().username, User::ANONYMOUS);
    assert_ne!(rec.audit.created_ts.unwrap().to_rfc3339(), "1999-01-01T00:00:00+00:00");
    assert!(rec.data.is_empty());
}

#[test]
fn update_of_missing_or_malformed_id_is_tagged() {
    let (svc, ctx) = setup();
    let user = User::anonymous();
    let missing = recordlite::RecordId::new();
    assert_eq!(
        svc.update(&ctx, &user, &missing.to_hex(), Record::default()).unwrap(),
        UpdateOutcome::NotFound(missing)
    );
    let bad = svc.update(&ctx, &user, "123", Record::default()).unwrap();
    assert!(matches!(bad, UpdateOutcome::InvalidIdentifier(_)));
    assert!(matches!(bad.into_result(), Err(DbError::InvalidIdentifier(_))));
}

#[test]
fn cancelled_update_leaves_record_untouched() {
    let (svc, ctx) = setup();
    let id = svc.insert(&ctx, &User::anonymous(), Record::new(doc! {"n": 1})).unwrap();
    let cancelled = RequestContext::new();
    cancelled.cancel_handle().cancel();
    let mut edit = Record::new(doc! {"n": 2});
    edit.audit.version = 1;
    let err = svc.update(&cancelled, &User::anonymous(), &id.to_hex(), edit).unwrap_err();
    assert!(matches!(err, DbError::Cancelled));
    let rec = svc.get(&ctx, &id.to_hex()).unwrap();
    assert_eq!(rec.version(), 1);
    assert_eq!(rec.data.get_i32("n").unwrap(), 1);
}
