use bson::doc;
use recordlite::query::{Filter, Order, QueryParams, SortSpec, compile_filter};
use recordlite::store::{MemoryStore, RecordStore};
use recordlite::{Record, RecordService, RequestContext, User};
use tempfile::tempdir;

#[test]
fn wal_replay_restores_inserts_updates_and_deletes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data").join("records.wal");
    let ctx = RequestContext::new();
    let user = User::named("alice");
    let (kept, gone) = {
        let svc = RecordService::new(MemoryStore::open(&path).unwrap());
        let kept = svc.insert(&ctx, &user, Record::new(doc! {"name": "kept"})).unwrap();
        let gone = svc.insert(&ctx, &user, Record::new(doc! {"name": "gone"})).unwrap();
        let mut edit = Record::new(doc! {"name": "kept-v2"});
        edit.audit.version = 1;
        assert!(svc.update(&ctx, &user, &kept.to_hex(), edit).unwrap().is_applied());
        svc.delete(&ctx, &user, &gone.to_hex()).unwrap();
        (kept, gone)
    };

    let reopened = MemoryStore::open(&path).unwrap();
    assert_eq!(reopened.len(), 1);
    let rec = reopened.find_one(&ctx, kept).unwrap().unwrap();
    assert_eq!(rec.version(), 2);
    assert_eq!(rec.data.get_str("name").unwrap(), "kept-v2");
    assert_eq!(rec.audit.created_by.unwrap().username, "alice");
    assert!(reopened.find_one(&ctx, gone).unwrap().is_none());
}

#[test]
fn insert_after_a_torn_wal_tail_survives_reopen() {
    use std::io::Write;

    let dir = tempdir().unwrap();
    let path = dir.path().join("records.wal");
    let ctx = RequestContext::new();
    let user = User::anonymous();
    let first = {
        let svc = RecordService::new(MemoryStore::open(&path).unwrap());
        svc.insert(&ctx, &user, Record::new(doc! {"name": "a"})).unwrap()
    };
    let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(&[200, 0, 0, 0, 1, 2]).unwrap();
    drop(file);

    let second = {
        let svc = RecordService::new(MemoryStore::open(&path).unwrap());
        assert_eq!(svc.store().len(), 1);
        svc.insert(&ctx, &user, Record::new(doc! {"name": "b"})).unwrap()
    };

    let reopened = MemoryStore::open(&path).unwrap();
    assert_eq!(reopened.len(), 2);
    assert!(reopened.find_one(&ctx, first).unwrap().is_some());
    assert_eq!(reopened.find_one(&ctx, second).unwrap().unwrap().data.get_str("name").unwrap(), "b");
}

#[test]
fn find_sorts_by_created_ts_descending() {
    let store = MemoryStore::new();
    let ctx = RequestContext::new();
    let svc = RecordService::new(store);
    let mut ids = Vec::new();
    for n in 0..3 {
        ids.push(svc.insert(&ctx, &User::anonymous(), Record::new(doc! {"n": n})).unwrap());
        std::thread::sleep(std::time::Duration::from_millis(3));
    }
    let sort = [SortSpec { field: "createdTs".into(), order: Order::Desc }];
    let found = svc.store().find(&ctx, &Filter::match_all(), &sort, 0, 10).unwrap();
    let got: Vec<_> = found.iter().map(|r| r.id.unwrap()).collect();
    ids.reverse();
    assert_eq!(got, ids);
}

#[test]
fn count_honours_compiled_filter() {
    let ctx = RequestContext::new();
    let svc = RecordService::new(MemoryStore::new());
    let a = svc.insert(&ctx, &User::anonymous(), Record::default()).unwrap();
    svc.insert(&ctx, &User::anonymous(), Record::default()).unwrap();
    let q = QueryParams::parse(&format!("id={a}&page=3"));
    assert_eq!(svc.count(&ctx, &q).unwrap(), 1);
    assert_eq!(svc.count(&ctx, &QueryParams::new()).unwrap(), 2);
    let filter = compile_filter(&q).filter;
    assert_eq!(svc.count_matching(&ctx, &filter).unwrap(), 1);
}

#[test]
fn find_end_to_end_carries_warnings_and_links() {
    let ctx = RequestContext::new();
    let svc = RecordService::new(MemoryStore::new());
    for _ in 0..4 {
        svc.insert(&ctx, &User::anonymous(), Record::default()).unwrap();
    }
    let list = svc.find(&ctx, "/records", &QueryParams::parse("count=3&count=9&createdOn=")).unwrap();
    assert_eq!(list.records.len(), 3);
    assert_eq!(list.count, 3);
    assert_eq!(list.page, 1);
    assert_eq!(list.warnings.len(), 2);
    assert_eq!(list.links.len(), 1);
    assert_eq!(list.links[0].href, "/records?count=3&createdOn=&page=2");
    let json = list.to_json();
    assert_eq!(json["records"].as_array().unwrap().len(), 3);
    assert_eq!(json["links"][0]["rel"], "next");
}
