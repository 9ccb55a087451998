#![allow(clippy::unwrap_used, clippy::expect_used)]

use datapoint_core::expr::RangeExpressionBuilder;
use datapoint_core::model::{RangeFilter, Record, RecordKey, SortDirection};
use datapoint_store::{InMemoryRecordStore, RangeQuery, RecordStore, SqliteRecordStore};
use serde_json::{json, Map};

fn rec(pk: &str, sk: &str, value: i64) -> Record {
    let mut payload = Map::new();
    payload.insert("value".to_string(), json!(value));
    Record::new(RecordKey::new(pk, sk), payload)
}

fn seed(store: &dyn RecordStore) {
    for (i, day) in ["2024-01-01", "2024-01-15", "2024-01-31", "2024-02-01", "2024-02-10"]
        .iter()
        .enumerate()
    {
        store.put(&rec("u1#d1", day, i as i64)).unwrap();
    }
    store.put(&rec("u1#d2", "2024-01-10", 99)).unwrap();
}

fn stores() -> Vec<(&'static str, Box<dyn RecordStore>)> {
    vec![
        (
            "sqlite",
            Box::new(SqliteRecordStore::open_in_memory().unwrap()) as Box<dyn RecordStore>,
        ),
        ("memory", Box::new(InMemoryRecordStore::new()) as Box<dyn RecordStore>),
    ]
}

fn sort_keys(items: &[Record]) -> Vec<&str> {
    items.iter().map(|r| r.sort_key()).collect()
}

#[test]
fn test_pages_chain_through_resume_keys() {
    for (name, store) in stores() {
        seed(store.as_ref());

        let first = store.query(&RangeQuery::new("u1#d1", 2)).unwrap();
        assert_eq!(sort_keys(&first.items), vec!["2024-01-01", "2024-01-15"], "{name}");
        assert!(first.last_evaluated_key.is_some());

        let second = store
            .query(&RangeQuery::new("u1#d1", 2).with_exclusive_start_key(first.last_evaluated_key))
            .unwrap();
        assert_eq!(sort_keys(&second.items), vec!["2024-01-31", "2024-02-01"], "{name}");

        let third = store
            .query(&RangeQuery::new("u1#d1", 2).with_exclusive_start_key(second.last_evaluated_key))
            .unwrap();
        assert_eq!(sort_keys(&third.items), vec!["2024-02-10"], "{name}");
        assert_eq!(third.last_evaluated_key, None, "{name}");
        assert_eq!(third.count, 1);
    }
}

#[test]
fn test_between_is_inclusive() {
    let predicate = RangeExpressionBuilder::default().build(Some(&RangeFilter::Between {
        lower: "2024-01-01".into(),
        upper: "2024-01-31".into(),
    }));
    for (name, store) in stores() {
        seed(store.as_ref());
        let page = store
            .query(&RangeQuery::new("u1#d1", 100).with_predicate(predicate.clone()))
            .unwrap();
        assert_eq!(
            sort_keys(&page.items),
            vec!["2024-01-01", "2024-01-15", "2024-01-31"],
            "{name}"
        );
    }
}

#[test]
fn test_descending_with_prefix() {
    let predicate =
        RangeExpressionBuilder::default().build(Some(&RangeFilter::BeginsWith("2024-02".into())));
    for (name, store) in stores() {
        seed(store.as_ref());
        let page = store
            .query(
                &RangeQuery::new("u1#d1", 100)
                    .with_predicate(predicate.clone())
                    .with_direction(SortDirection::Desc),
            )
            .unwrap();
        assert_eq!(sort_keys(&page.items), vec!["2024-02-10", "2024-02-01"], "{name}");
    }
}

#[test]
fn test_descending_resume() {
    for (name, store) in stores() {
        seed(store.as_ref());
        let page = store
            .query(
                &RangeQuery::new("u1#d1", 10)
                    .with_direction(SortDirection::Desc)
                    .with_exclusive_start_key(Some(RecordKey::new("u1#d1", "2024-01-31"))),
            )
            .unwrap();
        assert_eq!(sort_keys(&page.items), vec!["2024-01-15", "2024-01-01"], "{name}");
    }
}

#[test]
fn test_put_is_upsert_and_payload_round_trips() {
    for (name, store) in stores() {
        store.put(&rec("u1#d1", "2024-01-01", 1)).unwrap();
        store.put(&rec("u1#d1", "2024-01-01", 2)).unwrap();

        let page = store.query(&RangeQuery::new("u1#d1", 10)).unwrap();
        assert_eq!(page.items.len(), 1, "{name}");
        assert_eq!(page.items[0].payload.get("value"), Some(&json!(2)), "{name}");
    }
}

#[test]
fn test_file_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("store.db");

    {
        let store = SqliteRecordStore::open(&path).unwrap();
        store.put(&rec("u1#d1", "2024-01-01", 7)).unwrap();
    }

    let store = SqliteRecordStore::open(&path).unwrap();
    let page = store.query(&RangeQuery::new("u1#d1", 10)).unwrap();
    assert_eq!(page.items, vec![rec("u1#d1", "2024-01-01", 7)]);
}
