#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use datapoint_core::config::{QueryMode, ServiceConfig};
use datapoint_core::errors::{ExError, ExErrorKind};
use datapoint_core::model::{Record, RecordKey};
use datapoint_store::{InMemoryRecordStore, QueryPage, RangeQuery, RecordStore};
use serde_json::{json, Map};

pub fn config(mode: QueryMode, allow: bool) -> ServiceConfig {
    ServiceConfig {
        query_mode: mode,
        allow,
        ..ServiceConfig::default()
    }
}

pub fn record(pk: &str, sk: &str, value: i64) -> Record {
    let mut payload = Map::new();
    payload.insert("value".to_string(), json!(value));
    Record::new(RecordKey::new(pk, sk), payload)
}

/// u1#d1 holds five January/February records; u1#d2 holds one decoy
pub fn seeded_store() -> Arc<InMemoryRecordStore> {
    let days = [
        "2024-01-01",
        "2024-01-15",
        "2024-01-31",
        "2024-02-01",
        "2024-02-10",
    ];
    let mut records: Vec<Record> = days
        .iter()
        .enumerate()
        .map(|(i, d)| record("u1#d1", d, i as i64 + 1))
        .collect();
    records.push(record("u1#d2", "2024-01-10", 99));
    Arc::new(InMemoryRecordStore::with_records(records))
}

/// Store whose every call fails
pub struct FailingStore;

impl RecordStore for FailingStore {
    fn query(&self, _query: &RangeQuery) -> datapoint_store::Result<QueryPage> {
        Err(ExError::new(ExErrorKind::Persistence).with_message("connection reset"))
    }

    fn put(&self, _record: &Record) -> datapoint_store::Result<Record> {
        Err(ExError::new(ExErrorKind::Persistence).with_message("disk full"))
    }
}

/// Wraps an in-memory store and counts writes
#[derive(Default)]
pub struct CountingStore {
    inner: InMemoryRecordStore,
    puts: AtomicUsize,
}

impl CountingStore {
    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

impl RecordStore for CountingStore {
    fn query(&self, query: &RangeQuery) -> datapoint_store::Result<QueryPage> {
        self.inner.query(query)
    }

    fn put(&self, record: &Record) -> datapoint_store::Result<Record> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(record)
    }
}
