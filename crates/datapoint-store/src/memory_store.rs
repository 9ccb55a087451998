//! In-process `RecordStore` over a `BTreeMap`
//!
//! Keys order by partition then sort key, so a partition is a contiguous
//! range and the predicate is evaluated with `KeyPredicate::matches`.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::RwLock;

use datapoint_core::model::{Record, RecordKey};

use crate::errors::{lock_poisoned, Result};
use crate::record_store::{QueryPage, RangeQuery, RecordStore};

#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<BTreeMap<RecordKey, Record>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `records`
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        let map = records.into_iter().map(|r| (r.key.clone(), r)).collect();
        Self {
            records: RwLock::new(map),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordStore for InMemoryRecordStore {
    fn query(&self, query: &RangeQuery) -> Result<QueryPage> {
        let records = self.records.read().map_err(|_| lock_poisoned("query"))?;

        let pk = query.partition_key.as_str();
        let lower = RecordKey::new(pk, "");
        let partition = records
            .range((Bound::Included(lower), Bound::Unbounded))
            .take_while(|(k, _)| k.partition_key == pk)
            .map(|(_, r)| r);

        let resume = query
            .exclusive_start_key
            .as_ref()
            .filter(|k| k.partition_key == pk)
            .map(|k| k.sort_key.as_str());
        let forward = query.direction.is_forward();

        let selected = |r: &&Record| {
            let sk = r.sort_key();
            let after_resume = match resume {
                None => true,
                Some(start) if forward => sk > start,
                Some(start) => sk < start,
            };
            after_resume && query.predicate.as_ref().map_or(true, |p| p.matches(sk))
        };

        let fetch = query.limit.saturating_add(1);
        let rows: Vec<Record> = if forward {
            partition.filter(selected).take(fetch).cloned().collect()
        } else {
            let all: Vec<&Record> = partition.collect();
            all.into_iter().rev().filter(selected).take(fetch).cloned().collect()
        };

        Ok(QueryPage::from_overshot(rows, query.limit))
    }

    fn put(&self, record: &Record) -> Result<Record> {
        let mut records = self.records.write().map_err(|_| lock_poisoned("put"))?;
        records.insert(record.key.clone(), record.clone());
        Ok(record.clone())
    }
}
