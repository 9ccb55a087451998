//! Store primitives the query service and the create pipeline depend on
//!
//! Any ordered key-value backend with partition + sort key semantics can sit
//! behind `RecordStore`: a partition-scoped range query that pages by
//! "resume after this key", and a single-record put.

use datapoint_core::expr::KeyPredicate;
use datapoint_core::model::{Record, RecordKey, SortDirection};

use crate::errors::Result;

/// One page request against a single partition
#[derive(Debug, Clone, PartialEq)]
pub struct RangeQuery {
    pub partition_key: String,
    /// Sort-key condition; `None` matches the whole partition
    pub predicate: Option<KeyPredicate>,
    pub direction: SortDirection,
    /// Maximum number of items in the page (at least 1)
    pub limit: usize,
    /// Resume strictly after this key, in scan direction
    pub exclusive_start_key: Option<RecordKey>,
}

impl RangeQuery {
    pub fn new(partition_key: impl Into<String>, limit: usize) -> Self {
        Self {
            partition_key: partition_key.into(),
            predicate: None,
            direction: SortDirection::Asc,
            limit,
            exclusive_start_key: None,
        }
    }

    pub fn with_predicate(mut self, predicate: Option<KeyPredicate>) -> Self {
        self.predicate = predicate;
        self
    }

    pub fn with_direction(mut self, direction: SortDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_exclusive_start_key(mut self, key: Option<RecordKey>) -> Self {
        self.exclusive_start_key = key;
        self
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryPage {
    pub items: Vec<Record>,
    /// Key of the last returned item when more items remain
    pub last_evaluated_key: Option<RecordKey>,
    pub count: usize,
    pub scanned_count: usize,
}

impl QueryPage {
    /// Build a page from rows fetched with `limit + 1`.
    ///
    /// The extra row only signals that another page exists; it is dropped
    /// and the last kept item's key becomes the resume key.
    pub fn from_overshot(mut rows: Vec<Record>, limit: usize) -> Self {
        let has_more = rows.len() > limit;
        if has_more {
            rows.truncate(limit);
        }
        let last_evaluated_key = if has_more {
            rows.last().map(|r| r.key.clone())
        } else {
            None
        };
        let count = rows.len();
        QueryPage {
            items: rows,
            last_evaluated_key,
            count,
            // Key conditions are applied by the index, so every scanned
            // item is returned
            scanned_count: count,
        }
    }
}

/// Query and write primitives of the backing store
pub trait RecordStore: Send + Sync {
    /// Run one paginated range query.
    ///
    /// # Errors
    ///
    /// Backend failures, typically `Persistence`.
    fn query(&self, query: &RangeQuery) -> Result<QueryPage>;

    /// Write a record, replacing any record with the same key.
    ///
    /// # Errors
    ///
    /// Backend failures, typically `Persistence`.
    fn put(&self, record: &Record) -> Result<Record>;
}

impl<S: RecordStore + ?Sized> RecordStore for std::sync::Arc<S> {
    fn query(&self, query: &RangeQuery) -> Result<QueryPage> {
        (**self).query(query)
    }

    fn put(&self, record: &Record) -> Result<Record> {
        (**self).put(record)
    }
}
