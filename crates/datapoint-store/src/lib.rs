//! DataPoint Store - record persistence behind the `RecordStore` trait
//!
//! Provides:
//! - `RecordStore`: the partition query and single-record put primitives
//! - `SqliteRecordStore`: reference implementation on SQLite
//! - `InMemoryRecordStore`: ordered in-process implementation for tests and
//!   tooling
//! - Embedded, checksummed schema migrations

pub mod db;
pub mod errors;
pub mod memory_store;
pub mod migrations;
pub mod record_store;
pub mod sqlite_store;

pub use errors::Result;
pub use memory_store::InMemoryRecordStore;
pub use record_store::{QueryPage, RangeQuery, RecordStore};
pub use sqlite_store::SqliteRecordStore;
