//! Read and write operations over a `RecordStore`.

pub mod create;
pub mod engine_command;
pub mod engine_query;
pub mod query;
