//! Domain model: records, their composite keys, and sort-key range filters

pub mod filter;
pub mod record;

pub use filter::{FilterInput, RangeFilter, RangeOperator};
pub use record::{partition_key, Record, RecordKey, SortDirection, PARTITION_KEY_SEPARATOR};
