//! Shared primitives for the DataPoint workspace
//!
//! Everything here is free of storage and query semantics so that every
//! other crate (core, store, engine, cli) can depend on it:
//!
//! - **Correlation**: `RequestId`, `RequestContext`
//! - **Redaction**: `Sensitive<T>` for caller credentials
//! - **Schema**: canonical structured-log field keys and event names

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::{RequestContext, RequestId};
pub use sensitive::Sensitive;
