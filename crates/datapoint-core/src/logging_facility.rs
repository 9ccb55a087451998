//! Structured logging facility
//!
//! - Single initialization point via `init(profile)`
//! - Operation boundary macros (`log_op_start!`, `log_op_end!`,
//!   `log_op_error!`, `log_op_degraded!`)
//! - In-memory capture for deterministic assertions in tests
//!
//! ```rust
//! use datapoint_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```
//!
//! Every query and pipeline run is bracketed by exactly one `start` event and
//! exactly one `end` or `end_error` event. Read-path failures that are
//! swallowed in lenient mode emit `degraded` instead of `end_error`.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
