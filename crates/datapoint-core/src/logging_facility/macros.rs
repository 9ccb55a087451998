//! Operation boundary macros
//!
//! All four macros stamp `component` (the calling module), `op` and `event`
//! so that log consumers can pair up boundaries per operation.

/// Log the start of an operation
///
/// ```
/// # use datapoint_core::log_op_start;
/// log_op_start!("list_by_partition");
/// log_op_start!("list_by_partition", partition_key = "u1#d1");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        $crate::tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        $crate::tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// ```
/// # use datapoint_core::log_op_end;
/// log_op_end!("list_by_partition", duration_ms = 3);
/// log_op_end!("list_by_partition", duration_ms = 3, item_count = 2);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        $crate::tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        $crate::tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation that ended in an error surfaced to the caller
///
/// `$err` is anything convertible into `ExError`; it is consumed.
///
/// ```
/// # use datapoint_core::log_op_error;
/// # use datapoint_core::errors::{ExError, ExErrorKind};
/// let err = ExError::new(ExErrorKind::Unauthorized);
/// log_op_error!("create_data_point", err, duration_ms = 1);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            err.message = ex_err.message(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            err.message = ex_err.message(),
            $($field)*
        );
    }};
}

/// Log an error that was recovered locally instead of surfaced
///
/// Used for lenient-mode fallbacks: a malformed cursor, an ignored filter
/// operator, a swallowed store failure.
///
/// ```
/// # use datapoint_core::log_op_degraded;
/// # use datapoint_core::errors::{ExError, ExErrorKind};
/// let err = ExError::new(ExErrorKind::MalformedCursor);
/// log_op_degraded!("decode_cursor", &err);
/// ```
#[macro_export]
macro_rules! log_op_degraded {
    ($op:expr, $err:expr) => {{
        let ex_err: &$crate::errors::ExError = $err;
        $crate::tracing::warn!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_DEGRADED,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            err.message = ex_err.message(),
        );
    }};
    ($op:expr, $err:expr, $($field:tt)*) => {{
        let ex_err: &$crate::errors::ExError = $err;
        $crate::tracing::warn!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_DEGRADED,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            err.message = ex_err.message(),
            $($field)*
        );
    }};
}
