//! Error helpers for datapoint-store
//!
//! Everything surfaces as `ExError`; the engine decides whether a store
//! failure becomes `StoreQueryFailed` or `StoreWriteFailed`.

use datapoint_core::errors::{ExError, ExErrorKind};

pub type Result<T> = std::result::Result<T, ExError>;

pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: recorded {}, embedded {}",
            migration_id, expected, actual
        ))
}

pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Stored payload that no longer parses as a JSON object
pub fn serialization_error(pk: &str, sk: &str, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op("decode_payload")
        .with_partition_key(pk)
        .with_sort_key(sk)
        .with_message(err.to_string())
}

pub fn lock_poisoned(op: &str) -> ExError {
    ExError::new(ExErrorKind::Internal)
        .with_op(op.to_string())
        .with_message("store connection lock poisoned")
}

pub fn io_error(op: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op(op.to_string())
        .with_message(err.to_string())
}
