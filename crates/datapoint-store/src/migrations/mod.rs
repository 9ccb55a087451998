//! Migration framework
//!
//! - Embedded SQL applied in order, each inside its own transaction
//! - Idempotent: applied migrations are recorded in `schema_version`
//! - A recorded checksum that no longer matches the embedded SQL is an error

mod checksums;
mod embedded;
mod runner;

pub use embedded::migration_ids;
pub use runner::apply_migrations;
