//! DataPoint Engine - request orchestration
//!
//! Coordinates the core (expressions, cursors, authorization, pipelines)
//! with a `RecordStore`:
//! - `QueryService::list_by_partition` for the read path
//! - the gated create pipeline for the write path
//! - `resolve_field` dispatch by API field name

pub mod commands;
pub mod resolver;

pub use commands::create::{create_pipeline, CreateRecordInput, PutRecordStep};
pub use commands::engine_command::{apply_engine_command, EngineCommand, EngineCommandResult};
pub use commands::engine_query::{apply_engine_query, EngineQuery, EngineQueryResult};
pub use commands::query::{ListRequest, ListResponse, QueryService};
pub use resolver::{resolve_field, Engine};
