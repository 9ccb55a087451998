//! Engine-level mutation surface.
//!
//! Every command runs through a gated pipeline; a denial surfaces as an
//! `Unauthorized` error and no write happens. The caller's invocation
//! reaches the gate untouched, so a policy sees every argument the caller
//! sent and argument validation only happens after authorization.

use std::sync::Arc;

use datapoint_core::errors::{ExError, ExErrorKind, Result};
use datapoint_core::gate::AuthorizationGate;
use datapoint_core::model::Record;
use datapoint_core::pipeline::{InvocationContext, PipelineContext};
use datapoint_store::RecordStore;

use crate::commands::create::{create_pipeline, CreateRecordInput};

pub const CREATE_DATA_POINT_FIELD: &str = "createDataPoint";

#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// Raw `createDataPoint` invocation, arguments as the caller sent them
    CreateDataPoint(InvocationContext),
}

impl EngineCommand {
    /// `createDataPoint` command from already-typed arguments
    ///
    /// # Errors
    ///
    /// `Serialization` if the input cannot be rendered as JSON.
    pub fn create(input: &CreateRecordInput) -> Result<Self> {
        let arguments = serde_json::to_value(input).map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op("create_data_point")
                .with_message(e.to_string())
        })?;
        Ok(EngineCommand::CreateDataPoint(InvocationContext::new(
            CREATE_DATA_POINT_FIELD,
            arguments,
        )))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommandResult {
    CreateDataPoint(Record),
}

/// Apply an engine command through its gated pipeline.
///
/// # Errors
///
/// - `Unauthorized` if the gate denies
/// - `InvalidInput` for bad arguments
/// - `StoreWriteFailed` if the put fails
pub fn apply_engine_command(
    cmd: EngineCommand,
    store: Arc<dyn RecordStore>,
    gate: &AuthorizationGate,
) -> Result<EngineCommandResult> {
    match cmd {
        EngineCommand::CreateDataPoint(invocation) => {
            let request_id = invocation.request.request_id.clone();
            let value = create_pipeline(store, gate.clone())
                .run(PipelineContext::new(invocation))
                .into_result()
                .map_err(|e| e.with_request_id(request_id))?;

            let value = value.ok_or_else(|| {
                ExError::new(ExErrorKind::Internal)
                    .with_op("create_data_point")
                    .with_message("pipeline completed without a result")
            })?;
            let record: Record = serde_json::from_value(value).map_err(|e| {
                ExError::new(ExErrorKind::Serialization)
                    .with_op("create_data_point")
                    .with_message(e.to_string())
            })?;
            Ok(EngineCommandResult::CreateDataPoint(record))
        }
    }
}
