//! Gated record creation: authorize, then exactly one put.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use datapoint_core::errors::{ExError, ExErrorKind};
use datapoint_core::gate::AuthorizationGate;
use datapoint_core::model::{partition_key, Record, RecordKey};
use datapoint_core::pipeline::{PipelineContext, PipelineExecutor, Step, StepOutcome};
use datapoint_store::RecordStore;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const CREATE_PIPELINE: &str = "create_data_point";
pub const PUT_RECORD_STEP: &str = "put_record";

/// Arguments of a `createDataPoint` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordInput {
    pub owner: String,
    pub name: String,
    /// Sort key; the current time when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Map<String, Value>>,
}

impl CreateRecordInput {
    /// Record to write: `PK = owner#name`, `SK = createdAt`, with `owner`,
    /// `name` and `createdAt` merged into the payload.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if owner or name is empty.
    pub fn into_record(self) -> datapoint_core::errors::Result<Record> {
        let pk = partition_key(&self.owner, &self.name)?;
        let created_at = self
            .created_at
            .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));

        let mut payload = self.payload.unwrap_or_default();
        payload.insert("owner".to_string(), Value::String(self.owner));
        payload.insert("name".to_string(), Value::String(self.name));
        payload.insert("createdAt".to_string(), Value::String(created_at.clone()));

        Ok(Record::new(RecordKey::new(pk, created_at), payload))
    }
}

/// Mutation step: one write, whose stored record becomes the result
pub struct PutRecordStep {
    store: Arc<dyn RecordStore>,
}

impl PutRecordStep {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

impl Step for PutRecordStep {
    fn name(&self) -> &str {
        PUT_RECORD_STEP
    }

    fn execute(&self, ctx: &mut PipelineContext) -> StepOutcome {
        let input: CreateRecordInput = match serde_json::from_value(ctx.arguments().clone()) {
            Ok(input) => input,
            Err(e) => {
                return StepOutcome::Fail(
                    ExError::new(ExErrorKind::InvalidInput)
                        .with_op(CREATE_PIPELINE)
                        .with_message(format!("invalid createDataPoint arguments: {}", e)),
                )
            }
        };

        let record = match input.into_record() {
            Ok(record) => record,
            Err(e) => return StepOutcome::Fail(e.with_op(CREATE_PIPELINE)),
        };

        let stored = match self.store.put(&record) {
            Ok(stored) => stored,
            Err(source) => {
                return StepOutcome::Fail(
                    ExError::new(ExErrorKind::StoreWriteFailed)
                        .with_op(CREATE_PIPELINE)
                        .with_partition_key(record.partition_key())
                        .with_sort_key(record.sort_key())
                        .with_message("store write failed")
                        .with_source(source),
                )
            }
        };

        match serde_json::to_value(&stored) {
            Ok(value) => {
                ctx.set_result(value);
                StepOutcome::Continue
            }
            Err(e) => StepOutcome::Fail(
                ExError::new(ExErrorKind::Serialization)
                    .with_op(CREATE_PIPELINE)
                    .with_message(e.to_string()),
            ),
        }
    }
}

/// `authorize` then `put_record`
pub fn create_pipeline(store: Arc<dyn RecordStore>, gate: AuthorizationGate) -> PipelineExecutor {
    PipelineExecutor::new(CREATE_PIPELINE)
        .with_step(gate)
        .with_step(PutRecordStep::new(store))
}
