//! Field dispatch: maps an API field name and its JSON arguments onto the
//! engine's typed queries and commands.
//!
//! | field            | operation                          | null when            |
//! |------------------|------------------------------------|----------------------|
//! | `listDataPoints` | `QueryService::list_by_partition`  | lenient store error  |
//! | `createDataPoint`| gated create pipeline              | never                |
//! | anything else    | none                               | always               |

use std::sync::Arc;

use datapoint_core::config::ServiceConfig;
use datapoint_core::errors::{ExError, ExErrorKind, Result};
use datapoint_core::gate::AuthorizationGate;
use datapoint_core::pipeline::InvocationContext;
use datapoint_core::policy::{AuthorizationPolicy, StaticPolicy};
use datapoint_store::RecordStore;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::commands::engine_command::{
    apply_engine_command, EngineCommand, EngineCommandResult, CREATE_DATA_POINT_FIELD,
};
use crate::commands::engine_query::{apply_engine_query, EngineQuery, EngineQueryResult};
use crate::commands::query::{ListRequest, QueryService};

pub const LIST_DATA_POINTS_FIELD: &str = "listDataPoints";

/// Store, configuration and authorization wired together
#[derive(Clone)]
pub struct Engine {
    query_service: QueryService,
    store: Arc<dyn RecordStore>,
    gate: AuthorizationGate,
}

impl Engine {
    /// Engine whose gate uses the configured static `allow` flag
    pub fn from_config(config: &ServiceConfig, store: Arc<dyn RecordStore>) -> Self {
        Self::with_policy(config, store, Arc::new(StaticPolicy::new(config.allow)))
    }

    pub fn with_policy(
        config: &ServiceConfig,
        store: Arc<dyn RecordStore>,
        policy: Arc<dyn AuthorizationPolicy>,
    ) -> Self {
        Self {
            query_service: QueryService::new(Arc::clone(&store), config),
            store,
            gate: AuthorizationGate::new(policy),
        }
    }

    pub fn query_service(&self) -> &QueryService {
        &self.query_service
    }

    pub fn gate(&self) -> &AuthorizationGate {
        &self.gate
    }

    pub fn store(&self) -> Arc<dyn RecordStore> {
        Arc::clone(&self.store)
    }
}

/// Resolve one API field.
///
/// # Errors
///
/// `InvalidInput` for arguments of the wrong shape, plus whatever the
/// resolved operation returns.
pub fn resolve_field(engine: &Engine, invocation: InvocationContext) -> Result<Value> {
    tracing::debug!(
        op = "resolve_field",
        request_id = %invocation.request.request_id,
        field_name = invocation.field_name.as_str(),
    );

    match invocation.field_name.as_str() {
        LIST_DATA_POINTS_FIELD => {
            let request: ListRequest = arguments(&invocation)?;
            match apply_engine_query(EngineQuery::ListDataPoints(request), engine.query_service())? {
                EngineQueryResult::ListDataPoints(Some(response)) => to_json(&response),
                EngineQueryResult::ListDataPoints(None) => Ok(Value::Null),
            }
        }
        CREATE_DATA_POINT_FIELD => {
            let cmd = EngineCommand::CreateDataPoint(invocation);
            match apply_engine_command(cmd, engine.store(), engine.gate())? {
                EngineCommandResult::CreateDataPoint(record) => to_json(&record),
            }
        }
        other => {
            tracing::warn!(
                op = "resolve_field",
                request_id = %invocation.request.request_id,
                field_name = other,
                "unknown field, resolving to null"
            );
            Ok(Value::Null)
        }
    }
}

fn arguments<T: DeserializeOwned>(invocation: &InvocationContext) -> Result<T> {
    serde_json::from_value(invocation.arguments.clone()).map_err(|e| {
        ExError::new(ExErrorKind::InvalidInput)
            .with_op("resolve_field")
            .with_request_id(invocation.request.request_id.clone())
            .with_message(format!(
                "invalid arguments for {}: {}",
                invocation.field_name, e
            ))
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| {
        ExError::new(ExErrorKind::Serialization)
            .with_op("resolve_field")
            .with_message(e.to_string())
    })
}
