#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;

use common::{CountingStore, FailingStore};
use datapoint_core::errors::ExErrorKind;
use datapoint_core::gate::AuthorizationGate;
use datapoint_core::model::RecordKey;
use datapoint_core::pipeline::{InvocationContext, PipelineContext, PipelineOutcome};
use datapoint_core::policy::StaticPolicy;
use datapoint_core_types::RequestContext;
use datapoint_engine::commands::create::PUT_RECORD_STEP;
use datapoint_engine::commands::engine_command::CREATE_DATA_POINT_FIELD;
use datapoint_engine::{
    apply_engine_command, create_pipeline, CreateRecordInput, EngineCommand, EngineCommandResult,
};
use datapoint_store::{RangeQuery, RecordStore};
use serde_json::json;

fn invocation(args: serde_json::Value) -> PipelineContext {
    PipelineContext::new(InvocationContext::new("createDataPoint", args))
}

fn args() -> serde_json::Value {
    json!({
        "owner": "u1",
        "name": "d1",
        "createdAt": "2024-03-01T00:00:00.000Z",
        "payload": {"value": 42}
    })
}

#[test]
fn test_deny_never_writes() {
    let store = Arc::new(CountingStore::default());
    let gate = AuthorizationGate::from_policy(StaticPolicy::new(false));

    let outcome = create_pipeline(store.clone(), gate).run(invocation(args()));

    assert!(outcome.is_denied());
    assert_eq!(store.puts(), 0);
    assert_eq!(
        outcome.into_result().unwrap_err().kind(),
        ExErrorKind::Unauthorized
    );
}

#[test]
fn test_allow_writes_exactly_once_and_returns_record() {
    let store = Arc::new(CountingStore::default());
    let gate = AuthorizationGate::from_policy(StaticPolicy::new(true));

    let result = create_pipeline(store.clone(), gate)
        .run(invocation(args()))
        .into_result()
        .unwrap()
        .unwrap();

    assert_eq!(store.puts(), 1);
    assert_eq!(result["PK"], "u1#d1");
    assert_eq!(result["SK"], "2024-03-01T00:00:00.000Z");
    assert_eq!(result["value"], 42);
    assert_eq!(result["owner"], "u1");

    let page = store.query(&RangeQuery::new("u1#d1", 10)).unwrap();
    assert_eq!(page.items.len(), 1);
}

#[test]
fn test_write_failure_is_failed_outcome() {
    let gate = AuthorizationGate::from_policy(StaticPolicy::new(true));
    let outcome = create_pipeline(Arc::new(FailingStore), gate).run(invocation(args()));

    match outcome {
        PipelineOutcome::Failed { step, error } => {
            assert_eq!(step, PUT_RECORD_STEP);
            assert_eq!(error.kind(), ExErrorKind::StoreWriteFailed);
            assert_eq!(error.partition_key(), Some("u1#d1"));
            assert!(error.to_string().contains("disk full"));
        }
        other => panic!("expected Failed, got {:?}", other),
    }
}

#[test]
fn test_bad_arguments_fail_after_gate() {
    let store = Arc::new(CountingStore::default());
    let gate = AuthorizationGate::from_policy(StaticPolicy::new(true));
    let outcome = create_pipeline(store.clone(), gate).run(invocation(json!({"owner": "u1"})));

    let err = outcome.into_result().unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    assert_eq!(err.step(), Some(PUT_RECORD_STEP));
    assert_eq!(store.puts(), 0);
}

#[test]
fn test_engine_command_returns_typed_record() {
    let store = Arc::new(CountingStore::default());
    let gate = AuthorizationGate::from_policy(StaticPolicy::new(true));
    let input: CreateRecordInput = serde_json::from_value(args()).unwrap();

    let result =
        apply_engine_command(EngineCommand::create(&input).unwrap(), store.clone(), &gate).unwrap();

    let EngineCommandResult::CreateDataPoint(record) = result;
    assert_eq!(
        record.key,
        RecordKey::new("u1#d1", "2024-03-01T00:00:00.000Z")
    );
    assert_eq!(record.payload.get("value"), Some(&json!(42)));
    assert_eq!(store.puts(), 1);
}

#[test]
fn test_engine_command_denial_carries_request_id() {
    let store = Arc::new(CountingStore::default());
    let gate = AuthorizationGate::from_policy(StaticPolicy::new(false));
    let request = RequestContext::new();
    let request_id = request.request_id.clone();
    let invocation = InvocationContext::new(CREATE_DATA_POINT_FIELD, args()).with_request(request);

    let err = apply_engine_command(
        EngineCommand::CreateDataPoint(invocation),
        store.clone(),
        &gate,
    )
    .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Unauthorized);
    assert_eq!(err.request_id(), Some(&request_id));
    assert_eq!(store.puts(), 0);
}
