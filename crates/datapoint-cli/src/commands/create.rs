//! Create command
//!
//! Usage: datapoint create --owner <O> --name <N> [--created-at TS] [--payload JSON]
//!
//! Denied unless the configuration allows writes (`allow = true`,
//! `DATAPOINT_ALLOW=true` or `ALLOW=true`).

use clap::Args;
use datapoint_engine::{apply_engine_command, CreateRecordInput, EngineCommand, EngineCommandResult};
use serde_json::{Map, Value};

use super::GlobalArgs;

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub owner: String,

    #[arg(long)]
    pub name: String,

    /// Sort key; defaults to the current UTC time (RFC 3339, milliseconds)
    #[arg(long)]
    pub created_at: Option<String>,

    /// Extra attributes as a JSON object
    #[arg(long)]
    pub payload: Option<String>,
}

fn parse_payload(raw: Option<&str>) -> Result<Option<Map<String, Value>>, Box<dyn std::error::Error>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(Some(map)),
        other => Err(format!("--payload must be a JSON object, got {}", other).into()),
    }
}

pub fn execute(args: CreateArgs, global: &GlobalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let payload = parse_payload(args.payload.as_deref())?;
    let engine = super::engine(global)?;

    let cmd = EngineCommand::create(&CreateRecordInput {
        owner: args.owner,
        name: args.name,
        created_at: args.created_at,
        payload,
    })?;

    let EngineCommandResult::CreateDataPoint(record) =
        apply_engine_command(cmd, engine.store(), engine.gate())?;
    super::print_json(&serde_json::to_value(&record)?)
}
