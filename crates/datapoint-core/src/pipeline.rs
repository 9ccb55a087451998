//! Gated write pipelines
//!
//! A pipeline is an ordered list of [`Step`]s run against one shared
//! [`PipelineContext`]. The executor is a reducer over that list:
//!
//! ```text
//! Start -> step 1 -> ... -> step n -> Completed
//!            |                 |
//!            +-- Deny ---------+--> Denied   (no later step runs)
//!            +-- Fail(err) ----+--> Failed
//! ```
//!
//! Nothing about authorization is special-cased here; the gate is simply the
//! first step of the create pipeline and the only one that ever denies.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Instant;

use datapoint_core_types::{RequestContext, Sensitive};

use crate::errors::{ExError, ExErrorKind, Result};
use crate::{log_op_end, log_op_error, log_op_start};

/// Everything known about the request that triggered a pipeline run
#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub request: RequestContext,
    /// API field being resolved, e.g. `createDataPoint`
    pub field_name: String,
    pub arguments: Value,
    /// Caller credential, redacted whenever the context is logged
    pub identity: Option<Sensitive<String>>,
}

impl InvocationContext {
    pub fn new(field_name: impl Into<String>, arguments: Value) -> Self {
        Self {
            request: RequestContext::new(),
            field_name: field_name.into(),
            arguments,
            identity: None,
        }
    }

    pub fn with_request(mut self, request: RequestContext) -> Self {
        self.request = request;
        self
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(Sensitive::new(identity.into()));
        self
    }
}

/// State shared by the steps of one run
///
/// The stash is append-only: a key, once written, keeps its first value.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    invocation: InvocationContext,
    stash: BTreeMap<String, Value>,
    result: Option<Value>,
}

impl PipelineContext {
    pub fn new(invocation: InvocationContext) -> Self {
        Self {
            invocation,
            stash: BTreeMap::new(),
            result: None,
        }
    }

    pub fn invocation(&self) -> &InvocationContext {
        &self.invocation
    }

    pub fn arguments(&self) -> &Value {
        &self.invocation.arguments
    }

    /// Add a stash entry. Returns `false` (and leaves the stash untouched) if
    /// the key already exists.
    pub fn stash(&mut self, key: impl Into<String>, value: Value) -> bool {
        match self.stash.entry(key.into()) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    pub fn stashed(&self, key: &str) -> Option<&Value> {
        self.stash.get(key)
    }

    /// Publish the result of the current step; the last published result is
    /// the pipeline's result.
    pub fn set_result(&mut self, value: Value) {
        self.result = Some(value);
    }

    /// Result published by an earlier step, if any
    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }
}

/// What a step tells the executor
#[derive(Debug, Clone)]
pub enum StepOutcome {
    Continue,
    Deny,
    Fail(ExError),
}

/// One named unit of work in a pipeline
pub trait Step: Send + Sync {
    fn name(&self) -> &str;

    fn execute(&self, ctx: &mut PipelineContext) -> StepOutcome;
}

/// Terminal state of a pipeline run
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    Completed { result: Option<Value> },
    /// A step denied the request; no later step ran
    Denied { step: String },
    Failed { step: String, error: ExError },
}

impl PipelineOutcome {
    pub fn is_denied(&self) -> bool {
        matches!(self, PipelineOutcome::Denied { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            PipelineOutcome::Completed { .. } => "completed",
            PipelineOutcome::Denied { .. } => "denied",
            PipelineOutcome::Failed { .. } => "failed",
        }
    }

    /// Collapse into a `Result`, mapping a denial to `Unauthorized`.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for `Denied`; the step's own error for `Failed`.
    pub fn into_result(self) -> Result<Option<Value>> {
        match self {
            PipelineOutcome::Completed { result } => Ok(result),
            PipelineOutcome::Denied { step } => Err(ExError::new(ExErrorKind::Unauthorized)
                .with_step(step)
                .with_message("Not Authorized to access this resource")),
            PipelineOutcome::Failed { error, .. } => Err(error),
        }
    }
}

/// Serializable trace of which steps ran, for diagnostics
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StepTrace {
    pub step: String,
    pub outcome: &'static str,
}

/// Runs steps strictly in order, stopping at the first Deny or Fail
pub struct PipelineExecutor {
    name: String,
    steps: Vec<Box<dyn Step>>,
}

impl PipelineExecutor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    pub fn with_step(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn run(&self, ctx: PipelineContext) -> PipelineOutcome {
        self.run_traced(ctx).0
    }

    /// Run and also return the per-step trace.
    pub fn run_traced(&self, mut ctx: PipelineContext) -> (PipelineOutcome, Vec<StepTrace>) {
        let op = self.name.as_str();
        let request_id = ctx.invocation().request.request_id.to_string();
        log_op_start!(op, request_id = %request_id, steps = self.steps.len());
        let start = Instant::now();

        let mut trace = Vec::with_capacity(self.steps.len());
        let mut outcome = None;

        for step in &self.steps {
            let step_outcome = step.execute(&mut ctx);
            let label = match &step_outcome {
                StepOutcome::Continue => "continue",
                StepOutcome::Deny => "deny",
                StepOutcome::Fail(_) => "fail",
            };
            tracing::debug!(
                op = op,
                request_id = %request_id,
                step = step.name(),
                outcome = label,
                "pipeline step finished"
            );
            trace.push(StepTrace {
                step: step.name().to_string(),
                outcome: label,
            });

            match step_outcome {
                StepOutcome::Continue => {}
                StepOutcome::Deny => {
                    outcome = Some(PipelineOutcome::Denied {
                        step: step.name().to_string(),
                    });
                    break;
                }
                StepOutcome::Fail(error) => {
                    outcome = Some(PipelineOutcome::Failed {
                        step: step.name().to_string(),
                        error: error.with_step(step.name()),
                    });
                    break;
                }
            }
        }

        let outcome = outcome.unwrap_or(PipelineOutcome::Completed {
            result: ctx.result.take(),
        });

        let elapsed = start.elapsed().as_millis() as u64;
        match &outcome {
            PipelineOutcome::Completed { .. } => {
                log_op_end!(op, duration_ms = elapsed, request_id = %request_id, outcome = "completed");
            }
            PipelineOutcome::Denied { step } => {
                log_op_error!(
                    op,
                    ExError::new(ExErrorKind::Unauthorized),
                    duration_ms = elapsed,
                    request_id = %request_id,
                    step = step.as_str()
                );
            }
            PipelineOutcome::Failed { step, error } => {
                log_op_error!(
                    op,
                    error.clone(),
                    duration_ms = elapsed,
                    request_id = %request_id,
                    step = step.as_str()
                );
            }
        }

        (outcome, trace)
    }
}
