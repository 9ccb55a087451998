//! Authorization gate: normalizes a policy's verdict into a decision and
//! acts as the first step of gated pipelines.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::pipeline::{InvocationContext, PipelineContext, Step, StepOutcome};
use crate::policy::AuthorizationPolicy;

pub const AUTHORIZE_STEP: &str = "authorize";
/// Stash key under which the gate records its decision
pub const AUTHORIZATION_STASH_KEY: &str = "authorization";

/// `{ "allow": bool }`, computed fresh for every invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationDecision {
    pub allow: bool,
}

#[derive(Clone)]
pub struct AuthorizationGate {
    policy: Arc<dyn AuthorizationPolicy>,
}

impl AuthorizationGate {
    pub fn new(policy: Arc<dyn AuthorizationPolicy>) -> Self {
        Self { policy }
    }

    pub fn from_policy(policy: impl AuthorizationPolicy + 'static) -> Self {
        Self::new(Arc::new(policy))
    }

    pub fn authorize(&self, ctx: &InvocationContext) -> AuthorizationDecision {
        // Identity is Sensitive, so the Debug rendering is safe to log
        tracing::debug!(
            op = AUTHORIZE_STEP,
            request_id = %ctx.request.request_id,
            field_name = ctx.field_name.as_str(),
            context = ?ctx,
            "authorization request"
        );
        let decision = AuthorizationDecision {
            allow: self.policy.evaluate(ctx),
        };
        tracing::info!(
            op = AUTHORIZE_STEP,
            request_id = %ctx.request.request_id,
            allow = decision.allow,
            "authorization decided"
        );
        decision
    }
}

impl std::fmt::Debug for AuthorizationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationGate").finish_non_exhaustive()
    }
}

impl Step for AuthorizationGate {
    fn name(&self) -> &str {
        AUTHORIZE_STEP
    }

    fn execute(&self, ctx: &mut PipelineContext) -> StepOutcome {
        let decision = self.authorize(ctx.invocation());
        ctx.stash(
            AUTHORIZATION_STASH_KEY,
            serde_json::json!({ "allow": decision.allow }),
        );
        if decision.allow {
            StepOutcome::Continue
        } else {
            StepOutcome::Deny
        }
    }
}
