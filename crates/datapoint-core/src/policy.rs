//! Authorization policies
//!
//! The gate never decides anything itself: it asks an injected
//! `AuthorizationPolicy`. Swapping the static configured flag for real claim
//! evaluation only means supplying another implementation.

use crate::pipeline::InvocationContext;

/// Decides whether an invocation may proceed
pub trait AuthorizationPolicy: Send + Sync {
    fn evaluate(&self, ctx: &InvocationContext) -> bool;
}

/// Same answer for every request, read from configuration (`allow`)
///
/// ```
/// use datapoint_core::policy::{AuthorizationPolicy, StaticPolicy};
/// use datapoint_core::pipeline::InvocationContext;
///
/// let ctx = InvocationContext::new("createDataPoint", serde_json::json!({}));
/// assert!(StaticPolicy::new(true).evaluate(&ctx));
/// assert!(!StaticPolicy::new(false).evaluate(&ctx));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticPolicy {
    allow: bool,
}

impl StaticPolicy {
    pub fn new(allow: bool) -> Self {
        Self { allow }
    }
}

impl AuthorizationPolicy for StaticPolicy {
    fn evaluate(&self, _ctx: &InvocationContext) -> bool {
        self.allow
    }
}

/// Always allows (CLI tooling and tests that don't exercise denial)
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllPolicy;

impl AuthorizationPolicy for AllowAllPolicy {
    fn evaluate(&self, _ctx: &InvocationContext) -> bool {
        true
    }
}

/// Always denies
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAllPolicy;

impl AuthorizationPolicy for DenyAllPolicy {
    fn evaluate(&self, _ctx: &InvocationContext) -> bool {
        false
    }
}

impl<F> AuthorizationPolicy for F
where
    F: Fn(&InvocationContext) -> bool + Send + Sync,
{
    fn evaluate(&self, ctx: &InvocationContext) -> bool {
        self(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> InvocationContext {
        InvocationContext::new("createDataPoint", json!({"owner": "u1"}))
    }

    #[test]
    fn test_fixed_policies() {
        assert!(AllowAllPolicy.evaluate(&ctx()));
        assert!(!DenyAllPolicy.evaluate(&ctx()));
    }

    #[test]
    fn test_closure_policy_sees_context() {
        let only_u1 = |c: &InvocationContext| c.arguments["owner"] == "u1";
        assert!(only_u1.evaluate(&ctx()));
        let other = InvocationContext::new("createDataPoint", json!({"owner": "u2"}));
        assert!(!only_u1.evaluate(&other));
    }
}
