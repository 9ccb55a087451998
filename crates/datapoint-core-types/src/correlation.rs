//! Correlation identifiers carried by every query and pipeline invocation.
//!
//! Requests are independent units of work; the only thing that ties the log
//! lines of one request together is the `RequestId` minted (or accepted from
//! the caller) at the boundary.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of one inbound request (a single query or pipeline run).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Mint a fresh, time-ordered identifier (UUIDv7).
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Adopt an identifier supplied by an upstream caller.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Correlation context threaded through a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub request_id: RequestId,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for a request whose id was assigned upstream.
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self { request_id }
    }
}
