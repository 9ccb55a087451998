//! Engine-level read-only query surface.
//!
//! `apply_engine_query` is the single entry point for read-only queries.

use datapoint_core::errors::Result;

use crate::commands::query::{ListRequest, ListResponse, QueryService};

/// Read-only queries supported by the engine.
#[derive(Debug, Clone)]
pub enum EngineQuery {
    /// One page of a partition (`listDataPoints`).
    ListDataPoints(ListRequest),
}

/// Result of an `EngineQuery`.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineQueryResult {
    /// `None` when a lenient-mode store failure was swallowed.
    ListDataPoints(Option<ListResponse>),
}

/// # Errors
///
/// Whatever the underlying operation returns; see
/// [`QueryService::list_by_partition`].
pub fn apply_engine_query(query: EngineQuery, service: &QueryService) -> Result<EngineQueryResult> {
    match query {
        EngineQuery::ListDataPoints(request) => service
            .list_by_partition(&request)
            .map(EngineQueryResult::ListDataPoints),
    }
}
