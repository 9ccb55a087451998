//! Partition listing with sort-key filters and cursor pagination.

use std::sync::Arc;
use std::time::Instant;

use datapoint_core::config::{QueryMode, ServiceConfig};
use datapoint_core::cursor::CursorCodec;
use datapoint_core::errors::{DataPointError, ExError, ExErrorKind, Result};
use datapoint_core::expr::RangeExpressionBuilder;
use datapoint_core::model::{partition_key, FilterInput, Record, RecordKey, SortDirection};
use datapoint_core::{log_op_degraded, log_op_end, log_op_error, log_op_start};
use datapoint_store::{RangeQuery, RecordStore};
use serde::{Deserialize, Serialize};

const OP: &str = "list_by_partition";

/// Arguments of a `listDataPoints` request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    pub owner: String,
    pub name: String,
    /// Sort-key filter, in wire shape (`{"between": [lo, hi]}`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<FilterInput>,
    /// Page size; the configured default applies when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
    #[serde(default)]
    pub sort_direction: SortDirection,
}

impl ListRequest {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: impl Into<FilterInput>) -> Self {
        self.created_at = Some(filter.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_next_token(mut self, token: Option<String>) -> Self {
        self.next_token = token;
        self
    }

    pub fn with_sort_direction(mut self, direction: SortDirection) -> Self {
        self.sort_direction = direction;
        self
    }
}

/// One page of records
///
/// `nextToken` is `null` on the last page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub items: Vec<Record>,
    pub next_token: Option<String>,
    pub count: usize,
    pub scanned_count: usize,
}

/// Read path over a `RecordStore`
#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn RecordStore>,
    builder: RangeExpressionBuilder,
    mode: QueryMode,
    default_limit: usize,
    max_limit: usize,
}

impl QueryService {
    pub fn new(store: Arc<dyn RecordStore>, config: &ServiceConfig) -> Self {
        Self {
            store,
            builder: RangeExpressionBuilder::new(config.query_mode),
            mode: config.query_mode,
            default_limit: config.default_limit,
            max_limit: config.max_limit,
        }
    }

    pub fn mode(&self) -> QueryMode {
        self.mode
    }

    /// List one page of a partition.
    ///
    /// `Ok(None)` is the lenient-mode "no result" for a failed store query.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty owner/name, `limit = 0`, or a malformed
    ///   filter
    /// - `UnsupportedFilterOperator` (strict mode only)
    /// - `StoreQueryFailed` (strict mode only)
    pub fn list_by_partition(&self, request: &ListRequest) -> Result<Option<ListResponse>> {
        log_op_start!(
            OP,
            owner = request.owner.as_str(),
            name = request.name.as_str(),
            sort_direction = request.sort_direction.as_wire()
        );
        let start = Instant::now();

        let result = self.list_inner(request);

        let elapsed = start.elapsed().as_millis() as u64;
        match &result {
            Ok(Some(response)) => {
                log_op_end!(
                    OP,
                    duration_ms = elapsed,
                    item_count = response.count,
                    has_next = response.next_token.is_some()
                );
            }
            Ok(None) => {
                log_op_end!(OP, duration_ms = elapsed, item_count = 0, degraded = true);
            }
            Err(e) => {
                log_op_error!(OP, e.clone(), duration_ms = elapsed);
            }
        }
        result
    }

    fn list_inner(&self, request: &ListRequest) -> Result<Option<ListResponse>> {
        let pk = partition_key(&request.owner, &request.name).map_err(|e| e.with_op(OP))?;
        let limit = self.effective_limit(request.limit)?;
        let predicate = self.builder.build_from_input(request.created_at.as_ref())?;
        let resume = resume_key(&pk, request.next_token.as_deref());

        let query = RangeQuery::new(pk.as_str(), limit)
            .with_predicate(predicate)
            .with_direction(request.sort_direction)
            .with_exclusive_start_key(resume);

        let page = match self.store.query(&query) {
            Ok(page) => page,
            Err(source) => {
                let err = ExError::new(ExErrorKind::StoreQueryFailed)
                    .with_op(OP)
                    .with_partition_key(pk.as_str())
                    .with_message("store query failed")
                    .with_source(source);
                return match self.mode {
                    QueryMode::Strict => Err(err),
                    QueryMode::Lenient => {
                        log_op_degraded!(OP, &err);
                        Ok(None)
                    }
                };
            }
        };

        Ok(Some(ListResponse {
            next_token: CursorCodec::encode(page.last_evaluated_key.as_ref()),
            count: page.count,
            scanned_count: page.scanned_count,
            items: page.items,
        }))
    }

    fn effective_limit(&self, requested: Option<usize>) -> Result<usize> {
        match requested {
            Some(0) => Err(ExError::from(DataPointError::InvalidLimit { limit: 0 }).with_op(OP)),
            Some(n) => Ok(n.min(self.max_limit)),
            None => Ok(self.default_limit.min(self.max_limit)),
        }
    }
}

/// Decoded cursor, if it belongs to `pk`
fn resume_key(pk: &str, token: Option<&str>) -> Option<RecordKey> {
    let key = CursorCodec::decode(token)?;
    if key.partition_key == pk {
        return Some(key);
    }
    let err = ExError::from(DataPointError::MalformedCursor {
        reason: "cursor belongs to another partition".to_string(),
    })
    .with_op("decode_cursor")
    .with_partition_key(pk);
    log_op_degraded!("decode_cursor", &err, cursor_partition = key.partition_key.as_str());
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use datapoint_store::InMemoryRecordStore;

    fn service(max_limit: usize) -> QueryService {
        let config = ServiceConfig {
            max_limit,
            default_limit: max_limit.min(100),
            ..ServiceConfig::default()
        };
        QueryService::new(Arc::new(InMemoryRecordStore::new()), &config)
    }

    #[test]
    fn test_limit_defaults_and_clamps() {
        let svc = service(10);
        assert_eq!(svc.effective_limit(None).unwrap(), 10);
        assert_eq!(svc.effective_limit(Some(3)).unwrap(), 3);
        assert_eq!(svc.effective_limit(Some(5000)).unwrap(), 10);
        let err = svc.effective_limit(Some(0)).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    }

    #[test]
    fn test_foreign_partition_cursor_discarded() {
        let token = CursorCodec::encode(Some(&RecordKey::new("u2#d9", "x")));
        assert_eq!(resume_key("u1#d1", token.as_deref()), None);

        let token = CursorCodec::encode(Some(&RecordKey::new("u1#d1", "x")));
        assert_eq!(
            resume_key("u1#d1", token.as_deref()),
            Some(RecordKey::new("u1#d1", "x"))
        );
    }

    #[test]
    fn test_request_wire_shape() {
        let req: ListRequest = serde_json::from_value(serde_json::json!({
            "owner": "u1",
            "name": "d1",
            "createdAt": {"beginsWith": "2024"},
            "limit": 5,
            "nextToken": "abc",
            "sortDirection": "DESC"
        }))
        .unwrap();
        assert_eq!(req.limit, Some(5));
        assert_eq!(req.next_token.as_deref(), Some("abc"));
        assert_eq!(req.sort_direction, SortDirection::Desc);
        assert!(req.created_at.is_some());

        let minimal: ListRequest =
            serde_json::from_value(serde_json::json!({"owner": "u1", "name": "d1"})).unwrap();
        assert_eq!(minimal.sort_direction, SortDirection::Asc);
        assert_eq!(minimal.limit, None);
    }
}
