use datapoint_core_types::RequestId;
use thiserror::Error;

/// Result type alias used at every crate boundary
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable `ERR_*` code. Read-path kinds
/// (`MalformedCursor`, `UnsupportedFilterOperator`, `StoreQueryFailed`) may be
/// recovered locally depending on the query mode; write-path kinds
/// (`StoreWriteFailed`, `Unauthorized`) always reach the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExErrorKind {
    // Request validation
    InvalidInput,
    UnsupportedFilterOperator,
    MalformedCursor,

    // Store collaborator
    StoreQueryFailed,
    StoreWriteFailed,
    Persistence,
    Serialization,

    // Pipeline
    Unauthorized,

    // Process
    Config,
    Internal,
}

impl ExErrorKind {
    /// Stable error code for programmatic handling and API responses
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::UnsupportedFilterOperator => "ERR_UNSUPPORTED_FILTER_OPERATOR",
            ExErrorKind::MalformedCursor => "ERR_MALFORMED_CURSOR",
            ExErrorKind::StoreQueryFailed => "ERR_STORE_QUERY_FAILED",
            ExErrorKind::StoreWriteFailed => "ERR_STORE_WRITE_FAILED",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Unauthorized => "ERR_UNAUTHORIZED",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification (`kind`) plus whatever request context was known
/// where the error was raised. Built with the `with_*` methods:
///
/// ```
/// use datapoint_core::errors::{ExError, ExErrorKind};
///
/// let err = ExError::new(ExErrorKind::StoreQueryFailed)
///     .with_op("list_by_partition")
///     .with_partition_key("u1#d1")
///     .with_message("connection reset");
/// assert_eq!(err.code(), "ERR_STORE_QUERY_FAILED");
/// assert_eq!(err.partition_key(), Some("u1#d1"));
/// ```
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    partition_key: Option<String>,
    sort_key: Option<String>,
    step: Option<String>,
    request_id: Option<RequestId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            partition_key: None,
            sort_key: None,
            step: None,
            request_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    pub fn with_partition_key(mut self, pk: impl Into<String>) -> Self {
        self.partition_key = Some(pk.into());
        self
    }

    pub fn with_sort_key(mut self, sk: impl Into<String>) -> Self {
        self.sort_key = Some(sk.into());
        self
    }

    /// Name of the pipeline step that produced the error
    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.step = Some(step.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Wrap a lower-level error (e.g. a persistence failure under `StoreWriteFailed`)
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn partition_key(&self) -> Option<&str> {
        self.partition_key.as_deref()
    }

    pub fn sort_key(&self) -> Option<&str> {
        self.sort_key.as_deref()
    }

    pub fn step(&self) -> Option<&str> {
        self.step.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if let Some(step) = &self.step {
            write!(f, " at step '{}'", step)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(pk) = &self.partition_key {
            write!(f, " (partition_key: {})", pk)?;
        }
        if let Some(sk) = &self.sort_key {
            write!(f, " (sort_key: {})", sk)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain-level failures raised while validating requests and coding cursors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataPointError {
    /// `owner` or `name` was empty
    #[error("{field} must not be empty")]
    EmptyKeyComponent { field: &'static str },

    /// Filter key outside {gt, eq, le, lt, ge, between, beginsWith}
    #[error("Unsupported filter operator: {operator}")]
    UnsupportedOperator { operator: String },

    /// Operand has the wrong shape for its operator
    #[error("Invalid operand for '{operator}': {reason}")]
    InvalidOperand { operator: String, reason: String },

    /// More than one operator supplied in a single filter
    #[error("Filter must contain exactly one operator, got {operators:?}")]
    MultipleOperators { operators: Vec<String> },

    #[error("limit must be at least 1, got {limit}")]
    InvalidLimit { limit: usize },

    #[error("Malformed cursor: {reason}")]
    MalformedCursor { reason: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<serde_json::Error> for DataPointError {
    fn from(err: serde_json::Error) -> Self {
        DataPointError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<DataPointError> for ExError {
    fn from(err: DataPointError) -> Self {
        let message = err.to_string();
        let kind = match err {
            DataPointError::EmptyKeyComponent { .. }
            | DataPointError::InvalidOperand { .. }
            | DataPointError::MultipleOperators { .. }
            | DataPointError::InvalidLimit { .. } => ExErrorKind::InvalidInput,
            DataPointError::UnsupportedOperator { .. } => ExErrorKind::UnsupportedFilterOperator,
            DataPointError::MalformedCursor { .. } => ExErrorKind::MalformedCursor,
            DataPointError::Serialization { .. } => ExErrorKind::Serialization,
        };
        ExError::new(kind).with_message(message)
    }
}
