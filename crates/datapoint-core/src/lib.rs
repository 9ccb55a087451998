//! Core of the data-point service: partition/sort-key model, range
//! expressions, cursors, authorization and the gated write pipeline.
//!
//! Nothing here touches storage; persistence lives behind the
//! `RecordStore` trait in `datapoint-store`, and request orchestration in
//! `datapoint-engine`.

pub mod config;
pub mod cursor;
pub mod errors;
pub mod expr;
pub mod gate;
pub mod logging_facility;
pub mod model;
pub mod pipeline;
pub mod policy;

// Used by the exported logging macros
#[doc(hidden)]
pub use tracing;

pub use datapoint_core_types as core_types;

pub use config::{QueryMode, ServiceConfig};
pub use cursor::CursorCodec;
pub use errors::{DataPointError, ExError, ExErrorKind, Result};
pub use expr::{KeyPredicate, RangeExpressionBuilder};
pub use gate::{AuthorizationDecision, AuthorizationGate};
pub use model::{FilterInput, RangeFilter, RangeOperator, Record, RecordKey, SortDirection};
pub use pipeline::{
    InvocationContext, PipelineContext, PipelineExecutor, PipelineOutcome, Step, StepOutcome,
};
pub use policy::{AllowAllPolicy, AuthorizationPolicy, DenyAllPolicy, StaticPolicy};
