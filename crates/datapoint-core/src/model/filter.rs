//! Sort-key range filters and their wire shape
//!
//! On the wire a filter is an object with exactly one operator key:
//!
//! ```json
//! { "between": ["2024-01-01", "2024-01-31"] }
//! { "beginsWith": "2024-02" }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::DataPointError;

/// The seven supported comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeOperator {
    GreaterThan,
    Equal,
    LessOrEqual,
    LessThan,
    GreaterOrEqual,
    Between,
    BeginsWith,
}

impl RangeOperator {
    pub const ALL: [RangeOperator; 7] = [
        RangeOperator::GreaterThan,
        RangeOperator::Equal,
        RangeOperator::LessOrEqual,
        RangeOperator::LessThan,
        RangeOperator::GreaterOrEqual,
        RangeOperator::Between,
        RangeOperator::BeginsWith,
    ];

    /// Key used in the wire filter object (case-sensitive)
    pub fn wire_key(&self) -> &'static str {
        match self {
            RangeOperator::GreaterThan => "gt",
            RangeOperator::Equal => "eq",
            RangeOperator::LessOrEqual => "le",
            RangeOperator::LessThan => "lt",
            RangeOperator::GreaterOrEqual => "ge",
            RangeOperator::Between => "between",
            RangeOperator::BeginsWith => "beginsWith",
        }
    }

    pub fn from_wire_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.wire_key() == key)
    }
}

/// A single active sort-key condition
///
/// `Between` bounds are inclusive and kept in the order given; no min/max
/// normalization happens anywhere downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeFilter {
    GreaterThan(String),
    Equal(String),
    LessOrEqual(String),
    LessThan(String),
    GreaterOrEqual(String),
    Between { lower: String, upper: String },
    BeginsWith(String),
}

impl RangeFilter {
    pub fn operator(&self) -> RangeOperator {
        match self {
            RangeFilter::GreaterThan(_) => RangeOperator::GreaterThan,
            RangeFilter::Equal(_) => RangeOperator::Equal,
            RangeFilter::LessOrEqual(_) => RangeOperator::LessOrEqual,
            RangeFilter::LessThan(_) => RangeOperator::LessThan,
            RangeFilter::GreaterOrEqual(_) => RangeOperator::GreaterOrEqual,
            RangeFilter::Between { .. } => RangeOperator::Between,
            RangeFilter::BeginsWith(_) => RangeOperator::BeginsWith,
        }
    }

    /// Operands in binding order
    pub fn operands(&self) -> Vec<&str> {
        match self {
            RangeFilter::GreaterThan(v)
            | RangeFilter::Equal(v)
            | RangeFilter::LessOrEqual(v)
            | RangeFilter::LessThan(v)
            | RangeFilter::GreaterOrEqual(v)
            | RangeFilter::BeginsWith(v) => vec![v.as_str()],
            RangeFilter::Between { lower, upper } => vec![lower.as_str(), upper.as_str()],
        }
    }

    pub fn to_input(&self) -> FilterInput {
        let value = match self {
            RangeFilter::Between { lower, upper } => {
                Value::Array(vec![Value::String(lower.clone()), Value::String(upper.clone())])
            }
            other => Value::String(other.operands()[0].to_string()),
        };
        let mut map = Map::new();
        map.insert(self.operator().wire_key().to_string(), value);
        FilterInput(map)
    }
}

/// A filter exactly as received from the caller, before validation
///
/// Kept separate from `RangeFilter` so that unknown operator keys survive
/// deserialization and the expression builder can decide, per query mode,
/// whether to ignore or reject them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterInput(pub Map<String, Value>);

impl FilterInput {
    pub fn single(key: impl Into<String>, value: Value) -> Self {
        let mut map = Map::new();
        map.insert(key.into(), value);
        FilterInput(map)
    }

    /// Validate into a typed filter.
    ///
    /// # Errors
    ///
    /// - `UnsupportedOperator` if the key is not one of the seven operators,
    ///   or the object is empty
    /// - `MultipleOperators` if more than one key is present
    /// - `InvalidOperand` if the value has the wrong shape for the operator
    pub fn parse(&self) -> Result<RangeFilter, DataPointError> {
        let mut entries = self.0.iter();
        let (key, value) = match (entries.next(), entries.next()) {
            (None, _) => {
                return Err(DataPointError::UnsupportedOperator {
                    operator: String::new(),
                })
            }
            (Some(entry), None) => entry,
            (Some(_), Some(_)) => {
                return Err(DataPointError::MultipleOperators {
                    operators: self.0.keys().cloned().collect(),
                })
            }
        };

        let op = RangeOperator::from_wire_key(key).ok_or_else(|| {
            DataPointError::UnsupportedOperator {
                operator: key.clone(),
            }
        })?;

        let filter = match op {
            RangeOperator::Between => {
                let (lower, upper) = between_operands(value)?;
                RangeFilter::Between { lower, upper }
            }
            RangeOperator::GreaterThan => RangeFilter::GreaterThan(string_operand(key, value)?),
            RangeOperator::Equal => RangeFilter::Equal(string_operand(key, value)?),
            RangeOperator::LessOrEqual => RangeFilter::LessOrEqual(string_operand(key, value)?),
            RangeOperator::LessThan => RangeFilter::LessThan(string_operand(key, value)?),
            RangeOperator::GreaterOrEqual => {
                RangeFilter::GreaterOrEqual(string_operand(key, value)?)
            }
            RangeOperator::BeginsWith => RangeFilter::BeginsWith(string_operand(key, value)?),
        };
        Ok(filter)
    }
}

fn string_operand(key: &str, value: &Value) -> Result<String, DataPointError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| DataPointError::InvalidOperand {
            operator: key.to_string(),
            reason: format!("expected a string, got {}", value),
        })
}

fn between_operands(value: &Value) -> Result<(String, String), DataPointError> {
    let invalid = |reason: String| DataPointError::InvalidOperand {
        operator: RangeOperator::Between.wire_key().to_string(),
        reason,
    };
    match value.as_array().map(Vec::as_slice) {
        Some([Value::String(lower), Value::String(upper)]) => Ok((lower.clone(), upper.clone())),
        Some(items) => Err(invalid(format!(
            "expected two string bounds, got {} element(s)",
            items.len()
        ))),
        None => Err(invalid(format!("expected a 2-element array, got {}", value))),
    }
}

impl From<RangeFilter> for FilterInput {
    fn from(filter: RangeFilter) -> Self {
        filter.to_input()
    }
}
