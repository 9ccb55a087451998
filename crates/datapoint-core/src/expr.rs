//! Sort-key range expressions
//!
//! `RangeExpressionBuilder` turns a caller's filter into a backend-agnostic
//! [`KeyPredicate`]: a placeholder-name map, an expression template and the
//! bound operand values. Store implementations either hand the template to a
//! native expression engine or evaluate the typed operator themselves.
//!
//! | operator         | template                        |
//! |------------------|---------------------------------|
//! | `greaterThan`    | `SK > :SK`                      |
//! | `equal`          | `SK = :SK`                      |
//! | `lessOrEqual`    | `SK <= :SK`                     |
//! | `lessThan`       | `SK < :SK`                      |
//! | `greaterOrEqual` | `SK >= :SK`                     |
//! | `between`        | `SK BETWEEN :SK0 AND :SK1`      |
//! | `beginsWith`     | `begins_with(SK, :SK)`          |

use std::collections::BTreeMap;

use crate::config::QueryMode;
use crate::errors::{DataPointError, ExError, Result};
use crate::log_op_degraded;
use crate::model::record::SORT_KEY_ATTRIBUTE;
use crate::model::{FilterInput, RangeFilter, RangeOperator};

/// Name placeholder used in templates for the sort-key attribute
pub const SORT_KEY_NAME_PLACEHOLDER: &str = "SK";
pub const VALUE_PLACEHOLDER: &str = ":SK";
pub const LOWER_VALUE_PLACEHOLDER: &str = ":SK0";
pub const UPPER_VALUE_PLACEHOLDER: &str = ":SK1";

/// Condition over the sort key, ready to be bound into a store query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPredicate {
    operator: RangeOperator,
    names: BTreeMap<String, String>,
    expression: String,
    values: BTreeMap<String, String>,
}

impl KeyPredicate {
    pub fn operator(&self) -> RangeOperator {
        self.operator
    }

    /// Placeholder → attribute name (`SK → SK`)
    pub fn names(&self) -> &BTreeMap<String, String> {
        &self.names
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Value placeholder → operand literal
    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn value(&self, placeholder: &str) -> Option<&str> {
        self.values.get(placeholder).map(String::as_str)
    }

    /// Evaluate against a sort key using byte-wise string ordering.
    pub fn matches(&self, sort_key: &str) -> bool {
        let single = || self.value(VALUE_PLACEHOLDER).unwrap_or_default();
        match self.operator {
            RangeOperator::GreaterThan => sort_key > single(),
            RangeOperator::Equal => sort_key == single(),
            RangeOperator::LessOrEqual => sort_key <= single(),
            RangeOperator::LessThan => sort_key < single(),
            RangeOperator::GreaterOrEqual => sort_key >= single(),
            RangeOperator::BeginsWith => sort_key.starts_with(single()),
            RangeOperator::Between => {
                match (
                    self.value(LOWER_VALUE_PLACEHOLDER),
                    self.value(UPPER_VALUE_PLACEHOLDER),
                ) {
                    (Some(lower), Some(upper)) => lower <= sort_key && sort_key <= upper,
                    _ => false,
                }
            }
        }
    }
}

/// Template for an operator, using the placeholders above
pub fn template_for(operator: RangeOperator) -> &'static str {
    match operator {
        RangeOperator::GreaterThan => "SK > :SK",
        RangeOperator::Equal => "SK = :SK",
        RangeOperator::LessOrEqual => "SK <= :SK",
        RangeOperator::LessThan => "SK < :SK",
        RangeOperator::GreaterOrEqual => "SK >= :SK",
        RangeOperator::Between => "SK BETWEEN :SK0 AND :SK1",
        RangeOperator::BeginsWith => "begins_with(SK, :SK)",
    }
}

/// Builds sort-key predicates from filters
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeExpressionBuilder {
    mode: QueryMode,
}

impl RangeExpressionBuilder {
    pub fn new(mode: QueryMode) -> Self {
        Self { mode }
    }

    /// Predicate for a validated filter; `None` matches the whole partition.
    pub fn build(&self, filter: Option<&RangeFilter>) -> Option<KeyPredicate> {
        let filter = filter?;
        let operator = filter.operator();

        let mut values = BTreeMap::new();
        match filter {
            RangeFilter::Between { lower, upper } => {
                values.insert(LOWER_VALUE_PLACEHOLDER.to_string(), lower.clone());
                values.insert(UPPER_VALUE_PLACEHOLDER.to_string(), upper.clone());
            }
            other => {
                let operand = other.operands().first().map(|s| s.to_string());
                values.insert(VALUE_PLACEHOLDER.to_string(), operand.unwrap_or_default());
            }
        }

        let mut names = BTreeMap::new();
        names.insert(
            SORT_KEY_NAME_PLACEHOLDER.to_string(),
            SORT_KEY_ATTRIBUTE.to_string(),
        );

        Some(KeyPredicate {
            operator,
            names,
            expression: template_for(operator).to_string(),
            values,
        })
    }

    /// Predicate for a raw wire filter.
    ///
    /// An unrecognized operator yields `None` (the filter is ignored) in
    /// lenient mode and an error in strict mode.
    ///
    /// # Errors
    ///
    /// - `UnsupportedFilterOperator` in strict mode for an unknown operator
    /// - `InvalidInput` for a malformed operand or several operators, in
    ///   either mode
    pub fn build_from_input(&self, input: Option<&FilterInput>) -> Result<Option<KeyPredicate>> {
        let Some(input) = input else {
            return Ok(None);
        };
        match input.parse() {
            Ok(filter) => Ok(self.build(Some(&filter))),
            Err(err @ DataPointError::UnsupportedOperator { .. }) => {
                let ex = ExError::from(err).with_op("build_key_predicate");
                match self.mode {
                    QueryMode::Strict => Err(ex),
                    QueryMode::Lenient => {
                        log_op_degraded!("build_key_predicate", &ex);
                        Ok(None)
                    }
                }
            }
            Err(err) => Err(ExError::from(err).with_op("build_key_predicate")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;
    use serde_json::json;

    #[test]
    fn test_no_filter_is_empty_predicate() {
        let b = RangeExpressionBuilder::default();
        assert!(b.build(None).is_none());
        assert!(b.build_from_input(None).unwrap().is_none());
    }

    #[test]
    fn test_single_operand_binding() {
        let p = RangeExpressionBuilder::default()
            .build(Some(&RangeFilter::GreaterThan("2024-01-01".into())))
            .unwrap();
        assert_eq!(p.expression(), "SK > :SK");
        assert_eq!(p.names().get("SK").map(String::as_str), Some("SK"));
        assert_eq!(p.values().len(), 1);
        assert_eq!(p.value(":SK"), Some("2024-01-01"));
    }

    #[test]
    fn test_matches_string_order() {
        let b = RangeExpressionBuilder::default();
        let ge = b
            .build(Some(&RangeFilter::GreaterOrEqual("b".into())))
            .unwrap();
        assert!(ge.matches("b"));
        assert!(ge.matches("ba"));
        assert!(!ge.matches("a"));

        let prefix = b.build(Some(&RangeFilter::BeginsWith("2024-02".into()))).unwrap();
        assert!(prefix.matches("2024-02-10"));
        assert!(!prefix.matches("2024-03-01"));
    }

    #[test]
    fn test_between_with_reversed_bounds_matches_nothing() {
        let p = RangeExpressionBuilder::default()
            .build(Some(&RangeFilter::Between {
                lower: "z".into(),
                upper: "a".into(),
            }))
            .unwrap();
        assert!(!p.matches("m"));
    }

    #[test]
    fn test_unknown_operator_per_mode() {
        let input = FilterInput::single("ne", json!("x"));

        let lenient = RangeExpressionBuilder::new(QueryMode::Lenient);
        assert!(lenient.build_from_input(Some(&input)).unwrap().is_none());

        let strict = RangeExpressionBuilder::new(QueryMode::Strict);
        let err = strict.build_from_input(Some(&input)).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::UnsupportedFilterOperator);
    }

    #[test]
    fn test_bad_operand_rejected_in_both_modes() {
        let input = FilterInput::single("between", json!(["only-one"]));
        for mode in [QueryMode::Lenient, QueryMode::Strict] {
            let err = RangeExpressionBuilder::new(mode)
                .build_from_input(Some(&input))
                .unwrap_err();
            assert_eq!(err.kind(), ExErrorKind::InvalidInput);
        }
    }
}
