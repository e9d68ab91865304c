//! Field filters: operator set, value coercion and wire encoding.
//!
//! A command-line filter arrives as three strings. The operator must belong
//! to a closed set, and the value is coerced to the most specific scalar it
//! parses as. The server accepts a list of filters; this tool always sends
//! exactly one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ============================================================================
// Operators
// ============================================================================

/// Comparison operators accepted by the runtime API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    LessThan,
    LessEqualThan,
    GreaterThan,
    GreaterEqualThan,
    In,
    NotIn,
    Like,
    MatchRegEx,
    AnyEq,
    AnyLike,
}

impl FilterOperator {
    /// Every operator, in documentation order.
    pub const ALL: [FilterOperator; 12] = [
        Self::Equals,
        Self::NotEquals,
        Self::LessThan,
        Self::LessEqualThan,
        Self::GreaterThan,
        Self::GreaterEqualThan,
        Self::In,
        Self::NotIn,
        Self::Like,
        Self::MatchRegEx,
        Self::AnyEq,
        Self::AnyLike,
    ];

    /// Wire name, e.g. `GREATER_EQUAL_THAN`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "EQUALS",
            Self::NotEquals => "NOT_EQUALS",
            Self::LessThan => "LESS_THAN",
            Self::LessEqualThan => "LESS_EQUAL_THAN",
            Self::GreaterThan => "GREATER_THAN",
            Self::GreaterEqualThan => "GREATER_EQUAL_THAN",
            Self::In => "IN",
            Self::NotIn => "NOT_IN",
            Self::Like => "LIKE",
            Self::MatchRegEx => "MATCH_REG_EX",
            Self::AnyEq => "ANY_EQ",
            Self::AnyLike => "ANY_LIKE",
        }
    }

    /// Wire names of all operators.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|op| op.as_str()).collect()
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| {
                Error::invalid_operator(format!(
                    "'{s}' (expected one of: {})",
                    Self::names().join(", ")
                ))
            })
    }
}

// ============================================================================
// Scalar values
// ============================================================================

/// A typed comparison value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// Coerce a command-line value to a scalar.
///
/// Precedence: `true`/`false` in any case, then integer, then finite float,
/// otherwise the string unchanged. Never fails.
pub fn coerce_value(raw: &str) -> ScalarValue {
    if raw.eq_ignore_ascii_case("true") {
        return ScalarValue::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return ScalarValue::Bool(false);
    }
    if let Ok(i) = raw.trim().parse::<i64>() {
        return ScalarValue::Int(i);
    }
    // `inf` and `NaN` parse as floats but have no JSON representation.
    if let Ok(x) = raw.trim().parse::<f64>()
        && x.is_finite()
    {
        return ScalarValue::Float(x);
    }
    ScalarValue::String(raw.to_string())
}

// ============================================================================
// Field filters
// ============================================================================

/// A single `attributePath OPERATOR comparisonValue` predicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldFilter {
    pub attribute_path: String,
    pub operator: FilterOperator,
    pub comparison_value: ScalarValue,

    /// Text the value was given as, kept for display.
    #[serde(skip)]
    raw_value: String,
}

impl FieldFilter {
    /// Build a filter with an already-typed value.
    pub fn new(
        attribute_path: impl Into<String>,
        operator: FilterOperator,
        comparison_value: ScalarValue,
    ) -> Self {
        let raw_value = comparison_value.to_string();
        Self {
            attribute_path: attribute_path.into(),
            operator,
            comparison_value,
            raw_value,
        }
    }

    /// Build a filter from command-line text, coercing the value.
    pub fn from_cli(attribute_path: impl Into<String>, operator: FilterOperator, raw: &str) -> Self {
        Self {
            attribute_path: attribute_path.into(),
            operator,
            comparison_value: coerce_value(raw),
            raw_value: raw.to_string(),
        }
    }

    /// LIKE filter with the term sent as a string.
    pub fn like(attribute_path: impl Into<String>, term: &str) -> Self {
        Self::new(
            attribute_path,
            FilterOperator::Like,
            ScalarValue::String(term.to_string()),
        )
    }

    /// The value as originally given.
    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }

    /// Wire form: a single-element filter list.
    pub fn to_wire(&self) -> Vec<FieldFilter> {
        vec![self.clone()]
    }
}

impl fmt::Display for FieldFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.attribute_path, self.operator, self.raw_value
        )
    }
}

/// Encode a command-line filter into its wire form.
///
/// # Example
///
/// ```
/// use octo_core::{FilterOperator, ScalarValue, encode_filter};
///
/// let filters = encode_filter("count", FilterOperator::GreaterThan, "10");
/// assert_eq!(filters.len(), 1);
/// assert_eq!(filters[0].comparison_value, ScalarValue::Int(10));
/// ```
pub fn encode_filter(attribute: &str, operator: FilterOperator, raw: &str) -> Vec<FieldFilter> {
    FieldFilter::from_cli(attribute, operator, raw).to_wire()
}
