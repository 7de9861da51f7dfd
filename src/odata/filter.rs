//! Filter predicate tree
//!
//! Compiled form of a `$filter` expression: comparisons over declared fields
//! combined with `and`/`or`. Literals are typed at compile time against the
//! entity type, so evaluation needs no schema access.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::time::parse_instant;

/// Comparison operators supported in `$filter`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equals
    Eq,
    /// Not equals
    Ne,
    /// Greater than
    Gt,
    /// Greater than or equal
    Ge,
    /// Less than
    Lt,
    /// Less than or equal
    Le,
}

impl CompareOp {
    /// Parse an operator keyword
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "eq" => Some(CompareOp::Eq),
            "ne" => Some(CompareOp::Ne),
            "gt" => Some(CompareOp::Gt),
            "ge" => Some(CompareOp::Ge),
            "lt" => Some(CompareOp::Lt),
            "le" => Some(CompareOp::Le),
            _ => None,
        }
    }

    /// Returns the operator keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Ne => "ne",
            CompareOp::Gt => "gt",
            CompareOp::Ge => "ge",
            CompareOp::Lt => "lt",
            CompareOp::Le => "le",
        }
    }

    fn holds(&self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
        }
    }
}

/// A typed comparison literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// String literal compared lexicographically
    String(String),
    /// Instant literal compared as a point in time
    DateTime(DateTime<Utc>),
}

/// Compiled filter predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpr {
    /// `field op literal`
    Compare {
        field: String,
        op: CompareOp,
        value: FilterValue,
    },
    /// Both branches must hold
    And(Box<FilterExpr>, Box<FilterExpr>),
    /// Either branch must hold
    Or(Box<FilterExpr>, Box<FilterExpr>),
}

impl FilterExpr {
    /// Create a comparison node
    pub fn compare(field: impl Into<String>, op: CompareOp, value: FilterValue) -> Self {
        FilterExpr::Compare {
            field: field.into(),
            op,
            value,
        }
    }

    /// Evaluate the predicate against a stored record
    ///
    /// A missing field, a non-string stored value, or an unparseable stored
    /// instant never matches.
    pub fn matches(&self, record: &Value) -> bool {
        match self {
            FilterExpr::Compare { field, op, value } => {
                let Some(stored) = record.get(field).and_then(Value::as_str) else {
                    return false;
                };
                match value {
                    FilterValue::String(literal) => op.holds(stored.cmp(literal.as_str())),
                    FilterValue::DateTime(literal) => match parse_instant(stored) {
                        Some(instant) => op.holds(instant.cmp(literal)),
                        None => false,
                    },
                }
            }
            FilterExpr::And(left, right) => left.matches(record) && right.matches(record),
            FilterExpr::Or(left, right) => left.matches(record) || right.matches(record),
        }
    }
}
