//! Sort key conditions
//!
//! Range predicates evaluated against a candidate sort key with plain
//! bytewise string comparison, which is also the order the store keeps sort
//! keys in.

use serde::{Deserialize, Serialize};

/// Sort key range predicate for queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeCondition {
    Equals(String),
    LessThan(String),
    LessThanOrEqual(String),
    GreaterThan(String),
    GreaterThanOrEqual(String),
    /// Exclusive on BOTH bounds: `lower < candidate < upper`
    Between(String, String),
    BeginsWith(String),
}

impl AttributeCondition {
    pub fn between(lower: impl Into<String>, upper: impl Into<String>) -> Self {
        AttributeCondition::Between(lower.into(), upper.into())
    }

    pub fn begins_with(prefix: impl Into<String>) -> Self {
        AttributeCondition::BeginsWith(prefix.into())
    }

    /// Evaluate this condition against `sort_key`.
    pub fn matches(&self, sort_key: &str) -> bool {
        match self {
            AttributeCondition::Equals(v) => sort_key == v.as_str(),
            AttributeCondition::LessThan(v) => sort_key < v.as_str(),
            AttributeCondition::LessThanOrEqual(v) => sort_key <= v.as_str(),
            AttributeCondition::GreaterThan(v) => sort_key > v.as_str(),
            AttributeCondition::GreaterThanOrEqual(v) => sort_key >= v.as_str(),
            AttributeCondition::Between(lower, upper) => {
                sort_key > lower.as_str() && sort_key < upper.as_str()
            }
            AttributeCondition::BeginsWith(prefix) => sort_key.starts_with(prefix.as_str()),
        }
    }
}

/// Free-function form of [`AttributeCondition::matches`]; `None` matches everything.
pub fn matches(condition: Option<&AttributeCondition>, sort_key: &str) -> bool {
    condition.map_or(true, |c| c.matches(sort_key))
}
