//! Binary comparator conditions in API form.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Binding;

/// Condition type discriminator; each comparator implementation declares the kind it handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComparatorKind {
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl ComparatorKind {
    pub const ALL: [ComparatorKind; 6] = [
        ComparatorKind::Equals,
        ComparatorKind::NotEquals,
        ComparatorKind::LessThan,
        ComparatorKind::LessThanOrEqual,
        ComparatorKind::GreaterThan,
        ComparatorKind::GreaterThanOrEqual,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ComparatorKind::Equals => "equals",
            ComparatorKind::NotEquals => "notEquals",
            ComparatorKind::LessThan => "lessThan",
            ComparatorKind::LessThanOrEqual => "lessThanOrEqual",
            ComparatorKind::GreaterThan => "greaterThan",
            ComparatorKind::GreaterThanOrEqual => "greaterThanOrEqual",
        }
    }
}

impl fmt::Display for ComparatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two-operand comparison, e.g. `{ type: lessThan, left: {expression: amount}, right: {value: 100} }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub kind: ComparatorKind,
    #[serde(default)]
    pub left: Binding,
    #[serde(default)]
    pub right: Binding,
}

impl Condition {
    pub fn new(kind: ComparatorKind, left: Binding, right: Binding) -> Self {
        Self { kind, left, right }
    }

    pub fn less_than(left: Binding, right: Binding) -> Self {
        Self::new(ComparatorKind::LessThan, left, right)
    }

    pub fn greater_than(left: Binding, right: Binding) -> Self {
        Self::new(ComparatorKind::GreaterThan, left, right)
    }

    pub fn equals(left: Binding, right: Binding) -> Self {
        Self::new(ComparatorKind::Equals, left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_camel_case_discriminator() {
        let condition: Condition = serde_json::from_value(json!({
            "type": "lessThanOrEqual",
            "left": {"expression": "amount"},
            "right": {"value": 100}
        }))
        .expect("condition");

        assert_eq!(condition.kind, ComparatorKind::LessThanOrEqual);
        assert_eq!(condition.left, Binding::expression("amount"));
        assert_eq!(condition.right, Binding::value(json!(100)));
    }

    #[test]
    fn kind_names_match_serde_names() {
        for kind in ComparatorKind::ALL {
            let encoded = serde_json::to_value(kind).expect("serialize");
            assert_eq!(encoded, json!(kind.as_str()));
        }
    }
}
