//! Internal runtime values held in a workflow scope.

use std::fmt;

use chrono::NaiveDateTime;
use serde_json::{Number, Value as JsonValue};

/// Value conforming to exactly one data type.
///
/// Composite values are ordered sequences of child values. A value that passed
/// its data type's validation needs no further checks downstream.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RuntimeValue {
    #[default]
    Null,
    Text(String),
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
    Date(NaiveDateTime),
    List(Vec<RuntimeValue>),
}

impl RuntimeValue {
    pub fn is_null(&self) -> bool {
        matches!(self, RuntimeValue::Null)
    }

    /// Numeric view used by comparators. Integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RuntimeValue::Integer(integer) => Some(*integer as f64),
            RuntimeValue::Decimal(decimal) => Some(*decimal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RuntimeValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            RuntimeValue::Date(date) => Some(*date),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[RuntimeValue]> {
        match self {
            RuntimeValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            RuntimeValue::Null => "null",
            RuntimeValue::Text(_) => "text",
            RuntimeValue::Integer(_) => "integer",
            RuntimeValue::Decimal(_) => "decimal",
            RuntimeValue::Boolean(_) => "boolean",
            RuntimeValue::Date(_) => "date",
            RuntimeValue::List(_) => "list",
        }
    }

    /// Untyped conversion for binding literals that have no declared data type.
    ///
    /// Objects have no runtime counterpart and become `Null`.
    pub fn from_json_literal(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null | JsonValue::Object(_) => RuntimeValue::Null,
            JsonValue::Bool(flag) => RuntimeValue::Boolean(*flag),
            JsonValue::Number(number) => number_to_runtime(number),
            JsonValue::String(text) => RuntimeValue::Text(text.clone()),
            JsonValue::Array(items) => RuntimeValue::List(items.iter().map(Self::from_json_literal).collect()),
        }
    }

    /// Untyped JSON form, valid as-is for data types that need no serialization.
    /// Non-finite decimals become `null`.
    pub fn to_json_literal(&self) -> JsonValue {
        match self {
            RuntimeValue::Null => JsonValue::Null,
            RuntimeValue::Text(text) => JsonValue::String(text.clone()),
            RuntimeValue::Integer(integer) => JsonValue::from(*integer),
            RuntimeValue::Decimal(decimal) => Number::from_f64(*decimal).map(JsonValue::Number).unwrap_or(JsonValue::Null),
            RuntimeValue::Boolean(flag) => JsonValue::Bool(*flag),
            RuntimeValue::Date(date) => JsonValue::String(date.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            RuntimeValue::List(items) => JsonValue::Array(items.iter().map(Self::to_json_literal).collect()),
        }
    }
}

pub(crate) fn number_to_runtime(number: &Number) -> RuntimeValue {
    match number.as_i64() {
        Some(integer) => RuntimeValue::Integer(integer),
        None => number.as_f64().map(RuntimeValue::Decimal).unwrap_or(RuntimeValue::Null),
    }
}

impl fmt::Display for RuntimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeValue::Null => f.write_str("null"),
            RuntimeValue::Text(text) => write!(f, "\"{}\"", text),
            RuntimeValue::Integer(integer) => write!(f, "{}", integer),
            RuntimeValue::Decimal(decimal) => write!(f, "{}", decimal),
            RuntimeValue::Boolean(flag) => write!(f, "{}", flag),
            RuntimeValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%dT%H:%M:%S")),
            RuntimeValue::List(items) => {
                f.write_str("[")?;
                for (position, item) in items.iter().enumerate() {
                    if position > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for RuntimeValue {
    fn from(value: &str) -> Self {
        RuntimeValue::Text(value.to_string())
    }
}

impl From<String> for RuntimeValue {
    fn from(value: String) -> Self {
        RuntimeValue::Text(value)
    }
}

impl From<i64> for RuntimeValue {
    fn from(value: i64) -> Self {
        RuntimeValue::Integer(value)
    }
}

impl From<f64> for RuntimeValue {
    fn from(value: f64) -> Self {
        RuntimeValue::Decimal(value)
    }
}

impl From<bool> for RuntimeValue {
    fn from(value: bool) -> Self {
        RuntimeValue::Boolean(value)
    }
}

impl From<NaiveDateTime> for RuntimeValue {
    fn from(value: NaiveDateTime) -> Self {
        RuntimeValue::Date(value)
    }
}

impl From<Vec<RuntimeValue>> for RuntimeValue {
    fn from(value: Vec<RuntimeValue>) -> Self {
        RuntimeValue::List(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_literals_map_to_runtime_values() {
        let value = RuntimeValue::from_json_literal(&json!([1, 2.5, "x", true, null, {"a": 1}]));
        assert_eq!(
            value,
            RuntimeValue::List(vec![
                RuntimeValue::Integer(1),
                RuntimeValue::Decimal(2.5),
                RuntimeValue::Text("x".into()),
                RuntimeValue::Boolean(true),
                RuntimeValue::Null,
                RuntimeValue::Null,
            ])
        );
    }

    #[test]
    fn numeric_view_widens_integers() {
        assert_eq!(RuntimeValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(RuntimeValue::Text("3".into()).as_f64(), None);
    }

    #[test]
    fn display_is_compact() {
        let value = RuntimeValue::List(vec![RuntimeValue::from("a"), RuntimeValue::from(2_i64)]);
        assert_eq!(value.to_string(), "[\"a\", 2]");
    }
}
