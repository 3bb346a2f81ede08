//! Bindings: references that resolve to a concrete value at execution time.
//!
//! A binding carries either a literal JSON value or an expression naming a
//! workflow variable (optionally followed by list indexes, e.g. `reminders.0`).
//! When both are present the expression wins and the literal acts as a fallback.
//!
//! In attribute form a binding is a single string: expressions use the
//! `${{ ... }}` template wrapper and anything else is a literal text value.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    /// Literal value used when no expression is set or the expression resolves to nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<JsonValue>,
    /// Variable reference such as `dueDate` or `reminders.2`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

impl Binding {
    /// Binding to a literal value.
    pub fn value(value: impl Into<JsonValue>) -> Self {
        Self {
            value: Some(value.into()),
            expression: None,
        }
    }

    /// Binding to a variable expression.
    pub fn expression(expression: impl Into<String>) -> Self {
        Self {
            value: None,
            expression: Some(expression.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.expression.is_none()
    }

    /// The variable id an expression binding starts from (`reminders` for `reminders.2`).
    pub fn variable_id(&self) -> Option<&str> {
        let expression = self.expression.as_deref()?;
        expression.split('.').next().filter(|segment| !segment.is_empty())
    }

    /// Decodes the attribute form. Blank input yields `None`.
    pub fn from_attribute(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Some(stripped) = trimmed.strip_prefix("${{") {
            let inner = stripped.trim();
            let inner = inner.strip_suffix("}}").unwrap_or(inner).trim();
            if inner.is_empty() {
                return None;
            }
            return Some(Self::expression(inner));
        }
        Some(Self::value(JsonValue::String(trimmed.to_string())))
    }

    /// Encodes the attribute form. Non-string literals are written as their JSON text.
    pub fn to_attribute(&self) -> Option<String> {
        if let Some(expression) = &self.expression {
            return Some(format!("${{{{ {} }}}}", expression));
        }
        match self.value.as_ref()? {
            JsonValue::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}
