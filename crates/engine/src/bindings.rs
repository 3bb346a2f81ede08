//! Binding resolution against a scope.
//!
//! An expression names a variable and may index into list values with further
//! dot segments (`reminders.0`). A non-null expression result wins; otherwise
//! the literal value is used; otherwise the binding resolves to null.

use chrono::NaiveDateTime;
use flowtime_types::Binding;
use tracing::debug;

use crate::data_type::parse_date_text;
use crate::{BindingError, RuntimeValue, ScopeInstance};

pub fn resolve_binding(binding: &Binding, scope: &ScopeInstance) -> RuntimeValue {
    let from_expression = binding
        .expression
        .as_deref()
        .map(|expression| resolve_expression(expression, scope))
        .unwrap_or_default();
    if !from_expression.is_null() {
        return from_expression;
    }
    binding.value.as_ref().map(RuntimeValue::from_json_literal).unwrap_or_default()
}

/// Resolves a binding that must yield a date. Null resolves to `Ok(None)`;
/// text is accepted when it parses as an ISO-8601 date.
pub fn resolve_date_binding(binding: &Binding, scope: &ScopeInstance) -> Result<Option<NaiveDateTime>, BindingError> {
    match resolve_binding(binding, scope) {
        RuntimeValue::Null => Ok(None),
        RuntimeValue::Date(date) => Ok(Some(date)),
        RuntimeValue::Text(text) => parse_date_text(&text).map(Some).ok_or_else(|| not_a_date(binding, "text")),
        other => Err(not_a_date(binding, other.kind_name())),
    }
}

fn not_a_date(binding: &Binding, found: &str) -> BindingError {
    let described = binding
        .to_attribute()
        .unwrap_or_else(|| "<empty>".to_string());
    BindingError::NotADate {
        binding: described,
        found: found.to_string(),
    }
}

fn resolve_expression(expression: &str, scope: &ScopeInstance) -> RuntimeValue {
    let mut segments = expression.trim().split('.');
    let Some(variable_id) = segments.next() else {
        return RuntimeValue::Null;
    };
    let Some(mut current) = scope.variable_value(variable_id) else {
        debug!(expression = %expression, "binding refers to an unknown variable");
        return RuntimeValue::Null;
    };
    for segment in segments {
        let element = segment
            .parse::<usize>()
            .ok()
            .and_then(|index| current.as_list().and_then(|items| items.get(index)));
        match element {
            Some(element) => current = element,
            None => {
                debug!(expression = %expression, segment = %segment, "binding segment did not resolve");
                return RuntimeValue::Null;
            }
        }
    }
    current.clone()
}
