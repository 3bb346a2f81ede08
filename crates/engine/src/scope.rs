//! Variable values of one running workflow instance.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::{ParsedVariable, ParsedWorkflow, RuntimeValue, ScopeError};

/// Current variable values, keyed by variable id in declaration order.
///
/// Every stored value has passed its variable's data type validation.
#[derive(Debug, Clone)]
pub struct ScopeInstance {
    workflow: Arc<ParsedWorkflow>,
    values: IndexMap<String, RuntimeValue>,
}

impl ScopeInstance {
    /// New scope seeded with each variable's default value (null when none).
    pub fn new(workflow: Arc<ParsedWorkflow>) -> Self {
        let values = workflow
            .variables()
            .map(|variable| (variable.id.clone(), variable.default_value.clone().unwrap_or_default()))
            .collect();
        Self { workflow, values }
    }

    pub fn workflow(&self) -> &Arc<ParsedWorkflow> {
        &self.workflow
    }

    /// Converts `value` through the variable's data type, validates it, and stores it.
    pub fn set_variable_json(&mut self, variable_id: &str, value: &JsonValue) -> Result<(), ScopeError> {
        let variable = self.declared(variable_id)?;
        let converted = variable
            .data_type
            .convert_json_to_internal_value(value)
            .and_then(|converted| variable.data_type.validate_internal_value(&converted).map(|()| converted))
            .map_err(|source| ScopeError::InvalidValue {
                variable: variable_id.to_string(),
                source,
            })?;
        debug!(variable_id = %variable_id, value = %converted, "variable set from json");
        self.values.insert(variable_id.to_string(), converted);
        Ok(())
    }

    /// Validates an internal value against the variable's data type and stores it.
    pub fn set_variable_value(&mut self, variable_id: &str, value: RuntimeValue) -> Result<(), ScopeError> {
        let variable = self.declared(variable_id)?;
        variable
            .data_type
            .validate_internal_value(&value)
            .map_err(|source| ScopeError::InvalidValue {
                variable: variable_id.to_string(),
                source,
            })?;
        debug!(variable_id = %variable_id, value = %value, "variable set");
        self.values.insert(variable_id.to_string(), value);
        Ok(())
    }

    pub fn variable_value(&self, variable_id: &str) -> Option<&RuntimeValue> {
        self.values.get(variable_id)
    }

    /// The variable's current value in JSON form.
    ///
    /// Stored values are already validated, so types that need no serialization
    /// are exported directly.
    pub fn variable_json(&self, variable_id: &str) -> Result<JsonValue, ScopeError> {
        let variable = self.declared(variable_id)?;
        let value = self.values.get(variable_id).unwrap_or(&RuntimeValue::Null);
        if !variable.data_type.is_serialize_required() {
            return Ok(value.to_json_literal());
        }
        variable
            .data_type
            .convert_internal_to_json_value(value)
            .map_err(|source| ScopeError::InvalidValue {
                variable: variable_id.to_string(),
                source,
            })
    }

    /// All current values in JSON form, in declaration order.
    pub fn to_json(&self) -> Result<IndexMap<String, JsonValue>, ScopeError> {
        self.values
            .keys()
            .map(|variable_id| Ok((variable_id.clone(), self.variable_json(variable_id)?)))
            .collect()
    }

    fn declared(&self, variable_id: &str) -> Result<&ParsedVariable, ScopeError> {
        self.workflow
            .variable(variable_id)
            .ok_or_else(|| ScopeError::UnknownVariable(variable_id.to_string()))
    }
}
