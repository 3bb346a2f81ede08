//! Text restricted to the descriptor's `options` list.

use std::sync::Arc;

use flowtime_types::{TypeDescriptor, descriptor::CHOICE};
use serde_json::Value as JsonValue;

use super::{DataType, DataTypeParser, json_mismatch, type_mismatch};
use crate::{InvalidValueError, ParseError, RuntimeValue, WorkflowParser};

#[derive(Debug, Clone)]
pub struct ChoiceDataType {
    options: Vec<String>,
}

impl ChoiceDataType {
    pub fn new(options: Vec<String>) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }
}

impl DataType for ChoiceDataType {
    fn type_name(&self) -> &str {
        CHOICE
    }

    fn is_serialize_required(&self) -> bool {
        false
    }

    fn validate_internal_value(&self, value: &RuntimeValue) -> Result<(), InvalidValueError> {
        match value {
            RuntimeValue::Null => Ok(()),
            RuntimeValue::Text(text) if self.options.iter().any(|option| option == text) => Ok(()),
            RuntimeValue::Text(_) => Err(InvalidValueError::internal(
                format!("value is not one of the options [{}]", self.options.join(", ")),
                value,
            )),
            other => Err(type_mismatch(CHOICE, other)),
        }
    }

    fn convert_json_to_internal_value(&self, value: &JsonValue) -> Result<RuntimeValue, InvalidValueError> {
        match value {
            JsonValue::Null => Ok(RuntimeValue::Null),
            JsonValue::String(text) => Ok(RuntimeValue::Text(text.clone())),
            other => Err(json_mismatch(CHOICE, other)),
        }
    }

    fn convert_internal_to_json_value(&self, value: &RuntimeValue) -> Result<JsonValue, InvalidValueError> {
        match value {
            RuntimeValue::Null => Ok(JsonValue::Null),
            RuntimeValue::Text(text) => Ok(JsonValue::String(text.clone())),
            other => Err(type_mismatch(CHOICE, other)),
        }
    }
}

#[derive(Debug, Default)]
pub struct ChoiceParser;

impl DataTypeParser for ChoiceParser {
    fn type_name(&self) -> &str {
        CHOICE
    }

    fn parse(&self, descriptor: &TypeDescriptor, parser: &mut WorkflowParser<'_>) -> Option<Arc<dyn DataType>> {
        let options: Option<Vec<String>> = descriptor
            .setting("options")
            .and_then(JsonValue::as_array)
            .and_then(|items| items.iter().map(|item| item.as_str().map(str::to_string)).collect());

        match options {
            Some(options) if !options.is_empty() => Some(Arc::new(ChoiceDataType::new(options))),
            _ => {
                parser.add_error(ParseError::InvalidSetting {
                    path: parser.location(),
                    message: "'choice' requires a non-empty 'options' list of strings".to_string(),
                });
                None
            }
        }
    }
}
