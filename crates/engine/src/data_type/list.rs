//! Composite list type.
//!
//! A list holds one element data type, resolved from the descriptor's
//! `elementType` while the list itself is parsed. Validation and conversion walk
//! the elements in order, stop at the first failure, and always build a new
//! sequence with the same length and order as the input.

use std::sync::Arc;

use flowtime_types::{TypeDescriptor, descriptor::LIST};
use serde_json::Value as JsonValue;
use tracing::debug;

use super::{DataType, DataTypeParser, json_mismatch, type_mismatch};
use crate::{InvalidValueError, ParseError, RuntimeValue, WorkflowParser};

#[derive(Debug, Clone)]
pub struct ListDataType {
    element_type: Arc<dyn DataType>,
}

impl ListDataType {
    pub fn new(element_type: Arc<dyn DataType>) -> Self {
        Self { element_type }
    }
}

impl DataType for ListDataType {
    fn type_name(&self) -> &str {
        LIST
    }

    fn is_serialize_required(&self) -> bool {
        self.element_type.is_serialize_required()
    }

    fn validate_internal_value(&self, value: &RuntimeValue) -> Result<(), InvalidValueError> {
        match value {
            RuntimeValue::Null => Ok(()),
            RuntimeValue::List(items) => items.iter().try_for_each(|item| self.element_type.validate_internal_value(item)),
            other => Err(type_mismatch(LIST, other)),
        }
    }

    fn convert_json_to_internal_value(&self, value: &JsonValue) -> Result<RuntimeValue, InvalidValueError> {
        match value {
            JsonValue::Null => Ok(RuntimeValue::Null),
            JsonValue::Array(items) => items
                .iter()
                .map(|item| self.element_type.convert_json_to_internal_value(item))
                .collect::<Result<Vec<_>, _>>()
                .map(RuntimeValue::List),
            other => Err(json_mismatch(LIST, other)),
        }
    }

    fn convert_internal_to_json_value(&self, value: &RuntimeValue) -> Result<JsonValue, InvalidValueError> {
        match value {
            RuntimeValue::Null => Ok(JsonValue::Null),
            RuntimeValue::List(items) => items
                .iter()
                .map(|item| self.element_type.convert_internal_to_json_value(item))
                .collect::<Result<Vec<_>, _>>()
                .map(JsonValue::Array),
            other => Err(type_mismatch(LIST, other)),
        }
    }

    fn element_type(&self) -> Option<&Arc<dyn DataType>> {
        Some(&self.element_type)
    }
}

#[derive(Debug, Default)]
pub struct ListParser;

impl DataTypeParser for ListParser {
    fn type_name(&self) -> &str {
        LIST
    }

    fn parse(&self, descriptor: &TypeDescriptor, parser: &mut WorkflowParser<'_>) -> Option<Arc<dyn DataType>> {
        let Some(element_descriptor) = descriptor.element_type() else {
            parser.add_error(ParseError::MissingElementType {
                path: parser.location(),
                type_name: descriptor.name.clone(),
            });
            return None;
        };
        let element_type = parser.with_path("elementType", |parser| parser.parse_type(element_descriptor))?;
        debug!(path = %parser.location(), element_type = element_type.type_name(), "list element type resolved");
        Some(Arc::new(ListDataType::new(element_type)))
    }
}
