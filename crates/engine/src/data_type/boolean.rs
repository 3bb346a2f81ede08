use std::sync::Arc;

use flowtime_types::{TypeDescriptor, descriptor::BOOLEAN};
use serde_json::Value as JsonValue;

use super::{DataType, DataTypeParser, json_mismatch, type_mismatch};
use crate::{InvalidValueError, RuntimeValue, WorkflowParser};

#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanDataType;

impl DataType for BooleanDataType {
    fn type_name(&self) -> &str {
        BOOLEAN
    }

    fn is_serialize_required(&self) -> bool {
        false
    }

    fn validate_internal_value(&self, value: &RuntimeValue) -> Result<(), InvalidValueError> {
        match value {
            RuntimeValue::Null | RuntimeValue::Boolean(_) => Ok(()),
            other => Err(type_mismatch(BOOLEAN, other)),
        }
    }

    fn convert_json_to_internal_value(&self, value: &JsonValue) -> Result<RuntimeValue, InvalidValueError> {
        match value {
            JsonValue::Null => Ok(RuntimeValue::Null),
            JsonValue::Bool(flag) => Ok(RuntimeValue::Boolean(*flag)),
            other => Err(json_mismatch(BOOLEAN, other)),
        }
    }

    fn convert_internal_to_json_value(&self, value: &RuntimeValue) -> Result<JsonValue, InvalidValueError> {
        match value {
            RuntimeValue::Null => Ok(JsonValue::Null),
            RuntimeValue::Boolean(flag) => Ok(JsonValue::Bool(*flag)),
            other => Err(type_mismatch(BOOLEAN, other)),
        }
    }
}

#[derive(Debug, Default)]
pub struct BooleanParser;

impl DataTypeParser for BooleanParser {
    fn type_name(&self) -> &str {
        BOOLEAN
    }

    fn parse(&self, _descriptor: &TypeDescriptor, _parser: &mut WorkflowParser<'_>) -> Option<Arc<dyn DataType>> {
        Some(Arc::new(BooleanDataType))
    }
}
