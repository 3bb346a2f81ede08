//! Numbers keep their integer-ness: JSON integers stay `Integer`, everything else is `Decimal`.

use std::sync::Arc;

use flowtime_types::{TypeDescriptor, descriptor::NUMBER};
use serde_json::{Number, Value as JsonValue};

use super::{DataType, DataTypeParser, json_mismatch, type_mismatch};
use crate::value::number_to_runtime;
use crate::{InvalidValueError, RuntimeValue, WorkflowParser};

#[derive(Debug, Clone, Copy, Default)]
pub struct NumberDataType;

impl DataType for NumberDataType {
    fn type_name(&self) -> &str {
        NUMBER
    }

    fn is_serialize_required(&self) -> bool {
        false
    }

    fn validate_internal_value(&self, value: &RuntimeValue) -> Result<(), InvalidValueError> {
        match value {
            RuntimeValue::Null | RuntimeValue::Integer(_) => Ok(()),
            RuntimeValue::Decimal(decimal) if decimal.is_finite() => Ok(()),
            RuntimeValue::Decimal(_) => Err(InvalidValueError::internal("number must be finite", value)),
            other => Err(type_mismatch(NUMBER, other)),
        }
    }

    fn convert_json_to_internal_value(&self, value: &JsonValue) -> Result<RuntimeValue, InvalidValueError> {
        match value {
            JsonValue::Null => Ok(RuntimeValue::Null),
            JsonValue::Number(number) => match number_to_runtime(number) {
                RuntimeValue::Null => Err(json_mismatch(NUMBER, value)),
                converted => Ok(converted),
            },
            other => Err(json_mismatch(NUMBER, other)),
        }
    }

    fn convert_internal_to_json_value(&self, value: &RuntimeValue) -> Result<JsonValue, InvalidValueError> {
        match value {
            RuntimeValue::Null => Ok(JsonValue::Null),
            RuntimeValue::Integer(integer) => Ok(JsonValue::from(*integer)),
            RuntimeValue::Decimal(decimal) => Number::from_f64(*decimal)
                .map(JsonValue::Number)
                .ok_or_else(|| InvalidValueError::internal("number must be finite", value)),
            other => Err(type_mismatch(NUMBER, other)),
        }
    }
}

#[derive(Debug, Default)]
pub struct NumberParser;

impl DataTypeParser for NumberParser {
    fn type_name(&self) -> &str {
        NUMBER
    }

    fn parse(&self, _descriptor: &TypeDescriptor, _parser: &mut WorkflowParser<'_>) -> Option<Arc<dyn DataType>> {
        Some(Arc::new(NumberDataType))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integers_and_decimals_survive_conversion() {
        let number = NumberDataType;
        assert_eq!(number.convert_json_to_internal_value(&json!(7)).unwrap(), RuntimeValue::Integer(7));
        assert_eq!(number.convert_json_to_internal_value(&json!(7.25)).unwrap(), RuntimeValue::Decimal(7.25));
        assert_eq!(number.convert_internal_to_json_value(&RuntimeValue::Integer(7)).unwrap(), json!(7));
        assert!(number.convert_json_to_internal_value(&json!("7")).is_err());
    }

    #[test]
    fn rejects_non_finite_decimals() {
        let number = NumberDataType;
        assert!(number.validate_internal_value(&RuntimeValue::Decimal(f64::NAN)).is_err());
        assert!(number.convert_internal_to_json_value(&RuntimeValue::Decimal(f64::INFINITY)).is_err());
        assert!(number.validate_internal_value(&RuntimeValue::Null).is_ok());
    }
}
