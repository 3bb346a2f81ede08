//! Free text, optionally constrained by a `pattern` (whole-value regex) and a `maxLength` in characters.

use std::sync::Arc;

use flowtime_types::{TypeDescriptor, descriptor::TEXT};
use regex::Regex;
use serde_json::Value as JsonValue;

use super::{DataType, DataTypeParser, json_mismatch, type_mismatch};
use crate::{InvalidValueError, ParseError, RuntimeValue, WorkflowParser};

#[derive(Debug, Clone, Default)]
pub struct TextDataType {
    pattern: Option<Regex>,
    max_length: Option<usize>,
}

impl TextDataType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub(crate) fn check_text(&self, text: &str, value: &RuntimeValue) -> Result<(), InvalidValueError> {
        if let Some(max_length) = self.max_length {
            let length = text.chars().count();
            if length > max_length {
                return Err(InvalidValueError::internal(
                    format!("text is {} characters long, at most {} allowed", length, max_length),
                    value,
                ));
            }
        }
        if let Some(pattern) = &self.pattern
            && !pattern.is_match(text)
        {
            return Err(InvalidValueError::internal(format!("text does not match pattern '{}'", pattern.as_str()), value));
        }
        Ok(())
    }
}

impl DataType for TextDataType {
    fn type_name(&self) -> &str {
        TEXT
    }

    fn is_serialize_required(&self) -> bool {
        false
    }

    fn validate_internal_value(&self, value: &RuntimeValue) -> Result<(), InvalidValueError> {
        match value {
            RuntimeValue::Null => Ok(()),
            RuntimeValue::Text(text) => self.check_text(text, value),
            other => Err(type_mismatch(TEXT, other)),
        }
    }

    fn convert_json_to_internal_value(&self, value: &JsonValue) -> Result<RuntimeValue, InvalidValueError> {
        match value {
            JsonValue::Null => Ok(RuntimeValue::Null),
            JsonValue::String(text) => Ok(RuntimeValue::Text(text.clone())),
            other => Err(json_mismatch(TEXT, other)),
        }
    }

    fn convert_internal_to_json_value(&self, value: &RuntimeValue) -> Result<JsonValue, InvalidValueError> {
        match value {
            RuntimeValue::Null => Ok(JsonValue::Null),
            RuntimeValue::Text(text) => Ok(JsonValue::String(text.clone())),
            other => Err(type_mismatch(TEXT, other)),
        }
    }
}

#[derive(Debug, Default)]
pub struct TextParser;

impl DataTypeParser for TextParser {
    fn type_name(&self) -> &str {
        TEXT
    }

    fn parse(&self, descriptor: &TypeDescriptor, parser: &mut WorkflowParser<'_>) -> Option<Arc<dyn DataType>> {
        let mut data_type = TextDataType::new();
        let mut valid = true;

        match descriptor.setting("pattern") {
            None => {}
            Some(JsonValue::String(source)) => match Regex::new(&format!("^(?:{})$", source)) {
                Ok(pattern) => data_type = data_type.with_pattern(pattern),
                Err(error) => {
                    valid = false;
                    parser.add_error(ParseError::InvalidSetting {
                        path: parser.location(),
                        message: format!("invalid 'pattern': {}", error),
                    });
                }
            },
            Some(_) => {
                valid = false;
                parser.add_error(ParseError::InvalidSetting {
                    path: parser.location(),
                    message: "'pattern' must be a string".to_string(),
                });
            }
        }

        match descriptor.setting("maxLength") {
            None => {}
            Some(setting) => match setting.as_u64().and_then(|length| usize::try_from(length).ok()) {
                Some(max_length) => data_type = data_type.with_max_length(max_length),
                None => {
                    valid = false;
                    parser.add_error(ParseError::InvalidSetting {
                        path: parser.location(),
                        message: format!("'maxLength' must be a non-negative integer, found {}", setting),
                    });
                }
            },
        }

        valid.then(|| Arc::new(data_type) as Arc<dyn DataType>)
    }
}
