//! Date-times. Internally a `NaiveDateTime`; externally an ISO-8601 string.
//!
//! Accepted JSON input: `2024-01-31T10:00:00[.fff]`, the same with a space
//! separator, an RFC 3339 timestamp with offset (kept as its local wall time),
//! or a bare `2024-01-31` (midnight). Output uses the configured format, which
//! a descriptor may override with a `format` setting; text in that format is
//! accepted on input too, so written values read back.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use flowtime_types::{TypeDescriptor, descriptor::DATE};
use serde_json::Value as JsonValue;

use super::{DataType, DataTypeParser, json_mismatch, type_mismatch};
use crate::{InvalidValueError, ParseError, RuntimeValue, WorkflowParser};

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

const INPUT_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses the textual forms a date may take in JSON or binding literals.
pub fn parse_date_text(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|date| date.naive_local()))
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[derive(Debug, Clone)]
pub struct DateDataType {
    output_format: String,
}

impl DateDataType {
    pub fn new(output_format: impl Into<String>) -> Self {
        Self {
            output_format: output_format.into(),
        }
    }
}

impl Default for DateDataType {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMAT)
    }
}

impl DateDataType {
    fn parse_text(&self, text: &str) -> Option<NaiveDateTime> {
        let trimmed = text.trim();
        NaiveDateTime::parse_from_str(trimmed, &self.output_format)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(trimmed, &self.output_format)
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
            .or_else(|| parse_date_text(trimmed))
    }
}

impl DataType for DateDataType {
    fn type_name(&self) -> &str {
        DATE
    }

    fn is_serialize_required(&self) -> bool {
        true
    }

    fn validate_internal_value(&self, value: &RuntimeValue) -> Result<(), InvalidValueError> {
        match value {
            RuntimeValue::Null | RuntimeValue::Date(_) => Ok(()),
            other => Err(type_mismatch(DATE, other)),
        }
    }

    fn convert_json_to_internal_value(&self, value: &JsonValue) -> Result<RuntimeValue, InvalidValueError> {
        match value {
            JsonValue::Null => Ok(RuntimeValue::Null),
            JsonValue::String(text) => self
                .parse_text(text)
                .map(RuntimeValue::Date)
                .ok_or_else(|| InvalidValueError::json(format!("text matches neither '{}' nor ISO-8601", self.output_format), value)),
            other => Err(json_mismatch(DATE, other)),
        }
    }

    fn convert_internal_to_json_value(&self, value: &RuntimeValue) -> Result<JsonValue, InvalidValueError> {
        match value {
            RuntimeValue::Null => Ok(JsonValue::Null),
            RuntimeValue::Date(date) => render_date(date, &self.output_format)
                .map(JsonValue::String)
                .map_err(|_| InvalidValueError::internal(format!("format '{}' cannot render a date", self.output_format), value)),
            other => Err(type_mismatch(DATE, other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DateParser {
    output_format: String,
}

impl DateParser {
    pub fn new(output_format: impl Into<String>) -> Self {
        Self {
            output_format: output_format.into(),
        }
    }
}

impl Default for DateParser {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMAT)
    }
}

fn render_date(date: &NaiveDateTime, format: &str) -> Result<String, std::fmt::Error> {
    let mut rendered = String::new();
    write!(rendered, "{}", date.format(format))?;
    Ok(rendered)
}

/// Rejects strftime strings chrono cannot render for a date without an offset (`%Q`, `%z`, `%Z`).
pub(crate) fn is_valid_format(format: &str) -> bool {
    let parses = chrono::format::StrftimeItems::new(format).all(|item| !matches!(item, chrono::format::Item::Error));
    parses && NaiveDate::from_ymd_opt(2024, 2, 29)
        .and_then(|date| date.and_hms_opt(13, 0, 0))
        .is_some_and(|sample| render_date(&sample, format).is_ok())
}

impl DataTypeParser for DateParser {
    fn type_name(&self) -> &str {
        DATE
    }

    fn parse(&self, descriptor: &TypeDescriptor, parser: &mut WorkflowParser<'_>) -> Option<Arc<dyn DataType>> {
        let output_format = match descriptor.setting("format") {
            None => self.output_format.clone(),
            Some(JsonValue::String(format)) if is_valid_format(format) => format.clone(),
            Some(other) => {
                parser.add_error(ParseError::InvalidSetting {
                    path: parser.location(),
                    message: format!("'format' must be a valid strftime string, found {}", other),
                });
                return None;
            }
        };
        Some(Arc::new(DateDataType::new(output_format)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn datetime(text: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn accepts_common_iso_forms() {
        assert_eq!(parse_date_text("2024-01-31T10:00:00"), Some(datetime("2024-01-31 10:00:00")));
        assert_eq!(parse_date_text("2024-01-31 10:00:00.250").map(|d| d.date()), Some(datetime("2024-01-31 00:00:00").date()));
        assert_eq!(parse_date_text("2024-01-31T10:00:00+02:00"), Some(datetime("2024-01-31 10:00:00")));
        assert_eq!(parse_date_text("2024-01-31"), Some(datetime("2024-01-31 00:00:00")));
        assert_eq!(parse_date_text("31/01/2024"), None);
    }

    #[test]
    fn converts_through_string_form() {
        let date = DateDataType::default();
        assert!(date.is_serialize_required());

        let internal = date.convert_json_to_internal_value(&json!("2024-02-29T08:30:00")).unwrap();
        assert_eq!(internal, RuntimeValue::Date(datetime("2024-02-29 08:30:00")));
        assert_eq!(date.convert_internal_to_json_value(&internal).unwrap(), json!("2024-02-29T08:30:00"));
        assert!(date.convert_json_to_internal_value(&json!(20240229)).is_err());
    }

    #[test]
    fn custom_output_format() {
        let date = DateDataType::new("%d.%m.%Y");
        let json = date.convert_internal_to_json_value(&RuntimeValue::Date(datetime("2024-02-29 08:30:00"))).unwrap();
        assert_eq!(json, json!("29.02.2024"));
        assert!(!is_valid_format("%Q"));
        assert_eq!(date.convert_json_to_internal_value(&json).unwrap(), RuntimeValue::Date(datetime("2024-02-29 00:00:00")));
    }

    #[test]
    fn custom_format_values_read_back_through_a_list() {
        let (data_type, errors) = crate::parser::parse_descriptor(&TypeDescriptor::list(
            TypeDescriptor::date().with_setting("format", "%d.%m.%Y %H:%M"),
        ));
        assert!(errors.is_empty(), "{errors:?}");
        let list = data_type.expect("list of dates");

        let internal = RuntimeValue::List(vec![RuntimeValue::Date(datetime("2024-02-29 13:00:00"))]);
        let json = list.convert_internal_to_json_value(&internal).unwrap();
        assert_eq!(json, json!(["29.02.2024 13:00"]));
        assert_eq!(list.convert_json_to_internal_value(&json).unwrap(), internal);
        assert_eq!(
            list.convert_json_to_internal_value(&json!(["2024-02-29T13:00:00"])).unwrap(),
            internal
        );
    }

    #[test]
    fn offset_specifiers_are_rejected_not_rendered() {
        assert!(!is_valid_format("%Y-%m-%dT%H:%M:%S%z"));
        assert!(!is_valid_format("%Y-%m-%d %Z"));
        assert!(!is_valid_format("%:z"));
        assert!(is_valid_format("%d.%m.%Y %H:%M"));

        let date = DateDataType::new("%Y-%m-%dT%H:%M:%S%z");
        let error = date
            .convert_internal_to_json_value(&RuntimeValue::Date(datetime("2024-02-29 13:00:00")))
            .unwrap_err();
        assert!(error.message.contains("cannot render"), "{error:?}");
    }
}
