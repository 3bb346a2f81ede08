//! Data type capability and the built-in type handlers.
//!
//! A [`DataType`] is the executable form of a [`TypeDescriptor`]: it validates
//! internal values and converts between the external JSON representation and
//! [`RuntimeValue`]. Data types are produced by a [`DataTypeParser`] registered
//! in the [`DataTypeRegistry`](crate::DataTypeRegistry) under a type name.
//!
//! Parsing *is* construction. A parser resolves every nested type (through the
//! [`WorkflowParser`] context) before it returns, so a data type that exists is
//! always fully initialized. Data types are immutable afterwards and shared via
//! `Arc` across threads.
//!
//! Null is valid for every data type and converts to null in both directions.

use std::fmt;
use std::sync::Arc;

use flowtime_types::TypeDescriptor;
use serde_json::Value as JsonValue;

use crate::{InvalidValueError, RuntimeValue, WorkflowParser};

mod boolean;
mod choice;
pub(crate) mod date;
mod list;
mod number;
mod text;

pub use boolean::{BooleanDataType, BooleanParser};
pub use choice::{ChoiceDataType, ChoiceParser};
pub use date::{DEFAULT_DATE_FORMAT, DateDataType, DateParser, parse_date_text};
pub use list::{ListDataType, ListParser};
pub use number::{NumberDataType, NumberParser};
pub use text::{TextDataType, TextParser};

/// Executable data type.
pub trait DataType: fmt::Debug + Send + Sync {
    /// Registered name this data type was parsed from.
    fn type_name(&self) -> &str;

    /// True when JSON and internal forms differ and values must pass through the
    /// conversion functions. Composites report true when any element type does.
    /// When false, [`RuntimeValue::to_json_literal`] is a valid export.
    fn is_serialize_required(&self) -> bool;

    /// Checks a non-null internal value against this type. Null always passes.
    fn validate_internal_value(&self, value: &RuntimeValue) -> Result<(), InvalidValueError>;

    fn convert_json_to_internal_value(&self, value: &JsonValue) -> Result<RuntimeValue, InvalidValueError>;

    fn convert_internal_to_json_value(&self, value: &RuntimeValue) -> Result<JsonValue, InvalidValueError>;

    /// Element type of a composite; `None` for scalar types.
    fn element_type(&self) -> Option<&Arc<dyn DataType>> {
        None
    }
}

/// Constructor registered for one type name.
pub trait DataTypeParser: Send + Sync {
    fn type_name(&self) -> &str;

    /// Builds a fully initialized data type from `descriptor`.
    ///
    /// Problems are reported through `parser` and yield `None`; parsing of the
    /// surrounding workflow continues.
    fn parse(&self, descriptor: &TypeDescriptor, parser: &mut WorkflowParser<'_>) -> Option<Arc<dyn DataType>>;
}

pub(crate) fn type_mismatch(type_name: &str, value: &RuntimeValue) -> InvalidValueError {
    InvalidValueError::internal(format!("expected a {} value but found {}", type_name, value.kind_name()), value)
}

pub(crate) fn json_mismatch(type_name: &str, value: &JsonValue) -> InvalidValueError {
    InvalidValueError::json(format!("cannot convert JSON to {}", type_name), value)
}
