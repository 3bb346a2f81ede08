//! Error types raised by data types, workflow parsing, scopes, and timers.

use flowtime_types::RelativeTimeError;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::RuntimeValue;

/// The value a data type rejected, in whichever representation was being handled.
#[derive(Debug, Clone, PartialEq)]
pub enum OffendingValue {
    Json(JsonValue),
    Internal(RuntimeValue),
}

impl std::fmt::Display for OffendingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OffendingValue::Json(value) => write!(f, "{}", value),
            OffendingValue::Internal(value) => write!(f, "{}", value),
        }
    }
}

/// A value does not conform to its data type, or cannot be converted between representations.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}: {value}")]
pub struct InvalidValueError {
    pub message: String,
    pub value: OffendingValue,
}

impl InvalidValueError {
    pub fn internal(message: impl Into<String>, value: &RuntimeValue) -> Self {
        Self {
            message: message.into(),
            value: OffendingValue::Internal(value.clone()),
        }
    }

    pub fn json(message: impl Into<String>, value: &JsonValue) -> Self {
        Self {
            message: message.into(),
            value: OffendingValue::Json(value.clone()),
        }
    }
}

/// Problems found while turning a workflow definition into a parsed workflow.
///
/// These are collected rather than returned one at a time so authors see every
/// problem in a single pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("{path}: unknown data type '{type_name}'")]
    UnknownType { path: String, type_name: String },

    #[error("{path}: data type '{type_name}' requires an 'elementType'")]
    MissingElementType { path: String, type_name: String },

    #[error("{path}: {message}")]
    InvalidSetting { path: String, message: String },

    #[error("{path}: invalid default value: {source}")]
    InvalidDefault {
        path: String,
        #[source]
        source: InvalidValueError,
    },

    #[error("{path}: {message}")]
    InvalidTimer { path: String, message: String },

    #[error("variable '{id}' is declared more than once")]
    DuplicateVariable { id: String },
}

/// Every problem reported while parsing one workflow.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", format_parse_errors(.errors))]
pub struct WorkflowParseErrors {
    pub errors: Vec<ParseError>,
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    let mut message = format!("workflow has {} problem(s):", errors.len());
    for error in errors {
        message.push_str("\n  - ");
        message.push_str(&error.to_string());
    }
    message
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScopeError {
    #[error("variable '{0}' is not declared in this workflow")]
    UnknownVariable(String),

    #[error("variable '{variable}': {source}")]
    InvalidValue {
        variable: String,
        #[source]
        source: InvalidValueError,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindingError {
    #[error("binding '{binding}' does not resolve to a date (found {found})")]
    NotADate { binding: String, found: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimerError {
    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    RelativeTime(#[from] RelativeTimeError),
}
