//! # Flowtime Engine
//!
//! The Flowtime engine turns authored workflow definitions into typed, validated
//! runtime state and evaluates the temporal and conditional pieces attached to
//! them.
//!
//! ## Key Features
//!
//! - **Typed variables**: an open [`DataTypeRegistry`] maps type names to
//!   handlers that validate values and convert between JSON and [`RuntimeValue`]
//! - **Composite types**: lists of any registered type, nested to any depth
//! - **Conditions**: `equals`, `lessThan`, and friends evaluated against a scope
//! - **Timers**: relative time expressions resolved to absolute due dates
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use chrono::NaiveDateTime;
//! use flowtime_engine::{EngineSettings, ScopeInstance, parse_workflow, parse_workflow_document, resolve_timers};
//!
//! let settings = EngineSettings::default();
//! let workflow = parse_workflow_document(
//!     r#"
//! id: invoice-reminder
//! variables:
//!   - id: invoiceDate
//!     type: date
//!     defaultValue: "2024-01-31T10:00:00"
//! timers:
//!   - id: reminder
//!     dueDate:
//!       type: after
//!       duration: 1
//!       durationUnit: months
//!       base: { expression: invoiceDate }
//!       at: "9:00"
//! "#,
//!     &settings,
//! )?;
//!
//! let parsed = parse_workflow(&workflow, &settings.build_registry()?)?;
//! let scope = ScopeInstance::new(Arc::new(parsed));
//! let now = NaiveDateTime::parse_from_str("2024-01-31 12:00:00", "%Y-%m-%d %H:%M:%S")?;
//! let due_dates = resolve_timers(&scope, now);
//! let reminder = due_dates["reminder"].clone()?;
//! assert_eq!(reminder.to_string(), "2024-02-29 09:00:00");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - **`data_type`**: the [`DataType`] capability and built-in handlers
//! - **`registry`**: type name to parser table
//! - **`parser`**: parse context and [`parse_workflow`]
//! - **`scope`**: per-instance variable values
//! - **`conditions`**: comparators and condition evaluation
//! - **`timer`**: due-date resolution
//! - **`settings`** / **`document`**: configuration and file loading

pub mod bindings;
pub mod conditions;
pub mod data_type;
pub mod document;
pub mod error;
pub mod parser;
pub mod registry;
pub mod scope;
pub mod settings;
pub mod timer;
pub mod value;

pub use bindings::{resolve_binding, resolve_date_binding};
pub use conditions::{Comparator, ComparatorRegistry, evaluate_condition};
pub use data_type::{
    BooleanDataType, ChoiceDataType, DataType, DataTypeParser, DateDataType, ListDataType, NumberDataType, TextDataType,
};
pub use document::{load_workflow, parse_workflow_document, parse_workflow_file};
pub use error::{BindingError, InvalidValueError, OffendingValue, ParseError, ScopeError, TimerError, WorkflowParseErrors};
pub use parser::{ParsedVariable, ParsedWorkflow, WorkflowParser, parse_workflow};
pub use registry::DataTypeRegistry;
pub use scope::ScopeInstance;
pub use settings::{DiscriminatorPolicy, EngineSettings, SettingsError};
pub use timer::{read_relative_time, resolve_timer_due_date, resolve_timers};
pub use value::RuntimeValue;
