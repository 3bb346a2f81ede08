//! Workflow definition carrier shared by the engine and CLI.
//!
//! These types hold authoring data only. Variable type descriptors are resolved
//! into executable data types by the engine's parser; nothing here validates.
//! Field order follows authoring order via `IndexMap`/`Vec` so diagnostics can
//! point at entries in the order they were written.

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{RelativeTime, TypeDescriptor};

/// Authored workflow definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    /// Canonical identifier used for lookups and logs.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Identifier of the workflow this one was copied or versioned from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_workflow_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    /// Free-form authoring properties, preserved in order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, JsonValue>,
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub timers: Vec<Timer>,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_source_workflow_id(mut self, source_workflow_id: impl Into<String>) -> Self {
        self.source_workflow_id = Some(source_workflow_id.into());
        self
    }

    pub fn with_create_time(mut self, create_time: NaiveDateTime) -> Self {
        self.create_time = Some(create_time);
        self
    }

    pub fn with_creator_id(mut self, creator_id: impl Into<String>) -> Self {
        self.creator_id = Some(creator_id.into());
        self
    }

    pub fn with_organization_id(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn with_timer(mut self, timer: Timer) -> Self {
        self.timers.push(timer);
        self
    }

    pub fn variable(&self, id: &str) -> Option<&Variable> {
        self.variables.iter().find(|variable| variable.id == id)
    }

    pub fn timer(&self, id: &str) -> Option<&Timer> {
        self.timers.iter().find(|timer| timer.id == id)
    }
}

/// Declared workflow variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub id: String,
    #[serde(rename = "type")]
    pub r#type: TypeDescriptor,
    /// Initial value in JSON form; converted through the variable's data type at parse time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Variable {
    pub fn new(id: impl Into<String>, r#type: TypeDescriptor) -> Self {
        Self {
            id: id.into(),
            r#type,
            default_value: None,
            description: None,
        }
    }

    pub fn with_default_value(mut self, default_value: impl Into<JsonValue>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Named timer whose due date is a relative time expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    pub id: String,
    pub due_date: RelativeTime,
}

impl Timer {
    pub fn new(id: impl Into<String>, due_date: RelativeTime) -> Self {
        Self { id: id.into(), due_date }
    }
}
