//! Workflow document loading.
//!
//! Documents are YAML (JSON is accepted as a YAML subset). Timers whose due date
//! names an unsupported relative time type are rejected or dropped according to
//! [`EngineSettings::unknown_discriminator`]. Timers without a due date are dropped.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use flowtime_types::Workflow;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::{EngineSettings, ParsedWorkflow, parse_workflow, read_relative_time};

/// Parses workflow document text into its definition.
pub fn parse_workflow_document(text: &str, settings: &EngineSettings) -> Result<Workflow> {
    let mut document: JsonValue = serde_yaml::from_str(text).context("workflow document is not valid YAML or JSON")?;

    if let Some(timers) = document.get_mut("timers").and_then(JsonValue::as_array_mut) {
        let mut kept = Vec::with_capacity(timers.len());
        for timer in timers.drain(..) {
            let timer_id = timer.get("id").and_then(JsonValue::as_str).unwrap_or("<unnamed>").to_string();
            let due_date = timer.get("dueDate").unwrap_or(&JsonValue::Null);
            let has_discriminator = due_date.get("type").is_some();
            let read = read_relative_time(due_date, settings.unknown_discriminator)
                .with_context(|| format!("timer '{}' has an unreadable due date", timer_id))?;
            if read.is_none() {
                if has_discriminator {
                    warn!(timer_id = %timer_id, "timer dropped");
                } else {
                    warn!(timer_id = %timer_id, "timer has no due date; dropped");
                }
                continue;
            }
            kept.push(timer);
        }
        *timers = kept;
    }

    let workflow: Workflow = serde_json::from_value(document).context("workflow document does not match the workflow schema")?;
    debug!(
        workflow_id = workflow.id.as_deref().unwrap_or("<unnamed>"),
        variable_count = workflow.variables.len(),
        timer_count = workflow.timers.len(),
        "workflow document loaded"
    );
    Ok(workflow)
}

/// Loads a workflow definition from the filesystem.
pub fn parse_workflow_file(file_path: impl AsRef<Path>, settings: &EngineSettings) -> Result<Workflow> {
    let file_path = file_path.as_ref();
    let text = fs::read_to_string(file_path).with_context(|| format!("Failed to read workflow file: {}", file_path.display()))?;
    parse_workflow_document(&text, settings).with_context(|| format!("Failed to load workflow file: {}", file_path.display()))
}

/// Loads and parses a workflow file with the registry described by `settings`.
pub fn load_workflow(file_path: impl AsRef<Path>, settings: &EngineSettings) -> Result<ParsedWorkflow> {
    let file_path = file_path.as_ref();
    let workflow = parse_workflow_file(file_path, settings)?;
    let registry = settings.build_registry().context("invalid engine settings")?;
    parse_workflow(&workflow, &registry).with_context(|| format!("Workflow file {} is invalid", file_path.display()))
}
