//! Workflow parsing: turns an authored [`Workflow`] into a [`ParsedWorkflow`].
//!
//! [`WorkflowParser`] is the context handed to every data type parser. It gives
//! access to the registry for nested types, tracks the current location as a
//! dotted path (`variables.notices.type.elementType`), and collects problems so
//! one pass reports everything wrong with a definition.

use std::collections::HashSet;
use std::sync::Arc;

use flowtime_types::descriptor::DATE;
use flowtime_types::{Timer, TypeDescriptor, Workflow};
use indexmap::IndexMap;
use tracing::debug;

use crate::data_type::DataType;
use crate::{DataTypeRegistry, ParseError, RuntimeValue, WorkflowParseErrors};

pub struct WorkflowParser<'r> {
    registry: &'r DataTypeRegistry,
    errors: Vec<ParseError>,
    path: Vec<String>,
}

impl<'r> WorkflowParser<'r> {
    pub fn new(registry: &'r DataTypeRegistry) -> Self {
        Self {
            registry,
            errors: Vec::new(),
            path: Vec::new(),
        }
    }

    pub fn registry(&self) -> &'r DataTypeRegistry {
        self.registry
    }

    /// Resolves a (possibly nested) type descriptor through the registry.
    pub fn parse_type(&mut self, descriptor: &TypeDescriptor) -> Option<Arc<dyn DataType>> {
        let registry = self.registry;
        registry.instantiate(descriptor, self)
    }

    pub fn add_error(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    /// Current location as a dotted path.
    pub fn location(&self) -> String {
        self.path.join(".")
    }

    /// Runs `parse` with `segment` appended to the location.
    pub fn with_path<T>(&mut self, segment: impl Into<String>, parse: impl FnOnce(&mut Self) -> T) -> T {
        self.path.push(segment.into());
        let result = parse(self);
        self.path.pop();
        result
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }
}

#[derive(Debug, Clone)]
pub struct ParsedVariable {
    pub id: String,
    pub data_type: Arc<dyn DataType>,
    /// Default value already converted and validated.
    pub default_value: Option<RuntimeValue>,
}

/// A workflow whose variable types are resolved and whose timers are known to be valid.
#[derive(Debug, Clone)]
pub struct ParsedWorkflow {
    definition: Workflow,
    variables: IndexMap<String, ParsedVariable>,
}

impl ParsedWorkflow {
    pub fn id(&self) -> Option<&str> {
        self.definition.id.as_deref()
    }

    pub fn definition(&self) -> &Workflow {
        &self.definition
    }

    pub fn variable(&self, id: &str) -> Option<&ParsedVariable> {
        self.variables.get(id)
    }

    pub fn variables(&self) -> impl Iterator<Item = &ParsedVariable> {
        self.variables.values()
    }

    pub fn timer(&self, id: &str) -> Option<&Timer> {
        self.definition.timer(id)
    }

    pub fn timers(&self) -> &[Timer] {
        &self.definition.timers
    }
}

/// Parses `workflow` against `registry`, reporting every problem found.
pub fn parse_workflow(workflow: &Workflow, registry: &DataTypeRegistry) -> Result<ParsedWorkflow, WorkflowParseErrors> {
    let mut parser = WorkflowParser::new(registry);
    let mut variables = IndexMap::new();
    let mut seen = HashSet::new();

    for (position, variable) in workflow.variables.iter().enumerate() {
        if variable.id.trim().is_empty() {
            parser.add_error(ParseError::InvalidSetting {
                path: format!("variables[{}]", position),
                message: "variable id must not be empty".to_string(),
            });
            continue;
        }
        if !seen.insert(variable.id.as_str()) {
            parser.add_error(ParseError::DuplicateVariable { id: variable.id.clone() });
            continue;
        }

        let parsed = parser.with_path(format!("variables.{}", variable.id), |parser| {
            let data_type = parser.with_path("type", |parser| parser.parse_type(&variable.r#type))?;
            let default_value = match &variable.default_value {
                None => None,
                Some(json) => {
                    let converted = data_type
                        .convert_json_to_internal_value(json)
                        .and_then(|value| data_type.validate_internal_value(&value).map(|()| value));
                    match converted {
                        Ok(value) => Some(value),
                        Err(source) => {
                            parser.with_path("defaultValue", |parser| {
                                parser.add_error(ParseError::InvalidDefault {
                                    path: parser.location(),
                                    source,
                                })
                            });
                            return None;
                        }
                    }
                }
            };
            Some(ParsedVariable {
                id: variable.id.clone(),
                data_type,
                default_value,
            })
        });

        if let Some(parsed) = parsed {
            debug!(variable_id = %parsed.id, data_type = parsed.data_type.type_name(), "variable parsed");
            variables.insert(parsed.id.clone(), parsed);
        }
    }

    let mut timer_ids = HashSet::new();
    for timer in &workflow.timers {
        let path = format!("timers.{}.dueDate", timer.id);
        if !timer_ids.insert(timer.id.as_str()) {
            parser.add_error(ParseError::InvalidTimer {
                path,
                message: format!("timer '{}' is declared more than once", timer.id),
            });
            continue;
        }
        if !timer.due_date.valid() {
            parser.add_error(ParseError::InvalidTimer {
                path,
                message: format!("relative time '{}' is not valid", timer.due_date),
            });
            continue;
        }
        let Some(expression) = timer.due_date.base.as_ref().and_then(|base| base.expression.as_deref()) else {
            continue;
        };
        let mut segments = expression.trim().split('.');
        let variable_id = segments.next().unwrap_or_default();
        if workflow.variable(variable_id).is_none() {
            parser.add_error(ParseError::InvalidTimer {
                path: format!("{}.base", path),
                message: format!("base refers to undeclared variable '{}'", variable_id),
            });
            continue;
        }
        // Variables whose type failed to parse are already reported.
        let Some(variable) = variables.get(variable_id) else {
            continue;
        };
        if let Err(found) = base_value_type(&variable.data_type, segments) {
            parser.add_error(ParseError::InvalidTimer {
                path: format!("{}.base", path),
                message: format!("base '{}' must resolve to a date, found {}", expression.trim(), found),
            });
        }
    }

    if parser.has_errors() {
        let errors = parser.into_errors();
        debug!(workflow_id = workflow.id.as_deref().unwrap_or("<unnamed>"), error_count = errors.len(), "workflow rejected");
        return Err(WorkflowParseErrors { errors });
    }

    debug!(
        workflow_id = workflow.id.as_deref().unwrap_or("<unnamed>"),
        variable_count = variables.len(),
        timer_count = workflow.timers.len(),
        "workflow parsed"
    );
    Ok(ParsedWorkflow {
        definition: workflow.clone(),
        variables,
    })
}

/// Follows list index segments from a variable's type; `Err` names the type reached when it is not a date.
fn base_value_type<'s>(data_type: &Arc<dyn DataType>, segments: impl Iterator<Item = &'s str>) -> Result<(), String> {
    let mut current = data_type;
    for segment in segments {
        current = match (segment.parse::<usize>(), current.element_type()) {
            (Ok(_), Some(element_type)) => element_type,
            _ => return Err(format!("{} indexed by '{}'", current.type_name(), segment)),
        };
    }
    if current.type_name() == DATE {
        Ok(())
    } else {
        Err(current.type_name().to_string())
    }
}

/// Parses a standalone descriptor at location `value` against the default registry.
#[cfg(test)]
pub(crate) fn parse_descriptor(descriptor: &TypeDescriptor) -> (Option<Arc<dyn DataType>>, Vec<ParseError>) {
    let registry = DataTypeRegistry::with_defaults();
    let mut parser = WorkflowParser::new(&registry);
    let data_type = parser.with_path("value", |parser| parser.parse_type(descriptor));
    (data_type, parser.into_errors())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowtime_types::{Binding, RelativeTime, Variable};
    use serde_json::json;

    fn registry() -> DataTypeRegistry {
        DataTypeRegistry::with_defaults()
    }

    #[test]
    fn parses_variables_and_converts_defaults() {
        let workflow = Workflow::new()
            .with_id("renewals")
            .with_variable(Variable::new("start", TypeDescriptor::date()).with_default_value("2024-01-31T00:00:00"))
            .with_variable(Variable::new("notices", TypeDescriptor::list(TypeDescriptor::date())).with_default_value(json!([])))
            .with_timer(Timer::new("renewal", RelativeTime::months(1).base(Binding::expression("start"))));

        let parsed = parse_workflow(&workflow, &registry()).expect("valid workflow");
        let ids: Vec<&str> = parsed.variables().map(|variable| variable.id.as_str()).collect();
        assert_eq!(ids, ["start", "notices"]);
        assert!(matches!(
            parsed.variable("start").and_then(|v| v.default_value.clone()),
            Some(RuntimeValue::Date(_))
        ));
        assert_eq!(parsed.variable("notices").and_then(|v| v.default_value.clone()), Some(RuntimeValue::List(Vec::new())));
        assert_eq!(parsed.timers().len(), 1);
    }

    #[test]
    fn reports_every_problem_in_one_pass() {
        let workflow = Workflow::new()
            .with_variable(Variable::new("amount", TypeDescriptor::named("money")))
            .with_variable(Variable::new("tags", TypeDescriptor::list(TypeDescriptor::named("tag"))))
            .with_variable(Variable::new("count", TypeDescriptor::number()).with_default_value("three"))
            .with_variable(Variable::new("count", TypeDescriptor::number()))
            .with_timer(Timer::new("bad", RelativeTime::next(flowtime_types::NextUnit::DayInWeek, 9)))
            .with_timer(Timer::new("orphan", RelativeTime::days(1).base(Binding::expression("missing"))));

        let errors = parse_workflow(&workflow, &registry()).expect_err("invalid workflow").errors;
        assert_eq!(errors.len(), 6, "{errors:#?}");
        assert_eq!(
            errors[0],
            ParseError::UnknownType {
                path: "variables.amount.type".into(),
                type_name: "money".into()
            }
        );
        assert_eq!(
            errors[1],
            ParseError::UnknownType {
                path: "variables.tags.type.elementType".into(),
                type_name: "tag".into()
            }
        );
        assert!(matches!(&errors[2], ParseError::InvalidDefault { path, .. } if path == "variables.count.defaultValue"));
        assert_eq!(errors[3], ParseError::DuplicateVariable { id: "count".into() });
        assert!(matches!(&errors[4], ParseError::InvalidTimer { path, .. } if path == "timers.bad.dueDate"));
        assert!(matches!(&errors[5], ParseError::InvalidTimer { path, message } if path == "timers.orphan.dueDate.base" && message.contains("missing")));
    }

    #[test]
    fn default_must_validate_not_just_convert() {
        let workflow = Workflow::new().with_variable(Variable::new("priority", TypeDescriptor::choice(["low", "high"])).with_default_value("urgent"));
        let errors = parse_workflow(&workflow, &registry()).unwrap_err().errors;
        assert!(matches!(errors.as_slice(), [ParseError::InvalidDefault { .. }]));
    }

    #[test]
    fn timer_base_must_be_a_date_variable() {
        let workflow = Workflow::new()
            .with_variable(Variable::new("amount", TypeDescriptor::number()))
            .with_variable(Variable::new("reminders", TypeDescriptor::list(TypeDescriptor::date())))
            .with_variable(Variable::new("invoiceDate", TypeDescriptor::date()))
            .with_timer(Timer::new("byAmount", RelativeTime::days(1).base(Binding::expression("amount"))))
            .with_timer(Timer::new("byList", RelativeTime::days(1).base(Binding::expression("reminders"))))
            .with_timer(Timer::new("byDate", RelativeTime::days(1).base(Binding::expression("invoiceDate.0"))))
            .with_timer(Timer::new("byElement", RelativeTime::days(1).base(Binding::expression("reminders.1"))))
            .with_timer(Timer::new("byLiteral", RelativeTime::days(1).base(Binding::value("2024-01-31T00:00:00"))));

        let errors = parse_workflow(&workflow, &registry()).expect_err("non-date bases").errors;
        let paths: Vec<&str> = errors
            .iter()
            .map(|error| match error {
                ParseError::InvalidTimer { path, .. } => path.as_str(),
                other => panic!("unexpected error {other:?}"),
            })
            .collect();
        assert_eq!(paths, ["timers.byAmount.dueDate.base", "timers.byList.dueDate.base", "timers.byDate.dueDate.base"]);
        assert!(matches!(&errors[0], ParseError::InvalidTimer { message, .. } if message.contains("found number")));
    }

    #[test]
    fn location_tracks_nested_segments() {
        let registry = registry();
        let mut parser = WorkflowParser::new(&registry);
        let inner = parser.with_path("variables.a", |parser| parser.with_path("type", |parser| parser.location()));
        assert_eq!(inner, "variables.a.type");
        assert_eq!(parser.location(), "");
    }
}
