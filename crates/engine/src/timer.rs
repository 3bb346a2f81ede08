//! Timer due-date resolution.

use chrono::NaiveDateTime;
use flowtime_types::{RelativeTime, RelativeTimeError};
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::{DiscriminatorPolicy, ScopeInstance, TimerError, resolve_date_binding};

/// Absolute due date of `expression`.
///
/// The base is the expression's `base` binding resolved against `scope`, or
/// `now` when the binding is absent or resolves to null.
pub fn resolve_timer_due_date(expression: &RelativeTime, scope: &ScopeInstance, now: NaiveDateTime) -> Result<NaiveDateTime, TimerError> {
    if !expression.valid() {
        return Err(RelativeTimeError::Invalid(expression.to_string()).into());
    }
    let base = match &expression.base {
        Some(binding) => resolve_date_binding(binding, scope)?.unwrap_or(now),
        None => now,
    };
    let due_date = expression.resolve(base)?;
    debug!(expression = %expression, base = %base, due_date = %due_date, "timer due date resolved");
    Ok(due_date)
}

/// Due dates of every timer in the scope's workflow, keyed by timer id.
pub fn resolve_timers(scope: &ScopeInstance, now: NaiveDateTime) -> IndexMap<String, Result<NaiveDateTime, TimerError>> {
    scope
        .workflow()
        .timers()
        .iter()
        .map(|timer| (timer.id.clone(), resolve_timer_due_date(&timer.due_date, scope, now)))
        .collect()
}

/// Polymorphic JSON read honouring `policy` for unknown `type` discriminators.
///
/// Under [`DiscriminatorPolicy::Ignore`] an unknown discriminator is logged and
/// reads as absent.
pub fn read_relative_time(value: &JsonValue, policy: DiscriminatorPolicy) -> Result<Option<RelativeTime>, RelativeTimeError> {
    match RelativeTime::read_json(value) {
        Err(RelativeTimeError::UnsupportedDiscriminator(discriminator)) if policy == DiscriminatorPolicy::Ignore => {
            warn!(discriminator = %discriminator, "ignoring relative time with unsupported type");
            Ok(None)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::{BindingError, DataTypeRegistry, parse_workflow};
    use flowtime_types::{Binding, NextUnit, Timer, TypeDescriptor, Variable, Workflow};
    use serde_json::json;

    fn datetime(text: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn scope() -> ScopeInstance {
        let workflow = Workflow::new()
            .with_variable(Variable::new("invoiceDate", TypeDescriptor::date()).with_default_value("2024-01-31T10:00:00"))
            .with_variable(Variable::new("paidDate", TypeDescriptor::date()))
            .with_variable(Variable::new("reference", TypeDescriptor::text()).with_default_value("INV-1"))
            .with_timer(Timer::new("reminder", RelativeTime::months(1).base(Binding::expression("invoiceDate")).at(9, 0)))
            .with_timer(Timer::new("followUp", RelativeTime::next(NextUnit::DayInWeek, 1)));
        let parsed = parse_workflow(&workflow, &DataTypeRegistry::with_defaults()).expect("valid workflow");
        ScopeInstance::new(Arc::new(parsed))
    }

    #[test]
    fn resolves_against_bound_base() {
        let scope = scope();
        let due = resolve_timer_due_date(
            &RelativeTime::months(1).base(Binding::expression("invoiceDate")).at(9, 0),
            &scope,
            datetime("2030-01-01 00:00:00"),
        )
        .unwrap();
        assert_eq!(due, datetime("2024-02-29 09:00:00"));
    }

    #[test]
    fn falls_back_to_now_for_null_or_missing_base() {
        let scope = scope();
        let now = datetime("2024-01-03 15:00:00");
        let unbound = resolve_timer_due_date(&RelativeTime::hours(2), &scope, now).unwrap();
        assert_eq!(unbound, datetime("2024-01-03 17:00:00"));

        let null_base = RelativeTime::days(1).base(Binding::expression("paidDate"));
        assert_eq!(resolve_timer_due_date(&null_base, &scope, now).unwrap(), datetime("2024-01-04 15:00:00"));
    }

    #[test]
    fn rejects_invalid_expressions_and_non_date_bases() {
        let scope = scope();
        let now = datetime("2024-01-03 15:00:00");
        let invalid = RelativeTime::next(NextUnit::MonthInYear, 13);
        assert!(matches!(
            resolve_timer_due_date(&invalid, &scope, now),
            Err(TimerError::RelativeTime(RelativeTimeError::Invalid(_)))
        ));

        let text_base = RelativeTime::days(1).base(Binding::expression("reference"));
        assert!(matches!(
            resolve_timer_due_date(&text_base, &scope, now),
            Err(TimerError::Binding(BindingError::NotADate { .. }))
        ));
    }

    #[test]
    fn resolves_every_timer_in_declaration_order() {
        let scope = scope();
        // 2024-01-03 is a Wednesday.
        let due_dates = resolve_timers(&scope, datetime("2024-01-03 15:00:00"));
        let ids: Vec<&str> = due_dates.keys().map(String::as_str).collect();
        assert_eq!(ids, ["reminder", "followUp"]);
        assert_eq!(due_dates["reminder"], Ok(datetime("2024-02-29 09:00:00")));
        assert_eq!(due_dates["followUp"], Ok(datetime("2024-01-08 15:00:00")));
    }

    #[test]
    fn unknown_discriminator_follows_policy() {
        let value = json!({"type": "before", "duration": 1, "durationUnit": "days"});
        assert_eq!(
            read_relative_time(&value, DiscriminatorPolicy::Fail),
            Err(RelativeTimeError::UnsupportedDiscriminator("before".into()))
        );
        assert_eq!(read_relative_time(&value, DiscriminatorPolicy::Ignore), Ok(None));
        assert_eq!(
            read_relative_time(&json!({"after": "2 hours"}), DiscriminatorPolicy::Ignore),
            Ok(Some(RelativeTime::hours(2)))
        );
    }
}
