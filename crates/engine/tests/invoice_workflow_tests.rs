use std::sync::Arc;

use chrono::NaiveDateTime;
use flowtime_engine::{
    EngineSettings, ScopeInstance, evaluate_condition, parse_workflow, parse_workflow_document, resolve_timers,
};
use flowtime_types::{Binding, Condition, RelativeTime};
use serde_json::json;

fn datetime(text: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").expect("datetime literal")
}

fn load_scope() -> ScopeInstance {
    let settings = EngineSettings::default();
    let workflow = parse_workflow_document(include_str!("data/invoice_reminder.yaml"), &settings).expect("load fixture");
    let registry = settings.build_registry().expect("registry");
    let parsed = parse_workflow(&workflow, &registry).expect("fixture is valid");
    ScopeInstance::new(Arc::new(parsed))
}

#[test]
fn fixture_metadata_is_carried_through() {
    let scope = load_scope();
    let definition = scope.workflow().definition();
    assert_eq!(definition.id.as_deref(), Some("invoice-reminder"));
    assert_eq!(definition.source_workflow_id.as_deref(), Some("invoice-reminder-v1"));
    assert_eq!(definition.properties.get("channel"), Some(&json!("email")));
    assert_eq!(definition.timers[3].due_date, RelativeTime::days(14));
}

#[test]
fn resolves_all_timers() {
    let scope = load_scope();
    // 2024-02-01 is a Thursday.
    let due_dates = resolve_timers(&scope, datetime("2024-02-01 12:00:00"));

    assert_eq!(due_dates["firstReminder"], Ok(datetime("2024-02-29 09:00:00")));
    assert_eq!(due_dates["secondReminder"], Ok(datetime("2024-02-16 09:00:00")));
    assert_eq!(due_dates["weeklyReview"], Ok(datetime("2024-02-05 08:30:00")));
    assert_eq!(due_dates["legacyEscalation"], Ok(datetime("2024-02-15 12:00:00")));
}

#[test]
fn timers_follow_scope_updates() {
    let mut scope = load_scope();
    scope
        .set_variable_json("reminders", &json!(["2024-03-01T09:00:00", "2024-03-08T09:00:00"]))
        .expect("valid reminders");

    let due_dates = resolve_timers(&scope, datetime("2024-02-01 12:00:00"));
    assert_eq!(due_dates["secondReminder"], Ok(datetime("2024-03-10 09:00:00")));
}

#[test]
fn escalation_condition_reads_scope() {
    let mut scope = load_scope();
    let escalate = Condition::greater_than(Binding::expression("amount"), Binding::expression("escalationLimit"));
    assert!(evaluate_condition(&escalate, &scope));

    scope.set_variable_json("amount", &json!(200)).expect("valid amount");
    assert!(!evaluate_condition(&escalate, &scope));

    let normal_priority = Condition::equals(Binding::expression("priority"), Binding::value("normal"));
    assert!(evaluate_condition(&normal_priority, &scope));
}

#[test]
fn scope_exports_json_matching_the_authored_defaults() {
    let scope = load_scope();
    let exported = scope.to_json().expect("export");
    assert_eq!(exported["invoiceDate"], json!("2024-01-31T10:00:00"));
    assert_eq!(exported["reminders"], json!(["2024-02-07T09:00:00", "2024-02-14T09:00:00"]));
    assert_eq!(exported["amount"], json!(1250.5));
}
