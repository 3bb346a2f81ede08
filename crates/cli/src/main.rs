use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDateTime};
use clap::{Arg, ArgAction, ArgMatches, Command};
use flowtime_engine::data_type::parse_date_text;
use flowtime_engine::{EngineSettings, ScopeInstance, WorkflowParser, load_workflow, read_relative_time, resolve_timers};
use flowtime_types::{RelativeTime, TimeInDay, TypeDescriptor};
use serde_json::{Value as JsonValue, json};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_tracing();
    let matches = build_cli().get_matches();

    let settings_path = matches.get_one::<PathBuf>("settings").map(PathBuf::as_path);
    let settings = EngineSettings::load(settings_path).context("failed to load engine settings")?;
    debug!(policy = ?settings.unknown_discriminator, "engine settings ready");

    match matches.subcommand() {
        Some(("validate", sub)) => run_validate(&settings, sub),
        Some(("resolve", sub)) => run_resolve(&settings, sub),
        Some(("convert", sub)) => run_convert(&settings, sub),
        _ => bail!("expected a subcommand; see --help"),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok()))
        .with_writer(std::io::stderr)
        .try_init();
}

fn log_filter(directives: Option<String>) -> EnvFilter {
    EnvFilter::new(directives.unwrap_or_else(|| "info".into()))
}

fn build_cli() -> Command {
    Command::new("flowtime")
        .about("Validate workflow definitions, resolve relative times, and convert typed values")
        .subcommand_required(true)
        .arg(
            Arg::new("settings")
                .long("settings")
                .global(true)
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Engine settings file (YAML or JSON); defaults to $FLOWTIME_SETTINGS_PATH"),
        )
        .subcommand(
            Command::new("validate")
                .about("Parse a workflow file and print its timers' due dates")
                .arg(Arg::new("file").required(true).value_parser(clap::value_parser!(PathBuf)).help("Workflow YAML/JSON"))
                .arg(Arg::new("now").long("now").action(ArgAction::Set).help("Instant used as 'now' (ISO-8601)")),
        )
        .subcommand(
            Command::new("resolve")
                .about("Resolve a relative time expression such as '5 days' or a JSON object")
                .arg(Arg::new("expression").required(true).help("Legacy '<n> <unit>' text or a JSON relative time"))
                .arg(Arg::new("base").long("base").action(ArgAction::Set).help("Base instant (ISO-8601); defaults to now"))
                .arg(Arg::new("at").long("at").action(ArgAction::Set).help("Time of day H:MM")),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert a JSON value through a data type and print the normalized JSON")
                .arg(
                    Arg::new("type")
                        .long("type")
                        .short('t')
                        .required(true)
                        .action(ArgAction::Set)
                        .help("Type descriptor, e.g. 'date' or '{name: list, elementType: date}'"),
                )
                .arg(Arg::new("value").required(true).help("JSON value")),
        )
}

fn run_validate(settings: &EngineSettings, matches: &ArgMatches) -> Result<()> {
    let file = matches.get_one::<PathBuf>("file").context("missing workflow file")?;
    let now = parse_instant(matches.get_one::<String>("now"), "--now")?;
    let parsed = load_workflow(file, settings)?;

    let scope = ScopeInstance::new(Arc::new(parsed));
    let mut timers = serde_json::Map::new();
    for (timer_id, due_date) in resolve_timers(&scope, now) {
        let rendered = match due_date {
            Ok(due_date) => json!({ "dueDate": format_instant(due_date) }),
            Err(error) => json!({ "error": error.to_string() }),
        };
        timers.insert(timer_id, rendered);
    }

    let report = json!({
        "workflow": scope.workflow().id(),
        "variables": scope.to_json()?,
        "timers": timers,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_resolve(settings: &EngineSettings, matches: &ArgMatches) -> Result<()> {
    let expression_text = matches.get_one::<String>("expression").context("missing expression")?;
    let mut relative_time = if expression_text.trim_start().starts_with('{') {
        let value: JsonValue = serde_yaml::from_str(expression_text).context("expression is not valid JSON")?;
        read_relative_time(&value, settings.unknown_discriminator)?.context("expression does not describe a relative time")?
    } else {
        RelativeTime::parse_backwards_compatible_string(expression_text)?
    };

    if let Some(at_text) = matches.get_one::<String>("at") {
        relative_time.at = TimeInDay::parse_attribute(at_text)?;
    }

    let base = match matches.get_one::<String>("base") {
        Some(text) => parse_instant(Some(text), "--base")?,
        None => base_from_binding(&relative_time)?.unwrap_or_else(|| Local::now().naive_local()),
    };

    if !relative_time.valid() {
        bail!("relative time '{}' is not valid", relative_time);
    }
    let due_date = relative_time.resolve(base)?;
    println!("{}", format_instant(due_date));
    Ok(())
}

fn run_convert(settings: &EngineSettings, matches: &ArgMatches) -> Result<()> {
    let descriptor_text = matches.get_one::<String>("type").context("missing --type")?;
    let value_text = matches.get_one::<String>("value").context("missing value")?;

    let descriptor: TypeDescriptor = serde_yaml::from_str(descriptor_text).context("invalid type descriptor")?;
    let value: JsonValue = serde_json::from_str(value_text)
        .or_else(|_| serde_yaml::from_str(value_text))
        .context("value is not valid JSON")?;

    let registry = settings.build_registry()?;
    let mut parser = WorkflowParser::new(&registry);
    let data_type = parser.with_path("type", |parser| parser.parse_type(&descriptor));
    let Some(data_type) = data_type.filter(|_| !parser.has_errors()) else {
        let problems: Vec<String> = parser.errors().iter().map(ToString::to_string).collect();
        bail!("invalid type descriptor:\n  - {}", problems.join("\n  - "));
    };

    let internal = data_type.convert_json_to_internal_value(&value)?;
    data_type.validate_internal_value(&internal)?;
    let normalized = data_type.convert_internal_to_json_value(&internal)?;
    debug!(data_type = data_type.type_name(), internal = %internal, "value converted");
    println!("{}", serde_json::to_string_pretty(&normalized)?);
    Ok(())
}

/// A literal base binding can be resolved without a workflow; variable expressions cannot.
fn base_from_binding(relative_time: &RelativeTime) -> Result<Option<NaiveDateTime>> {
    let Some(binding) = &relative_time.base else {
        return Ok(None);
    };
    if let Some(expression) = &binding.expression {
        bail!("base '{}' refers to a workflow variable; pass --base instead", expression);
    }
    match binding.value.as_ref().and_then(JsonValue::as_str) {
        Some(text) => parse_date_text(text)
            .map(Some)
            .with_context(|| format!("base '{}' is not an ISO-8601 date", text)),
        None => Ok(None),
    }
}

fn parse_instant(text: Option<&String>, flag: &str) -> Result<NaiveDateTime> {
    match text {
        Some(text) => parse_date_text(text).with_context(|| format!("{} '{}' is not an ISO-8601 date", flag, text)),
        None => Ok(Local::now().naive_local()),
    }
}

fn format_instant(instant: NaiveDateTime) -> String {
    instant.format("%Y-%m-%dT%H:%M:%S").to_string()
}
