//! Engine configuration.
//!
//! Settings come from a YAML or JSON file (explicit path, else the path named
//! by `FLOWTIME_SETTINGS_PATH`, else built-in defaults). Environment variables
//! override individual fields afterwards.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::DataTypeRegistry;
use crate::data_type::{DEFAULT_DATE_FORMAT, DateParser, date::is_valid_format};

/// Environment variable naming the settings file.
pub const SETTINGS_PATH_ENV: &str = "FLOWTIME_SETTINGS_PATH";

/// Environment variable overriding [`EngineSettings::unknown_discriminator`] (`fail` or `ignore`).
pub const UNKNOWN_DISCRIMINATOR_ENV: &str = "FLOWTIME_UNKNOWN_DISCRIMINATOR";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("settings parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid unknown-discriminator policy '{0}'; expected 'fail' or 'ignore'")]
    InvalidPolicy(String),
    #[error("invalid date format '{0}'")]
    InvalidDateFormat(String),
    #[error("type alias '{alias}' targets unregistered data type '{target}'")]
    UnknownAliasTarget { alias: String, target: String },
}

/// What to do with a relative time whose `type` names no known variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscriminatorPolicy {
    /// Reject the document.
    #[default]
    Fail,
    /// Log a warning and drop the expression.
    Ignore,
}

impl FromStr for DiscriminatorPolicy {
    type Err = SettingsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(DiscriminatorPolicy::Fail),
            "ignore" => Ok(DiscriminatorPolicy::Ignore),
            _ => Err(SettingsError::InvalidPolicy(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub unknown_discriminator: DiscriminatorPolicy,
    /// strftime format used when dates are written back to JSON.
    pub date_format: String,
    /// Authoring aliases, e.g. `string: text`.
    pub type_aliases: IndexMap<String, String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            unknown_discriminator: DiscriminatorPolicy::default(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            type_aliases: IndexMap::new(),
        }
    }
}

impl EngineSettings {
    /// Loads settings from `path`, or from `FLOWTIME_SETTINGS_PATH`, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let configured_path = path.map(Path::to_path_buf).or_else(|| {
            env::var(SETTINGS_PATH_ENV)
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        });
        let settings = match configured_path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        settings.with_overrides(|name| env::var(name).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::parse_text(&text)?;
        debug!(path = %path.display(), "engine settings loaded");
        Ok(settings)
    }

    /// Parses YAML or JSON settings text. Blank text yields the defaults.
    pub fn parse_text(text: &str) -> Result<Self, SettingsError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Applies overrides read through `lookup` (normally the process environment).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        if let Some(policy) = lookup(UNKNOWN_DISCRIMINATOR_ENV).filter(|value| !value.trim().is_empty()) {
            self.unknown_discriminator = policy.parse()?;
            debug!(policy = ?self.unknown_discriminator, "unknown discriminator policy overridden from environment");
        }
        Ok(self)
    }

    /// Builds the data type registry these settings describe.
    pub fn build_registry(&self) -> Result<DataTypeRegistry, SettingsError> {
        let mut registry = DataTypeRegistry::with_defaults();
        if self.date_format != DEFAULT_DATE_FORMAT {
            if !is_valid_format(&self.date_format) {
                return Err(SettingsError::InvalidDateFormat(self.date_format.clone()));
            }
            registry.register(Arc::new(DateParser::new(self.date_format.clone())));
        }
        for (alias, target) in &self.type_aliases {
            if !registry.register_alias(alias, target) {
                return Err(SettingsError::UnknownAliasTarget {
                    alias: alias.clone(),
                    target: target.clone(),
                });
            }
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RuntimeValue, WorkflowParser};
    use flowtime_types::TypeDescriptor;
    use serde_json::json;

    #[test]
    fn defaults_fail_on_unknown_discriminator() {
        let settings = EngineSettings::parse_text("").unwrap();
        assert_eq!(settings, EngineSettings::default());
        assert_eq!(settings.unknown_discriminator, DiscriminatorPolicy::Fail);
    }

    #[test]
    fn reads_yaml_file() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("flowtime.yaml");
        fs::write(&path, "unknown_discriminator: ignore\ntype_aliases:\n  string: text\n").unwrap();

        let settings = EngineSettings::from_file(&path).unwrap();
        assert_eq!(settings.unknown_discriminator, DiscriminatorPolicy::Ignore);
        assert_eq!(settings.type_aliases.get("string").map(String::as_str), Some("text"));
        assert_eq!(settings.date_format, DEFAULT_DATE_FORMAT);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let directory = tempfile::tempdir().unwrap();
        let error = EngineSettings::from_file(&directory.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(error, SettingsError::Io { .. }));
    }

    #[test]
    fn environment_overrides_policy() {
        let overridden = EngineSettings::default()
            .with_overrides(|name| (name == UNKNOWN_DISCRIMINATOR_ENV).then(|| "Ignore".to_string()))
            .unwrap();
        assert_eq!(overridden.unknown_discriminator, DiscriminatorPolicy::Ignore);

        let error = EngineSettings::default()
            .with_overrides(|_| Some("shrug".to_string()))
            .unwrap_err();
        assert!(matches!(error, SettingsError::InvalidPolicy(value) if value == "shrug"));
    }

    #[test]
    fn registry_honours_date_format_and_aliases() {
        let settings = EngineSettings::parse_text("date_format: \"%Y-%m-%d\"\ntype_aliases:\n  day: date\n").unwrap();
        let registry = settings.build_registry().unwrap();
        let mut parser = WorkflowParser::new(&registry);
        let day = parser.parse_type(&TypeDescriptor::named("day")).expect("aliased date");

        let internal = day.convert_json_to_internal_value(&json!("2024-02-29T13:00:00")).unwrap();
        assert!(matches!(internal, RuntimeValue::Date(_)));
        assert_eq!(day.convert_internal_to_json_value(&internal).unwrap(), json!("2024-02-29"));
    }

    #[test]
    fn rejects_bad_alias_and_format() {
        let bad_alias = EngineSettings::parse_text("type_aliases:\n  money: currency\n").unwrap();
        assert!(matches!(bad_alias.build_registry(), Err(SettingsError::UnknownAliasTarget { .. })));

        let bad_format = EngineSettings::parse_text("date_format: \"%Q\"\n").unwrap();
        assert!(matches!(bad_format.build_registry(), Err(SettingsError::InvalidDateFormat(_))));

        let offset_format = EngineSettings::parse_text("date_format: \"%Y-%m-%dT%H:%M:%S%z\"\n").unwrap();
        assert!(matches!(offset_format.build_registry(), Err(SettingsError::InvalidDateFormat(format)) if format.ends_with("%z")));
    }
}
