//! Declarative type descriptors attached to workflow variables.
//!
//! The set of type names is open: the engine's registry decides which names are
//! known. A descriptor therefore carries only a `name`, an optional nested
//! `elementType` for composites, and free-form settings interpreted by the type
//! handler registered under that name (for example `options` for `choice`).
//!
//! Authors may write a bare string (`type: text`) as shorthand for `{ name: text }`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

pub const TEXT: &str = "text";
pub const NUMBER: &str = "number";
pub const BOOLEAN: &str = "boolean";
pub const DATE: &str = "date";
pub const CHOICE: &str = "choice";
pub const LIST: &str = "list";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DescriptorRepr")]
pub struct TypeDescriptor {
    pub name: String,
    #[serde(rename = "elementType", default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<Box<TypeDescriptor>>,
    #[serde(flatten)]
    pub settings: IndexMap<String, JsonValue>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DescriptorRepr {
    Name(String),
    Detailed(DetailedDescriptor),
}

#[derive(Deserialize)]
struct DetailedDescriptor {
    name: String,
    #[serde(rename = "elementType", default)]
    element_type: Option<Box<TypeDescriptor>>,
    #[serde(flatten)]
    settings: IndexMap<String, JsonValue>,
}

impl From<DescriptorRepr> for TypeDescriptor {
    fn from(repr: DescriptorRepr) -> Self {
        match repr {
            DescriptorRepr::Name(name) => Self::named(name),
            DescriptorRepr::Detailed(detailed) => Self {
                name: detailed.name,
                element_type: detailed.element_type,
                settings: detailed.settings,
            },
        }
    }
}

impl TypeDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            element_type: None,
            settings: IndexMap::new(),
        }
    }

    pub fn text() -> Self {
        Self::named(TEXT)
    }

    pub fn number() -> Self {
        Self::named(NUMBER)
    }

    pub fn boolean() -> Self {
        Self::named(BOOLEAN)
    }

    pub fn date() -> Self {
        Self::named(DATE)
    }

    pub fn choice<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options = options.into_iter().map(|option| JsonValue::String(option.into())).collect();
        Self::named(CHOICE).with_setting("options", JsonValue::Array(options))
    }

    pub fn list(element_type: TypeDescriptor) -> Self {
        Self {
            name: LIST.to_string(),
            element_type: Some(Box::new(element_type)),
            settings: IndexMap::new(),
        }
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    pub fn setting(&self, key: &str) -> Option<&JsonValue> {
        self.settings.get(key)
    }

    pub fn element_type(&self) -> Option<&TypeDescriptor> {
        self.element_type.as_deref()
    }
}
