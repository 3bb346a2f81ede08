//! Attribute-oriented read/write hooks.
//!
//! Transport layers (BPMN extension attributes, flat key/value stores) expose
//! their element attributes through [`AttributeReader`] and [`AttributeWriter`].
//! Model types populate and serialize only their own fields through these traits;
//! the surrounding envelope belongs to the transport.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::Binding;

pub trait AttributeReader {
    fn read_string(&self, name: &str) -> Option<&str>;

    fn read_binding(&self, name: &str) -> Option<Binding> {
        self.read_string(name).and_then(Binding::from_attribute)
    }
}

pub trait AttributeWriter {
    fn write_string(&mut self, name: &str, value: String);

    /// Writes nothing when the binding is absent or empty.
    fn write_binding(&mut self, name: &str, binding: Option<&Binding>) {
        if let Some(encoded) = binding.and_then(Binding::to_attribute) {
            self.write_string(name, encoded);
        }
    }
}

/// Ordered in-memory attribute set, preserving write order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeMap(IndexMap<String, String>);

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl AttributeReader for AttributeMap {
    fn read_string(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

impl AttributeWriter for AttributeMap {
    fn write_string(&mut self, name: &str, value: String) {
        self.0.insert(name.to_string(), value);
    }
}
