//! Data type registry.
//!
//! Maps type names to [`DataTypeParser`] constructors. Adding a type means
//! registering another parser; existing handlers are never touched. The table
//! is populated explicitly at startup and only read while workflows are parsed.

use std::fmt;
use std::sync::Arc;

use flowtime_types::TypeDescriptor;
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::data_type::{BooleanParser, ChoiceParser, DataType, DataTypeParser, DateParser, ListParser, NumberParser, TextParser};
use crate::{ParseError, WorkflowParser};

#[derive(Clone, Default)]
pub struct DataTypeRegistry {
    parsers: IndexMap<String, Arc<dyn DataTypeParser>>,
}

impl DataTypeRegistry {
    /// Empty registry; nothing resolves until parsers are registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `text`, `number`, `boolean`, `date`, `choice`, and `list` types.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(TextParser));
        registry.register(Arc::new(NumberParser));
        registry.register(Arc::new(BooleanParser));
        registry.register(Arc::new(DateParser::default()));
        registry.register(Arc::new(ChoiceParser));
        registry.register(Arc::new(ListParser));
        registry
    }

    /// Registers `parser` under its type name, replacing any parser already registered there.
    pub fn register(&mut self, parser: Arc<dyn DataTypeParser>) -> &mut Self {
        let type_name = parser.type_name().to_string();
        if self.parsers.insert(type_name.clone(), parser).is_some() {
            debug!(type_name = %type_name, "data type parser replaced");
        } else {
            debug!(type_name = %type_name, "data type parser registered");
        }
        self
    }

    /// Makes `alias` resolve through the parser registered as `target`.
    ///
    /// Returns `false` and leaves the registry unchanged when `target` is unknown.
    pub fn register_alias(&mut self, alias: &str, target: &str) -> bool {
        let Some(parser) = self.parsers.get(target).cloned() else {
            return false;
        };
        debug!(alias = %alias, target = %target, "data type alias registered");
        self.parsers.insert(alias.to_string(), parser);
        true
    }

    pub fn with_type_alias(mut self, alias: &str, target: &str) -> Self {
        if !self.register_alias(alias, target) {
            warn!(alias = %alias, target = %target, "ignoring alias for unregistered data type");
        }
        self
    }

    pub fn get(&self, type_name: &str) -> Option<&Arc<dyn DataTypeParser>> {
        self.parsers.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.parsers.contains_key(type_name)
    }

    /// Registered names (aliases included) in registration order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.parsers.keys().map(String::as_str)
    }

    /// Instantiates a fully parsed data type for `descriptor`.
    ///
    /// An unregistered name is reported to `parser` as [`ParseError::UnknownType`]
    /// at the current location and yields `None`, so the caller can keep going.
    pub fn instantiate(&self, descriptor: &TypeDescriptor, parser: &mut WorkflowParser<'_>) -> Option<Arc<dyn DataType>> {
        match self.parsers.get(&descriptor.name) {
            Some(type_parser) => type_parser.parse(descriptor, parser),
            None => {
                debug!(path = %parser.location(), type_name = %descriptor.name, "unknown data type");
                parser.add_error(ParseError::UnknownType {
                    path: parser.location(),
                    type_name: descriptor.name.clone(),
                });
                None
            }
        }
    }
}

impl fmt::Debug for DataTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataTypeRegistry")
            .field("type_names", &self.parsers.keys().collect::<Vec<_>>())
            .finish()
    }
}
