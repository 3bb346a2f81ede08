//! Strongly typed, serializable model shared by the Flowtime engine and CLI.
//!
//! Everything in this crate is plain data: type descriptors declared on workflow
//! variables, bindings that resolve at execution time, comparator conditions,
//! relative time expressions used by timers, and the workflow carrier that groups
//! them. Interpreting these values (type handlers, scopes, condition evaluation)
//! is the job of `flowtime-engine`.

pub mod attributes;
pub mod binding;
pub mod condition;
pub mod descriptor;
pub mod error;
pub mod relative_time;
pub mod workflow;

pub use attributes::{AttributeMap, AttributeReader, AttributeWriter};
pub use binding::Binding;
pub use condition::{ComparatorKind, Condition};
pub use descriptor::TypeDescriptor;
pub use error::RelativeTimeError;
pub use relative_time::{AfterRelativeTime, DurationUnit, NextRelativeTime, NextUnit, RelativeTime, RelativeTimeKind, TimeInDay};
pub use workflow::{Timer, Variable, Workflow};
