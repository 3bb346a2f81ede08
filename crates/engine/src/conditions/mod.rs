//! Binary comparators and condition evaluation.
//!
//! Each [`Comparator`] declares the condition kind it implements. Conditions
//! resolve both operand bindings against the scope and dispatch through a
//! [`ComparatorRegistry`]. Evaluation is total: mismatched or missing operands
//! produce `false`, never an error.
//!
//! Ordering comparators share one null/type table:
//!
//! | left    | right   | result                         |
//! |---------|---------|--------------------------------|
//! | null    | null    | `true`                         |
//! | value   | null    | `false`                        |
//! | null    | value   | `false`                        |
//! | non-numeric on either side | | `false`               |
//! | number  | number  | comparison of widened values   |

use std::sync::Arc;

use flowtime_types::{ComparatorKind, Condition};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::{RuntimeValue, ScopeInstance, resolve_binding};

mod equality;
mod ordering;

pub use equality::{Equals, NotEquals};
pub use ordering::{GreaterThan, GreaterThanOrEqual, LessThan, LessThanOrEqual};

pub trait Comparator: Send + Sync {
    /// Condition kind this comparator implements.
    fn kind(&self) -> ComparatorKind;

    fn comparator_symbol(&self) -> &'static str;

    fn compare(&self, left: &RuntimeValue, right: &RuntimeValue, scope: &ScopeInstance) -> bool;
}

/// Operand classification shared by the comparators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Operands {
    BothNull,
    OneNull,
    NotNumeric,
    Numbers(f64, f64),
}

impl Operands {
    pub(crate) fn classify(left: &RuntimeValue, right: &RuntimeValue) -> Self {
        match (left.is_null(), right.is_null()) {
            (true, true) => Operands::BothNull,
            (true, false) | (false, true) => Operands::OneNull,
            (false, false) => match (left.as_f64(), right.as_f64()) {
                (Some(left), Some(right)) => Operands::Numbers(left, right),
                _ => Operands::NotNumeric,
            },
        }
    }
}

#[derive(Clone)]
pub struct ComparatorRegistry {
    comparators: IndexMap<ComparatorKind, Arc<dyn Comparator>>,
}

static DEFAULT_COMPARATORS: Lazy<ComparatorRegistry> = Lazy::new(ComparatorRegistry::with_defaults);

impl ComparatorRegistry {
    pub fn empty() -> Self {
        Self {
            comparators: IndexMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(Equals));
        registry.register(Arc::new(NotEquals));
        registry.register(Arc::new(LessThan));
        registry.register(Arc::new(LessThanOrEqual));
        registry.register(Arc::new(GreaterThan));
        registry.register(Arc::new(GreaterThanOrEqual));
        registry
    }

    /// Shared registry holding the built-in comparators.
    pub fn global() -> &'static ComparatorRegistry {
        &DEFAULT_COMPARATORS
    }

    pub fn register(&mut self, comparator: Arc<dyn Comparator>) -> &mut Self {
        let kind = comparator.kind();
        if self.comparators.insert(kind, comparator).is_some() {
            debug!(comparator = %kind, "comparator replaced");
        }
        self
    }

    pub fn get(&self, kind: ComparatorKind) -> Option<&Arc<dyn Comparator>> {
        self.comparators.get(&kind)
    }

    /// Resolves both operands against `scope` and applies the comparator for the condition's kind.
    pub fn evaluate(&self, condition: &Condition, scope: &ScopeInstance) -> bool {
        let Some(comparator) = self.get(condition.kind) else {
            warn!(comparator = %condition.kind, "no comparator registered; condition is false");
            return false;
        };
        let left = resolve_binding(&condition.left, scope);
        let right = resolve_binding(&condition.right, scope);
        let outcome = comparator.compare(&left, &right, scope);
        debug!(
            left = %left,
            symbol = comparator.comparator_symbol(),
            right = %right,
            outcome,
            "condition evaluated"
        );
        outcome
    }
}

impl std::fmt::Debug for ComparatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComparatorRegistry")
            .field("kinds", &self.comparators.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Evaluates `condition` with the built-in comparators.
pub fn evaluate_condition(condition: &Condition, scope: &ScopeInstance) -> bool {
    ComparatorRegistry::global().evaluate(condition, scope)
}
