use flowtime_types::ComparatorKind;

use super::{Comparator, Operands};
use crate::{RuntimeValue, ScopeInstance};

/// Numbers compare by widened value (`1 == 1.0`); everything else structurally.
#[derive(Debug, Clone, Copy, Default)]
pub struct Equals;

impl Equals {
    fn holds(left: &RuntimeValue, right: &RuntimeValue) -> bool {
        match Operands::classify(left, right) {
            Operands::BothNull => true,
            Operands::OneNull => false,
            Operands::Numbers(left, right) => left == right,
            Operands::NotNumeric => left == right,
        }
    }
}

impl Comparator for Equals {
    fn kind(&self) -> ComparatorKind {
        ComparatorKind::Equals
    }

    fn comparator_symbol(&self) -> &'static str {
        "=="
    }

    fn compare(&self, left: &RuntimeValue, right: &RuntimeValue, _scope: &ScopeInstance) -> bool {
        Equals::holds(left, right)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NotEquals;

impl Comparator for NotEquals {
    fn kind(&self) -> ComparatorKind {
        ComparatorKind::NotEquals
    }

    fn comparator_symbol(&self) -> &'static str {
        "!="
    }

    fn compare(&self, left: &RuntimeValue, right: &RuntimeValue, _scope: &ScopeInstance) -> bool {
        !Equals::holds(left, right)
    }
}
