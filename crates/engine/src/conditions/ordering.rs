use flowtime_types::ComparatorKind;

use super::{Comparator, Operands};
use crate::{RuntimeValue, ScopeInstance};

fn compare_ordered(left: &RuntimeValue, right: &RuntimeValue, holds: fn(f64, f64) -> bool) -> bool {
    match Operands::classify(left, right) {
        Operands::BothNull => true,
        Operands::OneNull | Operands::NotNumeric => false,
        Operands::Numbers(left, right) => holds(left, right),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LessThan;

impl Comparator for LessThan {
    fn kind(&self) -> ComparatorKind {
        ComparatorKind::LessThan
    }

    fn comparator_symbol(&self) -> &'static str {
        "<"
    }

    fn compare(&self, left: &RuntimeValue, right: &RuntimeValue, _scope: &ScopeInstance) -> bool {
        compare_ordered(left, right, |left, right| left < right)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LessThanOrEqual;

impl Comparator for LessThanOrEqual {
    fn kind(&self) -> ComparatorKind {
        ComparatorKind::LessThanOrEqual
    }

    fn comparator_symbol(&self) -> &'static str {
        "<="
    }

    fn compare(&self, left: &RuntimeValue, right: &RuntimeValue, _scope: &ScopeInstance) -> bool {
        compare_ordered(left, right, |left, right| left <= right)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GreaterThan;

impl Comparator for GreaterThan {
    fn kind(&self) -> ComparatorKind {
        ComparatorKind::GreaterThan
    }

    fn comparator_symbol(&self) -> &'static str {
        ">"
    }

    fn compare(&self, left: &RuntimeValue, right: &RuntimeValue, _scope: &ScopeInstance) -> bool {
        compare_ordered(left, right, |left, right| left > right)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GreaterThanOrEqual;

impl Comparator for GreaterThanOrEqual {
    fn kind(&self) -> ComparatorKind {
        ComparatorKind::GreaterThanOrEqual
    }

    fn comparator_symbol(&self) -> &'static str {
        ">="
    }

    fn compare(&self, left: &RuntimeValue, right: &RuntimeValue, _scope: &ScopeInstance) -> bool {
        compare_ordered(left, right, |left, right| left >= right)
    }
}
