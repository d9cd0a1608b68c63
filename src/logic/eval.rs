//! Safe evaluation of compiled branching logic over a record snapshot.
//!
//! Evaluation is a plain tree walk: resolve both operands, compare, combine
//! with three-valued `and`/`or`. A comparison whose referenced field is not
//! present in the snapshot yields [`TriState::Unknown`].

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;

use crate::codec::DataValue;
use crate::logic::ast::{CmpOp, LogicExpr, Operand, TriState};

/// Read-only view of a record's typed values during evaluation.
///
/// The materializer implements this over its in-progress record; tests use
/// [`ValueSnapshot`].
pub trait Snapshot {
    /// Typed value of a field, `None` when the field is absent.
    fn field_value(&self, field: &str) -> Option<DataValue>;

    /// Selection state of one checkbox choice, `None` when the field (or its
    /// choice map) is absent.
    fn choice_value(&self, field: &str, code: &str) -> Option<bool>;
}

/// A flat snapshot keyed by export name, for direct evaluation of compiled
/// logic outside the materializer. Checkbox choices are stored under their
/// export names (`field___code`).
#[derive(Debug, Default, Clone)]
pub struct ValueSnapshot {
    values: FxHashMap<String, DataValue>,
}

impl ValueSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn set(mut self, export_name: impl Into<String>, value: impl Into<DataValue>) -> Self {
        self.values.insert(export_name.into(), value.into());
        self
    }
}

impl Snapshot for ValueSnapshot {
    fn field_value(&self, field: &str) -> Option<DataValue> {
        self.values.get(field).cloned()
    }

    fn choice_value(&self, field: &str, code: &str) -> Option<bool> {
        match self.values.get(&format!("{field}___{code}")) {
            Some(DataValue::Bool(v)) => Some(*v),
            Some(other) => other.as_decimal().map(|d| !d.is_zero()),
            None => None,
        }
    }
}

/// Total ordering used by comparisons and by min/max validation.
///
/// Numeric interpretations win when both sides have one; matching temporal
/// kinds compare chronologically; everything else falls back to the canonical
/// string form, which keeps the ordering total and deterministic.
pub(crate) fn value_ordering(lhs: &DataValue, rhs: &DataValue) -> Ordering {
    if let (Some(a), Some(b)) = (lhs.as_decimal(), rhs.as_decimal()) {
        return a.cmp(&b);
    }
    match (lhs, rhs) {
        (DataValue::Date(a), DataValue::Date(b)) => a.cmp(b),
        (DataValue::DateTime(a), DataValue::DateTime(b)) => a.cmp(b),
        (DataValue::Time(a), DataValue::Time(b)) => a.cmp(b),
        _ => lhs.to_string().cmp(&rhs.to_string()),
    }
}

fn apply(op: CmpOp, ordering: Ordering) -> bool {
    match op {
        CmpOp::Eq => ordering == Ordering::Equal,
        CmpOp::Ne => ordering != Ordering::Equal,
        CmpOp::Lt => ordering == Ordering::Less,
        CmpOp::Gt => ordering == Ordering::Greater,
        CmpOp::Le => ordering != Ordering::Greater,
        CmpOp::Ge => ordering != Ordering::Less,
    }
}

fn resolve(operand: &Operand, snapshot: &impl Snapshot) -> Option<DataValue> {
    match operand {
        Operand::Var(var) => match &var.choice {
            Some(code) => snapshot
                .choice_value(&var.field, code)
                .map(DataValue::Bool),
            None => snapshot.field_value(&var.field),
        },
        Operand::Number(n) => Some(DataValue::Number(*n)),
        Operand::Text(s) => Some(DataValue::Text(s.clone())),
    }
}

/// Evaluate a compiled expression against a snapshot.
#[must_use]
pub fn evaluate(expr: &LogicExpr, snapshot: &impl Snapshot) -> TriState {
    match expr {
        LogicExpr::Always => TriState::Shown,
        LogicExpr::Cmp { lhs, op, rhs } => {
            let (Some(a), Some(b)) = (resolve(lhs, snapshot), resolve(rhs, snapshot)) else {
                return TriState::Unknown;
            };
            TriState::from_bool(apply(*op, value_ordering(&a, &b)))
        }
        LogicExpr::And(lhs, rhs) => evaluate(lhs, snapshot).and(evaluate(rhs, snapshot)),
        LogicExpr::Or(lhs, rhs) => evaluate(lhs, snapshot).or(evaluate(rhs, snapshot)),
    }
}

/// Convenience: compare two typed values the way the evaluator would.
pub(crate) fn compare_values(lhs: &DataValue, op: CmpOp, rhs: &DataValue) -> bool {
    apply(op, value_ordering(lhs, rhs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::ast::TriState::{Hidden, Shown, Unknown};

    #[test]
    fn kleene_tables() {
        assert_eq!(Shown.and(Shown), Shown);
        assert_eq!(Shown.and(Hidden), Hidden);
        assert_eq!(Unknown.and(Hidden), Hidden);
        assert_eq!(Unknown.and(Shown), Unknown);
        assert_eq!(Unknown.and(Unknown), Unknown);
        assert_eq!(Hidden.or(Hidden), Hidden);
        assert_eq!(Unknown.or(Shown), Shown);
        assert_eq!(Unknown.or(Hidden), Unknown);
        assert_eq!(Unknown.or(Unknown), Unknown);
    }

    #[test]
    fn text_compares_numerically_against_numbers() {
        // An unvalidated text field holding "20" still satisfies `> 18`.
        let a = DataValue::Text("20".into());
        let b = DataValue::Number(Decimal::from(18));
        assert!(compare_values(&a, CmpOp::Gt, &b));
        // Text that is not a number falls back to string ordering.
        let c = DataValue::Text("abc".into());
        assert!(compare_values(&c, CmpOp::Ne, &b));
    }

    #[test]
    fn bool_choice_compares_against_one_and_zero() {
        let selected = DataValue::Bool(true);
        assert!(compare_values(&selected, CmpOp::Eq, &DataValue::Number(Decimal::ONE)));
        assert!(compare_values(
            &DataValue::Bool(false),
            CmpOp::Eq,
            &DataValue::Number(Decimal::ZERO)
        ));
    }
}
