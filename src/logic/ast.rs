//! The parsed form of a branching-logic string.
//!
//! A [`LogicExpr`] is a tree of whitelisted comparisons joined by `and`/`or`.
//! Nothing else is representable, so evaluation can never execute anything
//! beyond comparing resolved field values.

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use std::fmt;

/// Three-valued branching outcome.
///
/// `Unknown` arises only when a referenced field is absent from the record
/// snapshot, and propagates through `and`/`or` with Kleene semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriState {
    /// The condition holds; the field is shown
    Shown,
    /// The condition fails; the field is hidden
    Hidden,
    /// A referenced field was absent from the record
    Unknown,
}

impl TriState {
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value { Self::Shown } else { Self::Hidden }
    }

    /// Kleene conjunction: Hidden dominates, then Unknown.
    #[must_use]
    pub const fn and(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Hidden, _) | (_, Self::Hidden) => Self::Hidden,
            (Self::Unknown, _) | (_, Self::Unknown) => Self::Unknown,
            _ => Self::Shown,
        }
    }

    /// Kleene disjunction: Shown dominates, then Unknown.
    #[must_use]
    pub const fn or(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Shown, _) | (_, Self::Shown) => Self::Shown,
            (Self::Unknown, _) | (_, Self::Unknown) => Self::Unknown,
            _ => Self::Hidden,
        }
    }
}

/// Comparison operator of the surface syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
}

impl CmpOp {
    /// The operator as written in dictionary syntax.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
        }
    }
}

/// A `[field]` or `[field(choice)]` variable reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarRef {
    /// The referenced field's original name
    pub field: String,
    /// For checkbox references, the choice code
    pub choice: Option<String>,
}

impl fmt::Display for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.choice {
            Some(code) => write!(f, "[{}({})]", self.field, code),
            None => write!(f, "[{}]", self.field),
        }
    }
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A field (or checkbox choice) reference
    Var(VarRef),
    /// A numeric literal
    Number(Decimal),
    /// A quoted string literal
    Text(String),
}

/// An immutable, evaluable branching-logic expression.
#[derive(Debug, Clone, PartialEq)]
pub enum LogicExpr {
    /// Empty logic string: the field is always shown
    Always,
    /// A single binary comparison
    Cmp {
        lhs: Operand,
        op: CmpOp,
        rhs: Operand,
    },
    And(Box<LogicExpr>, Box<LogicExpr>),
    Or(Box<LogicExpr>, Box<LogicExpr>),
}

impl LogicExpr {
    #[must_use]
    pub fn and(self, rhs: Self) -> Self {
        Self::And(Box::new(self), Box::new(rhs))
    }

    #[must_use]
    pub fn or(self, rhs: Self) -> Self {
        Self::Or(Box::new(self), Box::new(rhs))
    }

    /// Names of all fields this expression reads.
    ///
    /// Drives the materializer's dependency ordering.
    #[must_use]
    pub fn referenced_fields(&self) -> FxHashSet<&str> {
        let mut set = FxHashSet::default();
        self.collect_fields(&mut set);
        set
    }

    fn collect_fields<'a>(&'a self, set: &mut FxHashSet<&'a str>) {
        match self {
            Self::Always => {}
            Self::Cmp { lhs, rhs, .. } => {
                for operand in [lhs, rhs] {
                    if let Operand::Var(var) = operand {
                        set.insert(var.field.as_str());
                    }
                }
            }
            Self::And(lhs, rhs) | Self::Or(lhs, rhs) => {
                lhs.collect_fields(set);
                rhs.collect_fields(set);
            }
        }
    }
}
