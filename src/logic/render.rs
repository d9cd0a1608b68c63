//! Rendering compiled logic back to dictionary syntax.
//!
//! `render` is the inverse of `compile` up to canonical spacing: compiling
//! the rendered string yields an expression with identical evaluation
//! behavior on every snapshot. Parentheses are emitted only where precedence
//! requires them (an `or` nested under an `and`).

use std::fmt::Write;

use crate::logic::ast::{LogicExpr, Operand};

fn write_operand(out: &mut String, operand: &Operand) {
    match operand {
        Operand::Var(var) => {
            let _ = write!(out, "{var}");
        }
        Operand::Number(n) => {
            let _ = write!(out, "{n}");
        }
        Operand::Text(s) => {
            let _ = write!(out, "'{s}'");
        }
    }
}

fn write_expr(out: &mut String, expr: &LogicExpr, parenthesize_or: bool) {
    match expr {
        LogicExpr::Always => {}
        LogicExpr::Cmp { lhs, op, rhs } => {
            write_operand(out, lhs);
            let _ = write!(out, " {} ", op.as_str());
            write_operand(out, rhs);
        }
        LogicExpr::And(lhs, rhs) => {
            write_expr(out, lhs, true);
            out.push_str(" and ");
            write_expr(out, rhs, true);
        }
        LogicExpr::Or(lhs, rhs) => {
            if parenthesize_or {
                out.push('(');
            }
            write_expr(out, lhs, false);
            out.push_str(" or ");
            write_expr(out, rhs, false);
            if parenthesize_or {
                out.push(')');
            }
        }
    }
}

/// Render an expression to canonical dictionary syntax.
///
/// [`LogicExpr::Always`] renders as the empty string, matching the
/// dictionary's "no branching logic" convention.
#[must_use]
pub fn render(expr: &LogicExpr) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr, false);
    out
}
