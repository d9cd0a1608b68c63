//! Compilation of dictionary branching-logic strings into [`LogicExpr`] trees.
//!
//! The surface syntax is the dictionary's own: bracket-delimited variable
//! references (`[field]`, `[field(choice)]`), `=` for equality, `<>` for
//! inequality, `<`/`>`/`<=`/`>=`, case-insensitive `and`/`or`, parentheses,
//! and number or quoted-string literals.
//!
//! The tokenizer matches two-character operators before one-character ones:
//! `<>` must never be read as `<` followed by `>`, and the `=` inside `<=` or
//! `>=` must never be taken as the equality operator. Both orderings are
//! pinned by tests.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{DictionaryError, Result};
use crate::logic::ast::{CmpOp, LogicExpr, Operand, VarRef};
use crate::schema::SchemaRegistry;

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Var(VarRef),
    Op(CmpOp),
    And,
    Or,
    LParen,
    RParen,
    Number(Decimal),
    Str(String),
}

fn syntax_error(fragment: &str, position: usize) -> DictionaryError {
    DictionaryError::Syntax {
        fragment: fragment.to_string(),
        position,
    }
}

/// Split a bracket fragment's interior into a variable reference.
///
/// `field(choice)` resolves to a checkbox-choice reference; anything else is
/// a plain field reference. Characters are restricted to the word/parenthesis
/// set the dictionary allows inside brackets.
fn parse_var(interior: &str, position: usize) -> Result<VarRef> {
    let word_ok = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_');
    if let Some(open) = interior.find('(') {
        let field = &interior[..open];
        let rest = &interior[open + 1..];
        let choice = rest
            .strip_suffix(')')
            .ok_or_else(|| syntax_error(interior, position))?;
        if !word_ok(field) || !word_ok(choice) {
            return Err(syntax_error(interior, position));
        }
        Ok(VarRef {
            field: field.to_string(),
            choice: Some(choice.to_string()),
        })
    } else {
        if !word_ok(interior) {
            return Err(syntax_error(interior, position));
        }
        Ok(VarRef {
            field: interior.to_string(),
            choice: None,
        })
    }
}

fn tokenize(raw: &str) -> Result<Vec<(usize, Tok)>> {
    let mut tokens = Vec::new();
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let rest = &raw[i..];
        let c = rest.chars().next().unwrap_or_default();
        match c {
            c if c.is_whitespace() => {
                i += c.len_utf8();
            }
            '[' => {
                let close = rest.find(']').ok_or_else(|| syntax_error(rest, i))?;
                tokens.push((i, Tok::Var(parse_var(&rest[1..close], i)?)));
                i += close + 1;
            }
            // Two-character operators first; the scan order is load-bearing.
            '<' if rest.starts_with("<>") => {
                tokens.push((i, Tok::Op(CmpOp::Ne)));
                i += 2;
            }
            '<' if rest.starts_with("<=") => {
                tokens.push((i, Tok::Op(CmpOp::Le)));
                i += 2;
            }
            '>' if rest.starts_with(">=") => {
                tokens.push((i, Tok::Op(CmpOp::Ge)));
                i += 2;
            }
            '<' => {
                tokens.push((i, Tok::Op(CmpOp::Lt)));
                i += 1;
            }
            '>' => {
                tokens.push((i, Tok::Op(CmpOp::Gt)));
                i += 1;
            }
            '=' => {
                tokens.push((i, Tok::Op(CmpOp::Eq)));
                i += 1;
            }
            '(' => {
                tokens.push((i, Tok::LParen));
                i += 1;
            }
            ')' => {
                tokens.push((i, Tok::RParen));
                i += 1;
            }
            '\'' | '"' => {
                let body = &rest[1..];
                let close = body.find(c).ok_or_else(|| syntax_error(rest, i))?;
                tokens.push((i, Tok::Str(body[..close].to_string())));
                i += close + 2;
            }
            c if c.is_ascii_digit() || c == '-' || c == '.' => {
                let end = rest
                    .char_indices()
                    .skip(1)
                    .find(|(_, ch)| !ch.is_ascii_digit() && *ch != '.')
                    .map_or(rest.len(), |(idx, _)| idx);
                let literal = &rest[..end];
                let value =
                    Decimal::from_str(literal).map_err(|_| syntax_error(literal, i))?;
                tokens.push((i, Tok::Number(value)));
                i += end;
            }
            c if c.is_alphabetic() => {
                let end = rest
                    .char_indices()
                    .find(|(_, ch)| !ch.is_alphanumeric() && *ch != '_')
                    .map_or(rest.len(), |(idx, _)| idx);
                let word = &rest[..end];
                match word.to_ascii_lowercase().as_str() {
                    "and" => tokens.push((i, Tok::And)),
                    "or" => tokens.push((i, Tok::Or)),
                    _ => return Err(syntax_error(word, i)),
                }
                i += end;
            }
            _ => return Err(syntax_error(&rest[..c.len_utf8()], i)),
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<(usize, Tok)>,
    pos: usize,
    registry: &'a SchemaRegistry,
    len: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn next(&mut self) -> Option<(usize, Tok)> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn here(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.len, |(at, _)| *at)
    }

    /// expr := and_expr ( "or" and_expr )*
    fn expr(&mut self) -> Result<LogicExpr> {
        let mut lhs = self.and_expr()?;
        while matches!(self.peek(), Some(Tok::Or)) {
            self.next();
            lhs = lhs.or(self.and_expr()?);
        }
        Ok(lhs)
    }

    /// and_expr := term ( "and" term )*
    fn and_expr(&mut self) -> Result<LogicExpr> {
        let mut lhs = self.term()?;
        while matches!(self.peek(), Some(Tok::And)) {
            self.next();
            lhs = lhs.and(self.term()?);
        }
        Ok(lhs)
    }

    /// term := "(" expr ")" | operand op operand
    fn term(&mut self) -> Result<LogicExpr> {
        if matches!(self.peek(), Some(Tok::LParen)) {
            self.next();
            let inner = self.expr()?;
            match self.next() {
                Some((_, Tok::RParen)) => Ok(inner),
                other => Err(syntax_error(
                    "expected ')'",
                    other.map_or(self.len, |(at, _)| at),
                )),
            }
        } else {
            let lhs = self.operand()?;
            let op = match self.next() {
                Some((_, Tok::Op(op))) => op,
                other => {
                    return Err(syntax_error(
                        "expected comparison operator",
                        other.map_or(self.len, |(at, _)| at),
                    ));
                }
            };
            let rhs = self.operand()?;
            Ok(LogicExpr::Cmp { lhs, op, rhs })
        }
    }

    fn operand(&mut self) -> Result<Operand> {
        let at = self.here();
        match self.next() {
            Some((_, Tok::Var(var))) => {
                self.check_var(&var)?;
                Ok(Operand::Var(var))
            }
            Some((_, Tok::Number(n))) => Ok(Operand::Number(n)),
            Some((_, Tok::Str(s))) => Ok(Operand::Text(s)),
            _ => Err(syntax_error("expected operand", at)),
        }
    }

    /// Variable references are resolved against the registry at compile time,
    /// so an expression that compiles can only ever read real fields.
    fn check_var(&self, var: &VarRef) -> Result<()> {
        let Some(def) = self.registry.field(&var.field) else {
            return Err(DictionaryError::UnknownField {
                name: var.field.clone(),
            });
        };
        if let Some(code) = &var.choice {
            if !def.has_choice(code) {
                return Err(DictionaryError::UnknownField {
                    name: var.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Compile a raw branching-logic string against a registry.
///
/// An empty (or all-whitespace) string compiles to [`LogicExpr::Always`].
pub fn compile(raw: &str, registry: &SchemaRegistry) -> Result<LogicExpr> {
    if raw.trim().is_empty() {
        return Ok(LogicExpr::Always);
    }
    let tokens = tokenize(raw)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        registry,
        len: raw.len(),
    };
    let expr = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(syntax_error("trailing input", parser.here()));
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::ast::{CmpOp, LogicExpr, Operand};
    use crate::schema::test_support::demo_registry;

    fn op_of(expr: &LogicExpr) -> CmpOp {
        match expr {
            LogicExpr::Cmp { op, .. } => *op,
            other => panic!("expected comparison, got {other:?}"),
        }
    }

    #[test]
    fn empty_logic_is_always_shown() {
        let registry = demo_registry();
        assert_eq!(compile("", &registry).unwrap(), LogicExpr::Always);
        assert_eq!(compile("   ", &registry).unwrap(), LogicExpr::Always);
    }

    #[test]
    fn inequality_is_not_less_then_greater() {
        let registry = demo_registry();
        // A naive scan would read `<>` as Lt followed by Gt and fail to parse.
        let expr = compile("[age] <> 18", &registry).unwrap();
        assert_eq!(op_of(&expr), CmpOp::Ne);
    }

    #[test]
    fn le_and_ge_are_not_equality() {
        let registry = demo_registry();
        assert_eq!(op_of(&compile("[age] <= 18", &registry).unwrap()), CmpOp::Le);
        assert_eq!(op_of(&compile("[age] >= 18", &registry).unwrap()), CmpOp::Ge);
        assert_eq!(op_of(&compile("[age] = 18", &registry).unwrap()), CmpOp::Eq);
        assert_eq!(op_of(&compile("[age] < 18", &registry).unwrap()), CmpOp::Lt);
        assert_eq!(op_of(&compile("[age] > 18", &registry).unwrap()), CmpOp::Gt);
    }

    #[test]
    fn choice_reference_resolves_to_checkbox_choice() {
        let registry = demo_registry();
        let expr = compile("[consent(1)] = 1", &registry).unwrap();
        match expr {
            LogicExpr::Cmp {
                lhs: Operand::Var(var),
                ..
            } => {
                assert_eq!(var.field, "consent");
                assert_eq!(var.choice.as_deref(), Some("1"));
            }
            other => panic!("unexpected expr: {other:?}"),
        }
    }

    #[test]
    fn unknown_field_is_a_compile_error() {
        let registry = demo_registry();
        let err = compile("[nonexistent] = 1", &registry).unwrap_err();
        assert!(matches!(
            err,
            crate::error::DictionaryError::UnknownField { ref name } if name == "nonexistent"
        ));
    }

    #[test]
    fn unknown_choice_is_a_compile_error() {
        let registry = demo_registry();
        let err = compile("[consent(9)] = 1", &registry).unwrap_err();
        assert!(matches!(
            err,
            crate::error::DictionaryError::UnknownField { ref name } if name == "[consent(9)]"
        ));
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let registry = demo_registry();
        let expr = compile("[age] > 18 or [age] < 5 and [consent(1)] = 1", &registry).unwrap();
        // or(a, and(b, c))
        assert!(matches!(expr, LogicExpr::Or(_, ref rhs) if matches!(**rhs, LogicExpr::And(_, _))));
    }

    #[test]
    fn parentheses_override_precedence() {
        let registry = demo_registry();
        let expr = compile("([age] > 18 or [age] < 5) and [consent(1)] = 1", &registry).unwrap();
        assert!(matches!(expr, LogicExpr::And(ref lhs, _) if matches!(**lhs, LogicExpr::Or(_, _))));
    }

    #[test]
    fn quoted_strings_are_literals() {
        let registry = demo_registry();
        let expr = compile("[name] = 'Ada'", &registry).unwrap();
        match expr {
            LogicExpr::Cmp { rhs: Operand::Text(s), .. } => assert_eq!(s, "Ada"),
            other => panic!("unexpected expr: {other:?}"),
        }
    }

    #[test]
    fn syntax_errors_carry_fragment_and_position() {
        let registry = demo_registry();
        let err = compile("[age] > 18 nonsense", &registry).unwrap_err();
        match err {
            crate::error::DictionaryError::Syntax { fragment, position } => {
                assert_eq!(fragment, "nonsense");
                assert_eq!(position, 11);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
