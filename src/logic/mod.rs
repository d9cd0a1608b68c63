//! The logic translator: compile, evaluate and render branching logic.
//!
//! The dictionary's conditional-display language is compiled once into a
//! [`LogicExpr`] tree and evaluated by a safe interpreter; there is no
//! string evaluation anywhere in this path.

pub mod ast;
pub mod eval;
pub mod parser;
pub mod render;
pub mod rewrite;

pub use ast::{CmpOp, LogicExpr, Operand, TriState, VarRef};
pub use eval::{Snapshot, ValueSnapshot, evaluate};
pub use parser::compile;
pub use render::render;
pub use rewrite::{from_eval_syntax, to_eval_syntax};
