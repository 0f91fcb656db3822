//! Tessa parse tree.
//!
//! The tree the evaluator runs and walkers traverse:
//! - [`Expr`] / [`ExprKind`]: expression nodes, each owning its children
//! - [`Statement`], [`Command`] and [`StatementList`]
//! - [`maybe_compound_binary_expression`]: picks a fused node over a plain
//!   binary node when the fusion table allows it
//! - [`TreeWalker`]: one visit method per node kind, reached through
//!   `accept`
//! - [`TreePrinter`]: walker that regenerates source text
//!
//! The parser is not part of this crate. Trees are built with the
//! constructors on [`Expr`] and [`Statement`].

mod expr;
mod printer;
mod selector;
mod statement;
pub mod walker;

pub use expr::{
    BinaryExpr, ColonExpr, CompoundBinaryExpr, Expr, ExprKind, IndexExpr, MultiAssignment,
    SimpleAssignment, UnaryExpr,
};
pub use printer::{expression_to_code, statements_to_code, TreePrinter};
pub use selector::{fuse_compound_expressions, maybe_compound_binary_expression};
pub use statement::{Command, SpmdCommand, Statement, StatementKind, StatementList};
pub use walker::TreeWalker;

#[cfg(test)]
mod tests;
