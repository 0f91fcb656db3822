//! Tree walkers.
//!
//! A [`TreeWalker`] has one `visit_*` method per node kind. Nodes dispatch
//! to it through `accept`, which matches on the node kind exhaustively, so
//! external passes never inspect node kinds themselves.
//!
//! None of the visit methods has a default: adding a node kind adds a
//! method here and every walker stops compiling until it handles the new
//! kind. Walkers that only care about a few kinds call the matching
//! `walk_*` function from the others to keep descending.
//!
//! # Example
//!
//! ```text
//! struct CountIdentifiers(usize);
//!
//! impl TreeWalker for CountIdentifiers {
//!     fn visit_identifier(&mut self, _name: &str, _span: Span) {
//!         self.0 += 1;
//!     }
//!     fn visit_binary_expression(&mut self, expr: &BinaryExpr, _span: Span) {
//!         walk_binary_expression(self, expr);
//!     }
//!     // ... one method per remaining node kind
//! }
//! ```

use tessa_ir::Span;
use tessa_value::Value;

use crate::{
    BinaryExpr, ColonExpr, Command, CompoundBinaryExpr, Expr, ExprKind, IndexExpr,
    MultiAssignment, SimpleAssignment, SpmdCommand, Statement, StatementKind, StatementList,
    UnaryExpr,
};

/// Visitor over the parse tree.
pub trait TreeWalker {
    fn visit_constant(&mut self, value: &Value, span: Span);

    fn visit_identifier(&mut self, name: &str, span: Span);

    fn visit_magic_colon(&mut self, span: Span);

    fn visit_colon_expression(&mut self, expr: &ColonExpr, span: Span);

    fn visit_binary_expression(&mut self, expr: &BinaryExpr, span: Span);

    /// Fused node. [`walk_compound_binary_expression`] descends into the
    /// wrapped binary expression, which is what the user wrote.
    fn visit_compound_binary_expression(&mut self, expr: &CompoundBinaryExpr, span: Span);

    fn visit_unary_expression(&mut self, expr: &UnaryExpr, span: Span);

    fn visit_index_expression(&mut self, expr: &IndexExpr, span: Span);

    fn visit_simple_assignment(&mut self, expr: &SimpleAssignment, span: Span);

    fn visit_multi_assignment(&mut self, expr: &MultiAssignment, span: Span);

    fn visit_statement(&mut self, statement: &Statement);

    fn visit_statement_list(&mut self, list: &StatementList);

    fn visit_spmd_command(&mut self, command: &SpmdCommand, span: Span);
}

// Dispatch

impl Expr {
    /// Call the walker method for this node's kind.
    pub fn accept<W: TreeWalker + ?Sized>(&self, walker: &mut W) {
        tessa_stack::ensure_sufficient_stack(|| match &self.kind {
            ExprKind::Constant(value) => walker.visit_constant(value, self.span),
            ExprKind::Identifier(name) => walker.visit_identifier(name, self.span),
            ExprKind::MagicColon => walker.visit_magic_colon(self.span),
            ExprKind::Colon(colon) => walker.visit_colon_expression(colon, self.span),
            ExprKind::Binary(binary) => walker.visit_binary_expression(binary, self.span),
            ExprKind::CompoundBinary(compound) => {
                walker.visit_compound_binary_expression(compound, self.span);
            }
            ExprKind::Unary(unary) => walker.visit_unary_expression(unary, self.span),
            ExprKind::Index(index) => walker.visit_index_expression(index, self.span),
            ExprKind::Assign(assign) => walker.visit_simple_assignment(assign, self.span),
            ExprKind::MultiAssign(multi) => walker.visit_multi_assignment(multi, self.span),
        });
    }
}

impl Statement {
    pub fn accept<W: TreeWalker + ?Sized>(&self, walker: &mut W) {
        walker.visit_statement(self);
    }
}

impl StatementList {
    pub fn accept<W: TreeWalker + ?Sized>(&self, walker: &mut W) {
        walker.visit_statement_list(self);
    }
}

impl Command {
    pub fn accept<W: TreeWalker + ?Sized>(&self, walker: &mut W, span: Span) {
        match self {
            Command::Spmd(spmd) => walker.visit_spmd_command(spmd, span),
        }
    }
}

// Walk functions

pub fn walk_colon_expression<W: TreeWalker + ?Sized>(walker: &mut W, expr: &ColonExpr) {
    expr.base.accept(walker);
    if let Some(increment) = &expr.increment {
        increment.accept(walker);
    }
    expr.limit.accept(walker);
}

pub fn walk_binary_expression<W: TreeWalker + ?Sized>(walker: &mut W, expr: &BinaryExpr) {
    expr.lhs.accept(walker);
    expr.rhs.accept(walker);
}

/// Walk the wrapped binary expression. The fused operand pair is reachable
/// through [`CompoundBinaryExpr::clhs`] and [`CompoundBinaryExpr::crhs`]
/// for walkers that want it.
pub fn walk_compound_binary_expression<W: TreeWalker + ?Sized>(
    walker: &mut W,
    expr: &CompoundBinaryExpr,
) {
    walk_binary_expression(walker, expr.binary());
}

pub fn walk_unary_expression<W: TreeWalker + ?Sized>(walker: &mut W, expr: &UnaryExpr) {
    expr.operand.accept(walker);
}

pub fn walk_index_expression<W: TreeWalker + ?Sized>(walker: &mut W, expr: &IndexExpr) {
    expr.expr.accept(walker);
    for arg in &expr.args {
        arg.accept(walker);
    }
}

pub fn walk_simple_assignment<W: TreeWalker + ?Sized>(walker: &mut W, expr: &SimpleAssignment) {
    expr.target.accept(walker);
    expr.rhs.accept(walker);
}

pub fn walk_multi_assignment<W: TreeWalker + ?Sized>(walker: &mut W, expr: &MultiAssignment) {
    for target in &expr.targets {
        target.accept(walker);
    }
    expr.rhs.accept(walker);
}

pub fn walk_statement<W: TreeWalker + ?Sized>(walker: &mut W, statement: &Statement) {
    match &statement.kind {
        StatementKind::Expression(expr) => expr.accept(walker),
        StatementKind::Command(command) => command.accept(walker, statement.span),
    }
}

pub fn walk_statement_list<W: TreeWalker + ?Sized>(walker: &mut W, list: &StatementList) {
    for statement in list {
        statement.accept(walker);
    }
}

pub fn walk_spmd_command<W: TreeWalker + ?Sized>(walker: &mut W, command: &SpmdCommand) {
    command.body.accept(walker);
}
