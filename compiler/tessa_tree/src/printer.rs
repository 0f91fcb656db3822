//! Code printer.
//!
//! Regenerates source text from a tree. Parentheses are inserted only
//! where operator precedence requires them, so printing a parsed
//! expression gives back an equivalent expression, not necessarily the
//! original spelling. Fused nodes print as the binary expression they
//! wrap.

use tessa_ir::{AssignOp, Span};
use tessa_value::Value;

use crate::walker::{walk_statement, walk_statement_list};
use crate::{
    BinaryExpr, ColonExpr, CompoundBinaryExpr, Expr, ExprKind, IndexExpr, MultiAssignment,
    SimpleAssignment, SpmdCommand, Statement, StatementKind, StatementList, TreeWalker,
    UnaryExpr,
};

const COLON_PRECEDENCE: u8 = 6;
const ATOM_PRECEDENCE: u8 = 12;

/// Walker that accumulates source text.
#[derive(Default)]
pub struct TreePrinter {
    out: String,
    indent: usize,
}

impl TreePrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the printer and return the text produced so far.
    pub fn finish(self) -> String {
        self.out
    }

    fn print_operand(&mut self, expr: &Expr, min_precedence: u8) {
        if precedence(expr) < min_precedence {
            self.out.push('(');
            expr.accept(self);
            self.out.push(')');
        } else {
            expr.accept(self);
        }
    }

    fn print_list(&mut self, exprs: &[Expr]) {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            expr.accept(self);
        }
    }

    fn print_binary(&mut self, expr: &BinaryExpr) {
        let prec = expr.op.precedence();
        self.print_operand(&expr.lhs, prec);
        self.out.push(' ');
        self.out.push_str(expr.op.as_symbol());
        self.out.push(' ');
        self.print_operand(&expr.rhs, prec + 1);
    }

    fn push_indent(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
    }
}

/// Binding strength of the node at the root of `expr`.
fn precedence(expr: &Expr) -> u8 {
    match &expr.kind {
        ExprKind::Binary(binary) => binary.op.precedence(),
        ExprKind::CompoundBinary(compound) => compound.binary().op.precedence(),
        ExprKind::Unary(unary) => unary.op.precedence(),
        ExprKind::Colon(_) => COLON_PRECEDENCE,
        ExprKind::Assign(_) | ExprKind::MultiAssign(_) => 0,
        ExprKind::Constant(_)
        | ExprKind::Identifier(_)
        | ExprKind::MagicColon
        | ExprKind::Index(_) => ATOM_PRECEDENCE,
    }
}

impl TreeWalker for TreePrinter {
    fn visit_constant(&mut self, value: &Value, _span: Span) {
        self.out.push_str(&value.print_code());
    }

    fn visit_identifier(&mut self, name: &str, _span: Span) {
        self.out.push_str(name);
    }

    fn visit_magic_colon(&mut self, _span: Span) {
        self.out.push(':');
    }

    fn visit_colon_expression(&mut self, expr: &ColonExpr, _span: Span) {
        self.print_operand(&expr.base, COLON_PRECEDENCE + 1);
        if let Some(increment) = &expr.increment {
            self.out.push(':');
            self.print_operand(increment, COLON_PRECEDENCE + 1);
        }
        self.out.push(':');
        self.print_operand(&expr.limit, COLON_PRECEDENCE + 1);
    }

    fn visit_binary_expression(&mut self, expr: &BinaryExpr, _span: Span) {
        self.print_binary(expr);
    }

    fn visit_compound_binary_expression(&mut self, expr: &CompoundBinaryExpr, _span: Span) {
        self.print_binary(expr.binary());
    }

    fn visit_unary_expression(&mut self, expr: &UnaryExpr, _span: Span) {
        // Prefix operands bind one level tighter so `-(-a)` keeps its
        // parentheses instead of printing as a decrement.
        if expr.op.is_prefix() {
            self.out.push_str(expr.op.as_symbol());
            self.print_operand(&expr.operand, expr.op.precedence() + 1);
        } else {
            self.print_operand(&expr.operand, expr.op.precedence());
            self.out.push_str(expr.op.as_symbol());
        }
    }

    fn visit_index_expression(&mut self, expr: &IndexExpr, _span: Span) {
        self.print_operand(&expr.expr, ATOM_PRECEDENCE);
        self.out.push('(');
        self.print_list(&expr.args);
        self.out.push(')');
    }

    fn visit_simple_assignment(&mut self, expr: &SimpleAssignment, _span: Span) {
        expr.target.accept(self);
        self.out.push(' ');
        self.out.push_str(expr.op.as_symbol());
        self.out.push(' ');
        expr.rhs.accept(self);
    }

    fn visit_multi_assignment(&mut self, expr: &MultiAssignment, _span: Span) {
        self.out.push('[');
        self.print_list(&expr.targets);
        self.out.push_str("] ");
        self.out.push_str(AssignOp::Assign.as_symbol());
        self.out.push(' ');
        expr.rhs.accept(self);
    }

    fn visit_statement(&mut self, statement: &Statement) {
        self.push_indent();
        walk_statement(self, statement);
        if matches!(statement.kind, StatementKind::Expression(_)) && !statement.print_result {
            self.out.push(';');
        }
        self.out.push('\n');
    }

    fn visit_statement_list(&mut self, list: &StatementList) {
        walk_statement_list(self, list);
    }

    fn visit_spmd_command(&mut self, command: &SpmdCommand, _span: Span) {
        self.out.push_str("spmd\n");
        self.indent += 1;
        command.body.accept(self);
        self.indent -= 1;
        self.push_indent();
        self.out.push_str("endspmd");
    }
}

/// Source text for a single expression.
pub fn expression_to_code(expr: &Expr) -> String {
    let mut printer = TreePrinter::new();
    expr.accept(&mut printer);
    printer.finish()
}

/// Source text for a statement list, one statement per line.
pub fn statements_to_code(list: &StatementList) -> String {
    let mut printer = TreePrinter::new();
    list.accept(&mut printer);
    printer.finish()
}
