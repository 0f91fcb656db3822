//! Evaluator tests: operator dispatch, fused nodes, builtins and the
//! statement driver.

mod builtins_tests;
mod compound_tests;

use tessa_ir::Span;
use tessa_tree::{Expr, Statement, StatementList};
use tessa_value::{Matrix, Value};

use crate::{buffer_output, EvalConfig, SharedOutput, TreeEvaluator};

pub(crate) fn sp(line: u32, column: u32) -> Span {
    Span::new(line, column)
}

pub(crate) fn id(name: &str) -> Expr {
    Expr::identifier(name, Span::UNKNOWN)
}

pub(crate) fn num(x: f64) -> Expr {
    Expr::number(x, Span::UNKNOWN)
}

pub(crate) fn constant(value: Value) -> Expr {
    Expr::constant(value, Span::UNKNOWN)
}

#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
pub(crate) fn mat(rows: &[&[f64]]) -> Value {
    let rows: Vec<Vec<f64>> = rows.iter().map(|r| r.to_vec()).collect();
    Value::matrix(Matrix::from_rows(&rows).unwrap())
}

/// Evaluator writing into a buffer, with fusion on.
pub(crate) fn evaluator() -> (TreeEvaluator, SharedOutput) {
    let out = buffer_output();
    let eval = TreeEvaluator::new(EvalConfig::new().output(out.clone()));
    (eval, out)
}

pub(crate) fn shown(expr: Expr) -> Statement {
    Statement::expression(expr, true)
}

pub(crate) fn quiet(expr: Expr) -> Statement {
    Statement::expression(expr, false)
}

pub(crate) fn program(statements: Vec<Statement>) -> StatementList {
    statements.into_iter().collect()
}
