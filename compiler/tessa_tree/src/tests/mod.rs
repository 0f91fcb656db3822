//! Tree construction, selection, walking and printing tests.

mod printer_tests;

use tessa_ir::Span;

use crate::Expr;

pub(crate) fn sp(line: u32, column: u32) -> Span {
    Span::new(line, column)
}

pub(crate) fn id(name: &str) -> Expr {
    Expr::identifier(name, Span::UNKNOWN)
}

pub(crate) fn num(x: f64) -> Expr {
    Expr::number(x, Span::UNKNOWN)
}
