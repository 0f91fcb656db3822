use pretty_assertions::assert_eq;
use tessa_ir::{AssignOp, BinaryOp, Span, UnaryOp};
use tessa_value::Value;

use super::{id, num};
use crate::{
    expression_to_code, maybe_compound_binary_expression, statements_to_code, Expr, Statement,
    StatementList,
};

fn bin(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::binary(op, lhs, rhs, Span::UNKNOWN)
}

fn un(op: UnaryOp, operand: Expr) -> Expr {
    Expr::unary(op, operand, Span::UNKNOWN)
}

#[test]
fn parenthesizes_only_where_needed() {
    let sum = bin(BinaryOp::Add, id("a"), id("b"));
    assert_eq!(
        expression_to_code(&bin(BinaryOp::Mul, sum.clone(), id("c"))),
        "(a + b) * c"
    );
    assert_eq!(
        expression_to_code(&bin(BinaryOp::Add, id("c"), bin(BinaryOp::Mul, id("a"), id("b")))),
        "c + a * b"
    );
    assert_eq!(
        expression_to_code(&bin(BinaryOp::Sub, id("a"), sum.clone())),
        "a - (a + b)"
    );
    assert_eq!(expression_to_code(&bin(BinaryOp::Sub, sum, id("c"))), "a + b - c");
}

#[test]
fn unary_operators_print_in_position() {
    assert_eq!(expression_to_code(&un(UnaryOp::Hermitian, id("a"))), "a'");
    assert_eq!(expression_to_code(&un(UnaryOp::Transpose, id("a"))), "a.'");
    assert_eq!(
        expression_to_code(&un(UnaryOp::Neg, un(UnaryOp::Neg, id("a")))),
        "-(-a)"
    );
    assert_eq!(
        expression_to_code(&un(UnaryOp::Hermitian, bin(BinaryOp::Add, id("a"), id("b")))),
        "(a + b)'"
    );
    assert_eq!(expression_to_code(&un(UnaryOp::PostIncrement, id("i"))), "i++");
}

#[test]
fn fused_node_prints_what_was_written() {
    let fused = maybe_compound_binary_expression(
        un(UnaryOp::Hermitian, id("a")),
        id("b"),
        BinaryOp::Mul,
        Span::UNKNOWN,
        None,
    );
    assert_eq!(expression_to_code(&fused), "a' * b");

    let update = maybe_compound_binary_expression(
        id("c"),
        id("d"),
        BinaryOp::ElDiv,
        Span::UNKNOWN,
        Some(AssignOp::Assign),
    );
    assert_eq!(expression_to_code(&update), "c ./ d");
}

#[test]
fn ranges_indexing_and_assignment() {
    let range = Expr::colon(num(1.0), Some(num(2.0)), num(9.0), Span::UNKNOWN);
    assert_eq!(expression_to_code(&range), "1:2:9");

    let index = Expr::index(
        id("m"),
        vec![Expr::magic_colon(Span::UNKNOWN), num(2.0)],
        Span::UNKNOWN,
    );
    assert_eq!(expression_to_code(&index), "m(:, 2)");

    let assign = Expr::assign(id("x"), AssignOp::AddAssign, num(1.0), Span::UNKNOWN);
    assert_eq!(expression_to_code(&assign), "x += 1");

    let multi = Expr::multi_assign(
        vec![id("l"), id("u")],
        Expr::index(id("lu"), vec![id("a")], Span::UNKNOWN),
        Span::UNKNOWN,
    );
    assert_eq!(expression_to_code(&multi), "[l, u] = lu(a)");
}

#[test]
fn constants_use_stashed_text() {
    let mut value = Value::scalar(0.1);
    value.stash_original_text("1e-1");
    assert_eq!(
        expression_to_code(&Expr::constant(value, Span::UNKNOWN)),
        "1e-1"
    );
}

#[test]
fn statements_print_one_per_line() {
    let body: StatementList = vec![Statement::expression(id("y"), true)]
        .into_iter()
        .collect();
    let list: StatementList = vec![
        Statement::expression(
            Expr::assign(id("x"), AssignOp::Assign, num(3.0), Span::UNKNOWN),
            false,
        ),
        Statement::spmd(body, Span::UNKNOWN),
    ]
    .into_iter()
    .collect();
    assert_eq!(statements_to_code(&list), "x = 3;\nspmd\n  y\nendspmd\n");
}
