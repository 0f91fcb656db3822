#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use pretty_assertions::assert_eq;
use tessa_ir::{AssignOp, BinaryOp, Span, UnaryOp};
use tessa_tree::{maybe_compound_binary_expression, Expr, ExprKind};
use tessa_value::{Complex, Value};

use super::{constant, evaluator, id, mat, num};
use crate::TreeEvaluator;

/// `name = name op rhs` with the assignment fusion selected.
fn fused_update(name: &str, op: BinaryOp, rhs: Expr) -> Expr {
    let fused =
        maybe_compound_binary_expression(id(name), rhs, op, Span::UNKNOWN, Some(AssignOp::Assign));
    assert!(matches!(fused.kind, ExprKind::CompoundBinary(_)));
    Expr::assign(id(name), AssignOp::Assign, fused, Span::UNKNOWN)
}

/// `lhs op rhs` with an operand fusion selected when one applies.
fn fused(lhs: Expr, op: BinaryOp, rhs: Expr) -> Expr {
    maybe_compound_binary_expression(lhs, rhs, op, Span::UNKNOWN, None)
}

fn t(expr: Expr) -> Expr {
    Expr::unary(UnaryOp::Transpose, expr, Span::UNKNOWN)
}

fn h(expr: Expr) -> Expr {
    Expr::unary(UnaryOp::Hermitian, expr, Span::UNKNOWN)
}

fn not(expr: Expr) -> Expr {
    Expr::unary(UnaryOp::Not, expr, Span::UNKNOWN)
}

/// Evaluate `expr` and the tree it wraps; both must agree exactly,
/// errors included.
fn same_as_unfused(eval: &mut TreeEvaluator, expr: &Expr) -> Result<Value, String> {
    let ExprKind::CompoundBinary(compound) = &expr.kind else {
        panic!("expected a fused node, got {expr:?}");
    };
    let plain = Expr::new(ExprKind::Binary(compound.binary().clone()), expr.span);
    let fused = eval.evaluate(expr).map_err(|e| e.message);
    let unfused = eval.evaluate(&plain).map_err(|e| e.message);
    assert_eq!(fused, unfused);
    fused
}

// Assignment fusion

#[test]
fn add_assign_updates_the_variable() {
    let (mut eval, _) = evaluator();
    eval.env_mut().set("x", mat(&[&[1.0, 2.0], &[3.0, 4.0]]));
    let result = eval
        .evaluate(&fused_update("x", BinaryOp::Add, constant(mat(&[&[1.0, 1.0], &[1.0, 1.0]]))))
        .unwrap();
    assert_eq!(result, mat(&[&[2.0, 3.0], &[4.0, 5.0]]));
    assert_eq!(eval.env().get("x"), Some(&mat(&[&[2.0, 3.0], &[4.0, 5.0]])));
}

#[test]
fn another_handle_keeps_the_old_value() {
    let (mut eval, _) = evaluator();
    let original = mat(&[&[1.0, 2.0], &[3.0, 4.0]]);
    eval.env_mut().set("x", original.clone());
    eval.env_mut().set("y", original.clone());

    eval.evaluate(&fused_update("x", BinaryOp::ElMul, num(10.0)))
        .unwrap();

    assert_eq!(eval.env().get("x"), Some(&mat(&[&[10.0, 20.0], &[30.0, 40.0]])));
    assert_eq!(eval.env().get("y"), Some(&mat(&[&[1.0, 2.0], &[3.0, 4.0]])));
    assert_eq!(original, mat(&[&[1.0, 2.0], &[3.0, 4.0]]));
}

#[test]
fn unshared_variable_is_updated_without_copying() {
    let (mut eval, _) = evaluator();
    eval.env_mut().set("x", mat(&[&[1.0, 2.0]]));
    let result = eval
        .evaluate(&fused_update("x", BinaryOp::Sub, num(1.0)))
        .unwrap();
    // The result and the variable are the same representation.
    assert!(eval.env().get("x").unwrap().shares_rep_with(&result));
    assert_eq!(result, mat(&[&[0.0, 1.0]]));
}

#[test]
fn complex_target_accepts_real_update() {
    let (mut eval, _) = evaluator();
    eval.env_mut().set(
        "z",
        Value::complex_row_vector(vec![Complex::new(1.0, 1.0), Complex::new(2.0, -1.0)]),
    );
    eval.evaluate(&fused_update("z", BinaryOp::Add, constant(mat(&[&[1.0, 1.0]]))))
        .unwrap();
    assert_eq!(
        eval.env().get("z"),
        Some(&Value::complex_row_vector(vec![
            Complex::new(2.0, 1.0),
            Complex::new(3.0, -1.0)
        ]))
    );
}

#[test]
fn update_that_cancels_imaginary_parts_narrows() {
    let (mut eval, _) = evaluator();
    eval.env_mut().set(
        "z",
        Value::complex_row_vector(vec![Complex::new(1.0, 1.0), Complex::new(2.0, 1.0)]),
    );
    let i = Value::complex(Complex::new(0.0, 1.0));
    let result = eval
        .evaluate(&fused_update("z", BinaryOp::Sub, constant(i)))
        .unwrap();
    assert!(result.is_real_matrix());
    assert_eq!(result, mat(&[&[1.0, 2.0]]));
}

#[test]
fn failed_update_leaves_the_variable_alone() {
    let (mut eval, _) = evaluator();
    eval.env_mut().set("x", mat(&[&[1.0, 2.0]]));
    let err = eval
        .evaluate(&fused_update("x", BinaryOp::Add, constant(mat(&[&[1.0, 2.0, 3.0]]))))
        .unwrap_err();
    assert!(err.is_dimension_mismatch());
    assert_eq!(eval.env().get("x"), Some(&mat(&[&[1.0, 2.0]])));
}

#[test]
fn unset_variable_reports_it_undefined() {
    let (mut eval, _) = evaluator();
    let err = eval
        .evaluate(&fused_update("x", BinaryOp::Add, num(1.0)))
        .unwrap_err();
    assert_eq!(err.message, "'x' undefined");
    assert!(!eval.env().contains("x"));
}

#[test]
fn rebinding_inside_the_update_uses_the_value_read_first() {
    let (mut eval, _) = evaluator();
    eval.env_mut().set("x", mat(&[&[1.0, 2.0]]));
    let rebind = Expr::assign(id("x"), AssignOp::Assign, num(5.0), Span::UNKNOWN);
    let result = eval
        .evaluate(&fused_update("x", BinaryOp::Add, rebind))
        .unwrap();
    assert_eq!(result, mat(&[&[6.0, 7.0]]));
    assert_eq!(eval.env().get("x"), Some(&mat(&[&[6.0, 7.0]])));
}

#[test]
fn non_elementwise_operators_take_the_general_path() {
    let (mut eval, _) = evaluator();
    eval.env_mut().set("x", mat(&[&[1.0, 1.0], &[0.0, 1.0]]));
    eval.evaluate(&fused_update("x", BinaryOp::Mul, id("x")))
        .unwrap();
    assert_eq!(eval.env().get("x"), Some(&mat(&[&[1.0, 2.0], &[0.0, 1.0]])));

    eval.env_mut().set("s", Value::scalar(2.0));
    eval.evaluate(&fused_update("s", BinaryOp::ElPow, num(3.0)))
        .unwrap();
    assert_eq!(eval.env().get("s"), Some(&Value::scalar(8.0)));
}

// Operand fusion

#[test]
fn transposed_products_match_unfused() {
    let (mut eval, _) = evaluator();
    eval.env_mut().set("a", mat(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]));
    eval.env_mut().set("b", mat(&[&[1.0, 0.0], &[0.0, 1.0]]));

    let v = same_as_unfused(&mut eval, &fused(t(id("a")), BinaryOp::Mul, id("b"))).unwrap();
    assert_eq!(v, mat(&[&[1.0, 4.0], &[2.0, 5.0], &[3.0, 6.0]]));
    same_as_unfused(&mut eval, &fused(id("b"), BinaryOp::Mul, h(id("b")))).unwrap();
    same_as_unfused(&mut eval, &fused(id("a"), BinaryOp::Mul, t(id("a")))).unwrap();
}

#[test]
fn hermitian_products_conjugate() {
    let (mut eval, _) = evaluator();
    eval.env_mut().set(
        "z",
        Value::complex_row_vector(vec![Complex::new(1.0, 2.0), Complex::new(3.0, -1.0)]),
    );
    // z * z' is the squared norm, real.
    let v = same_as_unfused(&mut eval, &fused(id("z"), BinaryOp::Mul, h(id("z")))).unwrap();
    assert_eq!(v, Value::scalar(15.0));
    let v = same_as_unfused(&mut eval, &fused(h(id("z")), BinaryOp::Mul, id("z"))).unwrap();
    assert!(v.is_complex_matrix());
    assert_eq!(v.dims(), (2, 2));
}

#[test]
fn nonconformant_transposed_product_reports_transposed_shape() {
    let (mut eval, _) = evaluator();
    eval.env_mut().set("a", mat(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]));
    eval.env_mut().set("c", mat(&[&[1.0, 2.0]]));
    let err = same_as_unfused(&mut eval, &fused(t(id("a")), BinaryOp::Mul, id("c"))).unwrap_err();
    assert_eq!(
        err,
        "operator *: nonconformant arguments (op1 is 3x2, op2 is 1x2)"
    );
}

#[test]
fn negated_logical_operands_match_unfused() {
    let (mut eval, _) = evaluator();
    eval.env_mut().set("a", mat(&[&[0.0, 1.0, 2.0, 0.0]]));
    eval.env_mut().set("b", mat(&[&[1.0, 1.0, 0.0, 0.0]]));

    let v = same_as_unfused(&mut eval, &fused(not(id("a")), BinaryOp::ElAnd, id("b"))).unwrap();
    assert_eq!(v, mat(&[&[1.0, 0.0, 0.0, 0.0]]));
    let v = same_as_unfused(&mut eval, &fused(id("a"), BinaryOp::ElOr, not(id("b")))).unwrap();
    assert_eq!(v, mat(&[&[0.0, 1.0, 1.0, 1.0]]));
    same_as_unfused(&mut eval, &fused(not(id("a")), BinaryOp::ElOr, num(0.0))).unwrap();
    same_as_unfused(&mut eval, &fused(id("b"), BinaryOp::ElAnd, not(num(0.0)))).unwrap();
}

#[test]
fn negating_nan_fails_the_same_way() {
    let (mut eval, _) = evaluator();
    eval.env_mut().set("a", mat(&[&[f64::NAN, 1.0]]));
    let err = same_as_unfused(&mut eval, &fused(not(id("a")), BinaryOp::ElAnd, id("a"))).unwrap_err();
    assert_eq!(err, "logical conversion from NaN value");
}

#[test]
fn string_operands_fall_back() {
    let (mut eval, _) = evaluator();
    eval.env_mut().set("s", Value::string("ab"));
    let v = same_as_unfused(&mut eval, &fused(id("s"), BinaryOp::Mul, t(id("s")))).unwrap();
    assert_eq!(v, Value::scalar(97.0 * 97.0 + 98.0 * 98.0));
}
