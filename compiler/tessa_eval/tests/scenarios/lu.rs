//! `lu` and `luupdate` through the evaluator.

use pretty_assertions::assert_eq;
use tessa_eval::{EvalConfig, TreeEvaluator};
use tessa_ir::{BinaryOp, Span, UnaryOp};
use tessa_tree::Expr;
use tessa_value::{Complex, MatrixType, Payload, Value};

use crate::common::{
    assign, call, constant, evaluator, id, mat, max_diff, num, program, quiet, CountingBackend,
};

const TOL: f64 = 1e-12;

fn a() -> Value {
    mat(&[&[4.0, 3.0, 1.0], &[6.0, 3.0, 2.0], &[2.0, 5.0, 7.0]])
}

fn multi(targets: &[&str], rhs: Expr) -> Expr {
    Expr::multi_assign(targets.iter().map(|name| id(name)).collect(), rhs, Span::UNKNOWN)
}

fn mul(lhs: Expr, rhs: Expr) -> Expr {
    Expr::binary(BinaryOp::Mul, lhs, rhs, Span::UNKNOWN)
}

fn add(lhs: Expr, rhs: Expr) -> Expr {
    Expr::binary(BinaryOp::Add, lhs, rhs, Span::UNKNOWN)
}

fn transpose(operand: Expr) -> Expr {
    Expr::unary(UnaryOp::Transpose, operand, Span::UNKNOWN)
}

fn value(eval: &mut TreeEvaluator, expr: &Expr) -> Value {
    eval.evaluate(expr).unwrap()
}

fn matrix_type(value: &Value) -> MatrixType {
    match value.payload() {
        Payload::RealMatrix(m) => m.matrix_type(),
        Payload::ComplexMatrix(m) => m.matrix_type(),
        _ => MatrixType::Unknown,
    }
}

#[test]
fn three_output_factorization() {
    let (mut eval, _) = evaluator(EvalConfig::new());
    eval.env_mut().set("A", a());
    let summary = eval.run(&program(vec![quiet(multi(
        &["L", "U", "P"],
        call("lu", vec![id("A")]),
    ))]));
    assert!(summary.is_success(), "{:?}", summary.errors);

    let env = eval.env();
    assert_eq!(matrix_type(env.get("L").unwrap()), MatrixType::Lower);
    assert_eq!(matrix_type(env.get("U").unwrap()), MatrixType::Upper);
    assert_eq!(matrix_type(env.get("P").unwrap()), MatrixType::Permutation);

    let pa = value(&mut eval, &mul(id("P"), id("A")));
    let lu = value(&mut eval, &mul(id("L"), id("U")));
    assert!(max_diff(&pa, &lu) < TOL);
}

#[test]
fn two_outputs_reproduce_the_input() {
    let (mut eval, _) = evaluator(EvalConfig::new());
    eval.env_mut().set("A", a());
    eval.run(&program(vec![quiet(multi(&["L", "U"], call("lu", vec![id("A")])))]));
    assert_eq!(
        matrix_type(eval.env().get("L").unwrap()),
        MatrixType::PermutedLower
    );
    let lu = value(&mut eval, &mul(id("L"), id("U")));
    assert!(max_diff(&lu, &a()) < TOL);
}

#[test]
fn vector_permutation_and_rectangular_input() {
    let (mut eval, _) = evaluator(EvalConfig::new());
    eval.env_mut().set("A", a());
    eval.run(&program(vec![quiet(multi(
        &["L", "U", "p"],
        call("lu", vec![id("A"), constant(Value::string("vector"))]),
    ))]));
    let p = eval.env().get("p").unwrap();
    assert_eq!(p.dims(), (3, 1));
    // The largest first-column entry (6, row 2) is pivoted to the top.
    assert_eq!(p.do_index(&[Value::scalar(1.0)]).unwrap(), Value::scalar(2.0));

    let tall = mat(&[&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]]);
    eval.env_mut().set("T", tall);
    eval.run(&program(vec![quiet(multi(&["L", "U"], call("lu", vec![id("T")])))]));
    assert_eq!(eval.env().get("L").unwrap().dims(), (3, 2));
    assert_eq!(eval.env().get("U").unwrap().dims(), (2, 2));
}

#[test]
fn single_output_is_the_packed_factorization() {
    let (mut eval, _) = evaluator(EvalConfig::new());
    let y = value(&mut eval, &call("lu", vec![constant(mat(&[&[2.0, 1.0], &[4.0, 1.0]]))]));
    assert_eq!(y, mat(&[&[4.0, 1.0], &[0.5, 0.5]]));
}

#[test]
fn update_matches_the_updated_matrix() {
    let (mut eval, _) = evaluator(EvalConfig::new());
    eval.env_mut().set("A", a());
    eval.env_mut().set("x", mat(&[&[1.0], &[0.0], &[2.0]]));
    eval.env_mut().set("y", mat(&[&[1.0], &[1.0], &[0.0]]));
    let summary = eval.run(&program(vec![
        quiet(multi(&["L", "U"], call("lu", vec![id("A")]))),
        quiet(multi(
            &["L1", "U1"],
            call("luupdate", vec![id("L"), id("U"), id("x"), id("y")]),
        )),
        quiet(multi(&["L", "U", "P"], call("lu", vec![id("A")]))),
        quiet(multi(
            &["L2", "U2", "P2"],
            call("luupdate", vec![id("L"), id("U"), id("P"), id("x"), id("y")]),
        )),
    ]));
    assert!(summary.is_success(), "{:?}", summary.errors);

    let updated = value(&mut eval, &add(id("A"), mul(id("x"), transpose(id("y")))));
    let lu1 = value(&mut eval, &mul(id("L1"), id("U1")));
    assert!(max_diff(&lu1, &updated) < TOL);

    let lu2 = value(&mut eval, &mul(id("L2"), id("U2")));
    let pa = value(
        &mut eval,
        &mul(id("P2"), add(id("A"), mul(id("x"), transpose(id("y"))))),
    );
    assert!(max_diff(&lu2, &pa) < TOL);
}

#[test]
fn mismatched_update_never_reaches_the_backend() {
    let backend = CountingBackend::default();
    let mut eval = TreeEvaluator::new(EvalConfig::new().output(tessa_eval::buffer_output()))
        .with_backend(backend.clone());
    let ones = constant(mat(&[&[1.0], &[1.0]]));
    let bad = call(
        "luupdate",
        vec![
            constant(mat(&[&[1.0, 0.0], &[0.0, 1.0]])),
            constant(mat(&[&[1.0, 2.0, 3.0]])),
            ones.clone(),
            ones.clone(),
        ],
    );
    let summary = eval.run(&program(vec![quiet(multi(&["L", "U"], bad))]));
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.errors[0].message, "luupdate: dimensions mismatch");
    assert_eq!(backend.calls(), 0);

    let good = call(
        "luupdate",
        vec![
            constant(mat(&[&[1.0, 0.0], &[0.0, 1.0]])),
            constant(mat(&[&[2.0, 1.0], &[0.0, 1.0]])),
            ones.clone(),
            ones,
        ],
    );
    assert!(eval.run(&program(vec![quiet(multi(&["L", "U"], good))])).is_success());
    assert_eq!(backend.calls(), 1);
}

#[test]
fn backend_failures_are_statement_errors() {
    let (mut eval, out) = evaluator(EvalConfig::new());
    let z = Value::complex(Complex::new(1.0, 1.0));
    let summary = eval.run(&program(vec![
        quiet(call("lu", vec![constant(z)])),
        quiet(assign("k", num(1.0))),
    ]));
    assert_eq!((summary.executed, summary.failed), (1, 1));
    assert_eq!(
        out.captured(),
        "error: lu: complex matrices are not supported by the numeric backend\n"
    );
}

#[test]
fn left_division_solves() {
    let (mut eval, _) = evaluator(EvalConfig::new());
    eval.env_mut().set("A", a());
    eval.env_mut().set("b", mat(&[&[1.0], &[2.0], &[3.0]]));
    let x = value(
        &mut eval,
        &Expr::binary(BinaryOp::LeftDiv, id("A"), id("b"), Span::UNKNOWN),
    );
    eval.env_mut().set("x", x);
    let ax = value(&mut eval, &mul(id("A"), id("x")));
    assert!(max_diff(&ax, &mat(&[&[1.0], &[2.0], &[3.0]])) < TOL);
}
