//! Fused evaluation must be indistinguishable from the unfused tree.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tessa_eval::{EvalConfig, TreeEvaluator};
use tessa_ir::{BinaryOp, Span, UnaryOp};
use tessa_tree::{Expr, StatementList};
use tessa_value::{Complex, Matrix, TypeTag, Value};

use crate::common::{assign, constant, evaluator, id, mat, program, quiet, shown};

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::binary(op, lhs, rhs, Span::UNKNOWN)
}

fn unary(op: UnaryOp, operand: Expr) -> Expr {
    Expr::unary(op, operand, Span::UNKNOWN)
}

#[test]
fn add_assign_in_place_leaves_other_handles_alone() {
    let (mut eval, out) = evaluator(EvalConfig::new());
    let summary = eval.run(&program(vec![
        quiet(assign("x", constant(mat(&[&[1.0, 2.0], &[3.0, 4.0]])))),
        quiet(assign("y", id("x"))),
        shown(assign(
            "x",
            binary(BinaryOp::Add, id("x"), constant(mat(&[&[1.0, 1.0], &[1.0, 1.0]]))),
        )),
    ]));
    assert!(summary.is_success());
    assert_eq!(eval.env().get("x"), Some(&mat(&[&[2.0, 3.0], &[4.0, 5.0]])));
    assert_eq!(eval.env().get("y"), Some(&mat(&[&[1.0, 2.0], &[3.0, 4.0]])));
    assert_eq!(out.captured(), "x =\n\n  2  3\n  4  5\n\n");
}

#[test]
fn repeated_updates_in_a_loop_body() {
    let (mut eval, _) = evaluator(EvalConfig::new());
    let step = || {
        let factor = constant(mat(&[&[2.0, 3.0]]));
        quiet(assign("acc", binary(BinaryOp::ElMul, id("acc"), factor)))
    };
    let mut statements = vec![quiet(assign("acc", constant(mat(&[&[1.0, 1.0]]))))];
    statements.extend((0..4).map(|_| step()));
    assert!(eval.run(&program(statements)).is_success());
    assert_eq!(eval.env().get("acc"), Some(&mat(&[&[16.0, 81.0]])));
}

/// Observable state after a run: every named variable, bit for bit, and
/// the reported errors.
#[derive(Debug, PartialEq)]
struct Outcome {
    variables: Vec<(String, Option<(TypeTag, (usize, usize), Vec<u64>)>)>,
    errors: Vec<String>,
}

fn snapshot(value: &Value) -> (TypeTag, (usize, usize), Vec<u64>) {
    let bits = if value.is_complex_type() {
        value
            .complex_matrix_value(false)
            .unwrap()
            .elements()
            .iter()
            .flat_map(|z| [z.re.to_bits(), z.im.to_bits()])
            .collect()
    } else {
        value
            .matrix_value(false)
            .unwrap()
            .elements()
            .iter()
            .map(|x| x.to_bits())
            .collect()
    };
    (value.type_tag(), value.dims(), bits)
}

fn run(list: &StatementList, fusion: bool) -> Outcome {
    let mut eval = TreeEvaluator::new(
        EvalConfig::new()
            .compound_fusion(fusion)
            .output(tessa_eval::buffer_output()),
    );
    let summary = eval.run(list);
    let variables = ["x", "y", "p", "q", "r", "s"]
        .iter()
        .map(|name| (name.to_string(), eval.env().get(name).map(snapshot)))
        .collect();
    Outcome {
        variables,
        errors: summary.errors.into_iter().map(|e| e.message).collect(),
    }
}

fn scenario(a: Value, b: Value, op: BinaryOp) -> StatementList {
    program(vec![
        quiet(assign("x", constant(a))),
        quiet(assign("y", id("x"))),
        quiet(assign("x", binary(op, id("x"), constant(b.clone())))),
        quiet(assign(
            "p",
            binary(BinaryOp::Mul, unary(UnaryOp::Transpose, id("y")), constant(b.clone())),
        )),
        quiet(assign(
            "q",
            binary(BinaryOp::Mul, id("y"), unary(UnaryOp::Hermitian, constant(b.clone()))),
        )),
        quiet(assign(
            "r",
            binary(BinaryOp::ElAnd, unary(UnaryOp::Not, id("y")), constant(b.clone())),
        )),
        quiet(assign(
            "s",
            binary(BinaryOp::ElOr, id("y"), unary(UnaryOp::Not, constant(b))),
        )),
    ])
}

/// Quarter-integers in [-2, 2), with NaN, both infinities and negative
/// zero mixed in.
fn element_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => (-8i32..8).prop_map(|x| f64::from(x) / 4.0),
        1 => Just(f64::NAN),
        1 => Just(f64::INFINITY),
        1 => Just(f64::NEG_INFINITY),
        1 => Just(-0.0),
    ]
}

fn matrix_strategy() -> impl Strategy<Value = Value> {
    (1usize..4, 1usize..4, any::<bool>()).prop_flat_map(|(rows, cols, complex)| {
        prop::collection::vec((element_strategy(), element_strategy()), rows * cols).prop_map(
            move |cells| {
                if complex {
                    let z = cells.iter().map(|&(re, im)| Complex::new(re, im)).collect();
                    Value::complex_matrix(Matrix::from_column_major(rows, cols, z).unwrap())
                } else {
                    let re = cells.iter().map(|&(re, _)| re).collect();
                    Value::matrix(Matrix::from_column_major(rows, cols, re).unwrap())
                }
            },
        )
    })
}

fn op_strategy() -> impl Strategy<Value = BinaryOp> {
    prop::sample::select(vec![
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::ElMul,
        BinaryOp::ElDiv,
        BinaryOp::ElLeftDiv,
        BinaryOp::ElPow,
        BinaryOp::ElAnd,
        BinaryOp::ElOr,
    ])
}

#[test]
fn special_values_agree_with_and_without_fusion() {
    let (nan, inf) = (f64::NAN, f64::INFINITY);
    let a = mat(&[&[nan, inf], &[-0.0, 1.0]]);
    let b = mat(&[&[inf, -inf], &[-0.0, 2.0]]);
    for op in [BinaryOp::Add, BinaryOp::Sub, BinaryOp::ElMul, BinaryOp::ElDiv] {
        let list = scenario(a.clone(), b.clone(), op);
        assert_eq!(run(&list, true), run(&list, false));
    }

    let z = vec![
        Complex::new(inf, -0.0),
        Complex::new(0.0, nan),
        Complex::new(-0.0, -inf),
        Complex::new(1.0, 1.0),
    ];
    let z = Value::complex_matrix(Matrix::from_column_major(2, 2, z).unwrap());
    let list = scenario(z.clone(), b.clone(), BinaryOp::ElLeftDiv);
    assert_eq!(run(&list, true), run(&list, false));
    let list = scenario(b, z, BinaryOp::ElMul);
    assert_eq!(run(&list, true), run(&list, false));
}

proptest! {
    #[test]
    fn fused_and_unfused_runs_agree(
        a in matrix_strategy(),
        b in matrix_strategy(),
        op in op_strategy(),
    ) {
        let list = scenario(a, b, op);
        prop_assert_eq!(run(&list, true), run(&list, false));
    }
}
