#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use std::cell::Cell;

use pretty_assertions::assert_eq;
use tessa_value::{Matrix, MatrixType, Payload, Value};

use super::mat;
use crate::{
    BackendError, Builtin, LuFactors, LuUpdateRequest, NumericBackend, NumericMatrix,
    UnavailableBackend,
};

/// Backend that returns canned factors of `[4 3; 6 3]` and counts calls.
#[derive(Default)]
struct Canned {
    calls: Cell<usize>,
}

impl Canned {
    fn factors() -> LuFactors {
        // P * A = L * U with rows swapped.
        let l = Matrix::from_rows(&[vec![1.0, 0.0], vec![4.0 / 6.0, 1.0]]).unwrap();
        let u = Matrix::from_rows(&[vec![6.0, 3.0], vec![0.0, 1.0]]).unwrap();
        LuFactors {
            l: NumericMatrix::Real(l),
            u: NumericMatrix::Real(u),
            perm: vec![1, 0],
        }
    }
}

impl NumericBackend for Canned {
    fn lu(&self, _a: &NumericMatrix) -> Result<LuFactors, BackendError> {
        self.calls.set(self.calls.get() + 1);
        Ok(Self::factors())
    }

    fn lu_update(&self, request: LuUpdateRequest) -> Result<LuFactors, BackendError> {
        self.calls.set(self.calls.get() + 1);
        Ok(LuFactors {
            l: request.l,
            u: request.u,
            perm: request.perm.unwrap_or_else(|| vec![0, 1]),
        })
    }

    fn solve(&self, _a: &NumericMatrix, _b: &NumericMatrix) -> Result<NumericMatrix, BackendError> {
        Err(BackendError::Unsupported {
            operation: "mldivide",
            what: "any",
        })
    }
}

fn a() -> Value {
    mat(&[&[4.0, 3.0], &[6.0, 3.0]])
}

fn matrix_type(value: &Value) -> MatrixType {
    match value.payload() {
        Payload::RealMatrix(m) => m.matrix_type(),
        _ => MatrixType::Unknown,
    }
}

#[test]
fn three_outputs_are_tagged() {
    let backend = Canned::default();
    let out = Builtin::Lu.call(&[a()], 3, &backend).unwrap();
    assert_eq!(out.len(), 3);
    assert_eq!(matrix_type(&out[0]), MatrixType::Lower);
    assert_eq!(matrix_type(&out[1]), MatrixType::Upper);
    assert_eq!(matrix_type(&out[2]), MatrixType::Permutation);
    assert_eq!(out[2], mat(&[&[0.0, 1.0], &[1.0, 0.0]]));
}

#[test]
fn two_outputs_fold_the_permutation_into_l() {
    let backend = Canned::default();
    let out = Builtin::Lu.call(&[a()], 2, &backend).unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(matrix_type(&out[0]), MatrixType::PermutedLower);
    assert_eq!(out[0], mat(&[&[4.0 / 6.0, 1.0], &[1.0, 0.0]]));
}

#[test]
fn single_output_packs_both_factors() {
    let backend = Canned::default();
    let out = Builtin::Lu.call(&[a()], 1, &backend).unwrap();
    assert_eq!(out, vec![mat(&[&[6.0, 3.0], &[4.0 / 6.0, 1.0]])]);
}

#[test]
fn vector_option_gives_one_based_rows() {
    let backend = Canned::default();
    let out = Builtin::Lu
        .call(&[a(), Value::string("vector")], 3, &backend)
        .unwrap();
    assert_eq!(out[2], Value::column_vector(vec![2.0, 1.0]));
}

#[test]
fn lu_argument_errors_never_reach_the_backend() {
    let backend = Canned::default();
    let cases = [
        (vec![], "lu: expecting [L, U, P] = lu (A) or lu (A, \"vector\")"),
        (
            vec![a(), Value::scalar(0.5)],
            "lu: can not define pivoting threshold for full matrices",
        ),
        (vec![a(), Value::string("rows")], "lu: unrecognized string argument"),
        (vec![Value::string("abc")], "lu: wrong type argument 'string'"),
    ];
    for (args, message) in cases {
        let err = Builtin::Lu.call(&args, 1, &backend).unwrap_err();
        assert_eq!(err.message, message);
    }
    assert_eq!(backend.calls.get(), 0);
}

#[test]
fn empty_input_gives_empty_factors() {
    let backend = Canned::default();
    let out = Builtin::Lu.call(&[Value::empty_matrix()], 3, &backend).unwrap();
    assert_eq!(out.len(), 3);
    assert!(out.iter().all(Value::is_empty));
    assert_eq!(backend.calls.get(), 0);
}

#[test]
fn luupdate_checks_dimensions_first() {
    let backend = Canned::default();
    let l = mat(&[&[1.0, 0.0], &[0.5, 1.0]]);
    let u = mat(&[&[2.0, 1.0], &[0.0, 1.0]]);
    let wrong_u = mat(&[&[2.0, 1.0, 0.0]]);
    let x = mat(&[&[1.0], &[1.0]]);

    let err = Builtin::LuUpdate
        .call(&[l.clone(), wrong_u, x.clone(), x.clone()], 2, &backend)
        .unwrap_err();
    assert_eq!(err.message, "luupdate: dimensions mismatch");

    let short = mat(&[&[1.0]]);
    let err = Builtin::LuUpdate
        .call(&[l.clone(), u.clone(), short, x.clone()], 2, &backend)
        .unwrap_err();
    assert_eq!(err.message, "luupdate: dimensions mismatch");
    assert_eq!(backend.calls.get(), 0);

    let out = Builtin::LuUpdate.call(&[l, u, x.clone(), x], 2, &backend).unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(backend.calls.get(), 1);
}

#[test]
fn luupdate_wants_numbers_and_a_real_permutation() {
    let backend = Canned::default();
    let l = mat(&[&[1.0, 0.0], &[0.5, 1.0]]);
    let u = mat(&[&[2.0, 1.0], &[0.0, 1.0]]);
    let x = mat(&[&[1.0], &[1.0]]);

    let err = Builtin::LuUpdate
        .call(&[l.clone(), u.clone(), Value::string("ab"), x.clone()], 2, &backend)
        .unwrap_err();
    assert_eq!(err.message, "luupdate: expecting numeric arguments");

    let not_a_permutation = mat(&[&[1.0, 1.0], &[0.0, 1.0]]);
    let err = Builtin::LuUpdate
        .call(&[l.clone(), u.clone(), not_a_permutation, x.clone(), x.clone()], 3, &backend)
        .unwrap_err();
    assert_eq!(err.message, "luupdate: expecting numeric arguments");
    assert_eq!(backend.calls.get(), 0);

    let p = mat(&[&[0.0, 1.0], &[1.0, 0.0]]);
    let out = Builtin::LuUpdate.call(&[l, u, p.clone(), x.clone(), x], 3, &backend).unwrap();
    assert_eq!(out.len(), 3);
    assert_eq!(out[2], p);
}

#[test]
fn unavailable_backend_reports_the_builtin() {
    let err = Builtin::Lu.call(&[a()], 3, &UnavailableBackend).unwrap_err();
    assert_eq!(err.message, "lu: no numeric backend is available");
}

/// Returns the canned factors with a broken row permutation.
struct BadPermutation(Vec<usize>);

impl NumericBackend for BadPermutation {
    fn lu(&self, _a: &NumericMatrix) -> Result<LuFactors, BackendError> {
        Ok(LuFactors {
            perm: self.0.clone(),
            ..Canned::factors()
        })
    }

    fn lu_update(&self, request: LuUpdateRequest) -> Result<LuFactors, BackendError> {
        Ok(LuFactors {
            l: request.l,
            u: request.u,
            perm: self.0.clone(),
        })
    }

    fn solve(&self, _a: &NumericMatrix, _b: &NumericMatrix) -> Result<NumericMatrix, BackendError> {
        Err(BackendError::Unsupported {
            operation: "mldivide",
            what: "any",
        })
    }
}

#[test]
fn invalid_backend_permutation_is_an_error() {
    for perm in [vec![0], vec![0, 2], vec![1, 1], vec![0, 1, 2]] {
        let backend = BadPermutation(perm);
        for nargout in 1..=3 {
            let err = Builtin::Lu.call(&[a()], nargout, &backend).unwrap_err();
            assert_eq!(
                err.message,
                "lu: backend returned an invalid row permutation for 2 rows"
            );
        }
    }

    let l = mat(&[&[1.0, 0.0], &[0.5, 1.0]]);
    let u = mat(&[&[2.0, 1.0], &[0.0, 1.0]]);
    let p = mat(&[&[0.0, 1.0], &[1.0, 0.0]]);
    let x = mat(&[&[1.0], &[1.0]]);
    let err = Builtin::LuUpdate
        .call(&[l, u, p, x.clone(), x], 3, &BadPermutation(vec![5, 0]))
        .unwrap_err();
    assert_eq!(
        err.message,
        "luupdate: backend returned an invalid row permutation for 2 rows"
    );
}
