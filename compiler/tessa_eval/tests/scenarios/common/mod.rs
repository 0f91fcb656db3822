//! Shared fixtures: tree builders and test backends.

#![allow(
    clippy::disallowed_types,
    reason = "the call counter is shared between the test and the evaluator"
)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tessa_eval::{
    buffer_output, BackendError, EvalConfig, LuFactors, LuUpdateRequest, NumericBackend,
    NumericMatrix, Permutation, SharedOutput, TreeEvaluator,
};
use tessa_ir::{AssignOp, Span};
use tessa_tree::{Expr, Statement, StatementList};
use tessa_value::{Matrix, Value};

// Trees

pub fn id(name: &str) -> Expr {
    Expr::identifier(name, Span::UNKNOWN)
}

pub fn num(x: f64) -> Expr {
    Expr::number(x, Span::UNKNOWN)
}

pub fn constant(value: Value) -> Expr {
    Expr::constant(value, Span::UNKNOWN)
}

pub fn assign(name: &str, rhs: Expr) -> Expr {
    Expr::assign(id(name), AssignOp::Assign, rhs, Span::UNKNOWN)
}

pub fn call(name: &str, args: Vec<Expr>) -> Expr {
    Expr::index(id(name), args, Span::UNKNOWN)
}

pub fn quiet(expr: Expr) -> Statement {
    Statement::expression(expr, false)
}

pub fn shown(expr: Expr) -> Statement {
    Statement::expression(expr, true)
}

pub fn program(statements: Vec<Statement>) -> StatementList {
    statements.into_iter().collect()
}

pub fn mat(rows: &[&[f64]]) -> Value {
    let rows: Vec<Vec<f64>> = rows.iter().map(|r| r.to_vec()).collect();
    Value::matrix(Matrix::from_rows(&rows).unwrap())
}

/// Evaluator with the dense LU backend, capturing output.
pub fn evaluator(config: EvalConfig) -> (TreeEvaluator, SharedOutput) {
    let out = buffer_output();
    let eval = TreeEvaluator::new(config.output(out.clone())).with_backend(DenseLu);
    (eval, out)
}

// Backends

/// Gaussian elimination on dense real matrices. Complex operands are
/// refused.
#[derive(Copy, Clone, Debug, Default)]
pub struct DenseLu;

fn real<'a>(m: &'a NumericMatrix, operation: &'static str) -> Result<&'a Matrix<f64>, BackendError> {
    match m {
        NumericMatrix::Real(m) => Ok(m),
        NumericMatrix::Complex(_) => Err(BackendError::Unsupported {
            operation,
            what: "complex",
        }),
    }
}

fn get(m: &Matrix<f64>, i: usize, j: usize) -> f64 {
    m.get(i, j).copied().unwrap_or(0.0)
}

fn factor(a: &Matrix<f64>, pivot: bool) -> LuFactors {
    let (l, u, perm) = factor_dense(a, pivot);
    LuFactors {
        l: NumericMatrix::Real(l),
        u: NumericMatrix::Real(u),
        perm,
    }
}

/// `P * A = L * U`; without pivoting `P` is the identity.
fn factor_dense(a: &Matrix<f64>, pivot: bool) -> (Matrix<f64>, Matrix<f64>, Permutation) {
    let (m, n) = a.dims();
    let k = m.min(n);
    let mut w: Vec<Vec<f64>> = (0..m).map(|i| (0..n).map(|j| get(a, i, j)).collect()).collect();
    let mut perm: Permutation = (0..m).collect();
    for j in 0..k {
        if pivot {
            let p = (j..m)
                .max_by(|&r, &s| w[r][j].abs().total_cmp(&w[s][j].abs()))
                .unwrap_or(j);
            w.swap(j, p);
            perm.swap(j, p);
        }
        let d = w[j][j];
        if d == 0.0 {
            continue;
        }
        for i in j + 1..m {
            let f = w[i][j] / d;
            w[i][j] = f;
            for c in j + 1..n {
                w[i][c] -= f * w[j][c];
            }
        }
    }
    let l = Matrix::from_fn(m, k, |i, j| match i.cmp(&j) {
        std::cmp::Ordering::Greater => w[i][j],
        std::cmp::Ordering::Equal => 1.0,
        std::cmp::Ordering::Less => 0.0,
    });
    let u = Matrix::from_fn(k, n, |i, j| if i <= j { w[i][j] } else { 0.0 });
    (l, u, perm)
}

fn product(a: &Matrix<f64>, b: &Matrix<f64>) -> Matrix<f64> {
    Matrix::from_fn(a.rows(), b.cols(), |i, j| {
        (0..a.cols()).map(|k| get(a, i, k) * get(b, k, j)).sum()
    })
}

impl NumericBackend for DenseLu {
    fn lu(&self, a: &NumericMatrix) -> Result<LuFactors, BackendError> {
        Ok(factor(real(a, "lu")?, true))
    }

    fn lu_update(&self, request: LuUpdateRequest) -> Result<LuFactors, BackendError> {
        let (l, u) = (real(&request.l, "luupdate")?, real(&request.u, "luupdate")?);
        let (x, y) = (real(&request.x, "luupdate")?, real(&request.y, "luupdate")?);
        let lu = product(l, u);
        let updated = |a: &Matrix<f64>| {
            let xy = product(x, &y.transpose());
            Matrix::from_fn(a.rows(), a.cols(), |i, j| get(a, i, j) + get(&xy, i, j))
        };
        match request.perm {
            None => Ok(factor(&updated(&lu), false)),
            Some(perm) => {
                // A = P' * L * U: row perm[i] of A is row i of L * U.
                let mut a = Matrix::zeros(lu.rows(), lu.cols());
                for (i, &p) in perm.iter().enumerate() {
                    for j in 0..lu.cols() {
                        if let Some(x) = a.elements_mut().get_mut(j * lu.rows() + p) {
                            *x = get(&lu, i, j);
                        }
                    }
                }
                Ok(factor(&updated(&a), true))
            }
        }
    }

    fn solve(&self, a: &NumericMatrix, b: &NumericMatrix) -> Result<NumericMatrix, BackendError> {
        let (a, b) = (real(a, "mldivide")?, real(b, "mldivide")?);
        if !a.is_square() {
            return Err(BackendError::Unsupported {
                operation: "mldivide",
                what: "non-square",
            });
        }
        let (l, u, perm) = factor_dense(a, true);
        let n = a.rows();
        if (0..n).any(|i| get(&u, i, i) == 0.0) {
            return Err(BackendError::Singular {
                operation: "mldivide",
            });
        }
        let mut x = Matrix::zeros(n, b.cols());
        for c in 0..b.cols() {
            let mut z: Vec<f64> = perm.iter().map(|&p| get(b, p, c)).collect();
            for i in 0..n {
                for k in 0..i {
                    z[i] -= get(&l, i, k) * z[k];
                }
            }
            for i in (0..n).rev() {
                for k in i + 1..n {
                    z[i] -= get(&u, i, k) * z[k];
                }
                z[i] /= get(&u, i, i);
            }
            x.elements_mut()[c * n..(c + 1) * n].copy_from_slice(&z);
        }
        Ok(NumericMatrix::Real(x))
    }
}

/// Wraps [`DenseLu`] and counts factorization calls.
#[derive(Clone, Debug, Default)]
pub struct CountingBackend {
    calls: Arc<AtomicUsize>,
}

impl CountingBackend {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl NumericBackend for CountingBackend {
    fn lu(&self, a: &NumericMatrix) -> Result<LuFactors, BackendError> {
        self.hit();
        DenseLu.lu(a)
    }

    fn lu_update(&self, request: LuUpdateRequest) -> Result<LuFactors, BackendError> {
        self.hit();
        DenseLu.lu_update(request)
    }

    fn solve(&self, a: &NumericMatrix, b: &NumericMatrix) -> Result<NumericMatrix, BackendError> {
        DenseLu.solve(a, b)
    }
}

/// Largest absolute element difference.
pub fn max_diff(a: &Value, b: &Value) -> f64 {
    let (a, b) = (a.matrix_value(false).unwrap(), b.matrix_value(false).unwrap());
    assert_eq!(a.dims(), b.dims());
    a.elements()
        .iter()
        .zip(b.elements())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}
