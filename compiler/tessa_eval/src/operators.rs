//! Binary operator implementations.
//!
//! Operands are converted to full real or complex matrices (scalars are
//! 1x1, ranges and strings become their elements), promoted to a common
//! element type, combined, and narrowed back (1x1 to scalar, complex with
//! no imaginary part to real). Element-wise operators broadcast a 1x1
//! operand; other shape differences are nonconformant.
//!
//! Matrix division is a linear solve and goes to the numeric backend.

use std::ops::{Add, Div, Mul, Neg, Sub};

use tessa_ir::BinaryOp;
use tessa_value::errors::{binary_op_not_implemented, nonconformant, undefined_value};
use tessa_value::{Complex, Matrix, Value, ValueError, ValueResult};

use crate::numeric::{NumericBackend, NumericMatrix};

/// Element types the arithmetic kernels run on.
pub(crate) trait Element:
    Copy
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    const ZERO: Self;
    const ONE: Self;

    fn is_nonzero(self) -> bool;

    /// Complex conjugate; identity on reals.
    fn conj(self) -> Self;
}

impl Element for f64 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;

    #[inline]
    fn is_nonzero(self) -> bool {
        self != 0.0
    }

    #[inline]
    fn conj(self) -> Self {
        self
    }
}

impl Element for Complex {
    const ZERO: Self = Complex::ZERO;
    const ONE: Self = Complex::ONE;

    #[inline]
    fn is_nonzero(self) -> bool {
        !self.is_zero()
    }

    #[inline]
    fn conj(self) -> Self {
        Complex::conj(self)
    }
}

/// Binary operand as a full matrix.
#[derive(Clone, Debug)]
pub(crate) enum Operand {
    Real(Matrix<f64>),
    Complex(Matrix<Complex>),
}

/// Both operands at a common element type.
pub(crate) enum Promoted {
    Real(Matrix<f64>, Matrix<f64>),
    Complex(Matrix<Complex>, Matrix<Complex>),
}

impl Operand {
    pub(crate) fn dims(&self) -> (usize, usize) {
        match self {
            Self::Real(m) => m.dims(),
            Self::Complex(m) => m.dims(),
        }
    }

    pub(crate) fn is_scalar(&self) -> bool {
        self.dims() == (1, 1)
    }

    pub(crate) fn into_complex(self) -> Matrix<Complex> {
        match self {
            Self::Real(m) => m.to_complex(),
            Self::Complex(m) => m,
        }
    }

    pub(crate) fn promote(a: Operand, b: Operand) -> Promoted {
        match (a, b) {
            (Operand::Real(a), Operand::Real(b)) => Promoted::Real(a, b),
            (a, b) => Promoted::Complex(a.into_complex(), b.into_complex()),
        }
    }

    fn into_numeric(self) -> NumericMatrix {
        match self {
            Self::Real(m) => NumericMatrix::Real(m),
            Self::Complex(m) => NumericMatrix::Complex(m),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Self::Real(m) => real_result(m),
            Self::Complex(m) => complex_result(m),
        }
    }
}

/// Convert both operands of `op`, checking undefined values first and
/// then operand types.
pub(crate) fn binary_operands(
    lhs: &Value,
    rhs: &Value,
    op: BinaryOp,
) -> ValueResult<(Operand, Operand)> {
    if lhs.is_undefined() || rhs.is_undefined() {
        return Err(undefined_value(&format!("operator {}", op.as_symbol())));
    }
    let convert = |value: &Value| -> ValueResult<Operand> {
        if value.is_complex_type() {
            Ok(Operand::Complex(value.complex_matrix_value(false)?))
        } else if value.is_real_type() {
            Ok(Operand::Real(value.matrix_value(true)?))
        } else {
            Err(binary_op_not_implemented(
                op,
                lhs.type_as_string(),
                rhs.type_as_string(),
            ))
        }
    };
    Ok((convert(lhs)?, convert(rhs)?))
}

/// Narrowed value for a real result.
pub(crate) fn real_result(m: Matrix<f64>) -> Value {
    let mut v = Value::matrix(m);
    v.maybe_mutate();
    v
}

/// Narrowed value for a complex result.
pub(crate) fn complex_result(m: Matrix<Complex>) -> Value {
    let mut v = Value::complex_matrix(m);
    v.maybe_mutate();
    v
}

fn numeric_result(m: NumericMatrix) -> Value {
    match m {
        NumericMatrix::Real(m) => real_result(m),
        NumericMatrix::Complex(m) => complex_result(m),
    }
}

#[inline]
pub(crate) fn truth(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

// Dispatch

/// Evaluate `lhs op rhs`.
///
/// Short-circuit operators arrive here only with both operands already
/// evaluated; skipping the right operand is the evaluator's job.
pub fn evaluate_binary(
    lhs: &Value,
    rhs: &Value,
    op: BinaryOp,
    backend: &dyn NumericBackend,
) -> ValueResult<Value> {
    if op.is_short_circuit() {
        let l = lhs.is_true()?;
        let r = rhs.is_true()?;
        return Ok(Value::bool(match op {
            BinaryOp::AndAnd => l && r,
            _ => l || r,
        }));
    }

    let (a, b) = binary_operands(lhs, rhs, op)?;
    match op {
        BinaryOp::Add
        | BinaryOp::Sub
        | BinaryOp::ElMul
        | BinaryOp::ElDiv
        | BinaryOp::ElLeftDiv => arithmetic(a, b, op),
        BinaryOp::ElPow => element_power(a, b),
        BinaryOp::Lt
        | BinaryOp::Le
        | BinaryOp::Eq
        | BinaryOp::Ge
        | BinaryOp::Gt
        | BinaryOp::Ne => compare(a, b, op),
        BinaryOp::ElAnd | BinaryOp::ElOr => logical(a, b, op),
        BinaryOp::Mul => multiply(a, b),
        BinaryOp::Div => divide(a, b, backend),
        BinaryOp::LeftDiv => left_divide(a, b, backend),
        BinaryOp::Pow => power(a, b, backend),
        BinaryOp::AndAnd | BinaryOp::OrOr => Err(ValueError::new(format!(
            "operator {}: operands must be evaluated by the caller",
            op.as_symbol()
        ))),
    }
}

// Element-wise kernels

/// Per-element function for the arithmetic operators that can update a
/// matrix in place. `None` for every other operator.
pub(crate) fn arithmetic_kernel<T: Element>(op: BinaryOp) -> Option<fn(T, T) -> T> {
    let f: fn(T, T) -> T = match op {
        BinaryOp::Add => |a, b| a + b,
        BinaryOp::Sub => |a, b| a - b,
        BinaryOp::ElMul | BinaryOp::Mul => |a, b| a * b,
        BinaryOp::ElDiv => |a, b| a / b,
        BinaryOp::ElLeftDiv => |a, b| b / a,
        _ => return None,
    };
    Some(f)
}

/// Apply `f` element-wise, broadcasting a 1x1 operand.
pub(crate) fn broadcast<A: Copy, B: Copy, R>(
    op: BinaryOp,
    a: &Matrix<A>,
    b: &Matrix<B>,
    f: impl Fn(A, B) -> R,
) -> ValueResult<Matrix<R>> {
    if let Some(m) = a.zip_map(b, |&x, &y| f(x, y)) {
        return Ok(m);
    }
    if a.numel() == 1 {
        let x = a.elements()[0];
        return Ok(b.map(|&y| f(x, y)));
    }
    if b.numel() == 1 {
        let y = b.elements()[0];
        return Ok(a.map(|&x| f(x, y)));
    }
    Err(nonconformant(op, a.dims(), b.dims()))
}

fn arithmetic(a: Operand, b: Operand, op: BinaryOp) -> ValueResult<Value> {
    let unsupported = || ValueError::new(format!("operator {}: no kernel", op.as_symbol()));
    match Operand::promote(a, b) {
        Promoted::Real(a, b) => {
            let f = arithmetic_kernel::<f64>(op).ok_or_else(unsupported)?;
            broadcast(op, &a, &b, f).map(real_result)
        }
        Promoted::Complex(a, b) => {
            let f = arithmetic_kernel::<Complex>(op).ok_or_else(unsupported)?;
            broadcast(op, &a, &b, f).map(complex_result)
        }
    }
}

/// `.^`. A negative real base with a fractional exponent makes the whole
/// result complex.
fn element_power(a: Operand, b: Operand) -> ValueResult<Value> {
    let op = BinaryOp::ElPow;
    match Operand::promote(a, b) {
        Promoted::Real(a, b) => {
            let real = broadcast(op, &a, &b, |x, y| {
                let real = x >= 0.0 || x.is_nan() || !y.is_finite() || y.fract() == 0.0;
                real.then(|| x.powf(y))
            })?;
            if real.elements().iter().all(Option::is_some) {
                return Ok(real_result(real.map(|x| x.unwrap_or(f64::NAN))));
            }
            let (a, b) = (a.to_complex(), b.to_complex());
            broadcast(op, &a, &b, Complex::powc).map(complex_result)
        }
        Promoted::Complex(a, b) => broadcast(op, &a, &b, Complex::powc).map(complex_result),
    }
}

fn compare(a: Operand, b: Operand, op: BinaryOp) -> ValueResult<Value> {
    let result = match Operand::promote(a, b) {
        Promoted::Real(a, b) => broadcast(op, &a, &b, |x, y| truth(compare_real(op, x, y)))?,
        Promoted::Complex(a, b) => broadcast(op, &a, &b, |x, y| {
            truth(match op {
                BinaryOp::Eq => x == y,
                BinaryOp::Ne => x != y,
                _ => compare_real(op, x.re, y.re),
            })
        })?,
    };
    Ok(real_result(result))
}

fn compare_real(op: BinaryOp, x: f64, y: f64) -> bool {
    match op {
        BinaryOp::Lt => x < y,
        BinaryOp::Le => x <= y,
        BinaryOp::Eq => x == y,
        BinaryOp::Ge => x >= y,
        BinaryOp::Gt => x > y,
        _ => x != y,
    }
}

/// Per-element `&` / `|` on truth values.
pub(crate) fn logical_kernel(op: BinaryOp) -> fn(bool, bool) -> bool {
    let f: fn(bool, bool) -> bool = match op {
        BinaryOp::ElAnd | BinaryOp::AndAnd => |x, y| x && y,
        _ => |x, y| x || y,
    };
    f
}

fn logical(a: Operand, b: Operand, op: BinaryOp) -> ValueResult<Value> {
    let f = logical_kernel(op);
    let result = match (a, b) {
        (Operand::Real(a), Operand::Real(b)) => {
            broadcast(op, &a, &b, |x, y| truth(f(x.is_nonzero(), y.is_nonzero())))?
        }
        (a, b) => {
            let (a, b) = (a.into_complex(), b.into_complex());
            broadcast(op, &a, &b, |x, y| truth(f(x.is_nonzero(), y.is_nonzero())))?
        }
    };
    Ok(real_result(result))
}

// Matrix operators

/// `rows x cols` product whose operands are read through accessors, so
/// a transposed operand never has to be materialized.
pub(crate) fn matrix_product<T: Element>(
    rows: usize,
    inner: usize,
    cols: usize,
    a: impl Fn(usize, usize) -> T,
    b: impl Fn(usize, usize) -> T,
) -> Matrix<T> {
    Matrix::from_fn(rows, cols, |i, j| {
        let mut acc = T::ZERO;
        for k in 0..inner {
            acc = acc + a(i, k) * b(k, j);
        }
        acc
    })
}

/// Element `(i, j)` of a column-major matrix.
#[inline]
pub(crate) fn at<T: Copy>(m: &Matrix<T>, i: usize, j: usize) -> T {
    m.elements()[j * m.rows() + i]
}

fn product<T: Element>(a: &Matrix<T>, b: &Matrix<T>) -> ValueResult<Matrix<T>> {
    if a.numel() == 1 || b.numel() == 1 {
        return broadcast(BinaryOp::Mul, a, b, |x, y| x * y);
    }
    if a.cols() != b.rows() {
        return Err(nonconformant(BinaryOp::Mul, a.dims(), b.dims()));
    }
    Ok(matrix_product(
        a.rows(),
        a.cols(),
        b.cols(),
        |i, k| at(a, i, k),
        |k, j| at(b, k, j),
    ))
}

fn multiply(a: Operand, b: Operand) -> ValueResult<Value> {
    match Operand::promote(a, b) {
        Promoted::Real(a, b) => product(&a, &b).map(real_result),
        Promoted::Complex(a, b) => product(&a, &b).map(complex_result),
    }
}

/// `a / b`: solves `x * b = a` as `(b.' \ a.').'`.
fn divide(a: Operand, b: Operand, backend: &dyn NumericBackend) -> ValueResult<Value> {
    if b.is_scalar() {
        return arithmetic(a, b, BinaryOp::ElDiv);
    }
    if a.dims().1 != b.dims().1 {
        return Err(nonconformant(BinaryOp::Div, a.dims(), b.dims()));
    }
    let b_t = b.into_numeric().transpose();
    let a_t = a.into_numeric().transpose();
    let x = backend.solve(&b_t, &a_t)?;
    Ok(numeric_result(x.transpose()))
}

/// `a \ b`: solves `a * x = b`.
fn left_divide(a: Operand, b: Operand, backend: &dyn NumericBackend) -> ValueResult<Value> {
    if a.is_scalar() {
        return arithmetic(a, b, BinaryOp::ElLeftDiv);
    }
    if a.dims().0 != b.dims().0 {
        return Err(nonconformant(BinaryOp::LeftDiv, a.dims(), b.dims()));
    }
    let x = backend.solve(&a.into_numeric(), &b.into_numeric())?;
    Ok(numeric_result(x))
}

/// `a ^ b`. Scalar powers are element-wise; a square matrix may be
/// raised to an integer power.
fn power(a: Operand, b: Operand, backend: &dyn NumericBackend) -> ValueResult<Value> {
    if a.is_scalar() && b.is_scalar() {
        return element_power(a, b);
    }
    let (rows, cols) = a.dims();
    let exponent = match &b {
        Operand::Real(m) if m.numel() == 1 => Some(m.elements()[0]),
        Operand::Complex(m) if m.numel() == 1 && m.elements()[0].is_real() => {
            Some(m.elements()[0].re)
        }
        _ => None,
    };
    let (Some(n), true) = (exponent, rows == cols) else {
        return Err(ValueError::new(
            "operator ^: for x^y, only square matrix arguments are permitted and one \
             argument must be scalar.  Use .^ for elementwise power.",
        ));
    };
    if n.fract() != 0.0 || !n.is_finite() {
        return Err(ValueError::new(
            "operator ^: non-integer powers of a matrix are not supported",
        ));
    }

    let base = if n < 0.0 {
        let identity = match &a {
            Operand::Real(_) => NumericMatrix::Real(Matrix::identity(rows)),
            Operand::Complex(_) => NumericMatrix::Complex(Matrix::identity(rows).to_complex()),
        };
        match backend.solve(&a.into_numeric(), &identity)? {
            NumericMatrix::Real(m) => Operand::Real(m),
            NumericMatrix::Complex(m) => Operand::Complex(m),
        }
    } else {
        a
    };
    let n = n.abs() as u64;
    Ok(match base {
        Operand::Real(m) => Operand::Real(matrix_power(&m, n)),
        Operand::Complex(m) => Operand::Complex(matrix_power(&m, n)),
    }
    .into_value())
}

/// Square `m` raised to `n` by repeated squaring.
fn matrix_power<T: Element>(m: &Matrix<T>, mut n: u64) -> Matrix<T> {
    let size = m.rows();
    let square = |x: &Matrix<T>, y: &Matrix<T>| {
        matrix_product(size, size, size, |i, k| at(x, i, k), |k, j| at(y, k, j))
    };
    let mut result = Matrix::from_fn(size, size, |i, j| if i == j { T::ONE } else { T::ZERO });
    let mut base = m.clone();
    while n > 0 {
        if n & 1 == 1 {
            result = square(&result, &base);
        }
        n >>= 1;
        if n > 0 {
            base = square(&base, &base);
        }
    }
    result
}
