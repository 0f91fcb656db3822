//! Boundary to the numeric library.
//!
//! Factorizations and linear solves are black boxes behind
//! [`NumericBackend`]. The evaluator validates arguments, hands the
//! backend owned dense matrices, and unpacks the labelled results. It
//! never pivots or factorizes anything itself.

use tessa_value::{Complex, Matrix, Value, ValueError, ValueResult};

/// Dense operand or result exchanged with the backend.
#[derive(Clone, Debug, PartialEq)]
pub enum NumericMatrix {
    Real(Matrix<f64>),
    Complex(Matrix<Complex>),
}

impl NumericMatrix {
    /// Numeric payload of `value` as a full matrix. Ranges are expanded;
    /// strings and the other non-numeric variants are refused.
    pub fn from_value(value: &Value, operation: &str) -> ValueResult<Self> {
        if value.is_complex_type() {
            Ok(NumericMatrix::Complex(value.complex_matrix_value(false)?))
        } else if is_numeric(value) {
            Ok(NumericMatrix::Real(value.matrix_value(false)?))
        } else {
            Err(tessa_value::errors::wrong_type_argument(
                operation,
                value.type_as_string(),
            ))
        }
    }

    pub fn dims(&self) -> (usize, usize) {
        match self {
            Self::Real(m) => m.dims(),
            Self::Complex(m) => m.dims(),
        }
    }

    pub fn rows(&self) -> usize {
        self.dims().0
    }

    pub fn cols(&self) -> usize {
        self.dims().1
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, Self::Complex(_))
    }

    pub fn transpose(&self) -> Self {
        match self {
            Self::Real(m) => Self::Real(m.transpose()),
            Self::Complex(m) => Self::Complex(m.transpose()),
        }
    }

    pub fn matrix_type(&self) -> tessa_value::MatrixType {
        match self {
            Self::Real(m) => m.matrix_type(),
            Self::Complex(m) => m.matrix_type(),
        }
    }

    #[must_use]
    pub fn with_matrix_type(self, kind: tessa_value::MatrixType) -> Self {
        match self {
            Self::Real(m) => Self::Real(m.with_matrix_type(kind)),
            Self::Complex(m) => Self::Complex(m.with_matrix_type(kind)),
        }
    }

    /// True when every diagonal element is nonzero.
    pub fn has_regular_diagonal(&self) -> bool {
        let n = self.rows().min(self.cols());
        match self {
            Self::Real(m) => (0..n).all(|i| m.get(i, i).is_some_and(|x| *x != 0.0)),
            Self::Complex(m) => (0..n).all(|i| m.get(i, i).is_some_and(|z| !z.is_zero())),
        }
    }

    /// Wrap as a value without narrowing, so shape kinds survive.
    pub fn into_value(self) -> Value {
        match self {
            Self::Real(m) => Value::matrix(m),
            Self::Complex(m) => Value::complex_matrix(m),
        }
    }
}

/// Numeric in the sense the numeric library accepts: real or complex
/// scalars and matrices, and ranges.
pub fn is_numeric(value: &Value) -> bool {
    value.is_numeric_type() || value.is_range()
}

/// Row permutation as zero-based source rows: row `i` of `P * A` is row
/// `perm[i]` of `A`.
pub type Permutation = Vec<usize>;

/// Result of an LU factorization `P * A = L * U`.
#[derive(Clone, Debug, PartialEq)]
pub struct LuFactors {
    /// `m x k` unit lower triangular, `k = min(m, n)`.
    pub l: NumericMatrix,
    /// `k x n` upper triangular.
    pub u: NumericMatrix,
    pub perm: Permutation,
}

/// Rank-1 update request: refactor `L * U + x * y.'`, or with a
/// permutation `P' * L * U + x * y.'`.
#[derive(Clone, Debug)]
pub struct LuUpdateRequest {
    pub l: NumericMatrix,
    pub u: NumericMatrix,
    pub perm: Option<Permutation>,
    pub x: NumericMatrix,
    pub y: NumericMatrix,
}

/// Failure reported by a backend.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("{operation}: matrix singular to machine precision")]
    Singular { operation: &'static str },
    #[error("{operation}: {what} matrices are not supported by the numeric backend")]
    Unsupported {
        operation: &'static str,
        what: &'static str,
    },
    #[error("{operation}: no numeric backend is available")]
    Unavailable { operation: &'static str },
    #[error("{operation}: {message}")]
    Failed {
        operation: &'static str,
        message: String,
    },
}

impl From<BackendError> for ValueError {
    fn from(err: BackendError) -> Self {
        tessa_value::errors::backend_failure(&err.to_string())
    }
}

/// Factorization and solve kernels.
///
/// Implementations receive operands whose dimensions have already been
/// checked by the caller.
pub trait NumericBackend {
    /// Factor `a` with partial pivoting.
    fn lu(&self, a: &NumericMatrix) -> Result<LuFactors, BackendError>;

    /// Refactor after a rank-1 update. The returned permutation is the
    /// identity when the request carried none.
    fn lu_update(&self, request: LuUpdateRequest) -> Result<LuFactors, BackendError>;

    /// `a \ b`: the solution `x` of `a * x = b`. `a.rows() == b.rows()`.
    fn solve(&self, a: &NumericMatrix, b: &NumericMatrix) -> Result<NumericMatrix, BackendError>;
}

/// Backend used when none is configured. Every kernel fails.
#[derive(Copy, Clone, Debug, Default)]
pub struct UnavailableBackend;

impl NumericBackend for UnavailableBackend {
    fn lu(&self, _a: &NumericMatrix) -> Result<LuFactors, BackendError> {
        Err(BackendError::Unavailable { operation: "lu" })
    }

    fn lu_update(&self, _request: LuUpdateRequest) -> Result<LuFactors, BackendError> {
        Err(BackendError::Unavailable {
            operation: "luupdate",
        })
    }

    fn solve(&self, _a: &NumericMatrix, _b: &NumericMatrix) -> Result<NumericMatrix, BackendError> {
        Err(BackendError::Unavailable {
            operation: "mldivide",
        })
    }
}

/// True when `perm` holds each of `0..n` exactly once.
pub fn is_permutation(perm: &[usize], n: usize) -> bool {
    if perm.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    perm.iter().all(|&p| p < n && !std::mem::replace(&mut seen[p], true))
}

/// Permutation matrix for `perm`: row `i` has its one in column `perm[i]`.
pub fn permutation_matrix(perm: &[usize]) -> Matrix<f64> {
    let n = perm.len();
    Matrix::from_fn(n, n, |i, j| if perm[i] == j { 1.0 } else { 0.0 })
        .with_matrix_type(tessa_value::MatrixType::Permutation)
}

/// Inverse of [`permutation_matrix`]. `None` unless every row and column
/// holds exactly one 1 and zeros elsewhere.
pub fn permutation_from_matrix(p: &Matrix<f64>) -> Option<Permutation> {
    if !p.is_square() {
        return None;
    }
    let n = p.rows();
    let mut perm = Vec::with_capacity(n);
    let mut seen = vec![false; n];
    for i in 0..n {
        let mut found = None;
        for j in 0..n {
            match p.get(i, j).copied() {
                Some(x) if x == 1.0 && found.is_none() => found = Some(j),
                Some(x) if x == 0.0 => {}
                _ => return None,
            }
        }
        let j = found?;
        if std::mem::replace(&mut seen[j], true) {
            return None;
        }
        perm.push(j);
    }
    Some(perm)
}
