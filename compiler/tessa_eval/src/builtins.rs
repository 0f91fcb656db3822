//! Builtin functions reached through calls.
//!
//! Only the factorization entry points live here. Both validate their
//! arguments completely before the numeric backend is called, so a bad
//! call never reaches the library.

use tessa_value::errors::{invalid_call, wrong_type_argument};
use tessa_value::{Matrix, MatrixType, Value, ValueError, ValueResult};

use crate::numeric::{
    is_numeric, is_permutation, permutation_from_matrix, permutation_matrix, BackendError,
    LuFactors, LuUpdateRequest, NumericBackend, NumericMatrix, Permutation,
};

/// A builtin function.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Builtin {
    Lu,
    LuUpdate,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "lu" => Some(Builtin::Lu),
            "luupdate" => Some(Builtin::LuUpdate),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Builtin::Lu => "lu",
            Builtin::LuUpdate => "luupdate",
        }
    }

    /// Call with `args`, producing up to `nargout` values. Fewer values
    /// may come back; the caller decides whether that is an error.
    #[tracing::instrument(level = "debug", skip_all, fields(builtin = self.name(), nargout = nargout))]
    pub fn call(
        self,
        args: &[Value],
        nargout: usize,
        backend: &dyn NumericBackend,
    ) -> ValueResult<Vec<Value>> {
        match self {
            Builtin::Lu => lu(args, nargout, backend),
            Builtin::LuUpdate => lu_update(args, backend),
        }
    }
}

// lu

#[cold]
fn lu_usage() -> ValueError {
    invalid_call("lu", "expecting [L, U, P] = lu (A) or lu (A, \"vector\")")
}

fn lu(args: &[Value], nargout: usize, backend: &dyn NumericBackend) -> ValueResult<Vec<Value>> {
    if args.is_empty() || args.len() > 2 || nargout > 3 {
        return Err(lu_usage());
    }

    let mut vector_output = false;
    for option in &args[1..] {
        if option.is_string() || option.is_char_matrix() {
            if option.string_value()? == "vector" {
                vector_output = true;
            } else {
                return Err(ValueError::new("lu: unrecognized string argument"));
            }
        } else {
            return Err(ValueError::new(
                "lu: can not define pivoting threshold for full matrices",
            ));
        }
    }

    let arg = &args[0];
    if !is_numeric(arg) {
        return Err(wrong_type_argument("lu", arg.type_as_string()));
    }
    if arg.is_empty() {
        return Ok(vec![Value::empty_matrix(); 3]);
    }

    let a = NumericMatrix::from_value(arg, "lu")?;
    let LuFactors { l, u, perm } = backend.lu(&a)?;
    check_row_permutation(&perm, l.rows(), "lu")?;

    Ok(match nargout {
        0 | 1 => vec![packed_factors(&l, &u).into_value()],
        2 => {
            let permuted = rows_to(&l, &perm).with_matrix_type(MatrixType::PermutedLower);
            vec![permuted.into_value(), upper_factor(u)]
        }
        _ => {
            let p = if vector_output {
                Value::column_vector(perm.iter().map(|&i| (i + 1) as f64).collect())
            } else {
                Value::matrix(permutation_matrix(&perm))
            };
            vec![lower_factor(l), upper_factor(u), p]
        }
    })
}

/// `L` with the shape kind the factorization guarantees.
fn lower_factor(l: NumericMatrix) -> Value {
    let (rows, cols) = l.dims();
    if rows == cols {
        l.with_matrix_type(MatrixType::Lower).into_value()
    } else {
        l.into_value()
    }
}

/// `U` is only marked upper triangular when it is square and regular.
fn upper_factor(u: NumericMatrix) -> Value {
    let (rows, cols) = u.dims();
    if rows == cols && u.has_regular_diagonal() {
        u.with_matrix_type(MatrixType::Upper).into_value()
    } else {
        u.into_value()
    }
}

/// The backend's row permutation must cover the rows of `L` exactly.
fn check_row_permutation(
    perm: &Permutation,
    rows: usize,
    operation: &'static str,
) -> Result<(), BackendError> {
    if is_permutation(perm, rows) {
        Ok(())
    } else {
        Err(BackendError::Failed {
            operation,
            message: format!("backend returned an invalid row permutation for {rows} rows"),
        })
    }
}

/// `P' * L`: row `i` of `l` moves to row `perm[i]`.
fn rows_to(l: &NumericMatrix, perm: &Permutation) -> NumericMatrix {
    let mut source = vec![0; perm.len()];
    for (i, &p) in perm.iter().enumerate() {
        source[p] = i;
    }
    let cols: Vec<usize> = (0..l.cols()).collect();
    match l {
        NumericMatrix::Real(m) => NumericMatrix::Real(m.submatrix(&source, &cols)),
        NumericMatrix::Complex(m) => NumericMatrix::Complex(m.submatrix(&source, &cols)),
    }
}

/// Single-output form: `U` on and above the diagonal, the strictly lower
/// part of `L` below it.
fn packed_factors(l: &NumericMatrix, u: &NumericMatrix) -> NumericMatrix {
    fn pack<T: Copy + Default>(l: &Matrix<T>, u: &Matrix<T>) -> Matrix<T> {
        Matrix::from_fn(l.rows(), u.cols(), |i, j| {
            let factor = if i <= j { u.get(i, j) } else { l.get(i, j) };
            factor.copied().unwrap_or_default()
        })
    }
    match (l, u) {
        (NumericMatrix::Real(l), NumericMatrix::Real(u)) => NumericMatrix::Real(pack(l, u)),
        (l, u) => NumericMatrix::Complex(pack(&complex_of(l), &complex_of(u))),
    }
}

fn complex_of(m: &NumericMatrix) -> Matrix<tessa_value::Complex> {
    match m {
        NumericMatrix::Real(m) => m.to_complex(),
        NumericMatrix::Complex(m) => m.clone(),
    }
}

// luupdate

/// `L` is `m x k`, `U` is `k x n` with `k = min(m, n)`, and a permutation,
/// when given, has `m` rows.
fn check_lu_dims(l: (usize, usize), u: (usize, usize), p: Option<(usize, usize)>) -> bool {
    let (m, l_cols) = l;
    let (k, n) = u;
    k == l_cols && k == m.min(n) && !p.is_some_and(|(p_rows, _)| p_rows != m)
}

/// `[L, U] = luupdate (L, U, x, y)` or
/// `[L, U, P] = luupdate (L, U, P, x, y)`.
fn lu_update(args: &[Value], backend: &dyn NumericBackend) -> ValueResult<Vec<Value>> {
    if args.len() != 4 && args.len() != 5 {
        return Err(invalid_call(
            "luupdate",
            "expecting luupdate (L, U, x, y) or luupdate (L, U, P, x, y)",
        ));
    }
    let pivoted = args.len() == 5;
    let (l, u) = (&args[0], &args[1]);
    let p = pivoted.then(|| &args[2]);
    let (x, y) = if pivoted {
        (&args[3], &args[4])
    } else {
        (&args[2], &args[3])
    };

    let perm = match p {
        Some(p) if is_numeric(p) && !p.is_complex_type() => {
            permutation_from_matrix(&p.matrix_value(false)?)
        }
        _ => None,
    };
    if ![l, u, x, y].into_iter().all(is_numeric) || (pivoted && perm.is_none()) {
        return Err(ValueError::new("luupdate: expecting numeric arguments"));
    }

    if !check_lu_dims(l.dims(), u.dims(), p.map(Value::dims)) {
        return Err(ValueError::new("luupdate: dimensions mismatch"));
    }
    let (m, n) = (l.rows(), u.columns());
    if x.rows() != m || y.rows() != n || x.columns() != y.columns() {
        return Err(ValueError::new("luupdate: dimensions mismatch"));
    }

    let request = LuUpdateRequest {
        l: NumericMatrix::from_value(l, "luupdate")?,
        u: NumericMatrix::from_value(u, "luupdate")?,
        perm,
        x: NumericMatrix::from_value(x, "luupdate")?,
        y: NumericMatrix::from_value(y, "luupdate")?,
    };
    let factors = backend.lu_update(request)?;
    if pivoted {
        check_row_permutation(&factors.perm, factors.l.rows(), "luupdate")?;
    }

    let mut out = vec![lower_factor(factors.l), upper_factor(factors.u)];
    if pivoted {
        out.push(Value::matrix(permutation_matrix(&factors.perm)));
    }
    Ok(out)
}
