//! Dense two-dimensional matrices in column-major order.
//!
//! A matrix may carry a cached [`MatrixType`] describing its structure
//! (triangular, permutation, ...). The cache is advisory: it is set by
//! whoever produced the matrix (typically a factorization result) and is
//! reset to `Unknown` by every mutable access to the elements, since a
//! write can break the structure.

use std::fmt;

use crate::Complex;

/// Structural kind of a matrix, as recorded by its producer.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum MatrixType {
    #[default]
    Unknown,
    Full,
    Lower,
    Upper,
    /// A row permutation of a lower-triangular matrix (`P' * L`).
    PermutedLower,
    Permutation,
    Diagonal,
}

impl MatrixType {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Full => "full",
            Self::Lower => "lower",
            Self::Upper => "upper",
            Self::PermutedLower => "permuted lower",
            Self::Permutation => "permutation",
            Self::Diagonal => "diagonal",
        }
    }
}

/// Largest element count a matrix or range may have.
pub const MAX_NUMEL: usize = i32::MAX as usize;

/// `rows * cols`, or `None` past [`MAX_NUMEL`].
pub fn checked_numel(rows: usize, cols: usize) -> Option<usize> {
    rows.checked_mul(cols).filter(|&n| n <= MAX_NUMEL)
}

/// Column-major dense matrix.
#[derive(Clone)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
    matrix_type: MatrixType,
}

/// Character matrix backing string values.
pub type CharMatrix = Matrix<char>;

impl<T> Matrix<T> {
    /// Build from column-major data. Returns `None` if `data` does not have
    /// exactly `rows * cols` elements.
    pub fn from_column_major(rows: usize, cols: usize, data: Vec<T>) -> Option<Self> {
        (data.len() == rows * cols).then_some(Matrix {
            rows,
            cols,
            data,
            matrix_type: MatrixType::Unknown,
        })
    }

    /// Build by calling `f(row, col)` for every element.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for c in 0..cols {
            for r in 0..rows {
                data.push(f(r, c));
            }
        }
        Matrix {
            rows,
            cols,
            data,
            matrix_type: MatrixType::Unknown,
        }
    }

    pub fn row_vector(data: Vec<T>) -> Self {
        Matrix {
            rows: 1,
            cols: data.len(),
            data,
            matrix_type: MatrixType::Unknown,
        }
    }

    pub fn column_vector(data: Vec<T>) -> Self {
        Matrix {
            rows: data.len(),
            cols: 1,
            data,
            matrix_type: MatrixType::Unknown,
        }
    }

    /// 0x0 matrix.
    pub fn empty() -> Self {
        Matrix {
            rows: 0,
            cols: 0,
            data: Vec::new(),
            matrix_type: MatrixType::Unknown,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    #[inline]
    pub fn is_vector(&self) -> bool {
        self.rows == 1 || self.cols == 1
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.rows && col < self.cols {
            self.data.get(col * self.rows + row)
        } else {
            None
        }
    }

    /// Column-major element slice.
    #[inline]
    pub fn elements(&self) -> &[T] {
        &self.data
    }

    /// Mutable element slice. Clears the cached shape kind.
    #[inline]
    pub fn elements_mut(&mut self) -> &mut [T] {
        self.matrix_type = MatrixType::Unknown;
        &mut self.data
    }

    pub fn into_elements(self) -> Vec<T> {
        self.data
    }

    pub fn matrix_type(&self) -> MatrixType {
        self.matrix_type
    }

    pub fn set_matrix_type(&mut self, kind: MatrixType) {
        self.matrix_type = kind;
    }

    #[must_use]
    pub fn with_matrix_type(mut self, kind: MatrixType) -> Self {
        self.matrix_type = kind;
        self
    }

    /// Elements of row `row`, left to right.
    pub fn row(&self, row: usize) -> impl Iterator<Item = &T> + '_ {
        (0..self.cols).filter_map(move |c| self.get(row, c))
    }

    /// Elements of column `col`, top to bottom.
    pub fn column(&self, col: usize) -> &[T] {
        let start = (col * self.rows).min(self.data.len());
        let end = (start + self.rows).min(self.data.len());
        &self.data[start..end]
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Matrix<U> {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(&mut f).collect(),
            matrix_type: MatrixType::Unknown,
        }
    }

    /// Combine with a matrix of the same shape, element by element.
    /// `None` when the shapes differ.
    pub fn zip_map<U, R>(
        &self,
        other: &Matrix<U>,
        mut f: impl FnMut(&T, &U) -> R,
    ) -> Option<Matrix<R>> {
        if self.dims() != other.dims() {
            return None;
        }
        Some(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| f(a, b))
                .collect(),
            matrix_type: MatrixType::Unknown,
        })
    }
}

impl<T: Clone> Matrix<T> {
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Matrix {
            rows,
            cols,
            data: vec![value; rows * cols],
            matrix_type: MatrixType::Unknown,
        }
    }

    /// Build from row slices. `None` if the rows have different lengths.
    pub fn from_rows(rows: &[Vec<T>]) -> Option<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != cols) {
            return None;
        }
        Some(Matrix::from_fn(rows.len(), cols, |r, c| rows[r][c].clone()))
    }

    #[must_use]
    pub fn transpose(&self) -> Self {
        let kind = match self.matrix_type {
            MatrixType::Lower => MatrixType::Upper,
            MatrixType::Upper => MatrixType::Lower,
            MatrixType::Diagonal => MatrixType::Diagonal,
            MatrixType::Permutation => MatrixType::Permutation,
            _ => MatrixType::Unknown,
        };
        Matrix::from_fn(self.cols, self.rows, |r, c| self.data[r * self.rows + c].clone())
            .with_matrix_type(kind)
    }

    /// Resize to `rows x cols`, keeping the overlapping block and filling
    /// new positions with `fill`.
    pub fn resize(&mut self, rows: usize, cols: usize, fill: T) {
        if (rows, cols) == self.dims() {
            return;
        }
        let resized = Matrix::from_fn(rows, cols, |r, c| {
            self.get(r, c).cloned().unwrap_or_else(|| fill.clone())
        });
        *self = resized;
    }

    /// Same elements as a single column.
    #[must_use]
    pub fn reshape_column(&self) -> Self {
        Matrix::column_vector(self.data.clone())
    }

    /// Gather rows `rows` and columns `cols` (zero-based).
    pub fn submatrix(&self, rows: &[usize], cols: &[usize]) -> Self {
        Matrix::from_fn(rows.len(), cols.len(), |r, c| {
            self.data[cols[c] * self.rows + rows[r]].clone()
        })
    }
}

impl<T: PartialEq> PartialEq for Matrix<T> {
    /// Element equality; the cached shape kind is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.dims() == other.dims() && self.data == other.data
    }
}

impl<T: fmt::Debug> fmt::Debug for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Matrix({}x{}", self.rows, self.cols)?;
        if self.matrix_type != MatrixType::Unknown {
            write!(f, ", {}", self.matrix_type.name())?;
        }
        write!(f, ") {:?}", self.data)
    }
}

impl Matrix<f64> {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix::filled(rows, cols, 0.0)
    }

    pub fn identity(n: usize) -> Self {
        Matrix::from_fn(n, n, |r, c| if r == c { 1.0 } else { 0.0 })
            .with_matrix_type(MatrixType::Diagonal)
    }

    /// Square matrix with `diag` on the main diagonal.
    pub fn diagonal(diag: &[f64]) -> Self {
        let n = diag.len();
        Matrix::from_fn(n, n, |r, c| if r == c { diag[r] } else { 0.0 })
            .with_matrix_type(MatrixType::Diagonal)
    }

    pub fn to_complex(&self) -> Matrix<Complex> {
        self.map(|&x| Complex::from_real(x))
    }

    /// True if every element is an integer value.
    pub fn all_integers(&self) -> bool {
        self.data.iter().all(|x| x.fract() == 0.0)
    }
}

impl Matrix<Complex> {
    #[must_use]
    pub fn hermitian(&self) -> Self {
        let mut t = self.transpose();
        let kind = t.matrix_type;
        for z in t.elements_mut() {
            *z = z.conj();
        }
        t.with_matrix_type(kind)
    }

    pub fn all_real(&self) -> bool {
        self.data.iter().all(|z| z.is_real())
    }

    pub fn real_part(&self) -> Matrix<f64> {
        self.map(|z| z.re)
    }
}

impl Matrix<char> {
    /// One row per string, padded with blanks to the longest.
    pub fn from_strings(strings: &[&str]) -> Self {
        let rows: Vec<Vec<char>> = strings.iter().map(|s| s.chars().collect()).collect();
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        Matrix::from_fn(rows.len(), cols, |r, c| {
            rows[r].get(c).copied().unwrap_or(' ')
        })
    }

    /// Row `row` as a string.
    pub fn row_string(&self, row: usize) -> String {
        self.row(row).collect()
    }

    /// Character codes as doubles.
    pub fn to_codes(&self) -> Matrix<f64> {
        self.map(|&ch| f64::from(u32::from(ch)))
    }
}
