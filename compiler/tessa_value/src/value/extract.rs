//! Value extraction with optional coercion.
//!
//! Each accessor returns the natural representation of the variant it
//! names, or coerces when a lossless path exists (scalar to 1x1 matrix,
//! real to complex). Strings only convert to numbers when the caller
//! forces string conversion. Anything else is a wrong-type error naming
//! the accessor and the value's current type; the value is never changed.

use crate::errors::wrong_type_argument;
use crate::{CharMatrix, Complex, Matrix, RangeValue, ValueMap, ValueResult};

use super::{Payload, Value};

impl Value {
    pub fn double_value(&self, frc_str_conv: bool) -> ValueResult<f64> {
        let fail = || wrong_type_argument("double_value", self.type_as_string());
        match self.payload() {
            Payload::RealScalar(x) => Ok(*x),
            Payload::RealMatrix(m) if m.numel() == 1 => Ok(m.elements()[0]),
            Payload::ComplexScalar(z) if z.is_real() => Ok(z.re),
            Payload::ComplexMatrix(m) if m.numel() == 1 && m.elements()[0].is_real() => {
                Ok(m.elements()[0].re)
            }
            Payload::Range(r) if r.numel() == 1 => Ok(r.base),
            Payload::CharMatrix(m) | Payload::String(m) if frc_str_conv && m.numel() == 1 => {
                Ok(f64::from(u32::from(m.elements()[0])))
            }
            _ => Err(fail()),
        }
    }

    pub fn matrix_value(&self, frc_str_conv: bool) -> ValueResult<Matrix<f64>> {
        match self.payload() {
            Payload::RealScalar(x) => Ok(Matrix::filled(1, 1, *x)),
            Payload::RealMatrix(m) => Ok(m.clone()),
            Payload::ComplexScalar(z) if z.is_real() => Ok(Matrix::filled(1, 1, z.re)),
            Payload::ComplexMatrix(m) if m.all_real() => Ok(m.real_part()),
            Payload::Range(r) => Ok(r.matrix_value()),
            Payload::CharMatrix(m) | Payload::String(m) if frc_str_conv => Ok(m.to_codes()),
            _ => Err(wrong_type_argument("matrix_value", self.type_as_string())),
        }
    }

    pub fn complex_value(&self, frc_str_conv: bool) -> ValueResult<Complex> {
        match self.payload() {
            Payload::ComplexScalar(z) => Ok(*z),
            Payload::ComplexMatrix(m) if m.numel() == 1 => Ok(m.elements()[0]),
            _ => self
                .double_value(frc_str_conv)
                .map(Complex::from_real)
                .map_err(|_| wrong_type_argument("complex_value", self.type_as_string())),
        }
    }

    pub fn complex_matrix_value(&self, frc_str_conv: bool) -> ValueResult<Matrix<Complex>> {
        match self.payload() {
            Payload::ComplexScalar(z) => Ok(Matrix::filled(1, 1, *z)),
            Payload::ComplexMatrix(m) => Ok(m.clone()),
            Payload::RealScalar(x) => Ok(Matrix::filled(1, 1, Complex::from_real(*x))),
            Payload::RealMatrix(m) => Ok(m.to_complex()),
            Payload::Range(r) => Ok(r.matrix_value().to_complex()),
            Payload::CharMatrix(m) | Payload::String(m) if frc_str_conv => {
                Ok(m.to_codes().to_complex())
            }
            _ => Err(wrong_type_argument(
                "complex_matrix_value",
                self.type_as_string(),
            )),
        }
    }

    pub fn char_matrix_value(&self, frc_str_conv: bool) -> ValueResult<CharMatrix> {
        match self.payload() {
            Payload::CharMatrix(m) | Payload::String(m) => Ok(m.clone()),
            Payload::RealScalar(_) | Payload::RealMatrix(_) | Payload::Range(_)
                if frc_str_conv =>
            {
                let codes = self.matrix_value(false)?;
                codes_to_chars(&codes)
                    .ok_or_else(|| wrong_type_argument("char_matrix_value", self.type_as_string()))
            }
            _ => Err(wrong_type_argument(
                "char_matrix_value",
                self.type_as_string(),
            )),
        }
    }

    /// Text of a single-row string or character matrix.
    pub fn string_value(&self) -> ValueResult<String> {
        match self.payload() {
            Payload::CharMatrix(m) | Payload::String(m) if m.rows() <= 1 => {
                Ok(m.elements().iter().collect())
            }
            _ => Err(wrong_type_argument("string_value", self.type_as_string())),
        }
    }

    /// The range descriptor. Only ranges have one.
    pub fn range_value(&self) -> ValueResult<RangeValue> {
        match self.payload() {
            Payload::Range(r) => Ok(*r),
            _ => Err(wrong_type_argument("range_value", self.type_as_string())),
        }
    }

    pub fn map_value(&self) -> ValueResult<ValueMap> {
        match self.payload() {
            Payload::Map(m) => Ok(m.clone()),
            _ => Err(wrong_type_argument("map_value", self.type_as_string())),
        }
    }

    /// Column-wise "all elements nonzero". Vectors and scalars reduce to
    /// a scalar; matrices give a row vector with one entry per column.
    pub fn all(&self) -> ValueResult<Value> {
        self.reduce_columns("all", true)
    }

    /// Column-wise "any element nonzero", shaped like [`Value::all`].
    pub fn any(&self) -> ValueResult<Value> {
        self.reduce_columns("any", false)
    }

    fn reduce_columns(&self, name: &str, every: bool) -> ValueResult<Value> {
        let flags: Matrix<bool> = match self.payload() {
            Payload::RealScalar(_)
            | Payload::RealMatrix(_)
            | Payload::Range(_)
            | Payload::CharMatrix(_)
            | Payload::String(_) => self.matrix_value(true)?.map(|&x| x != 0.0),
            Payload::ComplexScalar(_) | Payload::ComplexMatrix(_) => {
                self.complex_matrix_value(false)?.map(|z| !z.is_zero())
            }
            _ => return Err(wrong_type_argument(name, self.type_as_string())),
        };
        let apply = |column: &[bool]| {
            if every {
                column.iter().all(|&b| b)
            } else {
                column.iter().any(|&b| b)
            }
        };

        if flags.is_vector() || flags.dims() == (0, 0) {
            return Ok(Value::bool(apply(flags.elements())));
        }
        let per_column: Vec<f64> = (0..flags.cols())
            .map(|c| if apply(flags.column(c)) { 1.0 } else { 0.0 })
            .collect();
        Ok(Value::row_vector(per_column))
    }
}

/// Character codes back to characters. `None` if any code is not a
/// valid character.
pub(crate) fn codes_to_chars(codes: &Matrix<f64>) -> Option<CharMatrix> {
    let chars: Option<Vec<char>> = codes
        .elements()
        .iter()
        .map(|&x| {
            let rounded = x.round();
            if (0.0..=f64::from(u32::MAX)).contains(&rounded) {
                char::from_u32(rounded as u32)
            } else {
                None
            }
        })
        .collect();
    Matrix::from_column_major(codes.rows(), codes.cols(), chars?)
}
