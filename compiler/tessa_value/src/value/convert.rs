//! Structural conversions and in-place updates.

use tessa_ir::UnaryOp;

use crate::errors::{dimension_too_large, undefined_value, wrong_type_argument};
use crate::{checked_numel, Complex, Matrix, ValueError, ValueResult};

use super::extract::codes_to_chars;
use super::{Payload, TypeTag, Value};

impl Value {
    /// Narrow to the simplest equivalent representation: a 1x1 matrix
    /// becomes a scalar, a complex value with no imaginary part becomes
    /// real, and a one-element range becomes a scalar.
    pub fn maybe_mutate(&mut self) {
        let narrowed = match self.payload() {
            Payload::RealMatrix(m) if m.numel() == 1 => Payload::RealScalar(m.elements()[0]),
            Payload::ComplexScalar(z) if z.is_real() => Payload::RealScalar(z.re),
            Payload::ComplexMatrix(m) if m.all_real() => {
                if m.numel() == 1 {
                    Payload::RealScalar(m.elements()[0].re)
                } else {
                    Payload::RealMatrix(m.real_part())
                }
            }
            Payload::ComplexMatrix(m) if m.numel() == 1 => Payload::ComplexScalar(m.elements()[0]),
            Payload::Range(r) if r.numel() == 1 => Payload::RealScalar(r.base),
            _ => return,
        };
        self.set_payload(narrowed);
    }

    /// Widen a real numeric value to complex when `target` is complex, so
    /// a complex element can be stored into it.
    pub fn maybe_widen(&mut self, target: TypeTag) {
        if !target.is_complex() {
            return;
        }
        let widened = match self.payload() {
            Payload::RealScalar(x) => Payload::ComplexScalar(Complex::from_real(*x)),
            Payload::RealMatrix(m) => Payload::ComplexMatrix(m.to_complex()),
            Payload::Range(r) => Payload::ComplexMatrix(r.matrix_value().to_complex()),
            _ => return,
        };
        self.set_payload(widened);
    }

    /// Numeric values as a string of the characters with those codes.
    pub fn convert_to_str(&self) -> ValueResult<Value> {
        match self.payload() {
            Payload::String(_) => Ok(self.clone()),
            Payload::CharMatrix(m) => Ok(Value::from_payload(Payload::String(m.clone()))),
            Payload::RealScalar(_) | Payload::RealMatrix(_) | Payload::Range(_) => {
                let codes = self.matrix_value(false)?;
                codes_to_chars(&codes)
                    .map(|m| Value::from_payload(Payload::String(m)))
                    .ok_or_else(|| {
                        ValueError::new("convert_to_str: numeric value is not a valid character code")
                    })
            }
            _ => Err(wrong_type_argument("convert_to_str", self.type_as_string())),
        }
    }

    /// Numeric equivalent: strings become character codes and ranges
    /// become matrices. Numeric values are returned as they are.
    pub fn make_numeric(&self) -> ValueResult<Value> {
        match self.payload() {
            Payload::RealScalar(_)
            | Payload::RealMatrix(_)
            | Payload::ComplexScalar(_)
            | Payload::ComplexMatrix(_) => Ok(self.clone()),
            Payload::CharMatrix(m) | Payload::String(m) => {
                let mut v = Value::matrix(m.to_codes());
                v.maybe_mutate();
                Ok(v)
            }
            Payload::Range(r) => Ok(Value::matrix(r.matrix_value())),
            Payload::Undefined => Err(undefined_value("make_numeric")),
            _ => Err(wrong_type_argument("make_numeric", self.type_as_string())),
        }
    }

    /// In-place [`Value::make_numeric`].
    pub fn force_numeric(&mut self) -> ValueResult<()> {
        if self.is_numeric_type() {
            return Ok(());
        }
        let numeric = self.make_numeric()?;
        self.set_payload(numeric.payload().clone());
        Ok(())
    }

    /// Re-express as a full real or complex matrix, without narrowing.
    pub fn convert_to_matrix_type(&self, make_complex: bool) -> ValueResult<Value> {
        if make_complex || self.is_complex_type() {
            Ok(Value::complex_matrix(self.complex_matrix_value(true)?))
        } else {
            Ok(Value::matrix(self.matrix_value(true)?))
        }
    }

    /// Vectors are returned unchanged; other matrices become a single
    /// column in column-major order.
    pub fn convert_to_row_or_column_vector(&self) -> ValueResult<Value> {
        let (rows, cols) = self.dims();
        if rows == 1 || cols == 1 {
            return Ok(self.clone());
        }
        let payload = match self.payload() {
            Payload::RealMatrix(m) => Payload::RealMatrix(m.reshape_column()),
            Payload::ComplexMatrix(m) => Payload::ComplexMatrix(m.reshape_column()),
            Payload::CharMatrix(m) => Payload::CharMatrix(m.reshape_column()),
            Payload::String(m) => Payload::String(m.reshape_column()),
            _ => {
                return Err(wrong_type_argument(
                    "convert_to_row_or_column_vector",
                    self.type_as_string(),
                ))
            }
        };
        Ok(Value::from_payload(payload))
    }

    /// Resize to `rows x cols`, filling new elements with zero.
    pub fn resize(&mut self, rows: usize, cols: usize) -> ValueResult<()> {
        self.resize_with(rows, cols, 0.0)
    }

    /// Resize to `rows x cols`, filling new elements with `fill`. Scalars
    /// and ranges become matrices first.
    pub fn resize_with(&mut self, rows: usize, cols: usize, fill: f64) -> ValueResult<()> {
        if checked_numel(rows, cols).is_none() {
            return Err(dimension_too_large());
        }
        match self.payload() {
            Payload::RealScalar(_) | Payload::Range(_) => {
                let m = self.matrix_value(false)?;
                self.set_payload(Payload::RealMatrix(m));
            }
            Payload::ComplexScalar(z) => {
                let m = Matrix::filled(1, 1, *z);
                self.set_payload(Payload::ComplexMatrix(m));
            }
            Payload::Undefined | Payload::Map(_) | Payload::MagicColon | Payload::AllVaArgs => {
                return Err(wrong_type_argument("resize", self.type_as_string()));
            }
            Payload::RealMatrix(_)
            | Payload::ComplexMatrix(_)
            | Payload::CharMatrix(_)
            | Payload::String(_) => {}
        }
        match self.payload_mut() {
            Payload::RealMatrix(m) => m.resize(rows, cols, fill),
            Payload::ComplexMatrix(m) => m.resize(rows, cols, Complex::from_real(fill)),
            Payload::CharMatrix(m) | Payload::String(m) => {
                let pad = char::from_u32(fill as u32).unwrap_or('\0');
                m.resize(rows, cols, pad);
            }
            _ => {}
        }
        Ok(())
    }

    /// Apply `++` or `--` in place. A value of any other variant is left
    /// untouched, representation and stashed text included.
    pub fn bump_value(&mut self, op: UnaryOp) -> ValueResult<()> {
        let Some(step) = op.bump_step() else {
            return Err(wrong_type_argument(op.as_symbol(), "bump operator"));
        };
        match self.payload() {
            Payload::Undefined => return Err(undefined_value(op.as_symbol())),
            Payload::CharMatrix(_)
            | Payload::String(_)
            | Payload::Map(_)
            | Payload::MagicColon
            | Payload::AllVaArgs => {
                return Err(wrong_type_argument(
                    &format!("operator {}", op.as_symbol()),
                    self.type_as_string(),
                ))
            }
            Payload::RealScalar(_)
            | Payload::RealMatrix(_)
            | Payload::ComplexScalar(_)
            | Payload::ComplexMatrix(_)
            | Payload::Range(_) => {}
        }
        match self.payload_mut() {
            Payload::RealScalar(x) => *x += step,
            Payload::RealMatrix(m) => m.elements_mut().iter_mut().for_each(|x| *x += step),
            Payload::ComplexScalar(z) => z.re += step,
            Payload::ComplexMatrix(m) => m.elements_mut().iter_mut().for_each(|z| z.re += step),
            Payload::Range(r) => *r = r.shifted(step),
            _ => {}
        }
        Ok(())
    }
}
