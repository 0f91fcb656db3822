//! Unary operator implementations.
//!
//! Direct dispatch on the value's payload. The variant set is closed, so
//! a match is exhaustive and no operator table is needed.
//!
//! Increment and decrement are not handled here: they update a variable
//! in place and the evaluator applies them through
//! [`Value::bump_value`].

use tessa_ir::UnaryOp;
use tessa_value::errors::{undefined_value, wrong_type_argument};
use tessa_value::{Complex, Matrix, Payload, Value, ValueError, ValueResult};

use crate::operators::{complex_result, real_result};

/// Evaluate `op` applied to `value`.
pub fn evaluate_unary(value: &Value, op: UnaryOp) -> ValueResult<Value> {
    match op {
        UnaryOp::Neg => negate(value),
        UnaryOp::Not => not(value),
        UnaryOp::Transpose => transpose(value, false),
        UnaryOp::Hermitian => transpose(value, true),
        UnaryOp::PreIncrement
        | UnaryOp::PreDecrement
        | UnaryOp::PostIncrement
        | UnaryOp::PostDecrement => Err(ValueError::new(format!(
            "operator {}: operand must be a variable",
            op.as_symbol()
        ))),
    }
}

#[cold]
fn unary_type_error(op: UnaryOp, value: &Value) -> ValueError {
    if value.is_undefined() {
        return undefined_value(&format!("unary operator '{}'", op.as_symbol()));
    }
    wrong_type_argument(
        &format!("unary operator '{}'", op.as_symbol()),
        value.type_as_string(),
    )
}

fn negate(value: &Value) -> ValueResult<Value> {
    Ok(match value.payload() {
        Payload::RealScalar(x) => Value::scalar(-x),
        Payload::RealMatrix(m) => Value::matrix(m.map(|x| -x)),
        Payload::ComplexScalar(z) => Value::complex(-*z),
        Payload::ComplexMatrix(m) => Value::complex_matrix(m.map(|z| -*z)),
        Payload::Range(r) => Value::from_range(r.negated()),
        Payload::CharMatrix(m) | Payload::String(m) => real_result(m.to_codes().map(|x| -x)),
        Payload::Undefined | Payload::Map(_) | Payload::MagicColon | Payload::AllVaArgs => {
            return Err(unary_type_error(UnaryOp::Neg, value))
        }
    })
}

fn not(value: &Value) -> ValueResult<Value> {
    let logical = |m: &Matrix<f64>| -> ValueResult<Value> {
        if m.elements().iter().any(|x| x.is_nan()) {
            return Err(ValueError::new("logical conversion from NaN value"));
        }
        Ok(real_result(m.map(|&x| if x == 0.0 { 1.0 } else { 0.0 })))
    };
    match value.payload() {
        Payload::RealScalar(x) if x.is_nan() => {
            Err(ValueError::new("logical conversion from NaN value"))
        }
        Payload::RealScalar(x) => Ok(Value::bool(*x == 0.0)),
        Payload::RealMatrix(m) => logical(m),
        Payload::Range(r) => logical(&r.matrix_value()),
        Payload::CharMatrix(m) | Payload::String(m) => logical(&m.to_codes()),
        Payload::ComplexScalar(z) => Ok(Value::bool(z.is_zero())),
        Payload::ComplexMatrix(m) => Ok(real_result(
            m.map(|z| if z.is_zero() { 1.0 } else { 0.0 }),
        )),
        Payload::Undefined | Payload::Map(_) | Payload::MagicColon | Payload::AllVaArgs => {
            Err(unary_type_error(UnaryOp::Not, value))
        }
    }
}

/// `.'` when `conjugate` is false, `'` otherwise. Character data stays
/// character data.
fn transpose(value: &Value, conjugate: bool) -> ValueResult<Value> {
    let op = if conjugate {
        UnaryOp::Hermitian
    } else {
        UnaryOp::Transpose
    };
    Ok(match value.payload() {
        Payload::RealScalar(_) => value.clone(),
        Payload::ComplexScalar(z) => Value::complex(if conjugate { z.conj() } else { *z }),
        Payload::RealMatrix(m) => Value::matrix(m.transpose()),
        Payload::ComplexMatrix(m) => {
            let t: Matrix<Complex> = if conjugate {
                m.hermitian()
            } else {
                m.transpose()
            };
            complex_result(t)
        }
        Payload::Range(r) => Value::matrix(r.matrix_value().transpose()),
        Payload::CharMatrix(m) | Payload::String(m) => Value::char_matrix(m.transpose()),
        Payload::Undefined | Payload::Map(_) | Payload::MagicColon | Payload::AllVaArgs => {
            return Err(unary_type_error(op, value))
        }
    })
}
