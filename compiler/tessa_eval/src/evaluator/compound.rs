//! Fused node evaluation.
//!
//! Every fused path produces exactly the value (and the error) the
//! wrapped binary expression would. Two families:
//!
//! - Assignment fusions (`x = x op e`): the update operand is evaluated,
//!   then the variable is taken out of storage and, for the element-wise
//!   arithmetic operators, updated in place. When another handle still
//!   shares the representation the write unshares it first, so that
//!   handle keeps the old value.
//! - Operand fusions (`a' * b`, `!a & b`, ...): the stripped operands are
//!   evaluated and the folded unary operator is applied inside the kernel,
//!   so the transposed or negated operand is never built.
//!
//! Anything the fast paths do not cover materializes the unary operator
//! and goes through the ordinary binary dispatch.

use tessa_ir::{BinaryOp, CompoundBinaryOp, UnaryOp};
use tessa_tree::CompoundBinaryExpr;
use tessa_value::errors::nonconformant;
use tessa_value::{Complex, Matrix, Payload, Value};

use super::TreeEvaluator;
use crate::operators::{
    arithmetic_kernel, at, broadcast, complex_result, evaluate_binary, logical_kernel,
    matrix_product, real_result, truth, Element, Operand, Promoted,
};
use crate::unary_operators::evaluate_unary;
use crate::EvalResult;

impl TreeEvaluator {
    pub(super) fn compound(&mut self, compound: &CompoundBinaryExpr) -> EvalResult {
        let op = compound.op();
        tracing::trace!(op = %op, "evaluating fused node");
        if op.is_assignment() {
            self.assignment_fusion(compound)
        } else {
            self.operand_fusion(compound)
        }
    }

    fn assignment_fusion(&mut self, compound: &CompoundBinaryExpr) -> EvalResult {
        let op = compound.op().binary_op();
        let name = match compound.clhs().name() {
            Some(name) if self.env.contains(name) => name,
            _ => return self.binary(compound.binary()),
        };
        let Some(snapshot) = self.env.get(name).cloned() else {
            return self.binary(compound.binary());
        };
        let rhs = self.evaluate_rvalue(compound.crhs())?;

        let Some(mut stored) = self.env.take(name) else {
            return evaluate_binary(&snapshot, &rhs, op, self.backend.as_ref());
        };
        if !stored.shares_rep_with(&snapshot) {
            // Evaluating the update operand rebound the variable; combine
            // with the value read before it ran.
            let result = evaluate_binary(&snapshot, &rhs, op, self.backend.as_ref());
            return self.store_or_restore(name, result, stored);
        }
        drop(snapshot);

        if update_in_place(&mut stored, &rhs, op) {
            tracing::trace!(variable = name, "updated in place");
            self.env.set(name, stored.clone());
            return Ok(stored);
        }
        let result = evaluate_binary(&stored, &rhs, op, self.backend.as_ref());
        self.store_or_restore(name, result, stored)
    }

    fn store_or_restore(&mut self, name: &str, result: EvalResult, previous: Value) -> EvalResult {
        match result {
            Ok(value) => {
                self.env.set(name, value.clone());
                Ok(value)
            }
            Err(err) => {
                self.env.set(name, previous);
                Err(err)
            }
        }
    }

    fn operand_fusion(&mut self, compound: &CompoundBinaryExpr) -> EvalResult {
        let op = compound.op();
        let lhs = self.fused_operand(compound, true)?;
        let rhs = self.fused_operand(compound, false)?;
        let fast = match op {
            CompoundBinaryOp::TransMul
            | CompoundBinaryOp::HermMul
            | CompoundBinaryOp::MulTrans
            | CompoundBinaryOp::MulHerm => fused_product(&lhs, &rhs),
            CompoundBinaryOp::ElNotAnd
            | CompoundBinaryOp::ElNotOr
            | CompoundBinaryOp::ElAndNot
            | CompoundBinaryOp::ElOrNot => fused_logical(&lhs, &rhs, op.binary_op()),
            _ => None,
        };
        match fast {
            Some(result) => result,
            None => {
                let lhs = lhs.materialize()?;
                let rhs = rhs.materialize()?;
                evaluate_binary(&lhs, &rhs, op.binary_op(), self.backend.as_ref())
            }
        }
    }

    /// Evaluate one stripped operand. The folded operator stays pending
    /// only when applying it later cannot fail; otherwise it is applied
    /// now, so any error surfaces where the unfused expression raises it.
    fn fused_operand(&mut self, compound: &CompoundBinaryExpr, left: bool) -> EvalResult<Pending> {
        let op = compound.op();
        let (expr, unary) = if left {
            (compound.clhs(), op.lhs_unary())
        } else {
            (compound.crhs(), op.rhs_unary())
        };
        let value = self.evaluate_rvalue(expr)?;
        match unary {
            Some(unary) if !can_defer(&value, unary) => Ok(Pending {
                value: evaluate_unary(&value, unary)?,
                unary: None,
            }),
            _ => Ok(Pending { value, unary }),
        }
    }
}

/// A fused operand and the unary operator not yet applied to it.
struct Pending {
    value: Value,
    unary: Option<UnaryOp>,
}

impl Pending {
    fn materialize(self) -> EvalResult {
        match self.unary {
            Some(unary) => evaluate_unary(&self.value, unary),
            None => Ok(self.value),
        }
    }

    /// Full-matrix operand for a kernel. A transposed complex operand
    /// with no imaginary part counts as real, the same narrowing the
    /// materialized transpose gets.
    fn operand(&self) -> Option<Operand> {
        let narrow = self.unary.is_some();
        match self.value.payload() {
            Payload::RealScalar(x) => Some(Operand::Real(Matrix::filled(1, 1, *x))),
            Payload::RealMatrix(m) => Some(Operand::Real(m.clone())),
            Payload::ComplexScalar(z) => Some(Operand::Complex(Matrix::filled(1, 1, *z))),
            Payload::ComplexMatrix(m) if narrow && m.all_real() => {
                Some(Operand::Real(m.real_part()))
            }
            Payload::ComplexMatrix(m) => Some(Operand::Complex(m.clone())),
            _ => None,
        }
    }
}

/// True when `unary` applied to `value` cannot fail.
fn can_defer(value: &Value, unary: UnaryOp) -> bool {
    if !value.is_numeric_type() {
        return false;
    }
    match (unary, value.payload()) {
        (UnaryOp::Not, Payload::RealScalar(x)) => !x.is_nan(),
        (UnaryOp::Not, Payload::RealMatrix(m)) => !m.elements().iter().any(|x| x.is_nan()),
        _ => true,
    }
}

// Assignment fusion

/// Apply an element-wise arithmetic update to `target` in place. Returns
/// false, leaving `target` untouched, when the operator, the variants or
/// the shapes need the general path.
fn update_in_place(target: &mut Value, rhs: &Value, op: BinaryOp) -> bool {
    if !matches!(
        op,
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::ElMul | BinaryOp::ElDiv | BinaryOp::ElLeftDiv
    ) {
        return false;
    }
    if !rhs.is_numeric_type() || !(rhs.dims() == target.dims() || rhs.numel() == 1) {
        return false;
    }

    if target.is_real_matrix() && rhs.is_real_type() {
        let (Some(f), Ok(update)) = (arithmetic_kernel::<f64>(op), rhs.matrix_value(false)) else {
            return false;
        };
        let Some(m) = target.real_matrix_mut() else {
            return false;
        };
        apply(m, &update, f);
    } else if target.is_complex_matrix() {
        let (Some(f), Ok(update)) = (
            arithmetic_kernel::<Complex>(op),
            rhs.complex_matrix_value(false),
        ) else {
            return false;
        };
        let Some(m) = target.complex_matrix_mut() else {
            return false;
        };
        apply(m, &update, f);
    } else {
        return false;
    }
    target.maybe_mutate();
    true
}

/// `m[i] = f(m[i], update[i])`, or against the single element of a 1x1
/// update.
fn apply<T: Element>(m: &mut Matrix<T>, update: &Matrix<T>, f: fn(T, T) -> T) {
    if update.dims() == m.dims() {
        for (x, &y) in m.elements_mut().iter_mut().zip(update.elements()) {
            *x = f(*x, y);
        }
    } else {
        let y = update.elements()[0];
        for x in m.elements_mut() {
            *x = f(*x, y);
        }
    }
}

// Operand fusion

/// `a.' * b`, `a' * b`, `a * b.'`, `a * b'` without building the
/// transpose. Scalar operands take the general path.
fn fused_product(lhs: &Pending, rhs: &Pending) -> Option<EvalResult> {
    let (a, b) = (lhs.operand()?, rhs.operand()?);
    if a.is_scalar() || b.is_scalar() {
        return None;
    }
    let conj_lhs = lhs.unary == Some(UnaryOp::Hermitian);
    let conj_rhs = rhs.unary == Some(UnaryOp::Hermitian);
    let (lhs_t, rhs_t) = (lhs.unary.is_some(), rhs.unary.is_some());
    Some(match Operand::promote(a, b) {
        Promoted::Real(a, b) => {
            product_with(&a, &b, (lhs_t, conj_lhs), (rhs_t, conj_rhs)).map(real_result)
        }
        Promoted::Complex(a, b) => {
            product_with(&a, &b, (lhs_t, conj_lhs), (rhs_t, conj_rhs)).map(complex_result)
        }
    })
}

/// `op(a) * op(b)` where each side is `(transposed, conjugated)`.
fn product_with<T: Element>(
    a: &Matrix<T>,
    b: &Matrix<T>,
    (a_t, a_conj): (bool, bool),
    (b_t, b_conj): (bool, bool),
) -> EvalResult<Matrix<T>> {
    let flip = |(r, c): (usize, usize), t: bool| if t { (c, r) } else { (r, c) };
    let (a_dims, b_dims) = (flip(a.dims(), a_t), flip(b.dims(), b_t));
    if a_dims.1 != b_dims.0 {
        return Err(nonconformant(BinaryOp::Mul, a_dims, b_dims));
    }
    let read = |m: &Matrix<T>, i: usize, j: usize, t: bool, conj: bool| {
        let x = if t { at(m, j, i) } else { at(m, i, j) };
        if conj {
            x.conj()
        } else {
            x
        }
    };
    Ok(matrix_product(
        a_dims.0,
        a_dims.1,
        b_dims.1,
        |i, k| read(a, i, k, a_t, a_conj),
        |k, j| read(b, k, j, b_t, b_conj),
    ))
}

/// `!a & b`, `a | !b`, ... with the negation folded into the kernel.
fn fused_logical(lhs: &Pending, rhs: &Pending, op: BinaryOp) -> Option<EvalResult> {
    let (a, b) = (lhs.operand()?, rhs.operand()?);
    let f = logical_kernel(op);
    let (not_a, not_b) = (lhs.unary.is_some(), rhs.unary.is_some());
    let combine = move |x: bool, y: bool| truth(f(x != not_a, y != not_b));
    let result = match (a, b) {
        (Operand::Real(a), Operand::Real(b)) => {
            broadcast(op, &a, &b, |x, y| combine(x.is_nonzero(), y.is_nonzero()))
        }
        (a, b) => {
            let (a, b) = (a.into_complex(), b.into_complex());
            broadcast(op, &a, &b, |x, y| combine(x.is_nonzero(), y.is_nonzero()))
        }
    };
    Some(result.map(real_result))
}

