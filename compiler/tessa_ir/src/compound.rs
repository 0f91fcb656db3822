//! Compound (fused) binary operations and the fusion table.
//!
//! A compound operation evaluates two syntactic operators as one step.
//! There are two families:
//!
//! - **Assignment fusions**: `c = c + b` where the parser knows `c` on both
//!   sides is the same storage. The addition and the store become one
//!   add-assign that updates `c` in place.
//! - **Operand fusions**: `a' * b`, `!a & b` and friends, where a unary
//!   operator on one operand is folded into the binary operator so the
//!   transposed or negated operand is never materialized.
//!
//! Fusion is purely an optimization. A pair with no entry in the table
//! yields [`UnsupportedFusion`], and the caller keeps the plain node.

use std::fmt;

use crate::{AssignOp, BinaryOp, UnaryOp};

/// Fused operation codes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CompoundBinaryOp {
    // Assignment fusions
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    LeftDivAssign,
    PowAssign,
    ElMulAssign,
    ElDivAssign,
    ElLeftDivAssign,
    ElPowAssign,
    ElAndAssign,
    ElOrAssign,

    // Operand fusions
    TransMul,
    MulTrans,
    HermMul,
    MulHerm,
    TransLeftDiv,
    HermLeftDiv,
    ElNotAnd,
    ElNotOr,
    ElAndNot,
    ElOrNot,
}

impl CompoundBinaryOp {
    /// The binary operator this compound operation applies after any
    /// operand transformation.
    pub const fn binary_op(self) -> BinaryOp {
        match self {
            Self::AddAssign => BinaryOp::Add,
            Self::SubAssign => BinaryOp::Sub,
            Self::MulAssign | Self::TransMul | Self::MulTrans | Self::HermMul | Self::MulHerm => {
                BinaryOp::Mul
            }
            Self::DivAssign => BinaryOp::Div,
            Self::LeftDivAssign | Self::TransLeftDiv | Self::HermLeftDiv => BinaryOp::LeftDiv,
            Self::PowAssign => BinaryOp::Pow,
            Self::ElMulAssign => BinaryOp::ElMul,
            Self::ElDivAssign => BinaryOp::ElDiv,
            Self::ElLeftDivAssign => BinaryOp::ElLeftDiv,
            Self::ElPowAssign => BinaryOp::ElPow,
            Self::ElAndAssign | Self::ElNotAnd | Self::ElAndNot => BinaryOp::ElAnd,
            Self::ElOrAssign | Self::ElNotOr | Self::ElOrNot => BinaryOp::ElOr,
        }
    }

    /// True for the assignment family.
    pub const fn is_assignment(self) -> bool {
        matches!(
            self,
            Self::AddAssign
                | Self::SubAssign
                | Self::MulAssign
                | Self::DivAssign
                | Self::LeftDivAssign
                | Self::PowAssign
                | Self::ElMulAssign
                | Self::ElDivAssign
                | Self::ElLeftDivAssign
                | Self::ElPowAssign
                | Self::ElAndAssign
                | Self::ElOrAssign
        )
    }

    /// Unary operator folded into the left operand, if any.
    pub const fn lhs_unary(self) -> Option<UnaryOp> {
        match self {
            Self::TransMul | Self::TransLeftDiv => Some(UnaryOp::Transpose),
            Self::HermMul | Self::HermLeftDiv => Some(UnaryOp::Hermitian),
            Self::ElNotAnd | Self::ElNotOr => Some(UnaryOp::Not),
            _ => None,
        }
    }

    /// Unary operator folded into the right operand, if any.
    pub const fn rhs_unary(self) -> Option<UnaryOp> {
        match self {
            Self::MulTrans => Some(UnaryOp::Transpose),
            Self::MulHerm => Some(UnaryOp::Hermitian),
            Self::ElAndNot | Self::ElOrNot => Some(UnaryOp::Not),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::AddAssign => "add-assign",
            Self::SubAssign => "sub-assign",
            Self::MulAssign => "mul-assign",
            Self::DivAssign => "div-assign",
            Self::LeftDivAssign => "ldiv-assign",
            Self::PowAssign => "pow-assign",
            Self::ElMulAssign => "el-mul-assign",
            Self::ElDivAssign => "el-div-assign",
            Self::ElLeftDivAssign => "el-ldiv-assign",
            Self::ElPowAssign => "el-pow-assign",
            Self::ElAndAssign => "el-and-assign",
            Self::ElOrAssign => "el-or-assign",
            Self::TransMul => "transpose-mul",
            Self::MulTrans => "mul-transpose",
            Self::HermMul => "herm-mul",
            Self::MulHerm => "mul-herm",
            Self::TransLeftDiv => "transpose-ldiv",
            Self::HermLeftDiv => "herm-ldiv",
            Self::ElNotAnd => "el-not-and",
            Self::ElNotOr => "el-not-or",
            Self::ElAndNot => "el-and-not",
            Self::ElOrNot => "el-or-not",
        }
    }
}

impl fmt::Display for CompoundBinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// No fusion rule exists for the operator pair.
///
/// Internal signal only: callers fall back to the unfused node and never
/// report this to users.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct UnsupportedFusion;

/// Result of an operand-fusion lookup: which compound operation applies
/// and which operand loses its unary wrapper.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct OperandFusion {
    pub op: CompoundBinaryOp,
    pub strip_lhs: bool,
    pub strip_rhs: bool,
}

/// Look up the fused equivalent of `target <assign> target <op> rhs`.
///
/// Only plain `=` has entries; `c += c * b` keeps its unfused form.
pub fn lookup_assignment_fusion(
    assign: AssignOp,
    op: BinaryOp,
) -> Result<CompoundBinaryOp, UnsupportedFusion> {
    if assign != AssignOp::Assign {
        return Err(UnsupportedFusion);
    }
    match op {
        BinaryOp::Add => Ok(CompoundBinaryOp::AddAssign),
        BinaryOp::Sub => Ok(CompoundBinaryOp::SubAssign),
        BinaryOp::Mul => Ok(CompoundBinaryOp::MulAssign),
        BinaryOp::Div => Ok(CompoundBinaryOp::DivAssign),
        BinaryOp::LeftDiv => Ok(CompoundBinaryOp::LeftDivAssign),
        BinaryOp::Pow => Ok(CompoundBinaryOp::PowAssign),
        BinaryOp::ElMul => Ok(CompoundBinaryOp::ElMulAssign),
        BinaryOp::ElDiv => Ok(CompoundBinaryOp::ElDivAssign),
        BinaryOp::ElLeftDiv => Ok(CompoundBinaryOp::ElLeftDivAssign),
        BinaryOp::ElPow => Ok(CompoundBinaryOp::ElPowAssign),
        BinaryOp::ElAnd => Ok(CompoundBinaryOp::ElAndAssign),
        BinaryOp::ElOr => Ok(CompoundBinaryOp::ElOrAssign),
        BinaryOp::Lt
        | BinaryOp::Le
        | BinaryOp::Eq
        | BinaryOp::Ge
        | BinaryOp::Gt
        | BinaryOp::Ne
        | BinaryOp::AndAnd
        | BinaryOp::OrOr => Err(UnsupportedFusion),
    }
}

/// Look up an operand fusion given the unary operators (if any) wrapping
/// each operand of `op`. The left operand is tried first.
pub fn lookup_operand_fusion(
    lhs: Option<UnaryOp>,
    op: BinaryOp,
    rhs: Option<UnaryOp>,
) -> Result<OperandFusion, UnsupportedFusion> {
    let on_lhs = |op| OperandFusion {
        op,
        strip_lhs: true,
        strip_rhs: false,
    };
    let on_rhs = |op| OperandFusion {
        op,
        strip_lhs: false,
        strip_rhs: true,
    };

    match (lhs, op, rhs) {
        (Some(UnaryOp::Transpose), BinaryOp::Mul, _) => Ok(on_lhs(CompoundBinaryOp::TransMul)),
        (Some(UnaryOp::Hermitian), BinaryOp::Mul, _) => Ok(on_lhs(CompoundBinaryOp::HermMul)),
        (_, BinaryOp::Mul, Some(UnaryOp::Transpose)) => Ok(on_rhs(CompoundBinaryOp::MulTrans)),
        (_, BinaryOp::Mul, Some(UnaryOp::Hermitian)) => Ok(on_rhs(CompoundBinaryOp::MulHerm)),
        (Some(UnaryOp::Transpose), BinaryOp::LeftDiv, _) => {
            Ok(on_lhs(CompoundBinaryOp::TransLeftDiv))
        }
        (Some(UnaryOp::Hermitian), BinaryOp::LeftDiv, _) => {
            Ok(on_lhs(CompoundBinaryOp::HermLeftDiv))
        }
        (Some(UnaryOp::Not), BinaryOp::ElAnd, _) => Ok(on_lhs(CompoundBinaryOp::ElNotAnd)),
        (_, BinaryOp::ElAnd, Some(UnaryOp::Not)) => Ok(on_rhs(CompoundBinaryOp::ElAndNot)),
        (Some(UnaryOp::Not), BinaryOp::ElOr, _) => Ok(on_lhs(CompoundBinaryOp::ElNotOr)),
        (_, BinaryOp::ElOr, Some(UnaryOp::Not)) => Ok(on_rhs(CompoundBinaryOp::ElOrNot)),
        _ => Err(UnsupportedFusion),
    }
}
