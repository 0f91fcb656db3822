//! Expression nodes.
//!
//! Each node owns its children. Trees are immutable once built:
//! evaluation reads them and may change variable storage, but never the
//! tree itself.

use tessa_ir::{AssignOp, BinaryOp, CompoundBinaryOp, Span, UnaryOp};
use tessa_value::Value;

/// An expression with its source position.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// Literal value.
    Constant(Value),
    /// Variable reference or call without arguments.
    Identifier(String),
    /// `:` in an argument list.
    MagicColon,
    /// `base:limit` or `base:increment:limit`.
    Colon(ColonExpr),
    Binary(BinaryExpr),
    /// Fused operation; see [`CompoundBinaryExpr`].
    CompoundBinary(CompoundBinaryExpr),
    Unary(UnaryExpr),
    /// `expr(args)`: indexing or a call.
    Index(IndexExpr),
    /// `target = rhs` or `target op= rhs`.
    Assign(SimpleAssignment),
    /// `[a, b, ...] = rhs`.
    MultiAssign(MultiAssignment),
}

#[derive(Clone, Debug, PartialEq)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
}

/// A binary expression fused with an adjacent operator.
///
/// Wraps the original binary expression (kept for printing and for
/// callers that want plain binary semantics) and owns a separate pair of
/// operands for the fused path:
/// - assignment fusions (`c = c + b`): `clhs` is the storage being updated,
///   `crhs` the update operand
/// - operand fusions (`a' * b`): the operands with the folded unary
///   operator stripped
///
/// The node owns both pairs outright. The fused pair is built from clones
/// when the node is created, so dropping the node drops each exactly once.
#[derive(Clone, Debug, PartialEq)]
pub struct CompoundBinaryExpr {
    binary: BinaryExpr,
    op: CompoundBinaryOp,
    clhs: Box<Expr>,
    crhs: Box<Expr>,
}

impl CompoundBinaryExpr {
    pub(crate) fn new(binary: BinaryExpr, op: CompoundBinaryOp, clhs: Expr, crhs: Expr) -> Self {
        CompoundBinaryExpr {
            binary,
            op,
            clhs: Box::new(clhs),
            crhs: Box::new(crhs),
        }
    }

    /// The wrapped, unfused binary expression.
    pub fn binary(&self) -> &BinaryExpr {
        &self.binary
    }

    pub fn op(&self) -> CompoundBinaryOp {
        self.op
    }

    /// Left operand of the fused path.
    pub fn clhs(&self) -> &Expr {
        &self.clhs
    }

    /// Right operand of the fused path.
    pub fn crhs(&self) -> &Expr {
        &self.crhs
    }

    /// Unwrap into the original binary expression.
    pub fn into_binary(self) -> BinaryExpr {
        self.binary
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColonExpr {
    pub base: Box<Expr>,
    pub increment: Option<Box<Expr>>,
    pub limit: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IndexExpr {
    pub expr: Box<Expr>,
    pub args: Vec<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimpleAssignment {
    /// Identifier, or an index expression on an identifier.
    pub target: Box<Expr>,
    pub op: AssignOp,
    pub rhs: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MultiAssignment {
    pub targets: Vec<Expr>,
    pub rhs: Box<Expr>,
}

// Construction

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }

    pub fn constant(value: Value, span: Span) -> Self {
        Expr::new(ExprKind::Constant(value), span)
    }

    /// Real scalar literal, with the literal's position recorded on the
    /// value as well.
    pub fn number(x: f64, span: Span) -> Self {
        let value = Value::scalar_at(x, Some(span.line), Some(span.column));
        Expr::constant(value, span)
    }

    pub fn identifier(name: impl Into<String>, span: Span) -> Self {
        Expr::new(ExprKind::Identifier(name.into()), span)
    }

    pub fn magic_colon(span: Span) -> Self {
        Expr::new(ExprKind::MagicColon, span)
    }

    pub fn colon(base: Expr, increment: Option<Expr>, limit: Expr, span: Span) -> Self {
        Expr::new(
            ExprKind::Colon(ColonExpr {
                base: Box::new(base),
                increment: increment.map(Box::new),
                limit: Box::new(limit),
            }),
            span,
        )
    }

    /// Plain binary node. Use
    /// [`maybe_compound_binary_expression`](crate::maybe_compound_binary_expression)
    /// to get a fused node where one applies.
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr, span: Span) -> Self {
        Expr::new(
            ExprKind::Binary(BinaryExpr {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            }),
            span,
        )
    }

    pub fn unary(op: UnaryOp, operand: Expr, span: Span) -> Self {
        Expr::new(
            ExprKind::Unary(UnaryExpr {
                op,
                operand: Box::new(operand),
            }),
            span,
        )
    }

    pub fn index(expr: Expr, args: Vec<Expr>, span: Span) -> Self {
        Expr::new(
            ExprKind::Index(IndexExpr {
                expr: Box::new(expr),
                args,
            }),
            span,
        )
    }

    pub fn assign(target: Expr, op: AssignOp, rhs: Expr, span: Span) -> Self {
        Expr::new(
            ExprKind::Assign(SimpleAssignment {
                target: Box::new(target),
                op,
                rhs: Box::new(rhs),
            }),
            span,
        )
    }

    pub fn multi_assign(targets: Vec<Expr>, rhs: Expr, span: Span) -> Self {
        Expr::new(
            ExprKind::MultiAssign(MultiAssignment {
                targets,
                rhs: Box::new(rhs),
            }),
            span,
        )
    }
}

// Queries

impl Expr {
    /// Whether the node may appear where a value is required. Only the
    /// magic colon is confined to argument lists.
    pub fn rvalue_ok(&self) -> bool {
        !matches!(self.kind, ExprKind::MagicColon)
    }

    /// Whether the node can be assigned to: an identifier or an index
    /// expression on one.
    pub fn lvalue_ok(&self) -> bool {
        match &self.kind {
            ExprKind::Identifier(_) => true,
            ExprKind::Index(index) => matches!(index.expr.kind, ExprKind::Identifier(_)),
            _ => false,
        }
    }

    pub fn is_identifier(&self) -> bool {
        matches!(self.kind, ExprKind::Identifier(_))
    }

    /// Identifier name, if this is an identifier.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Variable an assignment to this node would store into.
    pub fn storage_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Identifier(name) => Some(name),
            ExprKind::Index(index) => index.expr.name(),
            _ => None,
        }
    }

    pub fn is_assignment_expression(&self) -> bool {
        matches!(self.kind, ExprKind::Assign(_) | ExprKind::MultiAssign(_))
    }

    /// The unary operator at the root of this node, if any.
    pub fn unary_op(&self) -> Option<UnaryOp> {
        match &self.kind {
            ExprKind::Unary(unary) => Some(unary.op),
            _ => None,
        }
    }
}
