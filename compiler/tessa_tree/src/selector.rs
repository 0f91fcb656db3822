//! Choosing between plain and fused binary nodes.
//!
//! Tree construction calls [`maybe_compound_binary_expression`] for every
//! binary operator it builds. The function consults the fusion table in
//! `tessa_ir` and returns either a [`CompoundBinaryExpr`] or the plain
//! [`BinaryExpr`] it would have built anyway. The fallback only moves
//! its inputs into the node.

use tessa_ir::{
    lookup_assignment_fusion, lookup_operand_fusion, AssignOp, BinaryOp, CompoundBinaryOp,
    OperandFusion, Span,
};

use crate::{
    BinaryExpr, Command, CompoundBinaryExpr, Expr, ExprKind, SpmdCommand, Statement,
    StatementKind, StatementList,
};

/// Build `lhs op rhs`, fused when the fusion table has an entry.
///
/// `assignment` is the enclosing assignment operator when the parser knows
/// the expression is the right-hand side of `c = c op rhs` and `lhs` names
/// the same storage as `c`. In that case the assignment fusion is tried;
/// otherwise the operand fusions (`a' * b`, `!a & b`, ...) are.
pub fn maybe_compound_binary_expression(
    lhs: Expr,
    rhs: Expr,
    op: BinaryOp,
    span: Span,
    assignment: Option<AssignOp>,
) -> Expr {
    if let Some(assign) = assignment {
        if lhs.is_identifier() {
            if let Ok(compound) = lookup_assignment_fusion(assign, op) {
                tracing::trace!(op = %compound, "fused assignment");
                let clhs = lhs.clone();
                let crhs = rhs.clone();
                let binary = BinaryExpr {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                };
                return compound_node(binary, compound, clhs, crhs, span);
            }
        }
    }

    match lookup_operand_fusion(lhs.unary_op(), op, rhs.unary_op()) {
        Ok(fusion) => {
            tracing::trace!(op = %fusion.op, "fused operand");
            operand_fused(lhs, rhs, op, fusion, span)
        }
        Err(_) => {
            tracing::trace!(op = op.as_symbol(), "no fusion rule");
            Expr::binary(op, lhs, rhs, span)
        }
    }
}

fn operand_fused(lhs: Expr, rhs: Expr, op: BinaryOp, fusion: OperandFusion, span: Span) -> Expr {
    let clhs = if fusion.strip_lhs {
        strip_unary(&lhs)
    } else {
        lhs.clone()
    };
    let crhs = if fusion.strip_rhs {
        strip_unary(&rhs)
    } else {
        rhs.clone()
    };
    let binary = BinaryExpr {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    };
    compound_node(binary, fusion.op, clhs, crhs, span)
}

fn compound_node(
    binary: BinaryExpr,
    op: CompoundBinaryOp,
    clhs: Expr,
    crhs: Expr,
    span: Span,
) -> Expr {
    Expr::new(
        ExprKind::CompoundBinary(CompoundBinaryExpr::new(binary, op, clhs, crhs)),
        span,
    )
}

/// Operand of a unary node, cloned; any other node is cloned whole.
fn strip_unary(expr: &Expr) -> Expr {
    match &expr.kind {
        ExprKind::Unary(unary) => (*unary.operand).clone(),
        _ => expr.clone(),
    }
}

/// Rewrite a statement list so that every binary node that has a fused
/// form uses it.
///
/// Trees built by hand (or by a parser that does not call the selector)
/// go through this pass before evaluation. Assignments of the shape
/// `x = x op e` get the assignment fusion; every other binary node is
/// offered the operand fusions.
pub fn fuse_compound_expressions(list: StatementList) -> StatementList {
    list.into_iter().map(fuse_statement).collect()
}

fn fuse_statement(statement: Statement) -> Statement {
    let Statement {
        kind,
        print_result,
        span,
    } = statement;
    let kind = match kind {
        StatementKind::Expression(expr) => StatementKind::Expression(fuse_expr(expr)),
        StatementKind::Command(Command::Spmd(spmd)) => {
            StatementKind::Command(Command::Spmd(SpmdCommand {
                body: fuse_compound_expressions(spmd.body),
            }))
        }
    };
    Statement {
        kind,
        print_result,
        span,
    }
}

fn fuse_expr(expr: Expr) -> Expr {
    tessa_stack::ensure_sufficient_stack(|| fuse_expr_inner(expr))
}

fn fuse_expr_inner(expr: Expr) -> Expr {
    let Expr { kind, span } = expr;
    match kind {
        ExprKind::Assign(assign) => {
            let target = fuse_expr(*assign.target);
            let Expr {
                kind: rhs_kind,
                span: rhs_span,
            } = *assign.rhs;
            let rhs = match rhs_kind {
                ExprKind::Binary(binary)
                    if target.is_identifier() && binary.lhs.name() == target.name() =>
                {
                    maybe_compound_binary_expression(
                        fuse_expr(*binary.lhs),
                        fuse_expr(*binary.rhs),
                        binary.op,
                        rhs_span,
                        Some(assign.op),
                    )
                }
                other => fuse_expr(Expr::new(other, rhs_span)),
            };
            Expr::assign(target, assign.op, rhs, span)
        }
        ExprKind::Binary(binary) => maybe_compound_binary_expression(
            fuse_expr(*binary.lhs),
            fuse_expr(*binary.rhs),
            binary.op,
            span,
            None,
        ),
        ExprKind::Unary(unary) => Expr::unary(unary.op, fuse_expr(*unary.operand), span),
        ExprKind::Colon(colon) => Expr::colon(
            fuse_expr(*colon.base),
            colon.increment.map(|inc| fuse_expr(*inc)),
            fuse_expr(*colon.limit),
            span,
        ),
        ExprKind::Index(index) => Expr::index(
            fuse_expr(*index.expr),
            index.args.into_iter().map(fuse_expr).collect(),
            span,
        ),
        ExprKind::MultiAssign(multi) => {
            Expr::multi_assign(multi.targets, fuse_expr(*multi.rhs), span)
        }
        kind @ (ExprKind::Constant(_)
        | ExprKind::Identifier(_)
        | ExprKind::MagicColon
        | ExprKind::CompoundBinary(_)) => Expr::new(kind, span),
    }
}
