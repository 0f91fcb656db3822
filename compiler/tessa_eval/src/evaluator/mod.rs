//! Tree-walking evaluator.
//!
//! [`TreeEvaluator`] owns the variable storage, the evaluation policy and
//! the numeric backend. Expression evaluation lives here; assignment,
//! fused nodes and the statement driver are split into submodules:
//!
//! - `assign`: simple, indexed, operator and multi-value assignment
//! - `compound`: fused nodes built by the selector
//! - `driver`: statement lists, error reporting, result echo

mod assign;
mod compound;
mod driver;

pub use driver::RunSummary;

use tessa_ir::{BinaryOp, Span, UnaryOp};
use tessa_stack::ensure_sufficient_stack;
use tessa_tree::{BinaryExpr, ColonExpr, Expr, ExprKind, IndexExpr, UnaryExpr};
use tessa_value::errors::{undefined_value, undefined_variable};
use tessa_value::{Matrix, Value, ValueError};

use crate::builtins::Builtin;
use crate::numeric::{NumericBackend, UnavailableBackend};
use crate::operators::evaluate_binary;
use crate::unary_operators::evaluate_unary;
use crate::{Environment, EvalConfig, EvalResult};

/// Evaluates parse trees against a variable environment.
pub struct TreeEvaluator {
    env: Environment,
    config: EvalConfig,
    backend: Box<dyn NumericBackend>,
}

impl TreeEvaluator {
    /// Evaluator with an empty environment and no numeric backend; matrix
    /// division and the factorization builtins fail until one is set.
    pub fn new(config: EvalConfig) -> Self {
        TreeEvaluator {
            env: Environment::new(),
            config,
            backend: Box::new(UnavailableBackend),
        }
    }

    #[must_use]
    pub fn with_backend(mut self, backend: impl NumericBackend + 'static) -> Self {
        self.backend = Box::new(backend);
        self
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn backend(&self) -> &dyn NumericBackend {
        self.backend.as_ref()
    }

    /// Evaluate `expr` to a single value.
    ///
    /// Errors carry the span of the innermost node that has one.
    pub fn evaluate(&mut self, expr: &Expr) -> EvalResult {
        ensure_sufficient_stack(|| self.evaluate_inner(expr)).map_err(|e| e.with_span(expr.span))
    }

    /// Evaluate `expr` for up to `nargout` values.
    ///
    /// Calls and index expressions may produce several values; every other
    /// node (fused nodes included) produces exactly one.
    pub fn evaluate_n(&mut self, expr: &Expr, nargout: usize) -> EvalResult<Vec<Value>> {
        let values = match &expr.kind {
            ExprKind::Index(index) => self.index(index, nargout),
            ExprKind::Identifier(name) if !self.env.contains(name) => {
                match Builtin::lookup(name) {
                    Some(builtin) => builtin.call(&[], nargout, self.backend.as_ref()),
                    None => Err(undefined_variable(name)),
                }
            }
            ExprKind::CompoundBinary(compound) => self.compound(compound).map(|v| vec![v]),
            _ => return self.evaluate(expr).map(|v| vec![v]),
        };
        values.map_err(|e| e.with_span(expr.span))
    }

    /// Evaluate a node that must produce a value.
    fn evaluate_rvalue(&mut self, expr: &Expr) -> EvalResult {
        if !expr.rvalue_ok() {
            return Err(ValueError::new("invalid use of colon in value context").with_span(expr.span));
        }
        self.evaluate(expr)
    }

    fn evaluate_inner(&mut self, expr: &Expr) -> EvalResult {
        match &expr.kind {
            ExprKind::Constant(value) => Ok(value.clone()),
            ExprKind::Identifier(name) => self.identifier(name),
            ExprKind::MagicColon => Ok(Value::magic_colon()),
            ExprKind::Colon(colon) => self.colon(colon),
            ExprKind::Binary(binary) => self.binary(binary),
            ExprKind::CompoundBinary(compound) => self.compound(compound),
            ExprKind::Unary(unary) => self.unary(unary),
            ExprKind::Index(index) => first_value(self.index(index, 1)?, "index"),
            ExprKind::Assign(assign) => self.simple_assignment(assign),
            ExprKind::MultiAssign(multi) => {
                let assigned = self.multi_assignment(multi)?;
                first_value(assigned.into_iter().map(|(_, v)| v).collect(), "assignment")
            }
        }
    }

    /// Variable, then builtin called with no arguments.
    fn identifier(&mut self, name: &str) -> EvalResult {
        if let Some(value) = self.env.get(name) {
            return Ok(value.clone());
        }
        match Builtin::lookup(name) {
            Some(builtin) => first_value(builtin.call(&[], 1, self.backend.as_ref())?, name),
            None => Err(undefined_variable(name)),
        }
    }

    fn colon(&mut self, colon: &ColonExpr) -> EvalResult {
        let base = self.evaluate_rvalue(&colon.base)?;
        let increment = match &colon.increment {
            Some(increment) => Some(self.evaluate_rvalue(increment)?),
            None => None,
        };
        let limit = self.evaluate_rvalue(&colon.limit)?;

        if base.is_empty() || limit.is_empty() || increment.as_ref().is_some_and(Value::is_empty) {
            return Ok(Value::matrix(Matrix::zeros(1, 0)));
        }
        let scalar = |value: &Value| {
            value
                .double_value(true)
                .map_err(|_| ValueError::new("invalid range: operands must be scalars"))
        };
        let increment = match &increment {
            Some(increment) => scalar(increment)?,
            None => 1.0,
        };
        Value::range(scalar(&base)?, scalar(&limit)?, increment)
    }

    fn binary(&mut self, binary: &BinaryExpr) -> EvalResult {
        if binary.op.is_short_circuit() {
            return self.short_circuit(binary);
        }
        let lhs = self.evaluate_rvalue(&binary.lhs)?;
        let rhs = self.evaluate_rvalue(&binary.rhs)?;
        evaluate_binary(&lhs, &rhs, binary.op, self.backend.as_ref())
    }

    /// `&&` and `||`: the right operand is only evaluated when the left
    /// does not decide the result.
    fn short_circuit(&mut self, binary: &BinaryExpr) -> EvalResult {
        let lhs = self.evaluate_rvalue(&binary.lhs)?;
        if lhs.is_empty() {
            return Err(ValueError::new(format!(
                "invalid conversion from empty value to real scalar in operator {}",
                binary.op.as_symbol()
            )));
        }
        let left = lhs.is_true()?;
        match (binary.op, left) {
            (BinaryOp::AndAnd, false) => return Ok(Value::bool(false)),
            (BinaryOp::OrOr, true) => return Ok(Value::bool(true)),
            _ => {}
        }
        let rhs = self.evaluate_rvalue(&binary.rhs)?;
        if rhs.is_empty() {
            return Err(ValueError::new(format!(
                "invalid conversion from empty value to real scalar in operator {}",
                binary.op.as_symbol()
            )));
        }
        Ok(Value::bool(rhs.is_true()?))
    }

    fn unary(&mut self, unary: &UnaryExpr) -> EvalResult {
        if unary.op.is_bump() {
            if let Some(name) = unary.operand.name() {
                return self.bump(name, unary.op, unary.operand.span);
            }
        }
        let operand = self.evaluate_rvalue(&unary.operand)?;
        evaluate_unary(&operand, unary.op)
    }

    /// `++x`, `x++` and friends. Prefix forms return the updated value,
    /// postfix forms the value before the update.
    fn bump(&mut self, name: &str, op: UnaryOp, span: Span) -> EvalResult {
        let Some(mut value) = self.env.take(name) else {
            return Err(undefined_variable(name).with_span(span));
        };
        let before = value.clone();
        if let Err(err) = value.bump_value(op) {
            self.env.set(name, before);
            return Err(err);
        }
        self.env.set(name, value.clone());
        Ok(if op.is_prefix() { value } else { before })
    }

    /// Index or call. A variable shadows a builtin of the same name.
    fn index(&mut self, index: &IndexExpr, nargout: usize) -> EvalResult<Vec<Value>> {
        if let Some(name) = index.expr.name() {
            if !self.env.contains(name) {
                let Some(builtin) = Builtin::lookup(name) else {
                    return Err(undefined_variable(name).with_span(index.expr.span));
                };
                let args = self.arguments(&index.args)?;
                return builtin.call(&args, nargout, self.backend.as_ref());
            }
        }
        let base = self.evaluate_rvalue(&index.expr)?;
        let args = self.arguments(&index.args)?;
        Ok(vec![base.do_index(&args)?])
    }

    /// Argument list values. The magic colon is allowed here.
    fn arguments(&mut self, args: &[Expr]) -> EvalResult<Vec<Value>> {
        args.iter().map(|arg| self.evaluate(arg)).collect()
    }
}

/// The first of `values`, or an undefined-value error naming `what`.
fn first_value(values: Vec<Value>, what: &str) -> EvalResult {
    values
        .into_iter()
        .next()
        .ok_or_else(|| undefined_value(what))
}
