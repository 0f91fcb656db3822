//! Assignment.
//!
//! Indexed assignment takes the variable out of the environment so the
//! evaluator holds the only handle and the update can happen in place. A
//! failed update puts the untouched value back.

use tessa_ir::AssignOp;
use tessa_tree::{Expr, ExprKind, MultiAssignment, SimpleAssignment};
use tessa_value::errors::{undefined_value, undefined_variable};
use tessa_value::{Value, ValueError};

use super::TreeEvaluator;
use crate::operators::evaluate_binary;
use crate::EvalResult;

#[cold]
fn invalid_assignment_target() -> ValueError {
    ValueError::new("invalid assignment target: expecting a variable or an indexed variable")
}

impl TreeEvaluator {
    /// `target = rhs` or `target op= rhs`. Returns the whole updated
    /// variable.
    pub(super) fn simple_assignment(&mut self, assign: &SimpleAssignment) -> EvalResult {
        match &assign.target.kind {
            ExprKind::Identifier(name) => {
                let value = match assign.op.binary_op() {
                    None => self.evaluate_rvalue(&assign.rhs)?,
                    Some(op) => {
                        let current = self
                            .env
                            .get(name)
                            .cloned()
                            .ok_or_else(|| undefined_variable(name))?;
                        let rhs = self.evaluate_rvalue(&assign.rhs)?;
                        evaluate_binary(&current, &rhs, op, self.backend.as_ref())?
                    }
                };
                if value.is_undefined() {
                    return Err(undefined_value("assignment"));
                }
                self.env.set(name.as_str(), value.clone());
                Ok(value)
            }
            ExprKind::Index(index) => {
                let Some(name) = index.expr.name() else {
                    return Err(invalid_assignment_target());
                };
                let args = self.arguments(&index.args)?;
                let rhs = self.evaluate_rvalue(&assign.rhs)?;
                let rhs = match assign.op {
                    AssignOp::Assign => rhs,
                    op => {
                        let current = self
                            .env
                            .get(name)
                            .ok_or_else(|| undefined_variable(name))?
                            .do_index(&args)?;
                        let Some(binary) = op.binary_op() else {
                            return Err(invalid_assignment_target());
                        };
                        evaluate_binary(&current, &rhs, binary, self.backend.as_ref())?
                    }
                };
                self.assign_indexed(name, &args, &rhs)
            }
            _ => Err(invalid_assignment_target()),
        }
    }

    /// `name(args) = rhs`. An unset variable starts out empty.
    fn assign_indexed(&mut self, name: &str, args: &[Value], rhs: &Value) -> EvalResult {
        let mut target = self.env.take(name).unwrap_or_default();
        match target.assign_at(args, rhs) {
            Ok(()) => {
                self.env.set(name, target.clone());
                Ok(target)
            }
            Err(err) => {
                if target.is_defined() {
                    self.env.set(name, target);
                }
                Err(err)
            }
        }
    }

    /// `[a, b, ...] = rhs`. Every target is checked and the right-hand side
    /// must produce a value for each before anything is stored.
    ///
    /// Returns the assigned values with the names of the variables that
    /// received them.
    pub(super) fn multi_assignment(
        &mut self,
        multi: &MultiAssignment,
    ) -> EvalResult<Vec<(String, Value)>> {
        if let Some(bad) = multi.targets.iter().find(|t| !t.lvalue_ok()) {
            return Err(invalid_assignment_target().with_span(bad.span));
        }
        let values = self.evaluate_n(&multi.rhs, multi.targets.len())?;
        let missing = values
            .iter()
            .take(multi.targets.len())
            .position(Value::is_undefined)
            .or_else(|| (values.len() < multi.targets.len()).then_some(values.len()));
        if let Some(k) = missing {
            return Err(ValueError::new(format!(
                "element number {} undefined in return list",
                k + 1
            )));
        }

        let mut assigned = Vec::with_capacity(multi.targets.len());
        for (target, value) in multi.targets.iter().zip(values) {
            let stored = self.store(target, value)?;
            assigned.push(stored);
        }
        Ok(assigned)
    }

    fn store(&mut self, target: &Expr, value: Value) -> EvalResult<(String, Value)> {
        match &target.kind {
            ExprKind::Identifier(name) => {
                self.env.set(name.as_str(), value.clone());
                Ok((name.clone(), value))
            }
            ExprKind::Index(index) => {
                let name = index.expr.name().ok_or_else(invalid_assignment_target)?;
                let args = self.arguments(&index.args)?;
                let updated = self.assign_indexed(name, &args, &value)?;
                Ok((name.to_string(), updated))
            }
            _ => Err(invalid_assignment_target()),
        }
    }
}
