//! Statement driver.
//!
//! Runs a statement list one statement at a time. A failing statement is
//! reported through the output handler and the run continues with the
//! next one; only `abort_on_error` or a raised interrupt stops it early.

use tessa_ir::Span;
use tessa_tree::{
    fuse_compound_expressions, Command, Expr, ExprKind, SpmdCommand, Statement, StatementKind,
    StatementList,
};
use tessa_value::{Value, ValueError};

use super::TreeEvaluator;
use crate::EvalResult;

/// Outcome of [`TreeEvaluator::run`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    /// Statements that completed.
    pub executed: usize,
    /// Statements that raised an error.
    pub failed: usize,
    /// The reported errors, in order.
    pub errors: Vec<ValueError>,
    /// The run stopped because the interrupt flag was raised.
    pub interrupted: bool,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0 && !self.interrupted
    }
}

impl TreeEvaluator {
    /// Run `list` under the evaluator's configuration.
    ///
    /// When fusion is enabled the list is first rewritten so binary nodes
    /// with a fused form use it. A raised interrupt is consumed: the flag
    /// is cleared when the run stops for it.
    pub fn run(&mut self, list: &StatementList) -> RunSummary {
        let mut summary = RunSummary::default();
        if self.config.compound_fusion {
            let fused = fuse_compound_expressions(list.clone());
            self.run_list(&fused, &mut summary);
        } else {
            self.run_list(list, &mut summary);
        }
        summary
    }

    fn run_list(&mut self, list: &StatementList, summary: &mut RunSummary) {
        for statement in list {
            if self.config.interrupt.is_raised() {
                tracing::debug!("interrupt raised; stopping run");
                self.config.interrupt.clear();
                summary.interrupted = true;
                return;
            }
            match self.execute(statement) {
                Ok(()) => summary.executed += 1,
                Err(err) => {
                    summary.failed += 1;
                    self.report(&err, statement.span);
                    summary.errors.push(err);
                    if self.config.abort_on_error {
                        return;
                    }
                }
            }
        }
    }

    /// Execute one statement. Errors abort this statement only.
    #[tracing::instrument(level = "debug", skip_all, fields(line = statement.span.line))]
    pub fn execute(&mut self, statement: &Statement) -> EvalResult<()> {
        match &statement.kind {
            StatementKind::Expression(expr) => self.execute_expression(expr, statement.print_result),
            StatementKind::Command(Command::Spmd(spmd)) => self.execute_spmd(spmd),
        }
    }

    /// The body runs in order in this evaluator; its first error fails the
    /// whole block.
    fn execute_spmd(&mut self, spmd: &SpmdCommand) -> EvalResult<()> {
        for statement in &spmd.body {
            self.execute(statement)?;
        }
        Ok(())
    }

    fn execute_expression(&mut self, expr: &Expr, print_result: bool) -> EvalResult<()> {
        match &expr.kind {
            ExprKind::Assign(assign) => {
                let value = self.simple_assignment(assign).map_err(|e| e.with_span(expr.span))?;
                if let Some(name) = assign.target.storage_name() {
                    self.echo(name, &value, print_result);
                }
            }
            ExprKind::MultiAssign(multi) => {
                let assigned = self
                    .multi_assignment(multi)
                    .map_err(|e| e.with_span(expr.span))?;
                for (name, value) in &assigned {
                    self.echo(name, value, print_result);
                }
            }
            ExprKind::Identifier(name) if self.env.contains(name) => {
                let value = self.evaluate(expr)?;
                self.echo(name, &value, print_result);
            }
            ExprKind::Unary(unary) if unary.op.is_bump() && unary.operand.is_identifier() => {
                self.evaluate(expr)?;
                if let Some(name) = unary.operand.name() {
                    if let Some(value) = self.env.get(name).cloned() {
                        self.echo(name, &value, print_result);
                    }
                }
            }
            _ => {
                let value = self.evaluate_rvalue(expr)?;
                if value.is_defined() {
                    self.env.set("ans", value.clone());
                    self.echo("ans", &value, print_result);
                }
            }
        }
        Ok(())
    }

    fn echo(&self, name: &str, value: &Value, print_result: bool) {
        if print_result && self.config.print_results {
            self.config.output.print(&value.print_with_name(name));
        }
    }

    fn report(&self, err: &ValueError, statement_span: Span) {
        let span = err.span.unwrap_or(Span::UNKNOWN).or(statement_span);
        let message = if span.is_known() {
            format!("{err} near line {}, column {}", span.line, span.column)
        } else {
            err.to_string()
        };
        tracing::warn!(line = span.line, column = span.column, error = %err, "statement failed");
        self.config.output.report_error(&message);
    }
}
