//! Evaluator configuration.
//!
//! Everything that steers evaluation is carried by an [`EvalConfig`]
//! handed to [`TreeEvaluator::new`](crate::TreeEvaluator::new). There is
//! no process-wide settings store.

#![expect(
    clippy::disallowed_types,
    reason = "the interrupt flag is raised from other threads"
)]

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::output::{stdout_output, SharedOutput};

/// Request to stop before the next statement.
///
/// Clones share the flag, so a front end can keep one clone and raise it
/// from another thread while the evaluator runs.
#[derive(Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for InterruptFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InterruptFlag({})", self.is_raised())
    }
}

/// Evaluation policy.
#[derive(Clone)]
pub struct EvalConfig {
    /// Echo results of statements not ended by `;`.
    pub print_results: bool,
    /// Rewrite statement lists to use fused nodes before running them.
    /// Fused nodes already in a tree are evaluated either way.
    pub compound_fusion: bool,
    /// Stop the run at the first failing statement.
    pub abort_on_error: bool,
    pub interrupt: InterruptFlag,
    pub output: SharedOutput,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            print_results: true,
            compound_fusion: true,
            abort_on_error: false,
            interrupt: InterruptFlag::new(),
            output: stdout_output(),
        }
    }
}

impl EvalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn print_results(mut self, on: bool) -> Self {
        self.print_results = on;
        self
    }

    #[must_use]
    pub fn compound_fusion(mut self, on: bool) -> Self {
        self.compound_fusion = on;
        self
    }

    #[must_use]
    pub fn abort_on_error(mut self, on: bool) -> Self {
        self.abort_on_error = on;
        self
    }

    #[must_use]
    pub fn interrupt(mut self, flag: InterruptFlag) -> Self {
        self.interrupt = flag;
        self
    }

    #[must_use]
    pub fn output(mut self, output: SharedOutput) -> Self {
        self.output = output;
        self
    }
}

impl fmt::Debug for EvalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvalConfig")
            .field("print_results", &self.print_results)
            .field("compound_fusion", &self.compound_fusion)
            .field("abort_on_error", &self.abort_on_error)
            .field("interrupt", &self.interrupt)
            .finish_non_exhaustive()
    }
}
