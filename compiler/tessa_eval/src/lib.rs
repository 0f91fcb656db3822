//! Tessa evaluator.
//!
//! Runs parse trees from `tessa_tree` against a variable environment:
//! - [`TreeEvaluator`]: `evaluate` / `evaluate_n` on expressions and the
//!   statement driver `run`
//! - [`evaluate_binary`] / [`evaluate_unary`]: operator dispatch on values
//! - [`NumericBackend`]: the numeric library boundary (factorizations and
//!   linear solves); the evaluator validates and unpacks, the backend
//!   computes
//! - [`EvalConfig`]: evaluation policy, passed in at construction
//! - [`EventQueue`]: closures posted from other threads, drained on the
//!   evaluator's thread
//!
//! Errors are [`ValueError`]s. A statement that raises one is reported and
//! abandoned; the rest of the run continues.

mod builtins;
mod config;
mod environment;
mod evaluator;
mod numeric;
mod operators;
mod output;
mod task_queue;
mod unary_operators;

use std::sync::Once;

pub use builtins::Builtin;
pub use config::{EvalConfig, InterruptFlag};
pub use environment::Environment;
pub use evaluator::{RunSummary, TreeEvaluator};
pub use numeric::{
    is_numeric, is_permutation, permutation_from_matrix, permutation_matrix, BackendError, LuFactors,
    LuUpdateRequest, NumericBackend, NumericMatrix, Permutation, UnavailableBackend,
};
pub use operators::evaluate_binary;
pub use output::{buffer_output, stdout_output, OutputHandler, SharedOutput};
pub use task_queue::{EventQueue, EventSender, QueueClosed, Task};
pub use tessa_value::{Value, ValueError, ValueResult};
pub use unary_operators::evaluate_unary;

/// Result of evaluating an expression.
pub type EvalResult<T = Value> = Result<T, ValueError>;

static TRACING_INIT: Once = Once::new();

/// Install a tracing subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset, and nothing after the first call.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

#[cfg(test)]
mod tests;
