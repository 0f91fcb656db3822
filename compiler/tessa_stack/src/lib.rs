//! Stack growth guard for recursive tree evaluation.
//!
//! Parse trees produced for long expressions (`a + b + c + ...` with
//! thousands of terms, or machine-generated code) are left-deep, and both
//! the evaluator and the walkers recurse once per level. Wrap each
//! recursive step in [`ensure_sufficient_stack`] so that the native stack
//! is extended on demand instead of overflowing.
//!
//! On `wasm32` the guard is a plain call.

/// Remaining stack below which a new segment is allocated (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment (2MB).
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
///
/// ```text
/// fn evaluate(&mut self, expr: &Expr) -> EvalResult {
///     ensure_sufficient_stack(|| self.evaluate_inner(expr))
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// Run `f` directly; the wasm runtime manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
