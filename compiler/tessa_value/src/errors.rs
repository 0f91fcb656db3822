//! Error types for value operations and evaluation.
//!
//! `ValueErrorKind` carries the structured category; factory functions
//! (`wrong_type_argument()`, `nonconformant()`, ...) are the public way to
//! build errors and fill in both `kind` and `message`.
//!
//! Every error here is recoverable: the statement driver reports it and
//! moves on to the next statement. Broken reference-count bookkeeping is a
//! defect, not a `ValueError`.

use std::fmt;

use tessa_ir::{BinaryOp, Span};

use crate::Value;

/// Result of a value operation. Defaults to producing a [`Value`].
pub type ValueResult<T = Value> = Result<T, ValueError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueErrorKind {
    /// Variant mismatch during coercion or operator application.
    WrongTypeArgument {
        operation: String,
        type_name: String,
    },
    /// Shape incompatibility in a binary operation, indexing, or a call.
    DimensionMismatch {
        operation: String,
        left: (usize, usize),
        right: (usize, usize),
    },
    /// Operation applied to an undefined value.
    UndefinedValue {
        operation: String,
    },
    /// One-based index beyond the extent of the indexed dimension.
    IndexOutOfBounds {
        index: usize,
        extent: usize,
    },
    InvalidIndex {
        reason: String,
    },
    UndefinedVariable {
        name: String,
    },
    /// Builtin called with unusable arguments.
    InvalidCall {
        name: String,
        reason: String,
    },
    /// Failure reported by the numeric library.
    Backend {
        message: String,
    },
    Custom {
        message: String,
    },
}

impl fmt::Display for ValueErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongTypeArgument {
                operation,
                type_name,
            } => write!(f, "{operation}: wrong type argument '{type_name}'"),
            Self::DimensionMismatch {
                operation,
                left,
                right,
            } => write!(
                f,
                "{operation}: nonconformant arguments (op1 is {}x{}, op2 is {}x{})",
                left.0, left.1, right.0, right.1
            ),
            Self::UndefinedValue { operation } => {
                write!(f, "{operation}: value on right hand side is undefined")
            }
            Self::IndexOutOfBounds { index, extent } => {
                write!(f, "index ({index}): out of bound {extent}")
            }
            Self::InvalidIndex { reason } => write!(f, "invalid index: {reason}"),
            Self::UndefinedVariable { name } => write!(f, "'{name}' undefined"),
            Self::InvalidCall { name, reason } => write!(f, "{name}: {reason}"),
            Self::Backend { message } | Self::Custom { message } => write!(f, "{message}"),
        }
    }
}

/// Evaluation error with optional source position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueError {
    pub kind: ValueErrorKind,
    /// For factory-created errors this equals `kind.to_string()`.
    pub message: String,
    /// Where the failing expression starts, once the evaluator knows.
    pub span: Option<Span>,
}

impl ValueError {
    /// Create an error with just a message (`Custom` kind).
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: ValueErrorKind::Custom {
                message: message.clone(),
            },
            message,
            span: None,
        }
    }

    fn from_kind(kind: ValueErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            span: None,
        }
    }

    /// Attach a source span unless one is already recorded.
    ///
    /// The innermost expression wins, so outer nodes can call this freely
    /// while the error propagates.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        if self.span.is_none() && span.is_known() {
            self.span = Some(span);
        }
        self
    }

    pub fn is_wrong_type(&self) -> bool {
        matches!(self.kind, ValueErrorKind::WrongTypeArgument { .. })
    }

    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(self.kind, ValueErrorKind::DimensionMismatch { .. })
    }
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValueError {}

// Type errors

/// No coercion path exists from the value's variant for `operation`.
#[cold]
pub fn wrong_type_argument(operation: &str, type_name: &str) -> ValueError {
    ValueError::from_kind(ValueErrorKind::WrongTypeArgument {
        operation: operation.to_string(),
        type_name: type_name.to_string(),
    })
}

/// Binary operator not defined for the operand variants.
#[cold]
pub fn binary_op_not_implemented(op: BinaryOp, left: &str, right: &str) -> ValueError {
    ValueError::from_kind(ValueErrorKind::WrongTypeArgument {
        operation: format!("binary operator '{}'", op.as_symbol()),
        type_name: format!("{left}' by '{right}"),
    })
}

#[cold]
pub fn undefined_value(operation: &str) -> ValueError {
    ValueError::from_kind(ValueErrorKind::UndefinedValue {
        operation: operation.to_string(),
    })
}

// Shape errors

#[cold]
pub fn dimension_mismatch(
    operation: &str,
    left: (usize, usize),
    right: (usize, usize),
) -> ValueError {
    ValueError::from_kind(ValueErrorKind::DimensionMismatch {
        operation: operation.to_string(),
        left,
        right,
    })
}

/// Operand shapes incompatible for a binary operator.
#[cold]
pub fn nonconformant(op: BinaryOp, left: (usize, usize), right: (usize, usize)) -> ValueError {
    dimension_mismatch(&format!("operator {}", op.as_symbol()), left, right)
}

// Index errors

/// `index` is one-based, as the user wrote it.
#[cold]
pub fn index_out_of_bounds(index: usize, extent: usize) -> ValueError {
    ValueError::from_kind(ValueErrorKind::IndexOutOfBounds { index, extent })
}

#[cold]
pub fn invalid_index(reason: &str) -> ValueError {
    ValueError::from_kind(ValueErrorKind::InvalidIndex {
        reason: reason.to_string(),
    })
}

/// A matrix or range would exceed [`crate::MAX_NUMEL`] elements.
#[cold]
pub fn dimension_too_large() -> ValueError {
    ValueError::new("out of memory or dimension too large")
}

// Evaluation errors

#[cold]
pub fn undefined_variable(name: &str) -> ValueError {
    ValueError::from_kind(ValueErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

#[cold]
pub fn invalid_call(name: &str, reason: &str) -> ValueError {
    ValueError::from_kind(ValueErrorKind::InvalidCall {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}

#[cold]
pub fn backend_failure(message: &str) -> ValueError {
    ValueError::from_kind(ValueErrorKind::Backend {
        message: message.to_string(),
    })
}
