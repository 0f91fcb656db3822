//! Source positions.
//!
//! The lexer counts lines and columns from 1. A position that the parser
//! did not record (generated nodes, values built by library code) is
//! [`Span::UNKNOWN`] and is omitted from diagnostics.

use std::fmt;

/// Line/column position of a parse-tree node or constant.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    /// Position of generated code.
    pub const UNKNOWN: Span = Span { line: 0, column: 0 };

    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Span { line, column }
    }

    /// Build a span from the optional position pair the constructors accept.
    #[inline]
    pub fn from_parts(line: Option<u32>, column: Option<u32>) -> Self {
        Span {
            line: line.unwrap_or(0),
            column: column.unwrap_or(0),
        }
    }

    /// True when the parser supplied a real position.
    #[inline]
    pub const fn is_known(self) -> bool {
        self.line != 0
    }

    /// Keep `self` if known, otherwise fall back to `other`.
    #[inline]
    #[must_use]
    pub const fn or(self, other: Span) -> Span {
        if self.is_known() {
            self
        } else {
            other
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "line {}, column {}", self.line, self.column)
        } else {
            write!(f, "unknown location")
        }
    }
}

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::Span;
    crate::static_assert_size!(Span, 8);
}
