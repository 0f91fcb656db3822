//! Tessa IR - shared vocabulary for the parse tree.
//!
//! This crate is the leaf of the workspace. It holds the types that both
//! the value layer and the tree layer need to agree on:
//! - [`Span`] source positions (1-based line/column, as reported to users)
//! - [`BinaryOp`], [`UnaryOp`] and [`AssignOp`] operator codes
//! - [`CompoundBinaryOp`] and the fusion table that maps operator pairs
//!   onto fused operations
//!
//! Everything here is `Copy` and carries no runtime data.

/// Compile-time assertion that a type has a specific size.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod compound;
mod operators;
mod span;

pub use compound::{
    lookup_assignment_fusion, lookup_operand_fusion, CompoundBinaryOp, OperandFusion,
    UnsupportedFusion,
};
pub use operators::{AssignOp, BinaryOp, UnaryOp};
pub use span::Span;
