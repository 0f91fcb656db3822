//! Tessa values - the tagged runtime value and its building blocks.
//!
//! [`Value`] unifies every runtime variant (scalars, matrices, complex
//! values, strings, ranges, structs, and the two indexing markers) behind
//! one copy-on-write handle:
//! - cloning a `Value` aliases its representation (count + 1)
//! - mutating a `Value` clones the representation first if it is shared
//! - the last handle to go releases the payload
//!
//! Errors use [`ValueError`], built through the factory functions in
//! [`errors`].

mod complex;
pub mod errors;
mod format;
mod index;
mod map;
mod matrix;
mod range;
mod shared;
mod value;

pub use complex::Complex;
pub use errors::{ValueError, ValueErrorKind, ValueResult};
pub use index::{index_list, IndexArg, IndexList};
pub use map::ValueMap;
pub use matrix::{checked_numel, CharMatrix, Matrix, MatrixType, MAX_NUMEL};
pub use range::RangeValue;
pub use shared::{Shared, WeakShared};
pub use value::{Payload, TypeTag, Value, ValueRep, WeakValue};
