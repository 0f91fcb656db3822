//! Index arguments for `do_index` and indexed assignment.
//!
//! An index argument is built from a value: the magic colon selects a
//! whole dimension, numeric values give one-based positions, and a 0/1
//! vector containing at least one zero acts as a mask.

use smallvec::SmallVec;

use crate::errors::{index_out_of_bounds, invalid_index, wrong_type_argument};
use crate::{Value, ValueResult};

/// One index argument, already validated. Positions are zero-based.
#[derive(Clone, Debug, PartialEq)]
pub enum IndexArg {
    /// Every element along the dimension.
    Colon,
    /// Explicit positions, with the shape of the value they came from.
    Positions {
        positions: Vec<usize>,
        rows: usize,
        cols: usize,
    },
    /// Select positions whose flag is set.
    Mask(Vec<bool>),
}

/// Argument list of one index operation. One or two entries in practice.
pub type IndexList = SmallVec<[IndexArg; 2]>;

impl IndexArg {
    /// Single zero-based position.
    pub fn position(position: usize) -> Self {
        IndexArg::Positions {
            positions: vec![position],
            rows: 1,
            cols: 1,
        }
    }

    pub fn from_value(value: &Value) -> ValueResult<IndexArg> {
        if value.is_magic_colon() {
            return Ok(IndexArg::Colon);
        }
        if value.is_complex_type() {
            return Err(invalid_index("subscript indices must be real"));
        }
        if !value.is_real_type() || value.is_string() || value.is_char_matrix() {
            return Err(wrong_type_argument("index", value.type_as_string()));
        }
        let matrix = value.matrix_value(false)?;
        let elements = matrix.elements();

        if let Some(bad) = elements.iter().find(|x| x.fract() != 0.0 || x.is_nan()) {
            return Err(invalid_index(&format!(
                "subscript indices must be either positive integers or logicals ({})",
                crate::format::number(*bad)
            )));
        }

        let zero_one = elements.iter().all(|&x| x == 0.0 || x == 1.0);
        if zero_one && elements.contains(&0.0) && elements.len() > 1 {
            return Ok(IndexArg::Mask(elements.iter().map(|&x| x == 1.0).collect()));
        }

        if let Some(bad) = elements.iter().find(|&&x| x < 1.0) {
            return Err(invalid_index(&format!(
                "index ({}): subscripts must be positive integers",
                crate::format::number(*bad)
            )));
        }

        Ok(IndexArg::Positions {
            positions: elements.iter().map(|&x| x as usize - 1).collect(),
            rows: matrix.rows(),
            cols: matrix.cols(),
        })
    }

    pub fn is_colon(&self) -> bool {
        matches!(self, IndexArg::Colon)
    }

    /// Shape of the index value, for linear indexing of a matrix.
    pub fn shape(&self) -> Option<(usize, usize)> {
        match self {
            IndexArg::Positions { rows, cols, .. } => Some((*rows, *cols)),
            IndexArg::Colon | IndexArg::Mask(_) => None,
        }
    }

    /// Positions for a read along a dimension of length `extent`.
    pub fn resolve(&self, extent: usize) -> ValueResult<Vec<usize>> {
        let positions = self.resolve_unchecked(extent);
        if let Some(&bad) = positions.iter().find(|&&p| p >= extent) {
            return Err(index_out_of_bounds(bad + 1, extent));
        }
        Ok(positions)
    }

    /// Positions for a write. May exceed `extent`; the caller grows the
    /// target.
    pub fn resolve_for_assign(&self, extent: usize) -> Vec<usize> {
        self.resolve_unchecked(extent)
    }

    fn resolve_unchecked(&self, extent: usize) -> Vec<usize> {
        match self {
            IndexArg::Colon => (0..extent).collect(),
            IndexArg::Positions { positions, .. } => positions.clone(),
            IndexArg::Mask(mask) => mask
                .iter()
                .enumerate()
                .filter_map(|(i, &set)| set.then_some(i))
                .collect(),
        }
    }
}

/// Convert a list of index values.
pub fn index_list(args: &[Value]) -> ValueResult<IndexList> {
    args.iter().map(IndexArg::from_value).collect()
}
