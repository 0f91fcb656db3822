//! Indexing, indexed assignment, and struct field access.
//!
//! Reads (`do_index`) never modify the receiver. Writes (`assign`,
//! `assign_at`, field assignment) take `&mut self` and go through the
//! copy-on-write path, so other handles aliasing the same representation
//! are unaffected. A write validates its arguments before touching any
//! element; on error the receiver's contents are unchanged.

use crate::errors::{dimension_too_large, invalid_index, undefined_value, wrong_type_argument};
use crate::index::{index_list, IndexArg, IndexList};
use crate::{checked_numel, Matrix, ValueError, ValueMap, ValueResult};

use super::{Payload, Value};

impl Value {
    /// Select elements. One argument indexes linearly in column-major
    /// order; two arguments select rows and columns. No arguments return
    /// the value itself.
    pub fn do_index(&self, args: &[Value]) -> ValueResult<Value> {
        if args.is_empty() {
            return Ok(self.clone());
        }
        let list = index_list(args)?;
        self.index_with(&list)
    }

    /// Select elements with an already converted argument list.
    pub fn index_with(&self, list: &[IndexArg]) -> ValueResult<Value> {
        if list.is_empty() {
            return Ok(self.clone());
        }
        let mut result = match self.payload() {
            Payload::Undefined => return Err(undefined_value("index")),
            Payload::Map(_) | Payload::MagicColon | Payload::AllVaArgs => {
                return Err(wrong_type_argument("index", self.type_as_string()))
            }
            Payload::RealScalar(x) => Value::matrix(index_matrix(&Matrix::filled(1, 1, *x), list)?),
            Payload::RealMatrix(m) => Value::matrix(index_matrix(m, list)?),
            Payload::Range(r) => Value::matrix(index_matrix(&r.matrix_value(), list)?),
            Payload::ComplexScalar(z) => {
                Value::complex_matrix(index_matrix(&Matrix::filled(1, 1, *z), list)?)
            }
            Payload::ComplexMatrix(m) => Value::complex_matrix(index_matrix(m, list)?),
            Payload::CharMatrix(m) => return Ok(Value::char_matrix(index_matrix(m, list)?)),
            Payload::String(m) => {
                return Ok(Value::from_payload(Payload::String(index_matrix(m, list)?)))
            }
        };
        result.maybe_mutate();
        Ok(result)
    }

    /// Record an index for a following [`Value::assign`].
    pub fn set_index(&mut self, args: &[Value]) -> ValueResult<()> {
        self.pending_index = Some(index_list(args)?);
        Ok(())
    }

    pub fn clear_index(&mut self) {
        self.pending_index = None;
    }

    pub fn pending_index(&self) -> Option<&IndexList> {
        self.pending_index.as_ref()
    }

    /// Store `rhs`. With a pending index (see [`Value::set_index`]) only the
    /// indexed elements are written and the index is consumed; otherwise
    /// the whole value is replaced.
    pub fn assign(&mut self, rhs: &Value) -> ValueResult<()> {
        match self.pending_index.take() {
            Some(list) => self.assign_with(&list, rhs),
            None => {
                if rhs.is_undefined() {
                    return Err(undefined_value("assignment"));
                }
                *self = rhs.clone();
                Ok(())
            }
        }
    }

    /// `self(args) = rhs`.
    pub fn assign_at(&mut self, args: &[Value], rhs: &Value) -> ValueResult<()> {
        let list = index_list(args)?;
        self.assign_with(&list, rhs)
    }

    /// `self(list) = rhs` with an already converted argument list.
    ///
    /// Writing past the end grows vectors and matrices (new positions are
    /// zero, or NUL for characters). Assigning a complex value widens a
    /// real target. Assigning a 0x0 matrix deletes the selected elements.
    pub fn assign_with(&mut self, list: &[IndexArg], rhs: &Value) -> ValueResult<()> {
        if rhs.is_undefined() {
            return Err(undefined_value("indexed assignment"));
        }
        if matches!(
            self.payload(),
            Payload::Map(_) | Payload::MagicColon | Payload::AllVaArgs
        ) {
            return Err(wrong_type_argument(
                "indexed assignment",
                self.type_as_string(),
            ));
        }
        if matches!(
            rhs.payload(),
            Payload::Map(_) | Payload::MagicColon | Payload::AllVaArgs
        ) {
            return Err(wrong_type_argument(
                "indexed assignment",
                rhs.type_as_string(),
            ));
        }
        if list.is_empty() {
            *self = rhs.clone();
            return Ok(());
        }
        if self.is_defined() && rhs.is_zero_by_zero() && rhs.is_real_matrix() {
            return self.delete_elements(list);
        }

        let self_text = self.is_string() || self.is_char_matrix();
        let rhs_text = rhs.is_string() || rhs.is_char_matrix();
        if rhs_text && (self_text || self.is_undefined()) {
            self.assign_chars(list, rhs)
        } else if self.is_complex_type() || rhs.is_complex_type() {
            self.assign_complex(list, rhs)
        } else {
            self.assign_real(list, rhs)
        }
    }

    fn assign_real(&mut self, list: &[IndexArg], rhs: &Value) -> ValueResult<()> {
        let src = rhs.matrix_value(true)?;
        if let Payload::RealMatrix(m) = self.payload() {
            check_assignment(m, list, &src)?;
            if let Payload::RealMatrix(m) = self.payload_mut() {
                write_elements(m, list, &src, 0.0);
            }
        } else {
            let mut m = if self.is_undefined() {
                Matrix::empty()
            } else {
                self.matrix_value(true)?
            };
            check_assignment(&m, list, &src)?;
            write_elements(&mut m, list, &src, 0.0);
            self.set_payload(Payload::RealMatrix(m));
        }
        self.maybe_mutate();
        Ok(())
    }

    fn assign_complex(&mut self, list: &[IndexArg], rhs: &Value) -> ValueResult<()> {
        let src = rhs.complex_matrix_value(true)?;
        if let Payload::ComplexMatrix(m) = self.payload() {
            check_assignment(m, list, &src)?;
            if let Payload::ComplexMatrix(m) = self.payload_mut() {
                write_elements(m, list, &src, crate::Complex::ZERO);
            }
        } else {
            let mut m = if self.is_undefined() {
                Matrix::empty()
            } else {
                self.complex_matrix_value(true)?
            };
            check_assignment(&m, list, &src)?;
            write_elements(&mut m, list, &src, crate::Complex::ZERO);
            self.set_payload(Payload::ComplexMatrix(m));
        }
        self.maybe_mutate();
        Ok(())
    }

    fn assign_chars(&mut self, list: &[IndexArg], rhs: &Value) -> ValueResult<()> {
        let src = rhs.char_matrix_value(false)?;
        let keep_string = self.is_string() || (self.is_undefined() && rhs.is_string());
        let mut m = if self.is_undefined() {
            Matrix::empty()
        } else {
            self.char_matrix_value(false)?
        };
        check_assignment(&m, list, &src)?;
        write_elements(&mut m, list, &src, '\0');
        self.set_payload(if keep_string {
            Payload::String(m)
        } else {
            Payload::CharMatrix(m)
        });
        Ok(())
    }

    fn delete_elements(&mut self, list: &[IndexArg]) -> ValueResult<()> {
        let payload = match self.payload() {
            Payload::RealScalar(_) | Payload::RealMatrix(_) | Payload::Range(_) => {
                Payload::RealMatrix(delete_from(&self.matrix_value(false)?, list)?)
            }
            Payload::ComplexScalar(_) | Payload::ComplexMatrix(_) => {
                Payload::ComplexMatrix(delete_from(&self.complex_matrix_value(false)?, list)?)
            }
            Payload::CharMatrix(m) => Payload::CharMatrix(delete_from(m, list)?),
            Payload::String(m) => Payload::String(delete_from(m, list)?),
            Payload::Undefined | Payload::Map(_) | Payload::MagicColon | Payload::AllVaArgs => {
                return Err(wrong_type_argument("delete elements", self.type_as_string()))
            }
        };
        self.set_payload(payload);
        Ok(())
    }

    // Struct fields

    /// Field `name` of a struct value.
    ///
    /// A missing field is `Ok(None)` when `silent`, an error otherwise.
    pub fn lookup_map_element(&self, name: &str, silent: bool) -> ValueResult<Option<Value>> {
        let Payload::Map(map) = self.payload() else {
            return Err(wrong_type_argument(
                "structure field access",
                self.type_as_string(),
            ));
        };
        match map.get(name) {
            Some(v) => Ok(Some(v.clone())),
            None if silent => Ok(None),
            None => Err(ValueError::new(format!(
                "invalid use of undefined structure element '{name}'"
            ))),
        }
    }

    /// Mutable field `name`, inserting an undefined field if absent. An
    /// undefined receiver becomes an empty struct first.
    pub fn lookup_map_element_mut(&mut self, name: &str) -> ValueResult<&mut Value> {
        if self.is_undefined() {
            self.set_payload(Payload::Map(ValueMap::new()));
        }
        let type_name = self.type_as_string();
        match self.payload_mut() {
            Payload::Map(map) => Ok(map.entry(name)),
            _ => Err(wrong_type_argument("structure field access", type_name)),
        }
    }

    /// `self.a.b.c = rhs` for `path = ["a", "b", "c"]`.
    pub fn assign_map_element(&mut self, path: &[&str], rhs: Value) -> ValueResult<()> {
        match path {
            [] => {
                *self = rhs;
                Ok(())
            }
            [field, rest @ ..] => self.lookup_map_element_mut(field)?.assign_map_element(rest, rhs),
        }
    }
}

/// Gather elements from `m`.
fn index_matrix<T: Clone>(m: &Matrix<T>, list: &[IndexArg]) -> ValueResult<Matrix<T>> {
    match list {
        [] => Ok(m.clone()),
        [arg] => {
            let positions = arg.resolve(m.numel())?;
            let n = positions.len();
            let data: Vec<T> = positions.iter().map(|&p| m.elements()[p].clone()).collect();
            let (rows, cols) = if arg.is_colon() {
                (n, 1)
            } else if m.numel() == 1 {
                arg.shape().unwrap_or((1, n))
            } else if m.rows() == 1 {
                (1, n)
            } else if m.cols() == 1 {
                (n, 1)
            } else {
                arg.shape().unwrap_or((n, 1))
            };
            Matrix::from_column_major(rows, cols, data)
                .ok_or_else(|| invalid_index("index shape does not match selection"))
        }
        [row_arg, col_arg] => {
            let rows = row_arg.resolve(m.rows())?;
            let cols = col_arg.resolve(m.cols())?;
            Ok(m.submatrix(&rows, &cols))
        }
        _ => Err(too_many_subscripts()),
    }
}

#[cold]
fn too_many_subscripts() -> ValueError {
    invalid_index("only one or two subscripts are supported")
}

/// Positions a write touches, per dimension, before any growth.
fn assignment_positions<T>(
    m: &Matrix<T>,
    list: &[IndexArg],
    src_dims: (usize, usize),
) -> ValueResult<(Vec<usize>, Vec<usize>)> {
    match list {
        [arg] => Ok((arg.resolve_for_assign(m.numel()), Vec::new())),
        [row_arg, col_arg] => {
            let rows = if row_arg.is_colon() && m.rows() == 0 {
                (0..src_dims.0).collect()
            } else {
                row_arg.resolve_for_assign(m.rows())
            };
            let cols = if col_arg.is_colon() && m.cols() == 0 {
                (0..src_dims.1).collect()
            } else {
                col_arg.resolve_for_assign(m.cols())
            };
            Ok((rows, cols))
        }
        [] => Err(invalid_index("missing subscripts")),
        _ => Err(too_many_subscripts()),
    }
}

/// Validate `m(list) = src` without modifying anything.
fn check_assignment<T>(m: &Matrix<T>, list: &[IndexArg], src: &Matrix<T>) -> ValueResult<()> {
    let (rows, cols) = assignment_positions(m, list, src.dims())?;
    let count = if list.len() == 1 {
        rows.len()
    } else {
        rows.len() * cols.len()
    };
    if src.numel() != 1 && src.numel() != count {
        return Err(crate::errors::dimension_mismatch(
            "=",
            (count, 1),
            src.dims(),
        ));
    }
    let (new_rows, new_cols) = if list.len() == 1 {
        let grows = rows.iter().any(|&p| p >= m.numel());
        if grows && !(m.is_vector() || m.dims() == (0, 0)) {
            return Err(invalid_index("A(I) = X: unable to resize A"));
        }
        let extent = rows.iter().max().map_or(0, |&p| p.saturating_add(1));
        (1, extent.max(m.numel()))
    } else {
        let extent = |positions: &[usize], current: usize| {
            positions
                .iter()
                .max()
                .map_or(0, |&p| p.saturating_add(1))
                .max(current)
        };
        (extent(&rows, m.rows()), extent(&cols, m.cols()))
    };
    if checked_numel(new_rows, new_cols).is_none() {
        return Err(dimension_too_large());
    }
    Ok(())
}

/// Perform a write already accepted by [`check_assignment`].
fn write_elements<T: Clone>(m: &mut Matrix<T>, list: &[IndexArg], src: &Matrix<T>, fill: T) {
    let Ok((rows, cols)) = assignment_positions(m, list, src.dims()) else {
        return;
    };
    let source = |k: usize| -> T {
        if src.numel() == 1 {
            src.elements()[0].clone()
        } else {
            src.elements()[k].clone()
        }
    };

    if list.len() == 1 {
        if let Some(&max) = rows.iter().max() {
            if max >= m.numel() {
                if m.cols() == 1 && m.rows() > 1 {
                    m.resize(max + 1, 1, fill);
                } else {
                    m.resize(1, max + 1, fill);
                }
            }
        }
        let elements = m.elements_mut();
        for (k, &p) in rows.iter().enumerate() {
            elements[p] = source(k);
        }
        return;
    }

    let new_rows = rows.iter().map(|&r| r + 1).max().unwrap_or(0).max(m.rows());
    let new_cols = cols.iter().map(|&c| c + 1).max().unwrap_or(0).max(m.cols());
    m.resize(new_rows, new_cols, fill);
    let stride = m.rows();
    let elements = m.elements_mut();
    for (j, &c) in cols.iter().enumerate() {
        for (i, &r) in rows.iter().enumerate() {
            elements[c * stride + r] = source(j * rows.len() + i);
        }
    }
}

/// `m(list) = []`.
fn delete_from<T: Clone>(m: &Matrix<T>, list: &[IndexArg]) -> ValueResult<Matrix<T>> {
    match list {
        [arg] => {
            if arg.is_colon() {
                return Ok(Matrix::empty());
            }
            let doomed = arg.resolve(m.numel())?;
            let kept: Vec<T> = m
                .elements()
                .iter()
                .enumerate()
                .filter(|(i, _)| !doomed.contains(i))
                .map(|(_, x)| x.clone())
                .collect();
            Ok(if m.cols() == 1 && m.rows() > 1 {
                Matrix::column_vector(kept)
            } else {
                Matrix::row_vector(kept)
            })
        }
        [row_arg, col_arg] => {
            let all_rows = row_arg.is_colon() || row_arg.resolve(m.rows())?.len() == m.rows();
            let all_cols = col_arg.is_colon() || col_arg.resolve(m.cols())?.len() == m.cols();
            if all_rows {
                let doomed = col_arg.resolve(m.cols())?;
                let keep: Vec<usize> = (0..m.cols()).filter(|c| !doomed.contains(c)).collect();
                let rows: Vec<usize> = (0..m.rows()).collect();
                Ok(m.submatrix(&rows, &keep))
            } else if all_cols {
                let doomed = row_arg.resolve(m.rows())?;
                let keep: Vec<usize> = (0..m.rows()).filter(|r| !doomed.contains(r)).collect();
                let cols: Vec<usize> = (0..m.cols()).collect();
                Ok(m.submatrix(&keep, &cols))
            } else {
                Err(invalid_index(
                    "a null assignment can only have one non-colon index",
                ))
            }
        }
        [] => Err(invalid_index("missing subscripts")),
        _ => Err(too_many_subscripts()),
    }
}
