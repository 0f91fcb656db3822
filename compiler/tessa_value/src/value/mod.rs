//! The tagged runtime value.
//!
//! A [`Value`] is a handle onto a shared representation record. Cloning a
//! value aliases the record; every mutating method goes through
//! [`Shared::make_mut`] so a shared record is cloned before it is written.
//!
//! The payload is a sum type, so exactly one representation is live at a
//! time and the type tag is derived from it. Classification predicates
//! (`is_real_type`, `is_numeric_type`, ...) look only at the tag.

mod convert;
mod extract;
mod indexing;
mod print;


use std::fmt;

use tessa_ir::Span;

use crate::errors::{dimension_too_large, wrong_type_argument};
use crate::shared::{Shared, WeakShared};
use crate::{CharMatrix, Complex, IndexList, Matrix, RangeValue, ValueMap, ValueResult};

/// The closed set of value variants.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeTag {
    Undefined,
    RealScalar,
    RealMatrix,
    ComplexScalar,
    ComplexMatrix,
    CharMatrix,
    String,
    Range,
    Map,
    MagicColon,
    AllVaArgs,
}

impl TypeTag {
    /// User-facing type name, as used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::RealScalar => "real scalar",
            Self::RealMatrix => "real matrix",
            Self::ComplexScalar => "complex scalar",
            Self::ComplexMatrix => "complex matrix",
            Self::CharMatrix => "char matrix",
            Self::String => "string",
            Self::Range => "range",
            Self::Map => "struct",
            Self::MagicColon => "magic colon",
            Self::AllVaArgs => "va_arg",
        }
    }

    pub const fn is_real(self) -> bool {
        matches!(
            self,
            Self::RealScalar | Self::RealMatrix | Self::Range | Self::CharMatrix | Self::String
        )
    }

    pub const fn is_complex(self) -> bool {
        matches!(self, Self::ComplexScalar | Self::ComplexMatrix)
    }

    pub const fn is_scalar(self) -> bool {
        matches!(self, Self::RealScalar | Self::ComplexScalar)
    }

    pub const fn is_matrix(self) -> bool {
        matches!(self, Self::RealMatrix | Self::ComplexMatrix)
    }

    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::RealScalar | Self::RealMatrix | Self::ComplexScalar | Self::ComplexMatrix
        )
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Active representation of a value.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Undefined,
    RealScalar(f64),
    RealMatrix(Matrix<f64>),
    ComplexScalar(Complex),
    ComplexMatrix(Matrix<Complex>),
    CharMatrix(CharMatrix),
    /// Character matrix created from string syntax.
    String(CharMatrix),
    Range(RangeValue),
    Map(ValueMap),
    MagicColon,
    AllVaArgs,
}

impl Payload {
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Payload::Undefined => TypeTag::Undefined,
            Payload::RealScalar(_) => TypeTag::RealScalar,
            Payload::RealMatrix(_) => TypeTag::RealMatrix,
            Payload::ComplexScalar(_) => TypeTag::ComplexScalar,
            Payload::ComplexMatrix(_) => TypeTag::ComplexMatrix,
            Payload::CharMatrix(_) => TypeTag::CharMatrix,
            Payload::String(_) => TypeTag::String,
            Payload::Range(_) => TypeTag::Range,
            Payload::Map(_) => TypeTag::Map,
            Payload::MagicColon => TypeTag::MagicColon,
            Payload::AllVaArgs => TypeTag::AllVaArgs,
        }
    }
}

/// Shared representation record.
#[derive(Clone, Debug)]
pub struct ValueRep {
    payload: Payload,
    /// Source text the value was written as, for the code printer.
    original_text: Option<String>,
    /// Where a literal appeared, for diagnostics.
    span: Span,
}

/// Copy-on-write handle to a tagged value.
#[derive(Clone)]
pub struct Value {
    rep: Shared<ValueRep>,
    /// Index recorded by `set_index`, consumed by `assign`. Per handle,
    /// never shared.
    pending_index: Option<IndexList>,
}

/// Weak observer of a value's representation.
#[derive(Clone, Debug)]
pub struct WeakValue(WeakShared<ValueRep>);

impl WeakValue {
    /// True while some handle still holds the representation.
    pub fn is_alive(&self) -> bool {
        self.0.is_alive()
    }

    pub fn upgrade(&self) -> Option<Value> {
        self.0.upgrade().map(|rep| Value {
            rep,
            pending_index: None,
        })
    }

    /// Handles currently aliasing the representation.
    pub fn ref_count(&self) -> usize {
        self.0.strong_count()
    }
}

// Construction

impl Value {
    fn from_payload(payload: Payload) -> Self {
        Value {
            rep: Shared::new(ValueRep {
                payload,
                original_text: None,
                span: Span::UNKNOWN,
            }),
            pending_index: None,
        }
    }

    pub fn undefined() -> Self {
        Self::from_payload(Payload::Undefined)
    }

    pub fn scalar(x: f64) -> Self {
        Self::from_payload(Payload::RealScalar(x))
    }

    /// Scalar literal with its source position.
    pub fn scalar_at(x: f64, line: Option<u32>, column: Option<u32>) -> Self {
        let mut v = Self::scalar(x);
        v.rep.make_mut().span = Span::from_parts(line, column);
        v
    }

    /// 1 for true, 0 for false.
    pub fn bool(b: bool) -> Self {
        Self::scalar(if b { 1.0 } else { 0.0 })
    }

    pub fn matrix(m: Matrix<f64>) -> Self {
        Self::from_payload(Payload::RealMatrix(m))
    }

    pub fn complex(z: Complex) -> Self {
        Self::from_payload(Payload::ComplexScalar(z))
    }

    pub fn complex_at(z: Complex, line: Option<u32>, column: Option<u32>) -> Self {
        let mut v = Self::complex(z);
        v.rep.make_mut().span = Span::from_parts(line, column);
        v
    }

    pub fn complex_matrix(m: Matrix<Complex>) -> Self {
        Self::from_payload(Payload::ComplexMatrix(m))
    }

    pub fn char_matrix(m: CharMatrix) -> Self {
        Self::from_payload(Payload::CharMatrix(m))
    }

    pub fn string(s: &str) -> Self {
        Self::from_payload(Payload::String(Matrix::row_vector(s.chars().collect())))
    }

    /// Multi-row string, one row per entry, blank padded.
    pub fn string_vector(rows: &[&str]) -> Self {
        Self::from_payload(Payload::String(Matrix::from_strings(rows)))
    }

    /// `base:increment:limit`. Fails when the range would have more than
    /// [`crate::MAX_NUMEL`] elements.
    pub fn range(base: f64, limit: f64, increment: f64) -> ValueResult<Self> {
        let r = RangeValue::new(base, limit, increment);
        if r.checked_numel().is_none() {
            return Err(dimension_too_large());
        }
        Ok(Self::from_payload(Payload::Range(r)))
    }

    /// Wrap a range descriptor as is. Its count saturates at
    /// [`crate::MAX_NUMEL`].
    pub fn from_range(r: RangeValue) -> Self {
        Self::from_payload(Payload::Range(r))
    }

    pub fn map(m: ValueMap) -> Self {
        Self::from_payload(Payload::Map(m))
    }

    pub fn magic_colon() -> Self {
        Self::from_payload(Payload::MagicColon)
    }

    pub fn all_va_args() -> Self {
        Self::from_payload(Payload::AllVaArgs)
    }

    pub fn row_vector(elements: Vec<f64>) -> Self {
        Self::matrix(Matrix::row_vector(elements))
    }

    pub fn column_vector(elements: Vec<f64>) -> Self {
        Self::matrix(Matrix::column_vector(elements))
    }

    pub fn complex_row_vector(elements: Vec<Complex>) -> Self {
        Self::complex_matrix(Matrix::row_vector(elements))
    }

    /// Square diagonal matrix.
    pub fn diagonal(diag: &[f64]) -> Self {
        Self::matrix(Matrix::diagonal(diag))
    }

    /// 0x0 real matrix.
    pub fn empty_matrix() -> Self {
        Self::matrix(Matrix::empty())
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::undefined()
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::scalar(x)
    }
}

impl From<Complex> for Value {
    fn from(z: Complex) -> Self {
        Value::complex(z)
    }
}

impl From<Matrix<f64>> for Value {
    fn from(m: Matrix<f64>) -> Self {
        Value::matrix(m)
    }
}

impl From<Matrix<Complex>> for Value {
    fn from(m: Matrix<Complex>) -> Self {
        Value::complex_matrix(m)
    }
}

impl From<RangeValue> for Value {
    fn from(r: RangeValue) -> Self {
        Value::from_range(r)
    }
}

impl From<ValueMap> for Value {
    fn from(m: ValueMap) -> Self {
        Value::map(m)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

// Sharing

impl Value {
    /// Handles aliasing this value's representation.
    pub fn ref_count(&self) -> usize {
        self.rep.ref_count()
    }

    /// True if both handles alias the same representation.
    pub fn shares_rep_with(&self, other: &Value) -> bool {
        self.rep.ptr_eq(&other.rep)
    }

    pub fn downgrade(&self) -> WeakValue {
        WeakValue(self.rep.downgrade())
    }

    #[inline]
    pub fn payload(&self) -> &Payload {
        &self.rep.payload
    }

    /// Mutable payload access, cloning a shared representation first.
    /// The stashed source text no longer describes the value afterwards
    /// and is dropped.
    #[inline]
    pub(crate) fn payload_mut(&mut self) -> &mut Payload {
        let rep = self.rep.make_mut();
        rep.original_text = None;
        &mut rep.payload
    }

    /// In-place access to a real matrix payload.
    ///
    /// `None` (without unsharing anything) for every other variant.
    /// Writing through the returned matrix clears its cached shape kind.
    pub fn real_matrix_mut(&mut self) -> Option<&mut Matrix<f64>> {
        if !self.is_real_matrix() {
            return None;
        }
        match self.payload_mut() {
            Payload::RealMatrix(m) => Some(m),
            _ => None,
        }
    }

    /// In-place access to a complex matrix payload; see
    /// [`Value::real_matrix_mut`].
    pub fn complex_matrix_mut(&mut self) -> Option<&mut Matrix<Complex>> {
        if !self.is_complex_matrix() {
            return None;
        }
        match self.payload_mut() {
            Payload::ComplexMatrix(m) => Some(m),
            _ => None,
        }
    }

    /// Replace the payload, keeping source text and position.
    pub(crate) fn set_payload(&mut self, payload: Payload) {
        *self.payload_mut() = payload;
    }

    pub fn span(&self) -> Span {
        self.rep.span
    }

    pub fn original_text(&self) -> Option<&str> {
        self.rep.original_text.as_deref()
    }

    /// Remember the source text the value was written as.
    pub fn stash_original_text(&mut self, text: impl Into<String>) {
        self.rep.make_mut().original_text = Some(text.into());
    }
}

// Classification

impl Value {
    #[inline]
    pub fn type_tag(&self) -> TypeTag {
        self.rep.payload.type_tag()
    }

    pub fn type_as_string(&self) -> &'static str {
        self.type_tag().name()
    }

    pub fn is_defined(&self) -> bool {
        self.type_tag() != TypeTag::Undefined
    }

    pub fn is_undefined(&self) -> bool {
        self.type_tag() == TypeTag::Undefined
    }

    pub fn is_real_type(&self) -> bool {
        self.type_tag().is_real()
    }

    pub fn is_complex_type(&self) -> bool {
        self.type_tag().is_complex()
    }

    pub fn is_scalar_type(&self) -> bool {
        self.type_tag().is_scalar()
    }

    pub fn is_matrix_type(&self) -> bool {
        self.type_tag().is_matrix()
    }

    pub fn is_numeric_type(&self) -> bool {
        self.type_tag().is_numeric()
    }

    pub fn is_real_scalar(&self) -> bool {
        self.type_tag() == TypeTag::RealScalar
    }

    pub fn is_real_matrix(&self) -> bool {
        self.type_tag() == TypeTag::RealMatrix
    }

    pub fn is_complex_scalar(&self) -> bool {
        self.type_tag() == TypeTag::ComplexScalar
    }

    pub fn is_complex_matrix(&self) -> bool {
        self.type_tag() == TypeTag::ComplexMatrix
    }

    pub fn is_char_matrix(&self) -> bool {
        self.type_tag() == TypeTag::CharMatrix
    }

    pub fn is_string(&self) -> bool {
        self.type_tag() == TypeTag::String
    }

    pub fn is_range(&self) -> bool {
        self.type_tag() == TypeTag::Range
    }

    pub fn is_map(&self) -> bool {
        self.type_tag() == TypeTag::Map
    }

    pub fn is_magic_colon(&self) -> bool {
        self.type_tag() == TypeTag::MagicColon
    }

    pub fn is_all_va_args(&self) -> bool {
        self.type_tag() == TypeTag::AllVaArgs
    }

    /// Zero rows or zero columns. Never true for the two markers or for
    /// an undefined value.
    pub fn is_empty(&self) -> bool {
        match self.type_tag() {
            TypeTag::Undefined | TypeTag::MagicColon | TypeTag::AllVaArgs => false,
            _ => self.rows() == 0 || self.columns() == 0,
        }
    }

    pub fn is_zero_by_zero(&self) -> bool {
        self.dims() == (0, 0) && !matches!(
            self.type_tag(),
            TypeTag::Undefined | TypeTag::MagicColon | TypeTag::AllVaArgs
        )
    }

    pub fn rows(&self) -> usize {
        self.dims().0
    }

    pub fn columns(&self) -> usize {
        self.dims().1
    }

    /// Row and column counts. Scalars and maps are 1x1; markers and
    /// undefined values are 0x0.
    pub fn dims(&self) -> (usize, usize) {
        match self.payload() {
            Payload::RealScalar(_) | Payload::ComplexScalar(_) | Payload::Map(_) => (1, 1),
            Payload::RealMatrix(m) => m.dims(),
            Payload::ComplexMatrix(m) => m.dims(),
            Payload::CharMatrix(m) | Payload::String(m) => m.dims(),
            Payload::Range(r) => (1, r.numel()),
            Payload::Undefined | Payload::MagicColon | Payload::AllVaArgs => (0, 0),
        }
    }

    pub fn numel(&self) -> usize {
        let (r, c) = self.dims();
        r * c
    }

    /// Truth value for conditions and short-circuit operators.
    ///
    /// Scalars are true when nonzero. Matrices, ranges and strings are
    /// true when non-empty and every element is nonzero. A complex element
    /// is nonzero when either part is.
    pub fn is_true(&self) -> ValueResult<bool> {
        match self.payload() {
            Payload::RealScalar(x) => Ok(*x != 0.0),
            Payload::ComplexScalar(z) => Ok(!z.is_zero()),
            Payload::RealMatrix(m) => Ok(!m.is_empty() && m.elements().iter().all(|&x| x != 0.0)),
            Payload::ComplexMatrix(m) => Ok(!m.is_empty() && m.elements().iter().all(|z| !z.is_zero())),
            Payload::CharMatrix(m) | Payload::String(m) => {
                Ok(!m.is_empty() && m.elements().iter().all(|&ch| ch != '\0'))
            }
            Payload::Range(r) => Ok(!r.is_empty() && r.all_nonzero()),
            Payload::Undefined | Payload::Map(_) | Payload::MagicColon | Payload::AllVaArgs => {
                Err(wrong_type_argument("is_true", self.type_as_string()))
            }
        }
    }

    /// A real scalar equal to one (or a one-element range starting at one).
    pub fn valid_as_scalar_index(&self) -> bool {
        match self.payload() {
            Payload::RealScalar(x) => x.round() == 1.0,
            Payload::Range(r) => r.numel() == 1 && r.base.round() == 1.0,
            _ => false,
        }
    }

    /// A zero scalar, an empty 0x0 matrix, or an empty range.
    pub fn valid_as_zero_index(&self) -> bool {
        match self.payload() {
            Payload::RealScalar(x) => x.round() == 0.0,
            Payload::RealMatrix(m) => m.dims() == (0, 0),
            Payload::Range(r) => r.is_empty(),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    /// Payload equality. Source text, position and pending indices are
    /// not part of a value's identity.
    fn eq(&self, other: &Self) -> bool {
        self.shares_rep_with(other) || self.payload() == other.payload()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({:?}, refs = {})", self.payload(), self.ref_count())
    }
}
