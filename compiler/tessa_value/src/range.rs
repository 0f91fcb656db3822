//! Lazy arithmetic ranges (`base:increment:limit`).

use crate::matrix::MAX_NUMEL;
use crate::Matrix;

/// Range descriptor. Elements are `base + i * increment` for
/// `i in 0..numel()`; the limit is only reached if it lies on the grid.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct RangeValue {
    pub base: f64,
    pub limit: f64,
    pub increment: f64,
}

impl RangeValue {
    pub const fn new(base: f64, limit: f64, increment: f64) -> Self {
        RangeValue {
            base,
            limit,
            increment,
        }
    }

    /// Number of elements. Zero when the increment is zero or points away
    /// from the limit, or when any component is NaN. Saturates at
    /// [`MAX_NUMEL`]; use [`RangeValue::checked_numel`] to detect that.
    pub fn numel(&self) -> usize {
        self.checked_numel().unwrap_or(MAX_NUMEL)
    }

    /// Number of elements, or `None` when there would be more than
    /// [`MAX_NUMEL`].
    pub fn checked_numel(&self) -> Option<usize> {
        let count = self.count();
        (count <= MAX_NUMEL as f64).then_some(count as usize)
    }

    /// Element count as a float, so huge spans cannot overflow.
    fn count(&self) -> f64 {
        let span = self.limit - self.base;
        if self.increment == 0.0 || !span.is_finite() || !self.increment.is_finite() {
            return 0.0;
        }
        let steps = span / self.increment;
        if steps < 0.0 || steps.is_nan() {
            return 0.0;
        }
        // A few ulps of slack so 0:0.1:1 has eleven elements.
        let tolerance = 3.0 * f64::EPSILON * steps.abs().max(1.0);
        (steps + tolerance).floor() + 1.0
    }

    pub fn is_empty(&self) -> bool {
        self.numel() == 0
    }

    /// Element `i` (zero-based), without bounds checking against `numel`.
    #[inline]
    pub fn element(&self, i: usize) -> f64 {
        self.base + i as f64 * self.increment
    }

    /// Last element actually produced, if any.
    pub fn final_value(&self) -> Option<f64> {
        self.numel().checked_sub(1).map(|last| self.element(last))
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.numel()).map(|i| self.element(i))
    }

    pub fn min(&self) -> Option<f64> {
        let last = self.final_value()?;
        Some(self.base.min(last))
    }

    pub fn max(&self) -> Option<f64> {
        let last = self.final_value()?;
        Some(self.base.max(last))
    }

    /// Materialize as a row vector.
    pub fn matrix_value(&self) -> Matrix<f64> {
        Matrix::row_vector(self.iter().collect())
    }

    /// Shift every element by `delta`.
    #[must_use]
    pub fn shifted(&self, delta: f64) -> Self {
        RangeValue::new(self.base + delta, self.limit + delta, self.increment)
    }

    #[must_use]
    pub fn negated(&self) -> Self {
        RangeValue::new(-self.base, -self.limit, -self.increment)
    }

    /// True when every element is nonzero.
    pub fn all_nonzero(&self) -> bool {
        self.iter().all(|x| x != 0.0)
    }
}
