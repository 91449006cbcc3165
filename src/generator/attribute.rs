//! Optional per-point attribute arrays.

/// Values supplied per path point, or none at all.
///
/// An attribute only takes effect when it holds exactly one value per
/// point; any other length behaves as if nothing was supplied, so a caller
/// that resizes the path before its attributes never feeds stale data into
/// the mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct PerPointAttribute<T> {
    values: Vec<T>,
}

impl<T> Default for PerPointAttribute<T> {
    fn default() -> Self {
        Self { values: Vec::new() }
    }
}

impl<T> PerPointAttribute<T> {
    /// Wrap `values`; an empty vector means "not supplied".
    #[must_use]
    pub const fn new(values: Vec<T>) -> Self {
        Self { values }
    }

    /// Whether no values were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Stored values, whatever their length.
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Replace the stored values.
    pub fn set(&mut self, values: Vec<T>) {
        self.values = values;
    }

    /// Drop all values.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// The values, if there is exactly one per point.
    #[must_use]
    pub fn resolve(&self, point_count: usize) -> Option<&[T]> {
        (!self.values.is_empty() && self.values.len() == point_count)
            .then_some(self.values.as_slice())
    }

    /// Whether a non-empty array disagrees with `point_count`.
    #[must_use]
    pub fn is_mismatched(&self, point_count: usize) -> bool {
        !self.values.is_empty() && self.values.len() != point_count
    }
}
