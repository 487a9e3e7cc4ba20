//! Strides type: element offsets for row-major tensor layout

use super::shape::STACK_DIMS;
use smallvec::SmallVec;
use std::fmt;
use std::ops::Deref;

/// Strides type: element offset between consecutive elements along each dimension
/// NOTE: Strides are in ELEMENTS, not bytes
#[derive(Clone, PartialEq, Eq, Default, Hash)]
pub struct Strides(SmallVec<[usize; STACK_DIMS]>);

impl Strides {
    /// Row-major strides for `shape`.
    ///
    /// The last dimension has stride 1 and every other stride is the product
    /// of the extents to its right:
    ///
    /// ```
    /// use jacobi::tensor::Strides;
    /// assert_eq!(Strides::row_major(&[2, 3, 4]).as_slice(), &[12, 4, 1]);
    /// ```
    pub fn row_major(shape: &[usize]) -> Self {
        let mut strides: SmallVec<[usize; STACK_DIMS]> = SmallVec::with_capacity(shape.len());
        let mut stride = 1usize;

        for &dim in shape.iter().rev() {
            strides.push(stride);
            stride *= dim;
        }

        strides.reverse();
        Self(strides)
    }

    /// View strides as a slice.
    pub fn as_slice(&self) -> &[usize] {
        self.0.as_slice()
    }

    /// Flat offset of `indices`: `sum(indices[k] * strides[k])`.
    ///
    /// No bounds check; see [`Layout::index`](super::Layout::index) for the
    /// checked form.
    #[inline]
    pub fn offset_of(&self, indices: &[usize]) -> usize {
        debug_assert_eq!(indices.len(), self.0.len());
        indices
            .iter()
            .zip(self.0.iter())
            .map(|(&i, &s)| i * s)
            .sum()
    }
}

impl Deref for Strides {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        self.0.as_slice()
    }
}

impl fmt::Debug for Strides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<[usize]> for Strides {
    fn as_ref(&self) -> &[usize] {
        self.0.as_slice()
    }
}

impl<const N: usize> PartialEq<[usize; N]> for Strides {
    fn eq(&self, other: &[usize; N]) -> bool {
        self.0.as_slice() == other.as_slice()
    }
}
