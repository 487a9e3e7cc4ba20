//! Layout: shape and row-major strides of a tensor

use super::shape::Shape;
use super::strides::Strides;
use std::fmt;

/// Layout describes how a tensor's indices map into its flat buffer
///
/// Buffers are always dense and row-major, so the layout is a pure function
/// of the shape. The address of the element at `[i0, i1, ..., in]` is
/// `i0 * strides[0] + i1 * strides[1] + ... + in * strides[n]`.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Layout {
    shape: Shape,
    strides: Strides,
}

impl Layout {
    /// Create a row-major layout from a shape
    ///
    /// # Example
    /// ```
    /// use jacobi::tensor::Layout;
    /// let layout = Layout::contiguous(&[2, 3, 4]);
    /// assert_eq!(layout.shape().as_slice(), &[2, 3, 4]);
    /// assert_eq!(layout.strides().as_slice(), &[12, 4, 1]);
    /// ```
    pub fn contiguous(shape: &[usize]) -> Self {
        Self {
            shape: Shape::from(shape),
            strides: Strides::row_major(shape),
        }
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Get the strides
    #[inline]
    pub fn strides(&self) -> &Strides {
        &self.strides
    }

    /// Number of dimensions (rank)
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    /// Total number of elements
    #[inline]
    pub fn elem_count(&self) -> usize {
        self.shape.elem_count()
    }

    /// Compute the flat offset for given indices
    ///
    /// Returns None on rank mismatch or if any index is out of range.
    pub fn index(&self, indices: &[usize]) -> Option<usize> {
        if indices.len() != self.ndim() {
            return None;
        }

        for (&idx, &dim) in indices.iter().zip(self.shape.iter()) {
            if idx >= dim {
                return None;
            }
        }

        Some(self.strides.offset_of(indices))
    }
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Layout {{ shape: {:?}, strides: {:?} }}",
            self.shape.as_slice(),
            self.strides.as_slice(),
        )
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.shape.as_slice())
    }
}
