//! Core Tensor type

use super::{Layout, Shape, Storage, Strides};
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use std::fmt;

/// Dense n-dimensional array with a shared, row-major buffer
///
/// A `Tensor` is a handle. It either has no buffer yet (see [`Tensor::new`])
/// or points at a reference-counted [`Storage`] holding the layout and the
/// elements.
///
/// # Aliasing
///
/// `clone()` returns another handle to the *same* buffer. Writes and
/// [`resize`](Tensor::resize) through one handle are observed by every
/// other handle. Use [`deep_clone`](Tensor::deep_clone) for an independent
/// copy.
///
/// ```
/// use jacobi::tensor::Tensor;
///
/// let a = Tensor::<i32>::zeros(&[2, 2]);
/// let mut alias = a.clone();
/// alias.resize(&[3, 2]);
/// assert_eq!(a.shape(), [3, 2]);
/// assert_eq!(a.size(), 6);
/// ```
pub struct Tensor<T: Element> {
    storage: Option<Storage<T>>,
}

impl<T: Element> Tensor<T> {
    /// Create a handle with no buffer
    ///
    /// Shape is `[]` and size is 0 until [`resize`](Self::resize) allocates.
    pub fn new() -> Self {
        Self { storage: None }
    }

    /// Create a zero-filled tensor
    ///
    /// Zero extents are allowed and yield a tensor with no elements.
    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            storage: Some(Storage::zeroed(Layout::contiguous(shape))),
        }
    }

    /// Create a zero-filled tensor, rejecting degenerate shapes
    ///
    /// Returns `InvalidShape` for rank 0 or any zero extent.
    pub fn try_zeros_nonempty(shape: &[usize]) -> Result<Self> {
        if shape.is_empty() {
            return Err(Error::invalid_shape(shape, "at least one dimension required"));
        }
        if Shape::from(shape).has_zero_extent() {
            return Err(Error::invalid_shape(shape, "extents must be non-zero"));
        }
        Ok(Self::zeros(shape))
    }

    /// Create a tensor from a slice of data
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` does not equal the product of the `shape` dimensions.
    /// For a fallible alternative, use [`Self::try_from_slice`].
    pub fn from_slice(data: &[T], shape: &[usize]) -> Self {
        match Self::try_from_slice(data, shape) {
            Ok(t) => t,
            Err(e) => panic!("Tensor::from_slice failed: {e}"),
        }
    }

    /// Create a tensor from a slice of data (fallible version)
    pub fn try_from_slice(data: &[T], shape: &[usize]) -> Result<Self> {
        Self::from_vec(data.to_vec(), shape)
    }

    /// Create a tensor that takes ownership of `data`
    pub fn from_vec(data: Vec<T>, shape: &[usize]) -> Result<Self> {
        let layout = Layout::contiguous(shape);
        if data.len() != layout.elem_count() {
            return Err(Error::ShapeMismatch {
                expected: shape.to_vec(),
                got: vec![data.len()],
            });
        }

        Ok(Self {
            storage: Some(Storage::from_vec(data, layout)),
        })
    }

    /// Change shape, strides and buffer size
    ///
    /// Without a buffer this allocates a fresh zero-filled one for this handle
    /// only. With a buffer the change happens in place and is visible to every
    /// alias: existing elements keep their flat positions, new ones are zero.
    pub fn resize(&mut self, shape: &[usize]) {
        match &self.storage {
            Some(storage) => storage.write().resize(shape),
            None => self.storage = Some(Storage::zeroed(Layout::contiguous(shape))),
        }
    }

    /// Whether a buffer has been allocated
    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.storage.is_some()
    }

    /// Snapshot of the layout (`[]` when unallocated)
    pub fn layout(&self) -> Layout {
        match &self.storage {
            Some(s) => s.read().layout().clone(),
            None => Layout::default(),
        }
    }

    /// Snapshot of the shape
    pub fn shape(&self) -> Shape {
        match &self.storage {
            Some(s) => s.read().layout().shape().clone(),
            None => Shape::new(),
        }
    }

    /// Snapshot of the row-major strides
    pub fn strides(&self) -> Strides {
        match &self.storage {
            Some(s) => s.read().layout().strides().clone(),
            None => Strides::default(),
        }
    }

    /// Number of dimensions
    pub fn ndim(&self) -> usize {
        match &self.storage {
            Some(s) => s.read().layout().ndim(),
            None => 0,
        }
    }

    /// Number of elements in the buffer (0 when unallocated)
    pub fn size(&self) -> usize {
        match &self.storage {
            Some(s) => s.len(),
            None => 0,
        }
    }

    /// Element type
    #[inline]
    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    /// Read the element at a flat offset
    ///
    /// Takes the storage lock on every call. For loops over many elements,
    /// use [`with_data`](Self::with_data) and index the slice instead.
    ///
    /// # Panics
    ///
    /// Panics if the tensor is unallocated or `offset >= size()`.
    #[inline]
    pub fn get(&self, offset: usize) -> T {
        match &self.storage {
            Some(s) => s.read().data()[offset],
            None => panic!("Tensor::get on unallocated tensor"),
        }
    }

    /// Write the element at a flat offset
    ///
    /// Takes the storage lock on every call. For loops over many elements,
    /// use [`with_data_mut`](Self::with_data_mut) instead.
    ///
    /// # Panics
    ///
    /// Panics if the tensor is unallocated or `offset >= size()`.
    #[inline]
    pub fn set(&self, offset: usize, value: T) {
        match &self.storage {
            Some(s) => s.write().data_mut()[offset] = value,
            None => panic!("Tensor::set on unallocated tensor"),
        }
    }

    /// Read the element at multi-dimensional `indices`
    pub fn get_at(&self, indices: &[usize]) -> Result<T> {
        let storage = self.checked_storage()?;
        let guard = storage.read();
        let offset = Self::offset_in(guard.layout(), indices)?;
        Ok(guard.data()[offset])
    }

    /// Write the element at multi-dimensional `indices`
    pub fn set_at(&self, indices: &[usize], value: T) -> Result<()> {
        let storage = self.checked_storage()?;
        let mut guard = storage.write();
        let offset = Self::offset_in(guard.layout(), indices)?;
        guard.data_mut()[offset] = value;
        Ok(())
    }

    /// Set every element to `value`
    pub fn fill(&self, value: T) {
        self.with_data_mut(|data| data.fill(value));
    }

    /// Overwrite the buffer from `src` (lengths must match)
    pub fn copy_from_slice(&self, src: &[T]) -> Result<()> {
        let storage = self.checked_storage()?;
        let mut guard = storage.write();
        if guard.data().len() != src.len() {
            return Err(Error::ShapeMismatch {
                expected: guard.layout().shape().to_vec(),
                got: vec![src.len()],
            });
        }
        guard.data_mut().copy_from_slice(src);
        Ok(())
    }

    /// Run `f` over the elements in row-major order
    ///
    /// An unallocated tensor yields an empty slice. Do not touch aliases of
    /// this tensor mutably from inside `f`.
    pub fn with_data<F, O>(&self, f: F) -> O
    where
        F: FnOnce(&[T]) -> O,
    {
        match &self.storage {
            Some(s) => f(s.read().data()),
            None => f(&[]),
        }
    }

    /// Run `f` over the mutable elements in row-major order
    pub fn with_data_mut<F, O>(&self, f: F) -> O
    where
        F: FnOnce(&mut [T]) -> O,
    {
        match &self.storage {
            Some(s) => f(s.write().data_mut()),
            None => f(&mut []),
        }
    }

    /// Copy the elements out in row-major order
    pub fn to_vec(&self) -> Vec<T> {
        self.with_data(|d| d.to_vec())
    }

    /// Widening copy into a new `f64` tensor of the same shape
    pub fn to_f64(&self) -> Tensor<f64> {
        match &self.storage {
            Some(s) => {
                let guard = s.read();
                let data = guard.data().iter().map(|v| v.to_f64()).collect();
                Tensor {
                    storage: Some(Storage::from_vec(data, guard.layout().clone())),
                }
            }
            None => Tensor::new(),
        }
    }

    /// Independent copy with its own buffer
    pub fn deep_clone(&self) -> Self {
        Self {
            storage: self.storage.as_ref().map(Storage::deep_copy),
        }
    }

    /// Whether both handles point at the same buffer
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        match (&self.storage, &other.storage) {
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Number of handles sharing this buffer (0 when unallocated)
    pub fn ref_count(&self) -> usize {
        self.storage.as_ref().map_or(0, Storage::ref_count)
    }

    fn checked_storage(&self) -> Result<&Storage<T>> {
        self.storage
            .as_ref()
            .ok_or_else(|| Error::invalid_argument("tensor", "tensor is not allocated"))
    }

    fn offset_in(layout: &Layout, indices: &[usize]) -> Result<usize> {
        if indices.len() != layout.ndim() {
            return Err(Error::RankMismatch {
                op: "index",
                expected: layout.ndim(),
                got: indices.len(),
            });
        }
        layout.index(indices).ok_or_else(|| {
            // Report the first offending dimension
            let (index, size) = indices
                .iter()
                .zip(layout.shape().iter())
                .find(|(i, d)| *i >= *d)
                .map(|(&i, &d)| (i, d))
                .unwrap_or((0, 0));
            Error::IndexOutOfBounds { index, size }
        })
    }
}

impl<T: Element> Default for Tensor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element> Clone for Tensor<T> {
    /// Clone creates a new handle sharing the same storage (zero-copy)
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
        }
    }
}

impl<T: Element> fmt::Debug for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape())
            .field("dtype", &T::DTYPE)
            .field("allocated", &self.is_allocated())
            .finish()
    }
}

impl<T: Element> fmt::Display for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tensor({:?}, dtype={})", self.shape(), T::DTYPE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_unallocated() {
        let t = Tensor::<f32>::new();
        assert!(!t.is_allocated());
        assert_eq!(t.size(), 0);
        assert_eq!(t.ndim(), 0);
        assert_eq!(t.ref_count(), 0);
        assert!(t.to_vec().is_empty());
        assert!(t.get_at(&[]).is_err());
    }

    #[test]
    fn test_zeros() {
        let t = Tensor::<i64>::zeros(&[2, 3]);
        assert_eq!(t.shape(), [2, 3]);
        assert_eq!(t.strides(), [3, 1]);
        assert_eq!(t.size(), 6);
        assert_eq!(t.dtype(), DType::I64);
        assert_eq!(t.to_vec(), [0; 6]);
    }

    #[test]
    fn test_zeros_nonempty_rejects_degenerate() {
        assert!(matches!(
            Tensor::<f64>::try_zeros_nonempty(&[3, 0]),
            Err(Error::InvalidShape { .. })
        ));
        assert!(matches!(
            Tensor::<f64>::try_zeros_nonempty(&[]),
            Err(Error::InvalidShape { .. })
        ));
        assert_eq!(Tensor::<f64>::try_zeros_nonempty(&[1]).unwrap().size(), 1);

        // The base constructor still allows empty extents
        assert_eq!(Tensor::<f64>::zeros(&[3, 0]).size(), 0);
    }

    #[test]
    fn test_from_slice_shape_mismatch() {
        let err = Tensor::try_from_slice(&[1.0f32, 2.0, 3.0], &[2, 2]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_flat_and_indexed_access() {
        let t = Tensor::from_slice(&[1i32, 2, 3, 4, 5, 6], &[2, 3]);
        assert_eq!(t.get(4), 5);
        assert_eq!(t.get_at(&[1, 1]).unwrap(), 5);

        t.set_at(&[0, 2], 30).unwrap();
        assert_eq!(t.get(2), 30);

        t.set(5, 60);
        assert_eq!(t.get_at(&[1, 2]).unwrap(), 60);

        assert_eq!(
            t.get_at(&[2, 0]).unwrap_err(),
            Error::IndexOutOfBounds { index: 2, size: 2 }
        );
        assert!(matches!(
            t.get_at(&[0]).unwrap_err(),
            Error::RankMismatch { .. }
        ));
    }

    #[test]
    fn test_clone_aliases_buffer() {
        let a = Tensor::<f64>::zeros(&[3]);
        let b = a.clone();
        assert!(a.shares_storage_with(&b));
        assert_eq!(a.ref_count(), 2);

        b.set(1, 2.5);
        assert_eq!(a.get(1), 2.5);
    }

    #[test]
    fn test_deep_clone_is_independent() {
        let a = Tensor::from_slice(&[1u8, 2, 3], &[3]);
        let b = a.deep_clone();
        assert!(!a.shares_storage_with(&b));

        b.set(0, 9);
        assert_eq!(a.get(0), 1);
        assert_eq!(b.to_vec(), [9, 2, 3]);
    }

    #[test]
    fn test_resize_visible_through_alias() {
        let a = Tensor::from_slice(&[1.0f64, 2.0, 3.0, 4.0], &[2, 2]);
        let mut b = a.clone();
        b.resize(&[3, 3]);

        assert_eq!(a.shape(), [3, 3]);
        assert_eq!(a.strides(), [3, 1]);
        assert_eq!(a.size(), 9);
        assert_eq!(a.to_vec(), [1.0, 2.0, 3.0, 4.0, 0.0, 0.0, 0.0, 0.0, 0.0]);

        b.resize(&[2]);
        assert_eq!(a.shape(), [2]);
        assert_eq!(a.to_vec(), [1.0, 2.0]);
    }

    #[test]
    fn test_resize_unallocated_allocates_fresh() {
        let empty = Tensor::<i32>::new();
        let mut other = empty.clone();
        other.resize(&[4]);

        assert!(other.is_allocated());
        assert_eq!(other.size(), 4);
        assert!(!empty.is_allocated());
    }

    #[test]
    fn test_copy_from_slice_and_to_f64() {
        let t = Tensor::<i32>::zeros(&[2, 2]);
        t.copy_from_slice(&[1, -2, 3, -4]).unwrap();
        assert!(t.copy_from_slice(&[1, 2]).is_err());

        let wide = t.to_f64();
        assert_eq!(wide.shape(), [2, 2]);
        assert_eq!(wide.to_vec(), [1.0, -2.0, 3.0, -4.0]);
    }

    #[test]
    fn test_fill() {
        let t = Tensor::<f32>::zeros(&[2, 2]);
        t.fill(1.5);
        assert_eq!(t.to_vec(), [1.5; 4]);
    }
}
