//! Storage: host memory with Arc-based sharing

use super::Layout;
use crate::dtype::Element;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Shared buffer behind one or more tensor handles
///
/// The layout lives inside the lock next to the data, so a resize through
/// any handle changes shape, strides and contents for every handle sharing
/// this storage. Memory is freed when the last reference is dropped.
pub struct Storage<T: Element> {
    inner: Arc<RwLock<StorageInner<T>>>,
}

/// Layout and elements guarded by the storage lock
pub struct StorageInner<T: Element> {
    pub(crate) layout: Layout,
    pub(crate) data: Vec<T>,
}

impl<T: Element> StorageInner<T> {
    /// Layout of the buffer
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Elements in row-major order
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Mutable elements in row-major order
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Re-shape in place, growing with zeros or truncating
    pub(crate) fn resize(&mut self, shape: &[usize]) {
        self.layout = Layout::contiguous(shape);
        self.data.resize(self.layout.elem_count(), T::zero());
    }
}

impl<T: Element> Storage<T> {
    /// Allocate zero-filled storage for `layout`
    pub fn zeroed(layout: Layout) -> Self {
        let data = vec![T::zero(); layout.elem_count()];
        Self::from_vec(data, layout)
    }

    /// Take ownership of `data` as the buffer for `layout`
    pub fn from_vec(data: Vec<T>, layout: Layout) -> Self {
        debug_assert_eq!(data.len(), layout.elem_count());
        Self {
            inner: Arc::new(RwLock::new(StorageInner { layout, data })),
        }
    }

    /// Shared access to layout and data
    ///
    /// Uses a recursive read so one thread may hold guards for two handles
    /// of the same storage (e.g. `add(&t, &t)`).
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, StorageInner<T>> {
        self.inner.read_recursive()
    }

    /// Exclusive access to layout and data
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, StorageInner<T>> {
        self.inner.write()
    }

    /// Get the number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.read().data.len()
    }

    /// Check if storage is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the reference count
    #[inline]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Whether two storages are the same allocation
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Independent copy of layout and data
    pub fn deep_copy(&self) -> Self {
        let guard = self.read();
        Self::from_vec(guard.data.clone(), guard.layout.clone())
    }
}

impl<T: Element> Clone for Storage<T> {
    /// Clone increments the reference count (zero-copy)
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Element> std::fmt::Debug for Storage<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = self.read();
        f.debug_struct("Storage")
            .field("len", &guard.data.len())
            .field("dtype", &T::DTYPE)
            .field("ref_count", &self.ref_count())
            .finish()
    }
}
