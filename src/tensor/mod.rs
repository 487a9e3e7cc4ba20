//! Tensor types
//!
//! This module provides the `Tensor` handle: a dense n-dimensional array in
//! row-major order whose buffer is shared between handles.

mod core;
mod layout;
mod shape;
mod storage;
mod strides;

pub use core::Tensor;
pub use layout::Layout;
pub use shape::Shape;
pub use storage::{Storage, StorageInner};
pub use strides::Strides;
