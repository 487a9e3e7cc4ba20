//! Tensor operations
//!
//! Elementwise [`add`] and the dense [`matmul2d`] product. Both validate
//! shapes up front and allocate a fresh output tensor.

mod arithmetic;
mod matmul;

pub use arithmetic::add;
pub use matmul::{MatmulParams, matmul2d, validate_matmul2d_shapes};
