//! Elementwise arithmetic

use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::tensor::Tensor;
use std::ops::Add;

/// Elementwise sum `t1 + t2` into a new tensor
///
/// Shapes must match exactly; there is no broadcasting.
pub fn add<T: Element>(t1: &Tensor<T>, t2: &Tensor<T>) -> Result<Tensor<T>> {
    let lhs = t1.layout();
    let rhs = t2.layout();
    if lhs.shape() != rhs.shape() {
        return Err(Error::shape_mismatch(lhs.shape(), rhs.shape()));
    }
    match (t1.is_allocated(), t2.is_allocated()) {
        (true, true) => {}
        (false, false) => return Ok(Tensor::new()),
        _ => {
            return Err(Error::invalid_argument(
                "tensor",
                "cannot add an unallocated tensor to an allocated one",
            ));
        }
    }

    let sum = t1.with_data(|a| {
        t2.with_data(|b| a.iter().zip(b).map(|(&x, &y)| x + y).collect::<Vec<T>>())
    });
    Tensor::from_vec(sum, lhs.shape())
}

impl<T: Element> Add for &Tensor<T> {
    type Output = Tensor<T>;

    /// # Panics
    ///
    /// Panics on shape mismatch; use [`add`] to get an error instead.
    fn add(self, rhs: Self) -> Tensor<T> {
        match add(self, rhs) {
            Ok(t) => t,
            Err(e) => panic!("tensor add failed: {e}"),
        }
    }
}
