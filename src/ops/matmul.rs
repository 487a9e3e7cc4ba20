//! Dense 2D matrix multiplication

use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::tensor::Tensor;

/// Matrix multiplication parameters
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MatmulParams {
    /// Number of rows in A (M)
    pub m: usize,
    /// Number of columns in A / rows in B (K)
    pub k: usize,
    /// Number of columns in B (N)
    pub n: usize,
}

impl MatmulParams {
    /// Output shape `[M, N]`
    pub fn output_shape(&self) -> [usize; 2] {
        [self.m, self.n]
    }
}

/// Validate 2D matmul shapes and return `(m, k, n)`
pub fn validate_matmul2d_shapes(a_shape: &[usize], b_shape: &[usize]) -> Result<MatmulParams> {
    for shape in [a_shape, b_shape] {
        if shape.len() != 2 {
            return Err(Error::RankMismatch {
                op: "matmul2d",
                expected: 2,
                got: shape.len(),
            });
        }
    }

    // Inner dimensions must match
    if a_shape[1] != b_shape[0] {
        return Err(Error::dimension_mismatch("matmul2d", a_shape, b_shape));
    }

    Ok(MatmulParams {
        m: a_shape[0],
        k: a_shape[1],
        n: b_shape[1],
    })
}

/// Matrix product `C = A @ B` of two rank-2 tensors
///
/// Each output cell accumulates its inner reduction in a single scalar,
/// iterating rows of C, then columns, then the shared dimension. Element
/// addresses come from each operand's strides.
///
/// # Example
/// ```
/// use jacobi::ops::matmul2d;
/// use jacobi::tensor::Tensor;
///
/// let a = Tensor::from_slice(&[1, 2, 3, 4], &[2, 2]);
/// let b = Tensor::from_slice(&[5, 6, 7, 8], &[2, 2]);
/// let c = matmul2d(&a, &b)?;
/// assert_eq!(c.to_vec(), [19, 22, 43, 50]);
/// # Ok::<(), jacobi::error::Error>(())
/// ```
pub fn matmul2d<T: Element>(t1: &Tensor<T>, t2: &Tensor<T>) -> Result<Tensor<T>> {
    let a_layout = t1.layout();
    let b_layout = t2.layout();
    let params = validate_matmul2d_shapes(a_layout.shape(), b_layout.shape())?;

    let out = Tensor::<T>::zeros(&params.output_shape());
    let out_strides = out.strides();
    let a_strides = a_layout.strides();
    let b_strides = b_layout.strides();

    t1.with_data(|a| {
        t2.with_data(|b| {
            out.with_data_mut(|c| {
                for i in 0..params.m {
                    for j in 0..params.n {
                        let mut acc = T::zero();
                        for kk in 0..params.k {
                            acc = acc
                                + a[i * a_strides[0] + kk * a_strides[1]]
                                    * b[kk * b_strides[0] + j * b_strides[1]];
                        }
                        c[i * out_strides[0] + j * out_strides[1]] = acc;
                    }
                }
            })
        })
    });

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matmul2d_2x4_4x3() {
        let t1 = Tensor::from_vec((1..=8).collect::<Vec<i32>>(), &[2, 4]).unwrap();
        let t2 = Tensor::from_vec((1..=12).collect::<Vec<i32>>(), &[4, 3]).unwrap();

        //               1  2  3
        // 1 2 3 4   X   4  5  6   =    70  80  90
        // 5 6 7 8       7  8  9       158 184 210
        //               10 11 12
        let c = matmul2d(&t1, &t2).unwrap();
        assert_eq!(c.shape(), [2, 3]);
        assert_eq!(c.to_vec(), [70, 80, 90, 158, 184, 210]);
    }

    #[test]
    fn test_matmul2d_identity_f64() {
        let a = Tensor::from_slice(&[2.0f64, -1.0, 0.5, 3.0], &[2, 2]);
        let eye = Tensor::from_slice(&[1.0f64, 0.0, 0.0, 1.0], &[2, 2]);
        assert_eq!(matmul2d(&a, &eye).unwrap().to_vec(), a.to_vec());
        assert_eq!(matmul2d(&eye, &a).unwrap().to_vec(), a.to_vec());
    }

    #[test]
    fn test_matmul2d_rank_error() {
        let v = Tensor::<f32>::zeros(&[4]);
        let m = Tensor::<f32>::zeros(&[4, 2]);
        assert_eq!(
            matmul2d(&v, &m).unwrap_err(),
            Error::RankMismatch {
                op: "matmul2d",
                expected: 2,
                got: 1
            }
        );

        let cube = Tensor::<f32>::zeros(&[2, 2, 2]);
        assert!(matches!(
            matmul2d(&m, &cube),
            Err(Error::RankMismatch { got: 3, .. })
        ));
    }

    #[test]
    fn test_matmul2d_dimension_mismatch() {
        let a = Tensor::<i64>::zeros(&[2, 3]);
        let b = Tensor::<i64>::zeros(&[2, 3]);
        assert_eq!(
            matmul2d(&a, &b).unwrap_err(),
            Error::dimension_mismatch("matmul2d", &[2, 3], &[2, 3])
        );
    }

    #[test]
    fn test_matmul2d_empty_inner() {
        let a = Tensor::<f64>::zeros(&[2, 0]);
        let b = Tensor::<f64>::zeros(&[0, 3]);
        let c = matmul2d(&a, &b).unwrap();
        assert_eq!(c.shape(), [2, 3]);
        assert_eq!(c.to_vec(), [0.0; 6]);
    }
}
