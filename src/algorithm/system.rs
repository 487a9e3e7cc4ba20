//! Linear system bundle: coefficient matrix, right-hand side, initial guess

use std::ops::Range;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::tensor::Tensor;

/// Square system `A x = b` with a starting iterate `x0`
///
/// All three tensors share element type `T` and dimension `n`. The handles
/// alias their buffers like any [`Tensor`], so a caller may keep a clone of
/// `a()` and populate it after construction.
#[derive(Debug, Clone)]
pub struct LinearSystem<T: Element> {
    n: usize,
    a: Tensor<T>,
    b: Tensor<T>,
    x0: Tensor<T>,
}

impl<T: Element> LinearSystem<T> {
    /// Allocate a zero-filled system of dimension `n`
    ///
    /// `n = 0` is rejected with `InvalidShape`.
    pub fn new(n: usize) -> Result<Self> {
        Ok(Self {
            n,
            a: Tensor::try_zeros_nonempty(&[n, n])?,
            b: Tensor::try_zeros_nonempty(&[n])?,
            x0: Tensor::try_zeros_nonempty(&[n])?,
        })
    }

    /// Build a system from row-major data
    pub fn from_slices(n: usize, a: &[T], b: &[T], x0: &[T]) -> Result<Self> {
        let system = Self::new(n)?;
        system.a.copy_from_slice(a)?;
        system.b.copy_from_slice(b)?;
        system.x0.copy_from_slice(x0)?;
        Ok(system)
    }

    /// Bundle existing tensors, checking that they describe one system
    pub fn from_parts(a: Tensor<T>, b: Tensor<T>, x0: Tensor<T>) -> Result<Self> {
        let shape = a.shape();
        if shape.ndim() != 2 {
            return Err(Error::RankMismatch {
                op: "linear_system",
                expected: 2,
                got: shape.ndim(),
            });
        }
        let n = shape[0];
        let system = Self { n, a, b, x0 };
        system.validate()?;
        Ok(system)
    }

    /// Dimension of the system
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Coefficient matrix `A` (n x n)
    #[inline]
    pub fn a(&self) -> &Tensor<T> {
        &self.a
    }

    /// Right-hand side `b` (n)
    #[inline]
    pub fn b(&self) -> &Tensor<T> {
        &self.b
    }

    /// Initial guess `x0` (n)
    #[inline]
    pub fn x0(&self) -> &Tensor<T> {
        &self.x0
    }

    /// Check that A is n x n and b, x0 have length n
    ///
    /// Handles can be resized through aliases, so solvers re-check before use.
    pub fn validate(&self) -> Result<()> {
        let n = self.n;
        if n == 0 {
            return Err(Error::invalid_shape(&[0, 0], "system dimension must be non-zero"));
        }
        let a_shape = self.a.shape();
        if a_shape != [n, n] {
            return Err(Error::shape_mismatch(&[n, n], &a_shape));
        }
        for v in [&self.b, &self.x0] {
            let shape = v.shape();
            if shape != [n] {
                return Err(Error::shape_mismatch(&[n], &shape));
            }
        }
        Ok(())
    }

    /// Copy out the rows `rows` of A and b together with the full x0
    pub fn row_block(&self, rows: Range<usize>) -> Result<RowBlock<T>> {
        self.validate()?;
        let n = self.n;
        if rows.start > rows.end || rows.end > n {
            return Err(Error::invalid_argument(
                "rows",
                format!("{rows:?} is not within 0..{n}"),
            ));
        }

        let local = rows.len();
        let a = self
            .a
            .with_data(|a| a[rows.start * n..rows.end * n].to_vec());
        let b = self.b.with_data(|b| b[rows.clone()].to_vec());

        Ok(RowBlock {
            n,
            rows,
            a: Tensor::from_vec(a, &[local, n])?,
            b: Tensor::from_vec(b, &[local])?,
            x0: self.x0.deep_clone(),
        })
    }

    /// Whether `|A[i][i]| > sum_{j != i} |A[i][j]|` for every row
    ///
    /// Jacobi converges for such systems; the solvers never enforce it.
    pub fn is_diagonally_dominant(&self) -> bool {
        let n = self.n;
        self.a.with_data(|a| {
            a.len() == n * n
                && a.chunks(n).enumerate().all(|(i, row)| {
                    let off: f64 = row
                        .iter()
                        .enumerate()
                        .filter(|&(j, _)| j != i)
                        .map(|(_, v)| v.to_f64().abs())
                        .sum();
                    row[i].to_f64().abs() > off
                })
        })
    }
}

impl LinearSystem<f64> {
    /// Seeded random system that is strictly diagonally dominant
    ///
    /// Off-diagonal entries are uniform in `[-1, 1)`, each diagonal entry
    /// exceeds its row's off-diagonal magnitude sum by `[1, 2)` with a random
    /// sign, `b` is uniform in `[-10, 10)` and `x0` is zero.
    pub fn random_diagonally_dominant(n: usize, seed: u64) -> Result<Self> {
        let system = Self::new(n)?;
        let mut rng = StdRng::seed_from_u64(seed);

        system.a.with_data_mut(|a| {
            for (i, row) in a.chunks_mut(n).enumerate() {
                let mut off = 0.0;
                for (j, v) in row.iter_mut().enumerate() {
                    if j != i {
                        *v = rng.random_range(-1.0..1.0);
                        off += v.abs();
                    }
                }
                let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
                row[i] = sign * (off + rng.random_range(1.0..2.0));
            }
        });
        system.b.with_data_mut(|b| {
            for v in b.iter_mut() {
                *v = rng.random_range(-10.0..10.0);
            }
        });

        Ok(system)
    }
}

/// One worker's share of a [`LinearSystem`]
///
/// Holds the rows `rows` of A and b plus a full copy of the initial guess,
/// since every row update reads the whole previous iterate.
#[derive(Debug, Clone)]
pub struct RowBlock<T: Element> {
    n: usize,
    rows: Range<usize>,
    a: Tensor<T>,
    b: Tensor<T>,
    x0: Tensor<T>,
}

impl<T: Element> RowBlock<T> {
    /// Assemble a block from local rows of A (`rows.len()` x n), b and the full x0
    pub fn new(
        n: usize,
        rows: Range<usize>,
        a: Tensor<T>,
        b: Tensor<T>,
        x0: Tensor<T>,
    ) -> Result<Self> {
        let block = Self { n, rows, a, b, x0 };
        block.validate()?;
        Ok(block)
    }

    /// Dimension of the full system
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Global rows owned by this block
    #[inline]
    pub fn rows(&self) -> Range<usize> {
        self.rows.clone()
    }

    /// Local rows of A
    #[inline]
    pub fn a(&self) -> &Tensor<T> {
        &self.a
    }

    /// Local entries of b
    #[inline]
    pub fn b(&self) -> &Tensor<T> {
        &self.b
    }

    /// Full initial guess
    #[inline]
    pub fn x0(&self) -> &Tensor<T> {
        &self.x0
    }

    /// Check block shapes against `n` and `rows`
    pub fn validate(&self) -> Result<()> {
        let n = self.n;
        if self.rows.start > self.rows.end || self.rows.end > n {
            return Err(Error::invalid_argument(
                "rows",
                format!("{:?} is not within 0..{n}", self.rows),
            ));
        }
        let local = self.rows.len();
        let a_shape = self.a.shape();
        if a_shape != [local, n] {
            return Err(Error::shape_mismatch(&[local, n], &a_shape));
        }
        let b_shape = self.b.shape();
        if b_shape != [local] {
            return Err(Error::shape_mismatch(&[local], &b_shape));
        }
        let x_shape = self.x0.shape();
        if x_shape != [n] {
            return Err(Error::shape_mismatch(&[n], &x_shape));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zero_filled() {
        let sys = LinearSystem::<i32>::new(3).unwrap();
        assert_eq!(sys.n(), 3);
        assert_eq!(sys.a().shape(), [3, 3]);
        assert_eq!(sys.b().shape(), [3]);
        assert_eq!(sys.x0().shape(), [3]);
        assert!(sys.a().to_vec().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_new_rejects_zero_dimension() {
        assert!(matches!(
            LinearSystem::<f64>::new(0),
            Err(Error::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_from_parts_validates() {
        let a = Tensor::<f64>::zeros(&[2, 2]);
        let b = Tensor::<f64>::zeros(&[3]);
        let x0 = Tensor::<f64>::zeros(&[2]);
        assert_eq!(
            LinearSystem::from_parts(a, b, x0).unwrap_err(),
            Error::shape_mismatch(&[2], &[3])
        );

        let a = Tensor::<f64>::zeros(&[2, 3]);
        let v = Tensor::<f64>::zeros(&[2]);
        assert!(LinearSystem::from_parts(a, v.clone(), v).is_err());
    }

    #[test]
    fn test_populate_through_alias() {
        let sys = LinearSystem::<f64>::new(2).unwrap();
        let a = sys.a().clone();
        a.set(3, 4.0);
        assert_eq!(sys.a().get_at(&[1, 1]).unwrap(), 4.0);
    }

    #[test]
    fn test_resize_through_alias_fails_validation() {
        let sys = LinearSystem::<f64>::new(2).unwrap();
        let mut b = sys.b().clone();
        b.resize(&[5]);
        assert!(matches!(sys.validate(), Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_row_block() {
        let sys = LinearSystem::from_slices(
            3,
            &[10, 1, -1, 1, 10, -1, -1, 1, 10],
            &[11, 10, 10],
            &[1, 2, 3],
        )
        .unwrap();

        let block = sys.row_block(1..3).unwrap();
        assert_eq!(block.rows(), 1..3);
        assert_eq!(block.a().shape(), [2, 3]);
        assert_eq!(block.a().to_vec(), [1, 10, -1, -1, 1, 10]);
        assert_eq!(block.b().to_vec(), [10, 10]);
        assert_eq!(block.x0().to_vec(), [1, 2, 3]);
        assert!(!block.x0().shares_storage_with(sys.x0()));

        let empty = sys.row_block(3..3).unwrap();
        assert_eq!(empty.a().size(), 0);

        assert!(sys.row_block(2..4).is_err());
    }

    #[test]
    fn test_diagonal_dominance() {
        let sys =
            LinearSystem::from_slices(2, &[3.0, 1.0, 1.0, 3.0], &[0.0, 0.0], &[0.0, 0.0]).unwrap();
        assert!(sys.is_diagonally_dominant());

        let sys =
            LinearSystem::from_slices(2, &[1.0, 1.0, 1.0, 3.0], &[0.0, 0.0], &[0.0, 0.0]).unwrap();
        assert!(!sys.is_diagonally_dominant());
    }

    #[test]
    fn test_random_system_is_dominant_and_seeded() {
        let s1 = LinearSystem::random_diagonally_dominant(12, 7).unwrap();
        let s2 = LinearSystem::random_diagonally_dominant(12, 7).unwrap();
        assert!(s1.is_diagonally_dominant());
        assert_eq!(s1.a().to_vec(), s2.a().to_vec());
        assert_eq!(s1.b().to_vec(), s2.b().to_vec());
        assert!(s1.x0().to_vec().iter().all(|&v| v == 0.0));
    }
}
