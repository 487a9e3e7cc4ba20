//! Options and result types for the Jacobi solvers

use crate::error::{Error, Result};
use crate::tensor::Tensor;

/// Configuration options for Jacobi iteration
///
/// Iterates `x_{k+1}[i] = (b[i] - sum_{j != i} A[i][j] * x_k[j]) / A[i][i]`
/// until `max_i |x_{k+1}[i] - x_k[i]| < tol`.
#[derive(Debug, Clone, PartialEq)]
pub struct JacobiOptions {
    /// Stop once the largest per-component update is below this (default: 1e-10)
    pub tol: f64,
    /// Maximum number of sweeps before giving up (default: 10000)
    pub max_iter: usize,
    /// Rows per worker at which the sweep fans out over rayon (default: 256)
    ///
    /// Ignored without the `rayon` feature.
    pub parallel_min_rows: usize,
}

impl Default for JacobiOptions {
    fn default() -> Self {
        Self {
            tol: 1e-10,
            max_iter: 10_000,
            parallel_min_rows: 256,
        }
    }
}

impl JacobiOptions {
    /// Default options with tolerance `tol`
    pub fn with_tol(tol: f64) -> Self {
        Self {
            tol,
            ..Self::default()
        }
    }

    /// Set the iteration cap
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the rayon fan-out threshold
    pub fn parallel_min_rows(mut self, rows: usize) -> Self {
        self.parallel_min_rows = rows;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !self.tol.is_finite() || self.tol <= 0.0 {
            return Err(Error::invalid_argument(
                "tol",
                format!("must be finite and positive, got {}", self.tol),
            ));
        }
        if self.max_iter == 0 {
            return Err(Error::invalid_argument("max_iter", "must be at least 1"));
        }
        Ok(())
    }
}

/// Result of a converged Jacobi solve
#[derive(Debug, Clone)]
pub struct JacobiResult {
    /// Solution vector of length n
    pub solution: Tensor<f64>,
    /// Number of sweeps performed
    pub iterations: usize,
    /// Max absolute difference of the final sweep
    pub max_diff: f64,
}
