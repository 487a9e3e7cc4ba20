//! Error types for jacobi

use thiserror::Error;

/// Result type alias using jacobi's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tensor operations and solvers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Shape is not allowed in this context (e.g. a zero extent)
    #[error("Invalid shape {shape:?}: {reason}")]
    InvalidShape {
        /// The rejected shape
        shape: Vec<usize>,
        /// Why it was rejected
        reason: String,
    },

    /// Shape mismatch in an operation
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Operand has the wrong number of dimensions
    #[error("'{op}' expects rank-{expected} tensors, got rank {got}")]
    RankMismatch {
        /// The operation name
        op: &'static str,
        /// Required rank
        expected: usize,
        /// Actual rank
        got: usize,
    },

    /// Contracted dimensions of two operands disagree
    #[error("'{op}' dimension mismatch: lhs {lhs:?} vs rhs {rhs:?}")]
    DimensionMismatch {
        /// The operation name
        op: &'static str,
        /// Left-hand side shape
        lhs: Vec<usize>,
        /// Right-hand side shape
        rhs: Vec<usize>,
    },

    /// Index out of bounds
    #[error("Index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// The invalid index
        index: usize,
        /// Size of the dimension
        size: usize,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Zero diagonal entry, the Jacobi update divides by it
    #[error("Zero diagonal entry in row {row}")]
    SingularPivot {
        /// Global row index
        row: usize,
    },

    /// Iteration cap reached before the update fell below tolerance
    #[error("No convergence after {iterations} iterations (last max difference {max_diff:e})")]
    NonConvergence {
        /// Sweeps performed
        iterations: usize,
        /// Max absolute difference of the last sweep
        max_diff: f64,
    },

    /// A peer worker failed and signalled the group
    #[error("Worker {rank} aborted: {reason}")]
    PeerAborted {
        /// Rank of the failed worker
        rank: usize,
        /// Failure reported by that worker
        reason: String,
    },

    /// Transport failure in the process group
    #[error("Communication error: {0}")]
    Communication(String),
}

impl Error {
    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create an invalid shape error
    pub fn invalid_shape(shape: &[usize], reason: impl Into<String>) -> Self {
        Self::InvalidShape {
            shape: shape.to_vec(),
            reason: reason.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch(op: &'static str, lhs: &[usize], rhs: &[usize]) -> Self {
        Self::DimensionMismatch {
            op,
            lhs: lhs.to_vec(),
            rhs: rhs.to_vec(),
        }
    }
}
