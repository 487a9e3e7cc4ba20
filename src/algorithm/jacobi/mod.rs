//! Jacobi iteration for `A x = b`
//!
//! Starting from `x0`, every sweep computes
//!
//! ```text
//! x_{k+1}[i] = (b[i] - sum_{j != i} A[i][j] * x_k[j]) / A[i][i]
//! ```
//!
//! using only the previous iterate, and stops once
//! `max_i |x_{k+1}[i] - x_k[i]|` drops below the tolerance. Integer systems are
//! widened to `f64` for the arithmetic; solutions are always `f64`.
//!
//! # Solvers
//!
//! - [`solve_sequential`] / [`jacobi_sequential`]: one worker
//! - [`solve_parallel`] / [`jacobi_parallel`]: rows split over a
//!   [`Communicator`](crate::comm::Communicator) group by [`row_partition`],
//!   with an all-gather of the iterate after every sweep
//!
//! Both produce the same iterates. Within a worker, sweeps over large blocks
//! also fan out over rayon threads when the `rayon` feature is on; see
//! [`JacobiOptions::parallel_min_rows`].
//!
//! Convergence is guaranteed for strictly diagonally dominant systems (see
//! [`LinearSystem::is_diagonally_dominant`]).
//! Other systems may still converge; if they do not, the solvers fail with
//! `NonConvergence` once `max_iter` sweeps pass.
//!
//! [`LinearSystem::is_diagonally_dominant`]: crate::algorithm::LinearSystem::is_diagonally_dominant

mod parallel;
mod partition;
mod sequential;
mod sweep;
mod types;

pub use parallel::{jacobi_parallel, solve_parallel};
pub use partition::row_partition;
pub use sequential::{jacobi_sequential, solve_sequential};
pub use types::{JacobiOptions, JacobiResult};
