//! Single-worker Jacobi iteration

use log::{debug, trace, warn};

use super::sweep::{check_diagonal, max_abs_diff, rows_decoupled, sweep_rows};
use super::types::{JacobiOptions, JacobiResult};
use crate::algorithm::LinearSystem;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::tensor::Tensor;

/// Solve `A x = b` by Jacobi iteration, stopping below `epsilon`
///
/// Returns the first iterate whose largest per-component change is below
/// `epsilon`, as `f64` regardless of `T`. See [`jacobi_sequential`] for the
/// iteration count and the other options.
///
/// ```
/// use jacobi::algorithm::LinearSystem;
/// use jacobi::algorithm::jacobi::solve_sequential;
///
/// let system = LinearSystem::from_slices(2, &[4.0, 1.0, 1.0, 3.0], &[1.0, 2.0], &[0.0, 0.0])?;
/// let x = solve_sequential(&system, 1e-12)?;
/// assert!((x.get(0) - 1.0 / 11.0).abs() < 1e-10);
/// assert!((x.get(1) - 7.0 / 11.0).abs() < 1e-10);
/// # Ok::<(), jacobi::error::Error>(())
/// ```
pub fn solve_sequential<T: Element>(
    system: &LinearSystem<T>,
    epsilon: f64,
) -> Result<Tensor<f64>> {
    jacobi_sequential(system, &JacobiOptions::with_tol(epsilon)).map(|r| r.solution)
}

/// Jacobi iteration on one worker
///
/// Each sweep computes every row from the previous iterate only, so the
/// result does not depend on the order rows are visited. When no row reads
/// the previous iterate (n = 1, or a diagonal A) the first sweep is exact and
/// the solve stops after it. Fails with
/// `SingularPivot` before iterating if any diagonal entry is zero, and with
/// `NonConvergence` if `max_iter` sweeps pass or the iterate stops being
/// finite.
pub fn jacobi_sequential<T: Element>(
    system: &LinearSystem<T>,
    options: &JacobiOptions,
) -> Result<JacobiResult> {
    options.validate()?;
    system.validate()?;

    let n = system.n();
    let mut x: Vec<f64> = system
        .x0()
        .with_data(|x0| x0.iter().map(|v| v.to_f64()).collect());
    let mut next = vec![0.0f64; n];

    system.a().with_data(|a| {
        system.b().with_data(|b| {
            if a.len() != n * n || b.len() != n || x.len() != n {
                return Err(Error::invalid_argument(
                    "system",
                    "resized while the solver was starting",
                ));
            }
            check_diagonal(a, n, n, 0..n)?;
            let decoupled = rows_decoupled(a, n, n, 0..n);
            debug!(
                "jacobi: sequential solve, n={n}, tol={:e}, decoupled={decoupled}",
                options.tol
            );

            let mut max_diff = f64::INFINITY;
            for iter in 1..=options.max_iter {
                sweep_rows(a, b, n, n, 0..n, &x, &mut next, options.parallel_min_rows);
                max_diff = max_abs_diff(&next, &x);
                trace!("jacobi: iteration {iter}, max_diff={max_diff:e}");

                if !max_diff.is_finite() {
                    warn!("jacobi: iterate diverged at iteration {iter}");
                    return Err(Error::NonConvergence {
                        iterations: iter,
                        max_diff,
                    });
                }
                if max_diff < options.tol || decoupled {
                    debug!("jacobi: converged after {iter} iterations");
                    return Ok(JacobiResult {
                        solution: Tensor::from_vec(next, &[n])?,
                        iterations: iter,
                        max_diff,
                    });
                }
                std::mem::swap(&mut x, &mut next);
            }

            warn!(
                "jacobi: no convergence after {} iterations (max_diff={max_diff:e})",
                options.max_iter
            );
            Err(Error::NonConvergence {
                iterations: options.max_iter,
                max_diff,
            })
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(got: &[f64], expected: &[f64], atol: f64) {
        assert_eq!(got.len(), expected.len());
        for (i, (g, e)) in got.iter().zip(expected).enumerate() {
            assert!((g - e).abs() <= atol, "index {i}: {g} vs {e}");
        }
    }

    #[test]
    fn test_integer_system() {
        let system = LinearSystem::from_slices(
            3,
            &[10, 1, -1, 1, 10, -1, -1, 1, 10],
            &[11, 10, 10],
            &[11, 10, 10],
        )
        .unwrap();

        let result = jacobi_sequential(&system, &JacobiOptions::with_tol(1e-4)).unwrap();
        assert_close(&result.solution.to_vec(), &[1.10202, 0.99091, 1.01111], 1e-5);
        assert_eq!(result.iterations, 6);
        assert!(result.max_diff < 1e-4);
    }

    #[test]
    fn test_float_system() {
        let system = LinearSystem::from_slices(
            3,
            &[9.2, 2.5, -3.7, 0.9, 9.0, 0.2, 4.5, -1.6, -10.3],
            &[-17.5, 4.4, -22.1],
            &[0.0, 0.0, 0.0],
        )
        .unwrap();

        let x = solve_sequential(&system, 1e-4).unwrap();
        assert_eq!(x.shape(), [3]);
        assert_close(&x.to_vec(), &[-1.50757, 0.60870, 1.39242], 1e-5);
    }

    #[test]
    fn test_single_unknown_is_exact() {
        let system = LinearSystem::from_slices(1, &[5.0], &[3.0], &[0.0]).unwrap();
        let result = jacobi_sequential(&system, &JacobiOptions::default()).unwrap();
        assert_eq!(result.solution.to_vec(), [3.0 / 5.0]);
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn test_diagonal_system_stops_after_first_sweep() {
        let system = LinearSystem::from_slices(
            3,
            &[2, 0, 0, 0, -4, 0, 0, 0, 8],
            &[1, 2, 3],
            &[100, 100, 100],
        )
        .unwrap();
        let result = jacobi_sequential(&system, &JacobiOptions::with_tol(1e-12)).unwrap();
        assert_eq!(result.solution.to_vec(), [0.5, -0.5, 0.375]);
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn test_zero_diagonal() {
        let system =
            LinearSystem::from_slices(2, &[1.0, 2.0, 3.0, 0.0], &[1.0, 1.0], &[0.0, 0.0]).unwrap();
        assert_eq!(
            solve_sequential(&system, 1e-6).unwrap_err(),
            Error::SingularPivot { row: 1 }
        );
    }

    #[test]
    fn test_iteration_cap() {
        // Iteration matrix has spectral radius 2
        let system =
            LinearSystem::from_slices(2, &[1.0, 2.0, 2.0, 1.0], &[1.0, 1.0], &[0.0, 0.0]).unwrap();
        let err = jacobi_sequential(&system, &JacobiOptions::with_tol(1e-8).max_iter(20))
            .unwrap_err();
        assert!(matches!(err, Error::NonConvergence { iterations: 20, .. }));
    }

    #[test]
    fn test_rejects_bad_epsilon() {
        let system = LinearSystem::<f64>::new(2).unwrap();
        assert!(matches!(
            solve_sequential(&system, 0.0),
            Err(Error::InvalidArgument { arg: "tol", .. })
        ));
    }

    #[test]
    fn test_does_not_touch_inputs() {
        let system = LinearSystem::random_diagonally_dominant(16, 3).unwrap();
        let a = system.a().to_vec();
        let x0 = system.x0().to_vec();
        solve_sequential(&system, 1e-10).unwrap();
        assert_eq!(system.a().to_vec(), a);
        assert_eq!(system.x0().to_vec(), x0);
    }
}
