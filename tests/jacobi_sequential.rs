//! Integration tests for the single-worker Jacobi solver

mod common;

use common::{assert_allclose_f64, float_system, init_logger, integer_system, max_residual};
use jacobi::algorithm::LinearSystem;
use jacobi::algorithm::jacobi::{JacobiOptions, jacobi_sequential, solve_sequential};
use jacobi::error::Error;
use jacobi::tensor::Tensor;

#[test]
fn test_integer_system() {
    init_logger();
    let x = solve_sequential(&integer_system(), 1e-4).unwrap();
    assert_allclose_f64(&x.to_vec(), &[1.10202, 0.99091, 1.01111], 0.0, 1e-5, "int 3x3");
}

#[test]
fn test_float_system() {
    init_logger();
    let x = solve_sequential(&float_system(), 1e-4).unwrap();
    assert_allclose_f64(&x.to_vec(), &[-1.50757, 0.60870, 1.39242], 0.0, 1e-5, "f64 3x3");
}

#[test]
fn test_f32_system_widens() {
    let system = LinearSystem::<f32>::from_slices(
        3,
        &[9.2, 2.5, -3.7, 0.9, 9.0, 0.2, 4.5, -1.6, -10.3],
        &[-17.5, 4.4, -22.1],
        &[0.0, 0.0, 0.0],
    )
    .unwrap();
    let x = solve_sequential(&system, 1e-4).unwrap();
    assert_allclose_f64(&x.to_vec(), &[-1.50757, 0.60870, 1.39242], 0.0, 1e-4, "f32 3x3");
}

#[test]
fn test_fixed_point_is_stable() {
    let system = float_system();
    let x = solve_sequential(&system, 1e-12).unwrap();

    let restarted = LinearSystem::from_parts(
        system.a().clone(),
        system.b().clone(),
        Tensor::from_vec(x.to_vec(), &[3]).unwrap(),
    )
    .unwrap();
    let again = jacobi_sequential(&restarted, &JacobiOptions::with_tol(1e-9)).unwrap();
    assert_eq!(again.iterations, 1);
    assert_allclose_f64(&again.solution.to_vec(), &x.to_vec(), 0.0, 1e-9, "fixed point");
}

#[test]
fn test_random_dominant_systems_converge() {
    init_logger();
    for (n, seed) in [(1, 1), (7, 2), (64, 3), (300, 4)] {
        let system = LinearSystem::random_diagonally_dominant(n, seed).unwrap();
        let result = jacobi_sequential(&system, &JacobiOptions::with_tol(1e-12)).unwrap();
        let residual = max_residual(&system, &result.solution.to_vec());
        assert!(residual < 1e-8, "n={n}: residual {residual}");
    }
}

#[test]
fn test_single_unknown() {
    let system = LinearSystem::from_slices(1, &[4], &[10], &[0]).unwrap();
    let result = jacobi_sequential(&system, &JacobiOptions::default()).unwrap();
    assert_eq!(result.solution.to_vec(), [2.5]);
    assert_eq!(result.iterations, 1);
}

#[test]
fn test_zero_diagonal_reports_row() {
    let system = LinearSystem::from_slices(
        3,
        &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0],
        &[1.0, 1.0, 1.0],
        &[0.0, 0.0, 0.0],
    )
    .unwrap();
    assert_eq!(
        solve_sequential(&system, 1e-6).unwrap_err(),
        Error::SingularPivot { row: 2 }
    );
}

#[test]
fn test_divergent_system_hits_cap() {
    let system =
        LinearSystem::from_slices(2, &[1.0, 3.0, 3.0, 1.0], &[1.0, 2.0], &[0.0, 0.0]).unwrap();
    match jacobi_sequential(&system, &JacobiOptions::with_tol(1e-6).max_iter(30)) {
        Err(Error::NonConvergence { iterations, max_diff }) => {
            assert_eq!(iterations, 30);
            assert!(max_diff > 1.0);
        }
        other => panic!("expected NonConvergence, got {other:?}"),
    }
}

#[test]
fn test_inputs_resized_after_construction_are_rejected() {
    let system = float_system();
    let mut x0 = system.x0().clone();
    x0.resize(&[4]);
    assert!(matches!(
        solve_sequential(&system, 1e-4),
        Err(Error::ShapeMismatch { .. })
    ));
}
