//! Common test utilities
#![allow(dead_code)]

use jacobi::algorithm::LinearSystem;

/// Route `log` output through the test harness; safe to call from every test
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Residual `max_i |(A x - b)[i]|` of a candidate solution
pub fn max_residual(system: &LinearSystem<f64>, x: &[f64]) -> f64 {
    let n = system.n();
    let a = system.a().to_vec();
    let b = system.b().to_vec();
    (0..n)
        .map(|i| {
            let ax: f64 = (0..n).map(|j| a[i * n + j] * x[j]).sum();
            (ax - b[i]).abs()
        })
        .fold(0.0, f64::max)
}

/// The 3x3 integer system with known solution ~(1.10202, 0.99091, 1.01111) at 1e-4
pub fn integer_system() -> LinearSystem<i32> {
    LinearSystem::from_slices(
        3,
        &[10, 1, -1, 1, 10, -1, -1, 1, 10],
        &[11, 10, 10],
        &[11, 10, 10],
    )
    .unwrap()
}

/// The 3x3 float system with known solution ~(-1.50757, 0.60870, 1.39242) at 1e-4
pub fn float_system() -> LinearSystem<f64> {
    LinearSystem::from_slices(
        3,
        &[9.2, 2.5, -3.7, 0.9, 9.0, 0.2, 4.5, -1.6, -10.3],
        &[-17.5, 4.4, -22.1],
        &[0.0, 0.0, 0.0],
    )
    .unwrap()
}
