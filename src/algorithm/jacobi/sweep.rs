//! One Jacobi sweep over a block of rows

use std::ops::Range;

use crate::dtype::Element;
use crate::error::{Error, Result};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Fail with `SingularPivot` on the first zero diagonal in `rows`
///
/// `a` holds the block's rows back to back, `row_stride` elements apart,
/// each `n` wide; local row `l` is global row `rows.start + l`.
pub(crate) fn check_diagonal<T: Element>(
    a: &[T],
    n: usize,
    row_stride: usize,
    rows: Range<usize>,
) -> Result<()> {
    for (local, row) in rows.enumerate() {
        debug_assert!(row < n);
        if a[local * row_stride + row].to_f64() == 0.0 {
            return Err(Error::SingularPivot { row });
        }
    }
    Ok(())
}

/// Whether no row in `rows` reads the previous iterate
///
/// Holds when every off-diagonal entry of the block is zero, which is always
/// the case for n = 1. The first sweep over such rows is already exact.
pub(crate) fn rows_decoupled<T: Element>(
    a: &[T],
    n: usize,
    row_stride: usize,
    rows: Range<usize>,
) -> bool {
    rows.enumerate().all(|(local, row)| {
        let offset = local * row_stride;
        a[offset..offset + n]
            .iter()
            .enumerate()
            .all(|(j, v)| j == row || v.to_f64() == 0.0)
    })
}

/// Jacobi update of global row `i` from the full previous iterate `x`
#[inline]
fn row_update<T: Element>(a_row: &[T], b_i: T, i: usize, x: &[f64]) -> f64 {
    let mut sigma = 0.0f64;
    for (j, (&a_ij, &x_j)) in a_row.iter().zip(x).enumerate() {
        if j != i {
            sigma += a_ij.to_f64() * x_j;
        }
    }
    (b_i.to_f64() - sigma) / a_row[i].to_f64()
}

/// Write `x_{k+1}` for every row in `rows` into `out`
///
/// Rows only read `x`, so they are independent and fan out over rayon once
/// the block has at least `parallel_min_rows` rows.
#[allow(clippy::too_many_arguments)]
pub(crate) fn sweep_rows<T: Element>(
    a: &[T],
    b: &[T],
    n: usize,
    row_stride: usize,
    rows: Range<usize>,
    x: &[f64],
    out: &mut [f64],
    parallel_min_rows: usize,
) {
    debug_assert_eq!(out.len(), rows.len());
    debug_assert_eq!(x.len(), n);

    let start = rows.start;
    let update = |(local, slot): (usize, &mut f64)| {
        let offset = local * row_stride;
        *slot = row_update(&a[offset..offset + n], b[local], start + local, x);
    };

    #[cfg(feature = "rayon")]
    {
        if out.len() >= parallel_min_rows.max(1) {
            out.par_iter_mut().enumerate().for_each(&update);
            return;
        }
    }

    #[cfg(not(feature = "rayon"))]
    let _ = parallel_min_rows;

    out.iter_mut().enumerate().for_each(&update);
}

/// `max_i |next[i] - prev[i]|`, NaN if any difference is NaN
pub(crate) fn max_abs_diff(next: &[f64], prev: &[f64]) -> f64 {
    debug_assert_eq!(next.len(), prev.len());
    next.iter()
        .zip(prev)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, |m, d| if d > m || d.is_nan() { d } else { m })
}
