//! Row-partitioned Jacobi iteration across a process group

use log::{debug, trace, warn};

use super::partition::row_partition;
use super::sweep::{check_diagonal, max_abs_diff, rows_decoupled, sweep_rows};
use super::types::{JacobiOptions, JacobiResult};
use crate::algorithm::{LinearSystem, RowBlock};
use crate::comm::Communicator;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::tensor::Tensor;

/// Distributed Jacobi solve where every worker holds the whole system
///
/// Each worker takes its [`row_partition`] block out of `system` and calls
/// [`jacobi_parallel`]. Every worker in the group must call this with the
/// same system and `epsilon`; all of them return the same solution.
pub fn solve_parallel<T, C>(
    system: &LinearSystem<T>,
    epsilon: f64,
    comm: &mut C,
) -> Result<Tensor<f64>>
where
    T: Element,
    C: Communicator + ?Sized,
{
    let block = match row_partition(system.n(), comm.world_size(), comm.rank())
        .and_then(|rows| system.row_block(rows))
    {
        Ok(block) => block,
        Err(err) => {
            comm.abort(&err.to_string());
            return Err(err);
        }
    };
    jacobi_parallel(&block, &JacobiOptions::with_tol(epsilon), comm).map(|r| r.solution)
}

/// Jacobi iteration on this worker's rows, exchanging blocks every sweep
///
/// `block` must hold exactly the rows [`row_partition`] assigns to this rank.
/// Each sweep updates the local rows from the full previous iterate, then
/// all-gathers the blocks in rank order to rebuild the next iterate on every
/// worker. Since every worker then holds the same vector, they all compute
/// the same max difference and stop on the same sweep.
///
/// Row updates sum in the same order as [`jacobi_sequential`], so the result
/// matches the single-worker solve bit for bit. Before the first sweep the
/// workers exchange whether their rows read the previous iterate at all; only
/// if no row anywhere does, they all stop after one sweep.
///
/// If this worker fails on its own (bad block, zero pivot, bad options), it
/// aborts the group before returning, and its peers fail with `PeerAborted`
/// instead of waiting for it. `NonConvergence` is reached by every worker
/// together and does not abort.
///
/// [`jacobi_sequential`]: super::jacobi_sequential
pub fn jacobi_parallel<T, C>(
    block: &RowBlock<T>,
    options: &JacobiOptions,
    comm: &mut C,
) -> Result<JacobiResult>
where
    T: Element,
    C: Communicator + ?Sized,
{
    let result = iterate(block, options, comm);
    match &result {
        Ok(_) | Err(Error::NonConvergence { .. }) => {}
        Err(err @ Error::PeerAborted { .. }) => {
            warn!("jacobi: rank {} stopping: {err}", comm.rank());
        }
        Err(err) => comm.abort(&err.to_string()),
    }
    result
}

fn iterate<T, C>(block: &RowBlock<T>, options: &JacobiOptions, comm: &mut C) -> Result<JacobiResult>
where
    T: Element,
    C: Communicator + ?Sized,
{
    options.validate()?;
    block.validate()?;

    let n = block.n();
    let world_size = comm.world_size();
    let rank = comm.rank();
    let rows = block.rows();
    let owned = row_partition(n, world_size, rank)?;
    if rows != owned {
        return Err(Error::invalid_argument(
            "block",
            format!("rank {rank} of {world_size} owns rows {owned:?}, block holds {rows:?}"),
        ));
    }

    let mut x: Vec<f64> = block
        .x0()
        .with_data(|x0| x0.iter().map(|v| v.to_f64()).collect());
    let mut local = vec![0.0f64; rows.len()];

    block.a().with_data(|a| {
        block.b().with_data(|b| {
            if a.len() != rows.len() * n || b.len() != rows.len() || x.len() != n {
                return Err(Error::invalid_argument(
                    "block",
                    "resized while the solver was starting",
                ));
            }
            check_diagonal(a, n, n, rows.clone())?;
            let local_flag = if rows_decoupled(a, n, n, rows.clone()) { 1.0 } else { 0.0 };
            let decoupled = comm
                .all_gather(&[local_flag])?
                .iter()
                .all(|flag| flag.as_slice() == [1.0]);
            debug!(
                "jacobi: rank {rank}/{world_size} solving rows {rows:?} of n={n}, tol={:e}, \
                 decoupled={decoupled}",
                options.tol
            );

            let mut max_diff = f64::INFINITY;
            for iter in 1..=options.max_iter {
                sweep_rows(a, b, n, n, rows.clone(), &x, &mut local, options.parallel_min_rows);
                let blocks = comm.all_gather(&local)?;
                let next = assemble(blocks, n)?;
                max_diff = max_abs_diff(&next, &x);
                trace!("jacobi: rank {rank} iteration {iter}, max_diff={max_diff:e}");

                if !max_diff.is_finite() {
                    warn!("jacobi: rank {rank} iterate diverged at iteration {iter}");
                    return Err(Error::NonConvergence {
                        iterations: iter,
                        max_diff,
                    });
                }
                if max_diff < options.tol || decoupled {
                    debug!("jacobi: rank {rank} converged after {iter} iterations");
                    return Ok(JacobiResult {
                        solution: Tensor::from_vec(next, &[n])?,
                        iterations: iter,
                        max_diff,
                    });
                }
                x = next;
            }

            warn!(
                "jacobi: rank {rank} no convergence after {} iterations (max_diff={max_diff:e})",
                options.max_iter
            );
            Err(Error::NonConvergence {
                iterations: options.max_iter,
                max_diff,
            })
        })
    })
}

/// Concatenate gathered blocks in rank order, checking each against the partition
fn assemble(blocks: Vec<Vec<f64>>, n: usize) -> Result<Vec<f64>> {
    let world_size = blocks.len();
    let mut full = Vec::with_capacity(n);
    for (rank, values) in blocks.into_iter().enumerate() {
        let expected = row_partition(n, world_size, rank)?.len();
        if values.len() != expected {
            return Err(Error::Communication(format!(
                "rank {rank} contributed {} values, expected {expected}",
                values.len()
            )));
        }
        full.extend(values);
    }
    Ok(full)
}
