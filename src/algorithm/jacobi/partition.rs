//! Contiguous row partition across workers

use std::ops::Range;

use crate::error::{Error, Result};

/// Rows owned by `rank` when `n` rows are split over `world_size` workers
///
/// Blocks are contiguous and in rank order. The first `n % world_size` ranks
/// get one extra row, so block sizes differ by at most one. Ranks past `n`
/// get an empty range. Every worker can compute every other worker's block
/// without communicating.
///
/// ```
/// use jacobi::algorithm::jacobi::row_partition;
///
/// assert_eq!(row_partition(10, 3, 0)?, 0..4);
/// assert_eq!(row_partition(10, 3, 1)?, 4..7);
/// assert_eq!(row_partition(10, 3, 2)?, 7..10);
/// # Ok::<(), jacobi::error::Error>(())
/// ```
pub fn row_partition(n: usize, world_size: usize, rank: usize) -> Result<Range<usize>> {
    if world_size == 0 {
        return Err(Error::invalid_argument("world_size", "must be at least 1"));
    }
    if rank >= world_size {
        return Err(Error::invalid_argument(
            "rank",
            format!("{rank} is not below world size {world_size}"),
        ));
    }

    let base = n / world_size;
    let rem = n % world_size;
    let start = rank * base + rank.min(rem);
    let len = base + usize::from(rank < rem);
    Ok(start..start + len)
}
