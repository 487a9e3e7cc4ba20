//! Process-group abstraction for the distributed solver
//!
//! A [`Communicator`] connects `world_size` workers, each identified by a
//! rank in `0..world_size`. The solver needs exactly one collective, an
//! all-gather of each worker's block of the iterate, plus a way to tell the
//! group that this worker has failed so no peer waits on it forever.
//!
//! Two implementations ship with the crate:
//!
//! - [`SingleProcess`]: a group of one, for running the distributed code path
//!   without any peers
//! - [`LocalGroup`]: `W` workers inside one process, connected by channels

mod local;

pub use local::{LocalEndpoint, LocalGroup};

use log::debug;

use crate::error::Result;

/// One worker's handle on a process group
///
/// All workers must call [`all_gather`](Communicator::all_gather) the same
/// number of times, in the same order.
pub trait Communicator {
    /// This worker's rank in `0..world_size()`
    fn rank(&self) -> usize;

    /// Number of workers in the group
    fn world_size(&self) -> usize;

    /// Exchange `local` with every peer
    ///
    /// Returns one buffer per rank in rank order, with this worker's own
    /// `local` at index `rank()`. Fails with `PeerAborted` if a peer aborts or
    /// leaves the group before contributing, and with `Communication` on
    /// transport failure. After an error the endpoint stays failed.
    fn all_gather(&mut self, local: &[f64]) -> Result<Vec<Vec<f64>>>;

    /// Tell every peer that this worker has stopped for `reason`
    ///
    /// Peers blocked in or entering `all_gather` fail instead of waiting.
    fn abort(&mut self, reason: &str);
}

/// A group with a single worker
#[derive(Debug, Default, Clone, Copy)]
pub struct SingleProcess;

impl Communicator for SingleProcess {
    fn rank(&self) -> usize {
        0
    }

    fn world_size(&self) -> usize {
        1
    }

    fn all_gather(&mut self, local: &[f64]) -> Result<Vec<Vec<f64>>> {
        Ok(vec![local.to_vec()])
    }

    fn abort(&mut self, reason: &str) {
        debug!("comm: single worker aborted: {reason}");
    }
}
