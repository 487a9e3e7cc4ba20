//! In-process group over channels

use std::collections::VecDeque;
use std::fmt;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use log::{debug, trace};

use super::Communicator;
use crate::error::{Error, Result};

enum Envelope {
    Block { epoch: u64, values: Vec<f64> },
    Abort { reason: String },
    Departed,
}

struct Message {
    source: usize,
    envelope: Envelope,
}

/// `W` workers connected by a full mesh of channels
///
/// Every endpoint owns one inbox and a sender to every other inbox. Messages
/// from one sender arrive in the order they were sent, so blocks from
/// consecutive exchanges never overtake each other.
///
/// ```
/// use jacobi::comm::{Communicator, LocalGroup};
///
/// let gathered = LocalGroup::new(3)?.run(|comm| {
///     let rank = comm.rank() as f64;
///     comm.all_gather(&[rank, rank * 10.0])
/// });
/// for result in gathered {
///     assert_eq!(result?, vec![vec![0.0, 0.0], vec![1.0, 10.0], vec![2.0, 20.0]]);
/// }
/// # Ok::<(), jacobi::error::Error>(())
/// ```
pub struct LocalGroup {
    endpoints: Vec<LocalEndpoint>,
}

impl LocalGroup {
    /// Create a group of `world_size` workers
    pub fn new(world_size: usize) -> Result<Self> {
        if world_size == 0 {
            return Err(Error::invalid_argument("world_size", "must be at least 1"));
        }

        let (senders, inboxes): (Vec<Sender<Message>>, Vec<Receiver<Message>>) =
            (0..world_size).map(|_| mpsc::channel()).unzip();

        let endpoints = inboxes
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| LocalEndpoint {
                rank,
                world_size,
                senders: senders.clone(),
                inbox,
                pending: (0..world_size).map(|_| VecDeque::new()).collect(),
                epoch: 0,
                timeout: None,
                failed: None,
                aborted: false,
            })
            .collect();

        Ok(Self { endpoints })
    }

    /// Fail `all_gather` with `Communication` if a peer is silent this long
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        for ep in &mut self.endpoints {
            ep.timeout = Some(timeout);
        }
        self
    }

    /// Number of workers
    pub fn world_size(&self) -> usize {
        self.endpoints.len()
    }

    /// Hand out the endpoints, in rank order
    pub fn into_endpoints(self) -> Vec<LocalEndpoint> {
        self.endpoints
    }

    /// Run `f` once per rank, each on its own scoped thread
    ///
    /// Returns the results in rank order. A panic in any worker is resumed
    /// on the calling thread after every worker has finished; the panicking
    /// worker's endpoint leaves the group, so its peers fail rather than
    /// wait.
    pub fn run<F, R>(self, f: F) -> Vec<R>
    where
        F: Fn(&mut LocalEndpoint) -> R + Sync,
        R: Send,
    {
        std::thread::scope(|scope| {
            let f = &f;
            let handles: Vec<_> = self
                .endpoints
                .into_iter()
                .map(|mut ep| scope.spawn(move || f(&mut ep)))
                .collect();

            let mut results = Vec::with_capacity(handles.len());
            let mut panic = None;
            for handle in handles {
                match handle.join() {
                    Ok(r) => results.push(r),
                    Err(payload) => {
                        panic.get_or_insert(payload);
                    }
                }
            }
            if let Some(payload) = panic {
                std::panic::resume_unwind(payload);
            }
            results
        })
    }
}

impl fmt::Debug for LocalGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalGroup")
            .field("world_size", &self.endpoints.len())
            .finish()
    }
}

/// One worker's endpoint in a [`LocalGroup`]
///
/// Dropping an endpoint tells its peers it has left the group.
pub struct LocalEndpoint {
    rank: usize,
    world_size: usize,
    senders: Vec<Sender<Message>>,
    inbox: Receiver<Message>,
    // Messages that arrived while waiting on a different peer
    pending: Vec<VecDeque<Envelope>>,
    epoch: u64,
    timeout: Option<Duration>,
    failed: Option<Error>,
    aborted: bool,
}

impl LocalEndpoint {
    fn broadcast(&self, make: impl Fn() -> Envelope) {
        for (peer, tx) in self.senders.iter().enumerate() {
            if peer != self.rank {
                // A closed inbox means the peer is gone; it needs nothing more
                let _ = tx.send(Message {
                    source: self.rank,
                    envelope: make(),
                });
            }
        }
    }

    fn recv(&self, peer: usize) -> Result<Message> {
        match self.timeout {
            Some(timeout) => self.inbox.recv_timeout(timeout).map_err(|e| match e {
                RecvTimeoutError::Timeout => Error::Communication(format!(
                    "rank {} timed out after {timeout:?} waiting for rank {peer}",
                    self.rank
                )),
                RecvTimeoutError::Disconnected => {
                    Error::Communication(format!("rank {} inbox disconnected", self.rank))
                }
            }),
            None => self.inbox.recv().map_err(|_| {
                Error::Communication(format!("rank {} inbox disconnected", self.rank))
            }),
        }
    }

    fn next_from(&mut self, peer: usize) -> Result<Envelope> {
        if let Some(envelope) = self.pending[peer].pop_front() {
            return Ok(envelope);
        }
        loop {
            let msg = self.recv(peer)?;
            if msg.source == peer {
                return Ok(msg.envelope);
            }
            self.pending[msg.source].push_back(msg.envelope);
        }
    }

    fn fail(&mut self, err: Error) -> Error {
        debug!("comm: rank {} failed: {err}", self.rank);
        self.failed = Some(err.clone());
        err
    }
}

impl Communicator for LocalEndpoint {
    fn rank(&self) -> usize {
        self.rank
    }

    fn world_size(&self) -> usize {
        self.world_size
    }

    fn all_gather(&mut self, local: &[f64]) -> Result<Vec<Vec<f64>>> {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }
        if self.aborted {
            return Err(Error::Communication(format!(
                "rank {} has already aborted",
                self.rank
            )));
        }

        let epoch = self.epoch;
        self.epoch += 1;
        trace!("comm: rank {} exchange {epoch}, {} values", self.rank, local.len());

        self.broadcast(|| Envelope::Block {
            epoch,
            values: local.to_vec(),
        });

        let mut gathered = Vec::with_capacity(self.world_size);
        for peer in 0..self.world_size {
            if peer == self.rank {
                gathered.push(local.to_vec());
                continue;
            }
            let err = match self.next_from(peer) {
                Ok(Envelope::Block { epoch: e, values }) if e == epoch => {
                    gathered.push(values);
                    continue;
                }
                Ok(Envelope::Block { epoch: e, .. }) => Error::Communication(format!(
                    "rank {peer} sent exchange {e} while rank {} expected {epoch}",
                    self.rank
                )),
                Ok(Envelope::Abort { reason }) => Error::PeerAborted { rank: peer, reason },
                Ok(Envelope::Departed) => Error::PeerAborted {
                    rank: peer,
                    reason: "left the group".to_string(),
                },
                Err(err) => err,
            };
            return Err(self.fail(err));
        }
        Ok(gathered)
    }

    fn abort(&mut self, reason: &str) {
        if self.aborted {
            return;
        }
        debug!("comm: rank {} aborting: {reason}", self.rank);
        self.aborted = true;
        self.broadcast(|| Envelope::Abort {
            reason: reason.to_string(),
        });
    }
}

impl Drop for LocalEndpoint {
    fn drop(&mut self) {
        if !self.aborted {
            self.broadcast(|| Envelope::Departed);
        }
    }
}

impl fmt::Debug for LocalEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalEndpoint")
            .field("rank", &self.rank)
            .field("world_size", &self.world_size)
            .field("epoch", &self.epoch)
            .field("aborted", &self.aborted)
            .finish()
    }
}
