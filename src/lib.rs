//! # jacobi
//!
//! **Jacobi iteration for dense linear systems, on one worker or many.**
//!
//! The crate has two halves:
//!
//! - A small dense tensor: row-major, strided, with a reference-counted buffer
//!   that every clone shares. Resizing through one handle is visible through
//!   all of them. Element-wise [`add`](ops::add) and 2-D
//!   [`matmul2d`](ops::matmul2d) are provided.
//! - Jacobi solvers for `A x = b`: a sequential one and a distributed one that
//!   splits rows over a process group and all-gathers the iterate every sweep.
//!
//! ## Quick Start
//!
//! ```rust
//! use jacobi::prelude::*;
//!
//! let system = LinearSystem::from_slices(
//!     3,
//!     &[10, 1, -1, 1, 10, -1, -1, 1, 10],
//!     &[11, 10, 10],
//!     &[11, 10, 10],
//! )?;
//!
//! let sequential = solve_sequential(&system, 1e-4)?;
//!
//! // Same solve over three in-process workers
//! let results = LocalGroup::new(3)?.run(|comm| solve_parallel(&system, 1e-4, comm));
//! for x in results {
//!     assert_eq!(x?.to_vec(), sequential.to_vec());
//! }
//! # Ok::<(), jacobi::error::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): split each worker's sweep over threads

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithm;
pub mod comm;
pub mod dtype;
pub mod error;
pub mod ops;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithm::jacobi::{
        JacobiOptions, JacobiResult, jacobi_parallel, jacobi_sequential, row_partition,
        solve_parallel, solve_sequential,
    };
    pub use crate::algorithm::{LinearSystem, RowBlock};
    pub use crate::comm::{Communicator, LocalGroup, SingleProcess};
    pub use crate::dtype::{DType, Element};
    pub use crate::error::{Error, Result};
    pub use crate::ops::{add, matmul2d};
    pub use crate::tensor::{Layout, Tensor};
}
