//! Solvers built on the tensor type

pub mod jacobi;
mod system;

pub use system::{LinearSystem, RowBlock};
