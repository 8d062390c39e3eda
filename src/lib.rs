//! Statevector circuit core with teleportation and Grover search
//!
//! This crate provides a small quantum circuit execution core: a statevector,
//! a library of unitary gates, an in-place gate application kernel,
//! projective measurement into a classical register, and classically
//! conditioned blocks. Two algorithms are built on top of it: quantum
//! teleportation and Grover search.
//!
//! Basis indices are little-endian (bit `i` is qubit `i`), and every bit
//! string in the public API prints qubit or classical bit 0 rightmost.

pub mod error;
pub mod quantum;
pub mod simulators;
pub mod algorithms;

pub use error::{QuantumError, Result};

// Create a prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{QuantumError, Result};
    pub use crate::quantum::prelude::*;
    pub use crate::simulators::{Counts, Executor, RunResult, SimConfig};
}

// Version and crate information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
