//! Quantum circuit simulators
//!
//! This module provides the statevector simulator and the executor that
//! drives it over one or many shots.

pub mod executor;
pub mod statevector;

pub use executor::{Counts, Executor, RunResult, SimConfig};
pub use statevector::{DriftPolicy, Outcome, StatevectorSimulator};
