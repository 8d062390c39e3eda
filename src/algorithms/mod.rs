//! Algorithms built on the circuit core
//!
//! Quantum teleportation (entanglement plus classically conditioned
//! correction) and Grover search (amplitude amplification).

pub mod grover;
pub mod teleportation;

pub use grover::{amplification_circuit, grover_circuit, grover_iterations, run_grover, GroverReport};
pub use teleportation::{run_teleportation, teleport, teleportation_circuit, EulerAngles, TeleportationReport};
