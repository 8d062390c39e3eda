// src/quantum/mod.rs
//! Quantum circuit building blocks
//!
//! States, the gate library, the gate application kernel, classical
//! registers and circuit programs.

pub mod state;
pub mod gate;
pub mod gate_operations;
pub mod register;
pub mod circuit;

pub use state::{QuantumState, StateVector, Qubit, MAX_QUBITS, TOLERANCE};
pub use gate::{Gate, QuantumGate, StandardGate, ParametrizedGate};
pub use gate_operations::apply_gate;
pub use register::ClassicalRegister;
pub use circuit::{QuantumCircuit, CircuitBuilder, Operation, Condition};

/// Re-export commonly used types and traits
pub mod prelude {
    pub use super::{QuantumState, StateVector, Qubit};
    pub use super::{Gate, QuantumGate, StandardGate, ParametrizedGate};
    pub use super::{QuantumCircuit, CircuitBuilder, Operation};
    pub use super::ClassicalRegister;
}
