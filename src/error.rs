//! Error types for circuit construction and execution

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, QuantumError>;

/// Errors raised while building or running a circuit program
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuantumError {
    #[error("Qubit index {qubit} out of range for {qubit_count}-qubit register")]
    QubitOutOfRange { qubit: usize, qubit_count: usize },

    #[error("Qubit {0} is used as both target and control")]
    OverlappingQubits(usize),

    #[error("Qubit {0} appears more than once in the same qubit list")]
    DuplicateQubit(usize),

    #[error("Matrix dimension mismatch: expected {expected}x{expected}, got {rows}x{cols}")]
    MatrixDimension { expected: usize, rows: usize, cols: usize },

    #[error("Matrix is not unitary (max deviation from identity {deviation:e})")]
    NonUnitary { deviation: f64 },

    #[error("Invalid control pattern: {0}")]
    InvalidControlPattern(String),

    #[error("Classical bit {bit} out of range for {bit_count}-bit register")]
    ClassicalBitOutOfRange { bit: usize, bit_count: usize },

    #[error("Classical bit {0} is read before any measurement writes it")]
    UnmeasuredClassicalBit(usize),

    #[error("Zero probability for outcome {outcome} on qubit {qubit}")]
    DegenerateMeasurement { qubit: usize, outcome: u8 },

    #[error("State vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("State vector is not normalized (norm squared {0})")]
    NotNormalized(f64),

    #[error("Invalid marked state: {0}")]
    InvalidMarkedState(String),

    #[error("Invalid algorithm parameters: {0}")]
    InvalidParameters(String),
}
