// src/quantum/gate.rs
//! Quantum gates implementation
//!
//! A [`Gate`] is a unitary matrix bound to the qubits it acts on, plus an
//! optional list of control qubits with the values they must read for the
//! matrix to fire.
//!
//! Matrix indexing: for a k-qubit matrix applied to targets `[t0, .., tk-1]`,
//! `t0` is the most significant bit of the row/column index. CNOT on
//! `[control, target]` therefore keeps its textbook matrix.

use std::fmt::Debug;
use num_complex::Complex64;
use ndarray::{array, Array2};

use crate::error::{QuantumError, Result};
use super::state::TOLERANCE;

/// Common complex numbers used in quantum gates
pub mod constants {
    use num_complex::Complex64;

    /// The imaginary unit i
    pub const I: Complex64 = Complex64::new(0.0, 1.0);

    /// 1/sqrt(2)
    pub const FRAC_1_SQRT_2: f64 = std::f64::consts::FRAC_1_SQRT_2;
}

/// Trait for named gate matrices
pub trait QuantumGate: Debug + Send + Sync {
    /// Returns the number of qubits this gate acts on
    fn qubit_count(&self) -> usize;

    /// Returns the matrix representation of this gate
    fn matrix(&self) -> Array2<Complex64>;

    /// Returns a display name for this gate
    fn name(&self) -> String;
}

/// Fixed gates of the library
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StandardGate {
    /// Pauli-X gate (NOT gate)
    X,

    /// Pauli-Y gate
    Y,

    /// Pauli-Z gate
    Z,

    /// Hadamard gate
    H,

    /// π/8 gate (T gate)
    T,

    /// CNOT gate
    CNOT,
}

impl QuantumGate for StandardGate {
    fn qubit_count(&self) -> usize {
        match self {
            StandardGate::X | StandardGate::Y | StandardGate::Z |
            StandardGate::H | StandardGate::T => 1,
            StandardGate::CNOT => 2,
        }
    }

    fn matrix(&self) -> Array2<Complex64> {
        use constants::*;
        let zero = Complex64::new(0.0, 0.0);
        let one = Complex64::new(1.0, 0.0);

        match self {
            StandardGate::X => array![[zero, one], [one, zero]],
            StandardGate::Y => array![[zero, -I], [I, zero]],
            StandardGate::Z => array![[one, zero], [zero, -one]],
            StandardGate::H => {
                let factor = Complex64::new(FRAC_1_SQRT_2, 0.0);
                array![
                    [factor, factor],
                    [factor, -factor]
                ]
            },
            StandardGate::T => {
                array![
                    [one, zero],
                    [zero, Complex64::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2)]
                ]
            },
            StandardGate::CNOT => {
                array![
                    [one, zero, zero, zero],
                    [zero, one, zero, zero],
                    [zero, zero, zero, one],
                    [zero, zero, one, zero]
                ]
            },
        }
    }

    fn name(&self) -> String {
        match self {
            StandardGate::X => "X".to_string(),
            StandardGate::Y => "Y".to_string(),
            StandardGate::Z => "Z".to_string(),
            StandardGate::H => "H".to_string(),
            StandardGate::T => "T".to_string(),
            StandardGate::CNOT => "CNOT".to_string(),
        }
    }
}

/// Parametrized single-qubit gates
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParametrizedGate {
    /// Rotation around X-axis
    Rx(f64),

    /// Rotation around Y-axis
    Ry(f64),

    /// Rotation around Z-axis
    Rz(f64),

    /// General single-qubit unitary with Euler angles
    U3(f64, f64, f64),
}

impl QuantumGate for ParametrizedGate {
    fn qubit_count(&self) -> usize {
        1
    }

    fn matrix(&self) -> Array2<Complex64> {
        match self {
            ParametrizedGate::Rx(theta) => {
                let cos = (theta / 2.0).cos();
                let sin = (theta / 2.0).sin();
                array![
                    [Complex64::new(cos, 0.0), Complex64::new(0.0, -sin)],
                    [Complex64::new(0.0, -sin), Complex64::new(cos, 0.0)]
                ]
            },
            ParametrizedGate::Ry(theta) => {
                let cos = (theta / 2.0).cos();
                let sin = (theta / 2.0).sin();
                array![
                    [Complex64::new(cos, 0.0), Complex64::new(-sin, 0.0)],
                    [Complex64::new(sin, 0.0), Complex64::new(cos, 0.0)]
                ]
            },
            ParametrizedGate::Rz(theta) => {
                let phase_pos = Complex64::new(0.0, theta / 2.0).exp();
                let phase_neg = Complex64::new(0.0, -theta / 2.0).exp();
                array![
                    [phase_neg, Complex64::new(0.0, 0.0)],
                    [Complex64::new(0.0, 0.0), phase_pos]
                ]
            },
            ParametrizedGate::U3(theta, phi, lambda) => {
                let cos = (theta / 2.0).cos();
                let sin = (theta / 2.0).sin();
                array![
                    [
                        Complex64::new(cos, 0.0),
                        -Complex64::from_polar(1.0, *lambda) * sin
                    ],
                    [
                        Complex64::from_polar(1.0, *phi) * sin,
                        Complex64::from_polar(1.0, phi + lambda) * cos
                    ]
                ]
            },
        }
    }

    fn name(&self) -> String {
        match self {
            ParametrizedGate::Rx(theta) => format!("Rx({:.4})", theta),
            ParametrizedGate::Ry(theta) => format!("Ry({:.4})", theta),
            ParametrizedGate::Rz(theta) => format!("Rz({:.4})", theta),
            ParametrizedGate::U3(theta, phi, lambda) => {
                format!("U3({:.4}, {:.4}, {:.4})", theta, phi, lambda)
            },
        }
    }
}

/// Largest entry-wise deviation of U†U from the identity
pub fn unitarity_deviation(matrix: &Array2<Complex64>) -> f64 {
    let product = conjugate_transpose(matrix).dot(matrix);
    let dim = matrix.nrows();

    let mut deviation: f64 = 0.0;
    for i in 0..dim {
        for j in 0..dim {
            let expected = if i == j { 1.0 } else { 0.0 };
            deviation = deviation.max((product[[i, j]] - Complex64::new(expected, 0.0)).norm());
        }
    }
    deviation
}

fn conjugate_transpose(matrix: &Array2<Complex64>) -> Array2<Complex64> {
    matrix.t().mapv(|entry| entry.conj())
}

/// Parse a control-activation pattern such as `"01"`.
///
/// The rightmost character belongs to the first control qubit, matching the
/// way bit strings are printed.
pub fn parse_control_pattern(pattern: &str) -> Result<Vec<bool>> {
    pattern
        .chars()
        .rev()
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            other => Err(QuantumError::InvalidControlPattern(format!(
                "unexpected character '{}' in \"{}\"",
                other, pattern
            ))),
        })
        .collect()
}

fn check_distinct(qubits: &[usize]) -> Result<()> {
    for (i, q) in qubits.iter().enumerate() {
        if qubits[i + 1..].contains(q) {
            return Err(QuantumError::DuplicateQubit(*q));
        }
    }
    Ok(())
}

/// A unitary bound to target qubits, optionally gated on control qubits
#[derive(Clone, Debug, PartialEq)]
pub struct Gate {
    name: String,
    matrix: Array2<Complex64>,
    targets: Vec<usize>,
    controls: Vec<usize>,
    control_pattern: Vec<bool>,
}

impl Gate {
    /// Bind a matrix to target qubits.
    ///
    /// Fails if the matrix is not 2^k x 2^k for k targets, is not unitary, or
    /// if a target is listed twice.
    pub fn new(name: impl Into<String>, matrix: Array2<Complex64>, targets: &[usize]) -> Result<Self> {
        let expected = 1usize << targets.len();
        let (rows, cols) = matrix.dim();
        if rows != expected || cols != expected {
            return Err(QuantumError::MatrixDimension { expected, rows, cols });
        }

        check_distinct(targets)?;

        // NaN entries make the deviation NaN, which must not pass as unitary
        let deviation = unitarity_deviation(&matrix);
        if !(deviation <= TOLERANCE) {
            return Err(QuantumError::NonUnitary { deviation });
        }

        Ok(Gate {
            name: name.into(),
            matrix,
            targets: targets.to_vec(),
            controls: Vec::new(),
            control_pattern: Vec::new(),
        })
    }

    /// Bind a library gate to target qubits
    pub fn from_gate(gate: &dyn QuantumGate, targets: &[usize]) -> Result<Self> {
        Gate::new(gate.name(), gate.matrix(), targets)
    }

    /// Gate the matrix on control qubits reading `pattern`
    /// (`pattern[i]` is the required value of `controls[i]`)
    pub fn with_controls(mut self, controls: &[usize], pattern: &[bool]) -> Result<Self> {
        if controls.len() != pattern.len() {
            return Err(QuantumError::InvalidControlPattern(format!(
                "{} controls but pattern has {} bits",
                controls.len(),
                pattern.len()
            )));
        }

        check_distinct(controls)?;
        if let Some(q) = controls.iter().find(|q| self.targets.contains(q)) {
            return Err(QuantumError::OverlappingQubits(*q));
        }

        self.controls = controls.to_vec();
        self.control_pattern = pattern.to_vec();
        Ok(self)
    }

    /// Multi-controlled X with a control-activation string such as `"01"`
    pub fn mcx(controls: &[usize], pattern: &str, target: usize) -> Result<Self> {
        let pattern = parse_control_pattern(pattern)?;
        Gate::from_gate(&StandardGate::X, &[target])?.with_controls(controls, &pattern)
    }

    /// Check that every qubit index fits a register of `qubit_count` qubits
    pub fn validate_for(&self, qubit_count: usize) -> Result<()> {
        match self.qubits().find(|&q| q >= qubit_count) {
            Some(qubit) => Err(QuantumError::QubitOutOfRange { qubit, qubit_count }),
            None => Ok(()),
        }
    }

    /// The inverse gate: conjugate transpose on the same qubits
    pub fn adjoint(&self) -> Gate {
        Gate {
            name: format!("{}†", self.name),
            matrix: conjugate_transpose(&self.matrix),
            targets: self.targets.clone(),
            controls: self.controls.clone(),
            control_pattern: self.control_pattern.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matrix(&self) -> &Array2<Complex64> {
        &self.matrix
    }

    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    pub fn controls(&self) -> &[usize] {
        &self.controls
    }

    pub fn control_pattern(&self) -> &[bool] {
        &self.control_pattern
    }

    /// All qubits touched by this gate, targets first
    pub fn qubits(&self) -> impl Iterator<Item = usize> + '_ {
        self.targets.iter().chain(self.controls.iter()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_pattern_is_read_right_to_left() {
        assert_eq!(parse_control_pattern("01").unwrap(), vec![true, false]);
        assert!(parse_control_pattern("0a").is_err());
    }

    #[test]
    fn test_library_gates_are_unitary() {
        let gates: Vec<Box<dyn QuantumGate>> = vec![
            Box::new(StandardGate::X),
            Box::new(StandardGate::Y),
            Box::new(StandardGate::H),
            Box::new(StandardGate::T),
            Box::new(StandardGate::CNOT),
            Box::new(StandardGate::Z),
            Box::new(ParametrizedGate::Rx(0.3)),
            Box::new(ParametrizedGate::U3(1.0, 2.0, 3.0)),
        ];

        for gate in gates {
            assert!(unitarity_deviation(&gate.matrix()) < TOLERANCE, "{}", gate.name());
        }
    }
}
