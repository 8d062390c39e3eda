// src/quantum/state.rs
//! Quantum state representations
//!
//! Basis indices are little-endian: bit `i` of an index is the value of
//! qubit `i`. Bit strings are printed with the highest qubit on the left, so
//! the ket `|101⟩` of a 3-qubit register is index 5 (qubits 0 and 2 set).

use std::fmt::{self, Debug, Display};
use num_complex::Complex64;
use ndarray::{array, Array1, Array2};

use crate::error::{QuantumError, Result};

/// Tolerance used for normalization and unitarity checks
pub const TOLERANCE: f64 = 1e-9;

/// Largest register a dense statevector is built for
pub const MAX_QUBITS: usize = 32;

/// Fail unless a register of `qubit_count` qubits fits a dense statevector
pub fn check_register_size(qubit_count: usize) -> Result<()> {
    if qubit_count > MAX_QUBITS {
        return Err(QuantumError::InvalidParameters(format!(
            "{} qubits exceeds the limit of {}",
            qubit_count, MAX_QUBITS
        )));
    }
    Ok(())
}

/// Trait for quantum states in different representations
pub trait QuantumState: Clone + Debug {
    /// Returns the number of qubits in this quantum state
    fn qubit_count(&self) -> usize;

    /// Returns the dimension of the Hilbert space (2^n for n qubits)
    fn dimension(&self) -> usize {
        1 << self.qubit_count()
    }

    /// Check if the state is valid (e.g., normalized)
    fn is_valid(&self) -> bool;
}

/// State vector representation of a quantum state
#[derive(Clone, Debug, PartialEq)]
pub struct StateVector {
    /// Number of qubits
    qubit_count: usize,

    /// The state vector as an array of complex amplitudes
    amplitudes: Array1<Complex64>,
}

impl StateVector {
    /// Create a new state vector with the given amplitudes
    pub fn new(qubit_count: usize, amplitudes: Array1<Complex64>) -> Result<Self> {
        check_register_size(qubit_count)?;
        let expected = 1 << qubit_count;

        if amplitudes.len() != expected {
            return Err(QuantumError::DimensionMismatch {
                expected,
                actual: amplitudes.len(),
            });
        }

        let state = StateVector {
            qubit_count,
            amplitudes,
        };

        if !state.is_valid() {
            return Err(QuantumError::NotNormalized(state.norm_sqr()));
        }

        Ok(state)
    }

    /// Create a new state vector in the computational basis state |index⟩
    pub fn computational_basis(qubit_count: usize, index: usize) -> Result<Self> {
        check_register_size(qubit_count)?;
        let dim = 1 << qubit_count;

        if index >= dim {
            return Err(QuantumError::DimensionMismatch {
                expected: dim,
                actual: index + 1,
            });
        }

        let mut amplitudes = Array1::zeros(dim);
        amplitudes[index] = Complex64::new(1.0, 0.0);

        Ok(StateVector {
            qubit_count,
            amplitudes,
        })
    }

    /// Create the zero state |00...0⟩. Callers keep `qubit_count` within
    /// [`MAX_QUBITS`]
    pub fn zero_state(qubit_count: usize) -> Self {
        let mut amplitudes = Array1::zeros(1 << qubit_count);
        amplitudes[0] = Complex64::new(1.0, 0.0);

        StateVector {
            qubit_count,
            amplitudes,
        }
    }

    /// Get a reference to the amplitudes
    pub fn amplitudes(&self) -> &Array1<Complex64> {
        &self.amplitudes
    }

    pub(crate) fn amplitudes_mut(&mut self) -> &mut Array1<Complex64> {
        &mut self.amplitudes
    }

    /// Consume the state and return its amplitudes as a plain vector
    pub fn into_vec(self) -> Vec<Complex64> {
        self.amplitudes.to_vec()
    }

    /// Sum of squared amplitude magnitudes
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|amp| amp.norm_sqr()).sum()
    }

    /// Rescale the amplitudes to unit norm, returning the norm squared seen
    /// before rescaling
    pub fn renormalize(&mut self) -> Result<f64> {
        let norm_sqr = self.norm_sqr();
        if norm_sqr == 0.0 {
            return Err(QuantumError::NotNormalized(norm_sqr));
        }

        let factor = Complex64::new(1.0 / norm_sqr.sqrt(), 0.0);
        self.amplitudes.mapv_inplace(|amp| amp * factor);
        Ok(norm_sqr)
    }

    /// Calculate the probability of measuring the given basis index
    pub fn probability(&self, index: usize) -> f64 {
        if index >= self.dimension() {
            return 0.0;
        }

        self.amplitudes[index].norm_sqr()
    }

    /// Inner product ⟨self|other⟩
    pub fn inner_product(&self, other: &Self) -> Result<Complex64> {
        if self.qubit_count != other.qubit_count {
            return Err(QuantumError::DimensionMismatch {
                expected: self.dimension(),
                actual: other.dimension(),
            });
        }

        Ok(self
            .amplitudes
            .iter()
            .zip(other.amplitudes.iter())
            .map(|(a, b)| a.conj() * b)
            .sum())
    }

    /// Overlap |⟨self|other⟩|², insensitive to global phase
    pub fn fidelity(&self, other: &Self) -> Result<f64> {
        Ok(self.inner_product(other)?.norm_sqr())
    }

    /// Reduced 2x2 density matrix of a single qubit, tracing out all others
    pub fn reduced_density_matrix(&self, qubit: usize) -> Result<Array2<Complex64>> {
        if qubit >= self.qubit_count {
            return Err(QuantumError::QubitOutOfRange {
                qubit,
                qubit_count: self.qubit_count,
            });
        }

        let mask = 1 << qubit;
        let mut rho = Array2::zeros((2, 2));

        for index in 0..self.dimension() {
            if index & mask != 0 {
                continue;
            }
            let a0 = self.amplitudes[index];
            let a1 = self.amplitudes[index | mask];

            rho[[0, 0]] += a0 * a0.conj();
            rho[[0, 1]] += a0 * a1.conj();
            rho[[1, 0]] += a1 * a0.conj();
            rho[[1, 1]] += a1 * a1.conj();
        }

        Ok(rho)
    }

    /// Bloch vector (x, y, z) of a single qubit's reduced state
    pub fn bloch_vector(&self, qubit: usize) -> Result<[f64; 3]> {
        let rho = self.reduced_density_matrix(qubit)?;
        Ok(bloch_from_density(&rho))
    }

    /// Fidelity ⟨ψ|ρ|ψ⟩ between one qubit of this register and a pure
    /// single-qubit state ψ
    pub fn qubit_fidelity(&self, qubit: usize, reference: &Qubit) -> Result<f64> {
        let rho = self.reduced_density_matrix(qubit)?;
        let psi = [reference.alpha, reference.beta];

        let mut overlap = Complex64::new(0.0, 0.0);
        for i in 0..2 {
            for j in 0..2 {
                overlap += psi[i].conj() * rho[[i, j]] * psi[j];
            }
        }

        Ok(overlap.re)
    }
}

impl QuantumState for StateVector {
    fn qubit_count(&self) -> usize {
        self.qubit_count
    }

    fn is_valid(&self) -> bool {
        (self.norm_sqr() - 1.0).abs() < TOLERANCE
    }
}

impl Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}-qubit state:", self.qubit_count)?;

        let threshold = 1e-10;
        let mut has_entries = false;

        for i in 0..self.dimension() {
            let amp = self.amplitudes[i];
            if amp.norm_sqr() > threshold {
                has_entries = true;

                let bit_string = format!("{:0width$b}", i, width = self.qubit_count.max(1));
                write!(f, "  ({:.6}{:+.6}i) |{}⟩", amp.re, amp.im, bit_string)?;
                writeln!(f, " [{:.1}%]", amp.norm_sqr() * 100.0)?;
            }
        }

        if !has_entries {
            writeln!(f, "  (zero state)")?;
        }

        Ok(())
    }
}

fn bloch_from_density(rho: &Array2<Complex64>) -> [f64; 3] {
    [
        2.0 * rho[[0, 1]].re,
        2.0 * rho[[1, 0]].im,
        (rho[[0, 0]] - rho[[1, 1]]).re,
    ]
}

/// A single qubit state, which can be represented more efficiently
#[derive(Clone, Debug, PartialEq)]
pub struct Qubit {
    /// The qubit state in the form α|0⟩ + β|1⟩
    alpha: Complex64,
    beta: Complex64,
}

impl Qubit {
    /// Create a new qubit state
    pub fn new(alpha: Complex64, beta: Complex64) -> Result<Self> {
        let qubit = Qubit { alpha, beta };

        if !qubit.is_valid() {
            return Err(QuantumError::NotNormalized(
                alpha.norm_sqr() + beta.norm_sqr(),
            ));
        }

        Ok(qubit)
    }

    /// Create the |0⟩ state
    pub fn zero() -> Self {
        Qubit {
            alpha: Complex64::new(1.0, 0.0),
            beta: Complex64::new(0.0, 0.0),
        }
    }

    /// Create the |1⟩ state
    pub fn one() -> Self {
        Qubit {
            alpha: Complex64::new(0.0, 0.0),
            beta: Complex64::new(1.0, 0.0),
        }
    }

    /// Create the |+⟩ state
    pub fn plus() -> Self {
        Qubit {
            alpha: Complex64::new(1.0 / 2.0_f64.sqrt(), 0.0),
            beta: Complex64::new(1.0 / 2.0_f64.sqrt(), 0.0),
        }
    }

    /// Create the |-⟩ state
    pub fn minus() -> Self {
        Qubit {
            alpha: Complex64::new(1.0 / 2.0_f64.sqrt(), 0.0),
            beta: Complex64::new(-1.0 / 2.0_f64.sqrt(), 0.0),
        }
    }

    /// Read a single-qubit state vector
    pub fn from_state_vector(state: &StateVector) -> Result<Self> {
        if state.qubit_count() != 1 {
            return Err(QuantumError::DimensionMismatch {
                expected: 2,
                actual: state.dimension(),
            });
        }

        Qubit::new(state.amplitudes()[0], state.amplitudes()[1])
    }

    pub fn alpha(&self) -> Complex64 {
        self.alpha
    }

    pub fn beta(&self) -> Complex64 {
        self.beta
    }

    /// Convert to a StateVector
    pub fn to_state_vector(&self) -> StateVector {
        StateVector {
            qubit_count: 1,
            amplitudes: array![self.alpha, self.beta],
        }
    }

    /// Bloch vector (x, y, z) of this state
    pub fn bloch_vector(&self) -> [f64; 3] {
        let rho = array![
            [self.alpha * self.alpha.conj(), self.alpha * self.beta.conj()],
            [self.beta * self.alpha.conj(), self.beta * self.beta.conj()]
        ];
        bloch_from_density(&rho)
    }
}

impl QuantumState for Qubit {
    fn qubit_count(&self) -> usize {
        1
    }

    fn is_valid(&self) -> bool {
        let norm_sqr = self.alpha.norm_sqr() + self.beta.norm_sqr();
        (norm_sqr - 1.0).abs() < TOLERANCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_reduced_state() {
        // |01⟩ in bit-string order: qubit 0 is 1, qubit 1 is 0
        let state = StateVector::computational_basis(2, 1).unwrap();

        let z0 = state.bloch_vector(0).unwrap()[2];
        let z1 = state.bloch_vector(1).unwrap()[2];
        assert!((z0 + 1.0).abs() < 1e-12);
        assert!((z1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_unnormalized_amplitudes() {
        let amps = array![Complex64::new(1.0, 0.0), Complex64::new(1.0, 0.0)];
        assert!(matches!(
            StateVector::new(1, amps),
            Err(QuantumError::NotNormalized(_))
        ));
    }

    #[test]
    fn test_bloch_vector_of_plus() {
        let [x, y, z] = Qubit::plus().bloch_vector();
        assert!((x - 1.0).abs() < 1e-12);
        assert!(y.abs() < 1e-12);
        assert!(z.abs() < 1e-12);
    }
}
