//! Statevector simulator
//!
//! Owns one amplitude vector and one classical register for the duration of
//! a single run, and interprets circuit operations against them. Gate
//! applications go through the in-place kernel; measurements sample from the
//! Born distribution with the simulator's own random source and collapse the
//! state.
use std::collections::HashMap;
use std::fmt;

use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{trace, warn};

use crate::error::{QuantumError, Result};
use crate::quantum::circuit::{Operation, QuantumCircuit};
use crate::quantum::gate::Gate;
use crate::quantum::gate_operations::apply_gate;
use crate::quantum::register::ClassicalRegister;
use crate::quantum::state::{QuantumState, StateVector};

/// A measurement outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Measurement yielded 0
    Zero,
    /// Measurement yielded 1
    One,
}

impl Outcome {
    pub fn as_bool(self) -> bool {
        self == Outcome::One
    }
}

impl From<bool> for Outcome {
    fn from(bit: bool) -> Self {
        if bit { Outcome::One } else { Outcome::Zero }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Zero => write!(f, "0"),
            Outcome::One => write!(f, "1"),
        }
    }
}

/// Drift thresholds applied after every operation
#[derive(Debug, Clone, Copy)]
pub struct DriftPolicy {
    /// Renormalize when |norm² - 1| exceeds this
    pub renormalize_epsilon: f64,
    /// Log a warning when |norm² - 1| exceeds this
    pub drift_warning: f64,
}

/// A statevector simulator for one run of a circuit program
pub struct StatevectorSimulator<R: Rng = StdRng> {
    /// The current state of the simulator
    state: StateVector,
    /// Classical bits written by measurements
    register: ClassicalRegister,
    /// Random number generator for measurements
    rng: R,
    drift: DriftPolicy,
}

impl StatevectorSimulator<StdRng> {
    /// Create a simulator in |0...0⟩ with a seeded random source
    pub fn with_seed(qubit_count: usize, bit_count: usize, seed: u64) -> Self {
        Self::with_rng(qubit_count, bit_count, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> StatevectorSimulator<R> {
    /// Create a simulator in |0...0⟩ drawing measurement outcomes from `rng`
    pub fn with_rng(qubit_count: usize, bit_count: usize, rng: R) -> Self {
        StatevectorSimulator {
            state: StateVector::zero_state(qubit_count),
            register: ClassicalRegister::new(bit_count),
            rng,
            drift: DriftPolicy {
                renormalize_epsilon: 1e-12,
                drift_warning: 1e-9,
            },
        }
    }

    /// Replace the drift thresholds
    pub fn with_drift_policy(mut self, drift: DriftPolicy) -> Self {
        self.drift = drift;
        self
    }

    /// Get the current state vector
    pub fn state(&self) -> &StateVector {
        &self.state
    }

    /// Get the classical register
    pub fn register(&self) -> &ClassicalRegister {
        &self.register
    }

    /// Get the number of qubits in the simulator
    pub fn qubit_count(&self) -> usize {
        self.state.qubit_count()
    }

    /// Hand back the final state and register
    pub fn into_parts(self) -> (StateVector, ClassicalRegister) {
        (self.state, self.register)
    }

    /// Apply a gate to the state
    pub fn apply_gate(&mut self, gate: &Gate) -> Result<()> {
        apply_gate(&mut self.state, gate)
    }

    /// Probabilities of reading 0 and 1 on a qubit, without collapsing
    pub fn measure_qubit_probability(&self, qubit: usize) -> Result<(f64, f64)> {
        self.check_qubit(qubit)?;

        let mask = 1 << qubit;
        let (mut prob_zero, mut prob_one) = (0.0, 0.0);
        for (index, amp) in self.state.amplitudes().iter().enumerate() {
            if index & mask == 0 {
                prob_zero += amp.norm_sqr();
            } else {
                prob_one += amp.norm_sqr();
            }
        }

        Ok((prob_zero, prob_one))
    }

    /// Joint outcome probabilities of several qubits, without collapsing
    pub fn measure_qubits_probability(&self, qubits: &[usize]) -> Result<HashMap<Vec<Outcome>, f64>> {
        for &q in qubits {
            self.check_qubit(q)?;
        }

        let mut probabilities = HashMap::new();
        for (index, amp) in self.state.amplitudes().iter().enumerate() {
            let prob = amp.norm_sqr();
            if prob > 1e-10 {
                let outcomes: Vec<Outcome> = qubits
                    .iter()
                    .map(|&q| Outcome::from((index >> q) & 1 == 1))
                    .collect();
                *probabilities.entry(outcomes).or_insert(0.0) += prob;
            }
        }

        Ok(probabilities)
    }

    /// Measure a single qubit and collapse the state
    pub fn measure_qubit(&mut self, qubit: usize) -> Result<Outcome> {
        let (prob_zero, prob_one) = self.measure_qubit_probability(qubit)?;
        let total = prob_zero + prob_one;
        if total == 0.0 || !total.is_finite() {
            return Err(QuantumError::DegenerateMeasurement { qubit, outcome: 0 });
        }

        let draw = self.rng.gen::<f64>() * total;
        let (outcome, probability) = if draw < prob_zero {
            (Outcome::Zero, prob_zero)
        } else {
            (Outcome::One, prob_one)
        };

        if probability == 0.0 {
            return Err(QuantumError::DegenerateMeasurement {
                qubit,
                outcome: outcome.as_bool() as u8,
            });
        }

        let mask = 1 << qubit;
        let keep = if outcome.as_bool() { mask } else { 0 };
        let scale = Complex64::new(1.0 / probability.sqrt(), 0.0);
        for (index, amp) in self.state.amplitudes_mut().iter_mut().enumerate() {
            if index & mask == keep {
                *amp *= scale;
            } else {
                *amp = Complex64::new(0.0, 0.0);
            }
        }

        trace!(qubit, %outcome, probability, "measured qubit");
        Ok(outcome)
    }

    /// Measure a qubit and store the outcome in a classical bit
    pub fn measure(&mut self, qubit: usize, bit: usize) -> Result<Outcome> {
        // check the bit first so a bad index leaves the state untouched
        self.register.get(bit)?;
        let outcome = self.measure_qubit(qubit)?;
        self.register.set(bit, outcome.as_bool())?;
        Ok(outcome)
    }

    /// Run every operation of a circuit in program order
    pub fn execute(&mut self, circuit: &QuantumCircuit) -> Result<()> {
        if circuit.qubit_count() != self.qubit_count() {
            return Err(QuantumError::DimensionMismatch {
                expected: self.state.dimension(),
                actual: 1 << circuit.qubit_count(),
            });
        }
        if circuit.bit_count() > self.register.len() {
            return Err(QuantumError::ClassicalBitOutOfRange {
                bit: circuit.bit_count() - 1,
                bit_count: self.register.len(),
            });
        }

        for op in circuit.operations() {
            self.step(op)?;
        }
        Ok(())
    }

    fn step(&mut self, op: &Operation) -> Result<()> {
        match op {
            Operation::ApplyGate(gate) => self.apply_gate(gate)?,
            Operation::Measure { qubit, bit } => {
                self.measure(*qubit, *bit)?;
            }
            Operation::Conditional { condition, operations } => {
                if self.register.read(condition.bit)? == condition.value {
                    for nested in operations {
                        self.step(nested)?;
                    }
                }
                return Ok(());
            }
        }
        self.settle()
    }

    /// Renormalize if floating-point drift has moved the norm off 1
    fn settle(&mut self) -> Result<()> {
        let drift = (self.state.norm_sqr() - 1.0).abs();
        if drift > self.drift.drift_warning {
            warn!(drift, threshold = self.drift.drift_warning, "statevector norm drifted");
        }
        if drift > self.drift.renormalize_epsilon {
            self.state.renormalize()?;
        }
        Ok(())
    }

    fn check_qubit(&self, qubit: usize) -> Result<()> {
        if qubit >= self.qubit_count() {
            return Err(QuantumError::QubitOutOfRange {
                qubit,
                qubit_count: self.qubit_count(),
            });
        }
        Ok(())
    }
}
