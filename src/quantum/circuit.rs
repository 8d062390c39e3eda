// src/quantum/circuit.rs
//! Circuit programs
//!
//! A [`QuantumCircuit`] is a flat, ordered list of [`Operation`]s: gate
//! applications, measurements into classical bits, and blocks that only run
//! when a classical bit holds a given value. Programs are checked as they are
//! built, so a finished circuit can be executed any number of times.

use std::fmt;

use crate::error::{QuantumError, Result};
use crate::quantum::gate::{Gate, ParametrizedGate, QuantumGate, StandardGate};

/// Predicate on a single classical bit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Condition {
    pub bit: usize,
    pub value: bool,
}

/// One step of a circuit program
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    /// Apply a unitary to the statevector
    ApplyGate(Gate),

    /// Measure a qubit in the computational basis and store the outcome
    Measure { qubit: usize, bit: usize },

    /// Run `operations` only if the condition holds at this point
    Conditional {
        condition: Condition,
        operations: Vec<Operation>,
    },
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::ApplyGate(gate) => {
                write!(f, "{} {:?}", gate.name(), gate.targets())?;
                if !gate.controls().is_empty() {
                    let pattern: String = gate
                        .control_pattern()
                        .iter()
                        .rev()
                        .map(|&bit| if bit { '1' } else { '0' })
                        .collect();
                    write!(f, " ctrl {:?}={}", gate.controls(), pattern)?;
                }
                Ok(())
            }
            Operation::Measure { qubit, bit } => write!(f, "measure q{} -> c{}", qubit, bit),
            Operation::Conditional { condition, operations } => {
                write!(f, "if c{} == {} {{", condition.bit, condition.value as u8)?;
                for (i, op) in operations.iter().enumerate() {
                    let sep = if i == 0 { " " } else { "; " };
                    write!(f, "{}{}", sep, op)?;
                }
                write!(f, " }}")
            }
        }
    }
}

/// A quantum circuit program over a fixed number of qubits and classical bits
#[derive(Clone, Debug, PartialEq)]
pub struct QuantumCircuit {
    qubit_count: usize,
    bit_count: usize,
    operations: Vec<Operation>,
    /// Bits unconditionally written by a top-level measurement so far
    measured: Vec<bool>,
}

impl QuantumCircuit {
    /// Create a new empty quantum circuit
    pub fn new(qubit_count: usize, bit_count: usize) -> Self {
        QuantumCircuit {
            qubit_count,
            bit_count,
            operations: Vec::new(),
            measured: vec![false; bit_count],
        }
    }

    pub fn qubit_count(&self) -> usize {
        self.qubit_count
    }

    pub fn bit_count(&self) -> usize {
        self.bit_count
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of gate applications, including those inside conditional blocks
    pub fn gate_count(&self) -> usize {
        fn count(ops: &[Operation]) -> usize {
            ops.iter()
                .map(|op| match op {
                    Operation::ApplyGate(_) => 1,
                    Operation::Measure { .. } => 0,
                    Operation::Conditional { operations, .. } => count(operations),
                })
                .sum()
        }
        count(&self.operations)
    }

    /// Whether the program contains any measurement
    pub fn has_measurements(&self) -> bool {
        fn any(ops: &[Operation]) -> bool {
            ops.iter().any(|op| match op {
                Operation::ApplyGate(_) => false,
                Operation::Measure { .. } => true,
                Operation::Conditional { operations, .. } => any(operations),
            })
        }
        any(&self.operations)
    }

    /// Append an operation after checking it against the program so far
    pub fn push(&mut self, operation: Operation) -> Result<()> {
        self.check(&operation)?;

        if let Operation::Measure { bit, .. } = operation {
            self.measured[bit] = true;
        }
        self.operations.push(operation);
        Ok(())
    }

    fn check(&self, operation: &Operation) -> Result<()> {
        match operation {
            Operation::ApplyGate(gate) => gate.validate_for(self.qubit_count),
            Operation::Measure { qubit, bit } => {
                if *qubit >= self.qubit_count {
                    return Err(QuantumError::QubitOutOfRange {
                        qubit: *qubit,
                        qubit_count: self.qubit_count,
                    });
                }
                self.check_bit(*bit)
            }
            Operation::Conditional { condition, operations } => {
                self.check_bit(condition.bit)?;
                if !self.measured[condition.bit] {
                    return Err(QuantumError::UnmeasuredClassicalBit(condition.bit));
                }
                operations.iter().try_for_each(|op| self.check(op))
            }
        }
    }

    fn check_bit(&self, bit: usize) -> Result<()> {
        if bit >= self.bit_count {
            return Err(QuantumError::ClassicalBitOutOfRange {
                bit,
                bit_count: self.bit_count,
            });
        }
        Ok(())
    }

    /// Create the adjoint (inverse) of a measurement-free circuit
    pub fn adjoint(&self) -> Result<Self> {
        let mut result = QuantumCircuit::new(self.qubit_count, self.bit_count);

        // Add the gates in reverse order, with each gate replaced by its adjoint
        for op in self.operations.iter().rev() {
            match op {
                Operation::ApplyGate(gate) => result.push(Operation::ApplyGate(gate.adjoint()))?,
                _ => {
                    return Err(QuantumError::InvalidParameters(
                        "only measurement-free, unconditional circuits have an adjoint".to_string(),
                    ))
                }
            }
        }

        Ok(result)
    }
}

impl fmt::Display for QuantumCircuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "circuit: {} qubits, {} bits", self.qubit_count, self.bit_count)?;
        for op in &self.operations {
            writeln!(f, "  {}", op)?;
        }
        Ok(())
    }
}

/// A builder for quantum circuits
pub struct CircuitBuilder {
    circuit: QuantumCircuit,
}

impl CircuitBuilder {
    /// Create a new circuit builder
    pub fn new(qubit_count: usize, bit_count: usize) -> Self {
        CircuitBuilder {
            circuit: QuantumCircuit::new(qubit_count, bit_count),
        }
    }

    /// Build the quantum circuit
    pub fn build(self) -> QuantumCircuit {
        self.circuit
    }

    pub fn qubit_count(&self) -> usize {
        self.circuit.qubit_count
    }

    /// Add an already constructed gate
    pub fn gate(&mut self, gate: Gate) -> Result<()> {
        self.circuit.push(Operation::ApplyGate(gate))
    }

    /// Add a library gate on the given qubits
    pub fn add_gate<G: QuantumGate>(&mut self, gate: G, qubits: &[usize]) -> Result<()> {
        self.gate(Gate::from_gate(&gate, qubits)?)
    }

    /// Add a Hadamard gate
    pub fn h(&mut self, qubit: usize) -> Result<()> {
        self.add_gate(StandardGate::H, &[qubit])
    }

    /// Add a Hadamard gate on every qubit
    pub fn h_all(&mut self) -> Result<()> {
        (0..self.qubit_count()).try_for_each(|q| self.h(q))
    }

    /// Add a Pauli-X gate
    pub fn x(&mut self, qubit: usize) -> Result<()> {
        self.add_gate(StandardGate::X, &[qubit])
    }

    /// Add a Pauli-Z gate
    pub fn z(&mut self, qubit: usize) -> Result<()> {
        self.add_gate(StandardGate::Z, &[qubit])
    }

    /// Add a CNOT gate
    pub fn cnot(&mut self, control: usize, target: usize) -> Result<()> {
        self.add_gate(StandardGate::CNOT, &[control, target])
    }

    /// Add a multi-controlled X with a control-activation string like `"01"`
    pub fn mcx(&mut self, controls: &[usize], pattern: &str, target: usize) -> Result<()> {
        self.gate(Gate::mcx(controls, pattern, target)?)
    }

    /// Add an Rx gate
    pub fn rx(&mut self, qubit: usize, theta: f64) -> Result<()> {
        self.add_gate(ParametrizedGate::Rx(theta), &[qubit])
    }

    /// Add an Ry gate
    pub fn ry(&mut self, qubit: usize, theta: f64) -> Result<()> {
        self.add_gate(ParametrizedGate::Ry(theta), &[qubit])
    }

    /// Add an Rz gate
    pub fn rz(&mut self, qubit: usize, theta: f64) -> Result<()> {
        self.add_gate(ParametrizedGate::Rz(theta), &[qubit])
    }

    /// Create a Bell pair (entangled state)
    pub fn bell_pair(&mut self, qubit1: usize, qubit2: usize) -> Result<()> {
        self.h(qubit1)?;
        self.cnot(qubit1, qubit2)
    }

    /// Measure a qubit into a classical bit
    pub fn measure(&mut self, qubit: usize, bit: usize) -> Result<()> {
        self.circuit.push(Operation::Measure { qubit, bit })
    }

    /// Measure qubit `i` into bit `i` for every qubit
    pub fn measure_all(&mut self) -> Result<()> {
        (0..self.qubit_count()).try_for_each(|q| self.measure(q, q))
    }

    /// Add a block that only runs when classical `bit` reads `value`.
    ///
    /// The bit must already be written by an earlier top-level measurement.
    pub fn if_test<F>(&mut self, bit: usize, value: bool, body: F) -> Result<()>
    where
        F: FnOnce(&mut CircuitBuilder) -> Result<()>,
    {
        let mut block = CircuitBuilder {
            circuit: QuantumCircuit {
                operations: Vec::new(),
                ..self.circuit.clone()
            },
        };
        body(&mut block)?;

        self.circuit.push(Operation::Conditional {
            condition: Condition { bit, value },
            operations: block.circuit.operations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conditional_requires_prior_measurement() {
        let mut builder = CircuitBuilder::new(2, 2);
        let err = builder.if_test(0, true, |b| b.x(1)).unwrap_err();
        assert_eq!(err, QuantumError::UnmeasuredClassicalBit(0));

        builder.measure(0, 0).unwrap();
        builder.if_test(0, true, |b| b.x(1)).unwrap();
        assert_eq!(builder.build().gate_count(), 1);
    }

    #[test]
    fn test_adjoint_reverses_gates() {
        let mut builder = CircuitBuilder::new(1, 0);
        builder.h(0).unwrap();
        builder.rz(0, 0.5).unwrap();
        let circuit = builder.build();

        let adjoint = circuit.adjoint().unwrap();
        match &adjoint.operations()[0] {
            Operation::ApplyGate(gate) => assert_eq!(gate.name(), "Rz(0.5000)†"),
            other => panic!("unexpected operation {}", other),
        }
    }
}
