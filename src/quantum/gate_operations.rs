// src/quantum/gate_operations.rs
//! Gate application kernel
//!
//! Applies a gate's 2^k x 2^k matrix to the amplitudes of a statevector,
//! restricted to the gate's target qubits. Every basis index is visited once
//! per group of 2^k indices that share the same values on all non-target
//! qubits; only groups whose control bits match the activation pattern are
//! rewritten.

use num_complex::Complex64;

use crate::error::{QuantumError, Result};
use crate::quantum::gate::Gate;
use crate::quantum::state::{QuantumState, StateVector};

/// Apply `gate` to `state` in place
pub fn apply_gate(state: &mut StateVector, gate: &Gate) -> Result<()> {
    let qubit_count = state.qubit_count();
    gate.validate_for(qubit_count)?;

    let targets = gate.targets();
    let k = targets.len();
    let sub_dim = 1usize << k;

    let (rows, cols) = gate.matrix().dim();
    if rows != sub_dim || cols != sub_dim {
        return Err(QuantumError::MatrixDimension { expected: sub_dim, rows, cols });
    }

    let target_mask: usize = targets.iter().map(|&t| 1 << t).sum();
    let (control_mask, control_value) = control_masks(gate);

    // offsets[s] is the full-register bit pattern for gate-local index s;
    // gate-local bit (k - 1 - j) belongs to targets[j]
    let offsets: Vec<usize> = (0..sub_dim)
        .map(|s| {
            targets
                .iter()
                .enumerate()
                .filter(|(j, _)| (s >> (k - 1 - j)) & 1 == 1)
                .map(|(_, &t)| 1 << t)
                .sum()
        })
        .collect();

    let matrix = gate.matrix();
    let amplitudes = state.amplitudes_mut();
    let mut group = vec![Complex64::new(0.0, 0.0); sub_dim];

    for base in 0..amplitudes.len() {
        if (base & target_mask) != 0 || (base & control_mask) != control_value {
            continue;
        }

        for (slot, &offset) in group.iter_mut().zip(offsets.iter()) {
            *slot = amplitudes[base | offset];
        }

        for (row, &offset) in offsets.iter().enumerate() {
            let mut acc = Complex64::new(0.0, 0.0);
            for (col, amp) in group.iter().enumerate() {
                acc += matrix[[row, col]] * amp;
            }
            amplitudes[base | offset] = acc;
        }
    }

    Ok(())
}

fn control_masks(gate: &Gate) -> (usize, usize) {
    gate.controls()
        .iter()
        .zip(gate.control_pattern().iter())
        .fold((0, 0), |(mask, value), (&q, &bit)| {
            (mask | 1 << q, if bit { value | 1 << q } else { value })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantum::gate::StandardGate;

    #[test]
    fn test_cnot_matrix_uses_first_target_as_control() {
        // qubit 1 set, CNOT [1, 0] flips qubit 0 -> index 3
        let mut state = StateVector::computational_basis(2, 2).unwrap();
        let cnot = Gate::from_gate(&StandardGate::CNOT, &[1, 0]).unwrap();
        apply_gate(&mut state, &cnot).unwrap();
        assert!((state.probability(3) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_unmatched_controls_pass_through() {
        let mut state = StateVector::zero_state(3);
        let gate = Gate::mcx(&[0, 1], "11", 2).unwrap();
        apply_gate(&mut state, &gate).unwrap();
        assert!((state.probability(0) - 1.0).abs() < 1e-12);

        let gate = Gate::mcx(&[0, 1], "00", 2).unwrap();
        apply_gate(&mut state, &gate).unwrap();
        assert!((state.probability(4) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_target_is_rejected() {
        let mut state = StateVector::zero_state(2);
        let gate = Gate::from_gate(&StandardGate::H, &[2]).unwrap();
        assert_eq!(
            apply_gate(&mut state, &gate),
            Err(QuantumError::QubitOutOfRange { qubit: 2, qubit_count: 2 })
        );
    }
}
