//! Grover search
//!
//! Starts from the uniform superposition and repeats an oracle (phase flip
//! on each marked basis state) followed by a diffuser (inversion about the
//! mean) `round(π / (4·asin(√(M/2ⁿ))))` times, then measures every qubit.
//!
//! Both the oracle and the diffuser act on the highest qubit `t = n - 1` as
//! `H · MCX · H`, which is a multi-controlled Z. The remaining qubits are
//! the controls, and their activation pattern selects the basis state that
//! picks up the phase. Marked states are bit strings with qubit 0 rightmost,
//! so `"101"` sets qubits 0 and 2.

use std::f64::consts::PI;

use tracing::info;

use crate::error::{QuantumError, Result};
use crate::quantum::circuit::{CircuitBuilder, QuantumCircuit};
use crate::simulators::executor::{Counts, Executor, SimConfig};

/// Number of oracle + diffuser rounds for `marked_count` solutions among
/// `2^qubit_count` basis states
pub fn grover_iterations(qubit_count: usize, marked_count: usize) -> Result<usize> {
    if qubit_count == 0 || qubit_count >= usize::BITS as usize {
        return Err(QuantumError::InvalidParameters(format!(
            "cannot search a {}-qubit register",
            qubit_count
        )));
    }
    let space = 1usize << qubit_count;
    if marked_count == 0 || marked_count > space {
        return Err(QuantumError::InvalidParameters(format!(
            "{} marked states in a space of {}",
            marked_count, space
        )));
    }

    let alpha = (marked_count as f64 / space as f64).sqrt().asin();
    // halves round to even, so a fully marked space gets zero rounds
    Ok((PI / (4.0 * alpha)).round_ties_even() as usize)
}

/// Parse a marked bit string into a basis index
pub fn parse_marked_state(bits: &str, qubit_count: usize) -> Result<usize> {
    if bits.len() != qubit_count || !bits.chars().all(|c| c == '0' || c == '1') {
        return Err(QuantumError::InvalidMarkedState(format!(
            "\"{}\" is not a {}-bit string",
            bits, qubit_count
        )));
    }
    usize::from_str_radix(bits, 2)
        .map_err(|e| QuantumError::InvalidMarkedState(format!("\"{}\": {}", bits, e)))
}

/// Control-activation string for qubits 0..n-1 taken from `index`, with
/// qubit 0 rightmost
fn control_pattern(index: usize, controls: &[usize]) -> String {
    controls
        .iter()
        .rev()
        .map(|&q| if (index >> q) & 1 == 1 { '1' } else { '0' })
        .collect()
}

fn highest_qubit(builder: &CircuitBuilder) -> Result<usize> {
    builder
        .qubit_count()
        .checked_sub(1)
        .ok_or_else(|| QuantumError::InvalidParameters("empty register".to_string()))
}

/// Phase-flip the basis state `marked`
pub fn append_oracle(builder: &mut CircuitBuilder, marked: usize) -> Result<()> {
    let target = highest_qubit(builder)?;
    let controls: Vec<usize> = (0..target).collect();
    let pattern = control_pattern(marked, &controls);
    let flip_target = (marked >> target) & 1 == 0;

    if flip_target {
        builder.x(target)?;
    }
    builder.h(target)?;
    builder.mcx(&controls, &pattern, target)?;
    builder.h(target)?;
    if flip_target {
        builder.x(target)?;
    }
    Ok(())
}

/// Inversion about the mean: reflect about |0...0⟩ in the Hadamard basis
pub fn append_diffuser(builder: &mut CircuitBuilder) -> Result<()> {
    let target = highest_qubit(builder)?;
    let controls: Vec<usize> = (0..target).collect();
    let pattern = "0".repeat(controls.len());

    builder.h_all()?;
    builder.x(target)?;
    builder.h(target)?;
    builder.mcx(&controls, &pattern, target)?;
    builder.h(target)?;
    builder.x(target)?;
    builder.h_all()
}

fn build(qubit_count: usize, marked: &[&str], measure: bool) -> Result<(QuantumCircuit, usize)> {
    let mut indices = Vec::with_capacity(marked.len());
    for bits in marked {
        let index = parse_marked_state(bits, qubit_count)?;
        if indices.contains(&index) {
            return Err(QuantumError::InvalidMarkedState(format!("\"{}\" listed twice", bits)));
        }
        indices.push(index);
    }

    let iterations = grover_iterations(qubit_count, indices.len())?;
    let mut builder = CircuitBuilder::new(qubit_count, qubit_count);

    builder.h_all()?;
    for _ in 0..iterations {
        for &index in &indices {
            append_oracle(&mut builder, index)?;
        }
        append_diffuser(&mut builder)?;
    }

    if measure {
        builder.measure_all()?;
    }
    Ok((builder.build(), iterations))
}

/// Grover program over `qubit_count` qubits, measuring qubit i into bit i
pub fn grover_circuit(qubit_count: usize, marked: &[&str]) -> Result<QuantumCircuit> {
    build(qubit_count, marked, true).map(|(circuit, _)| circuit)
}

/// The same program without the final measurements, for statevector inspection
pub fn amplification_circuit(qubit_count: usize, marked: &[&str]) -> Result<QuantumCircuit> {
    build(qubit_count, marked, false).map(|(circuit, _)| circuit)
}

/// Outcome of a sampled Grover search
#[derive(Debug, Clone)]
pub struct GroverReport {
    pub marked: Vec<String>,
    pub iterations: usize,
    pub counts: Counts,
}

/// Build and sample a Grover search for `config.shots` shots
pub fn run_grover(qubit_count: usize, marked: &[&str], config: &SimConfig) -> Result<GroverReport> {
    let (circuit, iterations) = build(qubit_count, marked, true)?;
    info!(qubit_count, iterations, shots = config.shots, "running grover search");

    let counts = Executor::new(config.clone()).sample(&circuit)?;
    if let Some((key, count)) = counts.most_frequent() {
        info!(outcome = key, count, "grover search finished");
    }

    Ok(GroverReport {
        marked: marked.iter().map(|s| s.to_string()).collect(),
        iterations,
        counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oracle_pattern_for_101() {
        assert_eq!(control_pattern(0b101, &[0, 1]), "01");
        assert_eq!(control_pattern(0b000, &[0, 1]), "00");
    }

    #[test]
    fn test_marked_state_validation() {
        assert_eq!(parse_marked_state("101", 3).unwrap(), 5);
        assert!(parse_marked_state("10", 3).is_err());
        assert!(parse_marked_state("1x1", 3).is_err());
        assert!(grover_circuit(3, &["101", "101"]).is_err());
    }
}
