use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;

use qpatterns::algorithms::grover::{amplification_circuit, grover_circuit, grover_iterations, parse_marked_state, run_grover};
use qpatterns::algorithms::teleportation::{run_teleportation, teleport, teleportation_circuit, EulerAngles};
use qpatterns::simulators::{Executor, SimConfig};

/// Helper function for comparing f64 with tolerance
fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

#[test]
fn test_teleportation_fidelity_for_random_states() {
    let mut rng = StdRng::seed_from_u64(12345);
    let mut outcome_pairs = HashSet::new();

    for shot in 0..100 {
        let angles = EulerAngles::random(&mut rng);
        let executor = Executor::new(SimConfig::default().with_seed(shot));
        let report = teleport(angles, &executor).unwrap();

        assert!(
            approx_eq(report.fidelity, 1.0, 1e-9),
            "fidelity {} for {:?} with outcomes {:?}",
            report.fidelity,
            angles,
            report.outcomes
        );

        // The Bloch vectors agree as well
        let expected = report.initial.bloch_vector();
        let actual = report.final_state.bloch_vector(2).unwrap();
        for axis in 0..3 {
            assert!(approx_eq(expected[axis], actual[axis], 1e-9));
        }

        outcome_pairs.insert(report.outcomes);
    }

    // every correction branch was exercised
    assert_eq!(outcome_pairs.len(), 4);
}

#[test]
fn test_teleportation_angles_in_range() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..1000 {
        let angles = EulerAngles::random(&mut rng);
        for angle in [angles.theta, angles.phi, angles.lambda] {
            assert!((0.0..2.0 * std::f64::consts::PI).contains(&angle));
        }
    }
}

#[test]
fn test_teleportation_circuit_layout() {
    let circuit = teleportation_circuit(&EulerAngles::new(0.1, 0.2, 0.3)).unwrap();
    assert_eq!(circuit.qubit_count(), 3);
    assert_eq!(circuit.bit_count(), 3);
    // three rotations, H + CNOT, CNOT + H, and the two corrections
    assert_eq!(circuit.gate_count(), 9);
    assert!(circuit.has_measurements());
}

#[test]
fn test_run_teleportation_is_reproducible() {
    let config = SimConfig::default().with_seed(77);
    let first = run_teleportation(&config).unwrap();
    let second = run_teleportation(&config).unwrap();

    assert_eq!(first.angles, second.angles);
    assert_eq!(first.outcomes, second.outcomes);
    assert_eq!(first.final_state, second.final_state);
    assert!(approx_eq(first.fidelity, 1.0, 1e-9));
}

#[test]
fn test_grover_iteration_counts() {
    // for two qubits the raw count is 1.4999999999999998, just under a half
    let expected = [(2, 1), (3, 2), (4, 3), (5, 4), (6, 6)];
    for (qubits, iterations) in expected {
        let alpha = (1.0 / (1u64 << qubits) as f64).sqrt().asin();
        let formula = (std::f64::consts::PI / (4.0 * alpha)).round_ties_even() as usize;

        assert_eq!(grover_iterations(qubits, 1).unwrap(), formula);
        assert_eq!(formula, iterations);
    }

    // every state marked: π/(4·π/2) is exactly one half and rounds to zero
    assert_eq!(grover_iterations(2, 4).unwrap(), 0);
    assert_eq!(grover_iterations(1, 2).unwrap(), 0);

    assert!(grover_iterations(0, 1).is_err());
    assert!(grover_iterations(3, 0).is_err());
    assert!(grover_iterations(3, 9).is_err());
}

#[test]
fn test_grover_finds_101_in_three_qubits() {
    let config = SimConfig::default().with_seed(2024).with_shots(1024);
    let report = run_grover(3, &["101"], &config).unwrap();

    assert_eq!(report.iterations, 2);
    assert_eq!(report.counts.shots(), 1024);
    assert_eq!(report.counts.most_frequent().map(|(key, _)| key), Some("101"));
    assert!(report.counts.get("101") > 900);
}

#[test]
fn test_grover_amplitude_matches_closed_form() {
    for qubits in 2..=6 {
        let all_ones = "1".repeat(qubits);
        let all_zeros = "0".repeat(qubits);
        let alternating: String = (0..qubits).map(|i| if i % 2 == 0 { '1' } else { '0' }).collect();

        for marked in [all_ones, all_zeros, alternating] {
            let circuit = amplification_circuit(qubits, &[marked.as_str()]).unwrap();
            let result = Executor::new(SimConfig::default().with_seed(0)).run(&circuit).unwrap();

            let k = grover_iterations(qubits, 1).unwrap() as f64;
            let alpha = (1.0 / (1u64 << qubits) as f64).sqrt().asin();
            let expected = ((2.0 * k + 1.0) * alpha).sin().powi(2);

            let index = parse_marked_state(&marked, qubits).unwrap();
            assert!(
                approx_eq(result.state.probability(index), expected, 1e-9),
                "{} qubits, marked {}",
                qubits,
                marked
            );
            assert!(expected > 0.9);
        }
    }
}

#[test]
fn test_grover_three_qubit_probability() {
    let circuit = amplification_circuit(3, &["101"]).unwrap();
    let result = Executor::new(SimConfig::default().with_seed(0)).run(&circuit).unwrap();

    assert!(approx_eq(result.state.probability(0b101), 0.9453, 1e-3));
    // the residual probability is shared evenly
    for index in (0..8).filter(|&i| i != 0b101) {
        assert!(approx_eq(result.state.probability(index), (1.0 - 0.9453) / 7.0, 1e-3));
    }
}

#[test]
fn test_grover_with_two_marked_states() {
    let marked = ["0110", "1001"];
    let circuit = amplification_circuit(4, &marked).unwrap();
    let result = Executor::new(SimConfig::default().with_seed(0)).run(&circuit).unwrap();

    let k = grover_iterations(4, 2).unwrap() as f64;
    let alpha = (2.0_f64 / 16.0).sqrt().asin();
    let expected = ((2.0 * k + 1.0) * alpha).sin().powi(2);

    let found = result.state.probability(0b0110) + result.state.probability(0b1001);
    assert!(approx_eq(found, expected, 1e-9));
    assert!(approx_eq(result.state.probability(0b0110), result.state.probability(0b1001), 1e-12));
}

#[test]
fn test_grover_circuit_measures_every_qubit() {
    let circuit = grover_circuit(4, &["0011"]).unwrap();
    assert_eq!(circuit.bit_count(), 4);
    assert!(circuit.has_measurements());
    assert!(grover_circuit(3, &["1111"]).is_err());
}
