use ndarray::Array1;
use num_complex::Complex64;

use qpatterns::quantum::{CircuitBuilder, ClassicalRegister, QuantumState, Qubit, StateVector};
use qpatterns::QuantumError;

/// Helper function for comparing f64 with tolerance
fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

#[test]
fn test_zero_state_and_basis_states() {
    let state = StateVector::zero_state(3);
    assert_eq!(state.dimension(), 8);
    assert!(approx_eq(state.probability(0), 1.0, 1e-12));
    assert!(state.is_valid());

    let basis = StateVector::computational_basis(3, 5).unwrap();
    assert!(approx_eq(basis.probability(5), 1.0, 1e-12));
    assert!(matches!(
        StateVector::computational_basis(70, 0),
        Err(QuantumError::InvalidParameters(_))
    ));
    assert!(StateVector::computational_basis(3, 8).is_err());

    // qubits 0 and 2 set
    assert!(basis.to_string().contains("|101⟩"));
}

#[test]
fn test_state_vector_validation() {
    let amplitudes = Array1::from(vec![Complex64::new(0.6, 0.0), Complex64::new(0.0, 0.8)]);
    let state = StateVector::new(1, amplitudes).unwrap();
    assert!(approx_eq(state.norm_sqr(), 1.0, 1e-12));

    let wrong_size = Array1::from(vec![Complex64::new(1.0, 0.0); 3]);
    assert_eq!(
        StateVector::new(1, wrong_size),
        Err(QuantumError::DimensionMismatch { expected: 2, actual: 3 })
    );
}

#[test]
fn test_reduced_state_of_bell_pair_is_mixed() {
    let half = Complex64::new(1.0 / 2.0_f64.sqrt(), 0.0);
    let zero = Complex64::new(0.0, 0.0);
    let bell = StateVector::new(2, Array1::from(vec![half, zero, zero, half])).unwrap();

    let [x, y, z] = bell.bloch_vector(0).unwrap();
    assert!(approx_eq(x, 0.0, 1e-12));
    assert!(approx_eq(y, 0.0, 1e-12));
    assert!(approx_eq(z, 0.0, 1e-12));

    assert!(approx_eq(bell.qubit_fidelity(1, &Qubit::zero()).unwrap(), 0.5, 1e-12));
    assert!(bell.bloch_vector(2).is_err());
}

#[test]
fn test_fidelity_ignores_global_phase() {
    let plus = Qubit::plus().to_state_vector();
    let phase = Complex64::from_polar(1.0, 1.234);
    let shifted = StateVector::new(
        1,
        plus.amplitudes().mapv(|amp| amp * phase),
    )
    .unwrap();

    assert!(approx_eq(plus.fidelity(&shifted).unwrap(), 1.0, 1e-12));
    assert!(approx_eq(plus.fidelity(&Qubit::minus().to_state_vector()).unwrap(), 0.0, 1e-12));
}

#[test]
fn test_renormalize() {
    let amplitudes = Array1::from(vec![Complex64::new(0.6, 0.0), Complex64::new(0.8, 0.0)]);
    let mut state = StateVector::new(1, amplitudes).unwrap();
    state.renormalize().unwrap();
    assert!(approx_eq(state.norm_sqr(), 1.0, 1e-12));
}

#[test]
fn test_classical_register() {
    let mut register = ClassicalRegister::new(3);
    assert_eq!(register.get(1), Ok(None));

    register.set(1, true).unwrap();
    assert_eq!(register.read(1), Ok(true));
    assert_eq!(register.to_string(), "010");
    assert_eq!(
        register.get(3),
        Err(QuantumError::ClassicalBitOutOfRange { bit: 3, bit_count: 3 })
    );
}

#[test]
fn test_circuit_construction_errors() {
    let mut builder = CircuitBuilder::new(2, 1);

    assert_eq!(
        builder.h(2),
        Err(QuantumError::QubitOutOfRange { qubit: 2, qubit_count: 2 })
    );
    assert_eq!(
        builder.measure(0, 1),
        Err(QuantumError::ClassicalBitOutOfRange { bit: 1, bit_count: 1 })
    );
    assert_eq!(
        builder.if_test(0, true, |b| b.x(1)),
        Err(QuantumError::UnmeasuredClassicalBit(0))
    );
    assert!(builder.mcx(&[0], "1", 5).is_err());

    builder.measure(0, 0).unwrap();
    // nested operations are checked too
    assert!(builder.if_test(0, false, |b| b.x(3)).is_err());
    builder.if_test(0, false, |b| b.x(1)).unwrap();

    let circuit = builder.build();
    assert_eq!(circuit.operations().len(), 2);
    assert!(circuit.adjoint().is_err());

    let listing = circuit.to_string();
    assert!(listing.contains("measure q0 -> c0"));
    assert!(listing.contains("if c0 == 0 { X [1] }"));
}
