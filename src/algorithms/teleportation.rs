//! Quantum teleportation
//!
//! Qubit 0 is rotated into an arbitrary state, qubits 1 and 2 share a Bell
//! pair, and a Bell-basis measurement of qubits 0 and 1 followed by
//! classically controlled X and Z corrections moves the state onto qubit 2.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::error::Result;
use crate::quantum::circuit::{CircuitBuilder, QuantumCircuit};
use crate::quantum::gate::{Gate, ParametrizedGate};
use crate::quantum::gate_operations::apply_gate;
use crate::quantum::state::{Qubit, StateVector};
use crate::simulators::executor::{Executor, SimConfig};

/// Rotation angles that prepare the state to teleport: Ry(theta), then
/// Rz(phi), then Rx(lambda), all on qubit 0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerAngles {
    pub theta: f64,
    pub phi: f64,
    pub lambda: f64,
}

impl EulerAngles {
    pub fn new(theta: f64, phi: f64, lambda: f64) -> Self {
        EulerAngles { theta, phi, lambda }
    }

    /// Draw each angle independently and uniformly from [0, 2π)
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        EulerAngles {
            theta: rng.gen_range(0.0..2.0 * PI),
            phi: rng.gen_range(0.0..2.0 * PI),
            lambda: rng.gen_range(0.0..2.0 * PI),
        }
    }

    fn rotations(&self) -> [ParametrizedGate; 3] {
        [
            ParametrizedGate::Ry(self.theta),
            ParametrizedGate::Rz(self.phi),
            ParametrizedGate::Rx(self.lambda),
        ]
    }

    /// The single-qubit state the rotations produce from |0⟩
    pub fn prepare(&self) -> Result<Qubit> {
        let mut state = StateVector::zero_state(1);
        for rotation in self.rotations() {
            apply_gate(&mut state, &Gate::from_gate(&rotation, &[0])?)?;
        }
        Qubit::from_state_vector(&state)
    }
}

/// Outcome of one teleportation run
#[derive(Debug, Clone)]
pub struct TeleportationReport {
    pub angles: EulerAngles,
    /// State of qubit 0 right after preparation
    pub initial: Qubit,
    /// Full 3-qubit state at the end of the protocol
    pub final_state: StateVector,
    /// Classical bits 0 and 1
    pub outcomes: [bool; 2],
    /// ⟨ψ|ρ₂|ψ⟩ between the prepared state and qubit 2's reduced state
    pub fidelity: f64,
}

/// Build the 3-qubit, 3-bit teleportation program
pub fn teleportation_circuit(angles: &EulerAngles) -> Result<QuantumCircuit> {
    let mut builder = CircuitBuilder::new(3, 3);

    for rotation in angles.rotations() {
        builder.add_gate(rotation, &[0])?;
    }

    builder.bell_pair(1, 2)?;

    builder.cnot(0, 1)?;
    builder.h(0)?;

    builder.measure(0, 0)?;
    builder.measure(1, 1)?;

    builder.if_test(1, true, |b| b.x(2))?;
    builder.if_test(0, true, |b| b.z(2))?;

    Ok(builder.build())
}

/// Teleport the state prepared by `angles` and compare the result
pub fn teleport(angles: EulerAngles, executor: &Executor) -> Result<TeleportationReport> {
    let initial = angles.prepare()?;
    let circuit = teleportation_circuit(&angles)?;
    let result = executor.run(&circuit)?;

    let fidelity = result.state.qubit_fidelity(2, &initial)?;
    let outcomes = [result.register.read(0)?, result.register.read(1)?];

    Ok(TeleportationReport {
        angles,
        initial,
        final_state: result.state,
        outcomes,
        fidelity,
    })
}

/// Draw random angles and teleport the resulting state
pub fn run_teleportation(config: &SimConfig) -> Result<TeleportationReport> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let angles = EulerAngles::random(&mut rng);
    info!(theta = angles.theta, phi = angles.phi, lambda = angles.lambda, "teleporting random state");

    let report = teleport(angles, &Executor::new(config.clone()))?;
    info!(
        m0 = report.outcomes[0],
        m1 = report.outcomes[1],
        fidelity = report.fidelity,
        "teleportation finished"
    );
    Ok(report)
}
