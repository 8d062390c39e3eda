//! Circuit executor
//!
//! Runs a finished circuit program either once, returning the final state, or
//! for many independent shots, returning a histogram of classical register
//! contents. Every shot gets a fresh state, a fresh register and its own
//! random source seeded from `base_seed + shot_index`, so a fixed seed gives
//! the same counts whether shots run on the rayon pool or sequentially.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::quantum::circuit::QuantumCircuit;
use crate::quantum::register::ClassicalRegister;
use crate::quantum::state::{check_register_size, StateVector};
use crate::simulators::statevector::{DriftPolicy, StatevectorSimulator};

/// Configuration for simulation runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Base seed for measurement randomness. `None` draws one from OS entropy
    pub seed: Option<u64>,
    /// Number of shots used by [`Executor::sample`]
    pub shots: usize,
    /// Run shots on the rayon thread pool
    pub parallel: bool,
    /// Renormalize the state when |norm² - 1| exceeds this
    pub renormalize_epsilon: f64,
    /// Warn when |norm² - 1| exceeds this
    pub drift_warning: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            seed: None,
            shots: 1024,
            parallel: true,
            renormalize_epsilon: 1e-12,
            drift_warning: 1e-9,
        }
    }
}

impl SimConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_shots(mut self, shots: usize) -> Self {
        self.shots = shots;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Final state and register of a single run
#[derive(Debug, Clone)]
pub struct RunResult {
    pub state: StateVector,
    pub register: ClassicalRegister,
}

/// Histogram of classical register contents over many shots.
///
/// Keys are bit strings with classical bit 0 rightmost.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    counts: BTreeMap<String, usize>,
}

impl Counts {
    pub fn new() -> Self {
        Counts::default()
    }

    /// Record one observation of `key`
    pub fn record(&mut self, key: impl Into<String>) {
        *self.counts.entry(key.into()).or_insert(0) += 1;
    }

    /// Add every observation of `other` to this histogram
    pub fn merge(&mut self, other: Counts) {
        for (key, count) in other.counts {
            *self.counts.entry(key).or_insert(0) += count;
        }
    }

    pub fn get(&self, key: &str) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Total number of shots recorded
    pub fn shots(&self) -> usize {
        self.counts.values().sum()
    }

    /// Observed frequency of `key`, 0 for an empty histogram
    pub fn probability(&self, key: &str) -> f64 {
        let shots = self.shots();
        if shots == 0 {
            return 0.0;
        }
        self.get(key) as f64 / shots as f64
    }

    /// The most frequently observed key (ties go to the smallest key)
    pub fn most_frequent(&self) -> Option<(&str, usize)> {
        self.counts
            .iter()
            .fold(None, |best: Option<(&str, usize)>, (key, &count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((key.as_str(), count)),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(key, &count)| (key.as_str(), count))
    }

    pub fn as_map(&self) -> &BTreeMap<String, usize> {
        &self.counts
    }
}

impl fmt::Display for Counts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, count) in &self.counts {
            writeln!(f, "{}: {}", key, count)?;
        }
        Ok(())
    }
}

/// Runs circuit programs against fresh simulators
#[derive(Debug, Clone, Default)]
pub struct Executor {
    config: SimConfig,
}

impl Executor {
    pub fn new(config: SimConfig) -> Self {
        Executor { config }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Run the circuit once from |0...0⟩
    pub fn run(&self, circuit: &QuantumCircuit) -> Result<RunResult> {
        let seed = self.base_seed();
        debug!(
            qubits = circuit.qubit_count(),
            bits = circuit.bit_count(),
            operations = circuit.operations().len(),
            seed,
            "running circuit"
        );
        self.run_seeded(circuit, seed)
    }

    /// Run `config.shots` independent shots and count register outcomes
    pub fn sample(&self, circuit: &QuantumCircuit) -> Result<Counts> {
        self.sample_until(circuit, &AtomicBool::new(false))
    }

    /// Like [`Executor::sample`], but skips all shots not yet started once
    /// `stop` is set. Counts from completed shots are returned as usual.
    pub fn sample_until(&self, circuit: &QuantumCircuit, stop: &AtomicBool) -> Result<Counts> {
        check_register_size(circuit.qubit_count())?;
        let base_seed = self.base_seed();
        let shots = self.config.shots;
        debug!(shots, base_seed, parallel = self.config.parallel, "sampling circuit");

        let shot = |index: usize| -> Option<Result<String>> {
            if stop.load(Ordering::Relaxed) {
                return None;
            }
            let seed = base_seed.wrapping_add(index as u64);
            Some(
                self.run_seeded(circuit, seed)
                    .map(|result| result.register.to_bit_string()),
            )
        };

        let keys: Vec<Option<Result<String>>> = if self.config.parallel {
            (0..shots).into_par_iter().map(shot).collect()
        } else {
            (0..shots).map(shot).collect()
        };

        let mut counts = Counts::new();
        for key in keys.into_iter().flatten() {
            counts.record(key?);
        }

        debug!(completed = counts.shots(), requested = shots, "sampling finished");
        Ok(counts)
    }

    fn run_seeded(&self, circuit: &QuantumCircuit, seed: u64) -> Result<RunResult> {
        check_register_size(circuit.qubit_count())?;
        let mut simulator =
            StatevectorSimulator::with_seed(circuit.qubit_count(), circuit.bit_count(), seed)
                .with_drift_policy(DriftPolicy {
                    renormalize_epsilon: self.config.renormalize_epsilon,
                    drift_warning: self.config.drift_warning,
                });

        simulator.execute(circuit)?;

        let (state, register) = simulator.into_parts();
        Ok(RunResult { state, register })
    }

    fn base_seed(&self) -> u64 {
        self.config.seed.unwrap_or_else(rand::random)
    }
}
