//! Sources of per-tick relative price changes.
//!
//! The generator owns one `Perturbation`. Production uses `UniformPerturbation`, a
//! uniform draw from `[-max_change, +max_change]` backed by its own `StdRng`; passing a
//! seed makes the walk reproducible. `FixedPerturbation` returns the same change every
//! time and is handy for freezing prices.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default relative change bound per tick (±0.1%).
pub const DEFAULT_MAX_CHANGE: f64 = 0.001;

/// Produces the relative change applied to one symbol on one tick.
pub trait Perturbation: Send {
    fn next_change(&mut self) -> f64;
}

/// Uniform random walk step.
pub struct UniformPerturbation {
    rng: StdRng,
    max_change: f64,
}

impl UniformPerturbation {
    /// Seeded from the OS entropy source.
    pub fn new(max_change: f64) -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            max_change: max_change.abs(),
        }
    }

    /// Deterministic sequence for a given seed.
    pub fn seeded(max_change: f64, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            max_change: max_change.abs(),
        }
    }
}

impl Perturbation for UniformPerturbation {
    fn next_change(&mut self) -> f64 {
        self.rng.random_range(-self.max_change..=self.max_change)
    }
}

/// Always returns the wrapped change.
#[derive(Debug, Clone, Copy)]
pub struct FixedPerturbation(pub f64);

impl Perturbation for FixedPerturbation {
    fn next_change(&mut self) -> f64 {
        self.0
    }
}
