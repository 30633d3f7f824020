//! Seeded random stall generation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Decides, one cycle ahead, whether an agent holds its `ready` low.
///
/// The decision is registered: it is drawn in `advance` (called from an
/// agent's `tick`) and only read during evaluation, so repeated evaluation
/// passes within a cycle always see the same answer.
#[derive(Debug, Clone)]
pub struct Backpressure {
    rng: StdRng,
    stall_probability: f64,
    stalled: bool,
}

impl Backpressure {
    /// Stalls each cycle with probability `stall_probability` (clamped to
    /// `0.0..=1.0`), reproducibly for a given `seed`.
    pub fn new(seed: u64, stall_probability: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            stall_probability: stall_probability.clamp(0.0, 1.0),
            stalled: false,
        }
    }

    /// Never stalls.
    pub fn never() -> Self {
        Self::new(0, 0.0)
    }

    /// Whether `ready` is held low this cycle.
    pub fn stalled(&self) -> bool {
        self.stalled
    }

    /// Draws the decision for the next cycle.
    pub fn advance(&mut self) {
        self.stalled = self.stall_probability > 0.0 && self.rng.gen::<f64>() < self.stall_probability;
    }
}

impl Default for Backpressure {
    fn default() -> Self {
        Self::never()
    }
}
