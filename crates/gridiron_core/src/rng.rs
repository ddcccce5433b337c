//! Injectable randomness for play resolution.
//!
//! Nothing in play processing may call a platform RNG directly. All
//! probabilistic sub-outcomes flow through an [`OutcomeRng`] handed to the
//! processor at construction, so a fixed seed reproduces a game exactly and
//! tests can disable randomness entirely.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Random source for probabilistic play sub-outcomes.
pub trait OutcomeRng: Send {
    /// Bernoulli trial: returns true with probability `p`.
    fn chance(&mut self, p: f64) -> bool;
}

/// Seeded production RNG. The same seed yields the same roll sequence.
pub struct SeededOutcomeRng {
    inner: ChaCha8Rng,
}

impl SeededOutcomeRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl OutcomeRng for SeededOutcomeRng {
    fn chance(&mut self, p: f64) -> bool {
        if p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.inner.gen::<f64>() < p
    }
}

/// Randomness disabled: every trial fails. Used for deterministic replays
/// and tests that must not depend on roll order.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRandomness;

impl OutcomeRng for NoRandomness {
    fn chance(&mut self, _p: f64) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_rolls() {
        let mut a = SeededOutcomeRng::new(42);
        let mut b = SeededOutcomeRng::new(42);
        for _ in 0..100 {
            assert_eq!(a.chance(0.5), b.chance(0.5));
        }
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = SeededOutcomeRng::new(7);
        for _ in 0..20 {
            assert!(!rng.chance(0.0));
            assert!(rng.chance(1.0));
        }
    }

    #[test]
    fn test_no_randomness_never_fires() {
        let mut rng = NoRandomness;
        for _ in 0..20 {
            assert!(!rng.chance(0.999));
        }
    }
}
