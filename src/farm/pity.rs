//! Pity counter: every failed spawn attempt raises the next attempt's chance.

use serde::{Deserialize, Serialize};

use super::tuning::PITY_STEP;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PityCounter {
    failures: u32,
}

impl PityCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Record the outcome of a spawn attempt made while a slot was free.
    pub fn on_attempt(&mut self, success: bool) {
        if success {
            self.failures = 0;
        } else {
            self.failures = self.failures.saturating_add(1);
        }
    }

    /// `min(base_chance + failures * PITY_STEP, 1.0)`.
    pub fn gated_probability(&self, base_chance: f64) -> f64 {
        (base_chance + self.failures as f64 * PITY_STEP).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_increments_success_resets() {
        let mut pity = PityCounter::new();
        pity.on_attempt(false);
        pity.on_attempt(false);
        assert_eq!(pity.failures(), 2);
        pity.on_attempt(true);
        assert_eq!(pity.failures(), 0);
    }

    #[test]
    fn probability_rises_then_caps() {
        let mut pity = PityCounter::new();
        assert!((pity.gated_probability(0.01) - 0.01).abs() < 1e-12);
        pity.on_attempt(false);
        assert!((pity.gated_probability(0.01) - 0.02).abs() < 1e-12);
        for _ in 0..500 {
            pity.on_attempt(false);
        }
        assert!((pity.gated_probability(0.01) - 1.0).abs() < 1e-12);
    }
}
