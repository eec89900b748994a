//! Injectable randomness.
//!
//! Game rules only ever ask for a uniform draw in `[0, 1)` or an index, so
//! tests can script exact rolls while the app uses a real generator.

use rand::rngs::StdRng;
use rand::Rng;

pub trait RandomSource {
    /// Uniform draw in `[0, 1)`.
    fn roll(&mut self) -> f64;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick(&mut self, len: usize) -> usize {
        ((self.roll() * len as f64) as usize).min(len.saturating_sub(1))
    }
}

impl RandomSource for StdRng {
    fn roll(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn pick(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

/// Replays a fixed sequence of rolls, cycling when exhausted.
#[cfg(test)]
pub struct ScriptedRolls {
    rolls: Vec<f64>,
    next: usize,
}

#[cfg(test)]
impl ScriptedRolls {
    pub fn new(rolls: &[f64]) -> Self {
        Self {
            rolls: rolls.to_vec(),
            next: 0,
        }
    }
}

#[cfg(test)]
impl RandomSource for ScriptedRolls {
    fn roll(&mut self) -> f64 {
        let r = self.rolls[self.next % self.rolls.len()];
        self.next += 1;
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn pick_stays_in_range() {
        let mut rolls = ScriptedRolls::new(&[0.0, 0.5, 0.999_999]);
        assert_eq!(rolls.pick(4), 0);
        assert_eq!(rolls.pick(4), 2);
        assert_eq!(rolls.pick(4), 3);
    }

    #[test]
    fn std_rng_rolls_in_unit_interval() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let r = rng.roll();
            assert!((0.0..1.0).contains(&r));
        }
    }
}
