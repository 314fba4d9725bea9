//! Seeded noise generation for the simulated device

use rand::prelude::*;
use rand::rngs::SmallRng;
use rand_distr::StandardNormal;

/// Gaussian noise source with deterministic seeding
pub struct NoiseGenerator {
    rng: SmallRng,
}

impl NoiseGenerator {
    /// Create a new noise generator.
    ///
    /// Seed 0 draws entropy; any other seed reproduces the same sequence.
    pub fn new(seed: u64) -> Self {
        let rng = if seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(seed)
        };
        Self { rng }
    }

    /// Gaussian noise with the given standard deviation
    #[inline]
    pub fn gaussian(&mut self, stddev: f32) -> f32 {
        if stddev == 0.0 {
            return 0.0;
        }
        let n: f32 = self.rng.sample(StandardNormal);
        n * stddev
    }

    /// Returns true with the given probability
    #[inline]
    pub fn chance(&mut self, probability: f32) -> bool {
        self.rng.gen::<f32>() < probability
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_reproducibility() {
        let mut a = NoiseGenerator::new(7);
        let mut b = NoiseGenerator::new(7);

        for _ in 0..100 {
            assert_eq!(a.gaussian(0.5), b.gaussian(0.5));
        }
    }

    #[test]
    fn test_zero_stddev_is_noiseless() {
        let mut noise = NoiseGenerator::new(7);
        for _ in 0..10 {
            assert_eq!(noise.gaussian(0.0), 0.0);
        }
    }

    #[test]
    fn test_chance_extremes() {
        let mut noise = NoiseGenerator::new(7);
        for _ in 0..100 {
            assert!(!noise.chance(0.0));
            assert!(noise.chance(1.0));
        }
    }
}
