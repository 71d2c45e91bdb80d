//! Per-scenario pseudo-random number generator.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

/// Weyl-sequence increment of SplitMix64 (2⁶⁴ / φ).
const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

/// SplitMix64 output function (a bijection on `u64`).
#[inline]
fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Derives the seed of scenario `index` from a run's base seed.
///
/// This is the `index`-th output of a SplitMix64 generator started at
/// `base_seed`; distinct indices always give distinct seeds.
///
/// # Examples
///
/// ```rust
/// use forecast_engine::rng::derive_stream_seed;
///
/// assert_eq!(derive_stream_seed(1, 0), derive_stream_seed(1, 0));
/// assert_ne!(derive_stream_seed(1, 0), derive_stream_seed(1, 1));
/// ```
#[inline]
pub fn derive_stream_seed(base_seed: u64, index: u64) -> u64 {
    mix64(base_seed.wrapping_add(GOLDEN_GAMMA.wrapping_mul(index.wrapping_add(1))))
}

/// Draws a fresh base seed from the thread-local entropy source.
///
/// Used when no seed is configured; the drawn seed is recorded in the
/// simulation result so the run can be replayed.
pub fn random_base_seed() -> u64 {
    rand::random()
}

/// Seeded generator for the standard-normal draws of one scenario.
///
/// Wraps `rand::rngs::StdRng` and samples with the Ziggurat algorithm
/// via `rand_distr::StandardNormal`.
///
/// # Examples
///
/// ```rust
/// use forecast_engine::rng::ScenarioRng;
///
/// let mut rng = ScenarioRng::from_seed(12345);
/// let mut buffer = vec![0.0; 4];
/// rng.fill_normal(&mut buffer);
/// assert_eq!(rng.seed(), 12345);
/// ```
pub struct ScenarioRng {
    inner: StdRng,
    seed: u64,
}

impl ScenarioRng {
    /// Creates a generator initialised with `seed`.
    #[inline]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Creates the generator owned by scenario `index` of a run.
    #[inline]
    pub fn for_scenario(base_seed: u64, index: usize) -> Self {
        Self::from_seed(derive_stream_seed(base_seed, index as u64))
    }

    /// Seed used for initialisation.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draws one standard normal variate.
    #[inline]
    pub fn gen_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.inner)
    }

    /// Fills `buffer` with standard normal variates.
    #[inline]
    pub fn fill_normal(&mut self, buffer: &mut [f64]) {
        for value in buffer.iter_mut() {
            *value = StandardNormal.sample(&mut self.inner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_reproducibility() {
        let mut rng1 = ScenarioRng::from_seed(12345);
        let mut rng2 = ScenarioRng::from_seed(12345);

        for _ in 0..100 {
            assert_eq!(rng1.gen_normal(), rng2.gen_normal());
        }
    }

    #[test]
    fn test_scenario_streams_differ() {
        let mut a = ScenarioRng::for_scenario(42, 0);
        let mut b = ScenarioRng::for_scenario(42, 1);

        let xs: Vec<f64> = (0..16).map(|_| a.gen_normal()).collect();
        let ys: Vec<f64> = (0..16).map(|_| b.gen_normal()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn test_stream_seed_recorded() {
        let rng = ScenarioRng::for_scenario(9, 3);
        assert_eq!(rng.seed(), derive_stream_seed(9, 3));
    }

    #[test]
    fn test_derived_seeds_unique() {
        let mut seeds: Vec<u64> = (0..10_000).map(|i| derive_stream_seed(7, i)).collect();
        seeds.sort_unstable();
        seeds.dedup();
        assert_eq!(seeds.len(), 10_000);
    }

    #[test]
    fn test_fill_normal_moments() {
        let mut rng = ScenarioRng::from_seed(2024);
        let mut buffer = vec![0.0; 200_000];
        rng.fill_normal(&mut buffer);

        let n = buffer.len() as f64;
        let mean = buffer.iter().sum::<f64>() / n;
        let var = buffer.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);

        assert!(mean.abs() < 0.01, "mean {} too far from 0", mean);
        assert!((var - 1.0).abs() < 0.02, "variance {} too far from 1", var);
    }

    #[test]
    fn test_empty_buffer() {
        let mut rng = ScenarioRng::from_seed(1);
        let mut empty: Vec<f64> = vec![];
        rng.fill_normal(&mut empty);
    }
}
