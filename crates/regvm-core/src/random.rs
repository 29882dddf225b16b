//! Random source seam for the randomness syscalls.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform draws needed by syscalls 35, 50 and 75.
pub trait RandomSource {
    /// Uniform integer in `low..=high`. Callers guarantee `low <= high`.
    fn between(&mut self, low: i64, high: i64) -> i64;

    /// Uniform index in `0..len`. Callers guarantee `len > 0`.
    fn index(&mut self, len: usize) -> usize;
}

/// Adapter from any `rand::Rng`
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        RngSource { rng }
    }
}

impl RngSource<StdRng> {
    /// Seeded when `seed` is given, otherwise from OS entropy.
    pub fn from_seed(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        RngSource { rng }
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn between(&mut self, low: i64, high: i64) -> i64 {
        self.rng.gen_range(low..=high)
    }

    fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_sources_agree() {
        let mut a = RngSource::from_seed(Some(11));
        let mut b = RngSource::from_seed(Some(11));
        for _ in 0..16 {
            assert_eq!(a.between(-5, 5), b.between(-5, 5));
            assert_eq!(a.index(7), b.index(7));
        }
    }

    #[test]
    fn draws_stay_in_range() {
        let mut src = RngSource::from_seed(Some(3));
        for _ in 0..200 {
            let n = src.between(1, 3);
            assert!((1..=3).contains(&n));
            assert!(src.index(4) < 4);
        }
        assert_eq!(src.between(9, 9), 9);
    }
}
