//! Randomized leveling.
//!
//! The lowest level of a skip list contains every key, and each level above
//! it contains a random subset of the level below. Upon insertion, the new
//! key's tower height is drawn from a [`LevelGenerator`]; the default
//! [`CoinFlip`] implementation flips a fair coin until it lands tails.

use rand::{Rng, SeedableRng, rngs::SmallRng};
use thiserror::Error;

// ////////////////////////////////////////////////////////////////////////////
// Level Generator
// ////////////////////////////////////////////////////////////////////////////

/// Decides how tall each newly inserted key's tower grows.
pub trait LevelGenerator {
    /// The total number of levels that are assumed to exist.
    #[must_use]
    fn total(&self) -> usize;

    /// Draw the top level index for a new tower, in the range `[0, total)`.
    #[must_use]
    fn level(&mut self) -> usize;
}

/// Errors that can occur when creating a [`CoinFlip`] generator.
#[derive(Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum CoinFlipError {
    /// At least one level must exist.
    #[error("total must be non-zero.")]
    ZeroLevels,
}

/// A fair-coin level generator.
///
/// A new tower starts on the bottom level and grows one level for every
/// consecutive heads, stopping at the first tails or at the level cap. The
/// resulting heights follow a geometric distribution: a tower reaches level
/// `$n$` with probability `$2^{-n}$`, truncated at the maximum number of
/// levels allowed.
///
/// Each generator owns its random source, so lists never share randomness
/// through global state.
#[derive(Debug)]
pub struct CoinFlip {
    /// The total number of levels that are assumed to exist.
    total: usize,
    /// The random number generator.
    rng: SmallRng,
}

impl CoinFlip {
    /// Create a generator for `total` levels, seeded from the process
    /// entropy source.
    ///
    /// # Errors
    ///
    /// `total` must be at least 1.
    #[inline]
    pub fn new(total: usize) -> Result<Self, CoinFlipError> {
        Self::from_rng(total, SmallRng::from_rng(&mut rand::rng()))
    }

    /// Create a generator for `total` levels with a fixed seed.
    ///
    /// Two generators built from the same seed produce the same flips, so a
    /// list built on top of one is reproducible.
    ///
    /// # Errors
    ///
    /// `total` must be at least 1.
    #[inline]
    pub fn with_seed(total: usize, seed: u64) -> Result<Self, CoinFlipError> {
        Self::from_rng(total, SmallRng::seed_from_u64(seed))
    }

    fn from_rng(total: usize, rng: SmallRng) -> Result<Self, CoinFlipError> {
        if total == 0 {
            return Err(CoinFlipError::ZeroLevels);
        }
        Ok(CoinFlip { total, rng })
    }
}

impl LevelGenerator for CoinFlip {
    #[inline]
    fn total(&self) -> usize {
        self.total
    }

    #[inline]
    fn level(&mut self) -> usize {
        let mut level = 0;
        while level + 1 < self.total && self.rng.random_bool(0.5) {
            level += 1;
        }
        level
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Tests
// ////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{CoinFlip, CoinFlipError, LevelGenerator};

    #[test]
    fn zero_levels() {
        assert_eq!(CoinFlip::new(0).err(), Some(CoinFlipError::ZeroLevels));
        assert_eq!(
            CoinFlip::with_seed(0, 1).err(),
            Some(CoinFlipError::ZeroLevels)
        );
    }

    #[rstest]
    fn level_in_range(
        #[values(1, 2, 8, 16)] total: usize,
        #[values(0, 1, 0xDEAD_BEEF)] seed: u64,
    ) -> Result<()> {
        let mut generator = CoinFlip::with_seed(total, seed)?;
        assert_eq!(generator.total(), total);
        for _ in 0..10_000 {
            let level = generator.level();
            assert!((0..total).contains(&level));
        }
        Ok(())
    }

    #[test]
    fn single_level_is_constant() -> Result<()> {
        let mut generator = CoinFlip::with_seed(1, 3)?;
        for _ in 0..1000 {
            assert_eq!(generator.level(), 0);
        }
        Ok(())
    }

    #[test]
    fn seeded_generators_agree() -> Result<()> {
        let mut a = CoinFlip::with_seed(16, 99)?;
        let mut b = CoinFlip::with_seed(16, 99)?;
        for _ in 0..1000 {
            assert_eq!(a.level(), b.level());
        }
        Ok(())
    }

    /// The fraction of draws reaching level `$k$` should approach
    /// `$2^{-k}$`.
    #[test]
    fn geometric_distribution() -> Result<()> {
        let mut generator = CoinFlip::with_seed(16, 0x5EED)?;
        let samples = 100_000_usize;
        let mut at_least = [0_usize; 5];
        for _ in 0..samples {
            let level = generator.level();
            for (k, slot) in at_least.iter_mut().enumerate() {
                if level >= k {
                    *slot += 1;
                }
            }
        }
        for (k, &count) in at_least.iter().enumerate() {
            let expected = (samples as f64) * 0.5_f64.powi(k as i32);
            let tolerance = (samples as f64) * 0.01;
            assert!(
                ((count as f64) - expected).abs() < tolerance,
                "level >= {k}: observed {count}, expected about {expected}"
            );
        }
        Ok(())
    }
}
