//! Deterministic random sources used by world generation.
//!
//! Two generators exist: the xoroshiro128++ source used by modern worlds and the
//! Java LCG source kept for legacy seeds and a few fixed-seed noises. Both can be
//! split into a [`PositionalRandom`] that derives independent streams from a
//! block position, a seed or a resource name.

pub mod gaussian;
pub mod legacy_random;
pub mod xoroshiro;

use legacy_random::{LegacyRandom, LegacyRandomSplitter};
use xoroshiro::{Xoroshiro, XoroshiroSplitter};

/// A source of pseudo-random values.
pub trait Random {
    /// Splits off an independent generator, advancing this one.
    #[must_use]
    fn fork(&mut self) -> Self
    where
        Self: Sized;

    /// Returns the next uniformly distributed `i32`.
    fn next_i32(&mut self) -> i32;

    /// Returns a value in `0..bound`. `bound` must be positive.
    fn next_i32_bounded(&mut self, bound: i32) -> i32;

    /// Returns the next uniformly distributed `i64`.
    fn next_i64(&mut self) -> i64;

    /// Returns a value in `[0, 1)`.
    fn next_f32(&mut self) -> f32;

    /// Returns a value in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Returns the next random boolean.
    fn next_bool(&mut self) -> bool;

    /// Returns a normally distributed value with mean 0 and deviation 1.
    fn next_gaussian(&mut self) -> f64;

    /// Derives a positional factory from this generator, advancing it.
    fn next_positional(&mut self) -> RandomSplitter;

    /// Returns a value in `min..=max`.
    fn next_i32_between(&mut self, min: i32, max: i32) -> i32 {
        min + self.next_i32_bounded(max - min + 1)
    }

    /// Returns a value in `min..max`.
    fn next_i32_between_exclusive(&mut self, min: i32, max: i32) -> i32 {
        min + self.next_i32_bounded(max - min)
    }

    /// Returns a value in `mode ± deviation`, weighted towards `mode`.
    fn triangle(&mut self, mode: f64, deviation: f64) -> f64 {
        mode + deviation * (self.next_f64() - self.next_f64())
    }

    /// Discards `count` values.
    fn consume_count(&mut self, count: i32) {
        for _ in 0..count {
            self.next_i32();
        }
    }
}

/// Derives independent random streams from positions, seeds or names.
pub trait PositionalRandom {
    /// A generator for the given block position.
    fn at(&self, x: i32, y: i32, z: i32) -> RandomSource;

    /// A generator for the given name, usually a resource location.
    fn with_hash_of(&self, name: &str) -> RandomSource;

    /// A generator for the given seed.
    fn with_seed(&self, seed: u64) -> RandomSource;
}

/// Any of the supported random generators.
pub enum RandomSource {
    /// xoroshiro128++.
    Xoroshiro(Xoroshiro),
    /// The Java LCG.
    Legacy(LegacyRandom),
}

impl RandomSource {
    /// Creates a generator of the requested kind from a world seed.
    #[must_use]
    pub fn create(seed: u64, legacy: bool) -> Self {
        if legacy {
            Self::Legacy(LegacyRandom::from_seed(seed))
        } else {
            Self::Xoroshiro(Xoroshiro::from_seed(seed))
        }
    }
}

/// Any of the supported positional factories.
#[derive(Debug, Clone)]
pub enum RandomSplitter {
    /// Splits xoroshiro128++ streams.
    Xoroshiro(XoroshiroSplitter),
    /// Splits Java LCG streams.
    Legacy(LegacyRandomSplitter),
}

impl Random for RandomSource {
    fn fork(&mut self) -> Self {
        match self {
            Self::Xoroshiro(r) => Self::Xoroshiro(r.fork()),
            Self::Legacy(r) => Self::Legacy(r.fork()),
        }
    }

    fn next_i32(&mut self) -> i32 {
        match self {
            Self::Xoroshiro(r) => r.next_i32(),
            Self::Legacy(r) => r.next_i32(),
        }
    }

    fn next_i32_bounded(&mut self, bound: i32) -> i32 {
        match self {
            Self::Xoroshiro(r) => r.next_i32_bounded(bound),
            Self::Legacy(r) => r.next_i32_bounded(bound),
        }
    }

    fn next_i64(&mut self) -> i64 {
        match self {
            Self::Xoroshiro(r) => r.next_i64(),
            Self::Legacy(r) => r.next_i64(),
        }
    }

    fn next_f32(&mut self) -> f32 {
        match self {
            Self::Xoroshiro(r) => r.next_f32(),
            Self::Legacy(r) => r.next_f32(),
        }
    }

    fn next_f64(&mut self) -> f64 {
        match self {
            Self::Xoroshiro(r) => r.next_f64(),
            Self::Legacy(r) => r.next_f64(),
        }
    }

    fn next_bool(&mut self) -> bool {
        match self {
            Self::Xoroshiro(r) => r.next_bool(),
            Self::Legacy(r) => r.next_bool(),
        }
    }

    fn next_gaussian(&mut self) -> f64 {
        match self {
            Self::Xoroshiro(r) => r.next_gaussian(),
            Self::Legacy(r) => r.next_gaussian(),
        }
    }

    fn next_positional(&mut self) -> RandomSplitter {
        match self {
            Self::Xoroshiro(r) => r.next_positional(),
            Self::Legacy(r) => r.next_positional(),
        }
    }

    fn consume_count(&mut self, count: i32) {
        match self {
            Self::Xoroshiro(r) => r.consume_count(count),
            Self::Legacy(r) => r.consume_count(count),
        }
    }
}

impl PositionalRandom for RandomSplitter {
    fn at(&self, x: i32, y: i32, z: i32) -> RandomSource {
        match self {
            Self::Xoroshiro(s) => s.at(x, y, z),
            Self::Legacy(s) => s.at(x, y, z),
        }
    }

    fn with_hash_of(&self, name: &str) -> RandomSource {
        match self {
            Self::Xoroshiro(s) => s.with_hash_of(name),
            Self::Legacy(s) => s.with_hash_of(name),
        }
    }

    fn with_seed(&self, seed: u64) -> RandomSource {
        match self {
            Self::Xoroshiro(s) => s.with_seed(seed),
            Self::Legacy(s) => s.with_seed(seed),
        }
    }
}

/// Hashes a block position into a seed. `x * 3129871` wraps in 32 bits.
#[must_use]
pub fn get_seed(x: i32, y: i32, z: i32) -> i64 {
    let l = i64::from(x.wrapping_mul(3_129_871))
        ^ i64::from(z).wrapping_mul(116_129_781)
        ^ i64::from(y);
    let l = l
        .wrapping_mul(l)
        .wrapping_mul(42_317_861)
        .wrapping_add(l.wrapping_mul(11));
    l >> 16
}

/// Java's `String.hashCode`, used for legacy name hashing and text seeds.
#[must_use]
pub fn java_string_hash(value: &str) -> i32 {
    value
        .encode_utf16()
        .fold(0i32, |hash, c| hash.wrapping_mul(31).wrapping_add(i32::from(c)))
}

#[cfg(test)]
mod tests {
    use super::{get_seed, java_string_hash};

    #[test]
    fn positional_seed_matches_java() {
        assert_eq!(get_seed(0, 0, 0), 0);
        assert_ne!(get_seed(1, 2, 3), get_seed(3, 2, 1));
        // x * 3129871 wraps in 32 bits before widening
        assert_eq!(get_seed(i32::MAX, 0, 0), get_seed(i32::MAX, 0, 0));
    }

    #[test]
    fn string_hash() {
        assert_eq!(java_string_hash(""), 0);
        assert_eq!(java_string_hash("a"), 97);
        assert_eq!(java_string_hash("hello"), 99_162_322);
    }
}
