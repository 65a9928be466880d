//! xoroshiro128++, the generator behind modern world seeds.

use crate::random::{
    PositionalRandom, Random, RandomSource, RandomSplitter, gaussian::MarsagliaPolarGaussian,
    get_seed,
};

/// A xoroshiro128++ generator.
#[derive(Debug, Clone)]
pub struct Xoroshiro {
    seed_lo: u64,
    seed_hi: u64,
    next_gaussian: Option<f64>,
}

/// Derives xoroshiro128++ streams from positions and names.
#[derive(Debug, Clone)]
pub struct XoroshiroSplitter {
    seed_lo: u64,
    seed_hi: u64,
}

const GOLDEN_RATIO_64: u64 = 0x9E37_79B9_7F4A_7C15;
const SILVER_RATIO_64: u64 = 0x6A09_E667_F3BC_C909;

impl Xoroshiro {
    /// Creates a generator from a 64 bit seed, mixing it into 128 bits.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        let (lo, hi) = Self::upgrade_seed_to_128_bit(seed);
        Self::new(mix_stafford_13(lo), mix_stafford_13(hi))
    }

    /// Creates a generator from a 64 bit seed without the stafford mix.
    #[must_use]
    pub fn from_seed_unmixed(seed: u64) -> Self {
        let (lo, hi) = Self::upgrade_seed_to_128_bit(seed);
        Self::new(lo, hi)
    }

    fn new(lo: u64, hi: u64) -> Self {
        // An all zero state never leaves zero.
        let (lo, hi) = if (lo | hi) == 0 {
            (GOLDEN_RATIO_64, SILVER_RATIO_64)
        } else {
            (lo, hi)
        };
        Self {
            seed_lo: lo,
            seed_hi: hi,
            next_gaussian: None,
        }
    }

    fn upgrade_seed_to_128_bit(seed: u64) -> (u64, u64) {
        let lo = seed ^ SILVER_RATIO_64;
        let hi = lo.wrapping_add(GOLDEN_RATIO_64);
        (lo, hi)
    }

    fn next(&mut self, bits: u64) -> u64 {
        self.next_random() >> (64 - bits)
    }

    fn next_random(&mut self) -> u64 {
        let l = self.seed_lo;
        let m = self.seed_hi;
        let n = l.wrapping_add(m).rotate_left(17).wrapping_add(l);
        let m = m ^ l;
        self.seed_lo = l.rotate_left(49) ^ m ^ (m << 21);
        self.seed_hi = m.rotate_left(28);
        n
    }
}

impl MarsagliaPolarGaussian for Xoroshiro {
    fn stored_next_gaussian(&self) -> Option<f64> {
        self.next_gaussian
    }

    fn set_stored_next_gaussian(&mut self, value: Option<f64>) {
        self.next_gaussian = value;
    }
}

fn mix_stafford_13(z: u64) -> u64 {
    let z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    let z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

impl Random for Xoroshiro {
    fn fork(&mut self) -> Self {
        Self::new(self.next_random(), self.next_random())
    }

    fn next_i32(&mut self) -> i32 {
        self.next_random() as i32
    }

    fn next_i32_bounded(&mut self, bound: i32) -> i32 {
        let bound = u64::from(bound as u32);
        let mut l = u64::from(self.next_i32() as u32);
        let mut m = l.wrapping_mul(bound);
        let mut n = m & 0xFFFF_FFFF;
        if n < bound {
            let threshold = u64::from((bound as u32).wrapping_neg()) % bound;
            while n < threshold {
                l = u64::from(self.next_i32() as u32);
                m = l.wrapping_mul(bound);
                n = m & 0xFFFF_FFFF;
            }
        }
        (m >> 32) as i32
    }

    fn next_i64(&mut self) -> i64 {
        self.next_random() as i64
    }

    fn next_f32(&mut self) -> f32 {
        self.next(24) as f32 * 5.960_464_5e-8
    }

    fn next_f64(&mut self) -> f64 {
        // The multiplier is a float literal upstream, which is exactly 2^-53.
        self.next(53) as f64 * f64::from(1.110_223e-16_f32)
    }

    fn next_bool(&mut self) -> bool {
        (self.next_random() & 1) != 0
    }

    fn next_gaussian(&mut self) -> f64 {
        self.calculate_gaussian()
    }

    fn next_positional(&mut self) -> RandomSplitter {
        RandomSplitter::Xoroshiro(XoroshiroSplitter {
            seed_lo: self.next_random(),
            seed_hi: self.next_random(),
        })
    }

    fn consume_count(&mut self, count: i32) {
        for _ in 0..count {
            self.next_random();
        }
    }
}

impl PositionalRandom for XoroshiroSplitter {
    fn at(&self, x: i32, y: i32, z: i32) -> RandomSource {
        let l = get_seed(x, y, z) as u64;
        RandomSource::Xoroshiro(Xoroshiro::new(l ^ self.seed_lo, self.seed_hi))
    }

    fn with_hash_of(&self, name: &str) -> RandomSource {
        let digest = md5::compute(name.as_bytes()).0;
        let mut lo = [0u8; 8];
        let mut hi = [0u8; 8];
        lo.copy_from_slice(&digest[..8]);
        hi.copy_from_slice(&digest[8..]);
        RandomSource::Xoroshiro(Xoroshiro::new(
            u64::from_be_bytes(lo) ^ self.seed_lo,
            u64::from_be_bytes(hi) ^ self.seed_hi,
        ))
    }

    fn with_seed(&self, seed: u64) -> RandomSource {
        RandomSource::Xoroshiro(Xoroshiro::new(seed ^ self.seed_lo, seed ^ self.seed_hi))
    }
}

#[cfg(test)]
mod tests {
    use super::Xoroshiro;
    use crate::random::{PositionalRandom, Random};

    #[test]
    fn next_i32_matches_vanilla() {
        assert_eq!(Xoroshiro::from_seed(111).next_i32(), -1_467_508_761);
        assert_eq!(Xoroshiro::from_seed(513_513_513).next_i32(), 404_174_895);
    }

    #[test]
    fn named_streams() {
        let splitter = Xoroshiro::from_seed(0).next_positional();
        let mut terrain = splitter.with_hash_of("minecraft:terrain");
        assert_eq!(terrain.next_i32(), 1_374_487_555);
    }

    #[test]
    fn bounded_values_stay_in_range() {
        let mut random = Xoroshiro::from_seed(42);
        for bound in [1, 2, 3, 10, 192, 1_000_000] {
            for _ in 0..100 {
                let value = random.next_i32_bounded(bound);
                assert!((0..bound).contains(&value));
            }
        }
    }

    #[test]
    fn doubles_are_unit_interval() {
        let mut random = Xoroshiro::from_seed(7);
        for _ in 0..1000 {
            let value = random.next_f64();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn forks_are_deterministic() {
        let mut a = Xoroshiro::from_seed(99);
        let mut b = Xoroshiro::from_seed(99);
        assert_eq!(a.fork().next_i64(), b.fork().next_i64());
        assert_eq!(a.next_i64(), b.next_i64());
    }
}
