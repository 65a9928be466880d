//! `java.util.Random`, used for legacy seeds and the fixed-seed climate noises.

use crate::random::{
    PositionalRandom, Random, RandomSource, RandomSplitter, gaussian::MarsagliaPolarGaussian,
    get_seed, java_string_hash,
};

const MULTIPLIER: i64 = 0x5_DEEC_E66D;
const INCREMENT: i64 = 0xB;
const STATE_BITS: u32 = 48;
const STATE_MASK: i64 = (1 << STATE_BITS) - 1;

/// A 48-bit linear congruential generator.
#[derive(Debug, Clone)]
pub struct LegacyRandom {
    state: i64,
    next_gaussian: Option<f64>,
}

/// Derives LCG streams by xoring a salt into a fixed seed.
#[derive(Debug, Clone)]
pub struct LegacyRandomSplitter {
    seed: i64,
}

impl LegacyRandom {
    /// Creates a generator from a seed, scrambled the way Java does.
    #[must_use]
    pub const fn from_seed(seed: u64) -> Self {
        Self {
            state: (seed as i64 ^ MULTIPLIER) & STATE_MASK,
            next_gaussian: None,
        }
    }

    /// Advances the state and returns its top `bits` bits.
    fn next_bits(&mut self, bits: u32) -> i32 {
        self.state = self
            .state
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(INCREMENT)
            & STATE_MASK;
        (self.state >> (STATE_BITS - bits)) as i32
    }
}

impl MarsagliaPolarGaussian for LegacyRandom {
    fn stored_next_gaussian(&self) -> Option<f64> {
        self.next_gaussian
    }

    fn set_stored_next_gaussian(&mut self, value: Option<f64>) {
        self.next_gaussian = value;
    }
}

impl Random for LegacyRandom {
    fn fork(&mut self) -> Self {
        Self::from_seed(self.next_i64() as u64)
    }

    fn next_i32(&mut self) -> i32 {
        self.next_bits(32)
    }

    fn next_i32_bounded(&mut self, bound: i32) -> i32 {
        if (bound as u32).is_power_of_two() {
            return (i64::from(bound) * i64::from(self.next_bits(31)) >> 31) as i32;
        }
        // Rejects the tail of the range that would bias the remainder.
        loop {
            let bits = self.next_bits(31);
            let value = bits % bound;
            if bits.wrapping_sub(value).wrapping_add(bound - 1) >= 0 {
                return value;
            }
        }
    }

    fn next_i64(&mut self) -> i64 {
        let high = i64::from(self.next_bits(32)) << 32;
        high.wrapping_add(i64::from(self.next_bits(32)))
    }

    fn next_f32(&mut self) -> f32 {
        self.next_bits(24) as f32 / (1 << 24) as f32
    }

    fn next_f64(&mut self) -> f64 {
        let high = i64::from(self.next_bits(26)) << 27;
        let low = i64::from(self.next_bits(27));
        // The game scales by a float literal, not by 2^-53.
        (high + low) as f64 * f64::from(1.110_223e-16_f32)
    }

    fn next_bool(&mut self) -> bool {
        self.next_bits(1) != 0
    }

    fn next_gaussian(&mut self) -> f64 {
        self.calculate_gaussian()
    }

    fn next_positional(&mut self) -> RandomSplitter {
        RandomSplitter::Legacy(LegacyRandomSplitter::new(self.next_i64()))
    }
}

impl LegacyRandomSplitter {
    /// Creates a splitter around a raw seed.
    #[must_use]
    pub const fn new(seed: i64) -> Self {
        Self { seed }
    }

    fn salted(&self, salt: i64) -> RandomSource {
        RandomSource::Legacy(LegacyRandom::from_seed((salt ^ self.seed) as u64))
    }
}

impl PositionalRandom for LegacyRandomSplitter {
    fn at(&self, x: i32, y: i32, z: i32) -> RandomSource {
        self.salted(get_seed(x, y, z))
    }

    fn with_hash_of(&self, name: &str) -> RandomSource {
        self.salted(i64::from(java_string_hash(name)))
    }

    fn with_seed(&self, seed: u64) -> RandomSource {
        RandomSource::Legacy(LegacyRandom::from_seed(seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The first `count` draws of a generator seeded with zero.
    fn draws<T>(count: usize, mut draw: impl FnMut(&mut LegacyRandom) -> T) -> Vec<T> {
        let mut random = LegacyRandom::from_seed(0);
        (0..count).map(|_| draw(&mut random)).collect()
    }

    #[test]
    fn integer_streams_match_java() {
        assert_eq!(
            draws(10, |r| r.next_i32()),
            [
                -1_155_484_576,
                -723_955_400,
                1_033_096_058,
                -1_690_734_402,
                -1_557_280_266,
                1_327_362_106,
                -1_930_858_313,
                502_539_523,
                -1_728_529_858,
                -938_301_587,
            ]
        );
        assert_eq!(
            draws(10, |r| r.next_i64()),
            [
                -4_962_768_465_676_381_896,
                4_437_113_781_045_784_766,
                -6_688_467_811_848_818_630,
                -8_292_973_307_042_192_125,
                -7_423_979_211_207_825_555,
                6_146_794_652_083_548_235,
                7_105_486_291_024_734_541,
                -279_624_296_851_435_688,
                -2_228_689_144_322_150_137,
                -1_083_761_183_081_836_303,
            ]
        );
        assert_eq!(
            draws(10, |r| r.next_bool()),
            [true, true, false, true, true, false, true, false, true, true]
        );
    }

    #[test]
    fn bounded_streams_match_java() {
        assert_eq!(
            draws(10, |r| r.next_i32_bounded(15)),
            [0, 13, 4, 2, 5, 8, 11, 6, 9, 14]
        );
        assert_eq!(draws(10, |r| r.next_i32_bounded(1)), [0; 10]);
        assert_eq!(
            draws(10, |r| r.next_i32_bounded(2)),
            [1, 1, 0, 1, 1, 0, 1, 0, 1, 1]
        );
        assert_eq!(
            draws(10, |r| r.next_i32_between(1, 12)),
            [1, 5, 2, 12, 12, 6, 12, 10, 4, 3]
        );
        assert_eq!(
            draws(10, |r| r.next_i32_between_exclusive(1, 12)),
            [1, 7, 9, 6, 7, 3, 3, 7, 3, 1]
        );
    }

    #[test]
    fn float_streams_match_java() {
        assert_eq!(
            draws(10, |r| r.next_f64()),
            [
                0.730_967_787_376_657,
                0.240_536_415_671_485_87,
                0.637_417_425_350_108_3,
                0.550_437_005_117_633_9,
                0.597_545_277_797_201_8,
                0.333_218_399_476_649_8,
                0.385_189_184_740_718_5,
                0.984_841_540_199_809,
                0.879_182_517_872_480_1,
                0.941_249_179_482_114_4,
            ]
        );
        assert_eq!(
            draws(10, |r| r.next_f32()),
            [
                0.730_967_76,
                0.831_441,
                0.240_536_39,
                0.606_345_2,
                0.637_417_4,
                0.309_050_56,
                0.550_437,
                0.117_006_6,
                0.597_545_27,
                0.781_534_6,
            ]
        );
        assert_eq!(
            draws(10, |r| r.next_gaussian()),
            [
                0.802_533_063_739_030_5,
                -0.901_546_088_417_512_2,
                2.080_920_790_428_163,
                0.763_770_768_436_489_4,
                0.984_574_532_882_512_8,
                -1.683_412_258_767_342_8,
                -0.027_290_262_907_887_285,
                0.115_245_702_862_023_15,
                -0.390_167_041_379_937_74,
                -0.643_388_813_126_449,
            ]
        );
        assert_eq!(
            draws(10, |r| r.triangle(100.0, 50.0)),
            [
                124.521_568_585_258_56,
                104.349_021_011_623_72,
                113.216_343_916_027_6,
                70.017_382_227_045_47,
                96.896_666_919_518_28,
                107.302_840_758_085_41,
                106.168_176_758_131_44,
                79.112_644_826_080_78,
                73.967_216_139_270_62,
                81.724_195_210_806_46,
            ]
        );
    }

    #[test]
    fn positional_streams_match_java() {
        let mut root = LegacyRandom::from_seed(0);
        let RandomSplitter::Legacy(splitter) = root.next_positional() else {
            unreachable!("legacy generators split into legacy splitters");
        };
        assert_eq!(splitter.seed, -4_962_768_465_676_381_896);
        assert_eq!(splitter.with_hash_of("minecraft:offset").next_i32(), 103_436_829);

        let mut root = LegacyRandom::from_seed(0);
        let mut forked = root.fork();
        let splitter = forked.next_positional();
        assert_eq!(splitter.with_hash_of("TEST STRING").next_i32(), -1_170_413_697);
        assert_eq!(splitter.with_seed(10).next_i32(), -1_157_793_070);
        assert_eq!(splitter.at(1, 11, -111).next_i32(), -1_213_890_343);

        assert_eq!(root.next_i32(), 1_033_096_058);
        assert_eq!(forked.next_i32(), -888_301_832);
    }
}
