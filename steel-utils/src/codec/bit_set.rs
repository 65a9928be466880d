use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A simple fixed-size bit set.
///
/// Serializes as the word array with trailing zero words trimmed, matching
/// Java's `BitSet.toLongArray()`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BitSet(pub Box<[u64]>);

impl BitSet {
    /// A cleared set able to hold `bits` bits.
    #[must_use]
    pub fn with_capacity(bits: usize) -> Self {
        Self(vec![0; bits.div_ceil(64)].into_boxed_slice())
    }

    /// Wraps raw words, lowest bit first.
    #[must_use]
    pub fn from_longs(words: &[i64]) -> Self {
        Self(words.iter().map(|&word| word as u64).collect())
    }

    /// The words with trailing zero words trimmed.
    #[must_use]
    pub fn to_longs(&self) -> Vec<i64> {
        self.0[..self.trimmed_len()]
            .iter()
            .map(|&word| word as i64)
            .collect()
    }

    /// Sets the bit at the given index. Indices past the end are ignored.
    pub fn set(&mut self, index: usize, value: bool) {
        let u64_index = index / 64;
        let bit_index = index % 64;

        if u64_index >= self.0.len() {
            return;
        }

        if value {
            self.0[u64_index] |= 1 << bit_index;
        } else {
            self.0[u64_index] &= !(1 << bit_index);
        }
    }

    /// Whether the bit at `index` is set. Indices past the end read as clear.
    #[must_use]
    pub fn get(&self, index: usize) -> bool {
        self.0
            .get(index / 64)
            .is_some_and(|word| word & (1 << (index % 64)) != 0)
    }

    /// Number of set bits.
    #[must_use]
    pub fn cardinality(&self) -> usize {
        self.0.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Whether no bit is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&word| word == 0)
    }

    fn trimmed_len(&self) -> usize {
        let mut trimmed_len = self.0.len();
        while trimmed_len > 0 && self.0[trimmed_len - 1] == 0 {
            trimmed_len -= 1;
        }
        trimmed_len
    }
}

impl Serialize for BitSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_longs().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BitSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let words = Vec::<i64>::deserialize(deserializer)?;
        Ok(Self::from_longs(&words))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_clear_bits() {
        let mut bits = BitSet::with_capacity(256);
        bits.set(0, true);
        bits.set(65, true);
        bits.set(255, true);
        assert!(bits.get(0) && bits.get(65) && bits.get(255));
        assert!(!bits.get(1));
        assert_eq!(bits.cardinality(), 3);

        bits.set(65, false);
        assert!(!bits.get(65));
        assert_eq!(bits.cardinality(), 2);
    }

    #[test]
    fn out_of_range_is_ignored() {
        let mut bits = BitSet::with_capacity(64);
        bits.set(64, true);
        assert!(!bits.get(64));
        assert!(bits.is_empty());
    }

    #[test]
    fn serializes_trimmed_words() {
        let mut bits = BitSet::with_capacity(256);
        bits.set(3, true);
        bits.set(63, true);
        assert_eq!(serde_json::to_string(&bits).expect("serializes"), "[-9223372036854775800]");

        let parsed: BitSet = serde_json::from_str("[8, 0, 1]").expect("parses");
        assert!(parsed.get(3));
        assert!(parsed.get(128));
        assert_eq!(parsed.to_longs(), vec![8, 0, 1]);
    }
}
