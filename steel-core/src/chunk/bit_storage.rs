//! Fixed-width integers packed into 64-bit words, none spanning two words.

/// A packed array of `size` values of `bits` bits each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleBitStorage {
    data: Box<[i64]>,
    bits: u32,
    size: usize,
    values_per_long: usize,
    mask: u64,
}

impl SimpleBitStorage {
    /// A zeroed storage. `bits` must be in `1..=32`.
    #[must_use]
    pub fn new(bits: u32, size: usize) -> Self {
        debug_assert!((1..=32).contains(&bits));
        let values_per_long = (64 / bits) as usize;
        Self {
            data: vec![0; size.div_ceil(values_per_long)].into_boxed_slice(),
            bits,
            size,
            values_per_long,
            mask: (1u64 << bits) - 1,
        }
    }

    /// Number of words a storage of this shape needs.
    #[must_use]
    pub fn word_count(bits: u32, size: usize) -> usize {
        size.div_ceil((64 / bits) as usize)
    }

    /// The value at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> u32 {
        debug_assert!(index < self.size);
        let (word, shift) = self.locate(index);
        ((self.data[word] as u64 >> shift) & self.mask) as u32
    }

    /// Stores `value`, masked to the entry width.
    pub fn set(&mut self, index: usize, value: u32) {
        debug_assert!(index < self.size);
        let (word, shift) = self.locate(index);
        let cleared = self.data[word] as u64 & !(self.mask << shift);
        self.data[word] = (cleared | ((u64::from(value) & self.mask) << shift)) as i64;
    }

    /// The packed words.
    #[must_use]
    pub fn raw(&self) -> &[i64] {
        &self.data
    }

    /// Mutable access to the packed words.
    pub fn raw_mut(&mut self) -> &mut [i64] {
        &mut self.data
    }

    /// Bits per entry.
    #[must_use]
    pub const fn bits(&self) -> u32 {
        self.bits
    }

    /// Number of entries.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    const fn locate(&self, index: usize) -> (usize, u32) {
        let word = index / self.values_per_long;
        let shift = ((index - word * self.values_per_long) as u32) * self.bits;
        (word, shift)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heightmap_shape() {
        let storage = SimpleBitStorage::new(9, 256);
        assert_eq!(storage.raw().len(), 37);
        assert_eq!(SimpleBitStorage::word_count(9, 256), 37);
    }

    #[test]
    fn values_do_not_bleed() {
        let mut storage = SimpleBitStorage::new(9, 256);
        storage.set(6, 511);
        storage.set(7, 1);
        storage.set(5, 0);
        assert_eq!(storage.get(6), 511);
        assert_eq!(storage.get(7), 1);
        assert_eq!(storage.get(5), 0);
        // 7 values per word; index 7 starts the second word.
        assert_eq!(storage.raw()[1], 1);
        assert_eq!(storage.raw()[0], 511 << 54);
    }
}
