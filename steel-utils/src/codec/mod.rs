//! Compact containers shared with chunk storage.

mod bit_set;

pub use bit_set::BitSet;
