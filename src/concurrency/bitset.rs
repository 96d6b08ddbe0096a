//! Word-packed atomic bitsets.
//!
//! A dense alternative to `Vec<AtomicBool>` for visited sets.

use crate::sync::{AtomicUsize, Ordering};

const WORD_BITS: usize = core::mem::size_of::<usize>() * 8;

// Per-word bit counts never exceed `WORD_BITS`.
#[inline]
fn widen(n: u32) -> usize {
    usize::try_from(n).unwrap_or(WORD_BITS)
}

/// A word-packed atomic bitset of fixed length.
pub struct AtomicBitset {
    bits: usize,
    words: Vec<AtomicUsize>,
}

impl AtomicBitset {
    /// Creates a new bitset with `bits` bits, all cleared.
    pub fn new(bits: usize) -> Self {
        let words_len = bits.div_ceil(WORD_BITS);
        let words = (0..words_len).map(|_| AtomicUsize::new(0)).collect();
        Self { bits, words }
    }

    /// Number of bits.
    pub fn len_bits(&self) -> usize {
        self.bits
    }

    /// Returns whether `bit` is set.
    ///
    /// # Panics
    /// Panics if `bit >= len_bits()`.
    pub fn is_set(&self, bit: usize) -> bool {
        let (word, mask) = self.word_mask(bit);
        (self.words[word].load(Ordering::Acquire) & mask) != 0
    }

    /// Sets `bit` and returns `true` iff this call observed it previously cleared.
    ///
    /// Of any number of concurrent callers for the same bit, exactly one
    /// observes it cleared.
    ///
    /// # Panics
    /// Panics if `bit >= len_bits()`.
    pub fn test_and_set(&self, bit: usize, order: Ordering) -> bool {
        let (word, mask) = self.word_mask(bit);
        let prev = self.words[word].fetch_or(mask, order);
        (prev & mask) == 0
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words
            .iter()
            .map(|w| widen(w.load(Ordering::Acquire).count_ones()))
            .sum()
    }

    /// Indices of all set bits, ascending.
    pub fn ones(&self) -> Vec<usize> {
        let mut out = Vec::new();
        for (i, w) in self.words.iter().enumerate() {
            let mut word = w.load(Ordering::Acquire);
            while word != 0 {
                out.push(i * WORD_BITS + widen(word.trailing_zeros()));
                word &= word - 1;
            }
        }
        out
    }

    #[inline]
    fn word_mask(&self, bit: usize) -> (usize, usize) {
        assert!(bit < self.bits, "bit {bit} is out of bounds for {} bits", self.bits);
        (bit / WORD_BITS, 1usize << (bit % WORD_BITS))
    }
}

impl core::fmt::Debug for AtomicBitset {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AtomicBitset")
            .field("bits", &self.bits)
            .field("ones", &self.count_ones())
            .finish()
    }
}
