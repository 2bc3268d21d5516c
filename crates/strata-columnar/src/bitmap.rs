#![forbid(unsafe_code)]

/// A compact bit vector used for validity and boolean storage.
///
/// Bits are stored little-endian within each `u64` word:
/// - bit 0 is the LSB of word 0
/// - bit 63 is the MSB of word 0
///
/// Column views never mutate a shared bitmap; slicing a column only moves its
/// offset, so indices passed here are always physical (offset already applied).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitVec {
    words: Vec<u64>,
    len: usize,
    ones: usize,
}

impl BitVec {
    pub fn new() -> Self {
        Self {
            words: Vec::new(),
            len: 0,
            ones: 0,
        }
    }

    pub fn with_capacity_bits(bits: usize) -> Self {
        Self {
            words: Vec::with_capacity(bits.div_ceil(64)),
            len: 0,
            ones: 0,
        }
    }

    pub fn from_bools(bits: &[bool]) -> Self {
        bits.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, value: bool) {
        let bit = self.len % 64;
        if bit == 0 {
            self.words.push(0);
        }

        if value {
            let word = self.len / 64;
            self.words[word] |= 1u64 << bit;
            self.ones += 1;
        }

        self.len += 1;
    }

    pub fn get(&self, index: usize) -> bool {
        debug_assert!(index < self.len, "BitVec index out of bounds");
        let word = self.words[index / 64];
        ((word >> (index % 64)) & 1) == 1
    }

    /// Count set bits in `start..start + len`.
    pub fn count_ones_in(&self, start: usize, len: usize) -> usize {
        if start == 0 && len == self.len {
            return self.ones;
        }
        debug_assert!(start + len <= self.len, "BitVec range out of bounds");

        let end = start + len;
        let mut count = 0usize;
        let mut idx = start;
        // Leading partial word.
        while idx < end && idx % 64 != 0 {
            count += self.get(idx) as usize;
            idx += 1;
        }
        while idx + 64 <= end {
            count += self.words[idx / 64].count_ones() as usize;
            idx += 64;
        }
        while idx < end {
            count += self.get(idx) as usize;
            idx += 1;
        }
        count
    }

    pub fn all_true(&self) -> bool {
        self.ones == self.len
    }
}

impl Default for BitVec {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<bool> for BitVec {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut out = Self::with_capacity_bits(iter.size_hint().0);
        for bit in iter {
            out.push(bit);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_ones_in_spans_word_boundaries() {
        let bits: BitVec = (0..200).map(|i| i % 3 == 0).collect();
        let naive = |start: usize, len: usize| (start..start + len).filter(|i| i % 3 == 0).count();

        for (start, len) in [(0, 200), (1, 63), (5, 130), (64, 64), (63, 2), (199, 1), (10, 0)] {
            assert_eq!(bits.count_ones_in(start, len), naive(start, len), "{start}+{len}");
        }
    }
}
