//! Fixed-size dense bitset over 32-bit words.

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BitVector {
    len: usize,
    words: Vec<u32>,
}

impl BitVector {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            words: vec![0; len.div_ceil(32)],
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Panics if `idx` lies beyond the last word.
    pub fn get(&self, idx: usize) -> bool {
        (self.words[idx >> 5] >> (idx & 31)) & 1 == 1
    }

    pub fn set(&mut self, idx: usize, bit: bool) {
        let mask = 1u32 << (idx & 31);
        let word = &mut self.words[idx >> 5];
        if bit {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    /// Positions of the set bits, ascending.
    pub fn ones(&self) -> Ones<'_> {
        Ones {
            words: &self.words,
            word: 0,
            pending: self.words.first().copied().unwrap_or(0),
        }
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }
}

pub struct Ones<'a> {
    words: &'a [u32],
    word: usize,
    pending: u32,
}

impl Iterator for Ones<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.pending == 0 {
            self.word += 1;
            self.pending = *self.words.get(self.word)?;
        }
        let bit = self.pending.trailing_zeros() as usize;
        self.pending &= self.pending - 1;
        Some(self.word * 32 + bit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut bv = BitVector::new(70);
        assert_eq!(bv.len(), 70);
        bv.set(0, true);
        bv.set(31, true);
        bv.set(32, true);
        bv.set(69, true);
        assert!(bv.get(0) && bv.get(31) && bv.get(32) && bv.get(69));
        assert!(!bv.get(1) && !bv.get(33));
        bv.set(31, false);
        assert!(!bv.get(31));
        assert_eq!(bv.count_ones(), 3);
    }

    #[test]
    fn test_ones_in_order_and_restartable() {
        let mut bv = BitVector::new(100);
        for i in [3, 64, 5, 99, 31] {
            bv.set(i, true);
        }
        let first: Vec<usize> = bv.ones().collect();
        assert_eq!(first, vec![3, 5, 31, 64, 99]);
        assert_eq!(bv.ones().collect::<Vec<_>>(), first);
    }

    #[test]
    fn test_empty() {
        let bv = BitVector::new(0);
        assert!(bv.is_empty());
        assert_eq!(bv.ones().count(), 0);
        assert_eq!(BitVector::new(40).ones().next(), None);
    }
}
