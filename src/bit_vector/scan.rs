//! Scanning iterator enumerating positions of set bits.
use std::iter::FusedIterator;

use anyhow::{anyhow, Result};

use crate::broadword::{self, BIT_POSITIONS};
use crate::{Cursor, Position, WordSource, WORD_LEN};

/// Iterator for enumerating positions of set bits in a word array,
/// created by [`BitVector::scan_iter`](crate::BitVector::scan_iter) or the constructors below.
///
/// The iterator drains one byte of the current word at a time:
/// the lowest nonzero byte is located by a 32/16/8 binary search, and its set bits
/// are popped from a packed entry of [`BIT_POSITIONS`].
/// No allocation happens during iteration.
///
/// # Examples
///
/// ```
/// use bitscan::{Cursor, ScanIter};
///
/// let words = [0b1010];
///
/// let mut it = ScanIter::from_words(&words);
/// assert_eq!(it.next(), Some(1));
/// assert_eq!(it.next(), Some(3));
/// assert_eq!(it.next(), None);
///
/// let mut it = ScanIter::from_words(&words);
/// assert_eq!(it.advance(2), Some(3));
///
/// let mut it = ScanIter::from_words(&words);
/// assert_eq!(it.advance(4), None);
/// ```
#[derive(Clone)]
pub struct ScanIter<'a> {
    // Only the valid words.
    words: &'a [u64],
    // Index of the next word to load.
    next_word: usize,
    // Remaining bits of the current word, shifted by `shift`.
    buf: u64,
    shift: usize,
    // One-based positions in the low byte of `buf`, not yet returned.
    pending: u32,
    current: Position,
}

impl<'a> ScanIter<'a> {
    /// Creates the iterator over the first `num_words` words of `words`.
    ///
    /// # Arguments
    ///
    /// - `words`: Backing words, possibly over-allocated.
    /// - `num_words`: Number of valid words.
    ///
    /// # Errors
    ///
    /// An error is returned if `words.len() < num_words`.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use bitscan::ScanIter;
    ///
    /// let words = [0b1, 0b1, 0b1];
    /// let it = ScanIter::new(&words, 2)?;
    /// assert_eq!(it.collect::<Vec<_>>(), vec![0, 64]);
    ///
    /// assert!(ScanIter::new(&words, 4).is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(words: &'a [u64], num_words: usize) -> Result<Self> {
        if words.len() < num_words {
            tracing::debug!(
                len = words.len(),
                num_words,
                "rejected a word array shorter than its word count"
            );
            return Err(anyhow!(
                "num_words must be no greater than words.len()={}, but got {num_words}.",
                words.len()
            ));
        }
        Ok(Self::from_words(&words[..num_words]))
    }

    /// Creates the iterator over the valid words of `source`.
    ///
    /// # Errors
    ///
    /// An error is returned if `source` reports more valid words than it provides.
    pub fn from_source<S>(source: &'a S) -> Result<Self>
    where
        S: WordSource + ?Sized,
    {
        Self::new(source.words(), source.num_words())
    }

    /// Creates the iterator over all of `words`.
    pub const fn from_words(words: &'a [u64]) -> Self {
        Self {
            words,
            next_word: 0,
            buf: 0,
            shift: 0,
            pending: 0,
            current: Position::Unstarted,
        }
    }

    /// Gets the number of valid words.
    #[inline(always)]
    pub const fn num_words(&self) -> usize {
        self.words.len()
    }

    /// Loads subsequent words until a nonzero one is found,
    /// returning `false` if the words run out.
    #[inline(always)]
    fn fill(&mut self) -> bool {
        while self.buf == 0 {
            if self.words.len() <= self.next_word {
                return false;
            }
            self.buf = self.words[self.next_word];
            self.next_word += 1;
            self.shift = 0;
        }
        true
    }

    /// Moves the lowest nonzero byte of `buf` to the bottom and
    /// takes its positions from the table.
    #[inline(always)]
    fn scan(&mut self) {
        debug_assert_ne!(self.buf, 0);
        let skip = broadword::lowest_byte_shift(self.buf);
        self.buf >>= skip;
        self.shift += skip;
        self.pending = BIT_POSITIONS[(self.buf & 0xFF) as usize];
    }

    #[inline(always)]
    fn emit(&mut self) -> usize {
        debug_assert_ne!(self.pending, 0);
        let pos = (self.next_word - 1) * WORD_LEN + self.shift
            + broadword::lowest_slot(self.pending)
            - 1;
        self.pending = broadword::pop_slot(self.pending);
        self.current = Position::At(pos);
        pos
    }

    #[cold]
    fn exhaust(&mut self) -> Option<usize> {
        self.next_word = self.words.len();
        self.buf = 0;
        self.pending = 0;
        self.current = Position::Exhausted;
        tracing::trace!(num_words = self.words.len(), "scan exhausted");
        None
    }
}

impl Iterator for ScanIter<'_> {
    type Item = usize;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_exhausted() {
            return None;
        }
        if self.pending == 0 {
            // The low byte has been drained.
            self.buf >>= 8;
            self.shift += 8;
            if !self.fill() {
                return self.exhaust();
            }
            self.scan();
        }
        Some(self.emit())
    }

    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let upper = match self.current {
            Position::Unstarted => self.words.len() * WORD_LEN,
            Position::At(pos) => self.words.len() * WORD_LEN - pos - 1,
            Position::Exhausted => 0,
        };
        (0, Some(upper))
    }
}

impl FusedIterator for ScanIter<'_> {}

impl Cursor for ScanIter<'_> {
    /// Moves to the smallest set bit at or after `target`.
    ///
    /// The word containing `target` is reloaded, so no state of the current word is reused.
    /// A target at or before the current position leaves the cursor in place.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitscan::{Cursor, ScanIter};
    ///
    /// let words = [0, 0, 0b11 << 62];
    /// let mut it = ScanIter::from_words(&words);
    ///
    /// assert_eq!(it.advance(10), Some(190));
    /// assert_eq!(it.next(), Some(191));
    /// assert_eq!(it.advance(150), Some(191));
    /// assert_eq!(it.advance(192), None);
    /// ```
    fn advance(&mut self, target: usize) -> Option<usize> {
        match self.current {
            Position::Exhausted => return None,
            Position::At(pos) if target <= pos => return Some(pos),
            _ => {}
        }
        let word_pos = target / WORD_LEN;
        if self.words.len() <= word_pos {
            return self.exhaust();
        }
        let pos_in_word = target % WORD_LEN;
        self.next_word = word_pos + 1;
        self.buf = self.words[word_pos] >> pos_in_word;
        self.shift = pos_in_word;
        if !self.fill() {
            return self.exhaust();
        }
        self.scan();
        Some(self.emit())
    }

    #[inline(always)]
    fn current(&self) -> Position {
        self.current
    }

    /// Returns `num_words / 64`, regardless of the number of set bits.
    #[inline(always)]
    fn cost(&self) -> usize {
        self.words.len() / WORD_LEN
    }

    fn reset(&mut self) {
        self.next_word = 0;
        self.buf = 0;
        self.shift = 0;
        self.pending = 0;
        self.current = Position::Unstarted;
        tracing::trace!("scan reset");
    }
}

impl std::fmt::Debug for ScanIter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanIter")
            .field("num_words", &self.words.len())
            .field("current", &self.current)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;

    fn gen_random_words(num_words: usize, p: f64, seed: u64) -> Vec<u64> {
        let mut rng = ChaChaRng::seed_from_u64(seed);
        (0..num_words)
            .map(|_| {
                let mut word = 0;
                for i in 0..WORD_LEN {
                    if rng.gen_bool(p) {
                        word |= 1 << i;
                    }
                }
                word
            })
            .collect()
    }

    fn reference_scan(words: &[u64]) -> Vec<usize> {
        let mut positions = vec![];
        for (w, &word) in words.iter().enumerate() {
            for i in 0..WORD_LEN {
                if (word >> i) & 1 == 1 {
                    positions.push(w * WORD_LEN + i);
                }
            }
        }
        positions
    }

    fn test_next(words: &[u64]) {
        let expected = reference_scan(words);
        let mut it = ScanIter::from_words(words);
        for &ex in &expected {
            assert_eq!(it.next(), Some(ex));
            assert_eq!(it.current(), Position::At(ex));
        }
        assert_eq!(it.next(), None);
        assert_eq!(it.current(), Position::Exhausted);
        assert_eq!(it.next(), None);
    }

    fn test_advance(words: &[u64], seed: u64) {
        let expected = reference_scan(words);
        let num_bits = words.len() * WORD_LEN;
        let mut rng = ChaChaRng::seed_from_u64(seed);
        for _ in 0..100 {
            let target = rng.gen_range(0..num_bits + 10);
            let ex = expected.iter().copied().find(|&x| target <= x);
            let mut it = ScanIter::from_words(words);
            assert_eq!(it.advance(target), ex, "target={target}");
        }
    }

    fn test_monotone_advance(words: &[u64], seed: u64) {
        let expected = reference_scan(words);
        let num_bits = words.len() * WORD_LEN;
        let mut rng = ChaChaRng::seed_from_u64(seed);
        let mut it = ScanIter::from_words(words);
        let mut target = 0;
        loop {
            let ex = expected.iter().copied().find(|&x| target <= x);
            let pos = it.advance(target);
            assert_eq!(pos, ex, "target={target}");
            let pos = match pos {
                Some(pos) => pos,
                None => break,
            };
            let ex = expected.iter().copied().find(|&x| pos < x);
            assert_eq!(it.next(), ex);
            match ex {
                Some(x) => target = x + rng.gen_range(0..200),
                None => break,
            }
            if num_bits <= target {
                assert_eq!(it.advance(target), None);
                break;
            }
        }
        assert_eq!(it.current(), Position::Exhausted);
    }

    fn test_all(words: &[u64], seed: u64) {
        test_next(words);
        test_advance(words, seed);
        test_monotone_advance(words, seed);
    }

    #[test]
    fn test_random_words() {
        for seed in 0..100 {
            let words = gen_random_words(100, 0.5, seed);
            test_all(&words, seed);
        }
    }

    #[test]
    fn test_sparse_random_words() {
        for seed in 0..100 {
            let words = gen_random_words(100, 0.1, seed);
            test_all(&words, seed);
        }
    }

    #[test]
    fn test_dense_random_words() {
        for seed in 0..100 {
            let words = gen_random_words(100, 0.9, seed);
            test_all(&words, seed);
        }
    }

    #[test]
    fn test_very_sparse_random_words() {
        for seed in 0..100 {
            let words = gen_random_words(100, 0.001, seed);
            test_all(&words, seed);
        }
    }

    #[test]
    fn test_concrete() {
        let words = [0b1010];
        let mut it = ScanIter::from_words(&words);
        assert_eq!(it.next(), Some(1));
        assert_eq!(it.next(), Some(3));
        assert_eq!(it.next(), None);
        assert_eq!(ScanIter::from_words(&words).advance(2), Some(3));
        assert_eq!(ScanIter::from_words(&words).advance(4), None);
    }

    #[test]
    fn test_all_zeros() {
        for num_words in [0, 1, 2, 100] {
            let words = vec![0; num_words];
            assert_eq!(ScanIter::from_words(&words).next(), None);
            assert_eq!(ScanIter::from_words(&words).advance(0), None);
        }
    }

    #[test]
    fn test_highest_bit() {
        for num_words in [1, 2, 100] {
            let mut words = vec![0; num_words];
            words[num_words - 1] = 1 << 63;
            let mut it = ScanIter::from_words(&words);
            assert_eq!(it.next(), Some(WORD_LEN * (num_words - 1) + 63));
            assert_eq!(it.next(), None);
        }
    }

    #[test]
    fn test_full_words() {
        let words = [u64::MAX; 3];
        let it = ScanIter::from_words(&words);
        assert!(it.eq(0..3 * WORD_LEN));
    }

    #[test]
    fn test_over_allocated() {
        let words = [0b1, 0b1, 0b1];
        let mut it = ScanIter::new(&words, 2).unwrap();
        assert_eq!(it.next(), Some(0));
        assert_eq!(it.next(), Some(64));
        assert_eq!(it.next(), None);
        assert_eq!(ScanIter::new(&words, 2).unwrap().advance(128), None);
    }

    #[test]
    fn test_short_words() {
        let words = [0b1];
        let e = ScanIter::new(&words, 2);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("num_words must be no greater than words.len()=1, but got 2.".to_string())
        );
    }

    #[test]
    fn test_from_source() {
        let words = vec![0b100, 0b1];
        let it = ScanIter::from_source(&words).unwrap();
        assert!(it.eq([2, 64]));
    }

    #[test]
    fn test_cost() {
        let dense = vec![u64::MAX; 1000];
        let sparse = vec![0; 1000];
        assert_eq!(ScanIter::from_words(&dense).cost(), 1000 / 64);
        assert_eq!(ScanIter::from_words(&sparse).cost(), 1000 / 64);
    }

    #[test]
    fn test_reset() {
        let words = gen_random_words(50, 0.3, 7);
        let mut it = ScanIter::from_words(&words);
        let first: Vec<_> = it.by_ref().collect();
        assert_eq!(it.current(), Position::Exhausted);
        it.reset();
        assert_eq!(it.current(), Position::Unstarted);
        let second: Vec<_> = it.by_ref().collect();
        assert_eq!(first, second);
        assert_eq!(first, reference_scan(&words));
    }

    #[test]
    fn test_reset_midway() {
        let words = [0b1011, 1 << 40];
        let mut it = ScanIter::from_words(&words);
        assert_eq!(it.advance(3), Some(3));
        it.reset();
        assert!(it.eq([0, 1, 3, 104]));
    }

    #[test]
    fn test_advance_behind() {
        let words = [0b1001_0010, 0b1];
        let mut it = ScanIter::from_words(&words);
        assert_eq!(it.advance(2), Some(4));
        assert_eq!(it.advance(3), Some(4));
        assert_eq!(it.advance(4), Some(4));
        assert_eq!(it.next(), Some(7));
        assert_eq!(it.advance(0), Some(7));
        assert_eq!(it.next(), Some(64));
    }

    #[test]
    fn test_exhausted_absorbing() {
        let words = [0b1];
        let mut it = ScanIter::from_words(&words);
        assert_eq!(it.advance(64), None);
        assert_eq!(it.next(), None);
        assert_eq!(it.advance(0), None);
        assert_eq!(it.current(), Position::Exhausted);
    }

    #[test]
    fn test_size_hint() {
        let words = [0b1010];
        let mut it = ScanIter::from_words(&words);
        assert_eq!(it.size_hint(), (0, Some(64)));
        it.next();
        assert_eq!(it.size_hint(), (0, Some(62)));
        it.next();
        it.next();
        assert_eq!(it.size_hint(), (0, Some(0)));
    }

    #[test]
    fn test_cursor_object() {
        let words = [0b110, 0b1];
        let mut cursors: Vec<Box<dyn Cursor + '_>> = vec![
            Box::new(ScanIter::from_words(&words)),
            Box::new(ScanIter::from_words(&words[1..])),
        ];
        assert_eq!(cursors[0].advance(2), Some(2));
        assert_eq!(cursors[1].next(), Some(0));
        assert_eq!(cursors[1].current(), Position::At(0));
    }
}
