//! Bit vector in a plain format, providing words to [`ScanIter`].
pub mod scan;

use anyhow::{anyhow, Result};

use crate::utils::MatrixView;
use crate::{WordSource, WORD_LEN};
use scan::ScanIter;

/// Bit vector in a plain format, providing words to [`ScanIter`].
///
/// This is a minimal container: bits can be appended and updated,
/// and the words can be scanned through [`BitVector::scan_iter`].
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use bitscan::BitVector;
///
/// let mut bv = BitVector::from_bit(false, 70);
/// bv.set_bit(3, true)?;
/// bv.set_bit(65, true)?;
///
/// let positions: Vec<_> = bv.scan_iter().collect();
/// assert_eq!(positions, vec![3, 65]);
/// # Ok(())
/// # }
/// ```
#[derive(Default, Clone, PartialEq, Eq)]
pub struct BitVector {
    words: Vec<u64>,
    len: usize,
}

impl BitVector {
    /// Creates a new empty vector.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitscan::BitVector;
    ///
    /// let bv = BitVector::new();
    /// assert_eq!(bv.len(), 0);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new vector that stores `len` bits,
    /// where each bit is initialized by `bit`.
    ///
    /// # Arguments
    ///
    ///  - `bit`: Bit value used for intinialization.
    ///  - `len`: Number of elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitscan::BitVector;
    ///
    /// let bv = BitVector::from_bit(true, 5);
    /// assert_eq!(bv.len(), 5);
    /// assert_eq!(bv.num_words(), 1);
    /// assert_eq!(bv.words(), &[0b11111]);
    /// ```
    pub fn from_bit(bit: bool, len: usize) -> Self {
        let word = if bit { u64::MAX } else { 0 };
        let mut words = vec![word; Self::words_for(len)];
        let shift = len % WORD_LEN;
        if shift != 0 {
            if let Some(last) = words.last_mut() {
                *last &= (1 << shift) - 1;
            }
        }
        Self { words, len }
    }

    /// Creates a new vector from input bit stream `bits`.
    ///
    /// # Arguments
    ///
    ///  - `bits`: Bit stream.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitscan::BitVector;
    ///
    /// let bv = BitVector::from_bits([false, true, false]);
    /// assert_eq!(bv.len(), 3);
    /// assert_eq!(bv.get_bit(1), Some(true));
    /// ```
    pub fn from_bits<I>(bits: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let mut this = Self::new();
        this.extend(bits);
        this
    }

    /// Returns the `pos`-th bit, or [`None`] if out of bounds.
    pub fn get_bit(&self, pos: usize) -> Option<bool> {
        if pos < self.len {
            let (block, shift) = (pos / WORD_LEN, pos % WORD_LEN);
            Some((self.words[block] >> shift) & 1 == 1)
        } else {
            None
        }
    }

    /// Updates the `pos`-th bit to `bit`.
    ///
    /// # Errors
    ///
    /// An error is returned if `self.len() <= pos`.
    #[inline(always)]
    pub fn set_bit(&mut self, pos: usize, bit: bool) -> Result<()> {
        if self.len() <= pos {
            return Err(anyhow!(
                "pos must be no greater than self.len()={}, but got {pos}.",
                self.len()
            ));
        }
        let word = pos / WORD_LEN;
        let pos_in_word = pos % WORD_LEN;
        self.words[word] &= !(1 << pos_in_word);
        self.words[word] |= (bit as u64) << pos_in_word;
        Ok(())
    }

    /// Pushes `bit` at the end.
    #[inline(always)]
    pub fn push_bit(&mut self, bit: bool) {
        let pos_in_word = self.len % WORD_LEN;
        if pos_in_word == 0 {
            self.words.push(bit as u64);
        } else if let Some(cur_word) = self.words.last_mut() {
            *cur_word |= (bit as u64) << pos_in_word;
        }
        self.len += 1;
    }

    /// Creates an iterator enumerating positions of set bits.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitscan::{BitVector, Cursor};
    ///
    /// let bv = BitVector::from_bits([false, true, false, false, true]);
    /// let mut it = bv.scan_iter();
    ///
    /// assert_eq!(it.advance(2), Some(4));
    /// assert_eq!(it.next(), None);
    /// ```
    pub fn scan_iter(&self) -> ScanIter<'_> {
        ScanIter::from_words(&self.words)
    }

    /// Returns the number of bits set.
    ///
    /// It is performed by linear scan over the words.
    pub fn num_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Gets the number of bits.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if the vector is empty.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets the slice of raw words.
    #[inline(always)]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Gets the number of words.
    #[inline(always)]
    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    #[inline(always)]
    const fn words_for(n: usize) -> usize {
        (n + WORD_LEN - 1) / WORD_LEN
    }
}

impl WordSource for BitVector {
    #[inline(always)]
    fn words(&self) -> &[u64] {
        &self.words
    }

    #[inline(always)]
    fn num_words(&self) -> usize {
        self.words.len()
    }
}

impl std::iter::Extend<bool> for BitVector {
    fn extend<I>(&mut self, bits: I)
    where
        I: IntoIterator<Item = bool>,
    {
        bits.into_iter().for_each(|b| self.push_bit(b));
    }
}

impl std::fmt::Debug for BitVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bits: Vec<u8> = (0..self.len)
            .map(|i| u8::from(self.get_bit(i) == Some(true)))
            .collect();
        f.debug_struct("BitVector")
            .field("bits", &MatrixView::new(&bits, 16))
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_bit_oob() {
        let mut bv = BitVector::from_bit(false, 3);
        let e = bv.set_bit(3, true);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("pos must be no greater than self.len()=3, but got 3.".to_string())
        );
    }

    #[test]
    fn test_from_bit_truncation() {
        let bv = BitVector::from_bit(true, 65);
        assert_eq!(bv.words(), &[u64::MAX, 1]);
        assert_eq!(bv.num_ones(), 65);
    }

    #[test]
    fn test_push_bit_across_word() {
        let mut bv = BitVector::from_bit(false, 63);
        bv.push_bit(true);
        bv.push_bit(true);
        assert_eq!(bv.len(), 65);
        assert_eq!(bv.words(), &[1 << 63, 1]);
    }

    #[test]
    fn test_set_bit_clears() {
        let mut bv = BitVector::from_bit(true, 10);
        bv.set_bit(4, false).unwrap();
        assert_eq!(bv.get_bit(4), Some(false));
        assert_eq!(bv.num_ones(), 9);
    }

    #[test]
    fn test_word_source() {
        let bv = BitVector::from_bits([true, false, true]);
        assert_eq!(WordSource::words(&bv), &[0b101]);
        assert_eq!(WordSource::num_words(&bv), 1);
    }

    #[test]
    fn test_debug() {
        let bv = BitVector::from_bits([true, false, true]);
        assert_eq!(
            format!("{bv:?}"),
            "BitVector { bits: [3 items], len: 3 }"
        );
    }
}
