//! # `bitscan`: Set-bit cursors over word arrays in Rust
//!
//! `bitscan` provides a fast forward-only cursor, [`ScanIter`], enumerating the positions of
//! set bits in a fixed-size array of 64-bit words.
//! Such arrays represent sets of document identifiers (or any dense integer-keyed predicate)
//! in query evaluation, where posting lists, filters and deletion masks are walked by cursors
//! and composed into conjunctions and disjunctions.
//!
//! ## Operations
//!
//! Let $`S \subseteq \{ 0,1,\dots,64w-1 \}`$ be the set of positions at which bits are set
//! in an array of $`w`$ words. [`ScanIter`] supports
//!
//! - [`Iterator::next`] returning the smallest position in $`S`$ greater than the last one returned,
//! - [`Cursor::advance`] returning the smallest position in $`S`$ no less than a target,
//! - [`Cursor::current`] reporting the last position without scanning,
//! - [`Cursor::cost`] estimating the remaining work in $`O(1)`$, and
//! - [`Cursor::reset`] rewinding the cursor for another pass.
//!
//! The lowest nonzero byte of a word is located by a 32/16/8 binary search and
//! its set bits are enumerated through a precomputed table (see [`broadword`]).
//!
//! ## Examples
//!
//! ```
//! use bitscan::{Cursor, Position, ScanIter};
//!
//! let words = [0b1010, 0, 1];
//! let mut it = ScanIter::from_words(&words);
//!
//! assert_eq!(it.current(), Position::Unstarted);
//! assert_eq!(it.next(), Some(1));
//! assert_eq!(it.advance(4), Some(128));
//! assert_eq!(it.next(), None);
//! assert_eq!(it.current(), Position::Exhausted);
//! ```
//!
//! ## Limitation
//!
//! This library is designed to run on 64-bit machines.
#![deny(missing_docs)]

#[cfg(not(target_pointer_width = "64"))]
compile_error!("`target_pointer_width` must be 64");

pub mod bit_vector;
pub mod broadword;
mod intrinsics;
mod utils;

pub use bit_vector::scan::ScanIter;
pub use bit_vector::BitVector;

/// The number of bits in a word.
pub const WORD_LEN: usize = 64;

/// Observable state of a [`Cursor`].
///
/// The variants are ordered as `Unstarted < At(_) < Exhausted`,
/// so [`Position::Exhausted`] compares greater than any real position.
///
/// # Examples
///
/// ```
/// use bitscan::Position;
///
/// assert!(Position::Unstarted < Position::At(0));
/// assert!(Position::At(usize::MAX) < Position::Exhausted);
/// assert_eq!(Position::At(3).get(), Some(3));
/// assert_eq!(Position::Exhausted.get(), None);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Position {
    /// No position has been returned yet.
    #[default]
    Unstarted,
    /// The last returned position.
    At(usize),
    /// No more set bits remain.
    Exhausted,
}

impl Position {
    /// Returns the position if the cursor is on a set bit, or [`None`] otherwise.
    #[inline(always)]
    pub const fn get(self) -> Option<usize> {
        match self {
            Self::At(pos) => Some(pos),
            _ => None,
        }
    }

    /// Checks if the cursor has been exhausted.
    #[inline(always)]
    pub const fn is_exhausted(self) -> bool {
        matches!(self, Self::Exhausted)
    }
}

/// Interface for read-only word arrays scanned by cursors.
///
/// Word $`i`$ covers positions $`64i`$ to $`64i+63`$, and only the first
/// [`num_words`](WordSource::num_words) words are valid.
/// The implementor must not mutate the words while any cursor over them is alive,
/// which the borrow checker enforces for cursors created in this crate.
pub trait WordSource {
    /// Returns the backing words, possibly longer than the valid range.
    fn words(&self) -> &[u64];

    /// Returns the number of valid words.
    fn num_words(&self) -> usize;
}

impl WordSource for [u64] {
    #[inline(always)]
    fn words(&self) -> &[u64] {
        self
    }

    #[inline(always)]
    fn num_words(&self) -> usize {
        self.len()
    }
}

impl WordSource for Vec<u64> {
    #[inline(always)]
    fn words(&self) -> &[u64] {
        self
    }

    #[inline(always)]
    fn num_words(&self) -> usize {
        self.len()
    }
}

/// Interface for positional cursors composed by query evaluation.
///
/// Positions are produced by [`Iterator::next`] in strictly ascending order;
/// [`None`] signals exhaustion, after which every call keeps returning [`None`]
/// until [`reset`](Cursor::reset).
pub trait Cursor: Iterator<Item = usize> {
    /// Moves to the smallest position no less than `target`,
    /// returning it or [`None`] if no such position exists.
    ///
    /// The cursor never moves backward: if `target` is at or before the current position,
    /// the current position is returned unchanged.
    fn advance(&mut self, target: usize) -> Option<usize>;

    /// Returns the last position reported, without scanning.
    fn current(&self) -> Position;

    /// Returns a coarse upper-bound estimate of the remaining work,
    /// only meaningful for ordering cursors relative to each other.
    fn cost(&self) -> usize;

    /// Rewinds the cursor to its initial state.
    fn reset(&mut self);
}
