//! Read results returned by an index.

use crate::types::{Address, Locator, Score};

/// One page of a paginated locator read.
///
/// `locators` and `scores` always have the same length. Slots past the end
/// of the list are zero-padded (empty locator, score 0).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorPage {
    pub locators: Vec<Locator>,
    pub scores: Vec<Score>,
    /// Identifier of the next unread entry, or [`Address::HEAD`] once the
    /// list is exhausted
    pub next_cursor: Address,
}

impl LocatorPage {
    /// No slots; the list has nothing more to give.
    pub fn exhausted() -> Self {
        Self::empty(Address::HEAD)
    }

    /// No slots with an explicit cursor.
    pub fn empty(next_cursor: Address) -> Self {
        Self {
            locators: Vec::new(),
            scores: Vec::new(),
            next_cursor,
        }
    }

    /// Number of slots, padding included.
    #[inline]
    pub fn len(&self) -> usize {
        self.locators.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }

    #[inline]
    pub fn is_last(&self) -> bool {
        self.next_cursor == Address::HEAD
    }

    /// (locator, score) pairs, skipping zero padding.
    pub fn entries(&self) -> impl Iterator<Item = (Locator, Score)> + '_ {
        self.locators
            .iter()
            .zip(self.scores.iter())
            .filter(|(locator, _)| !locator.is_empty())
            .map(|(locator, score)| (*locator, *score))
    }
}

/// Raw view of one identifier's entry, as reported by
/// [`Index::entries`](crate::index::Index::entries).
///
/// For an absent identifier every field is zero/empty, including the
/// neighbour pointers. For a present identifier at either end of the list
/// the missing neighbour is reported as [`Address::HEAD`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Entry {
    pub locator: Locator,
    pub score: Score,
    pub prev: Address,
    pub next: Address,
}
