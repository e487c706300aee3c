//! Score-ordered locator index for a single market.
//!
//! ## Architecture
//!
//! - **Slab**: entry storage, O(1) insert/remove by key
//! - **HashMap**: identifier to slab key, for O(1) membership and unlink
//! - **head/tail**: ends of a doubly-linked list threaded through the slab
//!
//! ## Ordering
//!
//! ```text
//! head (highest score) <-> ... <-> tail (lowest score)
//! ```
//!
//! A new entry goes directly before the first entry with a strictly lower
//! score. Equal scores therefore keep arrival order: the earlier entry
//! reads first.
//!
//! ## Example
//!
//! ```
//! use intent_indexer::index::Index;
//! use intent_indexer::types::{Address, Locator};
//!
//! let alice = Address::from_low_u64_be(1);
//! let bob = Address::from_low_u64_be(2);
//!
//! let mut index = Index::new();
//! index.set_locator(alice, 50, Locator::from_address(alice)).unwrap();
//! index.set_locator(bob, 100, Locator::from_address(bob)).unwrap();
//!
//! let page = index.get_locators(Address::HEAD, 10);
//! assert_eq!(page.scores, vec![100, 50]);
//! assert_eq!(page.next_cursor, Address::HEAD);
//! ```

use std::collections::HashMap;

use slab::Slab;
use tracing::{debug, trace};

use crate::error::IndexError;
use crate::index::{Entry, EntryNode, LocatorPage};
use crate::types::{Address, EntryRecord, IndexEvent, Locator, Score};

/// One market's entries, highest score first.
///
/// An `Index` has no notion of a caller. Whoever holds `&mut Index` is its
/// owner; the [`Indexer`](crate::indexer::Indexer) keeps every market's
/// index private and only lends out shared references.
#[derive(Debug, Clone, Default)]
pub struct Index {
    /// Entry storage
    entries: Slab<EntryNode>,

    /// Identifier to slab key
    slots: HashMap<Address, usize>,

    /// Highest-scoring entry (slab key)
    head: Option<usize>,

    /// Lowest-scoring entry (slab key)
    tail: Option<usize>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Slab::with_capacity(capacity),
            slots: HashMap::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    // ========================================================================
    // Size
    // ========================================================================

    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Number of entries.
    #[inline]
    pub fn length(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    pub fn contains(&self, identifier: &Address) -> bool {
        self.slots.contains_key(identifier)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Would [`set_locator`](Self::set_locator) accept this entry?
    pub fn check_set(&self, identifier: &Address, locator: &Locator) -> Result<(), IndexError> {
        if identifier.is_reserved() {
            return Err(IndexError::ReservedIdentifier(*identifier));
        }
        if self.contains(identifier) {
            return Err(IndexError::EntryAlreadyExists(*identifier));
        }
        if locator.is_empty() {
            return Err(IndexError::LocatorRequired);
        }
        Ok(())
    }

    /// Would [`update_locator`](Self::update_locator) accept this entry?
    pub fn check_update(&self, identifier: &Address, locator: &Locator) -> Result<(), IndexError> {
        if !self.contains(identifier) {
            return Err(IndexError::EntryDoesNotExist(*identifier));
        }
        if locator.is_empty() {
            return Err(IndexError::LocatorRequired);
        }
        Ok(())
    }

    /// Insert a new entry at its score position.
    pub fn set_locator(
        &mut self,
        identifier: Address,
        score: Score,
        locator: Locator,
    ) -> Result<IndexEvent, IndexError> {
        self.check_set(&identifier, &locator)?;
        self.link(identifier, score, locator);

        debug!(%identifier, score, length = self.length(), "entry set");
        Ok(IndexEvent::SetLocator { identifier, score, locator })
    }

    /// Remove an entry.
    pub fn unset_locator(&mut self, identifier: Address) -> Result<IndexEvent, IndexError> {
        let key = self
            .slots
            .remove(&identifier)
            .ok_or(IndexError::EntryDoesNotExist(identifier))?;
        self.unlink(key);

        debug!(%identifier, length = self.length(), "entry unset");
        Ok(IndexEvent::UnsetLocator { identifier })
    }

    /// Replace an entry's score and locator, moving it to its new position.
    ///
    /// The entry is re-inserted as if it had just arrived, so it goes
    /// behind any entry that already holds the new score.
    pub fn update_locator(
        &mut self,
        identifier: Address,
        score: Score,
        locator: Locator,
    ) -> Result<IndexEvent, IndexError> {
        self.check_update(&identifier, &locator)?;
        if let Some(key) = self.slots.remove(&identifier) {
            self.unlink(key);
        }
        self.link(identifier, score, locator);

        debug!(%identifier, score, "entry updated");
        Ok(IndexEvent::SetLocator { identifier, score, locator })
    }

    /// Store a node and thread it into the list by score.
    fn link(&mut self, identifier: Address, score: Score, locator: Locator) {
        let mut before = self.head;
        while let Some(key) = before {
            let node = &self.entries[key];
            if !node.precedes(score) {
                break;
            }
            before = node.next;
        }

        let key = self.entries.insert(EntryNode::new(identifier, score, locator));
        match before {
            Some(next) => self.insert_before(key, next),
            None => self.push_back(key),
        }
        self.slots.insert(identifier, key);
    }

    fn push_back(&mut self, key: usize) {
        let tail = self.tail;
        let node = &mut self.entries[key];
        node.prev = tail;
        node.next = None;

        match tail {
            Some(tail_key) => self.entries[tail_key].next = Some(key),
            // Empty list: new node is also the head
            None => self.head = Some(key),
        }
        self.tail = Some(key);
    }

    fn insert_before(&mut self, key: usize, next: usize) {
        let prev = self.entries[next].prev;
        let node = &mut self.entries[key];
        node.prev = prev;
        node.next = Some(next);

        self.entries[next].prev = Some(key);
        match prev {
            Some(prev_key) => self.entries[prev_key].next = Some(key),
            None => self.head = Some(key),
        }
    }

    /// Detach a node from the list and free its slot.
    fn unlink(&mut self, key: usize) -> EntryNode {
        let node = self.entries.remove(key);

        match node.prev {
            Some(prev) => self.entries[prev].next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.entries[next].prev = node.prev,
            None => self.tail = node.prev,
        }
        node
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Read up to `limit` locators starting at `cursor`.
    ///
    /// `cursor` is an identifier to start from (inclusive); [`Address::HEAD`]
    /// or [`Address::ZERO`] start at the top. The page has exactly
    /// `min(limit, length)` slots, zero-padded once the list runs out.
    ///
    /// A cursor that names no entry yields an empty page whose next cursor
    /// is [`Address::HEAD`].
    pub fn get_locators(&self, cursor: Address, limit: usize) -> LocatorPage {
        let start = if cursor == Address::HEAD || cursor.is_zero() {
            self.head
        } else {
            match self.slots.get(&cursor) {
                Some(&key) => Some(key),
                None => {
                    trace!(%cursor, "unknown cursor");
                    return LocatorPage::exhausted();
                }
            }
        };

        let size = limit.min(self.length());
        let mut locators = vec![Locator::EMPTY; size];
        let mut scores = vec![0; size];

        let mut current = start;
        for slot in 0..size {
            let Some(key) = current else { break };
            let node = &self.entries[key];
            locators[slot] = node.locator;
            scores[slot] = node.score;
            current = node.next;
        }

        LocatorPage {
            locators,
            scores,
            next_cursor: self.identifier_at(current),
        }
    }

    /// Raw view of an identifier's entry.
    ///
    /// Absent identifiers report all zeros. Missing neighbours of a present
    /// entry are reported as [`Address::HEAD`].
    pub fn entries(&self, identifier: &Address) -> Entry {
        match self.node(identifier) {
            Some(node) => Entry {
                locator: node.locator,
                score: node.score,
                prev: self.identifier_at(node.prev),
                next: self.identifier_at(node.next),
            },
            None => Entry::default(),
        }
    }

    /// Score of an entry, 0 if absent.
    pub fn get_score(&self, identifier: &Address) -> Score {
        self.node(identifier).map_or(0, |node| node.score)
    }

    /// Locator of an entry, empty if absent.
    pub fn get_locator(&self, identifier: &Address) -> Locator {
        self.node(identifier).map_or(Locator::EMPTY, |node| node.locator)
    }

    /// Identifier of the highest-scoring entry.
    pub fn head(&self) -> Option<Address> {
        self.head.map(|key| self.entries[key].identifier)
    }

    /// Walk the entries in list order.
    pub fn iter(&self) -> Iter<'_> {
        Iter { index: self, current: self.head }
    }

    /// SSZ records of every entry in list order.
    pub fn records(&self) -> impl Iterator<Item = EntryRecord> + '_ {
        self.iter()
            .map(|node| EntryRecord::new(node.identifier, node.locator, node.score))
    }

    fn node(&self, identifier: &Address) -> Option<&EntryNode> {
        self.slots.get(identifier).map(|&key| &self.entries[key])
    }

    fn identifier_at(&self, key: Option<usize>) -> Address {
        key.map_or(Address::HEAD, |key| self.entries[key].identifier)
    }
}

/// Iterator over an [`Index`], highest score first.
pub struct Iter<'a> {
    index: &'a Index,
    current: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a EntryNode;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.index;
        let node = &index.entries[self.current?];
        self.current = node.next;
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.index.length()))
    }
}

impl<'a> IntoIterator for &'a Index {
    type Item = &'a EntryNode;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
