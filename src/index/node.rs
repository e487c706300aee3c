//! Entry node for slab-based storage.
//!
//! ## Design
//!
//! `EntryNode` holds one staker's entry plus doubly-linked list pointers.
//! The pointers are slab keys, not identifiers, so neighbours are found in
//! O(1) without a second map lookup.
//!
//! ## Slab Integration
//!
//! Per official slab docs (https://docs.rs/slab/0.4.11):
//! - Keys are `usize` values returned by `slab.insert()`
//! - Keys may be reused after `slab.remove()`
//! - O(1) insert, remove, and lookup
//!
//! A key is only reused after its node is unlinked and removed, so a live
//! `prev`/`next` pointer always names the node it was set to.
//!
//! ## Linked List
//!
//! - `prev`: neighbour with a higher (or equal, earlier) score
//! - `next`: neighbour with a lower (or equal, later) score

use crate::types::{Address, Locator, Score};

/// Entry node stored in the slab.
#[derive(Debug, Clone)]
pub struct EntryNode {
    /// Staker identity; unique within one index
    pub identifier: Address,

    pub locator: Locator,

    pub score: Score,

    /// Previous entry (slab key); None if this is the first entry
    pub prev: Option<usize>,

    /// Next entry (slab key); None if this is the last entry
    pub next: Option<usize>,
}

impl EntryNode {
    /// Create a new, unlinked entry node.
    ///
    /// # Example
    ///
    /// ```
    /// use intent_indexer::index::EntryNode;
    /// use intent_indexer::types::{Address, Locator};
    ///
    /// let alice = Address::from_low_u64_be(1);
    /// let node = EntryNode::new(alice, 2000, Locator::from_address(alice));
    ///
    /// assert!(node.is_unlinked());
    /// ```
    #[inline]
    pub fn new(identifier: Address, score: Score, locator: Locator) -> Self {
        Self {
            identifier,
            locator,
            score,
            prev: None,
            next: None,
        }
    }

    /// Not linked to any neighbour (a lone entry also reports true).
    #[inline]
    pub fn is_unlinked(&self) -> bool {
        self.next.is_none() && self.prev.is_none()
    }

    /// Would an entry with `score` arriving now go after this one?
    ///
    /// Equal scores queue behind earlier arrivals.
    #[inline]
    pub fn precedes(&self, score: Score) -> bool {
        self.score >= score
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
