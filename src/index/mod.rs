//! Per-market locator index.
//!
//! ## Architecture
//!
//! Each market has one [`Index`]: a list of entries kept in descending
//! score order, with arrival order breaking ties.
//!
//! - **Slab-based storage**: O(1) entry insertion, removal, and lookup
//! - **Identifier map**: O(1) membership check and unlink
//! - **Sorted linked list**: paginated reads walk from any entry
//!
//! ## Components
//!
//! - [`EntryNode`]: one staker's entry with linked-list pointers
//! - [`Index`]: the sorted list and its operations
//! - [`LocatorPage`] / [`Entry`]: read results
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Set locator | O(n) |
//! | Update locator | O(n) |
//! | Unset locator | O(1) |
//! | Get locators | O(limit) |
//! | Entry lookup | O(1) |
//!
//! Insertion walks from the head to find its slot.

pub mod node;
pub mod list;
pub mod page;

pub use node::EntryNode;
pub use list::{Index, Iter};
pub use page::{Entry, LocatorPage};
