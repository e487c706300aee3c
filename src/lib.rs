//! # Intent Indexer
//!
//! Stake-weighted discovery registry for peer-to-peer trading intents.
//!
//! ## Architecture
//!
//! The registry consists of:
//! - **Types**: addresses, locators, market keys, events and SSZ records
//! - **Index**: per-market list of entries sorted by score, slab-backed
//! - **Indexer**: staking facade tying list membership to escrowed tokens
//! - **Replay**: rebuilds registry state from the event log
//!
//! ## Design Principles
//!
//! 1. **Determinism**: list order depends only on the sequence of calls, so
//!    replaying the event log reproduces the same state root
//! 2. **All-or-nothing calls**: every writer validates, moves tokens, then
//!    mutates; a returned error means nothing changed
//! 3. **No Floating Point**: stake is integer base units; decimals only at
//!    the edges via `rust_decimal`
//! 4. **Synchronous Execution**: `&mut self` serializes calls; hosts that
//!    share a registry across threads use [`SharedIndexer`]
//!
//! ## Example
//!
//! ```
//! use intent_indexer::{Address, Indexer, Locator, TokenLedger};
//!
//! let (owner, custody) = (Address::from_low_u64_be(0xaa), Address::from_low_u64_be(0xcc));
//! let (alice, bob) = (Address::from_low_u64_be(1), Address::from_low_u64_be(2));
//! let (dai, weth) = (Address::from_low_u64_be(0xda1), Address::from_low_u64_be(0xeee));
//!
//! let mut token = TokenLedger::new(Address::from_low_u64_be(0xa57));
//! for staker in [alice, bob] {
//!     token.mint(staker, 1_000).unwrap();
//!     token.approve(staker, custody, 1_000);
//! }
//!
//! let mut indexer = Indexer::new(owner, custody, token);
//! let market = indexer.create_index(alice, dai, weth, None).unwrap();
//! indexer.set_intent(alice, market, 50, Locator::from_address(alice)).unwrap();
//! indexer.set_intent(bob, market, 100, Locator::from_address(bob)).unwrap();
//!
//! let page = indexer.get_locators(&market, Address::HEAD, 10);
//! assert_eq!(page.locators, vec![Locator::from_address(bob), Locator::from_address(alice)]);
//! ```

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: Address, Locator, MarketKey, events, records
pub mod types;

/// Error types with stable codes
pub mod error;

/// Per-market sorted locator index
pub mod index;

/// Staking registry facade and its collaborators
pub mod indexer;

/// Event log replay
pub mod replay;

/// JSON configuration
pub mod config;

/// Tracing subscriber setup
pub mod logging;

/// Controllable token and whitelist for tests
pub mod mocks;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use types::{Address, Locator, MarketKey, ProtocolId, RegistryEvent, Score};
pub use error::{IndexError, IndexerError};
pub use index::{Index, LocatorPage};
pub use indexer::{Indexer, SharedIndexer, StakingToken, StateRoot, TokenLedger};
pub use replay::ReplayedRegistry;
pub use config::IndexerConfig;
