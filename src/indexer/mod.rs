//! Staking facade over the per-market indexes.
//!
//! ## Components
//!
//! - [`Indexer`]: markets, escrow, blacklist, whitelists, owner controls
//! - [`StakingToken`] / [`TokenLedger`]: the token stake is escrowed in
//! - [`LocatorWhitelist`] / [`StaticWhitelist`]: optional per-market
//!   locator approval
//! - [`SharedIndexer`]: mutex-guarded handle for multi-threaded hosts
//! - [`StateRoot`]: digest of the registry's replayable state

pub mod registry;
pub mod root;
pub mod shared;
pub mod token;
pub mod whitelist;

pub use registry::Indexer;
pub use root::StateRoot;
pub use shared::SharedIndexer;
pub use token::{StakingToken, TokenLedger};
pub use whitelist::{LocatorWhitelist, StaticWhitelist};
