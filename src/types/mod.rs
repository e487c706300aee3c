//! Core data types for the intent indexer.
//!
//! ## Types
//!
//! - [`Address`]: 20-byte account/token address with `ZERO` and `HEAD` sentinels
//! - [`Locator`]: opaque 32-byte endpoint pointer
//! - [`Score`]: stake amount in staking-token base units
//! - [`MarketKey`]: directed token pair, optionally protocol-qualified
//! - [`RegistryEvent`]: everything the registry announces
//! - [`record`]: SSZ records for events and state hashing
//! - [`amount`]: decimal token amounts ↔ base units

mod address;
mod locator;
mod market;
mod event;
pub mod record;
pub mod amount;

/// Stake amount in staking-token base units.
///
/// Doubles as the sort key of an entry and the amount escrowed for it.
pub type Score = u128;

// Re-export all types at module level
pub use address::Address;
pub use locator::{DecodedLocator, Locator, LocatorKind, MAX_URL_LEN};
pub use market::{MarketKey, ProtocolId};
pub use event::{IndexEvent, RegistryEvent};
pub use record::{EntryRecord, EventRecord, MarketRecord};
