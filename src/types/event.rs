//! Registry events.
//!
//! Events are the only durable, externally observable signal of the
//! registry. Every successful mutation appends one or more events; failed
//! calls append nothing. Off-chain consumers rebuild state by replaying the
//! log in order (see [`crate::replay`]).

use std::fmt;

use crate::types::{Address, Locator, MarketKey, Score};

/// Event emitted by an [`Index`](crate::index::Index) mutation.
///
/// Indexes do not know which market they serve; the Indexer attaches the
/// market when it lifts these into [`RegistryEvent`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexEvent {
    SetLocator { identifier: Address, score: Score, locator: Locator },
    UnsetLocator { identifier: Address },
}

impl IndexEvent {
    pub fn for_market(self, market: MarketKey) -> RegistryEvent {
        match self {
            IndexEvent::SetLocator { identifier, score, locator } => {
                RegistryEvent::SetLocator { market, identifier, score, locator }
            }
            IndexEvent::UnsetLocator { identifier } => RegistryEvent::UnsetLocator { market, identifier },
        }
    }
}

/// Everything the registry announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A market's index was created
    CreateIndex { market: MarketKey },
    /// A staker set or changed an intent; `amount` is the new total stake
    Stake { staker: Address, market: MarketKey, amount: Score },
    /// A staker's intent was removed and `amount` refunded
    Unstake { staker: Address, market: MarketKey, amount: Score },
    AddTokenToBlacklist { token: Address },
    RemoveTokenFromBlacklist { token: Address },
    /// An entry was inserted or repositioned
    SetLocator { market: MarketKey, identifier: Address, score: Score, locator: Locator },
    /// An entry was removed
    UnsetLocator { market: MarketKey, identifier: Address },
    /// `None` removes the market's whitelist
    SetLocatorWhitelist { market: MarketKey, whitelist: Option<Address> },
    SetPausedStatus { paused: bool },
    OwnershipTransferred { new_owner: Address },
    SetStakeMinimum { amount: Score },
}

impl RegistryEvent {
    /// Short event name as used by log consumers.
    pub fn name(&self) -> &'static str {
        match self {
            RegistryEvent::CreateIndex { .. } => "CreateIndex",
            RegistryEvent::Stake { .. } => "Stake",
            RegistryEvent::Unstake { .. } => "Unstake",
            RegistryEvent::AddTokenToBlacklist { .. } => "AddTokenToBlacklist",
            RegistryEvent::RemoveTokenFromBlacklist { .. } => "RemoveTokenFromBlacklist",
            RegistryEvent::SetLocator { .. } => "SetLocator",
            RegistryEvent::UnsetLocator { .. } => "UnsetLocator",
            RegistryEvent::SetLocatorWhitelist { .. } => "SetLocatorWhitelist",
            RegistryEvent::SetPausedStatus { .. } => "SetPausedStatus",
            RegistryEvent::OwnershipTransferred { .. } => "OwnershipTransferred",
            RegistryEvent::SetStakeMinimum { .. } => "SetStakeMinimum",
        }
    }

    /// Market the event belongs to, if any.
    pub fn market(&self) -> Option<MarketKey> {
        match self {
            RegistryEvent::CreateIndex { market }
            | RegistryEvent::Stake { market, .. }
            | RegistryEvent::Unstake { market, .. }
            | RegistryEvent::SetLocator { market, .. }
            | RegistryEvent::UnsetLocator { market, .. }
            | RegistryEvent::SetLocatorWhitelist { market, .. } => Some(*market),
            _ => None,
        }
    }
}

impl fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryEvent::CreateIndex { market } => write!(f, "CreateIndex({market})"),
            RegistryEvent::Stake { staker, market, amount } => write!(f, "Stake({staker}, {market}, {amount})"),
            RegistryEvent::Unstake { staker, market, amount } => write!(f, "Unstake({staker}, {market}, {amount})"),
            RegistryEvent::AddTokenToBlacklist { token } => write!(f, "AddTokenToBlacklist({token})"),
            RegistryEvent::RemoveTokenFromBlacklist { token } => write!(f, "RemoveTokenFromBlacklist({token})"),
            RegistryEvent::SetLocator { market, identifier, score, locator } => {
                write!(f, "SetLocator({market}, {identifier}, {score}, {locator})")
            }
            RegistryEvent::UnsetLocator { market, identifier } => write!(f, "UnsetLocator({market}, {identifier})"),
            RegistryEvent::SetLocatorWhitelist { market, whitelist: Some(w) } => {
                write!(f, "SetLocatorWhitelist({market}, {w})")
            }
            RegistryEvent::SetLocatorWhitelist { market, whitelist: None } => {
                write!(f, "SetLocatorWhitelist({market}, none)")
            }
            RegistryEvent::SetPausedStatus { paused } => write!(f, "SetPausedStatus({paused})"),
            RegistryEvent::OwnershipTransferred { new_owner } => write!(f, "OwnershipTransferred({new_owner})"),
            RegistryEvent::SetStakeMinimum { amount } => write!(f, "SetStakeMinimum({amount})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_event_lifts_into_market() {
        let market = MarketKey::new(Address::from_low_u64_be(1), Address::from_low_u64_be(2));
        let alice = Address::from_low_u64_be(10);

        let lifted = IndexEvent::UnsetLocator { identifier: alice }.for_market(market);
        assert_eq!(lifted, RegistryEvent::UnsetLocator { market, identifier: alice });
        assert_eq!(lifted.market(), Some(market));
        assert_eq!(lifted.name(), "UnsetLocator");
    }

    #[test]
    fn test_global_events_have_no_market() {
        assert_eq!(RegistryEvent::SetPausedStatus { paused: true }.market(), None);
        assert_eq!(RegistryEvent::AddTokenToBlacklist { token: Address::HEAD }.market(), None);
    }
}
