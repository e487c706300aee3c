//! Rebuild registry state from its event log.
//!
//! Off-chain consumers never see an [`Indexer`](crate::indexer::Indexer)
//! directly; they see its events. [`ReplayedRegistry`] applies those events
//! in order and arrives at the same lists, blacklist and escrow, and
//! therefore the same [`StateRoot`].
//!
//! `SetLocator`/`UnsetLocator` drive the lists and the escrow ledger.
//! `Stake`/`Unstake` carry no extra state; they are checked against the
//! list change that precedes them, so a tampered or reordered log is
//! rejected instead of silently producing different state.
//!
//! ## Example
//!
//! ```
//! use intent_indexer::replay::ReplayedRegistry;
//! use intent_indexer::types::{Address, MarketKey, RegistryEvent};
//!
//! let market = MarketKey::new(Address::from_low_u64_be(1), Address::from_low_u64_be(2));
//! let replayed = ReplayedRegistry::from_events(&[RegistryEvent::CreateIndex { market }]).unwrap();
//!
//! assert_eq!(replayed.markets().count(), 1);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use crate::error::CodecError;
use crate::index::{Index, LocatorPage};
use crate::indexer::root::{compute_state_root, StateRoot};
use crate::types::record::decode_events;
use crate::types::{Address, MarketKey, RegistryEvent, Score};

/// Registry state reconstructed from events alone.
#[derive(Debug, Clone, Default)]
pub struct ReplayedRegistry {
    owner: Address,
    paused: bool,
    stake_minimum: Score,
    indexes: BTreeMap<MarketKey, Index>,
    blacklist: BTreeSet<Address>,
    whitelists: BTreeMap<MarketKey, Address>,
    escrow: BTreeMap<Address, Score>,
    total_escrowed: Score,
    /// Last list change, checked by the following Stake/Unstake
    last_change: Option<(MarketKey, Address, Score)>,
    applied: u64,
}

impl ReplayedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a RegistryEvent>) -> Result<Self, CodecError> {
        let mut registry = Self::new();
        for event in events {
            registry.apply(event)?;
        }
        debug!(events = registry.applied, markets = registry.indexes.len(), "log replayed");
        Ok(registry)
    }

    /// Decode an SSZ event log and replay it.
    pub fn from_log(bytes: &[u8]) -> Result<Self, CodecError> {
        let events = decode_events(bytes)?;
        Self::from_events(&events)
    }

    /// Apply the next event of the log.
    pub fn apply(&mut self, event: &RegistryEvent) -> Result<(), CodecError> {
        let sequence = self.applied;
        let fail = |reason: String| CodecError::Replay { sequence, reason };
        trace!(sequence, event = event.name(), "applying");

        match *event {
            RegistryEvent::CreateIndex { market } => {
                if self.indexes.insert(market, Index::new()).is_some() {
                    return Err(fail(format!("market {market} created twice")));
                }
            }
            RegistryEvent::SetLocator { market, identifier, score, locator } => {
                let index = self
                    .indexes
                    .get_mut(&market)
                    .ok_or_else(|| fail(format!("market {market} does not exist")))?;
                let previous = index.get_score(&identifier);
                let result = if index.contains(&identifier) {
                    index.update_locator(identifier, score, locator)
                } else {
                    index.set_locator(identifier, score, locator)
                };
                result.map_err(|e| fail(e.to_string()))?;

                self.adjust_escrow(identifier, previous, score).map_err(fail)?;
                self.last_change = Some((market, identifier, score));
            }
            RegistryEvent::UnsetLocator { market, identifier } => {
                let index = self
                    .indexes
                    .get_mut(&market)
                    .ok_or_else(|| fail(format!("market {market} does not exist")))?;
                let previous = index.get_score(&identifier);
                index.unset_locator(identifier).map_err(|e| fail(e.to_string()))?;

                self.adjust_escrow(identifier, previous, 0).map_err(fail)?;
                self.last_change = Some((market, identifier, previous));
            }
            RegistryEvent::Stake { staker, market, amount }
            | RegistryEvent::Unstake { staker, market, amount } => {
                if self.last_change.take() != Some((market, staker, amount)) {
                    return Err(fail(format!("{} for {staker} does not match the list change", event.name())));
                }
            }
            RegistryEvent::AddTokenToBlacklist { token } => {
                self.blacklist.insert(token);
            }
            RegistryEvent::RemoveTokenFromBlacklist { token } => {
                self.blacklist.remove(&token);
            }
            RegistryEvent::SetLocatorWhitelist { market, whitelist } => match whitelist {
                Some(address) => {
                    self.whitelists.insert(market, address);
                }
                None => {
                    self.whitelists.remove(&market);
                }
            },
            RegistryEvent::SetPausedStatus { paused } => self.paused = paused,
            RegistryEvent::OwnershipTransferred { new_owner } => self.owner = new_owner,
            RegistryEvent::SetStakeMinimum { amount } => self.stake_minimum = amount,
        }

        self.applied += 1;
        Ok(())
    }

    fn adjust_escrow(&mut self, staker: Address, previous: Score, score: Score) -> Result<(), String> {
        let escrowed = self.escrow.get(&staker).copied().unwrap_or(0);
        let (escrowed, total) = if score >= previous {
            let delta = score - previous;
            (escrowed.checked_add(delta), self.total_escrowed.checked_add(delta))
        } else {
            let delta = previous - score;
            (escrowed.checked_sub(delta), self.total_escrowed.checked_sub(delta))
        };
        let (Some(escrowed), Some(total)) = (escrowed, total) else {
            return Err(format!("escrow for {staker} out of range"));
        };

        if escrowed == 0 {
            self.escrow.remove(&staker);
        } else {
            self.escrow.insert(staker, escrowed);
        }
        self.total_escrowed = total;
        Ok(())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Same filtering as the live registry: missing market or blacklisted
    /// pair reads as empty.
    pub fn get_locators(&self, market: &MarketKey, cursor: Address, limit: usize) -> LocatorPage {
        match self.indexes.get(market) {
            Some(index) if !self.is_pair_blacklisted(market) => index.get_locators(cursor, limit),
            _ => LocatorPage::empty(Address::ZERO),
        }
    }

    pub fn index(&self, market: &MarketKey) -> Option<&Index> {
        self.indexes.get(market)
    }

    pub fn markets(&self) -> impl Iterator<Item = &MarketKey> + '_ {
        self.indexes.keys()
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn stake_minimum(&self) -> Score {
        self.stake_minimum
    }

    pub fn is_blacklisted(&self, token: &Address) -> bool {
        self.blacklist.contains(token)
    }

    pub fn is_pair_blacklisted(&self, market: &MarketKey) -> bool {
        self.is_blacklisted(&market.signer_token) || self.is_blacklisted(&market.sender_token)
    }

    pub fn locator_whitelist(&self, market: &MarketKey) -> Option<Address> {
        self.whitelists.get(market).copied()
    }

    pub fn escrowed(&self, staker: &Address) -> Score {
        self.escrow.get(staker).copied().unwrap_or(0)
    }

    pub fn total_escrowed(&self) -> Score {
        self.total_escrowed
    }

    /// Number of events applied.
    pub fn applied(&self) -> u64 {
        self.applied
    }

    pub fn state_root(&self) -> Result<StateRoot, CodecError> {
        compute_state_root(&self.indexes, &self.blacklist, &self.escrow)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
