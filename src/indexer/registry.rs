//! The staking registry facade.
//!
//! ## Architecture
//!
//! ```text
//! caller ──► Indexer ──► validate ──► StakingToken ──► Index ──► event log
//!                            │            (pull/refund)   (mutate)   (emit)
//!                            └── Paused / IndexDoesNotExist / PairIsBlacklisted / ...
//! ```
//!
//! Every writer follows the same order: all checks first, then the token
//! transfer, then list and escrow mutation, then events. A call that
//! returns `Err` has changed nothing.
//!
//! ## Escrow
//!
//! Each staker's escrow equals the sum of their entry scores across all
//! markets. The ledger is kept alongside the lists and can be audited with
//! [`Indexer::audit_escrow`].
//!
//! ## Example
//!
//! ```
//! use intent_indexer::indexer::{Indexer, TokenLedger};
//! use intent_indexer::types::{Address, Locator, MarketKey};
//!
//! let (owner, custody, alice) = (Address::from_low_u64_be(1), Address::from_low_u64_be(2), Address::from_low_u64_be(3));
//! let (dai, weth) = (Address::from_low_u64_be(0xda1), Address::from_low_u64_be(0xeee));
//!
//! let mut token = TokenLedger::new(Address::from_low_u64_be(0xa57));
//! token.mint(alice, 100).unwrap();
//! token.approve(alice, custody, 100);
//!
//! let mut indexer = Indexer::new(owner, custody, token);
//! let market = indexer.create_index(alice, dai, weth, None).unwrap();
//! indexer.set_intent(alice, market, 50, Locator::from_address(alice)).unwrap();
//!
//! assert_eq!(indexer.get_staked_amount(&alice, &market), 50);
//! assert_eq!(indexer.escrowed(&alice), 50);
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::IndexerConfig;
use crate::error::{ConfigError, IndexError, IndexerError};
use crate::index::{Index, LocatorPage};
use crate::indexer::root::{compute_state_root, StateRoot};
use crate::indexer::{LocatorWhitelist, StakingToken};
use crate::types::{Address, Locator, MarketKey, ProtocolId, RegistryEvent, Score};

/// Stake-weighted registry of per-market locator indexes.
pub struct Indexer<T: StakingToken> {
    owner: Address,

    /// Account that holds escrowed stake and spends stakers' allowances
    custody: Address,

    token: T,

    paused: bool,

    stake_minimum: Score,

    indexes: BTreeMap<MarketKey, Index>,

    blacklist: BTreeSet<Address>,

    whitelists: BTreeMap<MarketKey, Arc<dyn LocatorWhitelist>>,

    /// Staker to total escrowed across markets; zero balances are removed
    escrow: BTreeMap<Address, Score>,

    total_escrowed: Score,

    events: Vec<RegistryEvent>,
}

impl<T: StakingToken> fmt::Debug for Indexer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Indexer")
            .field("owner", &self.owner)
            .field("custody", &self.custody)
            .field("token", &self.token.address())
            .field("paused", &self.paused)
            .field("stake_minimum", &self.stake_minimum)
            .field("markets", &self.indexes.len())
            .field("blacklist", &self.blacklist)
            .field("total_escrowed", &self.total_escrowed)
            .field("events", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl<T: StakingToken> Indexer<T> {
    /// Create an empty, unpaused registry owned by `owner`.
    ///
    /// Records an initial `OwnershipTransferred` so a replayed log knows
    /// its owner.
    pub fn new(owner: Address, custody: Address, token: T) -> Self {
        let mut indexer = Self {
            owner,
            custody,
            token,
            paused: false,
            stake_minimum: 0,
            indexes: BTreeMap::new(),
            blacklist: BTreeSet::new(),
            whitelists: BTreeMap::new(),
            escrow: BTreeMap::new(),
            total_escrowed: 0,
            events: Vec::new(),
        };
        indexer.emit(RegistryEvent::OwnershipTransferred { new_owner: owner });
        indexer
    }

    /// Create a registry from a validated config.
    ///
    /// Initial blacklist, minimum and paused flag are applied as owner calls,
    /// so they show up in the event log.
    pub fn from_config(config: &IndexerConfig, token: T) -> Result<Self, ConfigError> {
        config.validate()?;
        let minimum = config.stake_minimum_units()?;
        let owner = config.owner;

        let mut indexer = Self::new(owner, config.custody, token);
        let apply = |result: Result<(), IndexerError>| result.map_err(|e| ConfigError::Invalid(e.to_string()));

        for token in &config.blacklist {
            apply(indexer.add_token_to_blacklist(owner, *token))?;
        }
        if minimum > 0 {
            apply(indexer.set_stake_minimum(owner, minimum))?;
        }
        if config.paused {
            apply(indexer.set_paused_status(owner, true))?;
        }

        info!(%owner, custody = %config.custody, minimum, paused = config.paused, "indexer configured");
        Ok(indexer)
    }

    // ========================================================================
    // Guards
    // ========================================================================

    fn ensure_owner(&self, caller: Address) -> Result<(), IndexerError> {
        if caller != self.owner {
            return Err(IndexerError::NotOwner(caller));
        }
        Ok(())
    }

    fn ensure_not_paused(&self) -> Result<(), IndexerError> {
        if self.paused {
            return Err(IndexerError::Paused);
        }
        Ok(())
    }

    fn ensure_pair_allowed(&self, market: &MarketKey) -> Result<(), IndexerError> {
        if self.is_pair_blacklisted(market) {
            return Err(IndexerError::PairIsBlacklisted);
        }
        Ok(())
    }

    fn emit(&mut self, event: RegistryEvent) {
        self.events.push(event);
    }

    // ========================================================================
    // Markets
    // ========================================================================

    /// Create the index for a market if it does not exist yet.
    ///
    /// Open to any caller. Creating an existing market is a no-op that
    /// returns the same key without an event.
    pub fn create_index(
        &mut self,
        caller: Address,
        signer_token: Address,
        sender_token: Address,
        protocol: Option<ProtocolId>,
    ) -> Result<MarketKey, IndexerError> {
        self.ensure_not_paused()?;

        let market = MarketKey { signer_token, sender_token, protocol };
        if !self.indexes.contains_key(&market) {
            self.indexes.insert(market, Index::new());
            self.emit(RegistryEvent::CreateIndex { market });
            debug!(%caller, %market, "index created");
        }
        Ok(market)
    }

    // ========================================================================
    // Owner controls
    // ========================================================================

    /// Blacklist a token. Markets involving it read as empty and reject
    /// new intents; existing entries stay put.
    pub fn add_token_to_blacklist(&mut self, caller: Address, token: Address) -> Result<(), IndexerError> {
        self.ensure_owner(caller)?;
        if self.blacklist.insert(token) {
            self.emit(RegistryEvent::AddTokenToBlacklist { token });
            info!(%token, "token blacklisted");
        }
        Ok(())
    }

    pub fn remove_token_from_blacklist(&mut self, caller: Address, token: Address) -> Result<(), IndexerError> {
        self.ensure_owner(caller)?;
        if self.blacklist.remove(&token) {
            self.emit(RegistryEvent::RemoveTokenFromBlacklist { token });
            info!(%token, "token removed from blacklist");
        }
        Ok(())
    }

    /// Install (`Some`) or remove (`None`) a market's locator whitelist.
    pub fn set_locator_whitelist(
        &mut self,
        caller: Address,
        market: MarketKey,
        whitelist: Option<Arc<dyn LocatorWhitelist>>,
    ) -> Result<(), IndexerError> {
        self.ensure_owner(caller)?;

        let address = whitelist.as_ref().map(|w| w.address());
        match whitelist {
            Some(whitelist) => self.whitelists.insert(market, whitelist),
            None => self.whitelists.remove(&market),
        };
        self.emit(RegistryEvent::SetLocatorWhitelist { market, whitelist: address });
        info!(%market, whitelist = ?address, "locator whitelist set");
        Ok(())
    }

    pub fn set_paused_status(&mut self, caller: Address, paused: bool) -> Result<(), IndexerError> {
        self.ensure_owner(caller)?;
        self.paused = paused;
        self.emit(RegistryEvent::SetPausedStatus { paused });
        info!(paused, "paused status set");
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> Result<(), IndexerError> {
        self.ensure_owner(caller)?;
        if new_owner.is_reserved() {
            return Err(IndexerError::InvalidOwner(new_owner));
        }
        self.owner = new_owner;
        self.emit(RegistryEvent::OwnershipTransferred { new_owner });
        info!(previous = %caller, %new_owner, "ownership transferred");
        Ok(())
    }

    /// Smallest score `set_intent` accepts from now on. Existing entries
    /// below it are not touched.
    pub fn set_stake_minimum(&mut self, caller: Address, amount: Score) -> Result<(), IndexerError> {
        self.ensure_owner(caller)?;
        self.stake_minimum = amount;
        self.emit(RegistryEvent::SetStakeMinimum { amount });
        info!(amount, "stake minimum set");
        Ok(())
    }

    // ========================================================================
    // Intents
    // ========================================================================

    /// Stake `score` on `market` with `locator`, creating or replacing the
    /// caller's entry.
    ///
    /// A new entry pulls `score` from the caller. Replacing an entry moves
    /// only the difference: more stake is pulled, less is refunded.
    pub fn set_intent(
        &mut self,
        caller: Address,
        market: MarketKey,
        score: Score,
        locator: Locator,
    ) -> Result<(), IndexerError> {
        self.ensure_not_paused()?;
        let index = self.indexes.get(&market).ok_or(IndexerError::IndexDoesNotExist)?;
        self.ensure_pair_allowed(&market)?;
        if let Some(whitelist) = self.whitelists.get(&market) {
            if !whitelist.is_whitelisted(&locator) {
                return Err(IndexerError::LocatorNotWhitelisted);
            }
        }
        if score < self.stake_minimum {
            return Err(IndexerError::MinimumNotMet { score, minimum: self.stake_minimum });
        }

        let existing = index.contains(&caller);
        if existing {
            index.check_update(&caller, &locator)?;
        } else {
            index.check_set(&caller, &locator)?;
        }
        let previous = index.get_score(&caller);

        let escrowed = self.escrowed(&caller);
        let (escrowed, total) = if score >= previous {
            let delta = score - previous;
            (
                escrowed.checked_add(delta).ok_or(IndexerError::AmountOverflow)?,
                self.total_escrowed.checked_add(delta).ok_or(IndexerError::AmountOverflow)?,
            )
        } else {
            let delta = previous - score;
            (
                escrowed.checked_sub(delta).ok_or(IndexerError::AmountOverflow)?,
                self.total_escrowed.checked_sub(delta).ok_or(IndexerError::AmountOverflow)?,
            )
        };

        if score > previous {
            self.pull_stake(caller, score - previous)?;
        } else if score < previous {
            self.refund_stake(caller, previous - score)?;
        }

        let index = self.indexes.get_mut(&market).ok_or(IndexerError::IndexDoesNotExist)?;
        let event = if existing {
            index.update_locator(caller, score, locator)?
        } else {
            index.set_locator(caller, score, locator)?
        };
        self.set_escrow(caller, escrowed, total);

        self.emit(event.for_market(market));
        self.emit(RegistryEvent::Stake { staker: caller, market, amount: score });
        debug!(staker = %caller, %market, score, previous, "intent set");
        Ok(())
    }

    /// Remove the caller's entry and refund its full score.
    ///
    /// Works on blacklisted pairs so stake can always be withdrawn.
    pub fn unset_intent(&mut self, caller: Address, market: MarketKey) -> Result<(), IndexerError> {
        self.ensure_not_paused()?;
        self.remove_intent(caller, market)
    }

    /// Owner-only removal of `staker`'s entry; the refund goes to `staker`.
    ///
    /// Allowed while paused, so the owner can unwind a halted registry.
    pub fn unset_intent_for_user(
        &mut self,
        caller: Address,
        staker: Address,
        market: MarketKey,
    ) -> Result<(), IndexerError> {
        self.ensure_owner(caller)?;
        self.remove_intent(staker, market)
    }

    fn remove_intent(&mut self, staker: Address, market: MarketKey) -> Result<(), IndexerError> {
        let index = self.indexes.get(&market).ok_or(IndexerError::IndexDoesNotExist)?;
        if !index.contains(&staker) {
            return Err(IndexError::EntryDoesNotExist(staker).into());
        }
        let score = index.get_score(&staker);

        let escrowed = self.escrowed(&staker).checked_sub(score).ok_or(IndexerError::EscrowDrift {
            staker,
            escrowed: self.escrowed(&staker),
            staked: score,
        })?;
        let total = self.total_escrowed.checked_sub(score).ok_or(IndexerError::AmountOverflow)?;

        self.refund_stake(staker, score)?;

        let index = self.indexes.get_mut(&market).ok_or(IndexerError::IndexDoesNotExist)?;
        let event = index.unset_locator(staker)?;
        self.set_escrow(staker, escrowed, total);

        self.emit(event.for_market(market));
        self.emit(RegistryEvent::Unstake { staker, market, amount: score });
        debug!(%staker, %market, refunded = score, "intent unset");
        Ok(())
    }

    // ========================================================================
    // Token movement
    // ========================================================================

    fn pull_stake(&mut self, staker: Address, amount: Score) -> Result<(), IndexerError> {
        if amount == 0 {
            return Ok(());
        }
        match self.token.transfer_from(self.custody, staker, self.custody, amount) {
            Ok(true) => Ok(()),
            Ok(false) => {
                warn!(%staker, amount, "stake transfer refused");
                Err(IndexerError::UnableToStake { staker, amount })
            }
            Err(error) => {
                warn!(%staker, amount, %error, "stake transfer failed");
                Err(IndexerError::UnableToStake { staker, amount })
            }
        }
    }

    fn refund_stake(&mut self, staker: Address, amount: Score) -> Result<(), IndexerError> {
        if amount == 0 {
            return Ok(());
        }
        match self.token.transfer(self.custody, staker, amount) {
            Ok(true) => Ok(()),
            Ok(false) => {
                warn!(%staker, amount, "refund transfer refused");
                Err(IndexerError::UnableToUnstake { staker, amount })
            }
            Err(error) => {
                warn!(%staker, amount, %error, "refund transfer failed");
                Err(IndexerError::UnableToUnstake { staker, amount })
            }
        }
    }

    fn set_escrow(&mut self, staker: Address, escrowed: Score, total: Score) {
        if escrowed == 0 {
            self.escrow.remove(&staker);
        } else {
            self.escrow.insert(staker, escrowed);
        }
        self.total_escrowed = total;
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Page through a market's locators.
    ///
    /// A missing market or a blacklisted pair reads as empty with a
    /// [`Address::ZERO`] cursor.
    pub fn get_locators(&self, market: &MarketKey, cursor: Address, limit: usize) -> LocatorPage {
        match self.indexes.get(market) {
            Some(index) if !self.is_pair_blacklisted(market) => index.get_locators(cursor, limit),
            _ => LocatorPage::empty(Address::ZERO),
        }
    }

    /// Score of `staker`'s entry on `market`, 0 if there is none.
    pub fn get_staked_amount(&self, staker: &Address, market: &MarketKey) -> Score {
        self.indexes.get(market).map_or(0, |index| index.get_score(staker))
    }

    /// Number of entries on `market`, 0 if it does not exist.
    pub fn length(&self, market: &MarketKey) -> usize {
        self.indexes.get(market).map_or(0, Index::length)
    }

    pub fn index(&self, market: &MarketKey) -> Option<&Index> {
        self.indexes.get(market)
    }

    pub fn markets(&self) -> impl Iterator<Item = &MarketKey> + '_ {
        self.indexes.keys()
    }

    #[inline]
    pub fn owner(&self) -> Address {
        self.owner
    }

    #[inline]
    pub fn custody(&self) -> Address {
        self.custody
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn stake_minimum(&self) -> Score {
        self.stake_minimum
    }

    pub fn staking_token(&self) -> &T {
        &self.token
    }

    pub fn is_blacklisted(&self, token: &Address) -> bool {
        self.blacklist.contains(token)
    }

    /// Is either side of `market` blacklisted?
    pub fn is_pair_blacklisted(&self, market: &MarketKey) -> bool {
        self.is_blacklisted(&market.signer_token) || self.is_blacklisted(&market.sender_token)
    }

    pub fn locator_whitelist(&self, market: &MarketKey) -> Option<Address> {
        self.whitelists.get(market).map(|w| w.address())
    }

    /// Total stake escrowed for `staker` across all markets.
    pub fn escrowed(&self, staker: &Address) -> Score {
        self.escrow.get(staker).copied().unwrap_or(0)
    }

    #[inline]
    pub fn total_escrowed(&self) -> Score {
        self.total_escrowed
    }

    /// Events recorded since creation or the last [`take_events`](Self::take_events).
    pub fn events(&self) -> &[RegistryEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<RegistryEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn state_root(&self) -> Result<StateRoot, IndexerError> {
        Ok(compute_state_root(&self.indexes, &self.blacklist, &self.escrow)?)
    }

    /// Recompute every staker's escrow from the lists and compare.
    ///
    /// Also checks the custody account actually holds the total.
    pub fn audit_escrow(&self) -> Result<(), IndexerError> {
        let mut staked: BTreeMap<Address, Score> = BTreeMap::new();
        for index in self.indexes.values() {
            for node in index {
                let sum = staked.entry(node.identifier).or_default();
                *sum = sum.checked_add(node.score).ok_or(IndexerError::AmountOverflow)?;
            }
        }

        for (staker, escrowed) in &self.escrow {
            let sum = staked.remove(staker).unwrap_or(0);
            if sum != *escrowed {
                return Err(IndexerError::EscrowDrift { staker: *staker, escrowed: *escrowed, staked: sum });
            }
        }
        // Stakers with entries but no ledger line; zero-score entries are fine
        if let Some((staker, sum)) = staked.into_iter().find(|(_, sum)| *sum > 0) {
            return Err(IndexerError::EscrowDrift { staker, escrowed: 0, staked: sum });
        }

        let ledger_total = self
            .escrow
            .values()
            .try_fold(0u128, |acc, v| acc.checked_add(*v))
            .ok_or(IndexerError::AmountOverflow)?;
        let held = self.token.balance_of(&self.custody);
        if ledger_total != self.total_escrowed || held < self.total_escrowed {
            return Err(IndexerError::EscrowDrift {
                staker: self.custody,
                escrowed: self.total_escrowed,
                staked: ledger_total.min(held),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::{StaticWhitelist, TokenLedger};

    const OWNER: u64 = 0x0a;
    const CUSTODY: u64 = 0xcc;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    fn loc(n: u64) -> Locator {
        Locator::from_address(addr(n))
    }

    fn dai() -> Address {
        addr(0xda1)
    }

    fn weth() -> Address {
        addr(0xeee)
    }

    /// Registry with stakers 1..=5 funded with 1_000 each and approved.
    fn setup() -> Indexer<TokenLedger> {
        let mut token = TokenLedger::new(addr(0xa57));
        for staker in 1..=5 {
            token.mint(addr(staker), 1_000).unwrap();
            token.approve(addr(staker), addr(CUSTODY), Score::MAX);
        }
        Indexer::new(addr(OWNER), addr(CUSTODY), token)
    }

    fn with_market() -> (Indexer<TokenLedger>, MarketKey) {
        let mut indexer = setup();
        let market = indexer.create_index(addr(1), dai(), weth(), None).unwrap();
        (indexer, market)
    }

    #[test]
    fn test_new_records_owner() {
        let indexer = setup();
        assert_eq!(indexer.owner(), addr(OWNER));
        assert_eq!(indexer.events(), &[RegistryEvent::OwnershipTransferred { new_owner: addr(OWNER) }]);
    }

    #[test]
    fn test_create_index_is_idempotent() {
        let mut indexer = setup();
        indexer.take_events();

        let first = indexer.create_index(addr(1), dai(), weth(), None).unwrap();
        let second = indexer.create_index(addr(2), dai(), weth(), None).unwrap();

        assert_eq!(first, second);
        assert_eq!(indexer.events(), &[RegistryEvent::CreateIndex { market: first }]);
        assert_eq!(indexer.markets().count(), 1);
    }

    #[test]
    fn test_create_index_direction_and_protocol_matter() {
        let mut indexer = setup();
        indexer.create_index(addr(1), dai(), weth(), None).unwrap();
        indexer.create_index(addr(1), weth(), dai(), None).unwrap();
        indexer.create_index(addr(1), dai(), weth(), Some(ProtocolId(0x4f1f))).unwrap();

        assert_eq!(indexer.markets().count(), 3);
    }

    #[test]
    fn test_set_intent_requires_index() {
        let mut indexer = setup();
        let market = MarketKey::new(dai(), weth());

        let err = indexer.set_intent(addr(1), market, 100, loc(1)).unwrap_err();
        assert_eq!(err, IndexerError::IndexDoesNotExist);
        assert_eq!(indexer.staking_token().balance_of(&addr(1)), 1_000);
    }

    #[test]
    fn test_set_intent_pulls_stake() {
        let (mut indexer, market) = with_market();
        indexer.take_events();

        indexer.set_intent(addr(1), market, 250, loc(1)).unwrap();

        assert_eq!(indexer.staking_token().balance_of(&addr(1)), 750);
        assert_eq!(indexer.staking_token().balance_of(&addr(CUSTODY)), 250);
        assert_eq!(indexer.get_staked_amount(&addr(1), &market), 250);
        assert_eq!(indexer.escrowed(&addr(1)), 250);
        assert_eq!(indexer.total_escrowed(), 250);
        assert_eq!(
            indexer.events(),
            &[
                RegistryEvent::SetLocator { market, identifier: addr(1), score: 250, locator: loc(1) },
                RegistryEvent::Stake { staker: addr(1), market, amount: 250 },
            ]
        );
        indexer.audit_escrow().unwrap();
    }

    #[test]
    fn test_set_intent_update_moves_only_difference() {
        let (mut indexer, market) = with_market();
        indexer.set_intent(addr(1), market, 250, loc(1)).unwrap();

        indexer.set_intent(addr(1), market, 400, loc(11)).unwrap();
        assert_eq!(indexer.staking_token().balance_of(&addr(1)), 600);
        assert_eq!(indexer.get_staked_amount(&addr(1), &market), 400);
        assert_eq!(indexer.index(&market).unwrap().get_locator(&addr(1)), loc(11));

        indexer.set_intent(addr(1), market, 100, loc(11)).unwrap();
        assert_eq!(indexer.staking_token().balance_of(&addr(1)), 900);
        assert_eq!(indexer.escrowed(&addr(1)), 100);
        assert_eq!(indexer.length(&market), 1);
        indexer.audit_escrow().unwrap();
    }

    #[test]
    fn test_set_intent_insufficient_funds() {
        let (mut indexer, market) = with_market();
        indexer.take_events();

        let err = indexer.set_intent(addr(1), market, 1_001, loc(1)).unwrap_err();
        assert_eq!(err, IndexerError::UnableToStake { staker: addr(1), amount: 1_001 });
        assert_eq!(indexer.length(&market), 0);
        assert_eq!(indexer.total_escrowed(), 0);
        assert!(indexer.events().is_empty());
    }

    #[test]
    fn test_set_intent_blacklisted_pair() {
        let (mut indexer, market) = with_market();
        indexer.add_token_to_blacklist(addr(OWNER), weth()).unwrap();

        let err = indexer.set_intent(addr(1), market, 100, loc(1)).unwrap_err();
        assert_eq!(err, IndexerError::PairIsBlacklisted);
        assert_eq!(err.code(), "PAIR_IS_BLACKLISTED");
    }

    #[test]
    fn test_set_intent_rejects_empty_locator_before_transfer() {
        let (mut indexer, market) = with_market();

        let err = indexer.set_intent(addr(1), market, 100, Locator::EMPTY).unwrap_err();
        assert_eq!(err, IndexerError::Index(IndexError::LocatorRequired));
        assert_eq!(indexer.staking_token().balance_of(&addr(1)), 1_000);
    }

    #[test]
    fn test_set_intent_whitelist() {
        let (mut indexer, market) = with_market();
        let whitelist = StaticWhitelist::with_locators(addr(0x111), [loc(1)]);
        indexer.set_locator_whitelist(addr(OWNER), market, Some(Arc::new(whitelist))).unwrap();
        assert_eq!(indexer.locator_whitelist(&market), Some(addr(0x111)));

        assert_eq!(
            indexer.set_intent(addr(2), market, 10, loc(2)),
            Err(IndexerError::LocatorNotWhitelisted)
        );
        indexer.set_intent(addr(1), market, 10, loc(1)).unwrap();

        indexer.set_locator_whitelist(addr(OWNER), market, None).unwrap();
        assert_eq!(indexer.locator_whitelist(&market), None);
        indexer.set_intent(addr(2), market, 10, loc(2)).unwrap();
    }

    #[test]
    fn test_set_intent_stake_minimum() {
        let (mut indexer, market) = with_market();
        indexer.set_stake_minimum(addr(OWNER), 100).unwrap();

        assert_eq!(
            indexer.set_intent(addr(1), market, 99, loc(1)),
            Err(IndexerError::MinimumNotMet { score: 99, minimum: 100 })
        );
        indexer.set_intent(addr(1), market, 100, loc(1)).unwrap();
    }

    #[test]
    fn test_unset_intent_refunds() {
        let (mut indexer, market) = with_market();
        indexer.set_intent(addr(1), market, 250, loc(1)).unwrap();
        indexer.take_events();

        indexer.unset_intent(addr(1), market).unwrap();

        assert_eq!(indexer.staking_token().balance_of(&addr(1)), 1_000);
        assert_eq!(indexer.length(&market), 0);
        assert_eq!(indexer.escrowed(&addr(1)), 0);
        assert_eq!(
            indexer.events(),
            &[
                RegistryEvent::UnsetLocator { market, identifier: addr(1) },
                RegistryEvent::Unstake { staker: addr(1), market, amount: 250 },
            ]
        );
    }

    #[test]
    fn test_unset_intent_errors() {
        let mut indexer = setup();
        let market = MarketKey::new(dai(), weth());
        assert_eq!(indexer.unset_intent(addr(1), market), Err(IndexerError::IndexDoesNotExist));

        indexer.create_index(addr(1), dai(), weth(), None).unwrap();
        let err = indexer.unset_intent(addr(1), market).unwrap_err();
        assert_eq!(err.code(), "ENTRY_DOES_NOT_EXIST");
    }

    #[test]
    fn test_unset_intent_on_blacklisted_pair() {
        let (mut indexer, market) = with_market();
        indexer.set_intent(addr(1), market, 250, loc(1)).unwrap();
        indexer.add_token_to_blacklist(addr(OWNER), dai()).unwrap();

        indexer.unset_intent(addr(1), market).unwrap();
        assert_eq!(indexer.staking_token().balance_of(&addr(1)), 1_000);
    }

    #[test]
    fn test_unset_intent_for_user() {
        let (mut indexer, market) = with_market();
        indexer.set_intent(addr(1), market, 250, loc(1)).unwrap();

        assert_eq!(
            indexer.unset_intent_for_user(addr(2), addr(1), market),
            Err(IndexerError::NotOwner(addr(2)))
        );

        indexer.set_paused_status(addr(OWNER), true).unwrap();
        indexer.unset_intent_for_user(addr(OWNER), addr(1), market).unwrap();
        assert_eq!(indexer.staking_token().balance_of(&addr(1)), 1_000);
        assert_eq!(indexer.events().last(), Some(&RegistryEvent::Unstake { staker: addr(1), market, amount: 250 }));
    }

    #[test]
    fn test_paused_rejects_writes() {
        let (mut indexer, market) = with_market();
        indexer.set_intent(addr(1), market, 250, loc(1)).unwrap();
        indexer.set_paused_status(addr(OWNER), true).unwrap();

        assert_eq!(indexer.create_index(addr(1), weth(), dai(), None), Err(IndexerError::Paused));
        assert_eq!(indexer.set_intent(addr(2), market, 1, loc(2)), Err(IndexerError::Paused));
        assert_eq!(indexer.unset_intent(addr(1), market), Err(IndexerError::Paused));

        // Reads stay available
        assert_eq!(indexer.get_locators(&market, Address::HEAD, 10).scores, vec![250]);

        indexer.set_paused_status(addr(OWNER), false).unwrap();
        indexer.unset_intent(addr(1), market).unwrap();
    }

    #[test]
    fn test_owner_only_calls() {
        let mut indexer = setup();
        let market = MarketKey::new(dai(), weth());
        let stranger = addr(1);

        assert!(indexer.add_token_to_blacklist(stranger, dai()).unwrap_err().is_authorization());
        assert!(indexer.remove_token_from_blacklist(stranger, dai()).unwrap_err().is_authorization());
        assert!(indexer.set_locator_whitelist(stranger, market, None).unwrap_err().is_authorization());
        assert!(indexer.set_paused_status(stranger, true).unwrap_err().is_authorization());
        assert!(indexer.set_stake_minimum(stranger, 1).unwrap_err().is_authorization());
        assert!(indexer.transfer_ownership(stranger, stranger).unwrap_err().is_authorization());
        assert_eq!(indexer.events().len(), 1);
    }

    #[test]
    fn test_transfer_ownership() {
        let mut indexer = setup();
        indexer.transfer_ownership(addr(OWNER), addr(2)).unwrap();

        assert_eq!(indexer.owner(), addr(2));
        assert!(indexer.set_paused_status(addr(OWNER), true).is_err());
        indexer.set_paused_status(addr(2), true).unwrap();
        assert_eq!(
            indexer.transfer_ownership(addr(2), Address::ZERO),
            Err(IndexerError::InvalidOwner(Address::ZERO))
        );
    }

    #[test]
    fn test_blacklist_toggles_emit_once() {
        let mut indexer = setup();
        indexer.take_events();

        indexer.add_token_to_blacklist(addr(OWNER), dai()).unwrap();
        indexer.add_token_to_blacklist(addr(OWNER), dai()).unwrap();
        assert!(indexer.is_blacklisted(&dai()));
        assert_eq!(indexer.events().len(), 1);

        indexer.remove_token_from_blacklist(addr(OWNER), dai()).unwrap();
        indexer.remove_token_from_blacklist(addr(OWNER), dai()).unwrap();
        assert!(!indexer.is_blacklisted(&dai()));
        assert_eq!(indexer.events().len(), 2);
    }

    #[test]
    fn test_get_locators_filters_blacklist() {
        let (mut indexer, market) = with_market();
        indexer.set_intent(addr(1), market, 50, loc(1)).unwrap();

        indexer.add_token_to_blacklist(addr(OWNER), dai()).unwrap();
        let page = indexer.get_locators(&market, Address::HEAD, 10);
        assert!(page.is_empty());
        assert_eq!(page.next_cursor, Address::ZERO);

        indexer.remove_token_from_blacklist(addr(OWNER), dai()).unwrap();
        assert_eq!(indexer.get_locators(&market, Address::HEAD, 10).locators, vec![loc(1)]);
    }

    #[test]
    fn test_get_locators_missing_market() {
        let indexer = setup();
        let page = indexer.get_locators(&MarketKey::new(dai(), weth()), Address::HEAD, 10);
        assert_eq!(page, LocatorPage::empty(Address::ZERO));
        assert_eq!(indexer.get_staked_amount(&addr(1), &MarketKey::new(dai(), weth())), 0);
    }

    #[test]
    fn test_escrow_spans_markets() {
        let (mut indexer, market) = with_market();
        let other = indexer.create_index(addr(1), weth(), dai(), None).unwrap();

        indexer.set_intent(addr(1), market, 300, loc(1)).unwrap();
        indexer.set_intent(addr(1), other, 200, loc(1)).unwrap();
        assert_eq!(indexer.escrowed(&addr(1)), 500);
        indexer.audit_escrow().unwrap();

        indexer.unset_intent(addr(1), market).unwrap();
        assert_eq!(indexer.escrowed(&addr(1)), 200);
        assert_eq!(indexer.total_escrowed(), 200);
        indexer.audit_escrow().unwrap();
    }

    #[test]
    fn test_from_config_applies_initial_state() {
        let mut config = IndexerConfig::new(addr(OWNER), addr(CUSTODY));
        config.token_decimals = 2;
        config.stake_minimum = "1.5".into();
        config.blacklist = vec![dai()];
        config.paused = true;

        let indexer = Indexer::from_config(&config, TokenLedger::new(addr(0xa57))).unwrap();
        assert_eq!(indexer.stake_minimum(), 150);
        assert!(indexer.is_blacklisted(&dai()));
        assert!(indexer.is_paused());
        assert_eq!(indexer.events().len(), 4);
    }

    #[test]
    fn test_state_root_tracks_mutations() {
        let (mut indexer, market) = with_market();
        let empty = indexer.state_root().unwrap();

        indexer.set_intent(addr(1), market, 50, loc(1)).unwrap();
        let staked = indexer.state_root().unwrap();
        assert_ne!(empty, staked);

        indexer.unset_intent(addr(1), market).unwrap();
        assert_eq!(indexer.state_root().unwrap(), empty);
    }
}
