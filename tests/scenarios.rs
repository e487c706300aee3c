//! End-to-end registry scenarios.
//!
//! Covers the documented walkthroughs (DAI/WETH with alice, bob and carol),
//! failure atomicity with injected token failures, whitelist handling,
//! concurrent access through `SharedIndexer`, and config loading.

use std::sync::Arc;
use std::thread;

use intent_indexer::config::IndexerConfig;
use intent_indexer::error::{IndexError, IndexerError};
use intent_indexer::mocks::{MockToken, MockTokenFailure, MockWhitelist};
use intent_indexer::replay::ReplayedRegistry;
use intent_indexer::types::record::{decode_events, encode_events};
use intent_indexer::types::LocatorKind;
use intent_indexer::{Address, Indexer, Locator, MarketKey, RegistryEvent, Score, SharedIndexer, StakingToken};

// ============================================================================
// FIXTURES
// ============================================================================

fn owner() -> Address {
    Address::from_low_u64_be(0xaa)
}

fn custody() -> Address {
    Address::from_low_u64_be(0xcc)
}

fn alice() -> Address {
    Address::from_low_u64_be(1)
}

fn bob() -> Address {
    Address::from_low_u64_be(2)
}

fn carol() -> Address {
    Address::from_low_u64_be(3)
}

fn dai() -> Address {
    Address::from_low_u64_be(0xda1)
}

fn weth() -> Address {
    Address::from_low_u64_be(0xeee)
}

fn locator(staker: Address) -> Locator {
    Locator::from_address(staker)
}

fn funded_registry() -> Indexer<MockToken> {
    let mut token = MockToken::new(Address::from_low_u64_be(0xa57));
    for staker in [alice(), bob(), carol()] {
        token.fund(staker, custody(), 1_000).unwrap();
    }
    Indexer::new(owner(), custody(), token)
}

/// DAI/WETH with alice 50, bob 100, carol 75.
fn three_stakers() -> (Indexer<MockToken>, MarketKey) {
    let mut indexer = funded_registry();
    let market = indexer.create_index(alice(), dai(), weth(), None).unwrap();
    indexer.set_intent(alice(), market, 50, locator(alice())).unwrap();
    indexer.set_intent(bob(), market, 100, locator(bob())).unwrap();
    indexer.set_intent(carol(), market, 75, locator(carol())).unwrap();
    (indexer, market)
}

// ============================================================================
// WALKTHROUGHS
// ============================================================================

#[test]
fn scenario_full_read() {
    let (indexer, market) = three_stakers();

    let page = indexer.get_locators(&market, Address::HEAD, 4);
    assert_eq!(page.locators, vec![locator(bob()), locator(carol()), locator(alice())]);
    assert_eq!(page.scores, vec![100, 75, 50]);
    assert_eq!(page.next_cursor, Address::HEAD);
}

#[test]
fn scenario_paged_read() {
    let (indexer, market) = three_stakers();

    let first = indexer.get_locators(&market, Address::HEAD, 1);
    assert_eq!(first.locators, vec![locator(bob())]);
    assert_eq!(first.scores, vec![100]);
    assert_eq!(first.next_cursor, carol());

    let rest = indexer.get_locators(&market, carol(), 5);
    assert_eq!(rest.locators, vec![locator(carol()), locator(alice()), Locator::EMPTY]);
    assert_eq!(rest.scores, vec![75, 50, 0]);
    assert_eq!(rest.next_cursor, Address::HEAD);
}

#[test]
fn scenario_tie_break_is_arrival_order() {
    let mut token = MockToken::new(Address::from_low_u64_be(0xa57));
    let stakers: Vec<Address> = (1..=4).map(Address::from_low_u64_be).collect();
    for staker in &stakers {
        token.fund(*staker, custody(), 5_000).unwrap();
    }
    let mut indexer = Indexer::new(owner(), custody(), token);
    let market = indexer.create_index(stakers[0], dai(), weth(), None).unwrap();

    // A 2000, B 0, C 2000, D 0
    for (staker, score) in stakers.iter().zip([2000, 0, 2000, 0]) {
        indexer.set_intent(*staker, market, score, locator(*staker)).unwrap();
    }

    let page = indexer.get_locators(&market, Address::HEAD, 4);
    let expected: Vec<Locator> = [0, 2, 1, 3].iter().map(|&i| locator(stakers[i])).collect();
    assert_eq!(page.locators, expected);
    assert_eq!(page.scores, vec![2000, 2000, 0, 0]);
}

#[test]
fn scenario_blacklist_hides_then_restores() {
    let (mut indexer, market) = three_stakers();
    let before = indexer.get_locators(&market, Address::HEAD, 10);

    indexer.add_token_to_blacklist(owner(), dai()).unwrap();
    let hidden = indexer.get_locators(&market, Address::HEAD, 10);
    assert!(hidden.is_empty());
    assert_eq!(hidden.next_cursor, Address::ZERO);
    // Entries are filtered, not deleted
    assert_eq!(indexer.length(&market), 3);

    indexer.remove_token_from_blacklist(owner(), dai()).unwrap();
    assert_eq!(indexer.get_locators(&market, Address::HEAD, 10), before);
}

#[test]
fn scenario_entry_view() {
    let (indexer, market) = three_stakers();
    let index = indexer.index(&market).unwrap();

    let entry = index.entries(&carol());
    assert_eq!(entry.score, 75);
    assert_eq!(entry.prev, bob());
    assert_eq!(entry.next, alice());

    assert_eq!(index.entries(&bob()).prev, Address::HEAD);
    assert_eq!(index.entries(&alice()).next, Address::HEAD);
    assert_eq!(index.entries(&Address::from_low_u64_be(77)).next, Address::ZERO);
}

// ============================================================================
// FAILURE ATOMICITY
// ============================================================================

#[test]
fn refused_pull_changes_nothing() {
    let mut token = MockToken::new(Address::from_low_u64_be(0xa57));
    token.fund(alice(), custody(), 1_000).unwrap();
    let switch = token.switch();
    let mut indexer = Indexer::new(owner(), custody(), token);
    let market = indexer.create_index(alice(), dai(), weth(), None).unwrap();
    let root = indexer.state_root().unwrap();
    let events = indexer.events().len();

    switch.set(Some(MockTokenFailure::RefusePull));
    let err = indexer.set_intent(alice(), market, 100, locator(alice())).unwrap_err();
    assert_eq!(err, IndexerError::UnableToStake { staker: alice(), amount: 100 });

    assert_eq!(indexer.state_root().unwrap(), root);
    assert_eq!(indexer.events().len(), events);
    assert_eq!(indexer.length(&market), 0);
    assert_eq!(indexer.escrowed(&alice()), 0);
    assert_eq!(indexer.staking_token().balance_of(&alice()), 1_000);

    switch.set(None);
    indexer.set_intent(alice(), market, 100, locator(alice())).unwrap();
    assert_eq!(indexer.escrowed(&alice()), 100);
}

#[test]
fn failed_refunds_keep_entry_and_escrow() {
    for failure in [MockTokenFailure::RefuseRefund, MockTokenFailure::FailRefund] {
        let mut token = MockToken::new(Address::from_low_u64_be(0xa57));
        token.fund(alice(), custody(), 1_000).unwrap();
        let switch = token.switch();
        let mut indexer = Indexer::new(owner(), custody(), token);
        let market = indexer.create_index(alice(), dai(), weth(), None).unwrap();
        indexer.set_intent(alice(), market, 400, locator(alice())).unwrap();

        switch.set(Some(failure));
        let root = indexer.state_root().unwrap();
        let events = indexer.events().len();

        let err = indexer.unset_intent(alice(), market).unwrap_err();
        assert_eq!(err, IndexerError::UnableToUnstake { staker: alice(), amount: 400 });

        // Lowering stake needs a refund too
        let err = indexer.set_intent(alice(), market, 100, locator(alice())).unwrap_err();
        assert_eq!(err.code(), "UNABLE_TO_UNSTAKE");

        // Owner rescue goes through the same refund
        assert!(indexer.unset_intent_for_user(owner(), alice(), market).is_err());

        assert_eq!(indexer.state_root().unwrap(), root);
        assert_eq!(indexer.events().len(), events);
        assert_eq!(indexer.get_staked_amount(&alice(), &market), 400);
        indexer.audit_escrow().unwrap();

        // Raising stake only pulls, so it still works
        indexer.set_intent(alice(), market, 500, locator(alice())).unwrap();
        assert_eq!(indexer.escrowed(&alice()), 500);
    }
}

#[test]
fn failed_transfer_error_is_stake_not_token_error() {
    let mut token = MockToken::new(Address::from_low_u64_be(0xa57));
    token.fund(alice(), custody(), 1_000).unwrap();
    token.set_failure(Some(MockTokenFailure::FailPull));
    let mut indexer = Indexer::new(owner(), custody(), token);
    let market = indexer.create_index(alice(), dai(), weth(), None).unwrap();

    let err = indexer.set_intent(alice(), market, 1, locator(alice())).unwrap_err();
    assert_eq!(err.code(), "UNABLE_TO_STAKE");
    assert_eq!(indexer.staking_token().pulls(), 0);
}

#[test]
fn precondition_failures_move_no_tokens() {
    let (mut indexer, market) = three_stakers();
    let pulls = indexer.staking_token().pulls();

    let err = indexer.set_intent(alice(), market, 10, Locator::EMPTY).unwrap_err();
    assert_eq!(err, IndexerError::Index(IndexError::LocatorRequired));

    let err = indexer.set_intent(Address::HEAD, market, 10, locator(alice())).unwrap_err();
    assert_eq!(err.code(), "RESERVED_IDENTIFIER");

    let missing = MarketKey::new(weth(), dai());
    assert_eq!(indexer.set_intent(alice(), missing, 10, locator(alice())), Err(IndexerError::IndexDoesNotExist));

    assert_eq!(indexer.staking_token().pulls(), pulls);
}

// ============================================================================
// WHITELIST
// ============================================================================

#[test]
fn whitelist_is_consulted_after_blacklist() {
    let mut indexer = funded_registry();
    let market = indexer.create_index(alice(), dai(), weth(), None).unwrap();
    let whitelist = MockWhitelist::new(Address::from_low_u64_be(0x111));
    indexer
        .set_locator_whitelist(owner(), market, Some(Arc::new(whitelist.clone())))
        .unwrap();

    indexer.add_token_to_blacklist(owner(), weth()).unwrap();
    assert_eq!(
        indexer.set_intent(alice(), market, 10, locator(alice())),
        Err(IndexerError::PairIsBlacklisted)
    );
    assert_eq!(whitelist.lookups(), 0);

    indexer.remove_token_from_blacklist(owner(), weth()).unwrap();
    assert_eq!(
        indexer.set_intent(alice(), market, 10, locator(alice())),
        Err(IndexerError::LocatorNotWhitelisted)
    );
    assert_eq!(whitelist.lookups(), 1);

    whitelist.approve(locator(alice()));
    indexer.set_intent(alice(), market, 10, locator(alice())).unwrap();
    assert!(indexer.events().contains(&RegistryEvent::SetLocatorWhitelist {
        market,
        whitelist: Some(Address::from_low_u64_be(0x111)),
    }));
}

#[test]
fn url_locators_round_trip_through_registry() {
    let mut indexer = funded_registry();
    let market = indexer.create_index(alice(), dai(), weth(), None).unwrap();
    let url = Locator::url("https://maker.example/rfq").unwrap();

    indexer.set_intent(alice(), market, 10, url).unwrap();
    let page = indexer.get_locators(&market, Address::HEAD, 1);

    assert_eq!(page.locators[0].kind(), Some(LocatorKind::Url));
    assert_eq!(page.locators[0], url);
}

// ============================================================================
// EVENT LOG
// ============================================================================

#[test]
fn event_log_survives_encoding_and_replay() {
    let (mut indexer, market) = three_stakers();
    indexer.set_intent(alice(), market, 120, locator(alice())).unwrap();
    indexer.unset_intent(bob(), market).unwrap();
    indexer.add_token_to_blacklist(owner(), dai()).unwrap();

    let log = encode_events(indexer.events()).unwrap();
    assert_eq!(decode_events(&log).unwrap(), indexer.events());

    let replayed = ReplayedRegistry::from_log(&log).unwrap();
    assert_eq!(replayed.state_root().unwrap(), indexer.state_root().unwrap());
    assert_eq!(replayed.owner(), owner());
    assert_eq!(replayed.escrowed(&alice()), 120);
    assert!(replayed.get_locators(&market, Address::HEAD, 5).is_empty());
}

// ============================================================================
// CONCURRENCY
// ============================================================================

#[test]
fn shared_indexer_serializes_threads() {
    const THREADS: u64 = 8;
    const ROUNDS: u64 = 50;

    let mut token = MockToken::new(Address::from_low_u64_be(0xa57));
    for n in 1..=THREADS {
        token.fund(Address::from_low_u64_be(n), custody(), 1_000_000).unwrap();
    }
    let shared = SharedIndexer::new(Indexer::new(owner(), custody(), token));
    let market = shared
        .transact(|indexer| indexer.create_index(owner(), dai(), weth(), None))
        .unwrap();

    let handles: Vec<_> = (1..=THREADS)
        .map(|n| {
            let shared = shared.clone();
            thread::spawn(move || {
                let staker = Address::from_low_u64_be(n);
                for round in 1..=ROUNDS {
                    shared
                        .transact(|indexer| indexer.set_intent(staker, market, (n * round) as Score, locator(staker)))
                        .unwrap();
                    if round % 10 == 0 {
                        shared.transact(|indexer| indexer.unset_intent(staker, market)).unwrap();
                    }
                    shared.read(|indexer| indexer.audit_escrow()).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    shared.read(|indexer| {
        // Round 50 ends with an unset, so every list is empty again
        assert_eq!(indexer.length(&market), 0);
        assert_eq!(indexer.total_escrowed(), 0);
        indexer.audit_escrow().unwrap();

        let log = encode_events(indexer.events()).unwrap();
        let replayed = ReplayedRegistry::from_log(&log).unwrap();
        assert_eq!(replayed.state_root().unwrap(), indexer.state_root().unwrap());
    });
}

// ============================================================================
// CONFIG
// ============================================================================

#[test]
fn config_file_builds_registry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("indexer.json");
    std::fs::write(
        &path,
        format!(
            r#"{{
                "owner": "{}",
                "custody": "{}",
                "token_decimals": 4,
                "stake_minimum": "0.0050",
                "blacklist": ["{}"],
                "log": {{ "level": "debug", "json": true }}
            }}"#,
            owner(),
            custody(),
            weth()
        ),
    )
    .unwrap();

    let config = IndexerConfig::from_path(&path).unwrap();
    assert!(config.log.json);

    let mut token = MockToken::new(Address::from_low_u64_be(0xa57));
    token.fund(alice(), custody(), 1_000).unwrap();
    let mut indexer = Indexer::from_config(&config, token).unwrap();
    assert_eq!(indexer.stake_minimum(), 50);
    assert!(indexer.is_blacklisted(&weth()));

    let market = indexer.create_index(alice(), dai(), weth(), None).unwrap();
    assert_eq!(
        indexer.set_intent(alice(), market, 10, locator(alice())),
        Err(IndexerError::PairIsBlacklisted)
    );
}

#[test]
fn config_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    assert!(IndexerConfig::from_path(dir.path().join("absent.json")).is_err());
}
