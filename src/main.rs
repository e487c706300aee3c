//! Intent Indexer - Binary Entry Point
//!
//! Runs a small staking scenario against an in-memory registry and prints
//! the resulting locator pages, the state root, and a replay check.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use intent_indexer::config::IndexerConfig;
use intent_indexer::logging::init_tracing;
use intent_indexer::replay::ReplayedRegistry;
use intent_indexer::types::amount::{format_units, to_base_units};
use intent_indexer::types::record::{encode_events, EVENT_RECORD_SIZE};
use intent_indexer::{Address, Indexer, Locator, Score, StakingToken, TokenLedger};

#[derive(Parser)]
#[command(name = "intent-indexer")]
#[command(about = "Run a demo staking scenario against an in-memory intent registry")]
struct Cli {
    /// JSON config file (owner, custody, token decimals, blacklist, log)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Page size used to walk the market
    #[arg(long, default_value_t = 2)]
    limit: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => IndexerConfig::from_path(path)?,
        None => IndexerConfig::new(Address::from_low_u64_be(0xaa), Address::from_low_u64_be(0xcc)),
    };
    init_tracing(&config.log);
    let decimals = config.token_decimals;

    let dai = Address::from_low_u64_be(0xda1);
    let weth = Address::from_low_u64_be(0xeee);
    let stakers = [
        ("alice", Address::from_low_u64_be(1), "50"),
        ("bob", Address::from_low_u64_be(2), "100"),
        ("carol", Address::from_low_u64_be(3), "75"),
    ];

    let mut token = TokenLedger::new(Address::from_low_u64_be(0xa57));
    let funding = to_base_units("1000", decimals).ok_or("token decimals too large")?;
    for (_, staker, _) in &stakers {
        token.mint(*staker, funding)?;
        token.approve(*staker, config.custody, Score::MAX);
    }

    let mut indexer = Indexer::from_config(&config, token)?;
    let market = indexer.create_index(stakers[0].1, dai, weth, None)?;
    info!(%market, "market created");

    for (name, staker, amount) in &stakers {
        let score = to_base_units(amount, decimals).ok_or("bad stake amount")?;
        indexer.set_intent(*staker, market, score, Locator::from_address(*staker))?;
        println!("{name:>6} staked {} on {market}", format_units(score, decimals));
    }
    println!();

    let names = |locator: &Locator| {
        stakers
            .iter()
            .find(|(_, staker, _)| Locator::from_address(*staker) == *locator)
            .map_or("-", |(name, _, _)| *name)
    };

    let mut cursor = Address::HEAD;
    let mut page_number = 1;
    loop {
        let page = indexer.get_locators(&market, cursor, cli.limit);
        println!("page {page_number} (cursor {cursor}):");
        for (locator, score) in page.locators.iter().zip(&page.scores) {
            println!("  {:>6}  {}", names(locator), format_units(*score, decimals));
        }
        if page.is_last() || page.is_empty() {
            break;
        }
        cursor = page.next_cursor;
        page_number += 1;
    }
    println!();

    indexer.audit_escrow()?;
    println!(
        "escrowed: {} (custody holds {})",
        format_units(indexer.total_escrowed(), decimals),
        format_units(indexer.staking_token().balance_of(&indexer.custody()), decimals)
    );

    let log = encode_events(indexer.events())?;
    let replayed = ReplayedRegistry::from_log(&log)?;
    let root = indexer.state_root()?;
    println!("events: {} ({} bytes, {} per record)", indexer.events().len(), log.len(), EVENT_RECORD_SIZE);
    println!("state root: {root}");
    println!(
        "replay: {}",
        if replayed.state_root()? == root { "matches" } else { "DIVERGED" }
    );

    Ok(())
}
