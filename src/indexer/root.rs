//! Registry state root.
//!
//! A SHA-256 digest over the SSZ encoding of everything a replayed event
//! log must reproduce:
//!
//! ```text
//! for each market (MarketKey order):  MarketRecord | entry count (u64 LE) | EntryRecord*
//! for each blacklisted token:         token word
//! for each staker with escrow:        staker word | amount (u128 LE)
//! ```
//!
//! Entries are hashed in list order, so two registries with the same
//! members but a different tie order have different roots.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use sha2::{Digest, Sha256};

use crate::error::CodecError;
use crate::index::Index;
use crate::types::{Address, MarketKey, Score};

/// 32-byte registry digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateRoot(pub [u8; 32]);

impl StateRoot {
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for StateRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for StateRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateRoot({})", self.to_hex())
    }
}

pub(crate) fn compute_state_root(
    indexes: &BTreeMap<MarketKey, Index>,
    blacklist: &BTreeSet<Address>,
    escrow: &BTreeMap<Address, Score>,
) -> Result<StateRoot, CodecError> {
    let mut hasher = Sha256::new();

    for (market, index) in indexes {
        hasher.update(ssz(&market.to_record())?);
        hasher.update((index.length() as u64).to_le_bytes());
        for record in index.records() {
            hasher.update(ssz(&record)?);
        }
    }
    for token in blacklist {
        hasher.update(token.to_word());
    }
    for (staker, amount) in escrow {
        hasher.update(staker.to_word());
        hasher.update(amount.to_le_bytes());
    }

    Ok(StateRoot(hasher.finalize().into()))
}

fn ssz<T: ssz_rs::SimpleSerialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    ssz_rs::serialize(value).map_err(|e| CodecError::Encode(format!("{e:?}")))
}
