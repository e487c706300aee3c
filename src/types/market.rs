//! Market keys.
//!
//! A market is a directed token pair: `signer_token` is the token a maker
//! signs away, `sender_token` the token a taker sends. `(DAI, WETH)` and
//! `(WETH, DAI)` are different markets with independent lists. A market may
//! additionally be qualified by a [`ProtocolId`] so that several settlement
//! protocols can advertise on the same pair without sharing a list.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::record::MarketRecord;
use crate::types::Address;

/// Settlement protocol discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct ProtocolId(pub u32);

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// Identifies which index a read or write targets.
///
/// Ordering is derived field by field, so iterating a `BTreeMap<MarketKey, _>`
/// is deterministic across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarketKey {
    pub signer_token: Address,
    pub sender_token: Address,
    pub protocol: Option<ProtocolId>,
}

impl MarketKey {
    /// Unqualified market for a token pair.
    pub fn new(signer_token: Address, sender_token: Address) -> Self {
        Self { signer_token, sender_token, protocol: None }
    }

    /// Market qualified by a settlement protocol.
    pub fn with_protocol(signer_token: Address, sender_token: Address, protocol: ProtocolId) -> Self {
        Self { signer_token, sender_token, protocol: Some(protocol) }
    }

    /// Does `token` take part in this market on either side?
    #[inline]
    pub fn involves(&self, token: &Address) -> bool {
        self.signer_token == *token || self.sender_token == *token
    }

    /// Fixed-size record for hashing and event encoding.
    pub fn to_record(&self) -> MarketRecord {
        MarketRecord {
            signer_token: self.signer_token.to_word(),
            sender_token: self.sender_token.to_word(),
            protocol: self.protocol.map(|p| p.0).unwrap_or_default(),
            qualified: self.protocol.is_some(),
        }
    }
}

impl fmt::Display for MarketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.protocol {
            Some(protocol) => write!(f, "{}/{}@{}", self.signer_token, self.sender_token, protocol),
            None => write!(f, "{}/{}", self.signer_token, self.sender_token),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
