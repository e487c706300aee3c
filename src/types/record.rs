//! Fixed-size SSZ records.
//!
//! ## SSZ Serialization
//!
//! All records derive `SimpleSerialize` from ssz_rs for deterministic
//! encoding. Every field is fixed-size, so every record of a type encodes to
//! the same number of bytes and a log of records can be split without
//! length prefixes.
//!
//! Addresses are stored as left-padded 32-byte words, matching how the
//! original contracts laid them out in event data.

use ssz_rs::prelude::*;

use crate::error::CodecError;
use crate::types::{Address, Locator, MarketKey, ProtocolId, RegistryEvent, Score};

/// Encoded size of an [`EventRecord`].
pub const EVENT_RECORD_SIZE: usize = 158;

/// Encoded size of an [`EntryRecord`].
pub const ENTRY_RECORD_SIZE: usize = 80;

// ============================================================================
// MarketRecord
// ============================================================================

/// SSZ layout of a market key.
///
/// Size: 32 + 32 + 4 + 1 = 69 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct MarketRecord {
    pub signer_token: [u8; 32],
    pub sender_token: [u8; 32],
    /// Protocol id, 0 when unqualified
    pub protocol: u32,
    /// Distinguishes "protocol 0" from "no protocol"
    pub qualified: bool,
}

impl MarketRecord {
    pub fn to_key(&self) -> MarketKey {
        MarketKey {
            signer_token: Address::from_word(&self.signer_token),
            sender_token: Address::from_word(&self.sender_token),
            protocol: self.qualified.then_some(ProtocolId(self.protocol)),
        }
    }
}

// ============================================================================
// EntryRecord
// ============================================================================

/// One list entry, as fed into the registry state root.
///
/// Size: 32 + 32 + 16 = 80 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct EntryRecord {
    pub identifier: [u8; 32],
    pub locator: [u8; 32],
    pub score: u128,
}

impl EntryRecord {
    pub fn new(identifier: Address, locator: Locator, score: Score) -> Self {
        Self {
            identifier: identifier.to_word(),
            locator: locator.0,
            score,
        }
    }
}

// ============================================================================
// EventKind
// ============================================================================

/// Event kind discriminator stored as `kind_raw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    CreateIndex,
    Stake,
    Unstake,
    AddTokenToBlacklist,
    RemoveTokenFromBlacklist,
    SetLocator,
    UnsetLocator,
    SetLocatorWhitelist,
    SetPausedStatus,
    OwnershipTransferred,
    SetStakeMinimum,
}

impl EventKind {
    pub fn to_u8(self) -> u8 {
        match self {
            EventKind::CreateIndex => 0,
            EventKind::Stake => 1,
            EventKind::Unstake => 2,
            EventKind::AddTokenToBlacklist => 3,
            EventKind::RemoveTokenFromBlacklist => 4,
            EventKind::SetLocator => 5,
            EventKind::UnsetLocator => 6,
            EventKind::SetLocatorWhitelist => 7,
            EventKind::SetPausedStatus => 8,
            EventKind::OwnershipTransferred => 9,
            EventKind::SetStakeMinimum => 10,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(EventKind::CreateIndex),
            1 => Some(EventKind::Stake),
            2 => Some(EventKind::Unstake),
            3 => Some(EventKind::AddTokenToBlacklist),
            4 => Some(EventKind::RemoveTokenFromBlacklist),
            5 => Some(EventKind::SetLocator),
            6 => Some(EventKind::UnsetLocator),
            7 => Some(EventKind::SetLocatorWhitelist),
            8 => Some(EventKind::SetPausedStatus),
            9 => Some(EventKind::OwnershipTransferred),
            10 => Some(EventKind::SetStakeMinimum),
            _ => None,
        }
    }
}

// ============================================================================
// EventRecord
// ============================================================================

/// Durable encoding of one [`RegistryEvent`].
///
/// ## Field Usage
///
/// | Kind | market | account | amount | locator |
/// |------|--------|---------|--------|---------|
/// | CreateIndex | yes | - | - | - |
/// | Stake / Unstake | yes | staker | stake | - |
/// | Add/RemoveTokenFromBlacklist | - | token | - | - |
/// | SetLocator | yes | identifier | score | locator |
/// | UnsetLocator | yes | identifier | - | - |
/// | SetLocatorWhitelist | yes | whitelist (zero = none) | - | - |
/// | SetPausedStatus | - | - | 0 / 1 | - |
/// | OwnershipTransferred | - | new owner | - | - |
/// | SetStakeMinimum | - | - | minimum | - |
///
/// Size: 8 + 1 + 69 + 32 + 16 + 32 = 158 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct EventRecord {
    /// Position of the event in the log
    pub sequence: u64,

    /// Event kind as u8 (see [`EventKind`])
    pub kind_raw: u8,

    pub market: MarketRecord,

    pub account: [u8; 32],

    pub amount: u128,

    pub locator: [u8; 32],
}

impl EventRecord {
    /// Encode an event at position `sequence`.
    pub fn from_event(sequence: u64, event: &RegistryEvent) -> Self {
        let mut record = EventRecord { sequence, ..Default::default() };
        let kind = match *event {
            RegistryEvent::CreateIndex { market } => {
                record.market = market.to_record();
                EventKind::CreateIndex
            }
            RegistryEvent::Stake { staker, market, amount } => {
                record.market = market.to_record();
                record.account = staker.to_word();
                record.amount = amount;
                EventKind::Stake
            }
            RegistryEvent::Unstake { staker, market, amount } => {
                record.market = market.to_record();
                record.account = staker.to_word();
                record.amount = amount;
                EventKind::Unstake
            }
            RegistryEvent::AddTokenToBlacklist { token } => {
                record.account = token.to_word();
                EventKind::AddTokenToBlacklist
            }
            RegistryEvent::RemoveTokenFromBlacklist { token } => {
                record.account = token.to_word();
                EventKind::RemoveTokenFromBlacklist
            }
            RegistryEvent::SetLocator { market, identifier, score, locator } => {
                record.market = market.to_record();
                record.account = identifier.to_word();
                record.amount = score;
                record.locator = locator.0;
                EventKind::SetLocator
            }
            RegistryEvent::UnsetLocator { market, identifier } => {
                record.market = market.to_record();
                record.account = identifier.to_word();
                EventKind::UnsetLocator
            }
            RegistryEvent::SetLocatorWhitelist { market, whitelist } => {
                record.market = market.to_record();
                record.account = whitelist.unwrap_or(Address::ZERO).to_word();
                EventKind::SetLocatorWhitelist
            }
            RegistryEvent::SetPausedStatus { paused } => {
                record.amount = u128::from(paused);
                EventKind::SetPausedStatus
            }
            RegistryEvent::OwnershipTransferred { new_owner } => {
                record.account = new_owner.to_word();
                EventKind::OwnershipTransferred
            }
            RegistryEvent::SetStakeMinimum { amount } => {
                record.amount = amount;
                EventKind::SetStakeMinimum
            }
        };
        record.kind_raw = kind.to_u8();
        record
    }

    pub fn kind(&self) -> Option<EventKind> {
        EventKind::from_u8(self.kind_raw)
    }

    /// Decode back into a typed event.
    pub fn to_event(&self) -> Result<RegistryEvent, CodecError> {
        let kind = self.kind().ok_or(CodecError::UnknownEventKind(self.kind_raw))?;
        let market = self.market.to_key();
        let account = Address::from_word(&self.account);

        let event = match kind {
            EventKind::CreateIndex => RegistryEvent::CreateIndex { market },
            EventKind::Stake => RegistryEvent::Stake { staker: account, market, amount: self.amount },
            EventKind::Unstake => RegistryEvent::Unstake { staker: account, market, amount: self.amount },
            EventKind::AddTokenToBlacklist => RegistryEvent::AddTokenToBlacklist { token: account },
            EventKind::RemoveTokenFromBlacklist => RegistryEvent::RemoveTokenFromBlacklist { token: account },
            EventKind::SetLocator => RegistryEvent::SetLocator {
                market,
                identifier: account,
                score: self.amount,
                locator: Locator(self.locator),
            },
            EventKind::UnsetLocator => RegistryEvent::UnsetLocator { market, identifier: account },
            EventKind::SetLocatorWhitelist => RegistryEvent::SetLocatorWhitelist {
                market,
                whitelist: (!account.is_zero()).then_some(account),
            },
            EventKind::SetPausedStatus => RegistryEvent::SetPausedStatus { paused: self.amount != 0 },
            EventKind::OwnershipTransferred => RegistryEvent::OwnershipTransferred { new_owner: account },
            EventKind::SetStakeMinimum => RegistryEvent::SetStakeMinimum { amount: self.amount },
        };
        Ok(event)
    }
}

// ============================================================================
// Log encoding
// ============================================================================

/// Encode a whole event log as concatenated records.
pub fn encode_events(events: &[RegistryEvent]) -> Result<Vec<u8>, CodecError> {
    let mut bytes = Vec::with_capacity(events.len() * EVENT_RECORD_SIZE);
    for (sequence, event) in events.iter().enumerate() {
        let record = EventRecord::from_event(sequence as u64, event);
        let encoded = ssz_rs::serialize(&record).map_err(|e| CodecError::Encode(format!("{e:?}")))?;
        bytes.extend_from_slice(&encoded);
    }
    Ok(bytes)
}

/// Decode a log produced by [`encode_events`].
///
/// Sequence numbers must run 0, 1, 2, … without gaps.
pub fn decode_events(bytes: &[u8]) -> Result<Vec<RegistryEvent>, CodecError> {
    if bytes.len() % EVENT_RECORD_SIZE != 0 {
        return Err(CodecError::Truncated { len: bytes.len() });
    }

    bytes
        .chunks_exact(EVENT_RECORD_SIZE)
        .enumerate()
        .map(|(position, chunk)| {
            let record: EventRecord =
                ssz_rs::deserialize(chunk).map_err(|e| CodecError::Decode(format!("{e:?}")))?;
            if record.sequence != position as u64 {
                return Err(CodecError::OutOfSequence { expected: position as u64, found: record.sequence });
            }
            record.to_event()
        })
        .collect()
}

// ============================================================================
// Unit Tests
// ============================================================================
