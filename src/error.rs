//! Error types for the registry.
//!
//! Every registry error maps to a stable `code()` string. These are the
//! revert reasons off-chain consumers already match on, so they must not
//! change.

use thiserror::Error;

use crate::types::{Address, Score};

/// Failures of a single market's [`Index`](crate::index::Index).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("entry already exists for {0}")]
    EntryAlreadyExists(Address),

    #[error("no entry for {0}")]
    EntryDoesNotExist(Address),

    #[error("locator must not be empty")]
    LocatorRequired,

    #[error("{0} is a reserved identifier")]
    ReservedIdentifier(Address),
}

impl IndexError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::EntryAlreadyExists(_) => "ENTRY_ALREADY_EXISTS",
            Self::EntryDoesNotExist(_) => "ENTRY_DOES_NOT_EXIST",
            Self::LocatorRequired => "LOCATOR_REQUIRED",
            Self::ReservedIdentifier(_) => "RESERVED_IDENTIFIER",
        }
    }
}

/// Failures of the staking token collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("insufficient balance: {account} holds {balance}, needs {needed}")]
    InsufficientBalance { account: Address, balance: Score, needed: Score },

    #[error("insufficient allowance: {spender} may move {allowance} from {owner}, needs {needed}")]
    InsufficientAllowance { owner: Address, spender: Address, allowance: Score, needed: Score },

    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// Failures of [`Indexer`](crate::indexer::Indexer) calls.
///
/// A call that returns any of these has changed nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexerError {
    #[error("caller {0} is not the owner")]
    NotOwner(Address),

    #[error("{0} cannot own the registry")]
    InvalidOwner(Address),

    #[error("indexer is paused")]
    Paused,

    #[error("index does not exist")]
    IndexDoesNotExist,

    #[error("pair is blacklisted")]
    PairIsBlacklisted,

    #[error("locator is not whitelisted")]
    LocatorNotWhitelisted,

    #[error("stake {score} is below the minimum {minimum}")]
    MinimumNotMet { score: Score, minimum: Score },

    #[error("unable to stake {amount} from {staker}")]
    UnableToStake { staker: Address, amount: Score },

    #[error("unable to return {amount} to {staker}")]
    UnableToUnstake { staker: Address, amount: Score },

    #[error("escrow amount overflow")]
    AmountOverflow,

    #[error("escrow drift for {staker}: ledger holds {escrowed}, entries sum to {staked}")]
    EscrowDrift { staker: Address, escrowed: Score, staked: Score },

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl IndexerError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotOwner(_) => "CALLER_IS_NOT_OWNER",
            Self::InvalidOwner(_) => "INVALID_OWNER",
            Self::Paused => "CONTRACT_IS_PAUSED",
            Self::IndexDoesNotExist => "INDEX_DOES_NOT_EXIST",
            Self::PairIsBlacklisted => "PAIR_IS_BLACKLISTED",
            Self::LocatorNotWhitelisted => "LOCATOR_NOT_WHITELISTED",
            Self::MinimumNotMet { .. } => "MINIMUM_NOT_MET",
            Self::UnableToStake { .. } => "UNABLE_TO_STAKE",
            Self::UnableToUnstake { .. } => "UNABLE_TO_UNSTAKE",
            Self::AmountOverflow => "AMOUNT_OVERFLOW",
            Self::EscrowDrift { .. } => "ESCROW_DRIFT",
            Self::Index(e) => e.code(),
            Self::Codec(_) => "CODEC_ERROR",
        }
    }

    /// Caller lacks the right identity (owner-only call).
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::NotOwner(_))
    }
}

/// SSZ encode/decode failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("encode failed: {0}")]
    Encode(String),

    #[error("decode failed: {0}")]
    Decode(String),

    #[error("unknown event kind {0}")]
    UnknownEventKind(u8),

    #[error("log length {len} is not a whole number of records")]
    Truncated { len: usize },

    #[error("event out of sequence: expected {expected}, found {found}")]
    OutOfSequence { expected: u64, found: u64 },

    #[error("event {sequence} cannot be applied: {reason}")]
    Replay { sequence: u64, reason: String },
}

/// Hex parsing failures for addresses and locators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid hex: {0}")]
    Hex(String),

    #[error("expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },
}

/// Locator codec failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocatorError {
    #[error("location is empty")]
    Empty,

    #[error("url is {len} bytes, at most 31 fit")]
    UrlTooLong { len: usize },
}

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
