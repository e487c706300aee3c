//! Registry configuration.
//!
//! Loaded from JSON. Addresses are `0x`-hex strings; the stake minimum is a
//! human-readable token amount converted with `token_decimals`.
//!
//! ```json
//! {
//!   "owner": "0x00000000000000000000000000000000000000aa",
//!   "custody": "0x00000000000000000000000000000000000000cc",
//!   "token_decimals": 18,
//!   "stake_minimum": "0.5",
//!   "blacklist": [],
//!   "paused": false,
//!   "log": { "level": "info" }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::logging::LogConfig;
use crate::types::amount::{to_base_units, MAX_DECIMALS};
use crate::types::{Address, Score};

/// Configuration for an [`Indexer`](crate::indexer::Indexer) instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Account allowed to run owner-only calls.
    pub owner: Address,
    /// Account holding every staker's escrowed tokens.
    pub custody: Address,
    /// Decimals of the staking token, used for `stake_minimum` and display.
    pub token_decimals: u32,
    /// Smallest score a new or updated intent may carry, in token units.
    pub stake_minimum: String,
    /// Tokens blacklisted from the start.
    pub blacklist: Vec<Address>,
    /// Start paused.
    pub paused: bool,
    pub log: LogConfig,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            owner: Address::ZERO,
            custody: Address::ZERO,
            token_decimals: 18,
            stake_minimum: "0".into(),
            blacklist: Vec::new(),
            paused: false,
            log: LogConfig::default(),
        }
    }
}

impl IndexerConfig {
    pub fn new(owner: Address, custody: Address) -> Self {
        Self { owner, custody, ..Self::default() }
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.owner.is_zero() {
            return Err(ConfigError::Invalid("owner must be set".into()));
        }
        if self.custody.is_zero() {
            return Err(ConfigError::Invalid("custody must be set".into()));
        }
        if self.token_decimals > MAX_DECIMALS {
            return Err(ConfigError::Invalid(format!(
                "token_decimals {} exceeds {}",
                self.token_decimals, MAX_DECIMALS
            )));
        }
        self.stake_minimum_units()?;
        Ok(())
    }

    /// `stake_minimum` in base units.
    pub fn stake_minimum_units(&self) -> Result<Score, ConfigError> {
        to_base_units(&self.stake_minimum, self.token_decimals).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "stake_minimum {:?} is not a valid amount with {} decimals",
                self.stake_minimum, self.token_decimals
            ))
        })
    }
}
