//! Account and token addresses.
//!
//! ## Sentinels
//!
//! Two address values are reserved and can never identify an entry:
//!
//! - [`Address::ZERO`]: the empty address, returned for absent neighbours
//!   and used by callers as "start from the beginning"
//! - [`Address::HEAD`]: the list boundary (`0xffff…ffff`), returned as the
//!   pagination cursor once a list is exhausted
//!
//! ## Text Format
//!
//! Addresses print and parse as `0x`-prefixed lowercase hex (40 digits).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseError;

/// A 20-byte account or token address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The empty address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// List boundary sentinel.
    pub const HEAD: Address = Address([0xffu8; 20]);

    /// Build an address whose low 8 bytes hold `value` (big-endian).
    ///
    /// Handy for tests and demos where readable accounts beat random bytes.
    ///
    /// ```
    /// use intent_indexer::types::Address;
    ///
    /// let alice = Address::from_low_u64_be(1);
    /// assert_eq!(alice.to_string(), "0x0000000000000000000000000000000000000001");
    /// ```
    pub fn from_low_u64_be(value: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&value.to_be_bytes());
        Address(bytes)
    }

    /// True for `ZERO` and `HEAD`, which can never be entry identifiers.
    #[inline]
    pub fn is_reserved(&self) -> bool {
        *self == Self::ZERO || *self == Self::HEAD
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Left-pad into a 32-byte word (ABI layout), used by SSZ records.
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(&self.0);
        word
    }

    /// Inverse of [`Address::to_word`]; the upper 12 bytes are ignored.
    pub fn from_word(word: &[u8; 32]) -> Self {
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&word[12..]);
        Address(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let raw = hex::decode(digits).map_err(|e| ParseError::Hex(e.to_string()))?;
        let bytes: [u8; 20] = raw
            .try_into()
            .map_err(|raw: Vec<u8>| ParseError::Length { expected: 20, actual: raw.len() })?;
        Ok(Address(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
