//! Locators: opaque 32-byte pointers to a staker's off-chain endpoint.
//!
//! The registry never interprets a locator beyond "empty or not". The
//! [`LocatorKind`] codec below is a convenience for producers and
//! consumers that agree on the conventional layout:
//!
//! ```text
//! byte 0 ............................ byte 30 | byte 31
//! location (address or UTF-8 URL, left-aligned) | kind
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{LocatorError, ParseError};
use crate::types::Address;

/// Longest URL that fits beside the kind byte.
pub const MAX_URL_LEN: usize = 31;

/// An opaque 32-byte locator. All-zero is the empty locator.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Locator(pub [u8; 32]);

/// Conventional locator kinds, stored in the last byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocatorKind {
    /// A trading contract (delegate) address
    Contract,
    /// A peer reachable through an instant-messaging relay, keyed by address
    Instant,
    /// An HTTP(S) endpoint
    Url,
}

impl LocatorKind {
    pub fn to_u8(self) -> u8 {
        match self {
            LocatorKind::Contract => 1,
            LocatorKind::Instant => 2,
            LocatorKind::Url => 3,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(LocatorKind::Contract),
            2 => Some(LocatorKind::Instant),
            3 => Some(LocatorKind::Url),
            _ => None,
        }
    }
}

/// A locator unpacked by [`Locator::decode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedLocator {
    Contract(Address),
    Instant(Address),
    Url(String),
}

impl Locator {
    pub const EMPTY: Locator = Locator([0u8; 32]);

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Address bytes left-aligned, remainder zero (no kind byte).
    pub fn from_address(address: Address) -> Self {
        let mut bytes = [0u8; 32];
        bytes[..20].copy_from_slice(&address.0);
        Locator(bytes)
    }

    pub fn contract(address: Address) -> Self {
        Self::with_kind(address, LocatorKind::Contract)
    }

    pub fn instant(address: Address) -> Self {
        Self::with_kind(address, LocatorKind::Instant)
    }

    fn with_kind(address: Address, kind: LocatorKind) -> Self {
        let mut locator = Self::from_address(address);
        locator.0[31] = kind.to_u8();
        locator
    }

    /// Pack a URL of at most [`MAX_URL_LEN`] bytes.
    ///
    /// ```
    /// use intent_indexer::types::{DecodedLocator, Locator};
    ///
    /// let locator = Locator::url("https://maker.example").unwrap();
    /// assert_eq!(locator.decode(), Some(DecodedLocator::Url("https://maker.example".into())));
    /// ```
    pub fn url(url: &str) -> Result<Self, LocatorError> {
        let raw = url.as_bytes();
        if raw.is_empty() {
            return Err(LocatorError::Empty);
        }
        if raw.len() > MAX_URL_LEN {
            return Err(LocatorError::UrlTooLong { len: raw.len() });
        }
        let mut bytes = [0u8; 32];
        bytes[..raw.len()].copy_from_slice(raw);
        bytes[31] = LocatorKind::Url.to_u8();
        Ok(Locator(bytes))
    }

    pub fn kind(&self) -> Option<LocatorKind> {
        LocatorKind::from_u8(self.0[31])
    }

    /// Unpack a conventionally encoded locator. `None` if the kind byte is
    /// unknown or a URL payload is not UTF-8.
    pub fn decode(&self) -> Option<DecodedLocator> {
        let address = || {
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(&self.0[..20]);
            Address(bytes)
        };
        match self.kind()? {
            LocatorKind::Contract => Some(DecodedLocator::Contract(address())),
            LocatorKind::Instant => Some(DecodedLocator::Instant(address())),
            LocatorKind::Url => {
                let payload = &self.0[..MAX_URL_LEN];
                let end = payload.iter().position(|b| *b == 0).unwrap_or(MAX_URL_LEN);
                std::str::from_utf8(&payload[..end]).ok().map(|s| DecodedLocator::Url(s.to_owned()))
            }
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Locator {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let raw = hex::decode(digits).map_err(|e| ParseError::Hex(e.to_string()))?;
        let bytes: [u8; 32] = raw
            .try_into()
            .map_err(|raw: Vec<u8>| ParseError::Length { expected: 32, actual: raw.len() })?;
        Ok(Locator(bytes))
    }
}

impl Serialize for Locator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Locator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
