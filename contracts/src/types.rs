//! # Core Types
//!
//! Identities and amounts shared by every component. An [`Address`] is an
//! opaque 20-byte identity: it names end-user accounts, vaults, and deployed
//! contracts alike. Nothing about an address says which of those it is.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::config::ADDRESS_LENGTH;

/// Base-unit token amount. 18-decimal quantities fit comfortably in 128 bits.
pub type Amount = u128;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors produced when parsing an [`Address`] from text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressParseError {
    /// The input contained characters outside `[0-9a-fA-F]`.
    #[error("invalid hex in address: {0}")]
    InvalidHex(String),

    /// The decoded input had the wrong number of bytes.
    #[error("invalid address length: expected 20 bytes, got {0}")]
    InvalidLength(usize),
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte identity.
///
/// Rendered as `0x` followed by 40 lowercase hex characters. Ordering is
/// byte-wise, which keeps map iteration (and therefore persisted state)
/// deterministic.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// Wraps raw bytes as an address.
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Derives a stable identity from a human-readable label.
    ///
    /// The same label always yields the same address, which makes test
    /// actors (`"deployer"`, `"vault"`, `"user"`) and operator aliases
    /// reproducible across runs.
    pub fn from_label(label: &str) -> Self {
        let digest = blake3::hash(label.as_bytes());
        Self::from_digest(digest.as_bytes())
    }

    /// Derives the address of a contract created by `deployer` with the
    /// given deployment nonce.
    pub fn derive(deployer: &Address, nonce: u64) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&deployer.0);
        hasher.update(&nonce.to_le_bytes());
        Self::from_digest(hasher.finalize().as_bytes())
    }

    /// Returns the raw address bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    fn from_digest(digest: &[u8; 32]) -> Self {
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&digest[..ADDRESS_LENGTH]);
        Self(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let decoded =
            hex::decode(digits).map_err(|_| AddressParseError::InvalidHex(s.to_string()))?;
        let bytes: [u8; ADDRESS_LENGTH] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| AddressParseError::InvalidLength(decoded.len()))?;
        Ok(Self(bytes))
    }
}

// Serialized as the display string so addresses work as JSON map keys.
impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// CallContext
// ---------------------------------------------------------------------------

/// The authenticated caller of an operation.
///
/// Every mutating entry point takes one of these instead of reading an
/// ambient "current sender". Whoever constructs the context vouches for the
/// caller's identity; inside the library it is built by the
/// [`Environment`](crate::environment::Environment) and by hooks when they
/// call into the ledger on their own behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// Identity of the immediate caller.
    pub caller: Address,
}

impl CallContext {
    /// Creates a context for the given caller.
    pub fn new(caller: Address) -> Self {
        Self { caller }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_prefixed_lowercase_hex() {
        let addr = Address::new([0xAB; ADDRESS_LENGTH]);
        let s = addr.to_string();
        assert!(s.starts_with("0x"));
        assert_eq!(s.len(), 2 + ADDRESS_LENGTH * 2);
        assert_eq!(&s[2..6], "abab");
    }

    #[test]
    fn parse_accepts_display_output() {
        let addr = Address::from_label("vault");
        let parsed: Address = addr.to_string().parse().unwrap();
        assert_eq!(parsed, addr);
    }

    #[test]
    fn parse_without_prefix_and_uppercase() {
        let addr = Address::from_label("user");
        let bare = hex::encode_upper(addr.as_bytes());
        assert_eq!(bare.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(matches!(
            "0xzz".parse::<Address>(),
            Err(AddressParseError::InvalidHex(_))
        ));
        assert_eq!(
            "0x0102".parse::<Address>(),
            Err(AddressParseError::InvalidLength(2))
        );
    }

    #[test]
    fn labels_are_deterministic_and_distinct() {
        assert_eq!(Address::from_label("a"), Address::from_label("a"));
        assert_ne!(Address::from_label("a"), Address::from_label("b"));
    }

    #[test]
    fn derived_addresses_depend_on_nonce() {
        let deployer = Address::from_label("deployer");
        assert_ne!(Address::derive(&deployer, 0), Address::derive(&deployer, 1));
        assert_eq!(Address::derive(&deployer, 7), Address::derive(&deployer, 7));
    }

    #[test]
    fn serde_uses_hex_string() {
        let addr = Address::from_label("owner");
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
