//! Identifiers used throughout DAudit.
//!
//! Accounts are 20-byte [`Address`]es. Audit items are keyed by the id of
//! the document token they were listed from, so [`ItemId`] and [`TokenId`]
//! share the same numeric space. Receipts use UUIDv7 for time-ordered
//! lexicographic sorting.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{DauditError, constants};

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A ledger account address (producer, auditor, administrator, or contract).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address. Never a valid participant.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Address with every byte set to `byte`. Handy for fixed fixtures.
    #[must_use]
    pub const fn repeat_byte(byte: u8) -> Self {
        Self([byte; 20])
    }

    /// Derive the address controlled by an ed25519 key.
    ///
    /// `SHA-256(domain || pubkey)`, last 20 bytes.
    #[must_use]
    pub fn from_verifying_key(key: &ed25519_dalek::VerifyingKey) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(constants::ADDRESS_DERIVATION_DOMAIN);
        hasher.update(key.as_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash[12..]);
        Self(bytes)
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// First four bytes, hex encoded. For compact log fields.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = DauditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let raw = hex::decode(digits).map_err(|e| DauditError::InvalidAddress {
            reason: format!("{s}: {e}"),
        })?;
        let bytes: [u8; 20] = raw.try_into().map_err(|_| DauditError::InvalidAddress {
            reason: format!("{s}: expected 20 bytes"),
        })?;
        Ok(Self(bytes))
    }
}

/// Random address for tests. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl Address {
    pub fn random() -> Self {
        let mut bytes = rand::random::<[u8; 20]>();
        // keep clear of the zero address
        bytes[0] |= 1;
        Self(bytes)
    }
}

// ---------------------------------------------------------------------------
// TokenId
// ---------------------------------------------------------------------------

/// Identifier of a token inside one asset-registry instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TokenId(pub u64);

impl TokenId {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ItemId
// ---------------------------------------------------------------------------

/// Identifier of an audit item, derived from its document token id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl From<TokenId> for ItemId {
    fn from(token: TokenId) -> Self {
        Self(token.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ReceiptId
// ---------------------------------------------------------------------------

/// Unique identifier for a payout receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ReceiptId(pub Uuid);

impl ReceiptId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ReceiptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReceiptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rcpt:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::SigningKey;

    #[test]
    fn address_display_is_prefixed_hex() {
        let addr = Address::repeat_byte(0xab);
        let s = addr.to_string();
        assert!(s.starts_with("0x"));
        assert_eq!(s.len(), 42);
        assert_eq!(&s[2..6], "abab");
    }

    #[test]
    fn address_parse_roundtrip() {
        let addr = Address::repeat_byte(0x11);
        let parsed: Address = addr.to_string().parse().unwrap();
        assert_eq!(parsed, addr);

        let bare: Address = "1111111111111111111111111111111111111111".parse().unwrap();
        assert_eq!(bare, addr);
    }

    #[test]
    fn address_parse_rejects_bad_input() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("0xzz11111111111111111111111111111111111111".parse::<Address>().is_err());
    }

    #[test]
    fn zero_address() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::repeat_byte(1).is_zero());
    }

    #[test]
    fn address_from_key_is_stable() {
        let key = SigningKey::from_bytes(&[7u8; 32]).verifying_key();
        let a = Address::from_verifying_key(&key);
        let b = Address::from_verifying_key(&key);
        assert_eq!(a, b);

        let other = SigningKey::from_bytes(&[8u8; 32]).verifying_key();
        assert_ne!(a, Address::from_verifying_key(&other));
    }

    #[test]
    fn random_address_never_zero() {
        for _ in 0..64 {
            assert!(!Address::random().is_zero());
        }
    }

    #[test]
    fn item_id_from_token() {
        assert_eq!(ItemId::from(TokenId(42)), ItemId(42));
        assert_eq!(TokenId(1).next(), TokenId(2));
    }

    #[test]
    fn receipt_id_ordering() {
        let a = ReceiptId::new();
        let b = ReceiptId::new();
        assert!(a < b);
    }

    #[test]
    fn serde_roundtrips() {
        let addr = Address::repeat_byte(0x42);
        let json = serde_json::to_string(&addr).unwrap();
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, back);

        let rid = ReceiptId::new();
        let json = serde_json::to_string(&rid).unwrap();
        let back: ReceiptId = serde_json::from_str(&json).unwrap();
        assert_eq!(rid, back);
    }
}
