//! Core pool types: addresses, lots, checkpoints.
//!
//! All amounts are base units of the stake or reward asset; all timestamps
//! are Unix seconds.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::constants::ADDRESS_LEN;
use crate::error::AddressError;

/// Token amount in base units.
pub type Amount = u128;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// A 20-byte account identifier.
///
/// Identifies stakers, the funder, token holders and the engine itself.
/// Rendered and serialized as `0x`-prefixed lowercase hex.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// The zero address.
    pub const ZERO: Self = Self([0u8; ADDRESS_LEN]);

    /// Create an address from raw bytes.
    pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// An address with every byte set to `seed`. Handy for fixtures.
    pub fn repeat(seed: u8) -> Self {
        Self([seed; ADDRESS_LEN])
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Check if this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }

    /// Address of the `nonce`-th account created by `self`.
    ///
    /// First 20 bytes of `SHA-256(creator || nonce_le)`. Deterministic, so a
    /// deployment can know the engine's address before creating the tokens
    /// that reference it.
    pub fn derive(&self, nonce: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(self.0);
        hasher.update(nonce.to_le_bytes());
        let digest = hasher.finalize();
        let mut out = [0u8; ADDRESS_LEN];
        out.copy_from_slice(&digest[..ADDRESS_LEN]);
        Self(out)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.len() != ADDRESS_LEN * 2 {
            return Err(AddressError::InvalidLength(digits.len()));
        }
        let bytes = hex::decode(digits).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        let mut out = [0u8; ADDRESS_LEN];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_string()
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

/// One discrete deposit.
///
/// `timestamp` is the instant the lot last started accruing: its deposit
/// time, or the last time its reward was paid out.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Lot {
    /// Remaining deposited amount. Zero once fully withdrawn.
    pub amount: Amount,
    /// Accrual start, Unix seconds.
    pub timestamp: Timestamp,
}

impl Lot {
    /// Create a lot accruing from `timestamp`.
    pub fn new(amount: Amount, timestamp: Timestamp) -> Self {
        Self { amount, timestamp }
    }

    /// Whether the lot has been fully drained.
    pub fn is_empty(&self) -> bool {
        self.amount == 0
    }
}

/// Snapshot of the pool total at the instant it changed.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolCheckpoint {
    /// When the total took this value.
    pub timestamp: Timestamp,
    /// Pool total in effect from `timestamp` until the next checkpoint.
    pub total_staked: Amount,
}

/// A constant-denominator interval of the pool timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Inclusive start.
    pub start: Timestamp,
    /// Exclusive end.
    pub end: Timestamp,
    /// Pool total in effect for the whole interval. Zero if the interval
    /// precedes the first checkpoint.
    pub total_staked: Amount,
}

impl Segment {
    /// Length of the interval in seconds.
    pub fn duration(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }
}
