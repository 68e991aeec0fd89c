//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the identifiers that flow through the raffle
//! core. These prevent accidental identifier confusion — you cannot pass
//! a `RoundIndex` where a `RequestId` is expected, and a forged integer
//! cannot silently stand in for an account.
//!
//! `RequestId` is deliberately *not* UUID-backed: request identifiers are
//! assigned by the randomness oracle, and every oracle binding this core
//! targets hands out small sequential integers. The core treats the value
//! as opaque either way.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a participant or treasury account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Generate a new random account identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "account:{}", self.0)
    }
}

/// Oracle-assigned identifier for a randomness request.
///
/// Unique for the lifetime of the system; the oracle is trusted never to
/// reuse one. The core only ever compares these for equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl RequestId {
    /// Wrap a raw oracle-assigned identifier.
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "request:{}", self.0)
    }
}

/// Monotonic index of a raffle round.
///
/// The first round is 1; each settlement advances the index by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundIndex(pub u64);

impl RoundIndex {
    /// The index of the first round.
    pub const FIRST: RoundIndex = RoundIndex(1);

    /// The index of the round that follows this one.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl std::fmt::Display for RoundIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "round:{}", self.0)
    }
}
