//! # Integer Money Arithmetic
//!
//! Defines [`Amount`], the money type used for entrance fees, pots, and
//! ledger balances, and [`BasisPoints`], the validated share type for the
//! settlement split.
//!
//! ## Invariant
//!
//! Money is never a float. An `Amount` is a count of indivisible base
//! units (10^9 units to one display token), so pot accumulation and the
//! winner/treasury split are exact integer arithmetic with no rounding
//! drift. All fallible operations are checked; nothing here panics.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Number of base units in one display token.
pub const UNITS_PER_TOKEN: u64 = 1_000_000_000;

/// A quantity of funds, in indivisible base units.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(pub u64);

impl Amount {
    /// The zero amount.
    pub const ZERO: Amount = Amount(0);

    /// Wrap a raw base-unit quantity.
    pub fn new(units: u64) -> Self {
        Self(units)
    }

    /// Construct from a whole number of display tokens.
    pub fn from_tokens(tokens: u64) -> Option<Self> {
        tokens.checked_mul(UNITS_PER_TOKEN).map(Self)
    }

    /// The raw base-unit quantity.
    pub fn units(self) -> u64 {
        self.0
    }

    /// Whether this amount is zero.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Checked subtraction.
    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    /// Saturating addition. Used for long-lived balance accumulators
    /// where an error return has no caller to go to.
    pub fn saturating_add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }

    /// The floored share of this amount at the given basis points.
    ///
    /// `share(10_000 bps)` is the full amount; the result never exceeds
    /// `self`. Intermediate math is u128, so no overflow for any u64
    /// amount.
    pub fn share(self, bps: BasisPoints) -> Amount {
        let scaled = u128::from(self.0) * u128::from(bps.0) / u128::from(BasisPoints::MAX.0);
        // scaled <= self.0 because bps <= MAX, so the cast is lossless.
        Amount(scaled as u64)
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A share expressed in basis points (1 bps = 0.01%).
///
/// Validated at construction: values above 10_000 (100%) are rejected, so
/// a `BasisPoints` in hand can always be applied to an [`Amount`] without
/// producing more than the whole. Deserialization goes through the same
/// validation, so an out-of-range share cannot arrive via config either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct BasisPoints(u16);

impl TryFrom<u16> for BasisPoints {
    type Error = CoreError;

    fn try_from(bps: u16) -> Result<Self, Self::Error> {
        Self::new(bps)
    }
}

impl From<BasisPoints> for u16 {
    fn from(bps: BasisPoints) -> u16 {
        bps.0
    }
}

impl BasisPoints {
    /// 100% — the whole amount.
    pub const MAX: BasisPoints = BasisPoints(10_000);

    /// 0% — no share.
    pub const ZERO: BasisPoints = BasisPoints(0);

    /// Construct a validated share.
    pub fn new(bps: u16) -> Result<Self, CoreError> {
        if bps > Self::MAX.0 {
            return Err(CoreError::BasisPointsOutOfRange(bps));
        }
        Ok(Self(bps))
    }

    /// The raw basis-point value.
    pub fn value(self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}bps", self.0)
    }
}
