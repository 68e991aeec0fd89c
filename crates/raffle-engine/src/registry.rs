//! # Entrant Registry
//!
//! Tracks the ordered set of paid admissions for the current round and
//! enforces the two admission invariants: the fee is exact, and the round
//! never holds more than its configured capacity.
//!
//! Entrants are append-only within a round. Identity uniqueness is NOT
//! required — an account may enter any number of times, and each entry is
//! a separate slot that improves its odds. Insertion order is the winner
//! selection basis, so the registry never reorders.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use raffle_core::{AccountId, Amount, RoundIndex};

/// One paid admission slot in a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entrant {
    /// The paying account.
    pub account: AccountId,
    /// The round this slot belongs to.
    pub round: RoundIndex,
}

/// Returned to a caller whose admission succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryReceipt {
    /// The round entered.
    pub round: RoundIndex,
    /// Zero-based slot index of this admission.
    pub slot: u64,
    /// Total admissions in the round after this one.
    pub entrant_count: u64,
}

/// Rejections from the admission path. All recoverable — the caller may
/// retry with corrected input once the round is open again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    /// The payment fell short of the entrance fee.
    #[error("entrance fee not met: paid {paid}, required {required}")]
    InsufficientFee {
        /// Amount tendered.
        paid: Amount,
        /// The configured fee.
        required: Amount,
    },

    /// The payment exceeded the entrance fee. Overpayment is rejected
    /// outright — the pot must stay at exactly count × fee.
    #[error("entrance fee overpaid: paid {paid}, required {required}")]
    OverpaidFee {
        /// Amount tendered.
        paid: Amount,
        /// The configured fee.
        required: Amount,
    },

    /// Every slot in the round is taken.
    #[error("round is full: all {max} entrant slots taken")]
    CapacityExceeded {
        /// The configured capacity.
        max: u64,
    },

    /// The round is not accepting entrants.
    #[error("{round} is not open for entry (state {state})")]
    RoundNotOpen {
        /// The current round.
        round: RoundIndex,
        /// The state the round is in.
        state: String,
    },

    /// Pot accumulation overflowed. Unreachable with any realistic fee
    /// and capacity; checked rather than assumed.
    #[error("pot overflow admitting entrant")]
    PotOverflow,
}

/// The ordered admission list and pot for the current round.
///
/// Owned by the state machine; the machine alone decides *when* admission
/// is allowed (the round must be OPEN) while the registry decides
/// *whether* a given payment fills a slot.
#[derive(Debug, Clone)]
pub struct EntrantRegistry {
    entrance_fee: Amount,
    max_entrants: u64,
    entrants: Vec<Entrant>,
    pot: Amount,
}

impl EntrantRegistry {
    /// An empty registry with the given fee and capacity.
    pub fn new(entrance_fee: Amount, max_entrants: u64) -> Self {
        Self {
            entrance_fee,
            max_entrants,
            entrants: Vec::new(),
            pot: Amount::ZERO,
        }
    }

    /// Admit a payer into the given round.
    ///
    /// Succeeds only when the payment equals the entrance fee exactly and
    /// a slot is free. On success the entrant is appended, the pot grows
    /// by the fee, and the receipt carries the new count.
    pub fn admit(
        &mut self,
        payer: AccountId,
        amount: Amount,
        round: RoundIndex,
    ) -> Result<EntryReceipt, AdmissionError> {
        if amount < self.entrance_fee {
            return Err(AdmissionError::InsufficientFee {
                paid: amount,
                required: self.entrance_fee,
            });
        }
        if amount > self.entrance_fee {
            return Err(AdmissionError::OverpaidFee {
                paid: amount,
                required: self.entrance_fee,
            });
        }
        if self.count() >= self.max_entrants {
            return Err(AdmissionError::CapacityExceeded {
                max: self.max_entrants,
            });
        }

        let pot = self
            .pot
            .checked_add(amount)
            .ok_or(AdmissionError::PotOverflow)?;

        let slot = self.count();
        self.entrants.push(Entrant {
            account: payer,
            round,
        });
        self.pot = pot;

        Ok(EntryReceipt {
            round,
            slot,
            entrant_count: self.count(),
        })
    }

    /// Clear the entrant sequence and pot for a new round.
    ///
    /// Called only by the state machine during the SETTLING→OPEN
    /// transition.
    pub fn reset(&mut self) {
        self.entrants.clear();
        self.pot = Amount::ZERO;
    }

    /// Number of admissions in the current round.
    pub fn count(&self) -> u64 {
        self.entrants.len() as u64
    }

    /// The ordered admission list, for winner indexing.
    pub fn snapshot(&self) -> &[Entrant] {
        &self.entrants
    }

    /// Funds accumulated this round.
    pub fn pot(&self) -> Amount {
        self.pot
    }

    /// The configured exact fee.
    pub fn entrance_fee(&self) -> Amount {
        self.entrance_fee
    }
}
