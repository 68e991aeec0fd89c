//! # Settlement Ledger
//!
//! Owns the money side of a settled round: the winner/treasury split, the
//! payable balances those splits credit, and the append-only log of
//! settlement records. Nothing else in the engine mutates a balance.
//!
//! ## Ordering Invariant
//!
//! Both collection paths (`withdraw`, `claim`) zero the balance BEFORE
//! the funds leave the ledger. A transfer that fails downstream finds the
//! balance already zeroed, so no second caller can observe a nonzero
//! balance and collect it again.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use raffle_core::{AccountId, Amount, BasisPoints, RoundIndex, Timestamp};

/// Immutable record of one round's settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRecord {
    /// The round that settled.
    pub round: RoundIndex,
    /// The selected winner.
    pub winner: AccountId,
    /// Share credited to the winner.
    pub winner_amount: Amount,
    /// Share credited to the treasury.
    pub treasury_amount: Amount,
    /// Position in the settlement log, starting at 1.
    pub sequence: u64,
    /// When the settlement was recorded.
    pub settled_at: Timestamp,
}

/// Rejections from the collection paths.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The caller is not the treasury controller.
    #[error("{caller} is not the treasury controller")]
    Unauthorized {
        /// The rejected caller.
        caller: AccountId,
    },

    /// The balance to collect is zero.
    #[error("nothing to withdraw")]
    NothingToWithdraw,
}

/// The treasury balance, winner payables, and settlement log.
#[derive(Debug, Clone)]
pub struct SettlementLedger {
    treasury_controller: AccountId,
    treasury_share: BasisPoints,
    treasury_balance: Amount,
    payable: HashMap<AccountId, Amount>,
    records: Vec<SettlementRecord>,
}

impl SettlementLedger {
    /// An empty ledger with the given controller and split policy.
    pub fn new(treasury_controller: AccountId, treasury_share: BasisPoints) -> Self {
        Self {
            treasury_controller,
            treasury_share,
            treasury_balance: Amount::ZERO,
            payable: HashMap::new(),
            records: Vec::new(),
        }
    }

    /// Split a settled pot between winner and treasury.
    ///
    /// The treasury share is floored at the configured basis points and
    /// the winner receives the remainder, so the two credited amounts sum
    /// to the pot exactly — rounding dust goes to the winner. Appends the
    /// settlement record and returns a reference to it.
    pub fn allocate(
        &mut self,
        round: RoundIndex,
        winner: AccountId,
        pot: Amount,
    ) -> &SettlementRecord {
        let treasury_amount = pot.share(self.treasury_share);
        // share() never exceeds the whole, so the subtraction holds.
        let winner_amount = pot.checked_sub(treasury_amount).unwrap_or(Amount::ZERO);

        self.treasury_balance = self.treasury_balance.saturating_add(treasury_amount);
        let entry = self.payable.entry(winner.clone()).or_insert(Amount::ZERO);
        *entry = entry.saturating_add(winner_amount);

        let record = SettlementRecord {
            round,
            winner,
            winner_amount,
            treasury_amount,
            sequence: self.records.len() as u64 + 1,
            settled_at: Timestamp::now(),
        };
        tracing::info!(
            %record.round,
            winner = %record.winner,
            %winner_amount,
            %treasury_amount,
            "pot allocated"
        );
        self.records.push(record);
        // Just pushed — the log is nonempty.
        &self.records[self.records.len() - 1]
    }

    /// Sweep the entire accumulated treasury balance.
    ///
    /// Controller-only. The balance is zeroed before the swept amount is
    /// handed back (see the module ordering invariant).
    pub fn withdraw(&mut self, caller: &AccountId) -> Result<Amount, LedgerError> {
        if *caller != self.treasury_controller {
            return Err(LedgerError::Unauthorized {
                caller: caller.clone(),
            });
        }
        if self.treasury_balance.is_zero() {
            return Err(LedgerError::NothingToWithdraw);
        }
        let swept = std::mem::take(&mut self.treasury_balance);
        tracing::info!(amount = %swept, "treasury swept");
        Ok(swept)
    }

    /// Collect the caller's accumulated winnings.
    ///
    /// Same zero-then-transfer ordering as [`SettlementLedger::withdraw`].
    pub fn claim(&mut self, caller: &AccountId) -> Result<Amount, LedgerError> {
        let balance = self.payable_balance(caller);
        if balance.is_zero() {
            return Err(LedgerError::NothingToWithdraw);
        }
        self.payable.remove(caller);
        tracing::info!(account = %caller, amount = %balance, "prize claimed");
        Ok(balance)
    }

    /// The accumulated, unswept treasury balance.
    pub fn treasury_balance(&self) -> Amount {
        self.treasury_balance
    }

    /// The unclaimed payable balance of an account.
    pub fn payable_balance(&self, account: &AccountId) -> Amount {
        self.payable.get(account).copied().unwrap_or(Amount::ZERO)
    }

    /// The append-only settlement log.
    pub fn records(&self) -> &[SettlementRecord] {
        &self.records
    }

    /// The most recent settlement, if any round has settled.
    pub fn last_record(&self) -> Option<&SettlementRecord> {
        self.records.last()
    }
}
