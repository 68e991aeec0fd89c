//! # Raffle State Machine
//!
//! The central component: owns the round lifecycle and mediates between
//! the entrant registry, the randomness oracle, the request tracker, and
//! the settlement ledger.
//!
//! ## States
//!
//! ```text
//! OPEN ──request_draw()──▶ AWAITING_RANDOMNESS ──delivery──▶ SETTLING
//!   ▲                                                            │
//!   └──────────────── reset, round index + 1 ────────────────────┘
//! ```
//!
//! - `OPEN` — accepting entrants.
//! - `AWAITING_RANDOMNESS` — a request is outstanding; no new entrants,
//!   no new requests. An oracle that never replies leaves the round here
//!   permanently; operational tooling alerts on it.
//! - `SETTLING` — randomness consumed, winner computed, pot allocated.
//!   Settlement completes within the delivery call, so callers never
//!   observe this state between calls.
//!
//! ## Freeze Semantics
//!
//! `request_draw` captures the entrant sequence and pot at request time.
//! Winner selection at delivery time indexes that frozen snapshot —
//! admission is closed from AWAITING_RANDOMNESS onward, so the draw can
//! never be influenced by anything that happens after the request.
//!
//! Every mutating operation takes `&mut self`: calls from independent
//! callers serialize at the borrow, so an admission racing a transition
//! either fully completes before it or is rejected — never half-applied.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use raffle_core::{AccountId, Amount, ConfigError, RaffleConfig, RequestId, RoundIndex};

use crate::events::RaffleEvent;
use crate::ledger::{LedgerError, SettlementLedger, SettlementRecord};
use crate::oracle::{DrawContext, OracleError, RandomnessOracleClient};
use crate::registry::{AdmissionError, Entrant, EntrantRegistry, EntryReceipt};
use crate::tracker::{RequestIntegrityError, RequestTracker};

// ─── Round State ─────────────────────────────────────────────────────

/// Lifecycle state of the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundState {
    /// Accepting entrants.
    Open,
    /// A randomness request is outstanding.
    AwaitingRandomness,
    /// Randomness received; winner being recorded and funds allocated.
    Settling,
}

impl RoundState {
    /// Whether the round is accepting entrants.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

impl std::fmt::Display for RoundState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Open => "OPEN",
            Self::AwaitingRandomness => "AWAITING_RANDOMNESS",
            Self::Settling => "SETTLING",
        };
        f.write_str(s)
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Rejections from the draw path. Recoverable — the caller retries later.
#[derive(Error, Debug)]
pub enum DrawError {
    /// A round with no entrants has no one to win it.
    #[error("cannot draw a winner from an empty round")]
    NoEntrantsToDraw,

    /// A request is already outstanding for this round.
    #[error("a draw is already in progress for {round}")]
    DrawAlreadyInProgress {
        /// The round awaiting randomness.
        round: RoundIndex,
    },

    /// The oracle refused the request; the round stays OPEN.
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// The oracle handed out an already-outstanding identifier; the
    /// round stays OPEN. Must never happen given oracle uniqueness.
    #[error(transparent)]
    Integrity(#[from] RequestIntegrityError),
}

// ─── The State Machine ───────────────────────────────────────────────

/// Entrant snapshot frozen when a draw is requested.
#[derive(Debug, Clone)]
struct PendingDraw {
    request_id: RequestId,
    entrants: Vec<Entrant>,
    pot: Amount,
}

/// One raffle: admission, draw, settlement, reset — round after round.
///
/// Exactly one instance manages one round at a time. Generic over the
/// oracle binding so the shipped mock and a production client are
/// interchangeable.
#[derive(Debug)]
pub struct RaffleStateMachine<O: RandomnessOracleClient> {
    config: RaffleConfig,
    oracle: O,
    state: RoundState,
    round: RoundIndex,
    registry: EntrantRegistry,
    tracker: RequestTracker,
    ledger: SettlementLedger,
    pending: Option<PendingDraw>,
    recent_winner: Option<AccountId>,
    events: Vec<RaffleEvent>,
}

impl<O: RandomnessOracleClient> RaffleStateMachine<O> {
    /// Build a machine from validated configuration, starting at round 1,
    /// OPEN, with an empty pool.
    pub fn new(config: RaffleConfig, oracle: O) -> Result<Self, ConfigError> {
        config.validate()?;
        let registry = EntrantRegistry::new(config.entrance_fee, config.max_entrants);
        let ledger = SettlementLedger::new(
            config.treasury_controller.clone(),
            config.settlement_split,
        );
        Ok(Self {
            config,
            oracle,
            state: RoundState::Open,
            round: RoundIndex::FIRST,
            registry,
            tracker: RequestTracker::new(),
            ledger,
            pending: None,
            recent_winner: None,
            events: Vec::new(),
        })
    }

    // ─── Entry ───────────────────────────────────────────────────────

    /// Admit a payer into the current round.
    ///
    /// Valid only in OPEN; the payment must equal the entrance fee
    /// exactly and a slot must be free.
    pub fn enter(
        &mut self,
        payer: AccountId,
        amount: Amount,
    ) -> Result<EntryReceipt, AdmissionError> {
        if !self.state.is_open() {
            return Err(AdmissionError::RoundNotOpen {
                round: self.round,
                state: self.state.to_string(),
            });
        }
        let receipt = self.registry.admit(payer.clone(), amount, self.round)?;
        tracing::debug!(
            round = %self.round,
            account = %payer,
            slot = receipt.slot,
            "entrant admitted"
        );
        self.events.push(RaffleEvent::EntrantAdmitted {
            round: self.round,
            account: payer,
            slot: receipt.slot,
        });
        Ok(receipt)
    }

    // ─── Draw ────────────────────────────────────────────────────────

    /// Issue a randomness request for the current round.
    ///
    /// Valid only in OPEN with at least one entrant. Freezes the entrant
    /// sequence and pot, registers the oracle-assigned identifier, and
    /// transitions to AWAITING_RANDOMNESS. Returns the identifier.
    pub fn request_draw(&mut self) -> Result<RequestId, DrawError> {
        match self.state {
            RoundState::Open => {}
            RoundState::AwaitingRandomness | RoundState::Settling => {
                return Err(DrawError::DrawAlreadyInProgress { round: self.round });
            }
        }
        if self.registry.count() == 0 {
            return Err(DrawError::NoEntrantsToDraw);
        }

        let ctx = DrawContext {
            round: self.round,
            entrant_count: self.registry.count(),
            pot: self.registry.pot(),
        };
        let request_id = self.oracle.request_random_words(&ctx)?;
        self.tracker.register(request_id, self.round)?;

        self.pending = Some(PendingDraw {
            request_id,
            entrants: self.registry.snapshot().to_vec(),
            pot: self.registry.pot(),
        });
        self.state = RoundState::AwaitingRandomness;
        tracing::info!(
            round = %self.round,
            %request_id,
            entrants = ctx.entrant_count,
            pot = %ctx.pot,
            "draw requested"
        );
        self.events.push(RaffleEvent::DrawRequested {
            round: self.round,
            request_id,
        });
        Ok(request_id)
    }

    /// Consume a delivered random value and settle the round.
    ///
    /// Inbound from the oracle's execution context. An identifier that
    /// was never issued, or was already consumed, is rejected
    /// `UnknownRequest` with zero state mutation — replays and forgeries
    /// bounce off. On success: winner = frozen snapshot at
    /// `random_value mod entrant_count`, pot allocated, registry reset,
    /// round index advanced, state back to OPEN.
    pub fn on_randomness_delivered(
        &mut self,
        request_id: RequestId,
        random_value: u128,
    ) -> Result<SettlementRecord, RequestIntegrityError> {
        let round = match self.tracker.resolve(request_id) {
            Ok(round) => round,
            Err(err) => {
                tracing::warn!(%request_id, %err, "randomness delivery rejected");
                return Err(err);
            }
        };

        // A resolved identifier always has a matching frozen draw: the
        // two are written together in request_draw. Restore and reject
        // rather than panic if that pairing is ever violated.
        let pending = match self.pending.take() {
            Some(p) if p.request_id == request_id => p,
            other => {
                self.pending = other;
                return Err(RequestIntegrityError::UnknownRequest(request_id));
            }
        };

        self.state = RoundState::Settling;
        let count = pending.entrants.len() as u128;
        // count >= 1 (draws require an entrant), and the modulo bounds
        // the index, so this never goes out of range.
        let winner_index = (random_value % count) as usize;
        let winner = pending.entrants[winner_index].account.clone();

        let record = self
            .ledger
            .allocate(round, winner.clone(), pending.pot)
            .clone();
        self.registry.reset();
        self.recent_winner = Some(winner.clone());
        self.events.push(RaffleEvent::WinnerPicked {
            round,
            winner: winner.clone(),
            pot: pending.pot,
        });
        tracing::info!(
            %round,
            winner = %winner,
            winner_index,
            pot = %pending.pot,
            "winner picked, round reset"
        );

        self.round = self.round.next();
        self.state = RoundState::Open;
        Ok(record)
    }

    // ─── Settlement collection ───────────────────────────────────────

    /// Sweep the accumulated treasury balance. Controller only.
    pub fn withdraw(&mut self, caller: &AccountId) -> Result<Amount, LedgerError> {
        let amount = self.ledger.withdraw(caller)?;
        self.events.push(RaffleEvent::TreasurySwept { amount });
        Ok(amount)
    }

    /// Collect the caller's accumulated winnings.
    pub fn claim(&mut self, caller: &AccountId) -> Result<Amount, LedgerError> {
        let amount = self.ledger.claim(caller)?;
        self.events.push(RaffleEvent::PrizeClaimed {
            account: caller.clone(),
            amount,
        });
        Ok(amount)
    }

    // ─── Queries (read-only, no side effects) ────────────────────────

    /// Current lifecycle state.
    pub fn state(&self) -> RoundState {
        self.state
    }

    /// Current round index.
    pub fn round(&self) -> RoundIndex {
        self.round
    }

    /// The configured exact entrance fee.
    pub fn entrance_fee(&self) -> Amount {
        self.config.entrance_fee
    }

    /// Admissions in the current round.
    pub fn entrant_count(&self) -> u64 {
        self.registry.count()
    }

    /// Funds accumulated in the current round.
    pub fn pot(&self) -> Amount {
        self.registry.pot()
    }

    /// The identifier of the outstanding request, while one exists.
    pub fn outstanding_request(&self) -> Option<RequestId> {
        self.pending.as_ref().map(|p| p.request_id)
    }

    /// Winner of the most recently settled round.
    pub fn recent_winner(&self) -> Option<&AccountId> {
        self.recent_winner.as_ref()
    }

    /// The accumulated, unswept treasury balance.
    pub fn treasury_balance(&self) -> Amount {
        self.ledger.treasury_balance()
    }

    /// The unclaimed payable balance of an account.
    pub fn payable_balance(&self, account: &AccountId) -> Amount {
        self.ledger.payable_balance(account)
    }

    /// The append-only settlement log.
    pub fn settlements(&self) -> &[SettlementRecord] {
        self.ledger.records()
    }

    /// The append-only event log.
    pub fn events(&self) -> &[RaffleEvent] {
        &self.events
    }

    /// The oracle binding, for inspection.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use raffle_core::{BasisPoints, OracleParams};

    use crate::oracle::MockRandomnessOracle;

    fn fee() -> Amount {
        Amount::from_tokens(1).unwrap()
    }

    fn config(max_entrants: u64, controller: AccountId) -> RaffleConfig {
        RaffleConfig {
            entrance_fee: fee(),
            max_entrants,
            settlement_split: BasisPoints::new(1_000).unwrap(),
            treasury_controller: controller,
            oracle: OracleParams {
                gas_lane: "0xd89b2bf150e3b9e13446986e571fb9cab24b13cea0a43ea20a6049a85cc807cc"
                    .to_string(),
                subscription_id: 588,
                callback_gas_limit: 500_000,
            },
        }
    }

    fn make_machine(max_entrants: u64) -> RaffleStateMachine<MockRandomnessOracle> {
        RaffleStateMachine::new(
            config(max_entrants, AccountId::new()),
            MockRandomnessOracle::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_machine_starts_open_at_round_one() {
        let machine = make_machine(2);
        assert_eq!(machine.state(), RoundState::Open);
        assert_eq!(machine.round(), RoundIndex::FIRST);
        assert_eq!(machine.entrant_count(), 0);
        assert_eq!(machine.pot(), Amount::ZERO);
        assert!(machine.recent_winner().is_none());
        assert!(machine.outstanding_request().is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad = config(0, AccountId::new());
        assert!(RaffleStateMachine::new(bad, MockRandomnessOracle::new()).is_err());
    }

    #[test]
    fn test_draw_with_no_entrants_rejected() {
        let mut machine = make_machine(2);
        assert!(matches!(
            machine.request_draw(),
            Err(DrawError::NoEntrantsToDraw)
        ));
        assert_eq!(machine.state(), RoundState::Open);
    }

    #[test]
    fn test_second_draw_rejected_while_awaiting() {
        let mut machine = make_machine(2);
        machine.enter(AccountId::new(), fee()).unwrap();
        machine.request_draw().unwrap();
        assert!(matches!(
            machine.request_draw(),
            Err(DrawError::DrawAlreadyInProgress { .. })
        ));
        assert_eq!(machine.state(), RoundState::AwaitingRandomness);
    }

    #[test]
    fn test_entry_rejected_while_awaiting() {
        let mut machine = make_machine(4);
        machine.enter(AccountId::new(), fee()).unwrap();
        machine.request_draw().unwrap();
        let err = machine.enter(AccountId::new(), fee()).unwrap_err();
        assert!(matches!(err, AdmissionError::RoundNotOpen { .. }));
        assert_eq!(machine.entrant_count(), 1);
    }

    #[test]
    fn test_full_round_settles_and_resets() {
        let mut machine = make_machine(2);
        let alice = AccountId::new();
        let bob = AccountId::new();
        machine.enter(alice, fee()).unwrap();
        machine.enter(bob.clone(), fee()).unwrap();
        assert_eq!(machine.pot(), Amount::from_tokens(2).unwrap());

        let request_id = machine.request_draw().unwrap();
        assert_eq!(request_id, RequestId(1));
        assert_eq!(machine.outstanding_request(), Some(request_id));

        // 7 mod 2 = 1 → the second entrant wins.
        let record = machine.on_randomness_delivered(request_id, 7).unwrap();
        assert_eq!(record.winner, bob);
        assert_eq!(
            record.winner_amount.checked_add(record.treasury_amount),
            Some(Amount::from_tokens(2).unwrap())
        );

        assert_eq!(machine.state(), RoundState::Open);
        assert_eq!(machine.round(), RoundIndex(2));
        assert_eq!(machine.entrant_count(), 0);
        assert_eq!(machine.pot(), Amount::ZERO);
        assert_eq!(machine.recent_winner(), Some(&bob));
        assert!(machine.outstanding_request().is_none());
    }

    #[test]
    fn test_unknown_request_is_a_strict_noop_while_open() {
        let mut machine = make_machine(2);
        machine.enter(AccountId::new(), fee()).unwrap();
        let err = machine.on_randomness_delivered(RequestId(99), 42).unwrap_err();
        assert_eq!(err, RequestIntegrityError::UnknownRequest(RequestId(99)));
        assert_eq!(machine.state(), RoundState::Open);
        assert_eq!(machine.entrant_count(), 1);
        assert_eq!(machine.pot(), fee());
        assert!(machine.settlements().is_empty());
    }

    #[test]
    fn test_unknown_request_is_a_strict_noop_while_awaiting() {
        let mut machine = make_machine(2);
        machine.enter(AccountId::new(), fee()).unwrap();
        let request_id = machine.request_draw().unwrap();

        let err = machine.on_randomness_delivered(RequestId(99), 42).unwrap_err();
        assert_eq!(err, RequestIntegrityError::UnknownRequest(RequestId(99)));
        assert_eq!(machine.state(), RoundState::AwaitingRandomness);
        assert_eq!(machine.outstanding_request(), Some(request_id));
        assert_eq!(machine.entrant_count(), 1);

        // The genuine delivery still works afterwards.
        machine.on_randomness_delivered(request_id, 0).unwrap();
        assert_eq!(machine.state(), RoundState::Open);
    }

    #[test]
    fn test_replayed_delivery_rejected_after_settlement() {
        let mut machine = make_machine(2);
        machine.enter(AccountId::new(), fee()).unwrap();
        let request_id = machine.request_draw().unwrap();
        machine.on_randomness_delivered(request_id, 5).unwrap();

        let replay = machine.on_randomness_delivered(request_id, 5).unwrap_err();
        assert_eq!(replay, RequestIntegrityError::UnknownRequest(request_id));
        assert_eq!(machine.round(), RoundIndex(2));
        assert_eq!(machine.settlements().len(), 1);
    }

    #[test]
    fn test_winner_indexing_uses_request_time_count() {
        let mut machine = make_machine(4);
        let entrants: Vec<AccountId> = (0..3).map(|_| AccountId::new()).collect();
        for account in &entrants {
            machine.enter(account.clone(), fee()).unwrap();
        }
        let request_id = machine.request_draw().unwrap();
        // 10 mod 3 = 1.
        let record = machine.on_randomness_delivered(request_id, 10).unwrap();
        assert_eq!(record.winner, entrants[1]);
    }

    #[test]
    fn test_consecutive_rounds_get_fresh_request_ids() {
        let mut machine = make_machine(2);
        for expected_id in 1..=3u64 {
            machine.enter(AccountId::new(), fee()).unwrap();
            let request_id = machine.request_draw().unwrap();
            assert_eq!(request_id, RequestId(expected_id));
            machine.on_randomness_delivered(request_id, 0).unwrap();
        }
        assert_eq!(machine.round(), RoundIndex(4));
        assert_eq!(machine.settlements().len(), 3);
    }

    #[test]
    fn test_treasury_accumulates_until_swept() {
        let controller = AccountId::new();
        let mut machine = RaffleStateMachine::new(
            config(2, controller.clone()),
            MockRandomnessOracle::new(),
        )
        .unwrap();
        for _ in 0..2 {
            machine.enter(AccountId::new(), fee()).unwrap();
            machine.enter(AccountId::new(), fee()).unwrap();
            let id = machine.request_draw().unwrap();
            machine.on_randomness_delivered(id, 1).unwrap();
        }
        // Two pots of 2 tokens at 10% each.
        assert_eq!(machine.treasury_balance(), Amount::new(400_000_000));
        assert_eq!(machine.withdraw(&controller), Ok(Amount::new(400_000_000)));
        assert_eq!(machine.treasury_balance(), Amount::ZERO);
    }

    #[test]
    fn test_winner_claims_through_machine() {
        let mut machine = make_machine(2);
        let solo = AccountId::new();
        machine.enter(solo.clone(), fee()).unwrap();
        let id = machine.request_draw().unwrap();
        let record = machine.on_randomness_delivered(id, 123).unwrap();
        assert_eq!(machine.claim(&solo), Ok(record.winner_amount));
        assert_eq!(machine.claim(&solo), Err(LedgerError::NothingToWithdraw));
    }

    #[test]
    fn test_event_log_tells_the_round_story() {
        let mut machine = make_machine(2);
        let solo = AccountId::new();
        machine.enter(solo.clone(), fee()).unwrap();
        let id = machine.request_draw().unwrap();
        machine.on_randomness_delivered(id, 9).unwrap();

        let kinds: Vec<_> = machine
            .events()
            .iter()
            .map(|e| match e {
                RaffleEvent::EntrantAdmitted { .. } => "admitted",
                RaffleEvent::DrawRequested { .. } => "requested",
                RaffleEvent::WinnerPicked { .. } => "picked",
                RaffleEvent::PrizeClaimed { .. } => "claimed",
                RaffleEvent::TreasurySwept { .. } => "swept",
            })
            .collect();
        assert_eq!(kinds, vec!["admitted", "requested", "picked"]);
    }

    #[test]
    fn test_rejected_admission_emits_no_event() {
        let mut machine = make_machine(1);
        machine.enter(AccountId::new(), fee()).unwrap();
        let events_before = machine.events().len();
        machine.enter(AccountId::new(), fee()).unwrap_err();
        assert_eq!(machine.events().len(), events_before);
    }

    #[test]
    fn test_oracle_sees_frozen_context() {
        let mut machine = make_machine(4);
        machine.enter(AccountId::new(), fee()).unwrap();
        machine.enter(AccountId::new(), fee()).unwrap();
        machine.request_draw().unwrap();
        let (_, ctx) = machine.oracle().last_request().unwrap();
        assert_eq!(ctx.entrant_count, 2);
        assert_eq!(ctx.pot, Amount::from_tokens(2).unwrap());
        assert_eq!(ctx.round, RoundIndex::FIRST);
    }

    proptest! {
        #[test]
        fn prop_winner_is_random_value_mod_count(
            count in 1usize..=12,
            random_value in any::<u128>(),
        ) {
            let mut machine = make_machine(16);
            let entrants: Vec<AccountId> =
                (0..count).map(|_| AccountId::new()).collect();
            for account in &entrants {
                machine.enter(account.clone(), fee()).unwrap();
            }
            let id = machine.request_draw().unwrap();
            let record = machine.on_randomness_delivered(id, random_value).unwrap();
            let expected = &entrants[(random_value % count as u128) as usize];
            prop_assert_eq!(&record.winner, expected);
        }
    }
}
