//! # raffle-engine — The Pooled Raffle State Machine
//!
//! Implements the raffle round lifecycle and the components it mediates:
//! entrant admission, the two-phase randomness protocol, winner
//! selection, and fund settlement.
//!
//! ## Lifecycle
//!
//! ```text
//! OPEN ──request_draw()──▶ AWAITING_RANDOMNESS ──delivery──▶ SETTLING ──▶ OPEN
//! ```
//!
//! ## Components
//!
//! - **Registry** (`registry.rs`): ordered paid admissions, exact-fee and
//!   capacity enforcement, per-round pot.
//!
//! - **Oracle seam** (`oracle.rs`): the `RandomnessOracleClient` trait
//!   plus the shipped deterministic mock. The core consumes randomness;
//!   it never produces it.
//!
//! - **Tracker** (`tracker.rs`): the outstanding-request table. Resolve
//!   removes the entry in the same step, so replays and forgeries are
//!   rejected with zero state mutation.
//!
//! - **Ledger** (`ledger.rs`): winner/treasury split, payable balances,
//!   append-only settlement records, zero-then-transfer collection.
//!
//! - **Machine** (`machine.rs`): the owner of all of the above and of the
//!   round lifecycle itself.
//!
//! - **Events** (`events.rs`): append-only log of observable occurrences.

pub mod events;
pub mod ledger;
pub mod machine;
pub mod oracle;
pub mod registry;
pub mod tracker;

// ─── Machine re-exports ─────────────────────────────────────────────

pub use machine::{DrawError, RaffleStateMachine, RoundState};

// ─── Registry re-exports ────────────────────────────────────────────

pub use registry::{AdmissionError, Entrant, EntrantRegistry, EntryReceipt};

// ─── Oracle re-exports ──────────────────────────────────────────────

pub use oracle::{DrawContext, MockRandomnessOracle, OracleError, RandomnessOracleClient};

// ─── Tracker re-exports ─────────────────────────────────────────────

pub use tracker::{RequestIntegrityError, RequestTracker};

// ─── Ledger re-exports ──────────────────────────────────────────────

pub use ledger::{LedgerError, SettlementLedger, SettlementRecord};

// ─── Event re-exports ───────────────────────────────────────────────

pub use events::RaffleEvent;
