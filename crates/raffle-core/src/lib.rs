//! # raffle-core — Foundational Types for the Pooled Raffle Stack
//!
//! This crate is the bedrock of the raffle stack. It defines the
//! type-system primitives the engine builds on; every other crate in the
//! workspace depends on `raffle-core`, and it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `AccountId`,
//!    `RequestId`, `RoundIndex` — no bare integers or strings for
//!    identifiers, so a forged request id cannot be confused with a round
//!    index at any call site.
//!
//! 2. **Integer money.** `Amount` is a count of indivisible base units
//!    with checked arithmetic; `BasisPoints` is a validated share that can
//!    never exceed the whole. Floats never touch a balance.
//!
//! 3. **UTC-only timestamps.** `Timestamp` enforces UTC with seconds
//!    precision, keeping the settlement log's ordering deterministic.
//!
//! 4. **Validated configuration.** `RaffleConfig` is parsed from YAML and
//!    cross-checked before the engine will accept it.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `raffle-*` crates (this is the leaf).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug` and `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod amount;
pub mod config;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use amount::{Amount, BasisPoints, UNITS_PER_TOKEN};
pub use config::{ConfigError, OracleParams, RaffleConfig};
pub use error::CoreError;
pub use identity::{AccountId, RequestId, RoundIndex};
pub use temporal::Timestamp;
