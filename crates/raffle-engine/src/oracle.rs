//! # Randomness Oracle Client Seam
//!
//! Abstract interface to the external randomness oracle. The core never
//! generates randomness itself: it hands off a request, receives an
//! identifier immediately, and consumes the random value later through
//! the state machine's delivery entry point.
//!
//! The oracle is trusted to assign identifiers that are unique for the
//! lifetime of the system and to deliver at most once per identifier,
//! never before the request is acknowledged. An oracle that never replies
//! leaves the round stuck in AWAITING_RANDOMNESS — by design, this core
//! carries no timeout or retry.
//!
//! [`MockRandomnessOracle`] is the shipped deterministic implementation;
//! mock and production bindings are interchangeable at compile time
//! behind the one trait.

use thiserror::Error;

use raffle_core::{Amount, RequestId, RoundIndex};

/// Error raised when the oracle refuses or cannot accept a request.
#[derive(Error, Debug)]
pub enum OracleError {
    /// The request could not be handed to the oracle.
    #[error("oracle request failed: {0}")]
    RequestFailed(String),
}

/// The request-scoped facts an oracle binding needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawContext {
    /// The round the randomness is for.
    pub round: RoundIndex,
    /// Entrant count frozen at request time.
    pub entrant_count: u64,
    /// Pot frozen at request time.
    pub pot: Amount,
}

/// Abstract interface to the external randomness oracle.
pub trait RandomnessOracleClient {
    /// Ask the oracle for a random value.
    ///
    /// Returns the oracle-assigned request identifier immediately; the
    /// value itself arrives later via the delivery entry point, tagged
    /// with the same identifier.
    fn request_random_words(&mut self, ctx: &DrawContext) -> Result<RequestId, OracleError>;
}

/// Deterministic in-process oracle used by the test suite.
///
/// Assigns sequential identifiers starting at 1 and records every
/// request context. It never delivers on its own — tests play the
/// delivery role explicitly, which is exactly what makes replay and
/// forgery scenarios expressible.
#[derive(Debug, Default)]
pub struct MockRandomnessOracle {
    next_id: u64,
    requests: Vec<(RequestId, DrawContext)>,
}

impl MockRandomnessOracle {
    /// A mock with no requests yet; the first id handed out is 1.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            requests: Vec::new(),
        }
    }

    /// Every request received, in order.
    pub fn requests(&self) -> &[(RequestId, DrawContext)] {
        &self.requests
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<&(RequestId, DrawContext)> {
        self.requests.last()
    }
}

impl RandomnessOracleClient for MockRandomnessOracle {
    fn request_random_words(&mut self, ctx: &DrawContext) -> Result<RequestId, OracleError> {
        // new() starts at 1; Default::default() would start at 0, so
        // normalize here rather than trusting construction.
        if self.next_id == 0 {
            self.next_id = 1;
        }
        let id = RequestId::new(self.next_id);
        self.next_id += 1;
        self.requests.push((id, ctx.clone()));
        Ok(id)
    }
}
