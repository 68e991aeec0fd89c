//! # Randomness Request Tracker
//!
//! The pending-request table behind the two-phase draw protocol. Every
//! outstanding request identifier maps to the round that issued it;
//! resolving an identifier removes the mapping in the same step, so a
//! second delivery for the same identifier finds nothing and is rejected.
//!
//! A failed lookup mutates nothing — replayed, forged, and stale
//! identifiers all bounce off this table without touching round state.

use std::collections::HashMap;

use thiserror::Error;

use raffle_core::{RequestId, RoundIndex};

/// Integrity violations on the request table.
///
/// Never fatal: both variants are rejected with zero state mutation and
/// logged, since either may reflect a replay or a forged call rather
/// than a program defect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestIntegrityError {
    /// The oracle handed out an identifier that is already outstanding.
    /// Must never happen given oracle uniqueness — defensive check.
    #[error("randomness {0} is already outstanding")]
    DuplicateRequest(RequestId),

    /// The identifier was never issued, or was already consumed.
    #[error("randomness {0} is unknown or already consumed")]
    UnknownRequest(RequestId),
}

/// Maps outstanding request identifiers to their owning round.
#[derive(Debug, Default)]
pub struct RequestTracker {
    outstanding: HashMap<RequestId, RoundIndex>,
}

impl RequestTracker {
    /// An empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outstanding request.
    pub fn register(
        &mut self,
        request_id: RequestId,
        round: RoundIndex,
    ) -> Result<(), RequestIntegrityError> {
        if self.outstanding.contains_key(&request_id) {
            return Err(RequestIntegrityError::DuplicateRequest(request_id));
        }
        self.outstanding.insert(request_id, round);
        tracing::debug!(%request_id, %round, "randomness request registered");
        Ok(())
    }

    /// Look up an identifier and remove it in the same step.
    ///
    /// Returns the owning round. After a successful resolve the
    /// identifier is spent — a second resolve fails `UnknownRequest`.
    pub fn resolve(&mut self, request_id: RequestId) -> Result<RoundIndex, RequestIntegrityError> {
        self.outstanding
            .remove(&request_id)
            .ok_or(RequestIntegrityError::UnknownRequest(request_id))
    }

    /// Whether the identifier is currently outstanding.
    pub fn is_outstanding(&self, request_id: RequestId) -> bool {
        self.outstanding.contains_key(&request_id)
    }

    /// Number of outstanding requests. At most 1 while a single state
    /// machine owns this tracker.
    pub fn outstanding_count(&self) -> usize {
        self.outstanding.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_then_resolve() {
        let mut tracker = RequestTracker::new();
        tracker.register(RequestId(1), RoundIndex::FIRST).unwrap();
        assert!(tracker.is_outstanding(RequestId(1)));
        assert_eq!(tracker.resolve(RequestId(1)).unwrap(), RoundIndex::FIRST);
        assert!(!tracker.is_outstanding(RequestId(1)));
    }

    #[test]
    fn test_resolve_is_single_use() {
        let mut tracker = RequestTracker::new();
        tracker.register(RequestId(1), RoundIndex::FIRST).unwrap();
        tracker.resolve(RequestId(1)).unwrap();
        assert_eq!(
            tracker.resolve(RequestId(1)),
            Err(RequestIntegrityError::UnknownRequest(RequestId(1)))
        );
    }

    #[test]
    fn test_unknown_id_rejected_without_mutation() {
        let mut tracker = RequestTracker::new();
        tracker.register(RequestId(1), RoundIndex::FIRST).unwrap();
        assert_eq!(
            tracker.resolve(RequestId(99)),
            Err(RequestIntegrityError::UnknownRequest(RequestId(99)))
        );
        // The real entry is untouched.
        assert!(tracker.is_outstanding(RequestId(1)));
        assert_eq!(tracker.outstanding_count(), 1);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut tracker = RequestTracker::new();
        tracker.register(RequestId(1), RoundIndex::FIRST).unwrap();
        assert_eq!(
            tracker.register(RequestId(1), RoundIndex(2)),
            Err(RequestIntegrityError::DuplicateRequest(RequestId(1)))
        );
        // The first mapping survives the rejected duplicate.
        assert_eq!(tracker.resolve(RequestId(1)).unwrap(), RoundIndex::FIRST);
    }

    #[test]
    fn test_empty_tracker_rejects_everything() {
        let mut tracker = RequestTracker::new();
        assert!(tracker.resolve(RequestId(0)).is_err());
        assert_eq!(tracker.outstanding_count(), 0);
    }
}
