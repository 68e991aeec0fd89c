//! # Raffle Events
//!
//! Append-only record of the externally observable things a raffle does.
//! The state machine pushes one event per admission, draw request,
//! settlement, and collection; operators read the log through
//! `RaffleStateMachine::events()`.

use serde::{Deserialize, Serialize};

use raffle_core::{AccountId, Amount, RequestId, RoundIndex};

/// One externally observable raffle occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RaffleEvent {
    /// A paid admission was accepted.
    EntrantAdmitted {
        /// The round entered.
        round: RoundIndex,
        /// The admitted account.
        account: AccountId,
        /// Zero-based slot taken.
        slot: u64,
    },

    /// A randomness request was issued to the oracle.
    DrawRequested {
        /// The round being drawn.
        round: RoundIndex,
        /// The oracle-assigned identifier.
        request_id: RequestId,
    },

    /// Randomness arrived and a winner was selected.
    WinnerPicked {
        /// The round that settled.
        round: RoundIndex,
        /// The selected winner.
        winner: AccountId,
        /// The pot that was split.
        pot: Amount,
    },

    /// A winner collected an accumulated prize balance.
    PrizeClaimed {
        /// The collecting account.
        account: AccountId,
        /// The amount handed over.
        amount: Amount,
    },

    /// The controller swept the treasury balance.
    TreasurySwept {
        /// The amount swept.
        amount: Amount,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = RaffleEvent::DrawRequested {
            round: RoundIndex::FIRST,
            request_id: RequestId(1),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"kind\":\"draw_requested\""));
        let parsed: RaffleEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
