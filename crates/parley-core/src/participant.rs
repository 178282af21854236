// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Participant lifecycle state machine.
//!
//! A participant row is created exactly once, in `invited` (by invitation) or
//! `joined` (conversation creator) status, and only transitions thereafter:
//!
//! ```text
//! invited -> joined -> left
//! invited -> rejected
//! ```
//!
//! `rejected` and `left` are terminal. Re-requesting a status the participant
//! already holds is treated as an idempotent no-op so retried client requests
//! do not fail spuriously.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ParleyError;

/// One user's relationship to one conversation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    /// Awaiting the invited user's response. Only reachable at row creation.
    Invited,
    /// Full member: may read, write, and invite.
    Joined,
    /// Declined the invitation. Terminal.
    Rejected,
    /// Left after having joined. Terminal.
    Left,
}

/// Outcome of a legal transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The status changed; the caller must persist it and touch the
    /// conversation's activity timestamp.
    Applied,
    /// The participant already holds the requested status. Nothing to
    /// persist; conversation activity is untouched.
    AlreadyApplied,
}

impl ParticipantStatus {
    /// Evaluate a transition request against the state machine.
    ///
    /// `invited` is never a legal target: invitation happens at row creation,
    /// not by transition.
    pub fn transition_to(self, target: ParticipantStatus) -> Result<Transition, ParleyError> {
        use ParticipantStatus::*;

        if target == Invited {
            return Err(ParleyError::InvalidTransition { from: self, to: target });
        }
        if self == target {
            return Ok(Transition::AlreadyApplied);
        }
        match (self, target) {
            (Invited, Joined) | (Invited, Rejected) | (Joined, Left) => Ok(Transition::Applied),
            (from, to) => Err(ParleyError::InvalidTransition { from, to }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ParticipantStatus::*;
    use super::*;

    fn applied(from: ParticipantStatus, to: ParticipantStatus) -> bool {
        matches!(from.transition_to(to), Ok(Transition::Applied))
    }

    fn noop(from: ParticipantStatus, to: ParticipantStatus) -> bool {
        matches!(from.transition_to(to), Ok(Transition::AlreadyApplied))
    }

    fn rejected_move(from: ParticipantStatus, to: ParticipantStatus) -> bool {
        matches!(
            from.transition_to(to),
            Err(ParleyError::InvalidTransition { .. })
        )
    }

    #[test]
    fn full_transition_matrix() {
        let all = [Invited, Joined, Rejected, Left];

        // Legal moves.
        assert!(applied(Invited, Joined));
        assert!(applied(Invited, Rejected));
        assert!(applied(Joined, Left));

        // Idempotent retries of an already-reached status.
        assert!(noop(Joined, Joined));
        assert!(noop(Rejected, Rejected));
        assert!(noop(Left, Left));

        // Invited is never a target, not even from itself.
        for from in all {
            assert!(rejected_move(from, Invited), "{from} -> invited must fail");
        }

        // Everything else is illegal.
        assert!(rejected_move(Invited, Left));
        assert!(rejected_move(Joined, Rejected));
        assert!(rejected_move(Rejected, Joined));
        assert!(rejected_move(Rejected, Left));
        assert!(rejected_move(Left, Joined));
        assert!(rejected_move(Left, Rejected));
    }

    #[test]
    fn terminal_states_reach_nothing_new() {
        for from in [Rejected, Left] {
            for to in [Invited, Joined, Rejected, Left] {
                if from == to {
                    assert!(noop(from, to));
                } else {
                    assert!(rejected_move(from, to));
                }
            }
        }
    }

    #[test]
    fn status_round_trips_through_storage_form() {
        for status in [Invited, Joined, Rejected, Left] {
            let text = status.to_string();
            assert_eq!(text, text.to_lowercase());
            let parsed: ParticipantStatus = text.parse().expect("should parse back");
            assert_eq!(parsed, status);
        }
    }
}
