// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Parley conversation service.

use thiserror::Error;

use crate::participant::ParticipantStatus;

/// The primary error type used across all Parley core operations.
///
/// Every variant is a stable, enumerable failure the HTTP layer can map to a
/// status code; internal storage failures are wrapped and never leaked raw.
#[derive(Debug, Error)]
pub enum ParleyError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// No user exists with the given handle.
    #[error("user not found: {handle}")]
    UserNotFound { handle: String },

    /// The acting user's participant status does not permit the operation.
    /// Also returned when the target conversation or participant row does not
    /// exist, so absence is indistinguishable from denial.
    #[error("not authorized")]
    NotAuthorized,

    /// A user tried to invite themself to a conversation they are creating.
    #[error("cannot invite yourself")]
    SelfInvite,

    /// The invitee is not currently online.
    #[error("invitee is offline: {handle}")]
    InviteeOffline { handle: String },

    /// Message content is empty after trimming.
    #[error("message content is empty")]
    EmptyContent,

    /// The invitee already has a participant row for the conversation,
    /// in any status.
    #[error("user is already a participant")]
    AlreadyParticipant,

    /// Illegal participant state machine move.
    #[error("invalid participant transition: {from} -> {to}")]
    InvalidTransition {
        from: ParticipantStatus,
        to: ParticipantStatus,
    },

    /// Storage backend errors (database connection, query failure, constraint
    /// violations that are not business conflicts).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Coarse error classification consumed by the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    NotAuthorized,
    BusinessRule,
    Conflict,
    InvalidTransition,
    Internal,
}

impl ParleyError {
    /// Classify this error into the taxonomy the external interface maps to
    /// response codes.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParleyError::UserNotFound { .. } => ErrorKind::NotFound,
            ParleyError::NotAuthorized => ErrorKind::NotAuthorized,
            ParleyError::SelfInvite
            | ParleyError::InviteeOffline { .. }
            | ParleyError::EmptyContent => ErrorKind::BusinessRule,
            ParleyError::AlreadyParticipant => ErrorKind::Conflict,
            ParleyError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            ParleyError::Config(_) | ParleyError::Storage { .. } => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_classifies() {
        let cases: Vec<(ParleyError, ErrorKind)> = vec![
            (
                ParleyError::UserNotFound {
                    handle: "bob".into(),
                },
                ErrorKind::NotFound,
            ),
            (ParleyError::NotAuthorized, ErrorKind::NotAuthorized),
            (ParleyError::SelfInvite, ErrorKind::BusinessRule),
            (
                ParleyError::InviteeOffline {
                    handle: "bob".into(),
                },
                ErrorKind::BusinessRule,
            ),
            (ParleyError::EmptyContent, ErrorKind::BusinessRule),
            (ParleyError::AlreadyParticipant, ErrorKind::Conflict),
            (
                ParleyError::InvalidTransition {
                    from: ParticipantStatus::Rejected,
                    to: ParticipantStatus::Joined,
                },
                ErrorKind::InvalidTransition,
            ),
            (ParleyError::Config("bad".into()), ErrorKind::Internal),
            (
                ParleyError::Storage {
                    source: Box::new(std::io::Error::other("disk")),
                },
                ErrorKind::Internal,
            ),
        ];
        for (err, kind) in cases {
            assert_eq!(err.kind(), kind, "misclassified: {err}");
        }
    }

    #[test]
    fn display_does_not_leak_storage_internals_kind() {
        let err = ParleyError::Storage {
            source: Box::new(std::io::Error::other("sqlite disk I/O error")),
        };
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.to_string().starts_with("storage error:"));
    }
}
