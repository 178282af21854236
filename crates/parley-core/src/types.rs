// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entity types shared across the Parley workspace.
//!
//! All IDs are UUIDv7 strings, so identifier generation order is monotonic
//! and breaks creation-timestamp ties. Timestamps are UTC ISO-8601 strings
//! with millisecond precision, which sort lexicographically and therefore
//! compare correctly both in SQL and in Rust.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::participant::ParticipantStatus;

/// Render a timestamp in the canonical storage form
/// (`2026-01-01T00:00:00.000Z`).
pub fn format_timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a timestamp in the canonical storage form. Returns `None` for
/// malformed input.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// A directory identity. Owned by the external presence subsystem; the core
/// only reads it, except for refreshing `last_seen_at` as a side effect of
/// participation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub handle: String,
    pub online: bool,
    pub last_seen_at: String,
}

/// A conversation between joined participants.
///
/// `last_activity_at` is the only field mutated after creation; it advances
/// on every message post and participant status change. `deleted_at` is
/// reserved for soft deletion and never set by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub slug: String,
    pub name: Option<String>,
    pub creator_id: String,
    pub last_activity_at: Option<String>,
    pub deleted_at: Option<String>,
    pub created_at: String,
}

/// An immutable message within a conversation, strictly ordered by
/// `(created_at, id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    pub created_at: String,
}

/// The join record expressing one user's relationship to one conversation.
///
/// At most one row exists per (user, conversation) pair; the whole access
/// model rests on that uniqueness. Rows are created once and only transition
/// status afterwards; they are never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub user_id: String,
    pub conversation_id: String,
    pub status: ParticipantStatus,
    pub inviter_id: Option<String>,
    pub preview_message_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub joined_at: Option<String>,
}

/// One row of the invitee-facing invitation listing: the pending participant
/// joined with its conversation, inviter handle, and preview message content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingInvitation {
    pub participant_id: String,
    pub conversation_id: String,
    pub conversation_slug: String,
    pub conversation_name: Option<String>,
    pub inviter_handle: Option<String>,
    pub preview: Option<String>,
    pub invited_at: String,
}
