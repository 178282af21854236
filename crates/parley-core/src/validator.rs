// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Freshness validator for the update feed.
//!
//! The validator is the conditional-request token the feed hands to clients:
//! it encodes the creation time of the newest message the client has seen
//! plus the total message count at that point. The count disambiguates
//! same-timestamp insert races that a bare timestamp comparison would miss.
//!
//! Transport form is `<rfc3339-millis>;<count>` (e.g.
//! `2026-01-01T00:00:00.000Z;5`), or `empty;0` for a conversation with no
//! messages. Millisecond precision matches the storage timestamp format, so
//! sub-second message bursts cannot fall between two polls the way they
//! would with a one-second HTTP date.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{format_timestamp, parse_timestamp};

/// Sentinel encoding a conversation with no messages.
const EMPTY_SENTINEL: &str = "empty";

/// Opaque-to-the-client marker for "everything already seen" in one
/// conversation's message feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedValidator {
    /// Creation time of the newest message, or `None` when the conversation
    /// has no messages.
    pub last_modified: Option<DateTime<Utc>>,
    /// Total number of messages in the conversation.
    pub message_count: i64,
}

impl FeedValidator {
    pub fn new(last_modified: Option<DateTime<Utc>>, message_count: i64) -> Self {
        Self {
            last_modified,
            message_count,
        }
    }

    /// Serialize for transport.
    pub fn encode(&self) -> String {
        match self.last_modified {
            Some(t) => format!("{};{}", format_timestamp(t), self.message_count),
            None => format!("{EMPTY_SENTINEL};0"),
        }
    }

    /// Parse a client-supplied token. Returns `None` for malformed input;
    /// the feed treats that as no token at all, per conditional HTTP
    /// semantics where an unparseable validator is simply ignored.
    pub fn decode(token: &str) -> Option<Self> {
        let (time_part, count_part) = token.split_once(';')?;
        let message_count: i64 = count_part.parse().ok()?;
        if message_count < 0 {
            return None;
        }
        if time_part == EMPTY_SENTINEL {
            if message_count != 0 {
                return None;
            }
            return Some(Self::new(None, 0));
        }
        let last_modified = parse_timestamp(time_part)?;
        Some(Self::new(Some(last_modified), message_count))
    }

    /// True when a client holding `client` has nothing new to fetch from a
    /// conversation currently described by `self`.
    pub fn is_current_for(&self, client: &FeedValidator) -> bool {
        match (self.last_modified, client.last_modified) {
            // No messages exist, so nothing can be newer than any token.
            (None, _) => true,
            // Client has seen an empty conversation; any message is news.
            (Some(_), None) => false,
            (Some(latest), Some(seen)) => {
                latest <= seen && self.message_count == client.message_count
            }
        }
    }
}
