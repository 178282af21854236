// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The update feed protocol: cache-validator polling for new messages.
//!
//! Clients carry an opaque freshness token and poll on whatever interval
//! they like; the feed either answers "not modified" cheaply or returns the
//! messages created strictly after the token, in ascending order, together
//! with a fresh validator. Polls are read-only, so a timed-out request can
//! always be retried with the same token.

use std::sync::Arc;

use tracing::debug;

use parley_config::ParleyConfig;
use parley_core::access;
use parley_core::types::{format_timestamp, parse_timestamp, Message};
use parley_core::{FeedValidator, ParleyError};
use parley_storage::{ConversationStore, FeedStats};

/// Outcome of a poll. The HTTP layer maps `NotModified` to a 304 with the
/// validator attached, and `Updates` to a 200 carrying the batch plus the
/// new validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedResponse {
    NotModified {
        validator: FeedValidator,
    },
    Updates {
        messages: Vec<Message>,
        validator: FeedValidator,
    },
}

/// Read endpoint for incremental message discovery.
pub struct UpdateFeed {
    store: Arc<ConversationStore>,
    config: ParleyConfig,
}

impl UpdateFeed {
    pub fn new(store: Arc<ConversationStore>, config: ParleyConfig) -> Self {
        Self { store, config }
    }

    /// Poll one conversation for messages newer than the client's token.
    ///
    /// The returned validator always describes the conversation's newest
    /// message overall, so repeated polling neither duplicates nor skips
    /// messages even with concurrent writers. A malformed token is ignored,
    /// which degrades to a full resync rather than an error.
    pub async fn poll(
        &self,
        user_id: &str,
        conversation_id: &str,
        client_token: Option<&str>,
    ) -> Result<FeedResponse, ParleyError> {
        self.require_read_access(user_id, conversation_id).await?;

        let stats = self.store.feed_stats(conversation_id).await?;
        let current = validator_from_stats(&stats)?;

        let client = client_token.and_then(|token| {
            let decoded = FeedValidator::decode(token);
            if decoded.is_none() {
                debug!(token, "ignoring malformed feed token");
            }
            decoded
        });

        let after = match client {
            Some(client) => {
                if current.is_current_for(&client) {
                    return Ok(FeedResponse::NotModified { validator: current });
                }
                client.last_modified.map(format_timestamp)
            }
            None => None,
        };

        let messages = self
            .store
            .messages_since(conversation_id, after.as_deref())
            .await?;
        if messages.is_empty() {
            return Ok(FeedResponse::NotModified { validator: current });
        }
        Ok(FeedResponse::Updates {
            messages,
            validator: current,
        })
    }

    /// Initial conversation load: the most recent page of messages in
    /// ascending order, plus the current validator so the client can start
    /// polling from here.
    pub async fn initial_messages(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> Result<FeedResponse, ParleyError> {
        self.require_read_access(user_id, conversation_id).await?;

        let stats = self.store.feed_stats(conversation_id).await?;
        let validator = validator_from_stats(&stats)?;
        let messages = self
            .store
            .recent_messages(conversation_id, self.config.conversation.initial_page_size)
            .await?;
        Ok(FeedResponse::Updates {
            messages,
            validator,
        })
    }

    async fn require_read_access(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> Result<(), ParleyError> {
        let status = self
            .store
            .find_participant(user_id, conversation_id)
            .await?
            .map(|p| p.status);
        if !access::can_read(status) {
            return Err(ParleyError::NotAuthorized);
        }
        Ok(())
    }
}

/// Build the validator for a feed snapshot. Message timestamps are written
/// by this service in the canonical format, so a parse failure here means
/// corrupt storage, not client input.
fn validator_from_stats(stats: &FeedStats) -> Result<FeedValidator, ParleyError> {
    let last_modified = match &stats.last_created_at {
        Some(ts) => Some(parse_timestamp(ts).ok_or_else(|| ParleyError::Storage {
            source: format!("corrupt message timestamp: {ts}").into(),
        })?),
        None => None,
    };
    Ok(FeedValidator::new(last_modified, stats.message_count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validator_from_empty_stats_is_the_empty_sentinel() {
        let stats = FeedStats {
            last_created_at: None,
            message_count: 0,
        };
        let validator = validator_from_stats(&stats).unwrap();
        assert_eq!(validator, FeedValidator::new(None, 0));
        assert_eq!(validator.encode(), "empty;0");
    }

    #[test]
    fn validator_from_stats_round_trips_timestamp() {
        let stats = FeedStats {
            last_created_at: Some("2026-01-01T10:00:00.250Z".to_string()),
            message_count: 3,
        };
        let validator = validator_from_stats(&stats).unwrap();
        assert_eq!(validator.encode(), "2026-01-01T10:00:00.250Z;3");
    }

    #[test]
    fn corrupt_stored_timestamp_is_a_storage_error() {
        let stats = FeedStats {
            last_created_at: Some("garbage".to_string()),
            message_count: 1,
        };
        let err = validator_from_stats(&stats).unwrap_err();
        assert!(matches!(err, ParleyError::Storage { .. }));
    }
}
