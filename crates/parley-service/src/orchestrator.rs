// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversation orchestrator: atomic multi-entity operations.
//!
//! Each operation validates up front, then commits all of its writes in a
//! single storage transaction, so a failure never leaves partial rows
//! behind. Authorization decisions delegate to the pure evaluator in
//! `parley_core::access`; the orchestrator only loads the participant row
//! and passes the status in.

use std::sync::{Arc, LazyLock, Mutex};

use chrono::{Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use tracing::{debug, info, warn};
use uuid::{ContextV7, Timestamp, Uuid};

use parley_config::ParleyConfig;
use parley_core::access;
use parley_core::types::{
    format_timestamp, parse_timestamp, Conversation, Message, Participant, PendingInvitation,
    User,
};
use parley_core::{ParleyError, ParticipantStatus, Transition};
use parley_storage::ConversationStore;

// Shared V7 context so IDs generated within the same millisecond still
// increase monotonically, which is what makes the message tie-break on
// (created_at, id) follow generation order.
static UUID_CONTEXT: LazyLock<Mutex<ContextV7>> = LazyLock::new(|| Mutex::new(ContextV7::new()));

fn new_id() -> String {
    Uuid::new_v7(Timestamp::now(&*UUID_CONTEXT)).to_string()
}

fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

fn generate_slug(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

/// Presence policy: the online flag is owned by the external presence
/// subsystem, but a stale `last_seen_at` overrides it so a crashed client
/// does not look invitable forever.
fn is_online(user: &User, timeout_minutes: i64) -> bool {
    if !user.online {
        return false;
    }
    match parse_timestamp(&user.last_seen_at) {
        Some(last_seen) => Utc::now() - last_seen <= Duration::minutes(timeout_minutes),
        None => false,
    }
}

/// Coordinates the store and the access evaluator to implement conversation
/// creation, invitation, acceptance/rejection, and message posting as atomic
/// operations.
pub struct Orchestrator {
    store: Arc<ConversationStore>,
    config: ParleyConfig,
}

impl Orchestrator {
    pub fn new(store: Arc<ConversationStore>, config: ParleyConfig) -> Self {
        Self { store, config }
    }

    /// Create a conversation: the creator joins immediately, the invitee gets
    /// an `invited` row referencing the first message as its preview.
    ///
    /// The invitee receives no push signal; invitation discovery is
    /// pull-based via [`Orchestrator::pending_invitations`].
    pub async fn create_conversation(
        &self,
        creator_id: &str,
        invitee_handle: &str,
        content: &str,
    ) -> Result<Conversation, ParleyError> {
        let invitee = self
            .store
            .find_user_by_handle(invitee_handle)
            .await?
            .ok_or_else(|| ParleyError::UserNotFound {
                handle: invitee_handle.to_string(),
            })?;
        if !is_online(&invitee, self.config.presence.online_timeout_minutes) {
            return Err(ParleyError::InviteeOffline {
                handle: invitee.handle,
            });
        }
        if invitee.id == creator_id {
            return Err(ParleyError::SelfInvite);
        }
        let content = content.trim();
        if content.is_empty() {
            return Err(ParleyError::EmptyContent);
        }

        let slug = self.pick_slug().await?;
        let now = now_timestamp();
        let conversation = Conversation {
            id: new_id(),
            slug,
            name: None,
            creator_id: creator_id.to_string(),
            last_activity_at: Some(now.clone()),
            deleted_at: None,
            created_at: now.clone(),
        };
        let first_message = Message {
            id: new_id(),
            conversation_id: conversation.id.clone(),
            sender_id: creator_id.to_string(),
            content: content.to_string(),
            created_at: now.clone(),
        };
        let creator = Participant {
            id: new_id(),
            user_id: creator_id.to_string(),
            conversation_id: conversation.id.clone(),
            status: ParticipantStatus::Joined,
            inviter_id: None,
            preview_message_id: None,
            created_at: now.clone(),
            updated_at: now.clone(),
            joined_at: Some(now.clone()),
        };
        let invited = Participant {
            id: new_id(),
            user_id: invitee.id.clone(),
            conversation_id: conversation.id.clone(),
            status: ParticipantStatus::Invited,
            inviter_id: Some(creator_id.to_string()),
            preview_message_id: Some(first_message.id.clone()),
            created_at: now.clone(),
            updated_at: now.clone(),
            joined_at: None,
        };

        self.store
            .create_conversation(&conversation, &first_message, &creator, &invited)
            .await?;
        self.refresh_presence(creator_id, &now).await;

        info!(
            conversation_id = %conversation.id,
            slug = %conversation.slug,
            creator = creator_id,
            invitee = %invitee.id,
            "conversation created"
        );
        Ok(conversation)
    }

    /// Invite another user into an existing conversation. Requires the actor
    /// to be `joined`; a row in any status for the invitee is a conflict.
    pub async fn invite_participant(
        &self,
        actor_id: &str,
        conversation_id: &str,
        invitee_handle: &str,
    ) -> Result<Participant, ParleyError> {
        let actor_status = self
            .store
            .find_participant(actor_id, conversation_id)
            .await?
            .map(|p| p.status);
        if !access::can_invite(actor_status) {
            return Err(ParleyError::NotAuthorized);
        }

        let invitee = self
            .store
            .find_user_by_handle(invitee_handle)
            .await?
            .ok_or_else(|| ParleyError::UserNotFound {
                handle: invitee_handle.to_string(),
            })?;
        if !is_online(&invitee, self.config.presence.online_timeout_minutes) {
            return Err(ParleyError::InviteeOffline {
                handle: invitee.handle,
            });
        }

        let now = now_timestamp();
        let participant = Participant {
            id: new_id(),
            user_id: invitee.id.clone(),
            conversation_id: conversation_id.to_string(),
            status: ParticipantStatus::Invited,
            inviter_id: Some(actor_id.to_string()),
            preview_message_id: None,
            created_at: now.clone(),
            updated_at: now.clone(),
            joined_at: None,
        };
        self.store.add_invited_participant(&participant).await?;
        self.refresh_presence(actor_id, &now).await;

        info!(
            conversation_id = conversation_id,
            actor = actor_id,
            invitee = %invitee.id,
            "participant invited"
        );
        Ok(participant)
    }

    /// Apply a status transition to the actor's own participant row.
    ///
    /// A missing row and a row belonging to someone else are both
    /// `NotAuthorized`. Re-requesting an already-reached status is an
    /// idempotent no-op that leaves the conversation's activity untouched.
    pub async fn respond_to_invitation(
        &self,
        actor_id: &str,
        participant_id: &str,
        target: ParticipantStatus,
    ) -> Result<Participant, ParleyError> {
        let participant = self
            .store
            .get_participant(participant_id)
            .await?
            .ok_or(ParleyError::NotAuthorized)?;
        if participant.user_id != actor_id {
            return Err(ParleyError::NotAuthorized);
        }

        match participant.status.transition_to(target)? {
            Transition::AlreadyApplied => {
                debug!(
                    participant_id = participant_id,
                    status = %participant.status,
                    "transition retry tolerated as no-op"
                );
                Ok(participant)
            }
            Transition::Applied => {
                let now = now_timestamp();
                let joined_at = (target == ParticipantStatus::Joined).then(|| now.clone());
                self.store
                    .update_participant_status(
                        &participant.id,
                        target,
                        &now,
                        joined_at.as_deref(),
                        &participant.conversation_id,
                    )
                    .await?;
                self.refresh_presence(actor_id, &now).await;

                info!(
                    participant_id = participant_id,
                    conversation_id = %participant.conversation_id,
                    from = %participant.status,
                    to = %target,
                    "participant transitioned"
                );
                Ok(Participant {
                    status: target,
                    updated_at: now,
                    joined_at: joined_at.or(participant.joined_at),
                    ..participant
                })
            }
        }
    }

    /// Append a message to a conversation the actor has joined.
    ///
    /// A nonexistent conversation is indistinguishable from one the actor is
    /// not part of: both deny with `NotAuthorized`.
    pub async fn post_message(
        &self,
        actor_id: &str,
        conversation_id: &str,
        content: &str,
    ) -> Result<Message, ParleyError> {
        let actor_status = self
            .store
            .find_participant(actor_id, conversation_id)
            .await?
            .map(|p| p.status);
        if !access::can_write(actor_status) {
            return Err(ParleyError::NotAuthorized);
        }

        let content = content.trim();
        if content.is_empty() {
            return Err(ParleyError::EmptyContent);
        }

        let now = now_timestamp();
        let message = Message {
            id: new_id(),
            conversation_id: conversation_id.to_string(),
            sender_id: actor_id.to_string(),
            content: content.to_string(),
            created_at: now.clone(),
        };
        self.store.append_message(&message).await?;
        self.refresh_presence(actor_id, &now).await;

        debug!(
            conversation_id = conversation_id,
            message_id = %message.id,
            sender = actor_id,
            "message posted"
        );
        Ok(message)
    }

    /// The actor's pending invitations, newest first. This listing is how
    /// invitees discover conversations; there is no push channel.
    pub async fn pending_invitations(
        &self,
        user_id: &str,
    ) -> Result<Vec<PendingInvitation>, ParleyError> {
        self.store.pending_invitations(user_id).await
    }

    /// Generate a slug not currently in use. The UNIQUE constraint still
    /// backs this up if a concurrent create wins the same slug.
    async fn pick_slug(&self) -> Result<String, ParleyError> {
        for _ in 0..4 {
            let slug = generate_slug(self.config.conversation.slug_length);
            if self
                .store
                .get_conversation_by_slug(&slug)
                .await?
                .is_none()
            {
                return Ok(slug);
            }
        }
        Err(ParleyError::Storage {
            source: "could not find a free conversation slug".into(),
        })
    }

    /// Refresh the actor's last-seen timestamp. Best-effort: presence is an
    /// accepted race per the shared resource policy, so failures are logged
    /// and swallowed.
    async fn refresh_presence(&self, user_id: &str, at: &str) {
        if let Err(e) = self.store.touch_last_seen(user_id, at).await {
            warn!(user = user_id, error = %e, "presence refresh failed (non-fatal)");
        }
    }
}
