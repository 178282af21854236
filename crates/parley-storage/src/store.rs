// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store facade over the typed query modules.
//!
//! [`ConversationStore`] owns the [`Database`] lifecycle and is the single
//! handle the service layer is constructed with. It adds no logic of its
//! own; every method delegates to a query module.

use parley_config::StorageConfig;
use parley_core::{ParleyError, ParticipantStatus};
use tracing::debug;

use crate::database::{map_tr_err, Database};
use crate::models::{Conversation, Message, Participant, PendingInvitation, User};
use crate::queries::{conversations, messages, participants, users};
use crate::queries::messages::FeedStats;

/// SQLite-backed conversation store.
pub struct ConversationStore {
    db: Database,
}

impl ConversationStore {
    /// Open the database at the configured path, running migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, ParleyError> {
        let db = Database::open(config).await?;
        debug!(path = %config.database_path, "conversation store ready");
        Ok(Self { db })
    }

    /// Cheap liveness probe for the underlying connection.
    pub async fn health_check(&self) -> Result<(), ParleyError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Checkpoint and close the database.
    pub async fn close(self) -> Result<(), ParleyError> {
        self.db.close().await
    }

    // --- User directory operations ---

    pub async fn create_user(&self, user: &User) -> Result<(), ParleyError> {
        users::create_user(&self.db, user).await
    }

    pub async fn find_user_by_handle(&self, handle: &str) -> Result<Option<User>, ParleyError> {
        users::find_by_handle(&self.db, handle).await
    }

    pub async fn set_user_online(&self, id: &str, online: bool) -> Result<(), ParleyError> {
        users::set_online(&self.db, id, online).await
    }

    pub async fn touch_last_seen(&self, id: &str, at: &str) -> Result<(), ParleyError> {
        users::touch_last_seen(&self.db, id, at).await
    }

    // --- Conversation operations ---

    pub async fn create_conversation(
        &self,
        conversation: &Conversation,
        first_message: &Message,
        creator: &Participant,
        invitee: &Participant,
    ) -> Result<(), ParleyError> {
        conversations::create_with_first_message(
            &self.db,
            conversation,
            first_message,
            creator,
            invitee,
        )
        .await
    }

    pub async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, ParleyError> {
        conversations::get(&self.db, id).await
    }

    pub async fn get_conversation_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Conversation>, ParleyError> {
        conversations::get_by_slug(&self.db, slug).await
    }

    // --- Message operations ---

    pub async fn append_message(&self, message: &Message) -> Result<(), ParleyError> {
        messages::append_with_activity(&self.db, message).await
    }

    pub async fn messages_since(
        &self,
        conversation_id: &str,
        after: Option<&str>,
    ) -> Result<Vec<Message>, ParleyError> {
        messages::list_since(&self.db, conversation_id, after).await
    }

    pub async fn recent_messages(
        &self,
        conversation_id: &str,
        limit: i64,
    ) -> Result<Vec<Message>, ParleyError> {
        messages::list_recent(&self.db, conversation_id, limit).await
    }

    pub async fn feed_stats(&self, conversation_id: &str) -> Result<FeedStats, ParleyError> {
        messages::feed_stats(&self.db, conversation_id).await
    }

    // --- Participant operations ---

    pub async fn add_invited_participant(&self, p: &Participant) -> Result<(), ParleyError> {
        participants::insert_invited(&self.db, p).await
    }

    pub async fn get_participant(&self, id: &str) -> Result<Option<Participant>, ParleyError> {
        participants::get(&self.db, id).await
    }

    pub async fn find_participant(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> Result<Option<Participant>, ParleyError> {
        participants::find_for_user(&self.db, user_id, conversation_id).await
    }

    pub async fn update_participant_status(
        &self,
        id: &str,
        status: ParticipantStatus,
        updated_at: &str,
        joined_at: Option<&str>,
        conversation_id: &str,
    ) -> Result<(), ParleyError> {
        participants::update_status(&self.db, id, status, updated_at, joined_at, conversation_id)
            .await
    }

    pub async fn pending_invitations(
        &self,
        user_id: &str,
    ) -> Result<Vec<PendingInvitation>, ParleyError> {
        participants::list_pending_for_user(&self.db, user_id).await
    }
}
