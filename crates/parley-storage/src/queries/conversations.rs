// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation operations, including the creation transaction.

use parley_core::ParleyError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::models::{Conversation, Message, Participant};
use crate::queries::{messages, participants};

fn row_to_conversation(row: &rusqlite::Row<'_>) -> Result<Conversation, rusqlite::Error> {
    Ok(Conversation {
        id: row.get(0)?,
        slug: row.get(1)?,
        name: row.get(2)?,
        creator_id: row.get(3)?,
        last_activity_at: row.get(4)?,
        deleted_at: row.get(5)?,
        created_at: row.get(6)?,
    })
}

const SELECT_COLUMNS: &str =
    "SELECT id, slug, name, creator_id, last_activity_at, deleted_at, created_at
     FROM conversations";

/// Create a conversation together with its first message, the creator's
/// `joined` participant row, and the invitee's `invited` row, atomically.
///
/// The invitee row references the first message as its invitation preview.
/// Any failure rolls the whole transaction back, so a rejected create leaves
/// zero rows behind.
pub async fn create_with_first_message(
    db: &Database,
    conversation: &Conversation,
    first_message: &Message,
    creator: &Participant,
    invitee: &Participant,
) -> Result<(), ParleyError> {
    let conversation = conversation.clone();
    let first_message = first_message.clone();
    let creator = creator.clone();
    let invitee = invitee.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO conversations
                     (id, slug, name, creator_id, last_activity_at, deleted_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    conversation.id,
                    conversation.slug,
                    conversation.name,
                    conversation.creator_id,
                    conversation.last_activity_at,
                    conversation.deleted_at,
                    conversation.created_at,
                ],
            )?;
            messages::insert_message_stmt(&tx, &first_message)?;
            participants::insert_participant_stmt(&tx, &creator)?;
            participants::insert_participant_stmt(&tx, &invitee)?;
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a conversation by ID.
pub async fn get(db: &Database, id: &str) -> Result<Option<Conversation>, ParleyError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Conversation>, rusqlite::Error> {
            let result = conn.query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id],
                row_to_conversation,
            );
            match result {
                Ok(conversation) => Ok(Some(conversation)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Get a conversation by its unique slug.
pub async fn get_by_slug(db: &Database, slug: &str) -> Result<Option<Conversation>, ParleyError> {
    let slug = slug.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Conversation>, rusqlite::Error> {
            let result = conn.query_row(
                &format!("{SELECT_COLUMNS} WHERE slug = ?1"),
                params![slug],
                row_to_conversation,
            );
            match result {
                Ok(conversation) => Ok(Some(conversation)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}
