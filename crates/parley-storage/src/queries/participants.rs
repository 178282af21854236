// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Participant operations.
//!
//! The UNIQUE(user_id, conversation_id) constraint is the arbiter for
//! concurrent invites: whichever insert lands second gets a conflict, which
//! surfaces as [`ParleyError::AlreadyParticipant`].

use parley_core::{ParleyError, ParticipantStatus};
use rusqlite::params;

use crate::database::{is_unique_violation, map_tr_err, Database};
use crate::models::{Participant, PendingInvitation};

fn row_to_participant(row: &rusqlite::Row<'_>) -> Result<Participant, rusqlite::Error> {
    let status: String = row.get(3)?;
    let status = status.parse::<ParticipantStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Participant {
        id: row.get(0)?,
        user_id: row.get(1)?,
        conversation_id: row.get(2)?,
        status,
        inviter_id: row.get(4)?,
        preview_message_id: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        joined_at: row.get(8)?,
    })
}

const SELECT_COLUMNS: &str = "SELECT id, user_id, conversation_id, status, inviter_id,
            preview_message_id, created_at, updated_at, joined_at
     FROM participants";

/// Insert a participant inside an existing transaction (or bare connection).
pub(crate) fn insert_participant_stmt(
    conn: &rusqlite::Connection,
    p: &Participant,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO participants
             (id, user_id, conversation_id, status, inviter_id, preview_message_id,
              created_at, updated_at, joined_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            p.id,
            p.user_id,
            p.conversation_id,
            p.status.to_string(),
            p.inviter_id,
            p.preview_message_id,
            p.created_at,
            p.updated_at,
            p.joined_at,
        ],
    )?;
    Ok(())
}

/// Insert an invitation row and advance the conversation's activity
/// timestamp in one transaction.
///
/// Returns [`ParleyError::AlreadyParticipant`] when a row for the
/// (user, conversation) pair already exists in any status.
pub async fn insert_invited(db: &Database, p: &Participant) -> Result<(), ParleyError> {
    let participant = p.clone();
    let inserted = db
        .connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let tx = conn.transaction()?;
            match insert_participant_stmt(&tx, &participant) {
                Err(e) if is_unique_violation(&e) => return Ok(false),
                other => other?,
            }
            tx.execute(
                "UPDATE conversations SET last_activity_at = ?1 WHERE id = ?2",
                params![participant.updated_at, participant.conversation_id],
            )?;
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(map_tr_err)?;
    if inserted {
        Ok(())
    } else {
        Err(ParleyError::AlreadyParticipant)
    }
}

/// Get a participant by ID.
pub async fn get(db: &Database, id: &str) -> Result<Option<Participant>, ParleyError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Participant>, rusqlite::Error> {
            let result = conn.query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id],
                row_to_participant,
            );
            match result {
                Ok(participant) => Ok(Some(participant)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Find the unique participant row for a (user, conversation) pair.
pub async fn find_for_user(
    db: &Database,
    user_id: &str,
    conversation_id: &str,
) -> Result<Option<Participant>, ParleyError> {
    let user_id = user_id.to_string();
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Participant>, rusqlite::Error> {
            let result = conn.query_row(
                &format!("{SELECT_COLUMNS} WHERE user_id = ?1 AND conversation_id = ?2"),
                params![user_id, conversation_id],
                row_to_participant,
            );
            match result {
                Ok(participant) => Ok(Some(participant)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Persist a status transition and advance the conversation's activity
/// timestamp in one transaction.
///
/// `joined_at` is only written when provided; an existing value is kept, so
/// leaving does not erase the join time.
pub async fn update_status(
    db: &Database,
    id: &str,
    status: ParticipantStatus,
    updated_at: &str,
    joined_at: Option<&str>,
    conversation_id: &str,
) -> Result<(), ParleyError> {
    let id = id.to_string();
    let status = status.to_string();
    let updated_at = updated_at.to_string();
    let joined_at = joined_at.map(|s| s.to_string());
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            tx.execute(
                "UPDATE participants
                 SET status = ?1, updated_at = ?2, joined_at = COALESCE(?3, joined_at)
                 WHERE id = ?4",
                params![status, updated_at, joined_at, id],
            )?;
            tx.execute(
                "UPDATE conversations SET last_activity_at = ?1 WHERE id = ?2",
                params![updated_at, conversation_id],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// All of a user's pending invitations, newest first, joined with the
/// conversation, the inviter's handle, and the preview message content.
pub async fn list_pending_for_user(
    db: &Database,
    user_id: &str,
) -> Result<Vec<PendingInvitation>, ParleyError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<PendingInvitation>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT p.id, p.conversation_id, c.slug, c.name, u.handle, m.content, p.created_at
                 FROM participants p
                 JOIN conversations c ON c.id = p.conversation_id
                 LEFT JOIN users u ON u.id = p.inviter_id
                 LEFT JOIN messages m ON m.id = p.preview_message_id
                 WHERE p.user_id = ?1 AND p.status = 'invited'
                 ORDER BY p.created_at DESC, p.id DESC",
            )?;
            let rows = stmt.query_map(params![user_id], |row| {
                Ok(PendingInvitation {
                    participant_id: row.get(0)?,
                    conversation_id: row.get(1)?,
                    conversation_slug: row.get(2)?,
                    conversation_name: row.get(3)?,
                    inviter_handle: row.get(4)?,
                    preview: row.get(5)?,
                    invited_at: row.get(6)?,
                })
            })?;
            let mut invitations = Vec::new();
            for row in rows {
                invitations.push(row?);
            }
            Ok(invitations)
        })
        .await
        .map_err(map_tr_err)
}
