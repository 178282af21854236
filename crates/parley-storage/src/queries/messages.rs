// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message operations.
//!
//! Messages are append-only and ordered by `(created_at, id)`; IDs are
//! UUIDv7 so the secondary key follows generation order on timestamp ties.

use parley_core::ParleyError;
use rusqlite::params;
use serde::{Deserialize, Serialize};

use crate::database::{map_tr_err, Database};
use crate::models::Message;

fn row_to_message(row: &rusqlite::Row<'_>) -> Result<Message, rusqlite::Error> {
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        sender_id: row.get(2)?,
        content: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Insert a message inside an existing transaction (or bare connection).
pub(crate) fn insert_message_stmt(
    conn: &rusqlite::Connection,
    msg: &Message,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO messages (id, conversation_id, sender_id, content, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            msg.id,
            msg.conversation_id,
            msg.sender_id,
            msg.content,
            msg.created_at,
        ],
    )?;
    Ok(())
}

/// Append a message and advance the owning conversation's
/// `last_activity_at` in one transaction.
pub async fn append_with_activity(db: &Database, msg: &Message) -> Result<(), ParleyError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            insert_message_stmt(&tx, &msg)?;
            tx.execute(
                "UPDATE conversations SET last_activity_at = ?1 WHERE id = ?2",
                params![msg.created_at, msg.conversation_id],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// List a conversation's messages in ascending creation order, optionally
/// bounded to those created strictly after `after`.
pub async fn list_since(
    db: &Database,
    conversation_id: &str,
    after: Option<&str>,
) -> Result<Vec<Message>, ParleyError> {
    let conversation_id = conversation_id.to_string();
    let after = after.map(|s| s.to_string());
    db.connection()
        .call(move |conn| -> Result<Vec<Message>, rusqlite::Error> {
            let mut messages = Vec::new();
            match &after {
                Some(after) => {
                    let mut stmt = conn.prepare(
                        "SELECT id, conversation_id, sender_id, content, created_at
                         FROM messages WHERE conversation_id = ?1 AND created_at > ?2
                         ORDER BY created_at ASC, id ASC",
                    )?;
                    let rows = stmt.query_map(params![conversation_id, after], row_to_message)?;
                    for row in rows {
                        messages.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT id, conversation_id, sender_id, content, created_at
                         FROM messages WHERE conversation_id = ?1
                         ORDER BY created_at ASC, id ASC",
                    )?;
                    let rows = stmt.query_map(params![conversation_id], row_to_message)?;
                    for row in rows {
                        messages.push(row?);
                    }
                }
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

/// The most recent `limit` messages, returned in ascending order for
/// display.
pub async fn list_recent(
    db: &Database,
    conversation_id: &str,
    limit: i64,
) -> Result<Vec<Message>, ParleyError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<Message>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, sender_id, content, created_at
                 FROM messages WHERE conversation_id = ?1
                 ORDER BY created_at DESC, id DESC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![conversation_id, limit], row_to_message)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            messages.reverse();
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

/// Snapshot of a conversation's message feed used to build the freshness
/// validator: newest creation time (if any) and total count, read in a
/// single query so the pair is always consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedStats {
    pub last_created_at: Option<String>,
    pub message_count: i64,
}

/// Compute [`FeedStats`] for one conversation.
pub async fn feed_stats(db: &Database, conversation_id: &str) -> Result<FeedStats, ParleyError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| -> Result<FeedStats, rusqlite::Error> {
            let stats = conn.query_row(
                "SELECT MAX(created_at), COUNT(*) FROM messages WHERE conversation_id = ?1",
                params![conversation_id],
                |row| {
                    Ok(FeedStats {
                        last_created_at: row.get(0)?,
                        message_count: row.get(1)?,
                    })
                },
            )?;
            Ok(stats)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Conversation, Participant, User};
    use crate::queries::{conversations, users};
    use parley_config::StorageConfig;
    use parley_core::ParticipantStatus;
    use tempfile::tempdir;

    async fn setup_db_with_conversation() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let config = StorageConfig {
            database_path: dir.path().join("test.db").to_str().unwrap().to_string(),
            wal_mode: true,
        };
        let db = Database::open(&config).await.unwrap();

        for (id, handle) in [("u-alice", "alice"), ("u-bob", "bob")] {
            users::create_user(
                &db,
                &User {
                    id: id.to_string(),
                    handle: handle.to_string(),
                    online: true,
                    last_seen_at: "2026-01-01T00:00:00.000Z".to_string(),
                },
            )
            .await
            .unwrap();
        }

        let now = "2026-01-01T10:00:00.000Z".to_string();
        conversations::create_with_first_message(
            &db,
            &Conversation {
                id: "c1".to_string(),
                slug: "softmeadow".to_string(),
                name: None,
                creator_id: "u-alice".to_string(),
                last_activity_at: Some(now.clone()),
                deleted_at: None,
                created_at: now.clone(),
            },
            &Message {
                id: "m0".to_string(),
                conversation_id: "c1".to_string(),
                sender_id: "u-alice".to_string(),
                content: "hi".to_string(),
                created_at: now.clone(),
            },
            &Participant {
                id: "p-alice".to_string(),
                user_id: "u-alice".to_string(),
                conversation_id: "c1".to_string(),
                status: ParticipantStatus::Joined,
                inviter_id: None,
                preview_message_id: None,
                created_at: now.clone(),
                updated_at: now.clone(),
                joined_at: Some(now.clone()),
            },
            &Participant {
                id: "p-bob".to_string(),
                user_id: "u-bob".to_string(),
                conversation_id: "c1".to_string(),
                status: ParticipantStatus::Invited,
                inviter_id: Some("u-alice".to_string()),
                preview_message_id: Some("m0".to_string()),
                created_at: now.clone(),
                updated_at: now,
                joined_at: None,
            },
        )
        .await
        .unwrap();
        (db, dir)
    }

    fn make_msg(id: &str, content: &str, timestamp: &str) -> Message {
        Message {
            id: id.to_string(),
            conversation_id: "c1".to_string(),
            sender_id: "u-alice".to_string(),
            content: content.to_string(),
            created_at: timestamp.to_string(),
        }
    }

    #[tokio::test]
    async fn append_advances_conversation_activity() {
        let (db, _dir) = setup_db_with_conversation().await;

        append_with_activity(&db, &make_msg("m1", "later", "2026-01-01T11:00:00.000Z"))
            .await
            .unwrap();

        let conversation = conversations::get(&db, "c1").await.unwrap().unwrap();
        assert_eq!(
            conversation.last_activity_at.as_deref(),
            Some("2026-01-01T11:00:00.000Z")
        );
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_since_is_strictly_exclusive_and_ordered() {
        let (db, _dir) = setup_db_with_conversation().await;

        append_with_activity(&db, &make_msg("m1", "one", "2026-01-01T11:00:00.000Z"))
            .await
            .unwrap();
        append_with_activity(&db, &make_msg("m2", "two", "2026-01-01T11:00:00.500Z"))
            .await
            .unwrap();
        append_with_activity(&db, &make_msg("m3", "three", "2026-01-01T11:00:01.000Z"))
            .await
            .unwrap();

        // The boundary message itself is excluded.
        let msgs = list_since(&db, "c1", Some("2026-01-01T11:00:00.000Z"))
            .await
            .unwrap();
        assert_eq!(
            msgs.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
            vec!["m2", "m3"]
        );

        // No bound returns everything ascending.
        let all = list_since(&db, "c1", None).await.unwrap();
        assert_eq!(
            all.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
            vec!["m0", "m1", "m2", "m3"]
        );
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn same_timestamp_messages_order_by_id() {
        let (db, _dir) = setup_db_with_conversation().await;

        // Same millisecond; UUIDv7-style IDs would be monotonic, here the
        // lexicographic stand-ins are enough.
        append_with_activity(&db, &make_msg("ma", "first", "2026-01-01T11:00:00.000Z"))
            .await
            .unwrap();
        append_with_activity(&db, &make_msg("mb", "second", "2026-01-01T11:00:00.000Z"))
            .await
            .unwrap();

        let msgs = list_since(&db, "c1", Some("2026-01-01T10:00:00.000Z"))
            .await
            .unwrap();
        assert_eq!(
            msgs.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
            vec!["ma", "mb"]
        );
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_recent_returns_trailing_page_ascending() {
        let (db, _dir) = setup_db_with_conversation().await;

        for i in 1..=5 {
            append_with_activity(
                &db,
                &make_msg(
                    &format!("m{i}"),
                    &format!("msg {i}"),
                    &format!("2026-01-01T11:00:0{i}.000Z"),
                ),
            )
            .await
            .unwrap();
        }

        let page = list_recent(&db, "c1", 3).await.unwrap();
        assert_eq!(
            page.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
            vec!["m3", "m4", "m5"]
        );
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn feed_stats_tracks_latest_and_count() {
        let (db, _dir) = setup_db_with_conversation().await;

        let stats = feed_stats(&db, "c1").await.unwrap();
        assert_eq!(stats.message_count, 1);
        assert_eq!(
            stats.last_created_at.as_deref(),
            Some("2026-01-01T10:00:00.000Z")
        );

        append_with_activity(&db, &make_msg("m1", "one", "2026-01-01T11:00:00.000Z"))
            .await
            .unwrap();
        let stats = feed_stats(&db, "c1").await.unwrap();
        assert_eq!(stats.message_count, 2);
        assert_eq!(
            stats.last_created_at.as_deref(),
            Some("2026-01-01T11:00:00.000Z")
        );

        // A conversation with no messages reports an empty snapshot.
        let empty = feed_stats(&db, "c-none").await.unwrap();
        assert_eq!(empty.message_count, 0);
        assert!(empty.last_created_at.is_none());
        db.close().await.unwrap();
    }
}
