// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User directory operations.
//!
//! The directory is owned by the external presence subsystem; the core reads
//! it at decision points and refreshes `last_seen_at` as a side effect of
//! participation. `set_online` exists for that subsystem (and for tests).

use parley_core::ParleyError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::models::User;

fn row_to_user(row: &rusqlite::Row<'_>) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        handle: row.get(1)?,
        online: row.get(2)?,
        last_seen_at: row.get(3)?,
    })
}

/// Insert a new user record.
pub async fn create_user(db: &Database, user: &User) -> Result<(), ParleyError> {
    let user = user.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO users (id, handle, online, last_seen_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user.id, user.handle, user.online, user.last_seen_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Look a user up by their unique handle.
pub async fn find_by_handle(db: &Database, handle: &str) -> Result<Option<User>, ParleyError> {
    let handle = handle.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<User>, rusqlite::Error> {
            let result = conn.query_row(
                "SELECT id, handle, online, last_seen_at FROM users WHERE handle = ?1",
                params![handle],
                row_to_user,
            );
            match result {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Flip the online flag. Presence-subsystem surface.
pub async fn set_online(db: &Database, id: &str, online: bool) -> Result<(), ParleyError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE users SET online = ?1 WHERE id = ?2",
                params![online, id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Refresh a user's last-seen timestamp.
pub async fn touch_last_seen(db: &Database, id: &str, at: &str) -> Result<(), ParleyError> {
    let id = id.to_string();
    let at = at.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE users SET last_seen_at = ?1 WHERE id = ?2",
                params![at, id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_config::StorageConfig;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let config = StorageConfig {
            database_path: dir.path().join("test.db").to_str().unwrap().to_string(),
            wal_mode: true,
        };
        let db = Database::open(&config).await.unwrap();
        (db, dir)
    }

    fn make_user(id: &str, handle: &str) -> User {
        User {
            id: id.to_string(),
            handle: handle.to_string(),
            online: true,
            last_seen_at: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn create_and_find_by_handle() {
        let (db, _dir) = setup_db().await;
        create_user(&db, &make_user("u1", "alice")).await.unwrap();

        let found = find_by_handle(&db, "alice").await.unwrap().unwrap();
        assert_eq!(found.id, "u1");
        assert!(found.online);

        assert!(find_by_handle(&db, "nobody").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_handle_is_rejected() {
        let (db, _dir) = setup_db().await;
        create_user(&db, &make_user("u1", "alice")).await.unwrap();
        let result = create_user(&db, &make_user("u2", "alice")).await;
        assert!(result.is_err());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn set_online_flips_flag() {
        let (db, _dir) = setup_db().await;
        create_user(&db, &make_user("u1", "alice")).await.unwrap();

        set_online(&db, "u1", false).await.unwrap();
        let user = find_by_handle(&db, "alice").await.unwrap().unwrap();
        assert!(!user.online);

        set_online(&db, "u1", true).await.unwrap();
        let user = find_by_handle(&db, "alice").await.unwrap().unwrap();
        assert!(user.online);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn touch_last_seen_updates_timestamp() {
        let (db, _dir) = setup_db().await;
        create_user(&db, &make_user("u1", "alice")).await.unwrap();

        touch_last_seen(&db, "u1", "2026-01-02T09:30:00.000Z")
            .await
            .unwrap();
        let user = find_by_handle(&db, "alice").await.unwrap().unwrap();
        assert_eq!(user.last_seen_at, "2026-01-02T09:30:00.000Z");
        db.close().await.unwrap();
    }
}
