//! User and session operations for [`SqliteStore`].

use chrono::{Duration, Utc};
use rusqlite::{OptionalExtension, Row, params};
use tracing::{debug, info};

use tracker_core::idgen::{generate_session_token, generate_user_id, hash_session_token};
use tracker_core::user::{IssuedSession, NewUser, Session, User};

use crate::error::{Result, StorageError, is_unique_violation};
use crate::sqlite::issues::{datetime_column, format_datetime};
use crate::sqlite::store::SqliteStore;

/// Attempts at finding a free user id before giving up.
const MAX_ID_ATTEMPTS: u32 = 8;

fn scan_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        image: row.get("image")?,
    })
}

/// Reads the aliased assignee columns of a `LEFT JOIN users`. `None` when the
/// issue has no assignee.
pub(crate) fn scan_assignee(row: &Row<'_>) -> rusqlite::Result<Option<User>> {
    let id: Option<String> = row.get("assignee_id")?;
    match id {
        Some(id) => Ok(Some(User {
            id,
            name: row.get("assignee_name")?,
            email: row.get("assignee_email")?,
            image: row.get("assignee_image")?,
        })),
        None => Ok(None),
    }
}

impl SqliteStore {
    pub fn list_users_impl(&self) -> Result<Vec<User>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare("SELECT id, name, email, image FROM users ORDER BY name, id")?;
        let rows = stmt.query_map([], scan_user)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn get_user_impl(&self, id: &str) -> Result<User> {
        let conn = self.lock_conn()?;
        conn.query_row(
            "SELECT id, name, email, image FROM users WHERE id = ?1",
            params![id],
            scan_user,
        )
        .optional()?
        .ok_or_else(|| StorageError::not_found("user", id))
    }

    pub fn create_user_impl(&self, user: &NewUser) -> Result<User> {
        let conn = self.lock_conn()?;
        let now = Utc::now();

        for nonce in 0..MAX_ID_ATTEMPTS {
            let id = generate_user_id(&user.name, &user.email, now, nonce);
            let taken: bool = conn.query_row(
                "SELECT COUNT(*) FROM users WHERE id = ?1",
                params![id],
                |row| row.get::<_, i64>(0),
            )? > 0;
            if taken {
                debug!(%id, nonce, "user id collision, retrying");
                continue;
            }

            conn.execute(
                "INSERT INTO users (id, name, email, image) VALUES (?1, ?2, ?3, ?4)",
                params![id, user.name, user.email, user.image],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StorageError::conflict(format!("email {} is already registered", user.email))
                } else {
                    StorageError::Query(e)
                }
            })?;
            info!(%id, email = %user.email, "user created");

            return Ok(User {
                id,
                name: user.name.clone(),
                email: user.email.clone(),
                image: user.image.clone(),
            });
        }

        Err(StorageError::Internal(format!(
            "could not allocate a user id after {MAX_ID_ATTEMPTS} attempts"
        )))
    }

    // -- Sessions ------------------------------------------------------------

    /// Issues a new session for `user_id`. Only the token's hash is stored.
    pub fn create_session_impl(&self, user_id: &str, ttl: Duration) -> Result<IssuedSession> {
        let conn = self.lock_conn()?;
        let exists: bool = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE id = ?1",
            params![user_id],
            |row| row.get::<_, i64>(0),
        )? > 0;
        if !exists {
            return Err(StorageError::not_found("user", user_id));
        }

        let token = generate_session_token();
        let expires_at = Utc::now() + ttl;
        conn.execute(
            "INSERT INTO sessions (token_hash, user_id, expires_at) VALUES (?1, ?2, ?3)",
            params![hash_session_token(&token), user_id, format_datetime(&expires_at)],
        )?;
        info!(user_id, %expires_at, "session issued");

        Ok(IssuedSession {
            token,
            user_id: user_id.to_string(),
            expires_at,
        })
    }

    /// Looks up a session by its plain token. Expiry is left to the caller.
    pub fn get_session_impl(&self, token: &str) -> Result<Option<Session>> {
        let conn = self.lock_conn()?;
        let session = conn
            .query_row(
                "SELECT user_id, expires_at FROM sessions WHERE token_hash = ?1",
                params![hash_session_token(token)],
                |row| {
                    Ok(Session {
                        user_id: row.get("user_id")?,
                        expires_at: datetime_column(row, "expires_at")?,
                    })
                },
            )
            .optional()?;
        Ok(session)
    }

    /// Removes sessions whose expiry has passed. Returns how many were removed.
    pub fn purge_expired_sessions_impl(&self) -> Result<usize> {
        let conn = self.lock_conn()?;
        let removed = conn.execute(
            "DELETE FROM sessions WHERE expires_at <= ?1",
            params![format_datetime(&Utc::now())],
        )?;
        if removed > 0 {
            debug!(removed, "purged expired sessions");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store_with_user(name: &str, email: &str) -> (SqliteStore, User) {
        let store = SqliteStore::open_in_memory().unwrap();
        let user = store
            .create_user_impl(&NewUser {
                name: name.into(),
                email: email.into(),
                image: None,
            })
            .unwrap();
        (store, user)
    }

    #[test]
    fn create_and_get_user() {
        let (store, user) = store_with_user("Ada", "ada@example.com");
        assert!(user.id.starts_with("u-"));
        assert_eq!(store.get_user_impl(&user.id).unwrap(), user);
        assert!(store.get_user_impl("u-missing").unwrap_err().is_not_found());
    }

    #[test]
    fn duplicate_email_is_conflict() {
        let (store, _) = store_with_user("Ada", "ada@example.com");
        let err = store
            .create_user_impl(&NewUser {
                name: "Other".into(),
                email: "ada@example.com".into(),
                image: None,
            })
            .unwrap_err();
        assert!(err.is_conflict(), "{err}");
    }

    #[test]
    fn users_ordered_by_name() {
        let (store, _) = store_with_user("Zed", "zed@example.com");
        for (name, email) in [("Ada", "ada@example.com"), ("Mo", "mo@example.com")] {
            store
                .create_user_impl(&NewUser {
                    name: name.into(),
                    email: email.into(),
                    image: Some("https://example.com/a.png".into()),
                })
                .unwrap();
        }
        let names: Vec<String> = store
            .list_users_impl()
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["Ada", "Mo", "Zed"]);
    }

    #[test]
    fn session_round_trip() {
        let (store, user) = store_with_user("Ada", "ada@example.com");
        let issued = store.create_session_impl(&user.id, Duration::hours(1)).unwrap();

        let session = store.get_session_impl(&issued.token).unwrap().unwrap();
        assert_eq!(session.user_id, user.id);
        assert!(!session.is_expired(Utc::now()));
        assert_eq!(store.get_session_impl("not-a-token").unwrap(), None);
    }

    #[test]
    fn session_for_unknown_user() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store
            .create_session_impl("u-nobody", Duration::hours(1))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn purge_removes_expired() {
        let (store, user) = store_with_user("Ada", "ada@example.com");
        let expired = store
            .create_session_impl(&user.id, Duration::seconds(-5))
            .unwrap();
        let live = store.create_session_impl(&user.id, Duration::hours(1)).unwrap();

        assert_eq!(store.purge_expired_sessions_impl().unwrap(), 1);
        assert_eq!(store.get_session_impl(&expired.token).unwrap(), None);
        assert!(store.get_session_impl(&live.token).unwrap().is_some());
    }
}
