//! Thread subscriptions.
//!
//! `(thread_id, user_id)` is the primary key; re-following a thread is
//! reported as `false` rather than an error.

use tracing::{debug, instrument};

use crate::db::Database;
use crate::error::{StoreResult, is_duplicate_key};

/// Follow/unfollow bookkeeping for threads.
#[derive(Clone)]
pub struct ThreadFollowerStore {
    db: Database,
}

impl ThreadFollowerStore {
    /// Create a new follower store backed by `db`.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Add `user_id` as a follower of `thread_id`.
    ///
    /// Returns `true` if added, `false` if the user was already following.
    #[instrument(skip(self))]
    pub async fn add_thread_follower(&self, thread_id: i64, user_id: i64) -> StoreResult<bool> {
        self.db
            .execute(move |conn| {
                match conn.execute(
                    "INSERT INTO thread_followers (thread_id, user_id) VALUES (?1, ?2)",
                    rusqlite::params![thread_id, user_id],
                ) {
                    Ok(_) => {
                        debug!(thread_id, user_id, "thread follower added");
                        Ok(true)
                    }
                    Err(e) if is_duplicate_key(&e) => Ok(false),
                    Err(e) => Err(e.into()),
                }
            })
            .await
    }

    /// Remove `user_id` from the followers of `thread_id`.
    ///
    /// Returns `true` if removed, `false` if the user was not following.
    #[instrument(skip(self))]
    pub async fn remove_thread_follower(&self, thread_id: i64, user_id: i64) -> StoreResult<bool> {
        self.db
            .execute(move |conn| {
                let deleted = conn.execute(
                    "DELETE FROM thread_followers WHERE thread_id = ?1 AND user_id = ?2",
                    rusqlite::params![thread_id, user_id],
                )?;
                Ok(deleted > 0)
            })
            .await
    }

    /// User ids following `thread_id`, ascending.
    #[instrument(skip(self))]
    pub async fn get_thread_followers(&self, thread_id: i64) -> StoreResult<Vec<i64>> {
        self.db
            .execute(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT user_id FROM thread_followers WHERE thread_id = ?1 ORDER BY user_id",
                )?;
                let users = stmt
                    .query_map(rusqlite::params![thread_id], |row| row.get(0))?
                    .collect::<Result<Vec<i64>, _>>()?;
                Ok(users)
            })
            .await
    }

    /// Whether `user_id` follows `thread_id`.
    #[instrument(skip(self))]
    pub async fn is_following_thread(&self, thread_id: i64, user_id: i64) -> StoreResult<bool> {
        self.db
            .execute(move |conn| {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM thread_followers WHERE thread_id = ?1 AND user_id = ?2)",
                    rusqlite::params![thread_id, user_id],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
    }
}

// ── tests ────────────────────────────────────────────────────────────
