//! Showcase upvotes.
//!
//! The table has no uniqueness constraint on `(user_id, showcase_id)`.
//! Callers enforce one upvote per user per showcase by checking
//! [`UpvoteStore::has_user_upvoted`] before calling
//! [`UpvoteStore::log_upvote`].

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::db::Database;
use crate::error::{StoreError, StoreResult};

/// Size of the leaderboard returned by [`UpvoteStore::get_top_5_showcases`].
pub const TOP_SHOWCASES: i64 = 5;

/// A showcase and its upvote count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowcaseScore {
    pub showcase_id: i64,
    pub upvote_count: i64,
}

/// Upvote bookkeeping and leaderboard queries.
#[derive(Clone)]
pub struct UpvoteStore {
    db: Database,
}

impl UpvoteStore {
    /// Create a new upvote store backed by `db`.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Record an upvote. Does not check for an existing one.
    #[instrument(skip(self))]
    pub async fn log_upvote(&self, user_id: i64, showcase_id: i64) -> StoreResult<()> {
        self.db
            .execute(move |conn| {
                conn.execute(
                    "INSERT INTO upvotes (user_id, showcase_id) VALUES (?1, ?2)",
                    rusqlite::params![user_id, showcase_id],
                )?;
                debug!(user_id, showcase_id, "upvote recorded");
                Ok(())
            })
            .await
    }

    /// Total upvotes for a showcase.
    #[instrument(skip(self))]
    pub async fn get_upvotes(&self, showcase_id: i64) -> StoreResult<i64> {
        self.db
            .execute(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM upvotes WHERE showcase_id = ?1",
                    rusqlite::params![showcase_id],
                    |row| row.get(0),
                )?;
                Ok(count)
            })
            .await
    }

    /// Whether `user_id` has upvoted `showcase_id`.
    #[instrument(skip(self))]
    pub async fn has_user_upvoted(&self, user_id: i64, showcase_id: i64) -> StoreResult<bool> {
        self.db
            .execute(move |conn| {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM upvotes WHERE user_id = ?1 AND showcase_id = ?2)",
                    rusqlite::params![user_id, showcase_id],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
    }

    /// Remove a user's upvote(s) from a showcase, returning `true` if any
    /// row was deleted.
    #[instrument(skip(self))]
    pub async fn remove_upvote(&self, user_id: i64, showcase_id: i64) -> StoreResult<bool> {
        self.db
            .execute(move |conn| {
                let deleted = conn.execute(
                    "DELETE FROM upvotes WHERE user_id = ?1 AND showcase_id = ?2",
                    rusqlite::params![user_id, showcase_id],
                )?;
                Ok(deleted > 0)
            })
            .await
    }

    /// The five most upvoted showcases.
    pub async fn get_top_5_showcases(&self) -> StoreResult<Vec<ShowcaseScore>> {
        self.top_showcases(TOP_SHOWCASES).await
    }

    /// The `limit` most upvoted showcases, by descending count.
    ///
    /// Equal counts are ordered by ascending showcase id. A negative `limit`
    /// is rejected with [`StoreError::InvalidArgument`].
    #[instrument(skip(self))]
    pub async fn top_showcases(&self, limit: i64) -> StoreResult<Vec<ShowcaseScore>> {
        if limit < 0 {
            return Err(StoreError::InvalidArgument(format!(
                "showcase limit must not be negative, got {limit}"
            )));
        }
        self.db
            .execute(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT showcase_id, COUNT(*) AS upvote_count FROM upvotes \
                     GROUP BY showcase_id \
                     ORDER BY upvote_count DESC, showcase_id ASC \
                     LIMIT ?1",
                )?;
                let rows = stmt
                    .query_map(rusqlite::params![limit], |row| {
                        Ok(ShowcaseScore {
                            showcase_id: row.get(0)?,
                            upvote_count: row.get(1)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
    }
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_store() -> UpvoteStore {
        let db = Database::open_in_memory().unwrap();
        db.init_schema().await.unwrap();
        UpvoteStore::new(db)
    }

    async fn upvote_n(store: &UpvoteStore, showcase_id: i64, n: i64) {
        for user in 0..n {
            store.log_upvote(1000 + user, showcase_id).await.unwrap();
        }
    }

    #[tokio::test]
    async fn count_and_membership() {
        let store = setup_store().await;

        assert_eq!(store.get_upvotes(10).await.unwrap(), 0);
        assert!(!store.has_user_upvoted(1, 10).await.unwrap());

        store.log_upvote(1, 10).await.unwrap();
        store.log_upvote(2, 10).await.unwrap();

        assert_eq!(store.get_upvotes(10).await.unwrap(), 2);
        assert!(store.has_user_upvoted(1, 10).await.unwrap());
        assert!(!store.has_user_upvoted(1, 11).await.unwrap());
    }

    #[tokio::test]
    async fn duplicates_are_not_rejected() {
        let store = setup_store().await;

        store.log_upvote(1, 10).await.unwrap();
        store.log_upvote(1, 10).await.unwrap();
        assert_eq!(store.get_upvotes(10).await.unwrap(), 2);

        // Removal clears every matching row.
        assert!(store.remove_upvote(1, 10).await.unwrap());
        assert_eq!(store.get_upvotes(10).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn remove_missing_upvote_returns_false() {
        let store = setup_store().await;
        assert!(!store.remove_upvote(1, 10).await.unwrap());
    }

    #[tokio::test]
    async fn top_showcases_ranking_and_tie_break() {
        let store = setup_store().await;

        // A=40:5, B=30:3, C=20:3, D=10:1
        upvote_n(&store, 40, 5).await;
        upvote_n(&store, 30, 3).await;
        upvote_n(&store, 20, 3).await;
        upvote_n(&store, 10, 1).await;

        let top = store.get_top_5_showcases().await.unwrap();
        let got: Vec<(i64, i64)> = top.iter().map(|s| (s.showcase_id, s.upvote_count)).collect();
        assert_eq!(got, vec![(40, 5), (20, 3), (30, 3), (10, 1)]);
    }

    #[tokio::test]
    async fn top_showcases_capped_at_five() {
        let store = setup_store().await;

        for showcase in 1..=10 {
            upvote_n(&store, showcase, showcase).await;
        }

        let top = store.get_top_5_showcases().await.unwrap();
        assert_eq!(top.len(), 5);
        assert_eq!(top[0].showcase_id, 10);
        assert_eq!(top[4].showcase_id, 6);
    }

    #[tokio::test]
    async fn top_showcases_empty() {
        let store = setup_store().await;
        assert!(store.get_top_5_showcases().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn negative_showcase_limit_is_rejected() {
        let store = setup_store().await;
        upvote_n(&store, 10, 2).await;

        let result = store.top_showcases(-1).await;
        assert!(matches!(result, Err(StoreError::InvalidArgument(_))));
        assert!(store.top_showcases(0).await.unwrap().is_empty());
    }
}
