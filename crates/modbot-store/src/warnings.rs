//! Member warnings and the moderation action log.
//!
//! Both tables are append-only audit trails. Warnings can additionally be
//! removed one at a time or cleared for a guild member; moderation actions
//! are never mutated.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::db::{Database, utc_timestamp};
use crate::error::StoreResult;

/// Number of actions returned by [`WarningStore::get_user_history`].
pub const USER_HISTORY_LIMIT: i64 = 50;

// ═══════════════════════════════════════════════════════════════════════
//  Types
// ═══════════════════════════════════════════════════════════════════════

/// A warning issued to a guild member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub id: i64,
    pub guild_id: i64,
    pub user_id: i64,
    pub moderator_id: i64,
    /// Free text; may be empty.
    pub reason: String,
    /// UTC ISO-8601 timestamp.
    pub timestamp: String,
}

/// One entry of the moderation audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModAction {
    pub id: i64,
    pub guild_id: i64,
    /// Caller-assigned tag such as `ban`, `kick` or `mute`.
    pub action_type: String,
    pub user_id: i64,
    pub moderator_id: i64,
    pub reason: Option<String>,
    /// Duration in seconds, for timed actions.
    pub duration: Option<i64>,
    pub timestamp: String,
}

// ═══════════════════════════════════════════════════════════════════════
//  WarningStore
// ═══════════════════════════════════════════════════════════════════════

/// Warnings and moderation log operations.
#[derive(Clone)]
pub struct WarningStore {
    db: Database,
}

impl WarningStore {
    /// Create a new warning store backed by `db`.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Record a warning and return its generated id.
    #[instrument(skip(self, reason))]
    pub async fn add_warning(
        &self,
        guild_id: i64,
        user_id: i64,
        moderator_id: i64,
        reason: &str,
    ) -> StoreResult<i64> {
        let reason = reason.to_string();
        let now = utc_timestamp();

        self.db
            .execute(move |conn| {
                conn.execute(
                    "INSERT INTO warnings (guild_id, user_id, moderator_id, reason, timestamp) \
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    rusqlite::params![guild_id, user_id, moderator_id, reason, now],
                )?;
                let id = conn.last_insert_rowid();
                debug!(warning_id = id, guild_id, user_id, "warning added");
                Ok(id)
            })
            .await
    }

    /// All warnings for a guild member, newest first.
    #[instrument(skip(self))]
    pub async fn get_warnings(&self, guild_id: i64, user_id: i64) -> StoreResult<Vec<Warning>> {
        self.db
            .execute(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, guild_id, user_id, moderator_id, reason, timestamp \
                     FROM warnings WHERE guild_id = ?1 AND user_id = ?2 \
                     ORDER BY timestamp DESC, id DESC",
                )?;
                let rows = stmt
                    .query_map(rusqlite::params![guild_id, user_id], |row| {
                        Ok(Warning {
                            id: row.get(0)?,
                            guild_id: row.get(1)?,
                            user_id: row.get(2)?,
                            moderator_id: row.get(3)?,
                            reason: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                            timestamp: row.get(5)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
    }

    /// Number of warnings on record for a guild member.
    #[instrument(skip(self))]
    pub async fn count_warnings(&self, guild_id: i64, user_id: i64) -> StoreResult<i64> {
        self.db
            .execute(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM warnings WHERE guild_id = ?1 AND user_id = ?2",
                    rusqlite::params![guild_id, user_id],
                    |row| row.get(0),
                )?;
                Ok(count)
            })
            .await
    }

    /// Delete one warning, returning `true` if it existed.
    #[instrument(skip(self))]
    pub async fn remove_warning(&self, warning_id: i64) -> StoreResult<bool> {
        self.db
            .execute(move |conn| {
                let deleted = conn.execute(
                    "DELETE FROM warnings WHERE id = ?1",
                    rusqlite::params![warning_id],
                )?;
                Ok(deleted > 0)
            })
            .await
    }

    /// Delete every warning for a guild member and return how many were removed.
    #[instrument(skip(self))]
    pub async fn clear_warnings(&self, guild_id: i64, user_id: i64) -> StoreResult<usize> {
        self.db
            .execute(move |conn| {
                let deleted = conn.execute(
                    "DELETE FROM warnings WHERE guild_id = ?1 AND user_id = ?2",
                    rusqlite::params![guild_id, user_id],
                )?;
                debug!(guild_id, user_id, deleted, "warnings cleared");
                Ok(deleted)
            })
            .await
    }

    /// Append an entry to the moderation log.
    #[instrument(skip(self, reason))]
    pub async fn log_action(
        &self,
        guild_id: i64,
        action_type: &str,
        user_id: i64,
        moderator_id: i64,
        reason: Option<&str>,
        duration: Option<i64>,
    ) -> StoreResult<()> {
        let action_type = action_type.to_string();
        let reason = reason.map(|s| s.to_string());
        let now = utc_timestamp();

        self.db
            .execute(move |conn| {
                conn.execute(
                    "INSERT INTO mod_actions \
                     (guild_id, action_type, user_id, moderator_id, reason, duration, timestamp) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    rusqlite::params![
                        guild_id,
                        action_type,
                        user_id,
                        moderator_id,
                        reason,
                        duration,
                        now
                    ],
                )?;
                debug!(guild_id, user_id, action = %action_type, "mod action logged");
                Ok(())
            })
            .await
    }

    /// The most recent [`USER_HISTORY_LIMIT`] moderation actions against a
    /// guild member, newest first.
    #[instrument(skip(self))]
    pub async fn get_user_history(
        &self,
        guild_id: i64,
        user_id: i64,
    ) -> StoreResult<Vec<ModAction>> {
        self.db
            .execute(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, guild_id, action_type, user_id, moderator_id, reason, duration, timestamp \
                     FROM mod_actions WHERE guild_id = ?1 AND user_id = ?2 \
                     ORDER BY timestamp DESC, id DESC LIMIT ?3",
                )?;
                let rows = stmt
                    .query_map(
                        rusqlite::params![guild_id, user_id, USER_HISTORY_LIMIT],
                        |row| {
                            Ok(ModAction {
                                id: row.get(0)?,
                                guild_id: row.get(1)?,
                                action_type: row.get(2)?,
                                user_id: row.get(3)?,
                                moderator_id: row.get(4)?,
                                reason: row.get(5)?,
                                duration: row.get(6)?,
                                timestamp: row.get(7)?,
                            })
                        },
                    )?
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

    async fn setup_store() -> WarningStore {
        let db = Database::open_in_memory().unwrap();
        db.init_schema().await.unwrap();
        WarningStore::new(db)
    }

    #[tokio::test]
    async fn add_get_remove_round() {
        let store = setup_store().await;

        let id = store.add_warning(1, 2, 3, "spam").await.unwrap();
        assert_eq!(id, 1);

        let warnings = store.get_warnings(1, 2).await.unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].reason, "spam");
        assert_eq!(warnings[0].moderator_id, 3);

        assert!(store.remove_warning(id).await.unwrap());
        assert!(store.get_warnings(1, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_missing_warning_returns_false() {
        let store = setup_store().await;
        assert!(!store.remove_warning(42).await.unwrap());
    }

    #[tokio::test]
    async fn warnings_are_newest_first() {
        let store = setup_store().await;

        let mut ids = Vec::new();
        for i in 0..5 {
            ids.push(store.add_warning(1, 2, 3, &format!("w{i}")).await.unwrap());
        }

        let warnings = store.get_warnings(1, 2).await.unwrap();
        assert_eq!(warnings.len(), 5);
        ids.reverse();
        let got: Vec<i64> = warnings.iter().map(|w| w.id).collect();
        assert_eq!(got, ids);
        for pair in warnings.windows(2) {
            assert!(pair[0].timestamp >= pair[1].timestamp);
        }
    }

    #[tokio::test]
    async fn warnings_are_scoped_to_guild_member() {
        let store = setup_store().await;

        store.add_warning(1, 2, 3, "a").await.unwrap();
        store.add_warning(1, 9, 3, "b").await.unwrap();
        store.add_warning(7, 2, 3, "c").await.unwrap();

        let warnings = store.get_warnings(1, 2).await.unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].reason, "a");
        assert_eq!(store.count_warnings(1, 2).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn empty_reason_is_allowed() {
        let store = setup_store().await;
        store.add_warning(1, 2, 3, "").await.unwrap();
        assert_eq!(store.get_warnings(1, 2).await.unwrap()[0].reason, "");
    }

    #[tokio::test]
    async fn clear_warnings_reports_count() {
        let store = setup_store().await;

        for _ in 0..3 {
            store.add_warning(1, 2, 3, "x").await.unwrap();
        }
        store.add_warning(1, 4, 3, "other").await.unwrap();

        assert_eq!(store.clear_warnings(1, 2).await.unwrap(), 3);
        assert!(store.get_warnings(1, 2).await.unwrap().is_empty());
        assert_eq!(store.clear_warnings(1, 2).await.unwrap(), 0);
        assert_eq!(store.get_warnings(1, 4).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn log_action_and_history() {
        let store = setup_store().await;

        store
            .log_action(1, "mute", 2, 3, Some("flooding"), Some(600))
            .await
            .unwrap();
        store.log_action(1, "ban", 2, 3, None, None).await.unwrap();

        let history = store.get_user_history(1, 2).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].action_type, "ban");
        assert!(history[0].reason.is_none());
        assert!(history[0].duration.is_none());
        assert_eq!(history[1].action_type, "mute");
        assert_eq!(history[1].reason.as_deref(), Some("flooding"));
        assert_eq!(history[1].duration, Some(600));
    }

    #[tokio::test]
    async fn history_is_capped() {
        let store = setup_store().await;

        for i in 0..(USER_HISTORY_LIMIT + 5) {
            store
                .log_action(1, "kick", 2, 3, Some(&format!("#{i}")), None)
                .await
                .unwrap();
        }

        let history = store.get_user_history(1, 2).await.unwrap();
        assert_eq!(history.len() as i64, USER_HISTORY_LIMIT);
        let last = format!("#{}", USER_HISTORY_LIMIT + 4);
        assert_eq!(history[0].reason.as_deref(), Some(last.as_str()));
    }

    #[tokio::test]
    async fn history_for_unknown_member_is_empty() {
        let store = setup_store().await;
        assert!(store.get_user_history(5, 6).await.unwrap().is_empty());
    }
}
