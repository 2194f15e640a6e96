//! Per-guild moderation settings.
//!
//! Currently a single setting: the channel that receives moderation log
//! messages. At most one row exists per guild.

use tracing::{debug, instrument};

use crate::db::Database;
use crate::error::StoreResult;

/// Read and upsert per-guild moderation settings.
#[derive(Clone)]
pub struct ModConfigStore {
    db: Database,
}

impl ModConfigStore {
    /// Create a new config store backed by `db`.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Set the moderation log channel for a guild (insert or replace).
    #[instrument(skip(self))]
    pub async fn set_log_channel(&self, guild_id: i64, channel_id: i64) -> StoreResult<()> {
        self.db
            .execute(move |conn| {
                conn.execute(
                    "INSERT INTO mod_config (guild_id, log_channel_id) VALUES (?1, ?2) \
                     ON CONFLICT(guild_id) DO UPDATE SET log_channel_id = excluded.log_channel_id",
                    rusqlite::params![guild_id, channel_id],
                )?;
                debug!(guild_id, channel_id, "log channel updated");
                Ok(())
            })
            .await
    }

    /// Get the moderation log channel for a guild, `None` if unset.
    #[instrument(skip(self))]
    pub async fn get_log_channel(&self, guild_id: i64) -> StoreResult<Option<i64>> {
        self.db
            .execute(move |conn| {
                let result = conn.query_row(
                    "SELECT log_channel_id FROM mod_config WHERE guild_id = ?1",
                    rusqlite::params![guild_id],
                    |row| row.get::<_, Option<i64>>(0),
                );
                match result {
                    Ok(channel) => Ok(channel),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
    }
}

// ── tests ────────────────────────────────────────────────────────────
