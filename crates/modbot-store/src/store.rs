//! The record store facade.
//!
//! [`RecordStore`] owns the database handle and one store per record family.
//! Construct it once at startup and hand clones to command handlers.

use std::path::Path;

use tracing::{info, instrument};

use crate::db::{Database, DatabaseOptions};
use crate::error::StoreResult;
use crate::mod_config::ModConfigStore;
use crate::schema;
use crate::thread_followers::ThreadFollowerStore;
use crate::tickets::TicketStore;
use crate::upvotes::UpvoteStore;
use crate::warnings::WarningStore;

/// Entry point to every record family, sharing one connection.
#[derive(Clone)]
pub struct RecordStore {
    db: Database,
    warnings: WarningStore,
    mod_config: ModConfigStore,
    upvotes: UpvoteStore,
    thread_followers: ThreadFollowerStore,
    tickets: TicketStore,
}

impl RecordStore {
    /// Open (or create) the store at `path` and ensure the schema exists.
    pub async fn open(
        path: impl AsRef<Path> + Send + 'static,
        options: DatabaseOptions,
    ) -> StoreResult<Self> {
        let db = Database::open_and_init(path, options).await?;
        info!("record store ready");
        Ok(Self::from_database(db))
    }

    /// Open an in-memory store with the schema applied, for tests.
    pub async fn open_in_memory() -> StoreResult<Self> {
        let db = Database::open_in_memory()?;
        db.init_schema().await?;
        Ok(Self::from_database(db))
    }

    /// Wrap an already initialized database.
    pub fn from_database(db: Database) -> Self {
        Self {
            warnings: WarningStore::new(db.clone()),
            mod_config: ModConfigStore::new(db.clone()),
            upvotes: UpvoteStore::new(db.clone()),
            thread_followers: ThreadFollowerStore::new(db.clone()),
            tickets: TicketStore::new(db.clone()),
            db,
        }
    }

    /// Warnings and the moderation action log.
    pub fn warnings(&self) -> &WarningStore {
        &self.warnings
    }

    /// Per-guild moderation settings.
    pub fn mod_config(&self) -> &ModConfigStore {
        &self.mod_config
    }

    /// Showcase upvotes.
    pub fn upvotes(&self) -> &UpvoteStore {
        &self.upvotes
    }

    /// Thread subscriptions.
    pub fn thread_followers(&self) -> &ThreadFollowerStore {
        &self.thread_followers
    }

    /// Support tickets and participants.
    pub fn tickets(&self) -> &TicketStore {
        &self.tickets
    }

    /// The underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Row count of every record table, in [`schema::TABLES`] order.
    #[instrument(skip(self))]
    pub async fn table_counts(&self) -> StoreResult<Vec<(&'static str, i64)>> {
        self.db
            .execute(|conn| {
                schema::TABLES
                    .iter()
                    .map(|&table| -> StoreResult<(&'static str, i64)> {
                        // Table names come from a fixed list, never from input.
                        let count: i64 = conn.query_row(
                            &format!("SELECT COUNT(*) FROM {table}"),
                            [],
                            |row| row.get(0),
                        )?;
                        Ok((table, count))
                    })
                    .collect()
            })
            .await
    }
}

// ── tests ────────────────────────────────────────────────────────────
