//! Schema definition and idempotent initialization.
//!
//! Every statement uses `IF NOT EXISTS`, so [`init`] can run on every process
//! start against a fresh or an existing file. Nothing is ever dropped or
//! altered.

use rusqlite::Connection;
use tracing::{info, warn};

use crate::error::{StoreError, StoreResult};

/// Tables owned by the record store, in creation order.
pub const TABLES: &[&str] = &[
    "warnings",
    "mod_actions",
    "mod_config",
    "upvotes",
    "thread_followers",
    "tickets",
    "ticket_participants",
];

const SCHEMA_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS warnings (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        guild_id     INTEGER NOT NULL,
        user_id      INTEGER NOT NULL,
        moderator_id INTEGER NOT NULL,
        reason       TEXT,
        timestamp    TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_warnings_member ON warnings(guild_id, user_id);

    CREATE TABLE IF NOT EXISTS mod_actions (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        guild_id     INTEGER NOT NULL,
        action_type  TEXT NOT NULL,
        user_id      INTEGER NOT NULL,
        moderator_id INTEGER NOT NULL,
        reason       TEXT,
        duration     INTEGER,
        timestamp    TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_mod_actions_member ON mod_actions(guild_id, user_id);

    CREATE TABLE IF NOT EXISTS mod_config (
        guild_id       INTEGER PRIMARY KEY,
        log_channel_id INTEGER
    );

    CREATE TABLE IF NOT EXISTS upvotes (
        user_id     INTEGER NOT NULL,
        showcase_id INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_upvotes_showcase ON upvotes(showcase_id);

    CREATE TABLE IF NOT EXISTS thread_followers (
        thread_id INTEGER NOT NULL,
        user_id   INTEGER NOT NULL,
        PRIMARY KEY (thread_id, user_id)
    );

    CREATE TABLE IF NOT EXISTS tickets (
        id             INTEGER PRIMARY KEY AUTOINCREMENT,
        guild_id       INTEGER NOT NULL,
        channel_id     INTEGER NOT NULL,
        user_id        INTEGER NOT NULL,
        username       TEXT NOT NULL,
        created_at     TEXT NOT NULL,
        closed_at      TEXT,
        closed_by      INTEGER,
        status         TEXT DEFAULT 'open',
        transcript_url TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_tickets_channel ON tickets(channel_id);
    CREATE INDEX IF NOT EXISTS idx_tickets_guild_status ON tickets(guild_id, status);

    CREATE TABLE IF NOT EXISTS ticket_participants (
        ticket_id INTEGER NOT NULL,
        user_id   INTEGER NOT NULL,
        added_by  INTEGER NOT NULL,
        added_at  TEXT NOT NULL,
        PRIMARY KEY (ticket_id, user_id),
        FOREIGN KEY (ticket_id) REFERENCES tickets(id)
    );
"#;

/// Create all tables and indexes that do not exist yet.
///
/// Runs inside a single `BEGIN IMMEDIATE` transaction. This is a
/// **synchronous** function; call it from `spawn_blocking`.
pub fn init(conn: &Connection) -> StoreResult<()> {
    // `conn.transaction()` needs `&mut Connection`, so the transaction is
    // managed by hand.
    conn.execute_batch("BEGIN IMMEDIATE;")
        .map_err(|e| schema_error("failed to begin transaction", e))?;

    match conn.execute_batch(SCHEMA_SQL) {
        Ok(()) => {
            conn.execute_batch("COMMIT;")
                .map_err(|e| schema_error("failed to commit", e))?;
            info!(tables = TABLES.len(), "schema ready");
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "schema initialization failed, rolling back");
            let _ = conn.execute_batch("ROLLBACK;");
            Err(schema_error("SQL execution failed", e))
        }
    }
}

/// List the user tables present in the database, sorted by name.
pub fn table_names(conn: &Connection) -> StoreResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' \
         ORDER BY name",
    )?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(names)
}

fn schema_error(what: &str, err: rusqlite::Error) -> StoreError {
    StoreError::Schema {
        message: format!("{what}: {err}"),
    }
}

// ── tests ────────────────────────────────────────────────────────────
