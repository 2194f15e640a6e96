//! SQLite database handle with WAL mode and connection pragmas.
//!
//! The [`Database`] struct wraps a single long-lived `rusqlite::Connection`
//! behind an `Arc<Mutex<>>` and exposes async methods that use
//! `tokio::task::spawn_blocking` to avoid blocking the async runtime.
//! Cross-process write serialization is left to SQLite's own locking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::schema;

/// Connection settings applied when a [`Database`] is opened.
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    /// How long SQLite waits for a competing writer before failing with
    /// `SQLITE_BUSY`, in milliseconds.
    ///
    /// Default: **5 000 ms**.
    pub busy_timeout_ms: u32,

    /// Whether to switch the journal to write-ahead logging.
    ///
    /// Default: **true**.
    pub wal: bool,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
            wal: true,
        }
    }
}

impl DatabaseOptions {
    /// Set the busy timeout (in milliseconds).
    pub fn with_busy_timeout_ms(mut self, ms: u32) -> Self {
        self.busy_timeout_ms = ms;
        self
    }

    /// Enable or disable WAL journaling.
    pub fn with_wal(mut self, wal: bool) -> Self {
        self.wal = wal;
        self
    }
}

/// Thread-safe handle to the SQLite database.
///
/// All read/write operations go through [`Database::execute`] which
/// dispatches onto the blocking thread pool via `tokio::task::spawn_blocking`.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) a database at `path` and apply pragmas.
    ///
    /// This call blocks briefly (file I/O), so call it during startup or
    /// wrap it in `spawn_blocking`.
    pub fn open(path: impl AsRef<Path>, options: &DatabaseOptions) -> StoreResult<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "opening database");

        let conn = Connection::open(path)?;
        Self::apply_pragmas(&conn, options)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory database, for tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        debug!("opening in-memory database");

        let conn = Connection::open_in_memory()?;
        Self::apply_pragmas(&conn, &DatabaseOptions::default())?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open the database on the blocking pool and ensure the schema exists.
    pub async fn open_and_init(
        path: impl AsRef<Path> + Send + 'static,
        options: DatabaseOptions,
    ) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let db = tokio::task::spawn_blocking(move || Self::open(&path, &options)).await??;
        db.init_schema().await?;
        Ok(db)
    }

    /// Create any missing tables and indexes.
    pub async fn init_schema(&self) -> StoreResult<()> {
        self.execute(schema::init).await
    }

    /// Execute a closure against the connection on the blocking pool.
    ///
    /// The closure receives a `&Connection` and must return a `StoreResult<T>`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let count: i64 = db.execute(|conn| {
    ///     let count = conn.query_row("SELECT count(*) FROM warnings", [], |row| row.get(0))?;
    ///     Ok(count)
    /// }).await?;
    /// ```
    pub async fn execute<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| StoreError::TaskJoin(format!("mutex poisoned: {e}")))?;
            f(&conn)
        })
        .await?
    }

    // ── pragmas ──────────────────────────────────────────────────────

    fn apply_pragmas(conn: &Connection, options: &DatabaseOptions) -> StoreResult<()> {
        debug!(?options, "applying SQLite pragmas");

        if options.wal {
            // WAL mode: readers don't block the single writer.
            conn.pragma_update(None, "journal_mode", "WAL")?;
            // NORMAL sync is safe with WAL; only the last transaction can be
            // lost on power failure.
            conn.pragma_update(None, "synchronous", "NORMAL")?;
        }

        // Ticket participants reference tickets.
        conn.pragma_update(None, "foreign_keys", "ON")?;

        conn.pragma_update(None, "busy_timeout", options.busy_timeout_ms)?;

        info!(
            wal = options.wal,
            busy_timeout_ms = options.busy_timeout_ms,
            "database pragmas applied"
        );
        Ok(())
    }
}

/// Current UTC time as a sortable ISO-8601 string with microsecond precision.
pub(crate) fn utc_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

// ── tests ────────────────────────────────────────────────────────────
