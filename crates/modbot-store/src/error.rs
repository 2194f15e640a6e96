//! Error types for the modbot-store crate.
//!
//! All storage operations return [`StoreError`] via [`StoreResult`].
//! "Not found" is never an error here: absence is reported through
//! `Option`, empty lists, `false` or zero counts.

use thiserror::Error;

/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite operation failed (I/O, lock contention, constraint violation
    /// other than the handled duplicate-key cases).
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Schema initialization failed.
    #[error("schema initialization failed: {message}")]
    Schema { message: String },

    /// An invalid argument was provided, or a stored value could not be
    /// interpreted.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A blocking task was cancelled or panicked.
    #[error("background task failed: {0}")]
    TaskJoin(String),
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskJoin(err.to_string())
    }
}

/// Returns `true` if `err` is a primary-key or unique-constraint violation.
///
/// Foreign-key and check violations are not included; those remain
/// storage faults.
pub(crate) fn is_duplicate_key(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => matches!(
            e.extended_code,
            rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        ),
        _ => false,
    }
}
