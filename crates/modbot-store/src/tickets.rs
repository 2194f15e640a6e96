//! Support tickets and their participants.
//!
//! A ticket is tied to a dedicated channel and moves through a single
//! one-way transition, `open -> closed`. Closing sets `closed_at`,
//! `closed_by` and the optional transcript URL exactly once; tickets are
//! never deleted. Participants reference a ticket and are not removed when
//! it closes.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::db::{Database, utc_timestamp};
use crate::error::{StoreError, StoreResult, is_duplicate_key};

/// Default page size for [`TicketStore::get_user_tickets`].
pub const DEFAULT_USER_TICKET_LIMIT: i64 = 10;

const TICKET_COLUMNS: &str = "id, guild_id, channel_id, user_id, username, created_at, \
                              closed_at, closed_by, status, transcript_url";

// ═══════════════════════════════════════════════════════════════════════
//  Types
// ═══════════════════════════════════════════════════════════════════════

/// Lifecycle state of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Open,
    Closed,
}

impl TicketStatus {
    /// Convert from the database string representation.
    fn parse(s: &str) -> StoreResult<Self> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            other => Err(StoreError::InvalidArgument(format!(
                "unknown ticket status: {other}"
            ))),
        }
    }

    /// Convert to the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A support ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub guild_id: i64,
    /// The ticket's dedicated channel.
    pub channel_id: i64,
    /// The member who opened the ticket.
    pub user_id: i64,
    pub username: String,
    pub created_at: String,
    pub closed_at: Option<String>,
    pub closed_by: Option<i64>,
    pub status: TicketStatus,
    pub transcript_url: Option<String>,
}

/// A member added to a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketParticipant {
    pub ticket_id: i64,
    pub user_id: i64,
    pub added_by: i64,
    pub added_at: String,
}

/// Ticket counts for a guild.
///
/// Computed from three separate statements, so a concurrent writer can make
/// `total != open + closed` transiently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketStats {
    pub total: i64,
    pub open: i64,
    pub closed: i64,
}

// ═══════════════════════════════════════════════════════════════════════
//  TicketStore
// ═══════════════════════════════════════════════════════════════════════

/// Ticket lifecycle and participant operations.
#[derive(Clone)]
pub struct TicketStore {
    db: Database,
}

impl TicketStore {
    /// Create a new ticket store backed by `db`.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open a new ticket and return its id.
    #[instrument(skip(self))]
    pub async fn create_ticket(
        &self,
        guild_id: i64,
        channel_id: i64,
        user_id: i64,
        username: &str,
    ) -> StoreResult<i64> {
        let username = username.to_string();
        let now = utc_timestamp();

        self.db
            .execute(move |conn| {
                conn.execute(
                    "INSERT INTO tickets (guild_id, channel_id, user_id, username, created_at, status) \
                     VALUES (?1, ?2, ?3, ?4, ?5, 'open')",
                    rusqlite::params![guild_id, channel_id, user_id, username, now],
                )?;
                let id = conn.last_insert_rowid();
                debug!(ticket_id = id, guild_id, channel_id, "ticket created");
                Ok(id)
            })
            .await
    }

    /// Close the open ticket attached to `channel_id`.
    ///
    /// Returns `false` if the channel has no open ticket, including when it
    /// was already closed; a closed ticket is left untouched.
    #[instrument(skip(self))]
    pub async fn close_ticket(
        &self,
        channel_id: i64,
        closed_by: i64,
        transcript_url: Option<&str>,
    ) -> StoreResult<bool> {
        let transcript_url = transcript_url.map(|s| s.to_string());
        let now = utc_timestamp();

        self.db
            .execute(move |conn| {
                let updated = conn.execute(
                    "UPDATE tickets SET closed_at = ?1, closed_by = ?2, status = 'closed', \
                     transcript_url = ?3 WHERE channel_id = ?4 AND status = 'open'",
                    rusqlite::params![now, closed_by, transcript_url, channel_id],
                )?;
                if updated > 0 {
                    debug!(channel_id, closed_by, "ticket closed");
                }
                Ok(updated > 0)
            })
            .await
    }

    /// The most recently created ticket for `channel_id`, if any.
    #[instrument(skip(self))]
    pub async fn get_ticket_by_channel(&self, channel_id: i64) -> StoreResult<Option<Ticket>> {
        self.db
            .execute(move |conn| {
                let sql = format!(
                    "SELECT {TICKET_COLUMNS} FROM tickets WHERE channel_id = ?1 \
                     ORDER BY created_at DESC, id DESC LIMIT 1"
                );
                let result = conn.query_row(&sql, rusqlite::params![channel_id], TicketRow::read);
                match result {
                    Ok(row) => row.into_ticket().map(Some),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(StoreError::Sqlite(e)),
                }
            })
            .await
    }

    /// All open tickets in a guild, newest first.
    #[instrument(skip(self))]
    pub async fn get_open_tickets(&self, guild_id: i64) -> StoreResult<Vec<Ticket>> {
        self.db
            .execute(move |conn| {
                let sql = format!(
                    "SELECT {TICKET_COLUMNS} FROM tickets \
                     WHERE guild_id = ?1 AND status = 'open' \
                     ORDER BY created_at DESC, id DESC"
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(rusqlite::params![guild_id], TicketRow::read)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows.into_iter().map(TicketRow::into_ticket).collect()
            })
            .await
    }

    /// A member's tickets in a guild, newest first, at most `limit`.
    ///
    /// A negative `limit` is rejected with [`StoreError::InvalidArgument`].
    #[instrument(skip(self))]
    pub async fn get_user_tickets(
        &self,
        guild_id: i64,
        user_id: i64,
        limit: i64,
    ) -> StoreResult<Vec<Ticket>> {
        if limit < 0 {
            return Err(StoreError::InvalidArgument(format!(
                "ticket limit must not be negative, got {limit}"
            )));
        }
        self.db
            .execute(move |conn| {
                let sql = format!(
                    "SELECT {TICKET_COLUMNS} FROM tickets \
                     WHERE guild_id = ?1 AND user_id = ?2 \
                     ORDER BY created_at DESC, id DESC LIMIT ?3"
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(rusqlite::params![guild_id, user_id, limit], TicketRow::read)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows.into_iter().map(TicketRow::into_ticket).collect()
            })
            .await
    }

    /// Add a participant to a ticket.
    ///
    /// Returns `false` if the user is already a participant. Adding to a
    /// ticket that does not exist fails with a foreign-key error.
    #[instrument(skip(self))]
    pub async fn add_ticket_participant(
        &self,
        ticket_id: i64,
        user_id: i64,
        added_by: i64,
    ) -> StoreResult<bool> {
        let now = utc_timestamp();

        self.db
            .execute(move |conn| {
                match conn.execute(
                    "INSERT INTO ticket_participants (ticket_id, user_id, added_by, added_at) \
                     VALUES (?1, ?2, ?3, ?4)",
                    rusqlite::params![ticket_id, user_id, added_by, now],
                ) {
                    Ok(_) => {
                        debug!(ticket_id, user_id, added_by, "ticket participant added");
                        Ok(true)
                    }
                    Err(e) if is_duplicate_key(&e) => Ok(false),
                    Err(e) => Err(e.into()),
                }
            })
            .await
    }

    /// Remove a participant, returning `true` if they were on the ticket.
    #[instrument(skip(self))]
    pub async fn remove_ticket_participant(
        &self,
        ticket_id: i64,
        user_id: i64,
    ) -> StoreResult<bool> {
        self.db
            .execute(move |conn| {
                let deleted = conn.execute(
                    "DELETE FROM ticket_participants WHERE ticket_id = ?1 AND user_id = ?2",
                    rusqlite::params![ticket_id, user_id],
                )?;
                Ok(deleted > 0)
            })
            .await
    }

    /// Participants of a ticket in the order they were added.
    #[instrument(skip(self))]
    pub async fn get_ticket_participants(
        &self,
        ticket_id: i64,
    ) -> StoreResult<Vec<TicketParticipant>> {
        self.db
            .execute(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT ticket_id, user_id, added_by, added_at FROM ticket_participants \
                     WHERE ticket_id = ?1 ORDER BY added_at ASC, user_id ASC",
                )?;
                let rows = stmt
                    .query_map(rusqlite::params![ticket_id], |row| {
                        Ok(TicketParticipant {
                            ticket_id: row.get(0)?,
                            user_id: row.get(1)?,
                            added_by: row.get(2)?,
                            added_at: row.get(3)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
    }

    /// Total, open and closed ticket counts for a guild.
    ///
    /// Not atomic: each count is its own statement.
    #[instrument(skip(self))]
    pub async fn get_ticket_stats(&self, guild_id: i64) -> StoreResult<TicketStats> {
        let total = self.count_tickets(guild_id, None).await?;
        let open = self.count_tickets(guild_id, Some(TicketStatus::Open)).await?;
        let closed = self
            .count_tickets(guild_id, Some(TicketStatus::Closed))
            .await?;
        Ok(TicketStats {
            total,
            open,
            closed,
        })
    }

    async fn count_tickets(&self, guild_id: i64, status: Option<TicketStatus>) -> StoreResult<i64> {
        self.db
            .execute(move |conn| {
                let count: i64 = match status {
                    Some(status) => conn.query_row(
                        "SELECT COUNT(*) FROM tickets WHERE guild_id = ?1 AND status = ?2",
                        rusqlite::params![guild_id, status.as_str()],
                        |row| row.get(0),
                    )?,
                    None => conn.query_row(
                        "SELECT COUNT(*) FROM tickets WHERE guild_id = ?1",
                        rusqlite::params![guild_id],
                        |row| row.get(0),
                    )?,
                };
                Ok(count)
            })
            .await
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Internal row mapping
// ═══════════════════════════════════════════════════════════════════════

/// Raw ticket row before the status string is parsed.
///
/// Keeps the `rusqlite` row-mapping closure infallible with respect to
/// [`StoreError`]; parsing happens in [`TicketRow::into_ticket`].
struct TicketRow {
    id: i64,
    guild_id: i64,
    channel_id: i64,
    user_id: i64,
    username: String,
    created_at: String,
    closed_at: Option<String>,
    closed_by: Option<i64>,
    status: String,
    transcript_url: Option<String>,
}

impl TicketRow {
    /// Read a row selected with [`TICKET_COLUMNS`].
    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            guild_id: row.get(1)?,
            channel_id: row.get(2)?,
            user_id: row.get(3)?,
            username: row.get(4)?,
            created_at: row.get(5)?,
            closed_at: row.get(6)?,
            closed_by: row.get(7)?,
            status: row.get(8)?,
            transcript_url: row.get(9)?,
        })
    }

    fn into_ticket(self) -> StoreResult<Ticket> {
        Ok(Ticket {
            id: self.id,
            guild_id: self.guild_id,
            channel_id: self.channel_id,
            user_id: self.user_id,
            username: self.username,
            created_at: self.created_at,
            closed_at: self.closed_at,
            closed_by: self.closed_by,
            status: TicketStatus::parse(&self.status)?,
            transcript_url: self.transcript_url,
        })
    }
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[path = "tickets_tests.rs"]
mod tests;
