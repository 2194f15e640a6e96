//! Subcommand handlers.
//!
//! Each handler takes an open [`RecordStore`] and prints the result either
//! as plain text or, with `--json`, as pretty-printed JSON.

use anyhow::Result;
use modbot_store::{ModAction, RecordStore, ShowcaseScore, Ticket, Warning};
use serde::Serialize;

use crate::cli::{FollowerAction, LogChannelAction, ShowcaseAction, TicketAction, WarningAction};

/// Output mode selected by the global `--json` flag.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// status
// ---------------------------------------------------------------------------

pub async fn status(store: &RecordStore, out: Output) -> Result<()> {
    let counts = store.table_counts().await?;
    out.emit(&counts, || {
        counts
            .iter()
            .map(|(table, n)| format!("  {table:<20} {n}"))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

// ---------------------------------------------------------------------------
// warnings / history
// ---------------------------------------------------------------------------

pub async fn warnings(store: &RecordStore, action: WarningAction, out: Output) -> Result<()> {
    let warnings = store.warnings();
    match action {
        WarningAction::List { guild, user } => {
            let rows = warnings.get_warnings(guild, user).await?;
            out.emit(&rows, || render_warnings(&rows))
        }
        WarningAction::Add {
            guild,
            user,
            moderator,
            reason,
        } => {
            let id = warnings.add_warning(guild, user, moderator, &reason).await?;
            let total = warnings.count_warnings(guild, user).await?;
            out.emit(&serde_json::json!({ "id": id, "total": total }), || {
                format!("  Warning #{id} recorded ({total} on record)")
            })
        }
        WarningAction::Remove { id } => {
            let removed = warnings.remove_warning(id).await?;
            out.emit(&removed, || {
                if removed {
                    format!("  Warning #{id} removed")
                } else {
                    format!("  No warning #{id}")
                }
            })
        }
        WarningAction::Clear { guild, user } => {
            let cleared = warnings.clear_warnings(guild, user).await?;
            out.emit(&cleared, || format!("  Cleared {cleared} warning(s)"))
        }
    }
}

pub async fn history(store: &RecordStore, guild: i64, user: i64, out: Output) -> Result<()> {
    let rows = store.warnings().get_user_history(guild, user).await?;
    out.emit(&rows, || render_history(&rows))
}

// ---------------------------------------------------------------------------
// log channel
// ---------------------------------------------------------------------------

pub async fn log_channel(store: &RecordStore, action: LogChannelAction, out: Output) -> Result<()> {
    let config = store.mod_config();
    match action {
        LogChannelAction::Get { guild } => {
            let channel = config.get_log_channel(guild).await?;
            out.emit(&channel, || match channel {
                Some(channel) => format!("  Log channel: {channel}"),
                None => "  Log channel: (unset)".to_string(),
            })
        }
        LogChannelAction::Set { guild, channel } => {
            config.set_log_channel(guild, channel).await?;
            out.emit(&channel, || format!("  Log channel set to {channel}"))
        }
    }
}

// ---------------------------------------------------------------------------
// showcases / followers
// ---------------------------------------------------------------------------

pub async fn showcases(store: &RecordStore, action: ShowcaseAction, out: Output) -> Result<()> {
    match action {
        ShowcaseAction::Top { limit } => {
            let rows = store.upvotes().top_showcases(limit).await?;
            out.emit(&rows, || render_leaderboard(&rows))
        }
        ShowcaseAction::Count { showcase } => {
            let count = store.upvotes().get_upvotes(showcase).await?;
            out.emit(&count, || format!("  Showcase {showcase}: {count} upvote(s)"))
        }
    }
}

pub async fn followers(store: &RecordStore, action: FollowerAction, out: Output) -> Result<()> {
    match action {
        FollowerAction::List { thread } => {
            let users = store.thread_followers().get_thread_followers(thread).await?;
            out.emit(&users, || {
                if users.is_empty() {
                    "  No followers.".to_string()
                } else {
                    users
                        .iter()
                        .map(|u| format!("  {u}"))
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            })
        }
    }
}

// ---------------------------------------------------------------------------
// tickets
// ---------------------------------------------------------------------------

pub async fn tickets(store: &RecordStore, action: TicketAction, out: Output) -> Result<()> {
    let tickets = store.tickets();
    match action {
        TicketAction::Open { guild } => {
            let rows = tickets.get_open_tickets(guild).await?;
            out.emit(&rows, || render_tickets(&rows))
        }
        TicketAction::User { guild, user, limit } => {
            let rows = tickets.get_user_tickets(guild, user, limit).await?;
            out.emit(&rows, || render_tickets(&rows))
        }
        TicketAction::Show { channel } => {
            let Some(ticket) = tickets.get_ticket_by_channel(channel).await? else {
                return out.emit(&Option::<Ticket>::None, || {
                    format!("  No ticket for channel {channel}")
                });
            };
            let participants = tickets.get_ticket_participants(ticket.id).await?;
            let value = serde_json::json!({ "ticket": ticket, "participants": participants });
            out.emit(&value, || {
                let mut text = render_tickets(std::slice::from_ref(&ticket));
                for p in &participants {
                    text.push_str(&format!(
                        "\n    participant {} (added by {} at {})",
                        p.user_id, p.added_by, p.added_at
                    ));
                }
                text
            })
        }
        TicketAction::Stats { guild } => {
            let stats = tickets.get_ticket_stats(guild).await?;
            out.emit(&stats, || {
                format!(
                    "  Tickets: {} total, {} open, {} closed",
                    stats.total, stats.open, stats.closed
                )
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render_warnings(rows: &[Warning]) -> String {
    if rows.is_empty() {
        return "  No warnings.".to_string();
    }
    rows.iter()
        .map(|w| {
            format!(
                "  #{:<6} {}  by {}  {}",
                w.id, w.timestamp, w.moderator_id, w.reason
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_history(rows: &[ModAction]) -> String {
    if rows.is_empty() {
        return "  No moderation history.".to_string();
    }
    rows.iter()
        .map(|a| {
            let mut line = format!(
                "  {}  {:<8} by {}",
                a.timestamp, a.action_type, a.moderator_id
            );
            if let Some(duration) = a.duration {
                line.push_str(&format!("  for {duration}s"));
            }
            if let Some(reason) = &a.reason {
                line.push_str(&format!("  {reason}"));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_leaderboard(rows: &[ShowcaseScore]) -> String {
    if rows.is_empty() {
        return "  No upvotes yet.".to_string();
    }
    rows.iter()
        .enumerate()
        .map(|(rank, s)| {
            format!(
                "  {}. showcase {}  ({} upvotes)",
                rank + 1,
                s.showcase_id,
                s.upvote_count
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_tickets(rows: &[Ticket]) -> String {
    if rows.is_empty() {
        return "  No tickets.".to_string();
    }
    rows.iter()
        .map(|t| {
            let mut line = format!(
                "  #{:<6} [{}] channel {}  {} ({})  opened {}",
                t.id, t.status, t.channel_id, t.username, t.user_id, t.created_at
            );
            if let (Some(at), Some(by)) = (&t.closed_at, t.closed_by) {
                line.push_str(&format!("  closed {at} by {by}"));
            }
            if let Some(url) = &t.transcript_url {
                line.push_str(&format!("  transcript {url}"));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}
