//! CLI argument definitions for modbot.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// modbot -- operator tools for the moderation record store.
#[derive(Parser)]
#[command(
    name = "modbot",
    version,
    about = "modbot -- inspect and maintain the moderation record store",
    long_about = "Operator CLI over the record store used by the modbot community bot: \
                  warnings, the moderation log, upvotes, thread followers and tickets."
)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite database (overrides config and MODBOT_DATABASE).
    #[arg(long, short, global = true)]
    pub database: Option<PathBuf>,

    /// Print records as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database file and any missing tables.
    Init,

    /// Show row counts for every table.
    Status,

    /// Manage member warnings.
    Warnings {
        #[command(subcommand)]
        action: WarningAction,
    },

    /// Show the moderation history of a member.
    History {
        guild: i64,
        user: i64,
    },

    /// Read or set the moderation log channel of a guild.
    LogChannel {
        #[command(subcommand)]
        action: LogChannelAction,
    },

    /// Showcase upvote queries.
    Showcases {
        #[command(subcommand)]
        action: ShowcaseAction,
    },

    /// Thread follower queries.
    Followers {
        #[command(subcommand)]
        action: FollowerAction,
    },

    /// Support ticket queries.
    Tickets {
        #[command(subcommand)]
        action: TicketAction,
    },
}

#[derive(Subcommand)]
pub enum WarningAction {
    /// List warnings of a member, newest first.
    List { guild: i64, user: i64 },
    /// Issue a warning.
    Add {
        guild: i64,
        user: i64,
        /// Moderator issuing the warning.
        #[arg(long, short)]
        moderator: i64,
        /// Reason shown to moderators.
        #[arg(long, short, default_value = "")]
        reason: String,
    },
    /// Remove one warning by id.
    Remove { id: i64 },
    /// Remove every warning of a member.
    Clear { guild: i64, user: i64 },
}

#[derive(Subcommand)]
pub enum LogChannelAction {
    /// Show the configured channel.
    Get { guild: i64 },
    /// Set the channel.
    Set { guild: i64, channel: i64 },
}

#[derive(Subcommand)]
pub enum ShowcaseAction {
    /// Show the most upvoted showcases.
    Top {
        #[arg(long, short, default_value_t = 5)]
        limit: i64,
    },
    /// Show the upvote count of one showcase.
    Count { showcase: i64 },
}

#[derive(Subcommand)]
pub enum FollowerAction {
    /// List the followers of a thread.
    List { thread: i64 },
}

#[derive(Subcommand)]
pub enum TicketAction {
    /// List open tickets in a guild.
    Open { guild: i64 },
    /// List recent tickets of a member.
    User {
        guild: i64,
        user: i64,
        #[arg(long, short, default_value_t = modbot_store::DEFAULT_USER_TICKET_LIMIT)]
        limit: i64,
    },
    /// Show the ticket attached to a channel, with participants.
    Show { channel: i64 },
    /// Show total/open/closed counts for a guild.
    Stats { guild: i64 },
}
