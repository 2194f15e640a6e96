//! # modbot-store
//!
//! Record store for the modbot community-management bot.
//!
//! Persists member warnings, the moderation action log, per-guild
//! moderation settings, showcase upvotes, thread followers and support
//! tickets in a single SQLite file.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  RecordStore (cloneable, injected)           │
//! ├──────────────────────────────────────────────┤
//! │  WarningStore      warnings + mod_actions    │
//! │  ModConfigStore    mod_config                │
//! │  UpvoteStore       upvotes                   │
//! │  ThreadFollowerStore thread_followers        │
//! │  TicketStore       tickets + participants    │
//! ├──────────────────────────────────────────────┤
//! │  Database (one rusqlite connection, WAL)     │
//! │  Schema (CREATE IF NOT EXISTS)               │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Quick start
//!
//! ```ignore
//! use modbot_store::{DatabaseOptions, RecordStore};
//!
//! let store = RecordStore::open("data/modbot.db", DatabaseOptions::default()).await?;
//! let id = store.warnings().add_warning(guild, user, moderator, "spam").await?;
//! ```

pub mod db;
pub mod error;
pub mod mod_config;
pub mod schema;
pub mod store;
pub mod thread_followers;
pub mod tickets;
pub mod upvotes;
pub mod warnings;

// ── re-exports ───────────────────────────────────────────────────────

pub use db::{Database, DatabaseOptions};
pub use error::{StoreError, StoreResult};
pub use mod_config::ModConfigStore;
pub use store::RecordStore;
pub use thread_followers::ThreadFollowerStore;
pub use tickets::{
    DEFAULT_USER_TICKET_LIMIT, Ticket, TicketParticipant, TicketStats, TicketStatus, TicketStore,
};
pub use upvotes::{ShowcaseScore, TOP_SHOWCASES, UpvoteStore};
pub use warnings::{ModAction, USER_HISTORY_LIMIT, Warning, WarningStore};
