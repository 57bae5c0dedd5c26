//! # Lobby Activity Pipeline
//!
//! Periodically reads raw game-server activity (connections, sessions,
//! participations, stat lines) and turns it into chat-ready output:
//! - an ordered, deduplicated activity stream per game genre
//! - per-match scoreboards for finished sessions
//! - live status snapshots per genre
//!
//! ## Architecture
//!
//! ```text
//! SQLite (raw activity)
//!     ↓  ActivityReader
//! Poller::tick  ──→  extractor (events, rotation dedup) ──→ router (genre)
//!     │         └─→  boards ─┬─ aggregator → teams → scoreboard  (FPS)
//!     │                      ├─ racing + tables                  (RACING)
//!     │                      └─ hockey + tables                  (HOCKEY)
//!     ↓
//! SubscriptionCache (who wants what)
//!     ↓
//! DeliveryQueue → Notifier
//! ```
//!
//! The pipeline itself makes no network calls; delivery goes through the
//! `Notifier` trait.
//!
//! ## Module Organization
//!
//! - `types` - Data model (records, stats, events, subscriptions)
//! - `catalog` - Version code → game → genre table
//! - `router` - Genre lookup and per-genre grouping
//! - `reader` - Storage traits consumed by the pipeline
//! - `db` - Schema loader and SQLite implementation of the traits
//! - `extractor` - Event extraction and map-rotation dedup
//! - `aggregator` - Per-player stat merge and interest filter
//! - `teams` - Side classification
//! - `scoreboard` - Ranking, outcome and pagination
//! - `racing` - Race results and track records
//! - `hockey` - Head-to-head box scores
//! - `tables` - Track, car and team names
//! - `boards` - Per-genre board dispatch
//! - `subscriptions` - Subscription cache
//! - `delivery` - Notifier trait and delivery worker
//! - `poller` - Watermark tick loop
//! - `status` - Status snapshots
//! - `config` - Environment configuration
//! - `error` - Error type

pub mod types;
pub mod catalog;
pub mod router;
pub mod reader;
pub mod db;
pub mod extractor;
pub mod aggregator;
pub mod teams;
pub mod scoreboard;
pub mod tables;
pub mod racing;
pub mod hockey;
pub mod boards;
pub mod subscriptions;
pub mod delivery;
pub mod poller;
pub mod status;
pub mod config;
pub mod error;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use types::{Event, EventKind, Subscription, SubscriptionType, TimeWindow, VersFilter, Watermark};
pub use catalog::Genre;
pub use reader::{ActivityReader, SubscriptionStore, WatermarkStore};
pub use db::{run_schema_migrations, SqliteStore};
pub use scoreboard::{Scoreboard, ScoreboardBuilder};
pub use boards::{BoardBuilder, MatchBoard};
pub use subscriptions::SubscriptionCache;
pub use delivery::{spawn_delivery_worker, DeliveryQueue, LogNotifier, Notifier};
pub use poller::{Phase, Poller, TickReport};
pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
