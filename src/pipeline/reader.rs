//! Collaborator traits consumed by the pipeline
//!
//! The pipeline never talks to storage directly; it reads raw activity,
//! watermarks and subscriptions through these traits. `SqliteStore`
//! (see `db`) implements all three.

use super::catalog::Genre;
use super::error::Result;
use super::types::{
    ConnectionRecord, HockeyReport, ParticipationRecord, RaceReport, RawStatLine, RecordMetric,
    SessionActivity, SessionRecord, Subscription, SubscriptionType, TimeWindow, VersFilter, Watermark,
};
use async_trait::async_trait;

/// Persisted single-timestamp counters
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    async fn get_watermark(&self, name: &str) -> Result<Option<Watermark>>;

    async fn set_watermark(&self, name: &str, value: Watermark) -> Result<()>;
}

/// A participant still inside an open session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPlayer {
    pub persona_name: String,
    pub is_host: bool,
}

/// An open session together with its open participants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    pub session: SessionRecord,
    pub players: Vec<SessionPlayer>,
}

/// Read-only queries over raw server activity
///
/// Unless stated otherwise, host connections are excluded and windows are
/// half-open. Results are ordered by the timestamp the query filters on,
/// then by id.
#[async_trait]
pub trait ActivityReader: Send + Sync {
    /// Connections whose start time falls in the window
    async fn connects(&self, window: TimeWindow, filter: &VersFilter) -> Result<Vec<ConnectionRecord>>;

    /// Connections whose end time falls in the window
    async fn disconnects(&self, window: TimeWindow, filter: &VersFilter) -> Result<Vec<ConnectionRecord>>;

    /// Participations whose start time falls in the window
    async fn session_joins(&self, window: TimeWindow, filter: &VersFilter) -> Result<Vec<SessionActivity>>;

    /// Participations whose end time falls in the window
    async fn session_leaves(&self, window: TimeWindow, filter: &VersFilter) -> Result<Vec<SessionActivity>>;

    /// Most recent participation of the join's connection that ended exactly
    /// when the join started, the join itself excluded
    async fn participation_ending_at(&self, join: &ParticipationRecord) -> Result<Option<SessionActivity>>;

    /// Sessions whose end time falls in the window, filtered on session vers
    async fn sessions_ended(&self, window: TimeWindow, filter: &VersFilter) -> Result<Vec<SessionRecord>>;

    /// Every stat line of a session, hosts included and flagged
    async fn stat_lines(&self, session_id: i64) -> Result<Vec<RawStatLine>>;

    /// Race results of a session in participation order
    async fn race_reports(&self, session_id: i64) -> Result<Vec<RaceReport>>;

    /// Best positive time among ranked races on a track, across every
    /// session of the given session code
    async fn track_record(
        &self,
        vers: &str,
        venue: i64,
        direction: i64,
        metric: RecordMetric,
    ) -> Result<Option<i64>>;

    /// Hockey box scores of a session in participation order
    async fn hockey_reports(&self, session_id: i64) -> Result<Vec<HockeyReport>>;

    /// Open connections with no open participation
    async fn lobby_connections(&self, filter: &VersFilter) -> Result<Vec<ConnectionRecord>>;

    /// Open sessions filtered on session vers, with open participants (hosts included)
    async fn active_sessions(&self, filter: &VersFilter) -> Result<Vec<ActiveSession>>;

    async fn count_online(&self) -> Result<i64>;

    async fn count_in_session(&self) -> Result<i64>;
}

/// Durable subscription rows, unique on (guild, type, genre)
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn list_subscriptions(&self) -> Result<Vec<Subscription>>;

    async fn upsert_subscription(&self, subscription: &Subscription) -> Result<()>;

    async fn delete_subscription(
        &self,
        guild_id: &str,
        subscription_type: SubscriptionType,
        genre: Genre,
    ) -> Result<()>;
}
