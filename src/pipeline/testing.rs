//! In-memory collaborators and row builders for unit tests

use super::catalog::Genre;
use super::error::{PipelineError, Result};
use super::reader::{ActiveSession, ActivityReader, SubscriptionStore, WatermarkStore};
use super::types::{
    ConnectionRecord, HockeyReport, ParticipationRecord, RaceReport, RawStatLine, RecordMetric,
    SessionActivity, SessionRecord, StatCounters, Subscription, SubscriptionType, TimeWindow,
    VersFilter, Watermark,
};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn at(s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + chrono::Duration::seconds(s as i64)
}

pub fn connection(id: i64, name: &str, vers: &str, start: DateTime<Utc>) -> ConnectionRecord {
    ConnectionRecord {
        id,
        persona_id: id,
        persona_name: name.to_string(),
        vers: vers.to_string(),
        start_time: start,
        end_time: None,
        is_host: false,
        address: None,
    }
}

pub fn session(id: i64, vers: &str, params: &str, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> SessionRecord {
    SessionRecord {
        id,
        vers: vers.to_string(),
        name: format!("game {}", id),
        params: params.to_string(),
        has_password: false,
        max_size: 16,
        started: true,
        sysflags: None,
        start_time: start,
        end_time: end,
    }
}

pub fn activity(
    id: i64,
    connection: &ConnectionRecord,
    session: &SessionRecord,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) -> SessionActivity {
    SessionActivity {
        participation: ParticipationRecord {
            id,
            session_id: session.id,
            connection_id: connection.id,
            start_time: start,
            end_time: end,
        },
        connection: connection.clone(),
        session: session.clone(),
    }
}

pub fn stat_line(participation_id: i64, persona_id: i64, name: &str, counters: StatCounters) -> RawStatLine {
    RawStatLine {
        participation_id,
        persona_id,
        persona_name: name.to_string(),
        is_host: false,
        counters,
    }
}

/// Reader over fixed row sets; every query can be made to fail
#[derive(Default)]
pub struct MemoryReader {
    pub connects: Vec<ConnectionRecord>,
    pub disconnects: Vec<ConnectionRecord>,
    pub joins: Vec<SessionActivity>,
    pub leaves: Vec<SessionActivity>,
    /// Searched by the predecessor lookup
    pub history: Vec<SessionActivity>,
    pub sessions: Vec<SessionRecord>,
    pub stat_lines: HashMap<i64, Vec<RawStatLine>>,
    pub race_reports: HashMap<i64, Vec<RaceReport>>,
    /// (session code, result) pairs searched for track records
    pub race_history: Vec<(String, RaceReport)>,
    pub hockey_reports: HashMap<i64, Vec<HockeyReport>>,
    pub lobby: Vec<ConnectionRecord>,
    pub active: Vec<ActiveSession>,
    pub fail_reads: AtomicBool,
    pub read_calls: AtomicUsize,
}

impl MemoryReader {
    fn check(&self) -> Result<()> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(PipelineError::InvalidData("read failure injected".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ActivityReader for MemoryReader {
    async fn connects(&self, window: TimeWindow, filter: &VersFilter) -> Result<Vec<ConnectionRecord>> {
        self.check()?;
        Ok(self
            .connects
            .iter()
            .filter(|c| window.contains(c.start_time) && filter.matches(&c.vers))
            .cloned()
            .collect())
    }

    async fn disconnects(&self, window: TimeWindow, filter: &VersFilter) -> Result<Vec<ConnectionRecord>> {
        self.check()?;
        Ok(self
            .disconnects
            .iter()
            .filter(|c| c.end_time.is_some_and(|t| window.contains(t)) && filter.matches(&c.vers))
            .cloned()
            .collect())
    }

    async fn session_joins(&self, window: TimeWindow, _filter: &VersFilter) -> Result<Vec<SessionActivity>> {
        self.check()?;
        Ok(self
            .joins
            .iter()
            .filter(|a| window.contains(a.participation.start_time))
            .cloned()
            .collect())
    }

    async fn session_leaves(&self, window: TimeWindow, _filter: &VersFilter) -> Result<Vec<SessionActivity>> {
        self.check()?;
        Ok(self
            .leaves
            .iter()
            .filter(|a| a.participation.end_time.is_some_and(|t| window.contains(t)))
            .cloned()
            .collect())
    }

    async fn participation_ending_at(&self, join: &ParticipationRecord) -> Result<Option<SessionActivity>> {
        self.check()?;
        Ok(self
            .history
            .iter()
            .filter(|a| {
                a.connection.id == join.connection_id
                    && a.participation.end_time == Some(join.start_time)
                    && a.participation.id != join.id
            })
            .max_by_key(|a| a.participation.id)
            .cloned())
    }

    async fn sessions_ended(&self, window: TimeWindow, filter: &VersFilter) -> Result<Vec<SessionRecord>> {
        self.check()?;
        Ok(self
            .sessions
            .iter()
            .filter(|s| s.end_time.is_some_and(|t| window.contains(t)) && filter.matches(&s.vers))
            .cloned()
            .collect())
    }

    async fn stat_lines(&self, session_id: i64) -> Result<Vec<RawStatLine>> {
        self.check()?;
        Ok(self.stat_lines.get(&session_id).cloned().unwrap_or_default())
    }

    async fn race_reports(&self, session_id: i64) -> Result<Vec<RaceReport>> {
        self.check()?;
        Ok(self.race_reports.get(&session_id).cloned().unwrap_or_default())
    }

    async fn track_record(
        &self,
        vers: &str,
        venue: i64,
        direction: i64,
        metric: RecordMetric,
    ) -> Result<Option<i64>> {
        self.check()?;
        Ok(self
            .race_history
            .iter()
            .filter(|(code, r)| {
                code == vers && r.venue == Some(venue) && r.direction == Some(direction) && r.ranked == Some(1)
            })
            .filter_map(|(_, r)| metric.of(r))
            .filter(|t| *t > 0)
            .min())
    }

    async fn hockey_reports(&self, session_id: i64) -> Result<Vec<HockeyReport>> {
        self.check()?;
        Ok(self.hockey_reports.get(&session_id).cloned().unwrap_or_default())
    }

    async fn lobby_connections(&self, filter: &VersFilter) -> Result<Vec<ConnectionRecord>> {
        self.check()?;
        Ok(self.lobby.iter().filter(|c| filter.matches(&c.vers)).cloned().collect())
    }

    async fn active_sessions(&self, filter: &VersFilter) -> Result<Vec<ActiveSession>> {
        self.check()?;
        Ok(self
            .active
            .iter()
            .filter(|a| filter.matches(&a.session.vers))
            .cloned()
            .collect())
    }

    async fn count_online(&self) -> Result<i64> {
        self.check()?;
        Ok(self.lobby.len() as i64
            + self.active.iter().map(|a| a.players.iter().filter(|p| !p.is_host).count() as i64).sum::<i64>())
    }

    async fn count_in_session(&self) -> Result<i64> {
        self.check()?;
        Ok(self.active.iter().map(|a| a.players.iter().filter(|p| !p.is_host).count() as i64).sum())
    }
}

#[derive(Default)]
pub struct MemoryWatermarks {
    pub values: Mutex<HashMap<String, Watermark>>,
    pub writes: AtomicUsize,
}

#[async_trait]
impl WatermarkStore for MemoryWatermarks {
    async fn get_watermark(&self, name: &str) -> Result<Option<Watermark>> {
        Ok(self.values.lock().unwrap().get(name).copied())
    }

    async fn set_watermark(&self, name: &str, value: Watermark) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.values.lock().unwrap().insert(name.to_string(), value);
        Ok(())
    }
}

/// Subscription rows keyed like the unique index (guild, type, genre)
#[derive(Default)]
pub struct MemorySubscriptions {
    pub rows: Mutex<Vec<Subscription>>,
    pub fail_writes: AtomicBool,
}

#[async_trait]
impl SubscriptionStore for MemorySubscriptions {
    async fn list_subscriptions(&self) -> Result<Vec<Subscription>> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn upsert_subscription(&self, subscription: &Subscription) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PipelineError::InvalidData("write failure injected".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        rows.retain(|r| {
            !(r.guild_id == subscription.guild_id
                && r.subscription_type == subscription.subscription_type
                && r.genre == subscription.genre)
        });
        rows.push(subscription.clone());
        Ok(())
    }

    async fn delete_subscription(
        &self,
        guild_id: &str,
        subscription_type: SubscriptionType,
        genre: Genre,
    ) -> Result<()> {
        self.rows.lock().unwrap().retain(|r| {
            !(r.guild_id == guild_id && r.subscription_type == subscription_type && r.genre == genre)
        });
        Ok(())
    }
}
