//! Core data model for the activity pipeline
//!
//! Raw rows come from the game-server database (connections, sessions,
//! participations, stat lines). Derived values (events, aggregated stats)
//! are produced by the extractor and the stats aggregator and never mutated
//! afterwards.

use super::catalog::Genre;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// Persisted "last processed" instant for a named counter.
///
/// Always held at microsecond precision so that a value survives a
/// store round-trip unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Watermark(DateTime<Utc>);

impl Watermark {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at.trunc_subsecs(6))
    }

    pub fn from_micros(micros: i64) -> Option<Self> {
        DateTime::from_timestamp_micros(micros).map(Self)
    }

    pub fn as_micros(&self) -> i64 {
        self.0.timestamp_micros()
    }

    pub fn at(&self) -> DateTime<Utc> {
        self.0
    }
}

impl fmt::Display for Watermark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S%.6f"))
    }
}

/// Half-open time window `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Version-code filter applied to reader queries
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VersFilter {
    #[default]
    Any,
    Only(Vec<String>),
}

impl VersFilter {
    pub fn matches(&self, vers: &str) -> bool {
        match self {
            VersFilter::Any => true,
            VersFilter::Only(codes) => codes.iter().any(|c| c == vers),
        }
    }
}

/// A persona's connection to the server (lobby level)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub id: i64,
    pub persona_id: i64,
    pub persona_name: String,
    pub vers: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub is_host: bool,
    pub address: Option<String>,
}

/// A hosted match ("game")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i64,
    pub vers: String,
    pub name: String,
    pub params: String,
    pub has_password: bool,
    pub max_size: i32,
    pub started: bool,
    /// Decimal bit set reported by the host, when any
    pub sysflags: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

/// Link between a connection and a session, with its own lifetime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipationRecord {
    pub id: i64,
    pub session_id: i64,
    pub connection_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

/// A participation joined with its connection and session rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionActivity {
    pub participation: ParticipationRecord,
    pub connection: ConnectionRecord,
    pub session: SessionRecord,
}

/// Shot counters for the weapons each side spawns with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponShots {
    pub luger: i64,
    pub mp40: i64,
    pub mp44: i64,
    pub kar: i64,
    pub gewr: i64,
    pub panzer: i64,
    pub colt: i64,
    pub thompson: i64,
    pub bar: i64,
    pub garand: i64,
    pub enfield: i64,
    pub bazooka: i64,
}

impl WeaponShots {
    pub fn axis_total(&self) -> i64 {
        self.luger + self.mp40 + self.mp44 + self.kar + self.gewr + self.panzer
    }

    pub fn allies_total(&self) -> i64 {
        self.colt + self.thompson + self.bar + self.garand + self.enfield + self.bazooka
    }
}

impl AddAssign for WeaponShots {
    fn add_assign(&mut self, o: Self) {
        self.luger += o.luger;
        self.mp40 += o.mp40;
        self.mp44 += o.mp44;
        self.kar += o.kar;
        self.gewr += o.gewr;
        self.panzer += o.panzer;
        self.colt += o.colt;
        self.thompson += o.thompson;
        self.bar += o.bar;
        self.garand += o.garand;
        self.enfield += o.enfield;
        self.bazooka += o.bazooka;
    }
}

/// Numeric counters reported per participation
///
/// Merging is field-wise addition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatCounters {
    pub kills: i64,
    pub deaths: i64,
    pub headshots: i64,
    pub hits: i64,
    pub shots: i64,
    pub wins: i64,
    pub losses: i64,
    pub dm_rounds: i64,
    pub axis: i64,
    pub allies: i64,
    pub play_time: i64,
    pub weapons: WeaponShots,
}

impl StatCounters {
    pub fn score(&self) -> i64 {
        self.kills - self.deaths
    }
}

impl AddAssign for StatCounters {
    fn add_assign(&mut self, o: Self) {
        self.kills += o.kills;
        self.deaths += o.deaths;
        self.headshots += o.headshots;
        self.hits += o.hits;
        self.shots += o.shots;
        self.wins += o.wins;
        self.losses += o.losses;
        self.dm_rounds += o.dm_rounds;
        self.axis += o.axis;
        self.allies += o.allies;
        self.play_time += o.play_time;
        self.weapons += o.weapons;
    }
}

impl Add for StatCounters {
    type Output = Self;

    fn add(mut self, o: Self) -> Self {
        self += o;
        self
    }
}

/// One stat row as written by the server for a single participation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStatLine {
    pub participation_id: i64,
    pub persona_id: i64,
    pub persona_name: String,
    pub is_host: bool,
    pub counters: StatCounters,
}

/// Sum of every stat line for one persona within one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedPlayerStat {
    pub session_id: i64,
    pub persona_id: i64,
    pub persona_name: String,
    pub stats: StatCounters,
}

/// A racer's result as written by the server for a single participation
///
/// Every column is optional; times are milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RaceReport {
    pub participation_id: i64,
    pub persona_name: String,
    pub venue: Option<i64>,
    pub game_type: Option<i64>,
    pub direction: Option<i64>,
    pub laps: Option<i64>,
    pub laps_completed: Option<i64>,
    pub position: Option<i64>,
    pub car: Option<i64>,
    pub race_time: Option<i64>,
    pub best_lap: Option<i64>,
    /// 1 when the race counts for the leaderboards
    pub ranked: Option<i64>,
}

/// Which time a track record is kept on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordMetric {
    BestLap,
    RaceTime,
}

impl RecordMetric {
    pub fn of(&self, report: &RaceReport) -> Option<i64> {
        match self {
            RecordMetric::BestLap => report.best_lap,
            RecordMetric::RaceTime => report.race_time,
        }
    }
}

/// One side's box score of a hockey match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HockeyReport {
    pub participation_id: i64,
    pub persona_name: String,
    pub team: i64,
    pub home: bool,
    pub score: i64,
    pub overtime: bool,
    pub power_play_goals: i64,
    pub power_play_chances: i64,
    pub venue: i64,
}

/// Event kind; declaration order is the same-timestamp tie-break order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Connected,
    LeftSession,
    JoinedSession,
    Disconnected,
    Other,
}

/// A rendered activity line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
    pub message: String,
    pub genre: Genre,
}

impl Event {
    fn sort_key(&self) -> (DateTime<Utc>, EventKind, i64) {
        (self.timestamp, self.kind, self.id)
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.message.cmp(&other.message))
            .then_with(|| self.genre.cmp(&other.genre))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// What a channel subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionType {
    Status,
    Logs,
    Scoreboard,
}

impl SubscriptionType {
    pub const ALL: [SubscriptionType; 3] = [
        SubscriptionType::Status,
        SubscriptionType::Logs,
        SubscriptionType::Scoreboard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionType::Status => "STATUS",
            SubscriptionType::Logs => "LOGS",
            SubscriptionType::Scoreboard => "SCOREBOARD",
        }
    }
}

impl fmt::Display for SubscriptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SubscriptionType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown subscription type: {}", s))
    }
}

/// A (guild, channel, type, genre) routing row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub guild_id: String,
    pub channel_id: String,
    pub subscription_type: SubscriptionType,
    pub genre: Genre,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, s).unwrap()
    }

    fn event(id: i64, ts: DateTime<Utc>, kind: EventKind) -> Event {
        Event {
            id,
            timestamp: ts,
            kind,
            message: format!("event {}", id),
            genre: Genre::Fps,
        }
    }

    #[test]
    fn test_watermark_truncates_to_micros() {
        let raw = at(12, 0, 0).with_nanosecond(123_456_789).unwrap();
        let wm = Watermark::new(raw);

        assert_eq!(wm.at().nanosecond(), 123_456_000);
        assert_eq!(Watermark::from_micros(wm.as_micros()), Some(wm));
        assert_eq!(wm.to_string(), "2024-01-01 12:00:00.123456");
    }

    #[test]
    fn test_events_order_by_time_then_kind_then_id() {
        let t0 = at(12, 0, 0);
        let t1 = at(12, 0, 1);

        let mut events = vec![
            event(9, t1, EventKind::Connected),
            event(5, t0, EventKind::Disconnected),
            event(4, t0, EventKind::JoinedSession),
            event(3, t0, EventKind::LeftSession),
            event(2, t0, EventKind::Connected),
            event(1, t0, EventKind::Connected),
            event(0, t0, EventKind::Other),
        ];
        events.sort();

        let ids: Vec<i64> = events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 0, 9]);
    }

    #[test]
    fn test_counters_merge_is_order_independent() {
        let a = StatCounters { kills: 3, deaths: 1, wins: 1, ..Default::default() };
        let b = StatCounters { kills: 2, deaths: 4, play_time: 60, ..Default::default() };
        let c = StatCounters {
            shots: 10,
            weapons: WeaponShots { mp40: 10, ..Default::default() },
            ..Default::default()
        };

        assert_eq!((a + b) + c, a + (b + c));
        assert_eq!(a + b + c, c + b + a);
        assert_eq!((a + b + c).score(), 0);
    }

    #[test]
    fn test_window_is_half_open() {
        let window = TimeWindow::new(at(12, 0, 0), at(12, 0, 10));

        assert!(window.contains(at(12, 0, 0)));
        assert!(window.contains(at(12, 0, 9)));
        assert!(!window.contains(at(12, 0, 10)));
        assert!(!window.is_empty());
    }

    #[test]
    fn test_subscription_type_parses_case_insensitively() {
        assert_eq!("logs".parse::<SubscriptionType>(), Ok(SubscriptionType::Logs));
        assert_eq!("STATUS".parse::<SubscriptionType>(), Ok(SubscriptionType::Status));
        assert!("nope".parse::<SubscriptionType>().is_err());
    }
}
