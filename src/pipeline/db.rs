//! SQLite storage: schema loader and the store/reader implementation
//!
//! All timestamps are stored as INTEGER microseconds since epoch (UTC).
//! Windows are half-open: `start <= t < end`.

use super::catalog::Genre;
use super::error::{PipelineError, Result};
use super::reader::{ActiveSession, ActivityReader, SessionPlayer, SubscriptionStore, WatermarkStore};
use super::types::{
    ConnectionRecord, HockeyReport, ParticipationRecord, RaceReport, RawStatLine, RecordMetric,
    SessionActivity, SessionRecord, StatCounters, Subscription, SubscriptionType, TimeWindow,
    VersFilter, Watermark, WeaponShots,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::fs;
use std::path::Path;
use tokio::sync::Mutex;

/// Run schema migrations from SQL files
///
/// Reads all .sql files from `schema_dir` in filename order and executes
/// them. Every file must use "IF NOT EXISTS" clauses so reruns are no-ops.
///
/// ```ignore
/// let mut conn = Connection::open("lobbywatch.db")?;
/// run_schema_migrations(&mut conn, "sql")?;
/// ```
pub fn run_schema_migrations(conn: &mut Connection, schema_dir: &str) -> Result<()> {
    let schema_path = Path::new(schema_dir);

    if !schema_path.exists() {
        return Err(PipelineError::Config(format!(
            "Schema directory not found: {}",
            schema_dir
        )));
    }

    conn.pragma_update(None, "journal_mode", "WAL")?;
    log::info!("📊 Enabled WAL mode for SQLite database");

    // 00_, 01_, 02_ ... ordering
    let mut sql_files: Vec<_> = fs::read_dir(schema_path)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().and_then(|s| s.to_str()) == Some("sql"))
        .collect();

    sql_files.sort_by_key(|entry| entry.file_name());

    log::info!("🔧 Running schema migrations from: {}", schema_dir);

    for entry in sql_files {
        let filename = entry.file_name().to_string_lossy().into_owned();

        log::info!("   ├─ Executing: {}", filename);

        let sql_content = fs::read_to_string(entry.path())?;
        conn.execute_batch(&sql_content)?;

        log::info!("   └─ ✅ Success: {}", filename);
    }

    log::info!("✅ All schema migrations completed successfully");

    Ok(())
}

const CONNECTION_COLUMNS: &str =
    "c.id, c.persona_id, p.name, c.vers, c.start_time, c.end_time, c.is_host, c.address";

const SESSION_COLUMNS: &str =
    "g.id, g.vers, g.name, g.params, g.pass, g.max_size, g.started, g.sysflags, g.start_time, g.end_time";

const PARTICIPATION_COLUMNS: &str =
    "gc.id, gc.game_id, gc.persona_connection_id, gc.start_time, gc.end_time";

const CONNECTION_FROM: &str =
    "FROM persona_connections c JOIN personas p ON p.id = c.persona_id";

const ACTIVITY_FROM: &str = "FROM game_connections gc \
     JOIN persona_connections c ON c.id = gc.persona_connection_id \
     JOIN personas p ON p.id = c.persona_id \
     JOIN games g ON g.id = gc.game_id";

fn time_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let micros: i64 = row.get(idx)?;
    DateTime::from_timestamp_micros(micros)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, micros))
}

fn opt_time_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<i64>>(idx)? {
        Some(micros) => DateTime::from_timestamp_micros(micros)
            .map(Some)
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, micros)),
        None => Ok(None),
    }
}

fn connection_at(row: &Row<'_>, base: usize) -> rusqlite::Result<ConnectionRecord> {
    Ok(ConnectionRecord {
        id: row.get(base)?,
        persona_id: row.get(base + 1)?,
        persona_name: row.get(base + 2)?,
        vers: row.get(base + 3)?,
        start_time: time_at(row, base + 4)?,
        end_time: opt_time_at(row, base + 5)?,
        is_host: row.get(base + 6)?,
        address: row.get(base + 7)?,
    })
}

fn session_at(row: &Row<'_>, base: usize) -> rusqlite::Result<SessionRecord> {
    let pass: Option<String> = row.get(base + 4)?;
    Ok(SessionRecord {
        id: row.get(base)?,
        vers: row.get(base + 1)?,
        name: row.get(base + 2)?,
        params: row.get(base + 3)?,
        has_password: pass.map(|p| !p.is_empty()).unwrap_or(false),
        max_size: row.get(base + 5)?,
        started: row.get(base + 6)?,
        sysflags: row.get(base + 7)?,
        start_time: time_at(row, base + 8)?,
        end_time: opt_time_at(row, base + 9)?,
    })
}

fn participation_at(row: &Row<'_>, base: usize) -> rusqlite::Result<ParticipationRecord> {
    Ok(ParticipationRecord {
        id: row.get(base)?,
        session_id: row.get(base + 1)?,
        connection_id: row.get(base + 2)?,
        start_time: time_at(row, base + 3)?,
        end_time: opt_time_at(row, base + 4)?,
    })
}

fn activity_row(row: &Row<'_>) -> rusqlite::Result<SessionActivity> {
    Ok(SessionActivity {
        participation: participation_at(row, 0)?,
        connection: connection_at(row, 5)?,
        session: session_at(row, 13)?,
    })
}

fn stat_line_row(row: &Row<'_>) -> rusqlite::Result<RawStatLine> {
    Ok(RawStatLine {
        participation_id: row.get(0)?,
        persona_id: row.get(1)?,
        persona_name: row.get(2)?,
        is_host: row.get(3)?,
        counters: StatCounters {
            kills: row.get(4)?,
            deaths: row.get(5)?,
            headshots: row.get(6)?,
            hits: row.get(7)?,
            shots: row.get(8)?,
            wins: row.get(9)?,
            losses: row.get(10)?,
            dm_rounds: row.get(11)?,
            axis: row.get(12)?,
            allies: row.get(13)?,
            play_time: row.get(14)?,
            weapons: WeaponShots {
                luger: row.get(15)?,
                mp40: row.get(16)?,
                mp44: row.get(17)?,
                kar: row.get(18)?,
                gewr: row.get(19)?,
                panzer: row.get(20)?,
                colt: row.get(21)?,
                thompson: row.get(22)?,
                bar: row.get(23)?,
                garand: row.get(24)?,
                enfield: row.get(25)?,
                bazooka: row.get(26)?,
            },
        },
    })
}

/// Appends `AND (col IN (...) OR ...)` for a version filter and pushes its parameters
fn vers_clause(columns: &[&str], filter: &VersFilter, params: &mut Vec<Value>) -> String {
    match filter {
        VersFilter::Any => String::new(),
        VersFilter::Only(codes) if codes.is_empty() => " AND 0".to_string(),
        VersFilter::Only(codes) => {
            let placeholders = vec!["?"; codes.len()].join(", ");
            let tests: Vec<String> = columns
                .iter()
                .map(|col| {
                    params.extend(codes.iter().map(|c| Value::Text(c.clone())));
                    format!("{} IN ({})", col, placeholders)
                })
                .collect();
            format!(" AND ({})", tests.join(" OR "))
        }
    }
}

fn window_params(window: TimeWindow) -> Vec<Value> {
    vec![
        Value::Integer(window.start.timestamp_micros()),
        Value::Integer(window.end.timestamp_micros()),
    ]
}

/// SQLite-backed watermark store, activity reader and subscription store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open an existing database (schema must already be applied)
    pub fn open(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Ok(Self::from_connection(conn))
    }

    /// Open (creating if needed) and apply the schema directory
    pub fn initialize(db_path: &str, schema_dir: &str) -> Result<Self> {
        let mut conn = Connection::open(db_path)?;
        run_schema_migrations(&mut conn, schema_dir)?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn: Mutex::new(conn) }
    }

    async fn query_connections(&self, sql: String, params: Vec<Value>) -> Result<Vec<ConnectionRecord>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| connection_at(row, 0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    async fn query_activity(&self, sql: String, params: Vec<Value>) -> Result<Vec<SessionActivity>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), activity_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    async fn query_sessions(&self, sql: String, params: Vec<Value>) -> Result<Vec<SessionRecord>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| session_at(row, 0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Non-host connections whose `column` falls in the window
    async fn connections_by(
        &self,
        column: &str,
        window: TimeWindow,
        filter: &VersFilter,
    ) -> Result<Vec<ConnectionRecord>> {
        let mut params = window_params(window);
        let vers = vers_clause(&["c.vers"], filter, &mut params);
        let sql = format!(
            "SELECT {CONNECTION_COLUMNS} {CONNECTION_FROM} \
             WHERE c.is_host = 0 AND c.{column} >= ?1 AND c.{column} < ?2{vers} \
             ORDER BY c.{column}, c.id"
        );
        self.query_connections(sql, params).await
    }

    /// Non-host participations whose `column` falls in the window
    async fn activity_by(
        &self,
        column: &str,
        window: TimeWindow,
        filter: &VersFilter,
    ) -> Result<Vec<SessionActivity>> {
        let mut params = window_params(window);
        let vers = vers_clause(&["c.vers", "g.vers"], filter, &mut params);
        let sql = format!(
            "SELECT {PARTICIPATION_COLUMNS}, {CONNECTION_COLUMNS}, {SESSION_COLUMNS} {ACTIVITY_FROM} \
             WHERE c.is_host = 0 AND gc.{column} >= ?1 AND gc.{column} < ?2{vers} \
             ORDER BY gc.{column}, gc.id"
        );
        self.query_activity(sql, params).await
    }
}

#[async_trait]
impl WatermarkStore for SqliteStore {
    async fn get_watermark(&self, name: &str) -> Result<Option<Watermark>> {
        let conn = self.conn.lock().await;
        let micros: Option<i64> = conn
            .query_row(
                "SELECT value_us FROM watermarks WHERE name = ?",
                [name],
                |row| row.get(0),
            )
            .optional()?;

        match micros {
            Some(v) => Watermark::from_micros(v).map(Some).ok_or_else(|| {
                PipelineError::InvalidData(format!("watermark {} out of range: {}", name, v))
            }),
            None => Ok(None),
        }
    }

    async fn set_watermark(&self, name: &str, value: Watermark) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            r#"
            INSERT INTO watermarks (name, value_us, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                value_us = excluded.value_us,
                updated_at = excluded.updated_at
            "#,
            params![name, value.as_micros(), Utc::now().timestamp_micros()],
        )?;
        Ok(())
    }
}

#[async_trait]
impl ActivityReader for SqliteStore {
    async fn connects(&self, window: TimeWindow, filter: &VersFilter) -> Result<Vec<ConnectionRecord>> {
        self.connections_by("start_time", window, filter).await
    }

    async fn disconnects(&self, window: TimeWindow, filter: &VersFilter) -> Result<Vec<ConnectionRecord>> {
        self.connections_by("end_time", window, filter).await
    }

    async fn session_joins(&self, window: TimeWindow, filter: &VersFilter) -> Result<Vec<SessionActivity>> {
        self.activity_by("start_time", window, filter).await
    }

    async fn session_leaves(&self, window: TimeWindow, filter: &VersFilter) -> Result<Vec<SessionActivity>> {
        self.activity_by("end_time", window, filter).await
    }

    async fn participation_ending_at(&self, join: &ParticipationRecord) -> Result<Option<SessionActivity>> {
        let sql = format!(
            "SELECT {PARTICIPATION_COLUMNS}, {CONNECTION_COLUMNS}, {SESSION_COLUMNS} {ACTIVITY_FROM} \
             WHERE gc.persona_connection_id = ?1 AND gc.end_time = ?2 AND gc.id <> ?3 \
             ORDER BY gc.end_time DESC, gc.id DESC LIMIT 1"
        );
        let conn = self.conn.lock().await;
        let found = conn
            .query_row(
                &sql,
                params![join.connection_id, join.start_time.timestamp_micros(), join.id],
                activity_row,
            )
            .optional()?;
        Ok(found)
    }

    async fn sessions_ended(&self, window: TimeWindow, filter: &VersFilter) -> Result<Vec<SessionRecord>> {
        let mut params = window_params(window);
        let vers = vers_clause(&["g.vers"], filter, &mut params);
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM games g \
             WHERE g.end_time >= ?1 AND g.end_time < ?2{vers} \
             ORDER BY g.end_time, g.id"
        );
        self.query_sessions(sql, params).await
    }

    async fn stat_lines(&self, session_id: i64) -> Result<Vec<RawStatLine>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            r#"
            SELECT gc.id, c.persona_id, p.name, c.is_host,
                   r.kills, r.deaths, r.headshots, r.hits, r.shots,
                   r.wins, r.losses, r.dm_rounds, r.axis, r.allies, r.play_time,
                   r.luger_shots, r.mp40_shots, r.mp44_shots, r.kar_shots,
                   r.gewr_shots, r.panzer_shots, r.colt_shots, r.thompson_shots,
                   r.bar_shots, r.garand_shots, r.enfield_shots, r.bazooka_shots
            FROM game_reports r
            JOIN game_connections gc ON gc.id = r.game_connection_id
            JOIN persona_connections c ON c.id = gc.persona_connection_id
            JOIN personas p ON p.id = c.persona_id
            WHERE gc.game_id = ?
            ORDER BY gc.id
            "#,
        )?;
        let rows = stmt
            .query_map([session_id], stat_line_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    async fn race_reports(&self, session_id: i64) -> Result<Vec<RaceReport>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            r#"
            SELECT gc.id, p.name,
                   r.venue, r.gtyp, r.dir, r.numlaps, r.lapscomp,
                   r.pos, r.car, r.racetime, r.lap, r.rnk
            FROM race_reports r
            JOIN game_connections gc ON gc.id = r.game_connection_id
            JOIN persona_connections c ON c.id = gc.persona_connection_id
            JOIN personas p ON p.id = c.persona_id
            WHERE gc.game_id = ?
            ORDER BY gc.id
            "#,
        )?;
        let rows = stmt
            .query_map([session_id], |row| {
                Ok(RaceReport {
                    participation_id: row.get(0)?,
                    persona_name: row.get(1)?,
                    venue: row.get(2)?,
                    game_type: row.get(3)?,
                    direction: row.get(4)?,
                    laps: row.get(5)?,
                    laps_completed: row.get(6)?,
                    position: row.get(7)?,
                    car: row.get(8)?,
                    race_time: row.get(9)?,
                    best_lap: row.get(10)?,
                    ranked: row.get(11)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    async fn track_record(
        &self,
        vers: &str,
        venue: i64,
        direction: i64,
        metric: RecordMetric,
    ) -> Result<Option<i64>> {
        let column = match metric {
            RecordMetric::BestLap => "r.lap",
            RecordMetric::RaceTime => "r.racetime",
        };
        let sql = format!(
            "SELECT MIN({column}) FROM race_reports r \
             JOIN game_connections gc ON gc.id = r.game_connection_id \
             JOIN games g ON g.id = gc.game_id \
             WHERE g.vers = ?1 AND r.venue = ?2 AND r.dir = ?3 AND r.rnk = 1 AND {column} > 0"
        );
        let conn = self.conn.lock().await;
        let record = conn.query_row(&sql, params![vers, venue, direction], |row| row.get(0))?;
        Ok(record)
    }

    async fn hockey_reports(&self, session_id: i64) -> Result<Vec<HockeyReport>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            r#"
            SELECT gc.id, p.name, r.team, r.home, r.score, r.ot, r.ppg, r.ppo, r.venue
            FROM hockey_reports r
            JOIN game_connections gc ON gc.id = r.game_connection_id
            JOIN persona_connections c ON c.id = gc.persona_connection_id
            JOIN personas p ON p.id = c.persona_id
            WHERE gc.game_id = ?
            ORDER BY gc.id
            "#,
        )?;
        let rows = stmt
            .query_map([session_id], |row| {
                Ok(HockeyReport {
                    participation_id: row.get(0)?,
                    persona_name: row.get(1)?,
                    team: row.get(2)?,
                    home: row.get::<_, i64>(3)? == 1,
                    score: row.get(4)?,
                    overtime: row.get::<_, i64>(5)? == 1,
                    power_play_goals: row.get(6)?,
                    power_play_chances: row.get(7)?,
                    venue: row.get(8)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    async fn lobby_connections(&self, filter: &VersFilter) -> Result<Vec<ConnectionRecord>> {
        let mut params = Vec::new();
        let vers = vers_clause(&["c.vers"], filter, &mut params);
        let sql = format!(
            "SELECT {CONNECTION_COLUMNS} {CONNECTION_FROM} \
             WHERE c.is_host = 0 AND c.end_time IS NULL \
             AND NOT EXISTS (SELECT 1 FROM game_connections gc \
                             WHERE gc.persona_connection_id = c.id AND gc.end_time IS NULL){vers} \
             ORDER BY c.start_time, c.id"
        );
        self.query_connections(sql, params).await
    }

    async fn active_sessions(&self, filter: &VersFilter) -> Result<Vec<ActiveSession>> {
        let mut params = Vec::new();
        let vers = vers_clause(&["g.vers"], filter, &mut params);
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM games g \
             WHERE g.end_time IS NULL{vers} \
             ORDER BY g.start_time, g.id"
        );
        let sessions = self.query_sessions(sql, params).await?;

        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            r#"
            SELECT p.name, c.is_host
            FROM game_connections gc
            JOIN persona_connections c ON c.id = gc.persona_connection_id
            JOIN personas p ON p.id = c.persona_id
            WHERE gc.game_id = ? AND gc.end_time IS NULL
            ORDER BY c.is_host DESC, gc.start_time, gc.id
            "#,
        )?;

        let mut active = Vec::with_capacity(sessions.len());
        for session in sessions {
            let players = stmt
                .query_map([session.id], |row| {
                    Ok(SessionPlayer { persona_name: row.get(0)?, is_host: row.get(1)? })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            active.push(ActiveSession { session, players });
        }
        Ok(active)
    }

    async fn count_online(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM persona_connections WHERE is_host = 0 AND end_time IS NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    async fn count_in_session(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        let count = conn.query_row(
            r#"
            SELECT COUNT(*) FROM game_connections gc
            JOIN persona_connections c ON c.id = gc.persona_connection_id
            WHERE c.is_host = 0 AND gc.end_time IS NULL
            "#,
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

#[async_trait]
impl SubscriptionStore for SqliteStore {
    /// Rows with an unknown type or genre are skipped with a warning
    async fn list_subscriptions(&self) -> Result<Vec<Subscription>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT guild_id, channel_id, subscription_type, game_genre \
             FROM channel_subscriptions ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut subscriptions = Vec::with_capacity(rows.len());
        for (guild_id, channel_id, kind, genre) in rows {
            match (kind.parse::<SubscriptionType>(), genre.parse::<Genre>()) {
                (Ok(subscription_type), Ok(genre)) => subscriptions.push(Subscription {
                    guild_id,
                    channel_id,
                    subscription_type,
                    genre,
                }),
                (Err(e), _) | (_, Err(e)) => {
                    log::warn!("⚠️  Skipping subscription of guild {}: {}", guild_id, e);
                }
            }
        }
        Ok(subscriptions)
    }

    async fn upsert_subscription(&self, subscription: &Subscription) -> Result<()> {
        let now = Utc::now().timestamp_micros();
        let conn = self.conn.lock().await;
        conn.execute(
            r#"
            INSERT INTO channel_subscriptions (
                guild_id, channel_id, subscription_type, game_genre, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(guild_id, subscription_type, game_genre) DO UPDATE SET
                channel_id = excluded.channel_id,
                updated_at = excluded.updated_at
            "#,
            params![
                subscription.guild_id,
                subscription.channel_id,
                subscription.subscription_type.as_str(),
                subscription.genre.as_str(),
                now,
                now,
            ],
        )?;
        Ok(())
    }

    async fn delete_subscription(
        &self,
        guild_id: &str,
        subscription_type: SubscriptionType,
        genre: Genre,
    ) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "DELETE FROM channel_subscriptions \
             WHERE guild_id = ? AND subscription_type = ? AND game_genre = ?",
            params![guild_id, subscription_type.as_str(), genre.as_str()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::NamedTempFile;

    /// Helper to create a test database with schema
    fn create_test_db() -> (NamedTempFile, SqliteStore) {
        let temp_file = NamedTempFile::new().unwrap();
        let store = SqliteStore::initialize(temp_file.path().to_str().unwrap(), "sql").unwrap();
        (temp_file, store)
    }

    fn us(s: u32) -> i64 {
        at(s).timestamp_micros()
    }

    fn at(s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, s).unwrap()
    }

    /// persona + connection rows; `end` None = still connected
    fn insert_connection(conn: &Connection, id: i64, name: &str, vers: &str, start: i64, end: Option<i64>, host: bool) {
        conn.execute(
            "INSERT OR IGNORE INTO personas (id, name) VALUES (?, ?)",
            params![id, name],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO persona_connections (id, persona_id, vers, start_time, end_time, is_host) \
             VALUES (?, ?, ?, ?, ?, ?)",
            params![id, id, vers, start, end, host],
        )
        .unwrap();
    }

    fn insert_game(conn: &Connection, id: i64, vers: &str, start: i64, end: Option<i64>) {
        conn.execute(
            "INSERT INTO games (id, vers, name, params, pass, max_size, started, start_time, end_time) \
             VALUES (?, ?, ?, '8,6d6170', NULL, 16, 1, ?, ?)",
            params![id, vers, format!("game {}", id), start, end],
        )
        .unwrap();
    }

    fn insert_participation(conn: &Connection, id: i64, game: i64, connection: i64, start: i64, end: Option<i64>) {
        conn.execute(
            "INSERT INTO game_connections (id, game_id, persona_connection_id, start_time, end_time) \
             VALUES (?, ?, ?, ?, ?)",
            params![id, game, connection, start, end],
        )
        .unwrap();
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let temp = NamedTempFile::new().unwrap();
        let mut conn = Connection::open(temp.path()).unwrap();

        run_schema_migrations(&mut conn, "sql").unwrap();
        run_schema_migrations(&mut conn, "sql").unwrap();

        assert!(run_schema_migrations(&mut conn, "no_such_dir").is_err());
    }

    #[tokio::test]
    async fn test_watermark_round_trip() {
        let (_temp, store) = create_test_db();

        assert_eq!(store.get_watermark("LAST_FETCH_TIME").await.unwrap(), None);

        let first = Watermark::new(at(10));
        store.set_watermark("LAST_FETCH_TIME", first).await.unwrap();
        let second = Watermark::new(at(20));
        store.set_watermark("LAST_FETCH_TIME", second).await.unwrap();

        assert_eq!(store.get_watermark("LAST_FETCH_TIME").await.unwrap(), Some(second));
        assert_eq!(store.get_watermark("OTHER").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_connects_window_is_half_open_and_excludes_hosts() {
        let (_temp, store) = create_test_db();
        {
            let conn = store.conn.lock().await;
            insert_connection(&conn, 1, "alpha", "PSP/NHL07", us(0), None, false);
            insert_connection(&conn, 2, "bravo", "PSP/NHL07", us(5), Some(us(8)), false);
            insert_connection(&conn, 3, "host", "PSP/MOHGPS071", us(5), None, true);
            insert_connection(&conn, 4, "late", "PSP/NHL07", us(10), None, false);
            insert_connection(&conn, 5, "fifa", "PSP/FIFA08", us(6), None, false);
        }
        let window = TimeWindow::new(at(0), at(10));

        let connects = store.connects(window, &VersFilter::Any).await.unwrap();
        let ids: Vec<i64> = connects.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 5]);

        let nhl_only = VersFilter::Only(vec!["PSP/NHL07".to_string()]);
        let connects = store.connects(window, &nhl_only).await.unwrap();
        assert_eq!(connects.len(), 2);
        assert_eq!(connects[1].persona_name, "bravo");

        let disconnects = store.disconnects(window, &VersFilter::Any).await.unwrap();
        assert_eq!(disconnects.len(), 1);
        assert_eq!(disconnects[0].end_time, Some(at(8)));

        let nothing = VersFilter::Only(vec![]);
        assert!(store.connects(window, &nothing).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_participation_ending_at_returns_latest() {
        let (_temp, store) = create_test_db();
        {
            let conn = store.conn.lock().await;
            insert_connection(&conn, 1, "alpha", "PSP/MOH07", us(0), None, false);
            insert_game(&conn, 10, "PSP/MOHGPS071", us(0), Some(us(5)));
            insert_game(&conn, 11, "PSP/MOHGPS071", us(1), Some(us(5)));
            insert_game(&conn, 12, "PSP/MOHGPS071", us(5), None);
            insert_participation(&conn, 100, 10, 1, us(0), Some(us(5)));
            insert_participation(&conn, 101, 11, 1, us(1), Some(us(5)));
            insert_participation(&conn, 102, 12, 1, us(5), None);
        }

        let joins = store
            .session_joins(TimeWindow::new(at(5), at(6)), &VersFilter::Any)
            .await
            .unwrap();
        assert_eq!(joins.len(), 1);
        assert_eq!(joins[0].session.id, 12);
        assert_eq!(joins[0].connection.persona_name, "alpha");

        let found = store.participation_ending_at(&joins[0].participation).await.unwrap().unwrap();
        assert_eq!(found.participation.id, 101);
        assert_eq!(found.session.end_time, Some(at(5)));

        let mut later = joins[0].participation.clone();
        later.start_time = at(6);
        assert!(store.participation_ending_at(&later).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_participation_ending_at_skips_the_zero_length_join() {
        let (_temp, store) = create_test_db();
        {
            let conn = store.conn.lock().await;
            insert_connection(&conn, 1, "alpha", "PSP/MOH07", us(0), None, false);
            insert_game(&conn, 10, "PSP/MOHGPS071", us(0), Some(us(30)));
            insert_game(&conn, 11, "PSP/MOHGPS071", us(30), Some(us(30)));
            insert_participation(&conn, 100, 10, 1, us(1), Some(us(30)));
            insert_participation(&conn, 101, 11, 1, us(30), Some(us(30)));
        }

        let joins = store
            .session_joins(TimeWindow::new(at(30), at(31)), &VersFilter::Any)
            .await
            .unwrap();
        assert_eq!(joins.len(), 1);
        let join = &joins[0].participation;
        assert_eq!(join.id, 101);

        let found = store.participation_ending_at(join).await.unwrap().unwrap();
        assert_eq!(found.participation.id, 100);
        assert_eq!(found.session.id, 10);

        // With no other participation the join is not its own predecessor
        {
            let conn = store.conn.lock().await;
            conn.execute("DELETE FROM game_connections WHERE id = 100", []).unwrap();
        }
        assert!(store.participation_ending_at(join).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stat_lines_carry_host_flag() {
        let (_temp, store) = create_test_db();
        {
            let conn = store.conn.lock().await;
            insert_connection(&conn, 1, "alpha", "PSP/MOH07", us(0), None, false);
            insert_connection(&conn, 2, "host", "PSP/MOHGPS071", us(0), None, true);
            insert_game(&conn, 10, "PSP/MOHGPS071", us(0), Some(us(30)));
            insert_participation(&conn, 100, 10, 1, us(1), Some(us(30)));
            insert_participation(&conn, 101, 10, 2, us(0), Some(us(30)));
            conn.execute(
                "INSERT INTO game_reports (game_connection_id, kills, deaths, mp40_shots) VALUES (100, 7, 2, 40)",
                [],
            )
            .unwrap();
            conn.execute("INSERT INTO game_reports (game_connection_id) VALUES (101)", [])
                .unwrap();
        }

        let lines = store.stat_lines(10).await.unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].persona_name, "alpha");
        assert_eq!(lines[0].counters.kills, 7);
        assert_eq!(lines[0].counters.weapons.mp40, 40);
        assert!(!lines[0].is_host);
        assert!(lines[1].is_host);

        let ended = store
            .sessions_ended(TimeWindow::new(at(0), at(31)), &VersFilter::Any)
            .await
            .unwrap();
        assert_eq!(ended.len(), 1);
        assert!(!ended[0].has_password);
    }

    #[tokio::test]
    async fn test_lobby_and_active_sessions() {
        let (_temp, store) = create_test_db();
        {
            let conn = store.conn.lock().await;
            insert_connection(&conn, 1, "lobby", "PSP/NHL07", us(0), None, false);
            insert_connection(&conn, 2, "player", "PSP/NHL07", us(0), None, false);
            insert_connection(&conn, 3, "host", "PSP/NHL07", us(0), None, true);
            insert_game(&conn, 10, "PSP/NHL07", us(1), None);
            insert_participation(&conn, 100, 10, 2, us(2), None);
            insert_participation(&conn, 101, 10, 3, us(1), None);
        }
        let nhl = VersFilter::Only(vec!["PSP/NHL07".to_string()]);

        let lobby = store.lobby_connections(&nhl).await.unwrap();
        assert_eq!(lobby.len(), 1);
        assert_eq!(lobby[0].persona_name, "lobby");

        let active = store.active_sessions(&nhl).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].players[0], SessionPlayer { persona_name: "host".to_string(), is_host: true });
        assert_eq!(active[0].players[1].persona_name, "player");

        assert_eq!(store.count_online().await.unwrap(), 2);
        assert_eq!(store.count_in_session().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_subscription_upsert_replaces_channel() {
        let (_temp, store) = create_test_db();
        let mut sub = Subscription {
            guild_id: "guildA".to_string(),
            channel_id: "chan1".to_string(),
            subscription_type: SubscriptionType::Status,
            genre: Genre::Racing,
        };

        store.upsert_subscription(&sub).await.unwrap();
        sub.channel_id = "chan2".to_string();
        store.upsert_subscription(&sub).await.unwrap();

        let all = store.list_subscriptions().await.unwrap();
        assert_eq!(all, vec![sub.clone()]);

        store
            .delete_subscription("guildA", SubscriptionType::Status, Genre::Racing)
            .await
            .unwrap();
        assert!(store.list_subscriptions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_race_reports_and_track_record() {
        let (_temp, store) = create_test_db();
        {
            let conn = store.conn.lock().await;
            insert_connection(&conn, 1, "speedy", "PSP/NFS07", us(0), None, false);
            insert_connection(&conn, 2, "drifter", "PSP/NFS07", us(0), None, false);
            insert_game(&conn, 10, "PSP/NFS07", us(0), Some(us(20)));
            insert_game(&conn, 11, "PSP/NFS07", us(20), Some(us(40)));
            insert_game(&conn, 12, "PSP/NFS08", us(0), Some(us(20)));
            insert_participation(&conn, 100, 10, 1, us(0), Some(us(20)));
            insert_participation(&conn, 101, 11, 1, us(20), Some(us(40)));
            insert_participation(&conn, 102, 11, 2, us(20), Some(us(40)));
            insert_participation(&conn, 103, 12, 2, us(0), Some(us(20)));
            conn.execute_batch(
                "INSERT INTO race_reports (game_connection_id, venue, dir, pos, car, racetime, lap, rnk) \
                     VALUES (100, 1, 0, 1, 14, 95000, 31000, 1); \
                 INSERT INTO race_reports (game_connection_id, venue, dir, numlaps, lapscomp, pos, racetime, lap, rnk) \
                     VALUES (101, 1, 0, 3, 3, 2, 96000, 29000, 0); \
                 INSERT INTO race_reports (game_connection_id, venue, dir, pos, racetime, lap, rnk) \
                     VALUES (102, 1, 0, 1, 94000, 30000, 1); \
                 INSERT INTO race_reports (game_connection_id, venue, dir, pos, lap, rnk) \
                     VALUES (103, 1, 0, 1, 1000, 1);",
            )
            .unwrap();
        }

        let reports = store.race_reports(11).await.unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].participation_id, 101);
        assert_eq!(reports[0].persona_name, "speedy");
        assert_eq!(reports[0].laps, Some(3));
        assert_eq!(reports[0].laps_completed, Some(3));
        assert_eq!(reports[0].car, None);
        assert_eq!(reports[1].race_time, Some(94000));
        assert_eq!(reports[1].ranked, Some(1));

        // Unranked laps and other games do not count
        assert_eq!(
            store.track_record("PSP/NFS07", 1, 0, RecordMetric::BestLap).await.unwrap(),
            Some(30000)
        );
        assert_eq!(
            store.track_record("PSP/NFS07", 1, 0, RecordMetric::RaceTime).await.unwrap(),
            Some(94000)
        );
        assert_eq!(store.track_record("PSP/NFS07", 1, 1, RecordMetric::BestLap).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_hockey_reports_and_sysflags() {
        let (_temp, store) = create_test_db();
        {
            let conn = store.conn.lock().await;
            insert_connection(&conn, 1, "alpha", "PSP/NHL07", us(0), None, false);
            insert_connection(&conn, 2, "bravo", "PSP/NHL07", us(0), None, false);
            insert_game(&conn, 10, "PSP/NHL07", us(0), Some(us(30)));
            conn.execute("UPDATE games SET sysflags = '262144' WHERE id = 10", []).unwrap();
            insert_participation(&conn, 100, 10, 1, us(0), Some(us(30)));
            insert_participation(&conn, 101, 10, 2, us(0), Some(us(30)));
            conn.execute_batch(
                "INSERT INTO hockey_reports (game_connection_id, team, home, score, ot, ppg, ppo, venue) \
                     VALUES (100, 2, 1, 3, 1, 1, 4, 2); \
                 INSERT INTO hockey_reports (game_connection_id, team, score) VALUES (101, 10, 2);",
            )
            .unwrap();
        }

        let reports = store.hockey_reports(10).await.unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(
            reports[0],
            HockeyReport {
                participation_id: 100,
                persona_name: "alpha".to_string(),
                team: 2,
                home: true,
                score: 3,
                overtime: true,
                power_play_goals: 1,
                power_play_chances: 4,
                venue: 2,
            }
        );
        assert!(!reports[1].home);
        assert!(!reports[1].overtime);

        let ended = store
            .sessions_ended(TimeWindow::new(at(0), at(31)), &VersFilter::Any)
            .await
            .unwrap();
        assert_eq!(ended[0].sysflags.as_deref(), Some("262144"));
    }
}
