//! Pipeline configuration from environment variables

use super::teams::Side;
use std::env;
use std::time::Duration;

/// Configuration for the pipeline runtime
///
/// Loaded from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Path to SQLite database file
    pub db_path: String,

    /// Directory holding the `*.sql` schema files
    pub schema_dir: String,

    /// Fixed delay between the end of one tick and the start of the next
    pub poll_interval_ms: u64,

    /// How far back the first window reaches when no watermark is stored
    pub bootstrap_lookback_ms: u64,

    /// Key of the persisted watermark
    pub watermark_name: String,

    pub events_enabled: bool,

    pub scoreboards_enabled: bool,

    /// Periodic per-genre status snapshots
    pub status_enabled: bool,

    pub status_interval_ms: u64,

    /// Pause after every delivered item
    pub delivery_delay_ms: u64,

    /// Max deliveries in flight
    pub delivery_parallelism: usize,

    /// Rows per scoreboard page
    pub page_size: usize,

    /// Side assigned when the weapon vote is tied
    pub team_tie_side: Side,
}

impl PipelineConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `LOBBYWATCH_DB_PATH` (default: lobbywatch.db)
    /// - `LOBBYWATCH_SCHEMA_DIR` (default: sql)
    /// - `POLL_INTERVAL_MS` (default: 10000)
    /// - `BOOTSTRAP_LOOKBACK_MS` (default: 10000)
    /// - `WATERMARK_NAME` (default: LAST_FETCH_TIME)
    /// - `EVENTS_ENABLED` (default: true)
    /// - `SCOREBOARDS_ENABLED` (default: true)
    /// - `STATUS_ENABLED` (default: false)
    /// - `STATUS_INTERVAL_MS` (default: 60000)
    /// - `DELIVERY_DELAY_MS` (default: 1000)
    /// - `DELIVERY_PARALLELISM` (default: 1)
    /// - `SCOREBOARD_PAGE_SIZE` (default: 16)
    /// - `TEAM_TIE_SIDE` (default: allies)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            db_path: env::var("LOBBYWATCH_DB_PATH").unwrap_or(defaults.db_path),

            schema_dir: env::var("LOBBYWATCH_SCHEMA_DIR").unwrap_or(defaults.schema_dir),

            poll_interval_ms: parse_var("POLL_INTERVAL_MS").unwrap_or(defaults.poll_interval_ms),

            bootstrap_lookback_ms: parse_var("BOOTSTRAP_LOOKBACK_MS")
                .unwrap_or(defaults.bootstrap_lookback_ms),

            watermark_name: env::var("WATERMARK_NAME").unwrap_or(defaults.watermark_name),

            events_enabled: parse_var("EVENTS_ENABLED").unwrap_or(defaults.events_enabled),

            scoreboards_enabled: parse_var("SCOREBOARDS_ENABLED")
                .unwrap_or(defaults.scoreboards_enabled),

            status_enabled: parse_var("STATUS_ENABLED").unwrap_or(defaults.status_enabled),

            status_interval_ms: parse_var("STATUS_INTERVAL_MS")
                .unwrap_or(defaults.status_interval_ms),

            delivery_delay_ms: parse_var("DELIVERY_DELAY_MS").unwrap_or(defaults.delivery_delay_ms),

            delivery_parallelism: parse_var::<usize>("DELIVERY_PARALLELISM")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.delivery_parallelism),

            page_size: parse_var::<usize>("SCOREBOARD_PAGE_SIZE")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.page_size),

            team_tie_side: parse_var("TEAM_TIE_SIDE").unwrap_or(defaults.team_tie_side),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn bootstrap_lookback(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.bootstrap_lookback_ms as i64)
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_millis(self.status_interval_ms)
    }

    pub fn delivery_delay(&self) -> Duration {
        Duration::from_millis(self.delivery_delay_ms)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            db_path: "lobbywatch.db".to_string(),
            schema_dir: "sql".to_string(),
            poll_interval_ms: 10_000,
            bootstrap_lookback_ms: 10_000,
            watermark_name: "LAST_FETCH_TIME".to_string(),
            events_enabled: true,
            scoreboards_enabled: true,
            status_enabled: false,
            status_interval_ms: 60_000,
            delivery_delay_ms: 1_000,
            delivery_parallelism: 1,
            page_size: 16,
            team_tie_side: Side::Allies,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse().ok())
}
