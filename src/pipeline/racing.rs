//! Race results for finished racing sessions
//!
//! Racers are listed by finishing position. Most Wanted reports position 0
//! for the loser and never sends a race time, so its best time is the race
//! time; the later games report a best lap instead. A best time equal to
//! the track record of a ranked race is marked with a trophy.

use super::catalog::Genre;
use super::error::Result;
use super::reader::ActivityReader;
use super::router::genre_for_vers;
use super::scoreboard::clean_title;
use super::tables::{self, MOST_WANTED};
use super::types::{RaceReport, RecordMetric, SessionRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Undercover gateway races have no lap count to complete
const GATEWAY_GAME_TYPE: i64 = 15;

/// Position shown for a racer reported without one
const UNPLACED_POSITION: i64 = 2;

pub const TROPHY: &str = "🏆";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    /// 1 is reverse, anything else forward
    pub fn from_code(code: i64) -> Self {
        if code == 1 {
            Direction::Reverse
        } else {
            Direction::Forward
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "Forward",
            Direction::Reverse => "Reverse",
        }
    }
}

/// Milliseconds as "m:ss.mmm"; a missing or zero time is a DNF
pub fn format_time(ms: Option<i64>) -> String {
    match ms {
        Some(ms) if ms != 0 => {
            let seconds = ms / 1000;
            format!("{}:{:02}.{:03}", seconds / 60, seconds % 60, ms % 1000)
        }
        _ => "DNF".to_string(),
    }
}

/// Time a game's track records are kept on
pub fn record_metric(vers: &str) -> RecordMetric {
    if vers == MOST_WANTED {
        RecordMetric::RaceTime
    } else {
        RecordMetric::BestLap
    }
}

/// At least one racer has a race time or a position
pub fn has_results(reports: &[RaceReport]) -> bool {
    reports
        .iter()
        .any(|r| r.race_time.is_some_and(|t| t > 0) || r.position.is_some_and(|p| p > 0))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaceResult {
    pub position: i64,
    pub player: String,
    pub car: String,
    /// None for games that do not report race times
    pub time: Option<String>,
    /// Formatted best time, "-" when none
    pub best_time: String,
    pub track_record: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaceBoard {
    pub session_id: i64,
    pub genre: Genre,
    pub title: String,
    pub track: String,
    pub direction: Option<Direction>,
    pub ranked: bool,
    pub finished_at: DateTime<Utc>,
    pub winner: Option<String>,
    pub results: Vec<RaceResult>,
}

/// Most Wanted losers (position 0) sort as second; in the other games
/// unplaced racers go last
fn sort_key(report: &RaceReport, most_wanted: bool) -> i64 {
    match report.position.unwrap_or(0) {
        p if p > 0 => p,
        _ if most_wanted => UNPLACED_POSITION,
        _ => i64::MAX,
    }
}

fn result_row(
    vers: &str,
    report: &RaceReport,
    ranked: bool,
    record: Option<i64>,
) -> RaceResult {
    let most_wanted = vers == MOST_WANTED;

    let time = if most_wanted {
        None
    } else if report.laps_completed != report.laps && report.game_type != Some(GATEWAY_GAME_TYPE) {
        Some("DNF".to_string())
    } else {
        Some(format_time(report.race_time))
    };

    let best = record_metric(vers).of(report).filter(|t| *t > 0);
    let track_record = ranked && best.is_some() && best == record;
    let best_time = match best {
        Some(t) if track_record => format!("{} {}", TROPHY, format_time(Some(t))),
        Some(t) => format_time(Some(t)),
        None => "-".to_string(),
    };

    RaceResult {
        position: report.position.filter(|p| *p > 0).unwrap_or(UNPLACED_POSITION),
        player: clean_title(&report.persona_name),
        car: tables::car_name(vers, report.car).to_string(),
        time,
        best_time,
        track_record,
    }
}

/// Board for a finished race; None when nobody finished or placed
///
/// Track, direction and ranking come from the first report. `record` is
/// the best time on record for that track.
pub fn build(session: &SessionRecord, reports: &[RaceReport], record: Option<i64>) -> Option<RaceBoard> {
    if !has_results(reports) {
        return None;
    }
    let first = reports.first()?;
    let vers = session.vers.as_str();
    let ranked = first.ranked == Some(1);

    let mut sorted: Vec<&RaceReport> = reports.iter().collect();
    sorted.sort_by_key(|r| sort_key(r, vers == MOST_WANTED));

    let winner = sorted
        .iter()
        .find(|r| r.position == Some(1))
        .map(|r| clean_title(&r.persona_name));

    Some(RaceBoard {
        session_id: session.id,
        genre: genre_for_vers(vers),
        title: clean_title(&session.name),
        track: tables::track_name(vers, first.venue),
        direction: first.direction.map(Direction::from_code),
        ranked,
        finished_at: session.end_time.unwrap_or(session.start_time),
        winner,
        results: sorted.into_iter().map(|r| result_row(vers, r, ranked, record)).collect(),
    })
}

/// Read the race results (and the track record of ranked races) and build
pub async fn build_for_session(
    reader: &dyn ActivityReader,
    session: &SessionRecord,
) -> Result<Option<RaceBoard>> {
    let reports = reader.race_reports(session.id).await?;
    if !has_results(&reports) {
        log::debug!(
            "Session {} ({}) skipped: {} race reports, none finished",
            session.id,
            session.name,
            reports.len()
        );
        return Ok(None);
    }

    let record = match reports.first() {
        Some(RaceReport { venue: Some(venue), direction: Some(direction), ranked: Some(1), .. }) => {
            reader
                .track_record(&session.vers, *venue, *direction, record_metric(&session.vers))
                .await?
        }
        _ => None,
    };

    Ok(build(session, &reports, record))
}
