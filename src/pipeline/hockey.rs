//! Head-to-head hockey box scores
//!
//! A hockey match is one player against another, so a board needs exactly
//! two reports and at least one goal. The ranked flag lives in the
//! session's system flags and the league in its parameter blob.

use super::catalog::Genre;
use super::error::Result;
use super::reader::ActivityReader;
use super::router::genre_for_vers;
use super::scoreboard::clean_title;
use super::tables;
use super::types::{HockeyReport, SessionRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// System flag bit set on ranked matches
pub const RANKED_FLAG_BIT: u32 = 18;

/// Index of the league letter in the parameter blob
const LEAGUE_PARAM_INDEX: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum League {
    Nhl,
    National,
    Elitserien,
    SmLiiga,
    Del,
    Extraliga,
}

impl League {
    /// Unknown letters and short blobs read as NHL
    pub fn from_params(params: &str) -> Self {
        match params.chars().nth(LEAGUE_PARAM_INDEX) {
            Some('B') => League::National,
            Some('C') => League::Elitserien,
            Some('D') => League::SmLiiga,
            Some('E') => League::Del,
            Some('F') => League::Extraliga,
            _ => League::Nhl,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            League::Nhl => "NHL",
            League::National => "NATIONAL",
            League::Elitserien => "ELITSERIEN",
            League::SmLiiga => "SM-LIIGA",
            League::Del => "DEL",
            League::Extraliga => "EXTRALIGA",
        }
    }
}

pub fn is_ranked(sysflags: Option<&str>) -> bool {
    let Some(raw) = sysflags.filter(|s| !s.is_empty()) else {
        return false;
    };
    match raw.parse::<i64>() {
        Ok(flags) => flags & (1 << RANKED_FLAG_BIT) != 0,
        Err(_) => {
            log::warn!("⚠️  Could not parse sysflags: {}", raw);
            false
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HockeySide {
    pub player: String,
    pub team_id: i64,
    pub team: String,
    pub score: i64,
    /// "goals/chances"
    pub power_play: String,
}

impl HockeySide {
    fn from_report(report: &HockeyReport) -> Self {
        Self {
            player: clean_title(&report.persona_name),
            team_id: report.team,
            team: tables::team_name(report.team).to_string(),
            score: report.score,
            power_play: format!("{}/{}", report.power_play_goals, report.power_play_chances),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HockeyBoard {
    pub session_id: i64,
    pub genre: Genre,
    pub title: String,
    pub home: HockeySide,
    pub away: HockeySide,
    pub overtime: bool,
    pub ranked: bool,
    pub league: League,
    /// Home arena id
    pub venue: i64,
    pub finished_at: DateTime<Utc>,
}

impl HockeyBoard {
    /// None on a tied score
    pub fn winner(&self) -> Option<&HockeySide> {
        match self.home.score.cmp(&self.away.score) {
            std::cmp::Ordering::Greater => Some(&self.home),
            std::cmp::Ordering::Less => Some(&self.away),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Board for a finished match; None unless there are two reports and a goal
///
/// Home is the first report flagged home, else the first report; away is
/// the other one.
pub fn build(session: &SessionRecord, reports: &[HockeyReport]) -> Option<HockeyBoard> {
    let [first, second] = reports else {
        return None;
    };
    if first.score <= 0 && second.score <= 0 {
        return None;
    }

    let (home, away) = if !first.home && second.home {
        (second, first)
    } else {
        (first, second)
    };

    Some(HockeyBoard {
        session_id: session.id,
        genre: genre_for_vers(&session.vers),
        title: clean_title(&session.name),
        home: HockeySide::from_report(home),
        away: HockeySide::from_report(away),
        overtime: home.overtime || away.overtime,
        ranked: is_ranked(session.sysflags.as_deref()),
        league: League::from_params(&session.params),
        venue: home.venue,
        finished_at: session.end_time.unwrap_or(session.start_time),
    })
}

pub async fn build_for_session(
    reader: &dyn ActivityReader,
    session: &SessionRecord,
) -> Result<Option<HockeyBoard>> {
    let reports = reader.hockey_reports(session.id).await?;
    let board = build(session, &reports);
    if board.is_none() {
        log::debug!(
            "Session {} ({}) skipped: {} hockey reports, goals={}",
            session.id,
            session.name,
            reports.len(),
            reports.iter().map(|r| r.score).sum::<i64>()
        );
    }
    Ok(board)
}
