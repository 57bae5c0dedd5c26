//! Scoreboard ranking, outcome and pagination
//!
//! Free-for-all sessions list every ranked player on one board; team
//! sessions split players by side and pair the i-th chunk of each side on
//! the i-th page. Pages hold at most `page_size` rows per list.

use super::aggregator::{is_interesting, session_stats};
use super::catalog::Genre;
use super::error::Result;
use super::reader::ActivityReader;
use super::router::genre_for_vers;
use super::teams::{Side, TeamClassifier};
use super::types::{AggregatedPlayerStat, SessionRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Reverse;

pub const DEFAULT_PAGE_SIZE: usize = 16;

/// Mode code of free-for-all sessions; every other code is team play
const FREE_FOR_ALL_MODE: &str = "8";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    FreeForAll,
    Team,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FriendlyFire {
    Off,
    On,
    Reverse,
}

/// Session settings shown above the rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreboardHeader {
    pub title: String,
    pub mode: Mode,
    pub map_code: Option<String>,
    pub friendly_fire: FriendlyFire,
    pub aim_assist: bool,
    pub ranked: bool,
    pub has_password: bool,
    pub started_at: DateTime<Utc>,
    pub duration_minutes: i64,
}

impl ScoreboardHeader {
    /// Parse the comma-separated parameter blob of a session
    ///
    /// Layout: mode, map, friendly fire, aim assist, ..., ranked (index 8).
    pub fn from_session(session: &SessionRecord) -> Self {
        let params: Vec<&str> = session.params.split(',').map(str::trim).collect();
        let param = |i: usize| params.get(i).copied().filter(|p| !p.is_empty());

        let mode = match param(0) {
            Some(FREE_FOR_ALL_MODE) => Mode::FreeForAll,
            _ => Mode::Team,
        };
        let friendly_fire = match param(2) {
            Some("1") => FriendlyFire::On,
            Some("2") => FriendlyFire::Reverse,
            _ => FriendlyFire::Off,
        };
        let duration_minutes = session
            .end_time
            .map(|end| (end - session.start_time).num_minutes())
            .unwrap_or(0);

        Self {
            title: clean_title(&session.name),
            mode,
            map_code: param(1).map(str::to_string),
            friendly_fire,
            aim_assist: param(3) == Some("1"),
            ranked: param(8) == Some("1"),
            has_password: session.has_password,
            started_at: session.start_time,
            duration_minutes,
        }
    }
}

/// Session name without quotes or control characters
pub fn clean_title(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '"' && !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Title of page `index` (1-based) out of `count`
pub fn page_label(title: &str, index: usize, count: usize) -> String {
    if count > 1 {
        format!("{} ({}/{})", title, index, count)
    } else {
        title.to_string()
    }
}

/// Split rows into consecutive chunks of at most `size`
pub fn chunk<T: Clone>(rows: &[T], size: usize) -> Vec<Vec<T>> {
    rows.chunks(size.max(1)).map(|c| c.to_vec()).collect()
}

/// Rows worth listing, best score first
///
/// Players with no kills and no deaths are hidden. Equal scores keep
/// their input order.
pub fn rank(rows: &[AggregatedPlayerStat]) -> Vec<AggregatedPlayerStat> {
    let mut ranked: Vec<AggregatedPlayerStat> = rows
        .iter()
        .filter(|r| r.stats.kills > 0 || r.stats.deaths > 0)
        .cloned()
        .collect();
    ranked.sort_by_key(|r| Reverse(r.stats.score()));
    ranked
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Winner(String),
    Team(Side),
    Draw,
}

impl Outcome {
    pub fn describe(&self) -> String {
        match self {
            Outcome::Winner(name) => format!("{} Wins the Battle", name),
            Outcome::Team(side) => format!("{} Win", side),
            Outcome::Draw => "Draw Battle".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TeamTotals {
    pub kills: i64,
    pub deaths: i64,
}

impl TeamTotals {
    fn of(rows: &[AggregatedPlayerStat]) -> Self {
        rows.iter().fold(Self::default(), |acc, r| Self {
            kills: acc.kills + r.stats.kills,
            deaths: acc.deaths + r.stats.deaths,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PageRows {
    FreeForAll(Vec<AggregatedPlayerStat>),
    Team {
        axis: Vec<AggregatedPlayerStat>,
        allies: Vec<AggregatedPlayerStat>,
    },
}

impl PageRows {
    pub fn len(&self) -> usize {
        match self {
            PageRows::FreeForAll(rows) => rows.len(),
            PageRows::Team { axis, allies } => axis.len() + allies.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreboardPage {
    /// 1-based
    pub index: usize,
    pub count: usize,
    pub label: String,
    pub rows: PageRows,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scoreboard {
    pub session_id: i64,
    pub genre: Genre,
    pub header: ScoreboardHeader,
    pub outcome: Outcome,
    /// (axis, allies), team play only
    pub team_totals: Option<(TeamTotals, TeamTotals)>,
    pub pages: Vec<ScoreboardPage>,
}

impl Scoreboard {
    pub fn total_rows(&self) -> usize {
        self.pages.iter().map(|p| p.rows.len()).sum()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScoreboardBuilder {
    pub page_size: usize,
    pub classifier: TeamClassifier,
}

impl Default for ScoreboardBuilder {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            classifier: TeamClassifier::default(),
        }
    }
}

impl ScoreboardBuilder {
    pub fn new(page_size: usize, classifier: TeamClassifier) -> Self {
        Self { page_size: page_size.max(1), classifier }
    }

    /// Board for a finished session's aggregated rows; None if uninteresting
    pub fn build(&self, session: &SessionRecord, rows: &[AggregatedPlayerStat]) -> Option<Scoreboard> {
        if !is_interesting(rows) {
            return None;
        }

        let header = ScoreboardHeader::from_session(session);
        let ranked = rank(rows);

        let (outcome, team_totals, pages) = match header.mode {
            Mode::FreeForAll => {
                let outcome = ranked
                    .iter()
                    .find(|r| r.stats.wins > 0)
                    .map(|r| Outcome::Winner(clean_title(&r.persona_name)))
                    .unwrap_or(Outcome::Draw);
                let pages = self.free_for_all_pages(&header.title, &ranked);
                (outcome, None, pages)
            }
            Mode::Team => {
                let (axis, allies): (Vec<_>, Vec<_>) = ranked
                    .into_iter()
                    .partition(|r| self.classifier.classify(&r.stats) == Side::Axis);

                let outcome = if axis.iter().any(|r| r.stats.wins > 0) {
                    Outcome::Team(Side::Axis)
                } else if allies.iter().any(|r| r.stats.wins > 0) {
                    Outcome::Team(Side::Allies)
                } else {
                    Outcome::Draw
                };
                let totals = (TeamTotals::of(&axis), TeamTotals::of(&allies));
                let pages = self.team_pages(&header.title, &axis, &allies);
                (outcome, Some(totals), pages)
            }
        };

        Some(Scoreboard {
            session_id: session.id,
            genre: genre_for_vers(&session.vers),
            header,
            outcome,
            team_totals,
            pages,
        })
    }

    /// Read, aggregate and build in one step
    pub async fn build_for_session(
        &self,
        reader: &dyn ActivityReader,
        session: &SessionRecord,
    ) -> Result<Option<Scoreboard>> {
        Ok(session_stats(reader, session)
            .await?
            .and_then(|rows| self.build(session, &rows)))
    }

    fn free_for_all_pages(&self, title: &str, ranked: &[AggregatedPlayerStat]) -> Vec<ScoreboardPage> {
        let chunks = chunk(ranked, self.page_size);
        let count = chunks.len();
        chunks
            .into_iter()
            .enumerate()
            .map(|(i, rows)| ScoreboardPage {
                index: i + 1,
                count,
                label: page_label(title, i + 1, count),
                rows: PageRows::FreeForAll(rows),
            })
            .collect()
    }

    fn team_pages(
        &self,
        title: &str,
        axis: &[AggregatedPlayerStat],
        allies: &[AggregatedPlayerStat],
    ) -> Vec<ScoreboardPage> {
        let mut axis_chunks = chunk(axis, self.page_size).into_iter();
        let mut allies_chunks = chunk(allies, self.page_size).into_iter();
        let count = axis_chunks.len().max(allies_chunks.len());

        (1..=count)
            .map(|index| ScoreboardPage {
                index,
                count,
                label: page_label(title, index, count),
                rows: PageRows::Team {
                    axis: axis_chunks.next().unwrap_or_default(),
                    allies: allies_chunks.next().unwrap_or_default(),
                },
            })
            .collect()
    }
}
