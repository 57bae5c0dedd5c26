//! Match boards of every genre that has one
//!
//! Team shooters, racing and hockey each produce their own board type.
//! The poller and the notifiers only deal with `MatchBoard`.

use super::catalog::Genre;
use super::error::Result;
use super::hockey::{self, HockeyBoard};
use super::racing::{self, RaceBoard};
use super::reader::ActivityReader;
use super::scoreboard::{Scoreboard, ScoreboardBuilder};
use super::types::SessionRecord;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "board")]
pub enum MatchBoard {
    Fps(Scoreboard),
    Race(RaceBoard),
    Hockey(HockeyBoard),
}

impl MatchBoard {
    pub fn session_id(&self) -> i64 {
        match self {
            MatchBoard::Fps(board) => board.session_id,
            MatchBoard::Race(board) => board.session_id,
            MatchBoard::Hockey(board) => board.session_id,
        }
    }

    pub fn genre(&self) -> Genre {
        match self {
            MatchBoard::Fps(board) => board.genre,
            MatchBoard::Race(board) => board.genre,
            MatchBoard::Hockey(board) => board.genre,
        }
    }

    /// One-line result, e.g. "Night Ops: alpha Wins the Battle"
    pub fn summary(&self) -> String {
        match self {
            MatchBoard::Fps(board) => format!("{}: {}", board.header.title, board.outcome.describe()),
            MatchBoard::Race(board) => match &board.winner {
                Some(winner) => format!("{}: {} wins", board.track, winner),
                None => format!("{}: no winner", board.track),
            },
            MatchBoard::Hockey(board) => format!(
                "{} {} - {} {}{}",
                board.home.team,
                board.home.score,
                board.away.score,
                board.away.team,
                if board.overtime { " (OT)" } else { "" }
            ),
        }
    }
}

/// Picks the board builder for a session's genre
#[derive(Debug, Clone, Copy, Default)]
pub struct BoardBuilder {
    pub fps: ScoreboardBuilder,
}

impl BoardBuilder {
    pub fn new(fps: ScoreboardBuilder) -> Self {
        Self { fps }
    }

    pub fn supports(genre: Genre) -> bool {
        matches!(genre, Genre::Fps | Genre::Racing | Genre::Hockey)
    }

    /// Genres with a board, in catalog order
    pub fn genres() -> impl Iterator<Item = Genre> {
        Genre::ALL.into_iter().filter(|g| Self::supports(*g))
    }

    /// Board of a finished session; None when the match is not worth one
    /// or the genre has no board
    pub async fn build(
        &self,
        reader: &dyn ActivityReader,
        genre: Genre,
        session: &SessionRecord,
    ) -> Result<Option<MatchBoard>> {
        let board = match genre {
            Genre::Fps => self.fps.build_for_session(reader, session).await?.map(MatchBoard::Fps),
            Genre::Racing => racing::build_for_session(reader, session).await?.map(MatchBoard::Race),
            Genre::Hockey => hockey::build_for_session(reader, session).await?.map(MatchBoard::Hockey),
            _ => None,
        };
        Ok(board)
    }
}
