//! Static game catalog: version code → game → genre
//!
//! Each entry carries the client version code and, where the hosting
//! server reports a different code, the server version code as well.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Game family used to route events and subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Genre {
    /// Subscription-only summary bucket
    All,
    Football,
    Fighting,
    AmericanFootball,
    Basketball,
    Racing,
    Hockey,
    Fps,
    Golf,
    /// Default bucket for version codes missing from the catalog
    Other,
}

impl Genre {
    pub const ALL: [Genre; 10] = [
        Genre::All,
        Genre::Football,
        Genre::Fighting,
        Genre::AmericanFootball,
        Genre::Basketball,
        Genre::Racing,
        Genre::Hockey,
        Genre::Fps,
        Genre::Golf,
        Genre::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::All => "ALL",
            Genre::Football => "FOOTBALL",
            Genre::Fighting => "FIGHTING",
            Genre::AmericanFootball => "AMERICAN_FOOTBALL",
            Genre::Basketball => "BASKETBALL",
            Genre::Racing => "RACING",
            Genre::Hockey => "HOCKEY",
            Genre::Fps => "FPS",
            Genre::Golf => "GOLF",
            Genre::Other => "OTHER",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Genre::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown game genre: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Game {
    pub name: &'static str,
    pub vers: &'static str,
    pub server_vers: Option<&'static str>,
    pub genre: Genre,
}

impl Game {
    const fn new(name: &'static str, vers: &'static str, genre: Genre) -> Self {
        Self { name, vers, server_vers: None, genre }
    }

    const fn hosted_as(self, server_vers: &'static str) -> Self {
        Self { server_vers: Some(server_vers), ..self }
    }

    /// Version code reported by the hosting server
    pub fn effective_server_vers(&self) -> &'static str {
        self.server_vers.unwrap_or(self.vers)
    }
}

pub static GAMES: &[Game] = &[
    Game::new("UEFA Champions League 2006-2007", "PSP/UEFA07", Genre::Football),
    Game::new("FIFA 07", "PSP/FIFA07", Genre::Football),
    Game::new("FIFA 08", "PSP/FIFA08", Genre::Football),
    Game::new("FIFA 09", "PSP/FIFA09", Genre::Football),
    Game::new("FIFA 10", "PSP/FIFA10", Genre::Football),
    Game::new("FIFA World Cup Germany 2006", "FLM", Genre::Football),
    Game::new("FIFA World Cup South Africa 2010", "PSP/WORLDCUP10", Genre::Football),
    Game::new("Fight Night Round 3", "PSP/KOK06", Genre::Fighting),
    Game::new("Madden NFL 07", "PSP/MADDEN07", Genre::AmericanFootball),
    Game::new("Madden NFL 08", "PSP/MADDEN-2008", Genre::AmericanFootball),
    Game::new("Madden NFL 09", "PSP/MADDEN-2009", Genre::AmericanFootball),
    Game::new("Madden NFL 10", "PSP/MADDEN-2010", Genre::AmericanFootball),
    Game::new("NCAA Football 07", "PSP/NCAA07", Genre::AmericanFootball),
    Game::new("NBA Live 07", "PSP/NBA07", Genre::Basketball),
    Game::new("NBA Live 08", "PSP/NBA08", Genre::Basketball),
    Game::new("Need for Speed: Most Wanted 5-1-0", "PSP/NFS06", Genre::Racing),
    Game::new("Need for Speed: Carbon - Own the City", "PSP/NFS07", Genre::Racing),
    Game::new("Need for Speed: ProStreet", "PSP/NFS08", Genre::Racing),
    Game::new("Need for Speed: Undercover", "PSP/NFS09", Genre::Racing),
    Game::new("NHL 07", "PSP/NHL07", Genre::Hockey),
    Game::new("Medal of Honor: Heroes", "PSP/MOH07", Genre::Fps).hosted_as("PSP/MOHGPS071"),
    Game::new("Tiger Woods PGA Tour 07", "PSP/TW07", Genre::Golf),
    Game::new("Tiger Woods PGA Tour 08", "PSP/TW08", Genre::Golf),
    Game::new("Tiger Woods PGA Tour 10", "PSP/TEST10", Genre::Golf),
];

pub fn find_by_vers(vers: &str) -> Option<&'static Game> {
    GAMES.iter().find(|g| g.vers == vers)
}

pub fn find_by_server_vers(server_vers: &str) -> Option<&'static Game> {
    GAMES.iter().find(|g| g.effective_server_vers() == server_vers)
}

/// Client code first, then the server code of games hosted under a different one
pub fn resolve(vers: &str) -> Option<&'static Game> {
    find_by_vers(vers).or_else(|| find_by_server_vers(vers))
}

/// Games of a genre; `All` covers the whole catalog
pub fn games_in(genre: Genre) -> impl Iterator<Item = &'static Game> {
    GAMES.iter().filter(move |g| genre == Genre::All || g.genre == genre)
}

pub fn client_vers_for(genre: Genre) -> Vec<String> {
    games_in(genre).map(|g| g.vers.to_string()).collect()
}

pub fn server_vers_for(genre: Genre) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();
    for game in games_in(genre) {
        let code = game.effective_server_vers();
        if !codes.iter().any(|c| c == code) {
            codes.push(code.to_string());
        }
    }
    codes
}
