//! Genre routing: version code → genre, and per-genre grouping of events

use super::catalog::{self, Genre};
use super::types::{Event, Subscription};
use std::collections::BTreeMap;

/// Genre of a single version code
///
/// Unknown codes land in `Genre::Other`; they are logged, never dropped.
pub fn genre_for_vers(vers: &str) -> Genre {
    match catalog::resolve(vers) {
        Some(game) => game.genre,
        None => {
            log::warn!("⚠️  Unmapped version code '{}', routing to {}", vers, Genre::Other);
            Genre::Other
        }
    }
}

/// Genre of a player's activity
///
/// The client code is tried first; the hosting session's code is the
/// fallback for games whose servers report a different code.
pub fn genre_for(client_vers: &str, session_vers: Option<&str>) -> Genre {
    if let Some(game) = catalog::resolve(client_vers) {
        return game.genre;
    }
    match session_vers {
        Some(vers) if vers != client_vers => genre_for_vers(vers),
        _ => genre_for_vers(client_vers),
    }
}

/// Events of a sorted list grouped by genre, preserving order within each group
pub fn group_by_genre(events: &[Event]) -> BTreeMap<Genre, Vec<Event>> {
    let mut groups: BTreeMap<Genre, Vec<Event>> = BTreeMap::new();
    for event in events {
        groups.entry(event.genre).or_default().push(event.clone());
    }
    groups
}

/// Events for one genre together with the channels that want them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub genre: Genre,
    pub events: Vec<Event>,
    pub channels: Vec<String>,
}

/// Pair each genre group with its subscribers
///
/// Genres without events or without subscribers are left out.
pub fn plan_dispatches<F>(groups: BTreeMap<Genre, Vec<Event>>, mut subscribers: F) -> Vec<Dispatch>
where
    F: FnMut(Genre) -> Vec<Subscription>,
{
    groups
        .into_iter()
        .filter(|(_, events)| !events.is_empty())
        .filter_map(|(genre, events)| {
            let channels: Vec<String> = subscribers(genre)
                .into_iter()
                .map(|s| s.channel_id)
                .collect();
            if channels.is_empty() {
                log::debug!("No subscribers for {} ({} events dropped)", genre, events.len());
                None
            } else {
                Some(Dispatch { genre, events, channels })
            }
        })
        .collect()
}
