//! Event extraction with map-rotation deduplication
//!
//! Four raw row sets are read for a window (connects, disconnects,
//! session joins, session leaves) and turned into rendered, genre-tagged
//! events in one deterministic order.
//!
//! A map rotation replaces the session object under players that never
//! left: the old participation ends and a new one starts at the very same
//! instant, and the old session ends at that instant too. Such a join is
//! not a real rejoin and is suppressed; the matching leave of the old
//! session is still reported.

use super::catalog;
use super::error::Result;
use super::reader::ActivityReader;
use super::router::genre_for;
use super::types::{ConnectionRecord, Event, EventKind, SessionActivity, TimeWindow, VersFilter};

/// Events of one window, sorted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub events: Vec<Event>,
    pub suppressed_joins: usize,
}

/// True when `join` continues `previous` across a map rotation
///
/// Requires both equalities: the previous participation ended exactly when
/// this one started, and it ended together with its session.
pub fn is_rotation_join(join: &SessionActivity, previous: Option<&SessionActivity>) -> bool {
    let Some(prev) = previous else {
        return false;
    };
    if prev.participation.id == join.participation.id {
        return false;
    }
    let Some(prev_end) = prev.participation.end_time else {
        return false;
    };

    prev.participation.connection_id == join.participation.connection_id
        && prev_end == join.participation.start_time
        && prev.session.end_time == Some(prev_end)
}

/// Strip double quotes the servers leave around names
fn clean(name: &str) -> String {
    name.replace('"', "")
}

/// Catalog title of a client code, or the raw code
fn game_title(vers: &str) -> String {
    catalog::find_by_vers(vers)
        .map(|g| g.name.to_string())
        .unwrap_or_else(|| vers.to_string())
}

fn connection_event(record: &ConnectionRecord, kind: EventKind) -> Option<Event> {
    let (timestamp, icon, verb) = match kind {
        EventKind::Connected => (record.start_time, "🟢", "connected"),
        EventKind::Disconnected => (record.end_time?, "🔴", "disconnected"),
        _ => return None,
    };

    Some(Event {
        id: record.id,
        timestamp,
        kind,
        message: format!(
            "{} `{}` **{}** {}",
            icon,
            game_title(&record.vers),
            clean(&record.persona_name),
            verb
        ),
        genre: genre_for(&record.vers, None),
    })
}

fn session_event(activity: &SessionActivity, kind: EventKind) -> Option<Event> {
    let (timestamp, icon, verb) = match kind {
        EventKind::JoinedSession => (activity.participation.start_time, "➡️", "joined"),
        EventKind::LeftSession => (activity.participation.end_time?, "⬅️", "left"),
        _ => return None,
    };
    let connection = &activity.connection;

    Some(Event {
        id: activity.participation.id,
        timestamp,
        kind,
        message: format!(
            "{} `{}` **{}** {} game `{}`",
            icon,
            game_title(&connection.vers),
            clean(&connection.persona_name),
            verb,
            clean(&activity.session.name)
        ),
        genre: genre_for(&connection.vers, Some(&activity.session.vers)),
    })
}

/// Read the window's rows and produce its sorted event list
pub async fn extract_events(
    reader: &dyn ActivityReader,
    window: TimeWindow,
    filter: &VersFilter,
) -> Result<Extraction> {
    let connects = reader.connects(window, filter).await?;
    let disconnects = reader.disconnects(window, filter).await?;
    let joins = reader.session_joins(window, filter).await?;
    let leaves = reader.session_leaves(window, filter).await?;

    let mut extraction = Extraction::default();
    let events = &mut extraction.events;

    events.extend(connects.iter().filter_map(|c| connection_event(c, EventKind::Connected)));
    events.extend(disconnects.iter().filter_map(|c| connection_event(c, EventKind::Disconnected)));

    for join in &joins {
        let previous = reader.participation_ending_at(&join.participation).await?;

        if is_rotation_join(join, previous.as_ref()) {
            log::debug!(
                "🔁 Suppressed rotation join {} of {} into session {}",
                join.participation.id,
                join.connection.persona_name,
                join.session.id
            );
            extraction.suppressed_joins += 1;
            continue;
        }
        events.extend(session_event(join, EventKind::JoinedSession));
    }

    events.extend(leaves.iter().filter_map(|l| session_event(l, EventKind::LeftSession)));

    extraction.events.sort();
    Ok(extraction)
}
