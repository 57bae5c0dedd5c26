//! Live status snapshots rendered as Markdown
//!
//! One section per catalogued game of a genre: players idling in the lobby
//! and open sessions with their current participants (hosts first).

use super::catalog::{self, Game, Genre};
use super::delivery::{Delivery, DeliveryQueue};
use super::error::Result;
use super::reader::{ActiveSession, ActivityReader};
use super::subscriptions::SubscriptionCache;
use super::types::{ConnectionRecord, SubscriptionType, VersFilter};
use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

/// "🌐 12 🎮 5": players online and players inside a session
pub fn activity_line(online: i64, in_session: i64) -> String {
    format!("🌐 {} 🎮 {}", online, in_session)
}

fn push_session(out: &mut String, active: &ActiveSession) {
    let session = &active.session;
    let status = if session.started { "🟢 Started" } else { "🟡 Waiting for players" };
    let capacity = if session.max_size > 0 {
        format!("{}/{}", active.players.len(), session.max_size)
    } else {
        active.players.len().to_string()
    };

    let _ = writeln!(out, "🔹 `{}` {} ({} players)", session.name, status, capacity);
    for player in &active.players {
        if player.is_host {
            let _ = writeln!(out, "  🔸 {} 👑", player.persona_name);
        } else {
            let _ = writeln!(out, "  🔸 {}", player.persona_name);
        }
    }
}

fn push_game_section(out: &mut String, game: &Game, lobby: &[&ConnectionRecord], active: &[&ActiveSession]) {
    let _ = writeln!(out, "## {}\n", game.name);

    let _ = writeln!(out, "**Players in Lobby ({})**", lobby.len());
    if lobby.is_empty() {
        out.push_str("*No players in lobby*\n");
    }
    for player in lobby {
        let _ = writeln!(out, "🔸 {}", player.persona_name);
    }
    out.push('\n');

    let _ = writeln!(out, "**Active Games ({})**", active.len());
    if active.is_empty() {
        out.push_str("*No active games*\n");
    }
    for (i, session) in active.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        push_session(out, session);
    }
    out.push('\n');
}

/// Markdown snapshot of a genre from already-fetched rows
///
/// Lobby players are matched to games by client code, sessions by the
/// server code of the game.
pub fn render_status(genre: Genre, lobby: &[ConnectionRecord], active: &[ActiveSession]) -> String {
    let games: Vec<&Game> = catalog::games_in(genre).collect();
    if games.is_empty() {
        return format!("No games found for genre: {}", genre);
    }

    let mut out = String::new();
    for game in games {
        let players: Vec<&ConnectionRecord> = lobby.iter().filter(|c| c.vers == game.vers).collect();
        let sessions: Vec<&ActiveSession> = active
            .iter()
            .filter(|a| a.session.vers == game.effective_server_vers())
            .collect();
        push_game_section(&mut out, game, &players, &sessions);
    }
    out
}

/// Read and render the snapshot of a genre
pub async fn status_content(reader: &dyn ActivityReader, genre: Genre) -> Result<String> {
    let client = catalog::client_vers_for(genre);
    if client.is_empty() {
        return Ok(render_status(genre, &[], &[]));
    }

    let lobby = reader.lobby_connections(&VersFilter::Only(client)).await?;
    let active = reader
        .active_sessions(&VersFilter::Only(catalog::server_vers_for(genre)))
        .await?;
    Ok(render_status(genre, &lobby, &active))
}

/// Queue a status update for every genre that has STATUS subscribers
///
/// The `ALL` bucket receives the activity line. Returns the number of
/// updates queued.
pub async fn publish_status(
    reader: &dyn ActivityReader,
    subscriptions: &SubscriptionCache,
    queue: &DeliveryQueue,
) -> Result<usize> {
    let online = reader.count_online().await?;
    let in_session = reader.count_in_session().await?;
    let activity = activity_line(online, in_session);
    log::info!("📈 Activity: {}", activity);

    let mut queued = 0;
    for genre in Genre::ALL.into_iter().filter(|g| *g != Genre::Other) {
        let channels = subscriptions.channels_for(SubscriptionType::Status, genre).await;
        if channels.is_empty() {
            continue;
        }

        let content = match genre {
            Genre::All => activity.clone(),
            other => status_content(reader, other).await?,
        };
        queue.enqueue(Delivery::Status { channels, genre, content })?;
        queued += 1;
    }

    Ok(queued)
}

/// Status scheduler task - periodically refresh status content
///
/// Runs until `shutdown` flips to true. Failures are logged and retried on
/// the next period.
pub async fn status_task(
    reader: Arc<dyn ActivityReader>,
    subscriptions: Arc<SubscriptionCache>,
    queue: DeliveryQueue,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    log::info!("⏰ Starting status scheduler (interval: {}ms)", period.as_millis());

    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = timer.tick() => {
                match publish_status(reader.as_ref(), &subscriptions, &queue).await {
                    Ok(n) => log::debug!("Queued {} status updates", n),
                    Err(e) => log::error!("❌ Failed to refresh status: {}", e),
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    log::info!("✅ Status scheduler stopped");
}
