//! Per-player stats aggregation for finished sessions
//!
//! A player who reconnects mid-session produces several stat lines. They
//! are merged per persona by field-wise addition; host lines are dropped.
//! Sessions with fewer than two players, or where nobody scored a kill,
//! are considered noise and produce nothing.

use super::error::Result;
use super::reader::ActivityReader;
use super::types::{AggregatedPlayerStat, RawStatLine, SessionRecord};
use std::collections::HashMap;

pub const MIN_PLAYERS: usize = 2;

/// Merge stat lines into one row per persona
///
/// Output order is the order in which each persona first appears.
pub fn aggregate(session_id: i64, lines: &[RawStatLine]) -> Vec<AggregatedPlayerStat> {
    let mut rows: Vec<AggregatedPlayerStat> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for line in lines.iter().filter(|l| !l.is_host) {
        match index.get(&line.persona_id) {
            Some(&i) => rows[i].stats += line.counters,
            None => {
                index.insert(line.persona_id, rows.len());
                rows.push(AggregatedPlayerStat {
                    session_id,
                    persona_id: line.persona_id,
                    persona_name: line.persona_name.clone(),
                    stats: line.counters,
                });
            }
        }
    }

    rows
}

/// At least two players and at least one kill
pub fn is_interesting(rows: &[AggregatedPlayerStat]) -> bool {
    rows.len() >= MIN_PLAYERS && rows.iter().any(|r| r.stats.kills > 0)
}

/// Aggregated rows of a finished session, or None when it is filtered out
pub async fn session_stats(
    reader: &dyn ActivityReader,
    session: &SessionRecord,
) -> Result<Option<Vec<AggregatedPlayerStat>>> {
    let lines = reader.stat_lines(session.id).await?;
    let rows = aggregate(session.id, &lines);

    if !is_interesting(&rows) {
        log::debug!(
            "Session {} ({}) skipped: {} players, kills={}",
            session.id,
            session.name,
            rows.len(),
            rows.iter().map(|r| r.stats.kills).sum::<i64>()
        );
        return Ok(None);
    }

    Ok(Some(rows))
}
