//! Match (room) normalization and deduplication.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use super::RawTimestamp;
use crate::models::{IdSource, Match, MatchBoard, MatchBuckets, Player};

/// Status strings that mean "this match is running", across backend versions.
const ACTIVE_STATUSES: [&str; 4] = ["active", "open", "running", "playing"];

/// How far back an inactive match still counts as recent.
const RECENT_WINDOW_HOURS: i64 = 24;

/// A match record as the backend sends it. Every field is optional; aliases
/// are resolved in a fixed precedence order by [`normalize_matches`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMatch {
    #[serde(rename = "matchId")]
    pub match_id: Option<String>,
    pub id: Option<String>,
    pub players: Vec<RawPlayer>,
    #[serde(rename = "startedAt", alias = "started_at")]
    pub started_at: Option<RawTimestamp>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
    pub active: Option<bool>,
    pub status: Option<String>,
    pub state: Option<String>,
}

/// A roster entry as the backend sends it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPlayer {
    pub id: Option<String>,
    pub alias: Option<String>,
    pub name: Option<String>,
}

/// Normalize, deduplicate, and bucket a raw match list.
///
/// Identity precedence: explicit backend id, then an id synthesized from
/// the sorted player identifiers and the start timestamp, then a random
/// token. On identity collision the record with the later start time wins
/// (a known start beats an unknown one). Buckets are sorted by start time
/// descending, unknown starts last.
pub fn normalize_matches(
    raw: Vec<RawMatch>,
    now: DateTime<Utc>,
    buckets: MatchBuckets,
) -> MatchBoard {
    let mut by_id: HashMap<String, Match> = HashMap::with_capacity(raw.len());

    for record in raw {
        let m = canonicalize(record);
        match by_id.entry(m.id.clone()) {
            Entry::Occupied(mut slot) => {
                if m.started_at > slot.get().started_at {
                    slot.insert(m);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(m);
            }
        }
    }

    let mut all: Vec<Match> = by_id.into_values().collect();
    all.sort_by(|a, b| b.started_at.cmp(&a.started_at));

    let window = Duration::hours(RECENT_WINDOW_HOURS);
    let mut board = MatchBoard::default();
    for m in all {
        if m.is_active {
            board.active.push(m);
        } else if buckets == MatchBuckets::ActiveAndRecent && m.started_within(now, window) {
            board.recent.push(m);
        }
    }
    board
}

fn canonicalize(raw: RawMatch) -> Match {
    let players: Vec<Player> = raw
        .players
        .into_iter()
        .map(|p| Player {
            id: p.id,
            alias: p.alias,
            name: p.name,
        })
        .collect();

    let started_at = raw.started_at.as_ref().and_then(RawTimestamp::to_utc);
    let status = raw.status.or(raw.state).unwrap_or_default();
    let is_active = resolve_active(raw.is_active, raw.active, &status);

    let explicit_id = raw.match_id.or(raw.id).filter(|s| !s.is_empty());
    let (id, id_source) = match explicit_id {
        Some(id) => (id, IdSource::Backend),
        None => match derive_id(&players, started_at) {
            Some(id) => (id, IdSource::Derived),
            None => {
                debug!("match record has no identity signal, assigning random id");
                (Uuid::new_v4().to_string(), IdSource::Random)
            }
        },
    };

    Match {
        id,
        id_source,
        players,
        started_at,
        is_active,
        status,
    }
}

/// Active precedence: explicit `isActive`, explicit `active`, then the
/// lowercased status string against the known active set.
fn resolve_active(is_active: Option<bool>, active: Option<bool>, status: &str) -> bool {
    if let Some(flag) = is_active {
        return flag;
    }
    if let Some(flag) = active {
        return flag;
    }
    let status = status.to_lowercase();
    ACTIVE_STATUSES.contains(&status.as_str())
}

/// Stable identity for records without a backend id: sorted, pipe-joined
/// player identifiers plus the start timestamp. None when neither signal
/// is present.
fn derive_id(players: &[Player], started_at: Option<DateTime<Utc>>) -> Option<String> {
    let mut ids: Vec<&str> = players.iter().filter_map(Player::identity).collect();
    if ids.is_empty() && started_at.is_none() {
        return None;
    }
    ids.sort_unstable();
    let ts = started_at
        .map(|t| t.timestamp_millis().to_string())
        .unwrap_or_default();
    Some(format!("{}@{}", ids.join("|"), ts))
}
