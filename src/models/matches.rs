//! Canonical match (room) records.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How a match identity was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdSource {
    /// The backend provided an explicit id.
    Backend,
    /// Synthesized from player identifiers and the start timestamp.
    /// Stable across polls for the same record.
    Derived,
    /// Random fallback for records with no identity signal at all.
    /// Not stable across polls, so these records never deduplicate.
    Random,
}

/// A player inside a match roster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Player {
    pub id: Option<String>,
    pub alias: Option<String>,
    pub name: Option<String>,
}

impl Player {
    /// Display label: alias, then name, then id.
    pub fn label(&self) -> &str {
        self.alias
            .as_deref()
            .or(self.name.as_deref())
            .or(self.id.as_deref())
            .unwrap_or("—")
    }

    /// Identity used when synthesizing a match id: id, then alias, then name.
    pub fn identity(&self) -> Option<&str> {
        self.id
            .as_deref()
            .or(self.alias.as_deref())
            .or(self.name.as_deref())
    }
}

/// A normalized match record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: String,

    /// Where the id came from; [`IdSource::Random`] records are excluded
    /// from cross-poll dedup guarantees.
    pub id_source: IdSource,

    pub players: Vec<Player>,

    pub started_at: Option<DateTime<Utc>>,

    pub is_active: bool,

    /// Raw status string as the backend sent it (may be empty).
    pub status: String,
}

impl Match {
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Whether the match started within `window` before `now`.
    pub fn started_within(&self, now: DateTime<Utc>, window: Duration) -> bool {
        match self.started_at {
            Some(t) => {
                let age = now.signed_duration_since(t);
                age >= Duration::zero() && age <= window
            }
            None => false,
        }
    }
}

/// Which buckets the match normalizer produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchBuckets {
    /// Keep only matches classified as active.
    ActiveOnly,
    /// Active matches plus inactive ones that started in the last 24 hours.
    ActiveAndRecent,
}

impl Default for MatchBuckets {
    fn default() -> Self {
        MatchBuckets::ActiveOnly
    }
}

/// Deduplicated match records, bucketed for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchBoard {
    pub active: Vec<Match>,
    pub recent: Vec<Match>,
}

impl MatchBoard {
    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.recent.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: Option<&str>, alias: Option<&str>, name: Option<&str>) -> Player {
        Player {
            id: id.map(String::from),
            alias: alias.map(String::from),
            name: name.map(String::from),
        }
    }

    #[test]
    fn test_player_label_precedence() {
        assert_eq!(player(Some("u1"), Some("@ana"), Some("Ana")).label(), "@ana");
        assert_eq!(player(Some("u1"), None, Some("Ana")).label(), "Ana");
        assert_eq!(player(Some("u1"), None, None).label(), "u1");
        assert_eq!(player(None, None, None).label(), "—");
    }

    #[test]
    fn test_player_identity_prefers_id() {
        assert_eq!(
            player(Some("u1"), Some("@ana"), None).identity(),
            Some("u1")
        );
        assert_eq!(player(None, Some("@ana"), None).identity(), Some("@ana"));
        assert_eq!(player(None, None, None).identity(), None);
    }

    #[test]
    fn test_started_within() {
        let now = Utc::now();
        let m = Match {
            id: "m1".to_string(),
            id_source: IdSource::Backend,
            players: vec![],
            started_at: Some(now - Duration::hours(3)),
            is_active: false,
            status: "finished".to_string(),
        };

        assert!(m.started_within(now, Duration::hours(24)));
        assert!(!m.started_within(now, Duration::hours(1)));
    }

    #[test]
    fn test_started_within_unknown_start() {
        let now = Utc::now();
        let m = Match {
            id: "m1".to_string(),
            id_source: IdSource::Random,
            players: vec![],
            started_at: None,
            is_active: false,
            status: String::new(),
        };

        assert!(!m.started_within(now, Duration::hours(24)));
    }

    #[test]
    fn test_match_buckets_serde() {
        let json = serde_json::to_string(&MatchBuckets::ActiveAndRecent).unwrap();
        assert_eq!(json, "\"active-and-recent\"");

        let parsed: MatchBuckets = serde_json::from_str("\"active-only\"").unwrap();
        assert_eq!(parsed, MatchBuckets::ActiveOnly);
    }

    #[test]
    fn test_board_is_empty() {
        assert!(MatchBoard::default().is_empty());
    }
}
