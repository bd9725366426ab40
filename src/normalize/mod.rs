//! Shape normalizers for the trivia backend's payloads.
//!
//! The backend has shipped several payload shapes for the same endpoints:
//! aliased field names, different list wrappers, ambiguous active flags.
//! Each submodule owns one data domain and pairs a typed wire decoder with
//! a normalization pass producing the canonical models in [`crate::models`].
//! Alias precedence is resolved in code, in a fixed order, so the decoding
//! rules stay explicit instead of being scattered across ad hoc key probes.

mod matches;
mod overview;
mod questions;

pub use matches::{normalize_matches, RawMatch, RawPlayer};
pub use overview::{normalize_overview, OverviewPayload, RawSummary};
pub use questions::{normalize_questions, QuestionsPayload, RawQuestion};

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;

/// A timestamp as the backend may send it: RFC 3339 text or a unix epoch
/// number (seconds or milliseconds).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Text(String),
    Epoch(i64),
}

impl RawTimestamp {
    /// Epoch values at or above this are treated as milliseconds.
    const MILLIS_CUTOFF: i64 = 100_000_000_000;

    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            RawTimestamp::Text(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|t| t.with_timezone(&Utc)),
            RawTimestamp::Epoch(n) if *n >= Self::MILLIS_CUTOFF => {
                Utc.timestamp_millis_opt(*n).single()
            }
            RawTimestamp::Epoch(n) => Utc.timestamp_opt(*n, 0).single(),
        }
    }
}

/// Coerce a loosely typed count field to a number. Counts have arrived as
/// integers, floats, and numeric strings; anything else is 0.
pub(crate) fn as_count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Rounded integer percentage of `part` over `total`.
pub(crate) fn percentage(part: u64, total: u64) -> u32 {
    if total == 0 {
        0
    } else {
        ((part as f64 / total as f64) * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_timestamp_rfc3339() {
        let ts = RawTimestamp::Text("2025-09-06T19:22:00Z".to_string());
        let parsed = ts.to_utc().unwrap();
        assert_eq!(parsed.timestamp(), 1757186520);
    }

    #[test]
    fn test_timestamp_epoch_seconds_and_millis() {
        let secs = RawTimestamp::Epoch(1757186520);
        let millis = RawTimestamp::Epoch(1757186520000);
        assert_eq!(secs.to_utc(), millis.to_utc());
    }

    #[test]
    fn test_timestamp_garbage_text() {
        assert_eq!(RawTimestamp::Text("yesterday".to_string()).to_utc(), None);
    }

    #[test]
    fn test_as_count_coercions() {
        assert_eq!(as_count(&json!(7)), 7);
        assert_eq!(as_count(&json!(7.0)), 7);
        assert_eq!(as_count(&json!("7")), 7);
        assert_eq!(as_count(&json!(" 7 ")), 7);
        assert_eq!(as_count(&json!(-3)), 0);
        assert_eq!(as_count(&json!("many")), 0);
        assert_eq!(as_count(&json!(null)), 0);
        assert_eq!(as_count(&json!([1])), 0);
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(0, 3), 0);
        assert_eq!(percentage(3, 0), 0);
        assert_eq!(percentage(3, 3), 100);
    }
}
