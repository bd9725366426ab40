//! # Trivia Dash
//!
//! Terminal dashboard for a remote trivia-game backend ("Preguntados").
//! Polls the backend's read-only JSON endpoints, normalizes their varied
//! payload shapes into stable view models, and renders cards, lists, and
//! charts in the terminal.
//!
//! ## Architecture
//!
//! - **models**: Canonical view models (matches, questions, overview stats)
//! - **normalize**: Typed wire decoders and shape normalizers per data domain
//! - **client**: HTTP client wrapper and the mockable backend API trait
//! - **poll**: Poll-cycle lifecycle, overlap guard, panel state
//! - **view**: Text rendering of the panels
//! - **config**: Configuration loading and validation

pub mod client;
pub mod config;
pub mod models;
pub mod normalize;
pub mod poll;
pub mod view;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "15s", "2m", "1h").
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Default to seconds
        (s, 1)
    };

    let num: u64 = num_str.parse().ok()?;
    Some(Duration::from_secs(num * multiplier))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_seconds() {
        assert_eq!(parse_duration("15s"), Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_parse_duration_minutes() {
        assert_eq!(parse_duration("2m"), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_parse_duration_hours() {
        assert_eq!(parse_duration("1h"), Some(Duration::from_secs(3600)));
    }

    #[test]
    fn test_parse_duration_default_seconds() {
        assert_eq!(parse_duration("45"), Some(Duration::from_secs(45)));
    }

    #[test]
    fn test_parse_duration_invalid() {
        assert_eq!(parse_duration("abc"), None);
    }

    #[test]
    fn test_parse_duration_empty() {
        assert_eq!(parse_duration(""), None);
    }
}
