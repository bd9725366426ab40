//! Polling lifecycle for the dashboard panels.
//!
//! One cycle fetches all three endpoints, normalizes the payloads, and
//! applies the results to the panel states. Cycles are guarded against
//! overlap and stamped with a monotonic sequence so a slow response can
//! never overwrite data from a newer cycle. Failures keep the last good
//! data on screen; the next scheduled cycle is the retry.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use crate::client::{ApiError, TriviaApi};
use crate::config::PollConfig;
use crate::models::{MatchBoard, OverviewStats, Question};
use crate::normalize::{normalize_matches, normalize_overview, normalize_questions};

/// User-facing error messages, as the product ships them.
pub const MSG_OVERVIEW: &str = "No se pudo cargar estadísticas.";
pub const MSG_MATCHES: &str = "No se pudo cargar partidas activas.";
pub const MSG_QUESTIONS: &str = "No se pudieron cargar las preguntas.";

/// What prompted a poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    /// The fixed-interval timer fired.
    Interval,
    /// The user asked for a refresh.
    Manual,
    /// The dashboard returned to the foreground.
    Resume,
}

impl fmt::Display for RefreshReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshReason::Interval => write!(f, "interval"),
            RefreshReason::Manual => write!(f, "manual"),
            RefreshReason::Resume => write!(f, "resume"),
        }
    }
}

/// Display state owned by one dashboard panel.
#[derive(Debug, Clone)]
pub struct PanelState<T> {
    /// True until the first cycle completes, success or failure.
    pub loading: bool,

    /// Set on failure, cleared when a fetch starts and by the next success.
    pub error: Option<String>,

    /// Set once the backend reports the endpoint does not exist.
    pub unavailable: bool,

    /// Last successfully normalized result. Retained across failed
    /// refreshes so the screen never blanks.
    pub data: Option<T>,

    last_applied: u64,
}

impl<T> PanelState<T> {
    pub fn new() -> Self {
        Self {
            loading: true,
            error: None,
            unavailable: false,
            data: None,
            last_applied: 0,
        }
    }

    /// A fetch is starting; clear the previous error.
    fn begin(&mut self) {
        self.error = None;
    }

    /// Apply a completed cycle. Returns false (and changes nothing) when a
    /// newer cycle has already been applied.
    pub fn apply(&mut self, seq: u64, outcome: Result<T, ApiError>, message: &str) -> bool {
        if seq <= self.last_applied {
            debug!(seq, last = self.last_applied, "discarding stale poll response");
            return false;
        }
        self.last_applied = seq;
        self.loading = false;

        match outcome {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
                self.unavailable = false;
            }
            Err(ApiError::Unavailable) => {
                self.unavailable = true;
                self.error = None;
            }
            Err(err) => {
                warn!("panel refresh failed: {}", err);
                self.error = Some(message.to_string());
            }
        }
        true
    }
}

impl<T> Default for PanelState<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Overlap guard plus monotonic cycle numbering.
#[derive(Debug, Default)]
struct CycleTicket {
    next_seq: u64,
    in_flight: bool,
}

impl CycleTicket {
    /// Claim the next cycle, or None while one is still in flight.
    fn begin(&mut self) -> Option<u64> {
        if self.in_flight {
            return None;
        }
        self.in_flight = true;
        self.next_seq += 1;
        Some(self.next_seq)
    }

    fn finish(&mut self) {
        self.in_flight = false;
    }
}

/// The three dashboard panels and their shared polling state.
pub struct Dashboard {
    api: Arc<dyn TriviaApi>,
    poll: PollConfig,
    ticket: CycleTicket,
    pub overview: PanelState<OverviewStats>,
    pub matches: PanelState<MatchBoard>,
    pub questions: PanelState<Vec<Question>>,
}

impl Dashboard {
    pub fn new(api: Arc<dyn TriviaApi>, poll: PollConfig) -> Self {
        Self {
            api,
            poll,
            ticket: CycleTicket::default(),
            overview: PanelState::new(),
            matches: PanelState::new(),
            questions: PanelState::new(),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.poll.interval_secs)
    }

    /// Run one poll cycle across all panels. Returns true when any panel
    /// changed; false when the cycle was skipped or superseded.
    pub async fn refresh(&mut self, reason: RefreshReason) -> bool {
        let Some(seq) = self.ticket.begin() else {
            debug!(%reason, "poll cycle skipped, previous cycle still in flight");
            return false;
        };
        debug!(%reason, seq, "poll cycle started");

        self.overview.begin();
        self.matches.begin();
        self.questions.begin();

        let limit = Some(self.poll.question_limit);
        let buckets = self.poll.match_buckets;
        let (overview, matches, questions) = tokio::join!(
            self.api.fetch_overview(),
            self.api.fetch_active_matches(),
            self.api.fetch_questions(limit),
        );
        self.ticket.finish();

        let now = Utc::now();
        let mut changed = false;
        changed |= self
            .overview
            .apply(seq, overview.map(normalize_overview), MSG_OVERVIEW);
        changed |= self.matches.apply(
            seq,
            matches.map(|raw| normalize_matches(raw, now, buckets)),
            MSG_MATCHES,
        );
        changed |= self
            .questions
            .apply(seq, questions.map(normalize_questions), MSG_QUESTIONS);
        changed
    }
}
