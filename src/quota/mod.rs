//! Daily request budget tracking
//!
//! The quota tracker owns a small day-scoped state record persisted as JSON.
//! Every mutation is flushed synchronously with an atomic replace-on-write,
//! so a crash leaves the on-disk count consistent with the last registered
//! request. Persistence failures are logged and non-fatal; the in-memory
//! state stays authoritative for the process.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persisted day-scoped request budget state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaState {
    /// Calendar date this count belongs to
    pub date: NaiveDate,

    /// Requests registered on `date`; never exceeds the daily limit
    pub count: u32,

    /// Timestamp of the most recent registered request
    pub last_request: DateTime<Utc>,
}

impl QuotaState {
    fn fresh(today: NaiveDate) -> Self {
        Self {
            date: today,
            count: 0,
            last_request: Utc::now(),
        }
    }
}

/// Tracks the daily request budget for a campaign
#[derive(Debug)]
pub struct QuotaTracker {
    path: PathBuf,
    daily_limit: u32,
    state: QuotaState,
}

impl QuotaTracker {
    /// Loads quota state from the given file, or starts fresh
    ///
    /// A missing or malformed state file falls back to a fresh default for
    /// today rather than failing: a corrupt budget record must never wedge
    /// the campaign.
    pub fn load(path: &Path, daily_limit: u32) -> Self {
        let today = Local::now().date_naive();
        let state = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<QuotaState>(&content) {
                Ok(state) if state.date == today => state,
                Ok(stale) => {
                    tracing::info!(
                        "Quota state dated {} rolled over to {}, count reset",
                        stale.date,
                        today
                    );
                    QuotaState::fresh(today)
                }
                Err(e) => {
                    tracing::warn!("Malformed quota state file, starting fresh: {}", e);
                    QuotaState::fresh(today)
                }
            },
            Err(_) => {
                tracing::info!("No quota state file at {}, starting fresh", path.display());
                QuotaState::fresh(today)
            }
        };

        let mut tracker = Self {
            path: path.to_path_buf(),
            daily_limit,
            state,
        };
        tracker.persist();
        tracker
    }

    /// Returns true if another request fits within today's budget
    ///
    /// The stored date is compared against the current calendar date on
    /// every call, so a process that lives across midnight rolls over
    /// without a restart. The rollover resets the count to 0 and persists
    /// the new state immediately.
    pub fn can_make_request(&mut self) -> bool {
        self.can_make_request_on(Local::now().date_naive())
    }

    /// Registers one request against today's budget
    ///
    /// Mutates and persists only if `can_make_request` holds; otherwise this
    /// is a no-op returning false.
    pub fn register_request(&mut self) -> bool {
        self.register_request_on(Local::now().date_naive())
    }

    /// Returns the number of requests remaining today
    pub fn remaining(&mut self) -> u32 {
        self.rollover_if_new_day(Local::now().date_naive());
        self.daily_limit.saturating_sub(self.state.count)
    }

    /// Returns a textual report of the current budget state
    pub fn status_report(&mut self) -> String {
        let remaining = self.remaining();
        format!(
            "Request budget as of {}:\n\
             - Used: {} of {}\n\
             - Remaining: {}\n\
             - Last request: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            self.state.count,
            self.daily_limit,
            remaining,
            self.state.last_request.format("%Y-%m-%d %H:%M:%S UTC"),
        )
    }

    /// The configured daily limit
    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    /// Current in-memory state (for reporting)
    pub fn state(&self) -> &QuotaState {
        &self.state
    }

    fn can_make_request_on(&mut self, today: NaiveDate) -> bool {
        self.rollover_if_new_day(today);
        self.state.count < self.daily_limit
    }

    fn register_request_on(&mut self, today: NaiveDate) -> bool {
        if !self.can_make_request_on(today) {
            return false;
        }

        self.state.count += 1;
        self.state.last_request = Utc::now();
        self.persist();
        true
    }

    fn rollover_if_new_day(&mut self, today: NaiveDate) {
        if self.state.date != today {
            tracing::info!(
                "Calendar day rolled over ({} -> {}), quota count reset",
                self.state.date,
                today
            );
            self.state = QuotaState::fresh(today);
            self.persist();
        }
    }

    /// Writes the full state file via temp-file-then-rename
    ///
    /// IO failures are logged and swallowed: in-memory state remains
    /// authoritative until the next successful write.
    fn persist(&mut self) {
        if let Err(e) = write_json_atomic(&self.path, &self.state) {
            tracing::warn!("Failed to persist quota state: {}", e);
        }
    }
}

/// Serializes a value as pretty JSON and atomically replaces `path`
///
/// The write goes to a sibling `.tmp` file first so a crash mid-write can
/// never leave a truncated state file behind.
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, json.as_bytes())?;
    std::fs::rename(&tmp, path)
}
