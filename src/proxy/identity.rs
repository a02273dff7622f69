//! Identity renewal policy state
//!
//! Renewal is *requested* when the usage counter crosses its threshold or
//! enough time has passed since the last renewal, but *executed* only when a
//! minimum interval has elapsed since the last successful renewal. The
//! counter resets only on success; a failed renewal leaves the state
//! unchanged so the next cycle retries.

use crate::config::IdentityConfig;
use std::time::{Duration, Instant};

/// Tracks when the anonymity-network exit identity should be renewed
#[derive(Debug, Clone)]
pub struct IdentityRotationState {
    /// Requests served by the current identity
    usage_counter: u32,

    /// When the identity was last successfully renewed
    last_rotation: Instant,

    usage_threshold: u32,
    time_threshold: Duration,
    min_interval: Duration,
}

impl IdentityRotationState {
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            usage_counter: 0,
            last_rotation: Instant::now(),
            usage_threshold: config.usage_threshold,
            time_threshold: Duration::from_secs(config.time_threshold_secs),
            min_interval: Duration::from_secs(config.min_interval_secs),
        }
    }

    /// Records one request served by the current identity
    pub fn record_use(&mut self) {
        self.usage_counter += 1;
    }

    /// Whether a renewal should be requested
    pub fn renewal_due(&self, now: Instant) -> bool {
        if self.usage_counter >= self.usage_threshold {
            return true;
        }

        now.duration_since(self.last_rotation) > self.time_threshold
    }

    /// Whether a renewal may actually be executed now
    ///
    /// Guards against renewal storms: back-to-back renewals within the
    /// minimum interval are suppressed even when one is due.
    pub fn renewal_allowed(&self, now: Instant) -> bool {
        now.duration_since(self.last_rotation) >= self.min_interval
    }

    /// Records a successful renewal: counter resets, timestamp updates
    pub fn mark_renewed(&mut self, now: Instant) {
        self.usage_counter = 0;
        self.last_rotation = now;
    }

    pub fn usage_counter(&self) -> u32 {
        self.usage_counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(usage: u32, time_secs: u64, min_secs: u64) -> IdentityConfig {
        IdentityConfig {
            usage_threshold: usage,
            time_threshold_secs: time_secs,
            min_interval_secs: min_secs,
        }
    }

    #[test]
    fn test_not_due_initially() {
        let state = IdentityRotationState::new(&config(3, 1800, 0));
        assert!(!state.renewal_due(Instant::now()));
    }

    #[test]
    fn test_due_on_usage_threshold() {
        let mut state = IdentityRotationState::new(&config(3, 1800, 0));
        let now = Instant::now();

        state.record_use();
        assert!(!state.renewal_due(now));
        state.record_use();
        assert!(!state.renewal_due(now));
        state.record_use();
        // Fires on the 3rd use and not before
        assert!(state.renewal_due(now));
    }

    #[test]
    fn test_due_on_elapsed_time() {
        let state = IdentityRotationState::new(&config(1000, 1800, 0));
        let now = Instant::now();

        assert!(!state.renewal_due(now + Duration::from_secs(1799)));
        assert!(state.renewal_due(now + Duration::from_secs(1801)));
    }

    #[test]
    fn test_min_interval_suppresses_execution() {
        let mut state = IdentityRotationState::new(&config(2, 1800, 60));
        let now = Instant::now();

        state.record_use();
        state.record_use();
        assert!(state.renewal_due(now));

        // Due, but too soon since the last rotation
        assert!(!state.renewal_allowed(now + Duration::from_secs(30)));
        assert!(state.renewal_allowed(now + Duration::from_secs(60)));
    }

    #[test]
    fn test_successful_renewal_resets_counter() {
        let mut state = IdentityRotationState::new(&config(2, 1800, 0));
        let now = Instant::now();

        state.record_use();
        state.record_use();
        state.mark_renewed(now);

        assert_eq!(state.usage_counter(), 0);
        assert!(!state.renewal_due(now));
    }

    #[test]
    fn test_failed_renewal_leaves_state_for_retry() {
        let mut state = IdentityRotationState::new(&config(2, 1800, 0));
        let now = Instant::now();

        state.record_use();
        state.record_use();
        assert!(state.renewal_due(now));

        // No mark_renewed call: still due on the next cycle
        assert!(state.renewal_due(now));
        assert_eq!(state.usage_counter(), 2);
    }
}
