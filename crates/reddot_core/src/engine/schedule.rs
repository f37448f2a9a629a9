//! Cooperative recurring tick schedule.
//!
//! The host loop feeds the current time into `poll`; the schedule answers
//! whether a tick is due. Stopping clears the deadline, so a stopped schedule
//! never fires again until restarted.

use std::time::{Duration, Instant};

/// Default interval between ticks.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_millis(1000);

/// Deadline-based recurring timer owned by one engine instance.
#[derive(Debug, Clone)]
pub struct TickSchedule {
    interval: Duration,
    next_due: Option<Instant>,
    fired: u64,
}

impl TickSchedule {
    /// Creates a stopped schedule. A zero interval falls back to the default.
    pub fn new(interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            DEFAULT_CHECK_INTERVAL
        } else {
            interval
        };
        Self {
            interval,
            next_due: None,
            fired: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Number of ticks fired since creation.
    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// Arms the schedule; the first tick is due one interval after `now`.
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    /// Returns `true` when a tick is due at `now` and re-arms the deadline.
    ///
    /// Missed intervals collapse into one tick.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                self.fired += 1;
                true
            }
            _ => false,
        }
    }
}

impl Default for TickSchedule {
    fn default() -> Self {
        Self::new(DEFAULT_CHECK_INTERVAL)
    }
}
