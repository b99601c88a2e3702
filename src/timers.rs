//! Cancelable single-shot debounce timers.
//!
//! Time is passed in explicitly as milliseconds since the Unix epoch, so the
//! owner decides when to poll and tests never sleep.

use chrono::Utc;

/// Current time in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// A deadline that moves back on every `schedule` and fires at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebounceTimer {
    delay_ms: i64,
    deadline: Option<i64>,
}

impl DebounceTimer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms: i64::try_from(delay_ms).unwrap_or(i64::MAX),
            deadline: None,
        }
    }

    pub fn delay_ms(&self) -> i64 {
        self.delay_ms
    }

    /// (Re)start the countdown from `now`.
    pub fn schedule(&mut self, now: i64) {
        self.deadline = Some(now.saturating_add(self.delay_ms));
    }

    /// Drop any pending firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns `true` once when the deadline has passed, then disarms.
    pub fn poll(&mut self, now: i64) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_after_delay() {
        let mut timer = DebounceTimer::new(1000);
        timer.schedule(0);
        assert!(!timer.poll(999));
        assert!(timer.poll(1000));
        assert!(!timer.poll(5000));
        assert!(!timer.is_pending());
    }

    #[test]
    fn test_reschedule_coalesces_bursts() {
        let mut timer = DebounceTimer::new(1000);
        timer.schedule(0);
        timer.schedule(600);
        timer.schedule(900);
        assert!(!timer.poll(1500));
        assert!(timer.poll(1900));
    }

    #[test]
    fn test_cancel_drops_pending() {
        let mut timer = DebounceTimer::new(30_000);
        timer.schedule(0);
        timer.cancel();
        assert!(!timer.poll(60_000));
    }

    #[test]
    fn test_unscheduled_never_fires() {
        let mut timer = DebounceTimer::new(0);
        assert!(!timer.poll(i64::MAX));
    }
}
