use std::time::Duration;

/// Delay schedule for re-opening the link.
///
/// A fixed timer yields the same delay on every attempt. A stepped timer walks
/// its intervals and keeps repeating the last one.
#[derive(Debug, Clone)]
pub struct Timer {
    attempts: u32,
    intervals: Vec<u64>,
}

impl Timer {
    pub fn new(intervals: Vec<u64>) -> Self {
        Self {
            attempts: 0,
            intervals,
        }
    }

    /// Timer that always yields `delay_ms`
    pub fn fixed(delay_ms: u64) -> Self {
        Self::new(vec![delay_ms])
    }

    /// Get the next delay duration
    pub fn next_delay(&mut self) -> Duration {
        let delay = match self.intervals.get(self.attempts as usize) {
            Some(delay) => *delay,
            None => self.intervals.last().copied().unwrap_or_default(),
        };

        self.attempts = self.attempts.saturating_add(1);
        Duration::from_millis(delay)
    }

    /// Number of delays handed out since the last reset
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Reset the timer
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}

/// Retry delays for the two ways a link can go away.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Used after an open link was severed
    pub on_disconnect: Timer,
    /// Used after an open attempt failed
    pub on_open_failure: Timer,
}

impl RetryPolicy {
    pub fn new(on_disconnect: Timer, on_open_failure: Timer) -> Self {
        Self {
            on_disconnect,
            on_open_failure,
        }
    }

    pub fn next_disconnect_delay(&mut self) -> Duration {
        self.on_disconnect.next_delay()
    }

    pub fn next_open_failure_delay(&mut self) -> Duration {
        self.on_open_failure.next_delay()
    }

    /// Called once a link opens successfully
    pub fn reset(&mut self) {
        self.on_disconnect.reset();
        self.on_open_failure.reset();
    }
}
