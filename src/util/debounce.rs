//! Deadline-based debouncing
//!
//! There is no timer thread. The host calls [`Debouncer::poll`] from its own
//! event loop (a `setTimeout` tick on wasm, a test step natively) and the
//! debouncer reports whether the quiet period has elapsed.

use std::cell::Cell;

/// Source of the current time in milliseconds
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Get current timestamp in milliseconds
pub fn current_timestamp() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now() as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        current_timestamp()
    }
}

/// A clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Collapses bursts of triggers into a single run after a quiet period.
///
/// Every trigger replaces the pending deadline, so only the most recent one
/// can fire.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay_ms: u64,
    deadline: Option<u64>,
}

impl Debouncer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            deadline: None,
        }
    }

    /// Quiet period in milliseconds
    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// Restart the quiet period
    pub fn trigger(&mut self, now_ms: u64) {
        self.deadline = Some(now_ms + self.delay_ms);
    }

    /// Schedule a run after a one-off delay
    pub fn trigger_after(&mut self, now_ms: u64, delay_ms: u64) {
        self.deadline = Some(now_ms + delay_ms);
    }

    /// Drop any pending run
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Milliseconds until the pending run is due
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.deadline.map(|deadline| deadline.saturating_sub(now_ms))
    }

    /// Consume the pending run if it is due
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
