//! Debounce scheduling
//!
//! A single-slot timer: every accepted event pushes the deadline out to
//! `now + quiet_period`, and the flush fires once the deadline passes
//! without another event. The scheduler never sleeps itself; the watch
//! loop asks for `deadline()` and waits on it.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Time source for the scheduler
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Clock backed by tokio's time driver (honours paused test time)
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for tests
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

/// Single-slot restartable flush timer
///
/// At most one deadline is outstanding. `on_event` replaces it,
/// `poll_fire` consumes it.
pub struct DebounceScheduler<C: Clock = TokioClock> {
    quiet_period: Duration,
    deadline: Option<Instant>,
    clock: C,
}

impl DebounceScheduler<TokioClock> {
    pub fn new(quiet_period: Duration) -> Self {
        Self::with_clock(quiet_period, TokioClock)
    }
}

impl<C: Clock> DebounceScheduler<C> {
    pub fn with_clock(quiet_period: Duration, clock: C) -> Self {
        Self {
            quiet_period,
            deadline: None,
            clock,
        }
    }

    /// Restart the quiet period from now, replacing any pending deadline
    pub fn on_event(&mut self) {
        self.deadline = Some(self.clock.now() + self.quiet_period);
    }

    /// Drop the pending deadline without firing
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Fire if the deadline has passed
    ///
    /// Returns true at most once per armed period.
    pub fn poll_fire(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if self.clock.now() >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }
}
