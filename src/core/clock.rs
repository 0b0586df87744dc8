//! Time sources for cache freshness checks

use chrono::{DateTime, Utc};
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    /// Monotonic time used for TTL arithmetic.
    fn now(&self) -> Instant;

    /// Wall-clock time used for "last updated" display.
    fn wall(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Starts at the instant it was created.
///
/// Meant for tests that need to step across a TTL without sleeping; production
/// code uses [`SystemClock`].
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    start_wall: DateTime<Utc>,
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            start_wall: Utc::now(),
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut elapsed = self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        *elapsed += by;
    }

    /// Moves the clock to `at` past its start. Never moves backwards.
    pub fn set_elapsed(&self, at: Duration) {
        let mut elapsed = self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        if at > *elapsed {
            *elapsed = at;
        }
    }

    fn elapsed(&self) -> Duration {
        *self.elapsed.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }

    fn wall(&self) -> DateTime<Utc> {
        let elapsed =
            chrono::Duration::from_std(self.elapsed()).unwrap_or_else(|_| chrono::Duration::zero());
        self.start_wall + elapsed
    }
}
